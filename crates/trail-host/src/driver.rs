//! Runs a game session in real time.
//!
//! The session lives inside a single task. Requests arrive over an mpsc
//! channel with a oneshot for the reply, the clock is advanced from a
//! tokio interval, and every state change is published on a watch channel.

use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};
use trail_core::{GameCommand, GameError, GameEvent, GameSession, GameSnapshot};

use crate::protocol::{Request, Response};

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Game driver has stopped")]
    Stopped,

    #[error(transparent)]
    Rejected(#[from] GameError),

    #[error("Unexpected response: {0:?}")]
    Unexpected(Response),
}

/// Clock settings for the driver
#[derive(Debug, Clone, Copy)]
pub struct DriverSettings {
    /// Real time between clock updates
    pub tick: Duration,
    /// Virtual milliseconds per real millisecond
    pub speed: u32,
}

struct Envelope {
    request: Request,
    reply: oneshot::Sender<Response>,
}

/// Cheap, cloneable access to a running driver
#[derive(Clone)]
pub struct DriverHandle {
    requests: mpsc::Sender<Envelope>,
    snapshots: watch::Receiver<GameSnapshot>,
}

impl DriverHandle {
    /// Send a request and wait for its response
    pub async fn request(&self, request: Request) -> Result<Response, DriverError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Envelope { request, reply })
            .await
            .map_err(|_| DriverError::Stopped)?;
        response.await.map_err(|_| DriverError::Stopped)
    }

    /// Apply a command
    pub async fn send(&self, command: GameCommand) -> Result<Vec<GameEvent>, DriverError> {
        match self.request(Request::Command(command)).await? {
            Response::Events { events } => Ok(events),
            Response::Rejected { error, .. } => Err(DriverError::Rejected(error)),
            other => Err(DriverError::Unexpected(other)),
        }
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> GameSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Watch for state changes
    pub fn subscribe(&self) -> watch::Receiver<GameSnapshot> {
        self.snapshots.clone()
    }
}

/// Start a driver task for `session`.
///
/// The task ends once every handle has been dropped.
pub fn spawn(session: GameSession, settings: DriverSettings) -> (DriverHandle, JoinHandle<()>) {
    let (requests, inbox) = mpsc::channel(32);
    let (publisher, snapshots) = watch::channel(session.snapshot());

    let task = tokio::spawn(run(session, settings, inbox, publisher));
    (DriverHandle { requests, snapshots }, task)
}

async fn run(
    mut session: GameSession,
    settings: DriverSettings,
    mut inbox: mpsc::Receiver<Envelope>,
    publisher: watch::Sender<GameSnapshot>,
) {
    let mut interval = time::interval(settings.tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = Instant::now();

    info!("Game driver running");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = Instant::now();
                let real = now.duration_since(last).as_millis() as u64;
                last = now;

                let events = session.advance(real * settings.speed as u64);
                if !events.is_empty() {
                    debug!("Clock fired {} events", events.len());
                    publisher.send_replace(session.snapshot());
                }
            }

            envelope = inbox.recv() => {
                let Some(Envelope { request, reply }) = envelope else {
                    break;
                };

                let response = handle_request(&mut session, request);
                if matches!(response, Response::Events { .. }) {
                    publisher.send_replace(session.snapshot());
                }
                // the requester may have given up waiting
                let _ = reply.send(response);
            }
        }
    }

    info!("Game driver stopped");
}

fn handle_request(session: &mut GameSession, request: Request) -> Response {
    match request {
        Request::Command(command) => match session.apply(command) {
            Ok(events) => Response::Events { events },
            Err(error) => {
                debug!("Command rejected: {}", error);
                Response::rejected(error)
            }
        },
        Request::Snapshot => Response::Snapshot {
            state: Box::new(session.snapshot()),
        },
        Request::Ping => Response::Pong,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use trail_core::{GameConfig, GamePhase, LoadedDice};

    fn settings() -> DriverSettings {
        DriverSettings {
            tick: Duration::from_millis(50),
            speed: 1,
        }
    }

    fn session(script: &[u8]) -> GameSession {
        GameSession::with_seed(4).with_dice(LoadedDice::new(script.iter().copied()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_roll_settles_in_real_time() {
        let (handle, _task) = spawn(session(&[1]), settings());
        handle
            .send(GameCommand::StartGame(GameConfig::default()))
            .await
            .unwrap();

        let events = handle.send(GameCommand::RollDice).await.unwrap();
        assert_eq!(events, vec![GameEvent::DiceRolling { player: 0 }]);
        assert!(handle.snapshot().is_rolling);

        // reveal 2000 + move 500, then at most a challenge opening or a settle
        time::sleep(Duration::from_millis(4_000)).await;

        let snapshot = handle.snapshot();
        assert!(!snapshot.is_rolling);
        assert_eq!(snapshot.players[0].position, 1);
        assert_eq!(snapshot.dice_value.is_some(), snapshot.phase != GamePhase::AwaitingRoll);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejections_come_back_as_errors() {
        let (handle, _task) = spawn(session(&[]), settings());

        let err = handle.send(GameCommand::RollDice).await.unwrap_err();
        assert!(matches!(err, DriverError::Rejected(GameError::NotStarted)));

        assert_eq!(handle.request(Request::Ping).await.unwrap(), Response::Pong);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_changes() {
        let (handle, _task) = spawn(session(&[]), settings());
        let mut snapshots = handle.subscribe();
        assert!(!snapshots.borrow_and_update().game_started);

        handle
            .send(GameCommand::StartGame(GameConfig::default()))
            .await
            .unwrap();

        snapshots.changed().await.unwrap();
        assert!(snapshots.borrow().game_started);
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_stops_when_handles_drop() {
        let (handle, task) = spawn(session(&[]), settings());
        drop(handle);
        task.await.unwrap();
    }
}
