//! Forest Trail host.
//!
//! Runs one game in real time. By default bots play every seat; with
//! `TRAIL_INPUT=stdin` requests are read as JSON lines from stdin and
//! responses written to stdout.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trail_core::{
    Bot, BotDifficulty, GameCommand, GamePhase, GameSession, LogEffects, PlayerId, Winner,
};

mod driver;
mod protocol;
mod settings;

use driver::{DriverError, DriverHandle, DriverSettings};
use protocol::{Request, Response};
use settings::HostSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = HostSettings::from_env()?;

    info!("Starting Forest Trail host...");

    let session = match settings.seed {
        Some(seed) => GameSession::with_seed(seed),
        None => GameSession::new(),
    }
    .with_effects(LogEffects);

    let (handle, task) = driver::spawn(
        session,
        DriverSettings {
            tick: settings.tick,
            speed: settings.speed,
        },
    );

    if settings.interactive {
        serve_stdin(&handle).await?;
    } else {
        play_bots(&handle, &settings).await?;
    }

    drop(handle);
    task.await?;
    Ok(())
}

/// Let one bot per seat play a full game
async fn play_bots(handle: &DriverHandle, settings: &HostSettings) -> anyhow::Result<()> {
    handle
        .send(GameCommand::StartGame(settings.config.clone()))
        .await?;

    let mut bots: Vec<Bot> = (0..settings.config.player_count)
        .map(|id: PlayerId| match settings.seed {
            Some(seed) => Bot::with_seed(id, BotDifficulty::Medium, seed + id as u64),
            None => Bot::new(id, BotDifficulty::Medium),
        })
        .collect();

    let mut snapshots = handle.subscribe();

    loop {
        let snapshot = snapshots.borrow_and_update().clone();

        if let GamePhase::Won { winner } = snapshot.phase {
            announce(handle, winner);
            return Ok(());
        }

        if let Some(command) = bots.iter_mut().find_map(|bot| bot.choose_command(&snapshot)) {
            match handle.send(command).await {
                Ok(events) => debug!("{:?}", events),
                Err(DriverError::Rejected(err)) => {
                    // a rejection publishes nothing, so look again after a tick
                    warn!("Bot command rejected: {}", err);
                    tokio::time::sleep(settings.tick).await;
                    continue;
                }
                Err(err) => return Err(err.into()),
            }
        }

        snapshots.changed().await?;
    }
}

fn announce(handle: &DriverHandle, winner: Winner) {
    let snapshot = handle.snapshot();
    let name = match winner {
        Winner::Player(id) => snapshot
            .players
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.clone()),
        Winner::Team(id) => snapshot
            .teams
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.name.clone()),
    };
    info!("{} wins!", name.unwrap_or_else(|| "Nobody".into()));

    for player in &snapshot.players {
        info!("  {} {} on cell {}", player.icon(), player.name, player.position);
    }
}

/// Serve JSON-line requests from stdin until it closes
async fn serve_stdin(handle: &DriverHandle) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => handle.request(request).await?,
            Err(e) => {
                warn!("Invalid request: {}", line);
                Response::Error {
                    message: e.to_string(),
                }
            }
        };

        let mut text = serde_json::to_string(&response)?;
        text.push('\n');
        stdout.write_all(text.as_bytes()).await?;
        stdout.flush().await?;
    }

    info!("Input closed");
    Ok(())
}
