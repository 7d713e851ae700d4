//! Core game state machine.
//!
//! This module contains the `GameSession` struct, which owns every piece of
//! authoritative state for one game, and all turn logic. Presentation delays
//! are deferred actions on the session's virtual clock; nothing happens
//! between commands unless the caller advances that clock.

use crate::actions::{GameCommand, GameEvent};
use crate::board::{BoardLayout, Cell};
use crate::challenge::{Answer, Catalog, Challenge, ChallengeProvider};
use crate::config::{
    ConfigError, Difficulty, GameConfig, GameMode, Timings, BONUS_ADVANCE, DIE_FACES,
};
use crate::dice::{Dice, FairDie};
use crate::effects::{Effects, NoEffects, Notice};
use crate::player::{partition_into_teams, Player, PlayerId, Team};
use crate::schedule::{Deferred, DeferredKind, FollowUp, Millis, Scheduler};
use crate::victory::{detect_winner, Winner};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// What a busy session is resolving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// A token is moving after a roll
    Move,
    /// A challenge was just answered or skipped
    ChallengeOutcome,
}

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// In the menu, no game running
    NotStarted,

    /// Waiting for the current player to roll
    AwaitingRoll,

    /// Die is tumbling
    Rolling,

    /// Waiting for a movement or challenge outcome to settle
    Resolving(Resolution),

    /// A challenge is on screen
    ChallengeActive,

    /// Game is over until reset
    Won { winner: Winner },
}

impl GamePhase {
    /// Whether a movement sequence or outcome is in flight
    pub fn is_busy(&self) -> bool {
        matches!(self, GamePhase::Rolling | GamePhase::Resolving(_))
    }
}

/// Errors that can occur when applying commands
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("No game is running")]
    NotStarted,

    #[error("Still resolving the previous move")]
    Busy,

    #[error("Invalid command for current phase")]
    InvalidPhase,

    #[error("The die was already rolled this turn")]
    AlreadyRolled,

    #[error("Die value {0} is out of range")]
    InvalidDieValue(u8),

    #[error("Cannot tell whose turn it is")]
    NoCurrentPlayer,

    #[error("No previous game to restart")]
    NoSavedConfig,

    #[error("Game is over")]
    GameOver,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Whose turn it is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TurnPointer {
    /// Index into the player list
    Individual { player: usize },
    /// Team index and member index within that team
    Team { team: usize, member: usize },
}

impl TurnPointer {
    /// Pointer at the start of a game
    pub fn start(mode: GameMode) -> Self {
        match mode {
            GameMode::Individual => TurnPointer::Individual { player: 0 },
            GameMode::Teams => TurnPointer::Team { team: 0, member: 0 },
        }
    }

    /// Next player in turn order.
    ///
    /// Teams play all their members in order before the next team starts
    /// again from its first member.
    pub fn advance(self, player_count: usize, teams: &[Team]) -> Self {
        match self {
            TurnPointer::Individual { player } => TurnPointer::Individual {
                player: (player + 1) % player_count.max(1),
            },
            TurnPointer::Team { team, member } => {
                let size = teams.get(team).map_or(0, Team::size);
                if member + 1 < size {
                    TurnPointer::Team {
                        team,
                        member: member + 1,
                    }
                } else {
                    TurnPointer::Team {
                        team: (team + 1) % teams.len().max(1),
                        member: 0,
                    }
                }
            }
        }
    }
}

/// Countdown for the active challenge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct ChallengeTimer {
    remaining: u32,
    running: bool,
    /// Set once the timeout path ran for the current instance
    expiry_handled: bool,
}

/// Read-only projection of a session for observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub phase: GamePhase,
    pub game_started: bool,
    pub is_rolling: bool,
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
    pub turn: Option<TurnPointer>,
    pub current_player: Option<PlayerId>,
    pub dice_rolled: bool,
    pub dice_value: Option<u8>,
    pub current_challenge: Option<Challenge>,
    pub time_remaining: u32,
    pub time_limit_enabled: bool,
    pub challenge_cells: Vec<Cell>,
    pub difficulty: Difficulty,
    pub mode: GameMode,
    pub winner: Option<Winner>,
    /// Nothing but the countdown is pending; the session waits for a command
    pub idle: bool,
    /// Virtual clock, in milliseconds
    pub clock: Millis,
}

/// A single game, from menu to win
pub struct GameSession {
    phase: GamePhase,
    players: Vec<Player>,
    teams: Vec<Team>,
    turn: Option<TurnPointer>,
    layout: BoardLayout,
    /// Config of the running game, kept for `reset_game`
    config: Option<GameConfig>,
    dice_rolled: bool,
    dice_value: Option<u8>,
    current_challenge: Option<Challenge>,
    timer: ChallengeTimer,
    scheduler: Scheduler,
    timings: Timings,
    rng: StdRng,
    dice: Box<dyn Dice + Send>,
    provider: Box<dyn ChallengeProvider + Send>,
    effects: Box<dyn Effects + Send>,
}

impl GameSession {
    /// Create a session in the menu, seeded from entropy
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Create a session with a deterministic random source
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            phase: GamePhase::NotStarted,
            players: Vec::new(),
            teams: Vec::new(),
            turn: None,
            layout: BoardLayout::default(),
            config: None,
            dice_rolled: false,
            dice_value: None,
            current_challenge: None,
            timer: ChallengeTimer::default(),
            scheduler: Scheduler::new(),
            timings: Timings::default(),
            rng,
            dice: Box::new(FairDie),
            provider: Box::new(Catalog),
            effects: Box::new(NoEffects),
        }
    }

    /// Replace the die
    pub fn with_dice(mut self, dice: impl Dice + Send + 'static) -> Self {
        self.dice = Box::new(dice);
        self
    }

    /// Replace the challenge provider
    pub fn with_provider(mut self, provider: impl ChallengeProvider + Send + 'static) -> Self {
        self.provider = Box::new(provider);
        self
    }

    /// Replace the side-effect outlet
    pub fn with_effects(mut self, effects: impl Effects + Send + 'static) -> Self {
        self.effects = Box::new(effects);
        self
    }

    /// Replace the presentation delays
    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    // ==================== Queries ====================

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    pub fn turn(&self) -> Option<TurnPointer> {
        self.turn
    }

    pub fn config(&self) -> Option<&GameConfig> {
        self.config.as_ref()
    }

    pub fn current_challenge(&self) -> Option<&Challenge> {
        self.current_challenge.as_ref()
    }

    pub fn dice_value(&self) -> Option<u8> {
        self.dice_value
    }

    pub fn time_remaining(&self) -> u32 {
        self.timer.remaining
    }

    /// Current virtual time
    pub fn now(&self) -> Millis {
        self.scheduler.now()
    }

    /// Deferred actions waiting, earliest first
    pub fn pending(&self) -> Vec<DeferredKind> {
        self.scheduler.pending_kinds()
    }

    /// Whether nothing but the countdown is waiting to fire
    pub fn is_idle(&self) -> bool {
        self.scheduler
            .next_due_except(DeferredKind::TimerTick)
            .is_none()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.config.as_ref().map(|c| c.difficulty).unwrap_or_default()
    }

    pub fn mode(&self) -> GameMode {
        self.config.as_ref().map(|c| c.mode).unwrap_or_default()
    }

    fn time_limit(&self) -> Option<u32> {
        self.config.as_ref().and_then(|c| c.time_limit)
    }

    /// Player whose turn it is
    pub fn current_player(&self) -> Option<&Player> {
        self.current_player_index().map(|i| &self.players[i])
    }

    fn current_player_index(&self) -> Option<usize> {
        let id = match self.turn? {
            TurnPointer::Individual { player } => self.players.get(player)?.id,
            TurnPointer::Team { team, member } => *self.teams.get(team)?.members.get(member)?,
        };
        self.players.iter().position(|p| p.id == id)
    }

    fn current_player_id(&self) -> Option<PlayerId> {
        self.current_player().map(|p| p.id)
    }

    /// Poll for a winner. Anyone on the goal cell counts, even mid-animation.
    pub fn winner(&self) -> Option<Winner> {
        if self.phase == GamePhase::NotStarted {
            return None;
        }
        detect_winner(self.mode(), &self.players, &self.teams, self.layout.goal())
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            phase: self.phase,
            game_started: self.phase != GamePhase::NotStarted,
            is_rolling: self.phase == GamePhase::Rolling,
            players: self.players.clone(),
            teams: self.teams.clone(),
            turn: self.turn,
            current_player: self.current_player_id(),
            dice_rolled: self.dice_rolled,
            dice_value: self.dice_value,
            current_challenge: self.current_challenge.clone(),
            time_remaining: self.timer.remaining,
            time_limit_enabled: self.time_limit().is_some(),
            challenge_cells: self.layout.challenge_cells().to_vec(),
            difficulty: self.difficulty(),
            mode: self.mode(),
            winner: self.winner(),
            idle: self.is_idle(),
            clock: self.now(),
        }
    }

    // ==================== Commands ====================

    /// Apply a command
    pub fn apply(&mut self, command: GameCommand) -> Result<Vec<GameEvent>, GameError> {
        match command {
            GameCommand::StartGame(config) => self.start_game(config),
            GameCommand::ResetGame => self.reset_game(),
            GameCommand::ResetToMenu => Ok(self.reset_to_menu()),
            GameCommand::RollDice => self.roll_dice(),
            GameCommand::NextTurn => self.next_turn(),
            GameCommand::CloseChallenge => Ok(self.close_challenge()),
            GameCommand::CompleteChallenge { success } => Ok(self.complete_challenge(success)),
            GameCommand::SubmitAnswer(answer) => self.submit_answer(&answer),
        }
    }

    /// Start a game. A rejected config leaves the session untouched.
    pub fn start_game(&mut self, config: GameConfig) -> Result<Vec<GameEvent>, GameError> {
        config.validate()?;
        let layout = BoardLayout::generate(&*self.provider, &mut self.rng);
        self.start_game_on(config, layout)
    }

    /// Start a game on a prepared board instead of a freshly drawn one
    pub fn start_game_on(
        &mut self,
        config: GameConfig,
        layout: BoardLayout,
    ) -> Result<Vec<GameEvent>, GameError> {
        config.validate()?;

        self.teardown();
        self.layout = layout;

        self.players = config
            .characters
            .iter()
            .enumerate()
            .map(|(i, character)| Player::new(i as PlayerId, *character))
            .collect();

        if config.mode == GameMode::Teams {
            self.teams = partition_into_teams(&mut self.players);
        }

        self.turn = Some(TurnPointer::start(config.mode));
        self.timer.remaining = config.time_limit.unwrap_or(0);
        self.phase = GamePhase::AwaitingRoll;

        info!(
            "Game started: {} players, {:?}, {:?}, challenges at {:?}",
            config.player_count,
            config.mode,
            config.difficulty,
            self.layout.challenge_cells()
        );

        let event = GameEvent::GameStarted {
            player_count: config.player_count,
            mode: config.mode,
            challenge_cells: self.layout.challenge_cells().to_vec(),
        };
        self.config = Some(config);

        Ok(vec![event])
    }

    /// Restart with the configuration of the current game
    pub fn reset_game(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let config = self.config.clone().ok_or(GameError::NoSavedConfig)?;
        self.start_game(config)
    }

    /// Tear everything down and return to the menu
    pub fn reset_to_menu(&mut self) -> Vec<GameEvent> {
        self.teardown();
        self.config = None;
        info!("Returned to menu");
        vec![GameEvent::ReturnedToMenu]
    }

    /// Clear every pending action and all per-game state
    fn teardown(&mut self) {
        self.scheduler.clear();
        self.phase = GamePhase::NotStarted;
        self.players.clear();
        self.teams.clear();
        self.turn = None;
        self.layout = BoardLayout::default();
        self.dice_rolled = false;
        self.dice_value = None;
        self.current_challenge = None;
        self.timer = ChallengeTimer::default();
    }

    fn ensure_running(&self) -> Result<(), GameError> {
        match self.phase {
            GamePhase::NotStarted => Err(GameError::NotStarted),
            GamePhase::Won { .. } => Err(GameError::GameOver),
            _ => Ok(()),
        }
    }

    /// Roll the die for the current player.
    ///
    /// The value is revealed and the token moved by deferred actions.
    pub fn roll_dice(&mut self) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_running()?;

        if self.phase.is_busy() {
            debug!("Ignoring roll while {:?}", self.phase);
            return Err(GameError::Busy);
        }
        if self.phase != GamePhase::AwaitingRoll {
            return Err(GameError::InvalidPhase);
        }
        if self.dice_rolled {
            return Err(GameError::AlreadyRolled);
        }

        let player = self.current_player_id().ok_or_else(|| {
            warn!("Roll requested with no resolvable current player");
            GameError::NoCurrentPlayer
        })?;

        let value = self.dice.roll(&mut self.rng);
        self.dice_rolled = true;
        self.phase = GamePhase::Rolling;

        // a fresh roll supersedes anything left over from the last turn
        self.scheduler.cancel(DeferredKind::MoveSettle);
        self.scheduler.cancel(DeferredKind::ChallengeSettle);
        self.scheduler
            .schedule(Deferred::RevealRoll { value }, self.timings.roll_reveal_ms);

        debug!("Player {} rolling", player);
        Ok(vec![GameEvent::DiceRolling { player }])
    }

    /// Move the current player by `steps` cells.
    ///
    /// Normally driven by a roll, but may be called directly from
    /// `AwaitingRoll` by a front-end with a physical die. Rejected while a
    /// roll is in flight.
    pub fn move_player(&mut self, steps: u8) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_running()?;

        match self.phase {
            GamePhase::AwaitingRoll => self.commit_move(steps),
            GamePhase::ChallengeActive => Err(GameError::InvalidPhase),
            _ => Err(GameError::Busy),
        }
    }

    /// Apply a movement. Only the roll's own `StartMove` may call this
    /// while `Rolling`.
    fn commit_move(&mut self, steps: u8) -> Result<Vec<GameEvent>, GameError> {
        if !(1..=DIE_FACES).contains(&steps) {
            warn!("Die value {} out of range, ignoring move", steps);
            self.release_roll();
            return Err(GameError::InvalidDieValue(steps));
        }

        let Some(index) = self.current_player_index() else {
            warn!("Move requested with no resolvable current player");
            self.release_roll();
            return Err(GameError::NoCurrentPlayer);
        };

        let mut events = Vec::new();
        let to = self.step_player(index, steps as usize, &mut events);

        self.dice_rolled = true;
        self.dice_value = Some(steps);
        self.phase = GamePhase::Resolving(Resolution::Move);

        let (follow_up, delay) = if to == self.layout.goal() {
            info!("{} reached the goal", self.players[index].name);
            (FollowUp::AdvanceTurn, self.timings.move_settle_ms)
        } else if self.layout.is_challenge_cell(to) {
            (FollowUp::OpenChallenge(to), self.timings.challenge_open_ms)
        } else {
            (FollowUp::AdvanceTurn, self.timings.move_settle_ms)
        };
        self.scheduler.schedule(Deferred::SettleMove(follow_up), delay);

        Ok(events)
    }

    /// Undo a roll whose movement never started
    fn release_roll(&mut self) {
        if self.phase != GamePhase::Rolling {
            return;
        }
        self.scheduler.cancel(DeferredKind::RollReveal);
        self.scheduler.cancel(DeferredKind::MoveStart);
        self.dice_rolled = false;
        self.dice_value = None;
        self.phase = GamePhase::AwaitingRoll;
    }

    /// Advance a player, clamped at the goal, and refresh their team.
    ///
    /// Reads the position from the player list at call time.
    fn step_player(&mut self, index: usize, steps: usize, events: &mut Vec<GameEvent>) -> Cell {
        let player = &mut self.players[index];
        let from = player.position;
        let to = self.layout.advance(from, steps);
        player.position = to;

        let id = player.id;
        let team_id = player.team;

        if to != from {
            debug!("Player {} moved {} -> {}", id, from, to);
            events.push(GameEvent::PlayerMoved { player: id, from, to });
        }

        if let Some(team) = team_id.and_then(|t| self.teams.iter_mut().find(|team| team.id == t)) {
            let before = team.position;
            team.recompute_position(&self.players);
            if team.position != before {
                events.push(GameEvent::TeamMoved {
                    team: team.id,
                    position: team.position,
                });
            }
        }

        to
    }

    /// Hand the turn to the next player.
    ///
    /// An active challenge is closed first. Not allowed while a movement
    /// is in flight.
    pub fn next_turn(&mut self) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_running()?;

        if matches!(
            self.phase,
            GamePhase::Rolling | GamePhase::Resolving(Resolution::Move)
        ) {
            return Err(GameError::Busy);
        }

        let mut events = Vec::new();
        if self.challenge_expired() {
            self.resolve_challenge(false, None, &mut events);
        }
        self.advance_turn(&mut events);
        Ok(events)
    }

    fn advance_turn(&mut self, events: &mut Vec<GameEvent>) {
        self.dice_rolled = false;
        self.dice_value = None;
        for kind in DeferredKind::TURN_SCOPED {
            self.scheduler.cancel(kind);
        }

        if self.current_challenge.is_some() {
            self.clear_challenge();
            events.push(GameEvent::ChallengeClosed);
        }

        if let Some(winner) = self.winner() {
            info!("Game won by {:?}", winner);
            self.phase = GamePhase::Won { winner };
            events.push(GameEvent::GameWon { winner });
            return;
        }

        let previous = self.current_player_id();
        self.turn = self
            .turn
            .map(|turn| turn.advance(self.players.len(), &self.teams));
        self.phase = GamePhase::AwaitingRoll;

        let current = self.current_player_id();
        debug!("Turn {:?} -> {:?}", previous, current);
        events.push(GameEvent::TurnAdvanced { previous, current });
    }

    /// Skip the active challenge. The turn stays with the current player
    /// until `next_turn` is called.
    pub fn close_challenge(&mut self) -> Vec<GameEvent> {
        if self.current_challenge.is_none() || self.challenge_expired() {
            return Vec::new();
        }

        self.clear_challenge();
        self.phase = GamePhase::Resolving(Resolution::ChallengeOutcome);
        debug!("Challenge skipped");
        vec![GameEvent::ChallengeClosed]
    }

    /// Apply a challenge outcome. Does nothing without an active challenge,
    /// or once its time has run out.
    pub fn complete_challenge(&mut self, success: bool) -> Vec<GameEvent> {
        if self.current_challenge.is_none() {
            return Vec::new();
        }
        if self.challenge_expired() {
            debug!("Challenge already timed out, ignoring outcome");
            return Vec::new();
        }

        let mut events = Vec::new();
        self.resolve_challenge(success, Some(Notice::WrongAnswer), &mut events);
        events
    }

    /// Check an answer against the active challenge and apply the outcome
    pub fn submit_answer(&mut self, answer: &Answer) -> Result<Vec<GameEvent>, GameError> {
        let challenge = self
            .current_challenge
            .as_ref()
            .ok_or(GameError::InvalidPhase)?;

        let success = challenge.check(answer);
        debug!("Answer submitted, correct: {}", success);
        Ok(self.complete_challenge(success))
    }

    fn resolve_challenge(
        &mut self,
        success: bool,
        failure_notice: Option<Notice>,
        events: &mut Vec<GameEvent>,
    ) {
        let player = self.current_player_id();
        self.clear_challenge();
        self.phase = GamePhase::Resolving(Resolution::ChallengeOutcome);

        if !success {
            if let Some(notice) = failure_notice {
                if let Err(err) = self.effects.notify(notice) {
                    warn!("Notification failed: {}", err);
                }
            }
            events.push(GameEvent::ChallengeFailed { player });
            self.settle_challenge(FollowUp::AdvanceTurn, self.timings.failure_settle_ms);
            return;
        }

        events.push(GameEvent::ChallengeSucceeded { player });

        let Some(index) = self.current_player_index() else {
            warn!("Challenge solved with no resolvable current player");
            self.settle_challenge(FollowUp::AdvanceTurn, self.timings.failure_settle_ms);
            return;
        };

        let character = self.players[index].character;
        if let Err(err) = self.effects.play_success_cue(character) {
            warn!("Success cue failed: {}", err);
        }

        let to = self.step_player(index, BONUS_ADVANCE, events);

        if to == self.layout.goal() {
            info!("{} reached the goal", self.players[index].name);
            self.settle_challenge(FollowUp::AdvanceTurn, self.timings.success_settle_ms);
        } else if self.layout.is_challenge_cell(to) {
            self.settle_challenge(FollowUp::OpenChallenge(to), self.timings.chain_settle_ms);
        } else {
            self.settle_challenge(FollowUp::AdvanceTurn, self.timings.success_settle_ms);
        }
    }

    fn settle_challenge(&mut self, follow_up: FollowUp, delay: Millis) {
        self.scheduler
            .schedule(Deferred::SettleChallenge(follow_up), delay);
    }

    fn open_challenge(&mut self, cell: Cell, events: &mut Vec<GameEvent>) {
        let Some(player) = self.current_player_id() else {
            warn!("Challenge at cell {} with no resolvable current player", cell);
            self.advance_turn(events);
            return;
        };

        let difficulty = self.difficulty();
        let template = self.layout.template_at(cell);
        let challenge = match template {
            Some(template) => self.provider.generate(template, difficulty, &mut self.rng),
            None => {
                warn!("Cell {} has no bound template, using a random challenge", cell);
                self.provider.random_fallback(difficulty, &mut self.rng)
            }
        };

        debug!("Challenge opened at cell {}: {}", cell, challenge.title);
        events.push(GameEvent::ChallengeOpened {
            player,
            cell,
            template: challenge.template,
            kind: challenge.kind(),
        });

        self.current_challenge = Some(challenge);
        self.phase = GamePhase::ChallengeActive;
        self.start_timer();
    }

    /// The timer ran out and the failure is waiting behind the notice
    fn challenge_expired(&self) -> bool {
        self.current_challenge.is_some() && self.timer.expiry_handled
    }

    fn clear_challenge(&mut self) {
        self.current_challenge = None;
        self.stop_timer();
        self.scheduler.cancel(DeferredKind::TimeoutNotice);
    }

    // ==================== Timer ====================

    fn start_timer(&mut self) {
        self.timer.expiry_handled = false;
        if let Some(limit) = self.time_limit() {
            self.timer.remaining = limit;
            self.timer.running = true;
            self.scheduler
                .schedule(Deferred::TimerTick, self.timings.timer_tick_ms);
        }
    }

    fn stop_timer(&mut self) {
        self.timer.running = false;
        self.timer.remaining = self.time_limit().unwrap_or(0);
        self.scheduler.cancel(DeferredKind::TimerTick);
    }

    fn on_timer_tick(&mut self, events: &mut Vec<GameEvent>) {
        if self.time_limit().is_none() {
            return;
        }

        if self.timer.running && self.timer.remaining > 0 {
            self.timer.remaining -= 1;
            events.push(GameEvent::TimerTicked {
                remaining: self.timer.remaining,
            });
        }

        if self.timer.remaining > 0 {
            if self.timer.running {
                self.scheduler
                    .schedule(Deferred::TimerTick, self.timings.timer_tick_ms);
            }
            return;
        }

        self.timer.running = false;
        if self.current_challenge.is_none() || self.timer.expiry_handled {
            return;
        }

        self.timer.expiry_handled = true;
        if let Err(err) = self.effects.notify(Notice::TimeUp) {
            warn!("Notification failed: {}", err);
        }
        events.push(GameEvent::ChallengeTimedOut {
            player: self.current_player_id(),
        });
        self.scheduler
            .schedule(Deferred::ExpireChallenge, self.timings.timeout_notice_ms);
    }

    // ==================== Clock ====================

    /// Let `elapsed` milliseconds pass, firing every deferred action that
    /// falls due in order
    pub fn advance(&mut self, elapsed: Millis) -> Vec<GameEvent> {
        let target = self.scheduler.now().saturating_add(elapsed);
        let mut events = Vec::new();

        while let Some(action) = self.scheduler.pop_due(target) {
            self.run_deferred(action, &mut events);
        }
        self.scheduler.advance_to(target);

        events
    }

    /// Advance until nothing but the countdown is pending, i.e. until the
    /// session waits for the next command
    pub fn run_until_idle(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while let Some(due) = self.scheduler.next_due_except(DeferredKind::TimerTick) {
            let elapsed = due.saturating_sub(self.scheduler.now());
            events.extend(self.advance(elapsed));
        }
        events
    }

    fn run_deferred(&mut self, action: Deferred, events: &mut Vec<GameEvent>) {
        match action {
            Deferred::RevealRoll { value } => {
                self.dice_value = Some(value);
                if let Some(player) = self.current_player_id() {
                    events.push(GameEvent::DiceRevealed { player, value });
                }
                self.scheduler.schedule(
                    Deferred::StartMove { steps: value },
                    self.timings.reveal_to_move_ms,
                );
            }

            Deferred::StartMove { steps } => match self.commit_move(steps) {
                Ok(moved) => events.extend(moved),
                Err(err) => warn!("Move abandoned: {}", err),
            },

            Deferred::SettleMove(FollowUp::OpenChallenge(cell)) => {
                self.open_challenge(cell, events);
            }

            Deferred::SettleChallenge(FollowUp::OpenChallenge(cell)) => {
                if self.layout.is_challenge_cell(cell) {
                    self.open_challenge(cell, events);
                } else {
                    self.advance_turn(events);
                }
            }

            Deferred::SettleMove(FollowUp::AdvanceTurn)
            | Deferred::SettleChallenge(FollowUp::AdvanceTurn) => {
                self.advance_turn(events);
            }

            Deferred::ExpireChallenge => {
                if self.current_challenge.is_some() {
                    self.resolve_challenge(false, None, events);
                }
            }

            Deferred::TimerTick => self.on_timer_tick(events),
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("phase", &self.phase)
            .field("players", &self.players)
            .field("turn", &self.turn)
            .field("clock", &self.scheduler.now())
            .finish_non_exhaustive()
    }
}
