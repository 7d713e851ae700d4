//! Forest Trail - a dice board game for young children
//!
//! This crate provides the core game logic for Forest Trail, including:
//! - The linear track with its challenge cells
//! - Players, teams and the forest character roster
//! - The challenge model and the built-in template catalog
//! - The turn state machine, with its deferred actions and countdown
//!
//! # Architecture
//!
//! The engine is platform-agnostic and never reads a wall clock. Every
//! animation delay is a deferred action on the session's virtual clock,
//! advanced explicitly by the host. It can be compiled to:
//! - Native Rust, driven by the tokio host
//! - WebAssembly, driven by the page's animation loop
//!
//! # Modules
//!
//! - [`game`]: The session state machine
//! - [`board`]: Challenge cell layout and movement clamping
//! - [`challenge`]: Challenge instances, answers and the template catalog
//! - [`schedule`]: Cancellable deferred actions

pub mod actions;
pub mod board;
pub mod bot;
pub mod challenge;
pub mod config;
pub mod dice;
pub mod effects;
pub mod game;
pub mod player;
pub mod schedule;
pub mod victory;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{GameCommand, GameEvent};
pub use board::{BoardLayout, Cell};
pub use bot::{Bot, BotDifficulty};
pub use challenge::{
    Answer, Catalog, Category, Challenge, ChallengeBody, ChallengeKind, ChallengeProvider,
    TemplateId,
};
pub use config::{ConfigError, Difficulty, GameConfig, GameMode, Timings, BOARD_SIZE};
pub use dice::{Dice, FairDie, LoadedDice};
pub use effects::{EffectError, Effects, LogEffects, NoEffects, Notice};
pub use game::{GameError, GamePhase, GameSession, GameSnapshot, Resolution, TurnPointer};
pub use player::{Character, Player, PlayerId, Team, TeamId};
pub use schedule::{Deferred, DeferredKind, FollowUp, Millis};
pub use victory::{detect_winner, Winner};
