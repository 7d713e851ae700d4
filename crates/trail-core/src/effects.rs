//! Fire-and-forget side effects.
//!
//! Sounds and pop-up messages never feed back into the game. A failing
//! effect is logged by the session and otherwise ignored.

use crate::player::Character;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message shown to the players when a challenge is lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    /// The submitted answer was wrong
    WrongAnswer,
    /// The countdown reached zero
    TimeUp,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::WrongAnswer => "Not quite! Try again next time.",
            Notice::TimeUp => "Time's up!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum EffectError {
    #[error("No sound available for {0}")]
    MissingSound(Character),

    #[error("Playback failed: {0}")]
    Playback(String),
}

/// Outlet for sounds and notifications
pub trait Effects {
    /// Play the character's celebration sound after a solved challenge
    fn play_success_cue(&mut self, character: Character) -> Result<(), EffectError>;

    /// Tell the players a challenge was lost
    fn notify(&mut self, notice: Notice) -> Result<(), EffectError>;
}

/// Effects sink that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEffects;

impl Effects for NoEffects {
    fn play_success_cue(&mut self, _character: Character) -> Result<(), EffectError> {
        Ok(())
    }

    fn notify(&mut self, _notice: Notice) -> Result<(), EffectError> {
        Ok(())
    }
}

/// Effects sink that logs through `tracing`, used by the host
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEffects;

impl Effects for LogEffects {
    fn play_success_cue(&mut self, character: Character) -> Result<(), EffectError> {
        tracing::info!("{} {} cheers!", character.icon(), character);
        Ok(())
    }

    fn notify(&mut self, notice: Notice) -> Result<(), EffectError> {
        tracing::info!("{}", notice.message());
        Ok(())
    }
}
