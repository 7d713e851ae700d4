//! Session configuration and fixed game constants.
//!
//! This module contains:
//! - Board and roster constants
//! - Difficulty and play mode selection
//! - `GameConfig`, the struct the menu screens hand to `start_game`
//! - `Timings`, the presentation delays between state transitions

use crate::player::Character;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Number of cells on the track (start cell 0, goal cell `BOARD_SIZE - 1`)
pub const BOARD_SIZE: usize = 30;

/// How many interior cells carry a challenge
pub const CHALLENGE_CELL_COUNT: usize = 5;

/// Fewest players allowed in a session
pub const MIN_PLAYERS: u8 = 2;

/// Most players allowed in a session
pub const MAX_PLAYERS: u8 = 4;

/// Team mode always splits players into this many teams
pub const TEAM_COUNT: usize = 2;

/// Extra cells granted for a correctly solved challenge
pub const BONUS_ADVANCE: usize = 1;

/// Faces on the die
pub const DIE_FACES: u8 = 6;

/// Challenge difficulty, scaled to the players' age group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Ages 4-5
    Easy,
    /// Ages 5-6
    #[default]
    Medium,
    /// Ages 6 and up
    Hard,
}

impl Difficulty {
    /// All difficulty levels
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Seconds offered by the menu when the time limit is switched on
    pub fn default_time_limit(&self) -> u32 {
        match self {
            Difficulty::Easy => 90,
            Difficulty::Medium => 60,
            Difficulty::Hard => 45,
        }
    }

    /// Parse the lowercase name used by the menu
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Individual play or two competing teams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Individual,
    Teams,
}

impl GameMode {
    /// Parse the lowercase name used by the menu
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "individual" => Some(GameMode::Individual),
            "teams" | "team" => Some(GameMode::Teams),
            _ => None,
        }
    }
}

/// Reasons a configuration is refused at game start
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ConfigError {
    #[error("Choose between {min} and {max} players (got {got})")]
    PlayerCount { got: u8, min: u8, max: u8 },

    #[error("Every player needs a character: expected {expected}, got {got}")]
    CharacterCount { expected: usize, got: usize },

    #[error("{0} was chosen by more than one player")]
    DuplicateCharacter(Character),

    #[error("The time limit must be at least one second")]
    ZeroTimeLimit,

    #[error("Team mode needs at least {needed} players")]
    NotEnoughForTeams { needed: usize },
}

/// Everything the menu screens decide before a game starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub player_count: u8,
    pub difficulty: Difficulty,
    pub mode: GameMode,
    /// Seconds per challenge, or `None` for untimed challenges
    pub time_limit: Option<u32>,
    /// One character per player, in turn order
    pub characters: Vec<Character>,
}

impl GameConfig {
    /// Create a config, taking characters from the front of the roster
    pub fn new(player_count: u8, difficulty: Difficulty, mode: GameMode) -> Self {
        Self {
            player_count,
            difficulty,
            mode,
            time_limit: None,
            characters: Character::ALL
                .iter()
                .copied()
                .take(player_count as usize)
                .collect(),
        }
    }

    /// Replace the character assignment
    pub fn with_characters(mut self, characters: Vec<Character>) -> Self {
        self.characters = characters;
        self
    }

    /// Switch timed challenges on
    pub fn with_time_limit(mut self, seconds: u32) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    /// Check the configuration without touching any game state
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.player_count) {
            return Err(ConfigError::PlayerCount {
                got: self.player_count,
                min: MIN_PLAYERS,
                max: MAX_PLAYERS,
            });
        }

        if self.characters.len() != self.player_count as usize {
            return Err(ConfigError::CharacterCount {
                expected: self.player_count as usize,
                got: self.characters.len(),
            });
        }

        let mut seen = HashSet::new();
        for character in &self.characters {
            if !seen.insert(*character) {
                return Err(ConfigError::DuplicateCharacter(*character));
            }
        }

        if self.time_limit == Some(0) {
            return Err(ConfigError::ZeroTimeLimit);
        }

        if self.mode == GameMode::Teams && (self.player_count as usize) < TEAM_COUNT {
            return Err(ConfigError::NotEnoughForTeams { needed: TEAM_COUNT });
        }

        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(MIN_PLAYERS, Difficulty::default(), GameMode::default())
    }
}

/// Presentation delays, in milliseconds, between a command and the
/// transition it causes becoming visible.
///
/// None of these affect correctness; a front-end without animation can use
/// [`Timings::instant`]. Only `timer_tick_ms` must stay non-zero since it
/// paces the challenge countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timings {
    /// Die tumbling before its value is shown
    pub roll_reveal_ms: u64,
    /// Value on display before the token starts moving
    pub reveal_to_move_ms: u64,
    /// Token animation before the turn advances
    pub move_settle_ms: u64,
    /// Token animation before a landed-on challenge opens
    pub challenge_open_ms: u64,
    /// Pause after a wrong answer before the turn advances
    pub failure_settle_ms: u64,
    /// Pause after a bonus advance before the turn advances
    pub success_settle_ms: u64,
    /// Pause after a bonus advance before a chained challenge opens
    pub chain_settle_ms: u64,
    /// Time-up notice on screen before the failure path runs
    pub timeout_notice_ms: u64,
    /// One countdown step
    pub timer_tick_ms: u64,
}

impl Timings {
    /// No animation delays; the countdown still ticks once per second
    pub fn instant() -> Self {
        Self {
            roll_reveal_ms: 0,
            reveal_to_move_ms: 0,
            move_settle_ms: 0,
            challenge_open_ms: 0,
            failure_settle_ms: 0,
            success_settle_ms: 0,
            chain_settle_ms: 0,
            timeout_notice_ms: 0,
            timer_tick_ms: 1000,
        }
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            roll_reveal_ms: 2000,
            reveal_to_move_ms: 500,
            move_settle_ms: 1000,
            challenge_open_ms: 800,
            failure_settle_ms: 300,
            success_settle_ms: 500,
            chain_settle_ms: 600,
            timeout_notice_ms: 500,
            timer_tick_ms: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
        for count in MIN_PLAYERS..=MAX_PLAYERS {
            assert!(GameConfig::new(count, Difficulty::Hard, GameMode::Teams)
                .validate()
                .is_ok());
        }
    }

    #[test]
    fn test_player_count_bounds() {
        let too_few = GameConfig::new(1, Difficulty::Easy, GameMode::Individual);
        assert!(matches!(
            too_few.validate(),
            Err(ConfigError::PlayerCount { got: 1, .. })
        ));

        let too_many = GameConfig::new(5, Difficulty::Easy, GameMode::Individual);
        assert!(matches!(
            too_many.validate(),
            Err(ConfigError::PlayerCount { got: 5, .. })
        ));
    }

    #[test]
    fn test_missing_and_duplicate_characters() {
        let missing = GameConfig::new(3, Difficulty::Easy, GameMode::Individual)
            .with_characters(vec![Character::Rabbit, Character::Bear]);
        assert_eq!(
            missing.validate(),
            Err(ConfigError::CharacterCount {
                expected: 3,
                got: 2
            })
        );

        let duplicate = GameConfig::new(2, Difficulty::Easy, GameMode::Individual)
            .with_characters(vec![Character::Fox, Character::Fox]);
        assert_eq!(
            duplicate.validate(),
            Err(ConfigError::DuplicateCharacter(Character::Fox))
        );
    }

    #[test]
    fn test_zero_time_limit_rejected() {
        let config = GameConfig::default().with_time_limit(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeLimit));
    }

    #[test]
    fn test_time_limits_by_difficulty() {
        assert_eq!(Difficulty::Easy.default_time_limit(), 90);
        assert_eq!(Difficulty::Medium.default_time_limit(), 60);
        assert_eq!(Difficulty::Hard.default_time_limit(), 45);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(Difficulty::from_name("HARD"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_name("brutal"), None);
        assert_eq!(GameMode::from_name("teams"), Some(GameMode::Teams));
    }

    #[test]
    fn test_config_json_shape() {
        let json = serde_json::to_value(GameConfig::default()).unwrap();
        assert_eq!(json["difficulty"], "medium");
        assert_eq!(json["mode"], "individual");
        assert_eq!(json["characters"][0], "Rabbit");
    }
}
