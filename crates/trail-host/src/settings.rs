//! Host settings read from the environment.

use anyhow::{bail, Context};
use std::time::Duration;
use trail_core::{Difficulty, GameConfig, GameMode};

/// How the host runs a game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSettings {
    pub config: GameConfig,
    pub seed: Option<u64>,
    /// Virtual milliseconds per real millisecond
    pub speed: u32,
    /// Real time between clock updates
    pub tick: Duration,
    /// Read requests from stdin instead of letting bots play
    pub interactive: bool,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            config: GameConfig::default(),
            seed: None,
            speed: 1,
            tick: Duration::from_millis(50),
            interactive: false,
        }
    }
}

impl HostSettings {
    /// Read `TRAIL_*` variables, falling back to defaults
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut settings = Self::default();

        let players = match lookup("TRAIL_PLAYERS") {
            Some(value) => value.parse().context("TRAIL_PLAYERS must be a number")?,
            None => settings.config.player_count,
        };

        let difficulty = match lookup("TRAIL_DIFFICULTY") {
            Some(value) => match Difficulty::from_name(&value) {
                Some(difficulty) => difficulty,
                None => bail!("Unknown difficulty {:?}", value),
            },
            None => Difficulty::default(),
        };

        let mode = match lookup("TRAIL_MODE") {
            Some(value) => match GameMode::from_name(&value) {
                Some(mode) => mode,
                None => bail!("Unknown mode {:?}", value),
            },
            None => GameMode::default(),
        };

        settings.config = GameConfig::new(players, difficulty, mode);

        if let Some(value) = lookup("TRAIL_TIME_LIMIT") {
            let seconds = match value.as_str() {
                "default" => difficulty.default_time_limit(),
                other => other.parse().context("TRAIL_TIME_LIMIT must be a number")?,
            };
            settings.config = settings.config.with_time_limit(seconds);
        }

        if let Some(value) = lookup("TRAIL_SEED") {
            settings.seed = Some(value.parse().context("TRAIL_SEED must be a number")?);
        }

        if let Some(value) = lookup("TRAIL_SPEED") {
            settings.speed = value.parse().context("TRAIL_SPEED must be a number")?;
            if settings.speed == 0 {
                bail!("TRAIL_SPEED must be at least 1");
            }
        }

        settings.interactive = matches!(lookup("TRAIL_INPUT").as_deref(), Some("stdin"));

        settings.config.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(vars: &[(&str, &str)]) -> anyhow::Result<HostSettings> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        HostSettings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = parse(&[]).unwrap();
        assert_eq!(settings, HostSettings::default());
    }

    #[test]
    fn test_full_environment() {
        let settings = parse(&[
            ("TRAIL_PLAYERS", "4"),
            ("TRAIL_DIFFICULTY", "hard"),
            ("TRAIL_MODE", "teams"),
            ("TRAIL_TIME_LIMIT", "default"),
            ("TRAIL_SEED", "42"),
            ("TRAIL_SPEED", "10"),
            ("TRAIL_INPUT", "stdin"),
        ])
        .unwrap();

        assert_eq!(settings.config.player_count, 4);
        assert_eq!(settings.config.difficulty, Difficulty::Hard);
        assert_eq!(settings.config.mode, GameMode::Teams);
        assert_eq!(settings.config.time_limit, Some(45));
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.speed, 10);
        assert!(settings.interactive);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(parse(&[("TRAIL_PLAYERS", "9")]).is_err());
        assert!(parse(&[("TRAIL_PLAYERS", "two")]).is_err());
        assert!(parse(&[("TRAIL_DIFFICULTY", "brutal")]).is_err());
        assert!(parse(&[("TRAIL_SPEED", "0")]).is_err());
        assert!(parse(&[("TRAIL_TIME_LIMIT", "0")]).is_err());
    }
}
