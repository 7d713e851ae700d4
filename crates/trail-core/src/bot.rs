//! Automated players.
//!
//! A bot rolls when it is its turn and answers challenges, getting them
//! right with a probability set by its difficulty:
//! - Easy: 50%
//! - Medium: 75%
//! - Hard: 95%

use crate::actions::GameCommand;
use crate::challenge::{Answer, Challenge};
use crate::game::{GamePhase, GameSnapshot, Resolution};
use crate::player::PlayerId;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Bot difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotDifficulty {
    Easy,
    Medium,
    Hard,
}

impl BotDifficulty {
    /// Chance of answering a challenge correctly
    pub fn accuracy(&self) -> f64 {
        match self {
            BotDifficulty::Easy => 0.5,
            BotDifficulty::Medium => 0.75,
            BotDifficulty::Hard => 0.95,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "easy" => Some(BotDifficulty::Easy),
            "medium" => Some(BotDifficulty::Medium),
            "hard" => Some(BotDifficulty::Hard),
            _ => None,
        }
    }
}

/// A bot player that decides on commands
pub struct Bot {
    pub player_id: PlayerId,
    pub difficulty: BotDifficulty,
    rng: StdRng,
}

impl Bot {
    pub fn new(player_id: PlayerId, difficulty: BotDifficulty) -> Self {
        Self {
            player_id,
            difficulty,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(player_id: PlayerId, difficulty: BotDifficulty, seed: u64) -> Self {
        Self {
            player_id,
            difficulty,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Choose the next command, or `None` if it is not this bot's move
    pub fn choose_command(&mut self, game: &GameSnapshot) -> Option<GameCommand> {
        if game.current_player != Some(self.player_id) {
            return None;
        }

        match game.phase {
            GamePhase::AwaitingRoll if !game.dice_rolled => Some(GameCommand::RollDice),
            // out of time, the failure is already on its way
            GamePhase::ChallengeActive if game.time_limit_enabled && game.time_remaining == 0 => {
                None
            }
            GamePhase::ChallengeActive => {
                let challenge = game.current_challenge.as_ref()?;
                Some(GameCommand::SubmitAnswer(self.answer(challenge)))
            }
            // a skipped challenge waits for someone to pass the turn
            GamePhase::Resolving(Resolution::ChallengeOutcome) if game.idle => {
                Some(GameCommand::NextTurn)
            }
            _ => None,
        }
    }

    /// Answer a challenge, correctly or not
    pub fn answer(&mut self, challenge: &Challenge) -> Answer {
        if self.rng.gen_bool(self.difficulty.accuracy()) {
            challenge.solution()
        } else {
            challenge.untouched()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::{ChallengeBody, TemplateId};
    use crate::config::{GameConfig, Timings};
    use crate::game::GameSession;

    fn sequence() -> Challenge {
        Challenge {
            template: Some(TemplateId::NumbersAscending),
            title: "Count up".into(),
            content: "What comes next?".into(),
            body: ChallengeBody::Sequence {
                pattern: vec!["1".into(), "2".into(), "?".into()],
                options: vec!["3".into(), "5".into()],
                solution: "3".into(),
            },
        }
    }

    #[test]
    fn test_bot_creation() {
        let bot = Bot::new(0, BotDifficulty::Easy);
        assert_eq!(bot.player_id, 0);
        assert_eq!(bot.difficulty, BotDifficulty::Easy);
    }

    #[test]
    fn test_bot_waits_for_its_turn() {
        let mut game = GameSession::with_seed(3).with_timings(Timings::instant());
        game.start_game(GameConfig::default()).unwrap();

        let mut first = Bot::with_seed(0, BotDifficulty::Easy, 1);
        let mut second = Bot::with_seed(1, BotDifficulty::Easy, 1);

        let snapshot = game.snapshot();
        assert_eq!(first.choose_command(&snapshot), Some(GameCommand::RollDice));
        assert_eq!(second.choose_command(&snapshot), None);

        game.roll_dice().unwrap();
        assert_eq!(first.choose_command(&game.snapshot()), None);
    }

    #[test]
    fn test_bot_passes_turn_after_skip() {
        let mut game = GameSession::with_seed(3).with_timings(Timings::instant());
        game.start_game_on(
            GameConfig::default(),
            crate::board::BoardLayout::from_parts([3], [(3, TemplateId::Vowels)]),
        )
        .unwrap();
        game.move_player(3).unwrap();
        game.run_until_idle();
        game.close_challenge();

        let mut bot = Bot::with_seed(0, BotDifficulty::Hard, 5);
        assert_eq!(bot.choose_command(&game.snapshot()), Some(GameCommand::NextTurn));
    }

    #[test]
    fn test_bot_stops_answering_when_time_is_up() {
        let timings = Timings {
            timeout_notice_ms: 500,
            ..Timings::instant()
        };
        let mut game = GameSession::with_seed(3).with_timings(timings);
        game.start_game_on(
            GameConfig::default().with_time_limit(1),
            crate::board::BoardLayout::from_parts([3], [(3, TemplateId::Vowels)]),
        )
        .unwrap();
        game.move_player(3).unwrap();
        game.run_until_idle();

        let mut bot = Bot::with_seed(0, BotDifficulty::Hard, 5);
        assert!(matches!(
            bot.choose_command(&game.snapshot()),
            Some(GameCommand::SubmitAnswer(_))
        ));

        game.advance(1000);
        assert_eq!(game.phase(), GamePhase::ChallengeActive);
        assert_eq!(bot.choose_command(&game.snapshot()), None);
    }

    #[test]
    fn test_accuracy_tracks_difficulty() {
        let challenge = sequence();
        let mut hard = Bot::with_seed(0, BotDifficulty::Hard, 99);
        let mut easy = Bot::with_seed(0, BotDifficulty::Easy, 99);

        let hard_correct = (0..1000)
            .filter(|_| challenge.check(&hard.answer(&challenge)))
            .count();
        let easy_correct = (0..1000)
            .filter(|_| challenge.check(&easy.answer(&challenge)))
            .count();

        assert!(hard_correct > 900, "hard bot got {}", hard_correct);
        assert!((400..600).contains(&easy_correct), "easy bot got {}", easy_correct);
    }

    #[test]
    fn test_difficulty_names() {
        assert_eq!(BotDifficulty::from_name("HARD"), Some(BotDifficulty::Hard));
        assert_eq!(BotDifficulty::from_name("nope"), None);
    }
}
