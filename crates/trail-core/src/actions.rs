//! Commands the UI can issue and the events they produce.
//!
//! This module defines all commands a front-end can send to a session and
//! the events that result, either immediately or once a deferred action
//! fires on the session clock.

use crate::board::Cell;
use crate::challenge::{Answer, ChallengeKind, TemplateId};
use crate::config::{GameConfig, GameMode};
use crate::player::{PlayerId, TeamId};
use crate::victory::Winner;
use serde::{Deserialize, Serialize};

/// All commands a front-end can issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "payload", rename_all = "snake_case")]
pub enum GameCommand {
    // ==================== Session ====================
    /// Start a game from the menu's configuration
    StartGame(GameConfig),
    /// Start over with the same configuration
    ResetGame,
    /// Tear everything down and go back to the menu
    ResetToMenu,

    // ==================== Turn ====================
    /// Roll the die for the current player
    RollDice,
    /// Hand the turn to the next player
    NextTurn,

    // ==================== Challenge ====================
    /// Skip the active challenge without any position effect
    CloseChallenge,
    /// Report the outcome of the active challenge
    CompleteChallenge { success: bool },
    /// Submit an answer to be checked against the active challenge
    SubmitAnswer(Answer),
}

/// Events that occur as a result of commands and deferred actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A new game began
    GameStarted {
        player_count: u8,
        mode: GameMode,
        challenge_cells: Vec<Cell>,
    },

    /// The die started tumbling
    DiceRolling { player: PlayerId },

    /// The rolled value became visible
    DiceRevealed { player: PlayerId, value: u8 },

    /// A token moved, by a roll or a bonus advance
    PlayerMoved {
        player: PlayerId,
        from: Cell,
        to: Cell,
    },

    /// A team's derived position changed
    TeamMoved { team: TeamId, position: Cell },

    /// A challenge became active
    ChallengeOpened {
        player: PlayerId,
        cell: Cell,
        template: Option<TemplateId>,
        kind: ChallengeKind,
    },

    /// One countdown step elapsed
    TimerTicked { remaining: u32 },

    /// The countdown reached zero with the challenge unanswered
    ChallengeTimedOut { player: Option<PlayerId> },

    /// The challenge was solved
    ChallengeSucceeded { player: Option<PlayerId> },

    /// The challenge was answered wrongly or ran out of time
    ChallengeFailed { player: Option<PlayerId> },

    /// The challenge was skipped
    ChallengeClosed,

    /// Turn passed to the next player
    TurnAdvanced {
        previous: Option<PlayerId>,
        current: Option<PlayerId>,
    },

    /// Someone reached the goal
    GameWon { winner: Winner },

    /// Whole session torn down
    ReturnedToMenu,
}
