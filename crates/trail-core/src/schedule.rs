//! Deferred actions on a virtual clock.
//!
//! Every suspension point of a turn (die tumbling, token animation,
//! challenge settle, countdown tick) is an entry in this queue rather than
//! a free-running timer. Each entry has a [`DeferredKind`]; scheduling an
//! action replaces any pending action of the same kind, so a superseded
//! callback can never fire.

use crate::board::Cell;
use serde::{Deserialize, Serialize};

/// Milliseconds on the session's virtual clock
pub type Millis = u64;

/// What a settle delay leads to once it elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FollowUp {
    /// Hand the turn to the next player
    AdvanceTurn,
    /// Open the challenge bound to this cell
    OpenChallenge(Cell),
}

/// An action waiting for its delay to elapse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Deferred {
    /// Show the rolled value
    RevealRoll { value: u8 },
    /// Move the current player by the revealed value
    StartMove { steps: u8 },
    /// Token animation finished
    SettleMove(FollowUp),
    /// Challenge outcome animation finished
    SettleChallenge(FollowUp),
    /// Time-up notice shown, run the failure path
    ExpireChallenge,
    /// One countdown step
    TimerTick,
}

/// Cancellation class of a deferred action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeferredKind {
    RollReveal,
    MoveStart,
    MoveSettle,
    ChallengeSettle,
    TimeoutNotice,
    TimerTick,
}

impl DeferredKind {
    /// Kinds that belong to a single turn and die with it
    pub const TURN_SCOPED: [DeferredKind; 4] = [
        DeferredKind::RollReveal,
        DeferredKind::MoveStart,
        DeferredKind::MoveSettle,
        DeferredKind::ChallengeSettle,
    ];
}

impl Deferred {
    pub fn kind(&self) -> DeferredKind {
        match self {
            Deferred::RevealRoll { .. } => DeferredKind::RollReveal,
            Deferred::StartMove { .. } => DeferredKind::MoveStart,
            Deferred::SettleMove(_) => DeferredKind::MoveSettle,
            Deferred::SettleChallenge(_) => DeferredKind::ChallengeSettle,
            Deferred::ExpireChallenge => DeferredKind::TimeoutNotice,
            Deferred::TimerTick => DeferredKind::TimerTick,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Scheduled {
    due: Millis,
    /// Insertion order, breaks ties between equal due times
    seq: u64,
    action: Deferred,
}

/// Queue of pending deferred actions, at most one per kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    now: Millis,
    next_seq: u64,
    pending: Vec<Scheduled>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Millis {
        self.now
    }

    /// Schedule an action `delay` from now, replacing any pending action
    /// of the same kind
    pub fn schedule(&mut self, action: Deferred, delay: Millis) {
        self.cancel(action.kind());
        self.pending.push(Scheduled {
            due: self.now.saturating_add(delay),
            seq: self.next_seq,
            action,
        });
        self.next_seq += 1;
    }

    /// Drop the pending action of a kind, returning whether one existed
    pub fn cancel(&mut self, kind: DeferredKind) -> bool {
        let before = self.pending.len();
        self.pending.retain(|s| s.action.kind() != kind);
        before != self.pending.len()
    }

    /// Drop every pending action. The clock keeps its time.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, kind: DeferredKind) -> bool {
        self.pending.iter().any(|s| s.action.kind() == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Kinds currently waiting, earliest first
    pub fn pending_kinds(&self) -> Vec<DeferredKind> {
        let mut entries: Vec<_> = self.pending.iter().collect();
        entries.sort_by_key(|s| (s.due, s.seq));
        entries.into_iter().map(|s| s.action.kind()).collect()
    }

    /// Due time of the earliest pending action not of `except` kind
    pub fn next_due_except(&self, except: DeferredKind) -> Option<Millis> {
        self.pending
            .iter()
            .filter(|s| s.action.kind() != except)
            .map(|s| s.due)
            .min()
    }

    /// Remove and return the earliest action due at or before `until`,
    /// moving the clock to its due time
    pub fn pop_due(&mut self, until: Millis) -> Option<Deferred> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due <= until)
            .min_by_key(|(_, s)| (s.due, s.seq))
            .map(|(i, _)| i)?;

        let scheduled = self.pending.swap_remove(index);
        self.now = self.now.max(scheduled.due);
        Some(scheduled.action)
    }

    /// Move the clock forward to `to` (never backwards)
    pub fn advance_to(&mut self, to: Millis) {
        self.now = self.now.max(to);
    }
}
