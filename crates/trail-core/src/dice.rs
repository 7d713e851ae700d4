//! The six-sided die.

use crate::config::DIE_FACES;
use rand::{Rng, RngCore};
use std::collections::VecDeque;

/// Source of die values
pub trait Dice {
    /// Roll once. A correct die returns a value in `1..=DIE_FACES`.
    fn roll(&mut self, rng: &mut dyn RngCore) -> u8;
}

/// Uniform die driven by the session's random source
#[derive(Debug, Clone, Copy, Default)]
pub struct FairDie;

impl Dice for FairDie {
    fn roll(&mut self, rng: &mut dyn RngCore) -> u8 {
        rng.gen_range(1..=DIE_FACES)
    }
}

/// Die that plays back a fixed script, then rolls fairly.
///
/// Values are returned as given, including out-of-range ones, so a faulty
/// die can be simulated.
#[derive(Debug, Clone, Default)]
pub struct LoadedDice {
    script: VecDeque<u8>,
}

impl LoadedDice {
    pub fn new(script: impl IntoIterator<Item = u8>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    /// Queue more values
    pub fn push(&mut self, value: u8) {
        self.script.push_back(value);
    }

    /// Scripted values not yet rolled
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Dice for LoadedDice {
    fn roll(&mut self, rng: &mut dyn RngCore) -> u8 {
        match self.script.pop_front() {
            Some(value) => value,
            None => FairDie.roll(rng),
        }
    }
}
