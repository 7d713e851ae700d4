//! The linear track and its challenge cells.
//!
//! The layout is drawn once at game start: a fixed number of distinct
//! interior cells, each bound to one template for the rest of the session.

use crate::challenge::{ChallengeProvider, TemplateId};
use crate::config::{BOARD_SIZE, CHALLENGE_CELL_COUNT};
use rand::seq::SliceRandom;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cell index on the track
pub type Cell = usize;

/// Where the challenges are and which template each one is bound to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardLayout {
    size: usize,
    /// Sorted ascending
    challenge_cells: Vec<Cell>,
    bindings: BTreeMap<Cell, TemplateId>,
}

impl BoardLayout {
    /// Draw challenge cells and bind templates to them.
    ///
    /// Cells are drawn without replacement from the interior and sorted;
    /// templates are bound to them in draw order.
    pub fn generate(provider: &dyn ChallengeProvider, rng: &mut dyn RngCore) -> Self {
        let mut interior: Vec<Cell> = (1..BOARD_SIZE - 1).collect();
        interior.shuffle(rng);
        interior.truncate(CHALLENGE_CELL_COUNT);
        interior.sort_unstable();

        let templates = provider.select_templates(interior.len(), rng);
        let bindings = interior.iter().copied().zip(templates).collect();

        Self {
            size: BOARD_SIZE,
            challenge_cells: interior,
            bindings,
        }
    }

    /// Build a layout from explicit parts.
    ///
    /// Cells outside the interior are dropped; a cell may be left without
    /// a binding, in which case landing on it uses the random fallback.
    pub fn from_parts(
        cells: impl IntoIterator<Item = Cell>,
        bindings: impl IntoIterator<Item = (Cell, TemplateId)>,
    ) -> Self {
        let mut challenge_cells: Vec<Cell> = cells
            .into_iter()
            .filter(|c| *c > 0 && *c < BOARD_SIZE - 1)
            .collect();
        challenge_cells.sort_unstable();
        challenge_cells.dedup();

        let bindings = bindings
            .into_iter()
            .filter(|(cell, _)| challenge_cells.contains(cell))
            .collect();

        Self {
            size: BOARD_SIZE,
            challenge_cells,
            bindings,
        }
    }

    /// Number of cells on the track
    pub fn size(&self) -> usize {
        self.size
    }

    /// The goal cell
    pub fn goal(&self) -> Cell {
        self.size.saturating_sub(1)
    }

    /// Challenge cells in ascending order
    pub fn challenge_cells(&self) -> &[Cell] {
        &self.challenge_cells
    }

    /// Whether landing here opens a challenge
    pub fn is_challenge_cell(&self, cell: Cell) -> bool {
        cell > 0 && cell < self.goal() && self.challenge_cells.binary_search(&cell).is_ok()
    }

    /// Template bound to a cell
    pub fn template_at(&self, cell: Cell) -> Option<TemplateId> {
        self.bindings.get(&cell).copied()
    }

    /// Move forward, never past the goal
    pub fn advance(&self, from: Cell, steps: usize) -> Cell {
        from.saturating_add(steps).min(self.goal())
    }
}

impl Default for BoardLayout {
    /// A track with no challenge cells
    fn default() -> Self {
        Self::from_parts(Vec::new(), Vec::new())
    }
}
