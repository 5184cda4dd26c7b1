use boucle_session::ClipState;

use crate::grid::Grid;

/// Last state each cell was rendered with, for one consumer.
///
/// Cells start out as `None`, which never equals a real state, so the first
/// observation of every cell counts as a change. Never share an instance
/// between consumers: each front-end may be out of phase with the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffCache {
    states: Grid<Option<ClipState>>,
}

impl DiffCache {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            states: Grid::new(width, height, None),
        }
    }

    pub fn width(&self) -> usize {
        self.states.width()
    }

    pub fn height(&self) -> usize {
        self.states.height()
    }

    /// Record `state` for `(x, y)` and report whether it differs from the
    /// cached value. Coordinates outside the cache never change.
    pub fn observe(&mut self, x: usize, y: usize, state: ClipState) -> bool {
        let Some(cached) = self.states.get_mut(x, y) else {
            return false;
        };
        if *cached == Some(state) {
            return false;
        }
        *cached = Some(state);
        true
    }

    /// State last observed at `(x, y)`, `None` if nothing was recorded.
    pub fn last(&self, x: usize, y: usize) -> Option<ClipState> {
        self.states.get(x, y).copied().flatten()
    }

    /// Force the next observation of `(x, y)` to count as a change.
    pub fn forget(&mut self, x: usize, y: usize) {
        if let Some(cached) = self.states.get_mut(x, y) {
            *cached = None;
        }
    }

    /// Forget every cell.
    pub fn reset(&mut self) {
        self.states.fill(None);
    }
}
