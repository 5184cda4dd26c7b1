use std::time::Duration;

use tracing::trace;

use crate::grid::Grid;
use crate::style::CellColor;
use crate::surface::DisplaySurface;
use crate::timer::PeriodicTimer;

pub const DEFAULT_BLINK_PERIOD: Duration = Duration::from_millis(200);

/// Transient per-cell attributes owned by the grid synchronizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellAttrs {
    pub blinking: bool,
    pub color: Option<CellColor>,
}

/// Whether any cell in the grid is flagged as blinking.
pub fn any_blinking(cells: &Grid<CellAttrs>) -> bool {
    cells.iter().any(|(_, cell)| cell.blinking)
}

/// One timer shared by every blinking cell.
///
/// Each tick draws blinking cells with their stored color when `phase` is
/// set, or with the empty style otherwise, then flips `phase`.
#[derive(Debug, Clone)]
pub struct BlinkScheduler {
    timer: PeriodicTimer,
    phase: bool,
}

impl Default for BlinkScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_BLINK_PERIOD)
    }
}

impl BlinkScheduler {
    /// Create a stopped scheduler.
    pub fn new(period: Duration) -> Self {
        Self {
            timer: PeriodicTimer::new(period),
            phase: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.timer.is_active()
    }

    pub fn phase(&self) -> bool {
        self.phase
    }

    pub fn period(&self) -> Duration {
        self.timer.period()
    }

    /// Start blinking. No-op while already running.
    pub fn start(&mut self) {
        if !self.timer.is_active() {
            self.phase = false;
            self.timer.start();
            trace!("blink scheduler started");
        }
    }

    /// Stop the scheduler if no cell is blinking, scanning the whole grid.
    /// Returns whether the scheduler is stopped afterwards.
    pub fn stop(&mut self, cells: &Grid<CellAttrs>) -> bool {
        if !self.timer.is_active() {
            return true;
        }
        if any_blinking(cells) {
            return false;
        }
        self.timer.stop();
        trace!("blink scheduler stopped");
        true
    }

    pub fn tick(&mut self, cells: &Grid<CellAttrs>, surface: &mut dyn DisplaySurface) {
        for ((x, y), cell) in cells.iter() {
            if !cell.blinking {
                continue;
            }
            match (self.phase, cell.color) {
                (true, Some(color)) => surface.set_color(x, y, color),
                _ => surface.clear_color(x, y),
            }
        }
        self.phase = !self.phase;
    }

    /// Feed elapsed time, running one tick per completed period.
    pub fn advance(
        &mut self,
        elapsed: Duration,
        cells: &Grid<CellAttrs>,
        surface: &mut dyn DisplaySurface,
    ) -> u32 {
        let fired = self.timer.advance(elapsed);
        for _ in 0..fired {
            self.tick(cells, surface);
        }
        fired
    }
}
