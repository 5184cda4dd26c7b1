//! Keeps front-ends in step with clip transport state.
//!
//! Each consumer owns its own [`DiffCache`] and only pushes updates on
//! actual state transitions. Periodic work (blinking, progress) runs on
//! owned [`PeriodicTimer`]s that the caller advances explicitly, so nothing
//! here reads the wall clock or blocks.

pub mod blink;
pub mod commands;
pub mod diff;
pub mod grid;
pub mod progress;
pub mod style;
pub mod surface;
pub mod synchronizer;
pub mod timer;

pub use blink::{BlinkScheduler, CellAttrs, DEFAULT_BLINK_PERIOD};
pub use commands::{route_cell_command, CellAction, CellCommand};
pub use diff::DiffCache;
pub use grid::Grid;
pub use progress::{ProgressPoller, DEFAULT_PROGRESS_PERIOD};
pub use style::{cell_style, CellColor, CellStyle};
pub use surface::{DisplaySurface, RecordingSurface, SurfaceCall};
pub use synchronizer::GridSynchronizer;
pub use timer::{PeriodicTimer, MAX_CATCH_UP};
