//! Clip grid shared between the loop engine and the Boucle front-ends.
//!
//! The engine is the only writer of clip transport state and playback
//! offset. Front-ends read those fields as relaxed snapshots and request
//! changes through [`Song::toggle`], which queues a [`SongCommand`] for the
//! engine instead of touching the clip directly.

pub mod clip;
pub mod engine;
pub mod song;

pub use clip::{Clip, ClipState};
pub use engine::{LoopEngine, BEATS_PER_BAR};
pub use song::{SessionError, Song, SongCommand};

/// Grid coordinate of a cell, `(x, y)`.
pub type CellCoord = (usize, usize);
