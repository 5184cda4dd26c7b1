use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;
use tracing::debug;

use crate::clip::Clip;

/// Command queued for the loop engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SongCommand {
    Toggle { x: usize, y: usize },
}

/// Errors raised while addressing the clip grid.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfGrid {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    #[error("no clip assigned to cell ({x}, {y})")]
    EmptyCell { x: usize, y: usize },
    #[error("loop engine is no longer receiving commands")]
    EngineDisconnected,
}

/// Grid of clips plus the command queue feeding the engine.
///
/// Every clip in `clips` is also reachable through the matrix at its own
/// coordinate, and every occupied matrix cell appears in `clips`.
#[derive(Debug)]
pub struct Song {
    width: usize,
    height: usize,
    clips: Vec<Arc<Clip>>,
    matrix: Vec<Option<Arc<Clip>>>,
    commands: Sender<SongCommand>,
}

impl Song {
    /// Create an empty song and the receiving end of its command queue.
    pub fn new(width: usize, height: usize) -> (Self, Receiver<SongCommand>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self::with_sender(width, height, tx), rx)
    }

    pub fn with_sender(width: usize, height: usize, commands: Sender<SongCommand>) -> Self {
        Self {
            width,
            height,
            clips: Vec::new(),
            matrix: vec![None; width * height],
            commands,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    pub fn clips(&self) -> impl Iterator<Item = &Arc<Clip>> + '_ {
        self.clips.iter()
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    pub fn clip_at(&self, x: usize, y: usize) -> Option<&Arc<Clip>> {
        self.index(x, y).and_then(|index| self.matrix[index].as_ref())
    }

    /// Assign a clip to its cell, replacing whatever clip was there.
    pub fn add_clip(&mut self, clip: Clip) -> Result<Arc<Clip>, SessionError> {
        let (x, y) = clip.coord();
        let index = self.checked_index(x, y)?;
        let clip = Arc::new(clip);
        if let Some(previous) = self.matrix[index].replace(Arc::clone(&clip)) {
            self.clips.retain(|existing| !Arc::ptr_eq(existing, &previous));
            debug!(x, y, name = %previous.name(), "replaced clip");
        }
        self.clips.push(Arc::clone(&clip));
        Ok(clip)
    }

    pub fn remove_clip(&mut self, x: usize, y: usize) -> Option<Arc<Clip>> {
        let index = self.index(x, y)?;
        let removed = self.matrix[index].take()?;
        self.clips.retain(|existing| !Arc::ptr_eq(existing, &removed));
        Some(removed)
    }

    /// Ask the engine to toggle the clip at `(x, y)`.
    ///
    /// The clip state is not changed here; the engine applies the command on
    /// its next cycle.
    pub fn toggle(&self, x: usize, y: usize) -> Result<(), SessionError> {
        let index = self.checked_index(x, y)?;
        if self.matrix[index].is_none() {
            return Err(SessionError::EmptyCell { x, y });
        }
        self.commands
            .send(SongCommand::Toggle { x, y })
            .map_err(|_| SessionError::EngineDisconnected)
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        self.contains(x, y).then(|| x * self.height + y)
    }

    fn checked_index(&self, x: usize, y: usize) -> Result<usize, SessionError> {
        self.index(x, y).ok_or(SessionError::OutOfGrid {
            x,
            y,
            width: self.width,
            height: self.height,
        })
    }
}
