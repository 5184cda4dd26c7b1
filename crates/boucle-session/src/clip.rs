use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, Ordering};

use parking_lot::RwLock;

use crate::engine::BEATS_PER_BAR;
use crate::CellCoord;

/// Transport state of a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ClipState {
    Stop = 0,
    Starting = 1,
    Start = 2,
    Stopping = 3,
}

impl ClipState {
    pub const ALL: [ClipState; 4] = [
        ClipState::Stop,
        ClipState::Starting,
        ClipState::Start,
        ClipState::Stopping,
    ];

    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(ClipState::Stop),
            1 => Some(ClipState::Starting),
            2 => Some(ClipState::Start),
            3 => Some(ClipState::Stopping),
            _ => None,
        }
    }

    /// State requested by a toggle command. A pending transition is cancelled.
    pub fn toggled(self) -> Self {
        match self {
            ClipState::Stop => ClipState::Starting,
            ClipState::Starting => ClipState::Stop,
            ClipState::Start => ClipState::Stopping,
            ClipState::Stopping => ClipState::Start,
        }
    }

    /// State reached once the next loop boundary is crossed.
    pub fn settled(self) -> Self {
        match self {
            ClipState::Starting => ClipState::Start,
            ClipState::Stopping => ClipState::Stop,
            other => other,
        }
    }

    /// Waiting for a loop boundary.
    pub fn is_pending(self) -> bool {
        matches!(self, ClipState::Starting | ClipState::Stopping)
    }

    /// Audible: a stopping clip keeps playing until the boundary.
    pub fn is_playing(self) -> bool {
        matches!(self, ClipState::Start | ClipState::Stopping)
    }
}

/// A loop bound to one grid cell.
///
/// `state`, `length` and `last_offset` are written by the engine thread and
/// read by the front-ends without locking. No ordering is guaranteed between
/// fields; a progress read may see an offset from a different block than the
/// state.
#[derive(Debug)]
pub struct Clip {
    x: usize,
    y: usize,
    state: AtomicU8,
    length: AtomicU64,
    last_offset: AtomicU64,
    beat_divisor: AtomicU32,
    beat_offset: AtomicU32,
    frame_offset: AtomicU64,
    name: RwLock<String>,
}

impl Clip {
    pub fn new(name: impl Into<String>, x: usize, y: usize, length: u64) -> Self {
        Self {
            x,
            y,
            state: AtomicU8::new(ClipState::Stop as u8),
            length: AtomicU64::new(length),
            last_offset: AtomicU64::new(0),
            beat_divisor: AtomicU32::new(BEATS_PER_BAR),
            beat_offset: AtomicU32::new(0),
            frame_offset: AtomicU64::new(0),
            name: RwLock::new(name.into()),
        }
    }

    pub fn x(&self) -> usize {
        self.x
    }

    pub fn y(&self) -> usize {
        self.y
    }

    pub fn coord(&self) -> CellCoord {
        (self.x, self.y)
    }

    pub fn state(&self) -> ClipState {
        ClipState::from_u8(self.state.load(Ordering::Relaxed)).unwrap_or(ClipState::Stop)
    }

    /// Engine side only.
    pub fn set_state(&self, state: ClipState) {
        self.state.store(state as u8, Ordering::Relaxed);
    }

    /// Length in frames.
    pub fn length(&self) -> u64 {
        self.length.load(Ordering::Relaxed)
    }

    pub fn set_length(&self, length: u64) {
        self.length.store(length, Ordering::Relaxed);
    }

    /// Playback position in frames, `<= length` while playing.
    pub fn last_offset(&self) -> u64 {
        self.last_offset.load(Ordering::Relaxed)
    }

    pub fn set_last_offset(&self, offset: u64) {
        self.last_offset.store(offset, Ordering::Relaxed);
    }

    /// Beats between two launch points. Defaults to one bar.
    pub fn beat_divisor(&self) -> u32 {
        self.beat_divisor.load(Ordering::Relaxed)
    }

    /// Values below one beat are raised to one.
    pub fn set_beat_divisor(&self, beats: u32) {
        self.beat_divisor.store(beats.max(1), Ordering::Relaxed);
    }

    /// Whole beats the launch points are shifted by.
    pub fn beat_offset(&self) -> u32 {
        self.beat_offset.load(Ordering::Relaxed)
    }

    pub fn set_beat_offset(&self, beats: u32) {
        self.beat_offset.store(beats, Ordering::Relaxed);
    }

    /// Extra shift of the launch points in frames, on top of `beat_offset`.
    pub fn frame_offset(&self) -> u64 {
        self.frame_offset.load(Ordering::Relaxed)
    }

    pub fn set_frame_offset(&self, frames: u64) {
        self.frame_offset.store(frames, Ordering::Relaxed);
    }

    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.write() = name.into();
    }
}
