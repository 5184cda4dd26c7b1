use crate::style::CellColor;

/// Sink for per-cell visual updates.
///
/// Implementations must not block: every call is a fire-and-forget push
/// from the control thread.
pub trait DisplaySurface {
    fn set_color(&mut self, x: usize, y: usize, color: CellColor);

    /// Render the cell with its empty style (the "off" blink phase).
    fn clear_color(&mut self, x: usize, y: usize);

    fn set_blink(&mut self, x: usize, y: usize, blink: bool);

    /// Playback progress, 0-100.
    fn set_progress(&mut self, x: usize, y: usize, percent: u8);
}

/// A call received by a [`RecordingSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceCall {
    Color { x: usize, y: usize, color: CellColor },
    Clear { x: usize, y: usize },
    Blink { x: usize, y: usize, blink: bool },
    Progress { x: usize, y: usize, percent: u8 },
}

/// Surface that records every call, for headless use and tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    calls: Vec<SurfaceCall>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    pub fn take(&mut self) -> Vec<SurfaceCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

impl DisplaySurface for RecordingSurface {
    fn set_color(&mut self, x: usize, y: usize, color: CellColor) {
        self.calls.push(SurfaceCall::Color { x, y, color });
    }

    fn clear_color(&mut self, x: usize, y: usize) {
        self.calls.push(SurfaceCall::Clear { x, y });
    }

    fn set_blink(&mut self, x: usize, y: usize, blink: bool) {
        self.calls.push(SurfaceCall::Blink { x, y, blink });
    }

    fn set_progress(&mut self, x: usize, y: usize, percent: u8) {
        self.calls.push(SurfaceCall::Progress { x, y, percent });
    }
}
