use boucle_sync::{CellColor, DisplaySurface};
use tracing::{info, trace};

/// Surface that renders the grid as log lines.
#[derive(Debug, Default)]
pub struct LogSurface {
    updates: u64,
}

impl LogSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of calls received so far.
    pub fn updates(&self) -> u64 {
        self.updates
    }
}

impl DisplaySurface for LogSurface {
    fn set_color(&mut self, x: usize, y: usize, color: CellColor) {
        self.updates += 1;
        let [r, g, b] = color.rgb();
        info!(x, y, ?color, rgb = format_args!("#{r:02x}{g:02x}{b:02x}"), "cell color");
    }

    fn clear_color(&mut self, x: usize, y: usize) {
        self.updates += 1;
        trace!(x, y, "cell cleared");
    }

    fn set_blink(&mut self, x: usize, y: usize, blink: bool) {
        self.updates += 1;
        info!(x, y, blink, "cell blink");
    }

    fn set_progress(&mut self, x: usize, y: usize, percent: u8) {
        self.updates += 1;
        trace!(x, y, percent, "cell progress");
    }
}
