use std::time::Duration;

use boucle_session::{Clip, Song};

use crate::surface::DisplaySurface;
use crate::timer::PeriodicTimer;

pub const DEFAULT_PROGRESS_PERIOD: Duration = Duration::from_millis(100);

/// Samples playback position of every clip on a fixed period.
///
/// Progress is pushed unconditionally on each tick: it changes continuously
/// while a clip plays, so there is nothing to diff against.
#[derive(Debug, Clone)]
pub struct ProgressPoller {
    timer: PeriodicTimer,
}

impl Default for ProgressPoller {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_PERIOD)
    }
}

impl ProgressPoller {
    /// Create a poller that is already running.
    pub fn new(period: Duration) -> Self {
        let mut timer = PeriodicTimer::new(period);
        timer.start();
        Self { timer }
    }

    pub fn is_active(&self) -> bool {
        self.timer.is_active()
    }

    pub fn start(&mut self) {
        self.timer.start();
    }

    pub fn stop(&mut self) {
        self.timer.stop();
    }

    /// Playback position as a percentage, `None` for zero-length clips.
    pub fn progress(clip: &Clip) -> Option<u8> {
        let length = clip.length();
        if length == 0 {
            return None;
        }
        let ratio = clip.last_offset() as f64 / length as f64;
        Some((ratio * 100.0).clamp(0.0, 100.0) as u8)
    }

    /// Push progress for every occupied cell. Returns the number of cells
    /// updated.
    pub fn tick(&self, song: &Song, surface: &mut dyn DisplaySurface) -> usize {
        let mut updated = 0;
        for x in 0..song.width() {
            for y in 0..song.height() {
                let Some(percent) = song.clip_at(x, y).and_then(|clip| Self::progress(clip))
                else {
                    continue;
                };
                surface.set_progress(x, y, percent);
                updated += 1;
            }
        }
        updated
    }

    /// Feed elapsed time. Several elapsed periods collapse into one tick
    /// since only the latest position matters.
    pub fn advance(
        &mut self,
        elapsed: Duration,
        song: &Song,
        surface: &mut dyn DisplaySurface,
    ) -> usize {
        if self.timer.advance(elapsed) == 0 {
            return 0;
        }
        self.tick(song, surface)
    }
}
