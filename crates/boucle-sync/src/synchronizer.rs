use std::time::Duration;

use boucle_session::Song;
use tracing::debug;

use crate::blink::{BlinkScheduler, CellAttrs};
use crate::diff::DiffCache;
use crate::grid::Grid;
use crate::style::{cell_style, CellStyle};
use crate::surface::DisplaySurface;

/// Drives the on-screen grid from clip transport state.
///
/// The surface is only touched when a cell's state actually changed since
/// the last pass; polling faster than the engine changes state costs a
/// comparison per clip and nothing else.
#[derive(Debug, Clone)]
pub struct GridSynchronizer {
    cache: DiffCache,
    cells: Grid<CellAttrs>,
    blink: BlinkScheduler,
}

impl GridSynchronizer {
    /// Synchronizer for a `width × height` grid. Nothing is painted until the
    /// first [`GridSynchronizer::synchronize`].
    pub fn new(width: usize, height: usize, blink: BlinkScheduler) -> Self {
        Self {
            cache: DiffCache::new(width, height),
            cells: Grid::new(width, height, CellAttrs::default()),
            blink,
        }
    }

    /// Synchronizer sized to `song`.
    pub fn for_song(song: &Song, blink: BlinkScheduler) -> Self {
        Self::new(song.width(), song.height(), blink)
    }

    /// Rebind to a freshly loaded song: every cell is repainted on the next
    /// pass.
    pub fn bind(&mut self, song: &Song) {
        self.cache = DiffCache::new(song.width(), song.height());
        self.cells = Grid::new(song.width(), song.height(), CellAttrs::default());
        self.blink.stop(&self.cells);
    }

    /// Repaint `(x, y)` on the next pass, e.g. after its clip was replaced.
    pub fn invalidate(&mut self, x: usize, y: usize) {
        self.cache.forget(x, y);
    }

    /// Push style changes for every cell whose state moved, row-major.
    /// A cell whose clip was removed is cleared once. Returns the number of
    /// cells restyled.
    pub fn synchronize(&mut self, song: &Song, surface: &mut dyn DisplaySurface) -> usize {
        let width = song.width().min(self.cache.width());
        let height = song.height().min(self.cache.height());
        let mut updated = 0;
        for x in 0..width {
            for y in 0..height {
                let Some(clip) = song.clip_at(x, y) else {
                    if self.cache.last(x, y).is_some() {
                        debug!(x, y, "grid cell emptied");
                        self.clear_cell(x, y, surface);
                        updated += 1;
                    }
                    continue;
                };
                let state = clip.state();
                if !self.cache.observe(x, y, state) {
                    continue;
                }
                debug!(x, y, ?state, "grid cell changed");
                self.apply_style(x, y, cell_style(state), surface);
                updated += 1;
            }
        }
        updated
    }

    fn clear_cell(&mut self, x: usize, y: usize, surface: &mut dyn DisplaySurface) {
        self.cache.forget(x, y);
        if let Some(cell) = self.cells.get_mut(x, y) {
            *cell = CellAttrs::default();
        }
        surface.clear_color(x, y);
        surface.set_blink(x, y, false);
        if self.blink.is_active() {
            self.blink.stop(&self.cells);
        }
    }

    fn apply_style(
        &mut self,
        x: usize,
        y: usize,
        style: CellStyle,
        surface: &mut dyn DisplaySurface,
    ) {
        let Some(cell) = self.cells.get_mut(x, y) else {
            return;
        };
        cell.color = Some(style.color);
        cell.blinking = style.blink;
        surface.set_color(x, y, style.color);
        surface.set_blink(x, y, style.blink);

        if style.blink {
            self.blink.start();
        } else if self.blink.is_active() {
            self.blink.stop(&self.cells);
        }
    }

    /// Run one blink tick now, regardless of the timer.
    pub fn tick_blink(&mut self, surface: &mut dyn DisplaySurface) {
        self.blink.tick(&self.cells, surface);
    }

    /// Feed elapsed time to the blink timer. Returns the ticks run.
    pub fn advance_blink(&mut self, elapsed: Duration, surface: &mut dyn DisplaySurface) -> u32 {
        self.blink.advance(elapsed, &self.cells, surface)
    }

    pub fn blink_scheduler(&self) -> &BlinkScheduler {
        &self.blink
    }

    /// Current attributes of `(x, y)`.
    pub fn cell(&self, x: usize, y: usize) -> Option<&CellAttrs> {
        self.cells.get(x, y)
    }
}

#[cfg(test)]
mod tests {
    use boucle_session::{Clip, ClipState};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::style::CellColor;
    use crate::surface::{RecordingSurface, SurfaceCall};

    fn song_with_stopped_clips() -> Song {
        let (mut song, _rx) = Song::new(3, 3);
        for x in 0..3 {
            for y in 0..3 {
                song.add_clip(Clip::new(format!("{x}/{y}"), x, y, 100)).unwrap();
            }
        }
        song
    }

    #[test]
    fn first_pass_paints_every_clip_then_goes_quiet() {
        let song = song_with_stopped_clips();
        let mut sync = GridSynchronizer::for_song(&song, BlinkScheduler::default());
        let mut surface = RecordingSurface::new();
        assert_eq!(sync.synchronize(&song, &mut surface), 9);
        surface.take();
        assert_eq!(sync.synchronize(&song, &mut surface), 0);
        assert!(surface.is_empty());
    }

    #[test]
    fn state_change_pushes_color_and_blink() {
        let song = song_with_stopped_clips();
        let mut sync = GridSynchronizer::for_song(&song, BlinkScheduler::default());
        let mut surface = RecordingSurface::new();
        sync.synchronize(&song, &mut surface);
        surface.take();

        song.clip_at(1, 2).unwrap().set_state(ClipState::Starting);
        assert_eq!(sync.synchronize(&song, &mut surface), 1);
        assert_eq!(
            surface.take(),
            vec![
                SurfaceCall::Color {
                    x: 1,
                    y: 2,
                    color: CellColor::Green
                },
                SurfaceCall::Blink {
                    x: 1,
                    y: 2,
                    blink: true
                },
            ]
        );
        assert_eq!(
            sync.cell(1, 2),
            Some(&CellAttrs {
                blinking: true,
                color: Some(CellColor::Green)
            })
        );
    }

    #[test]
    fn blink_scheduler_follows_blinking_cells() {
        let song = song_with_stopped_clips();
        let mut sync = GridSynchronizer::for_song(&song, BlinkScheduler::default());
        let mut surface = RecordingSurface::new();
        sync.synchronize(&song, &mut surface);
        assert!(!sync.blink_scheduler().is_active());

        let clip = song.clip_at(0, 0).unwrap();
        clip.set_state(ClipState::Starting);
        sync.synchronize(&song, &mut surface);
        assert!(sync.blink_scheduler().is_active());

        clip.set_state(ClipState::Start);
        sync.synchronize(&song, &mut surface);
        assert!(!sync.blink_scheduler().is_active());
    }

    #[test]
    fn scheduler_keeps_running_while_another_cell_blinks() {
        let song = song_with_stopped_clips();
        let mut sync = GridSynchronizer::for_song(&song, BlinkScheduler::default());
        let mut surface = RecordingSurface::new();
        song.clip_at(0, 0).unwrap().set_state(ClipState::Starting);
        song.clip_at(2, 2).unwrap().set_state(ClipState::Stopping);
        sync.synchronize(&song, &mut surface);

        song.clip_at(0, 0).unwrap().set_state(ClipState::Start);
        sync.synchronize(&song, &mut surface);
        assert!(sync.blink_scheduler().is_active());

        surface.take();
        sync.tick_blink(&mut surface);
        assert_eq!(surface.take(), vec![SurfaceCall::Clear { x: 2, y: 2 }]);
    }

    #[test]
    fn bind_repaints_a_new_song() {
        let song = song_with_stopped_clips();
        let mut sync = GridSynchronizer::for_song(&song, BlinkScheduler::default());
        let mut surface = RecordingSurface::new();
        sync.synchronize(&song, &mut surface);

        let (mut other, _rx) = Song::new(2, 1);
        other.add_clip(Clip::new("x", 1, 0, 10)).unwrap();
        sync.bind(&other);
        assert_eq!(sync.synchronize(&other, &mut surface), 1);
        assert!(sync.cell(2, 2).is_none());
    }

    #[test]
    fn removing_a_blinking_clip_clears_its_cell() {
        let mut song = song_with_stopped_clips();
        let mut sync = GridSynchronizer::for_song(&song, BlinkScheduler::default());
        let mut surface = RecordingSurface::new();
        song.clip_at(0, 0).unwrap().set_state(ClipState::Starting);
        sync.synchronize(&song, &mut surface);
        assert!(sync.blink_scheduler().is_active());

        song.remove_clip(0, 0);
        surface.take();
        assert_eq!(sync.synchronize(&song, &mut surface), 1);
        assert_eq!(
            surface.take(),
            vec![
                SurfaceCall::Clear { x: 0, y: 0 },
                SurfaceCall::Blink {
                    x: 0,
                    y: 0,
                    blink: false
                },
            ]
        );
        assert_eq!(sync.cell(0, 0), Some(&CellAttrs::default()));
        assert!(!sync.blink_scheduler().is_active());

        sync.tick_blink(&mut surface);
        sync.tick_blink(&mut surface);
        assert!(surface.is_empty());
        assert_eq!(sync.synchronize(&song, &mut surface), 0);
    }

    #[test]
    fn clip_placed_in_an_emptied_cell_is_painted() {
        let mut song = song_with_stopped_clips();
        let mut sync = GridSynchronizer::for_song(&song, BlinkScheduler::default());
        let mut surface = RecordingSurface::new();
        song.clip_at(1, 1).unwrap().set_state(ClipState::Starting);
        sync.synchronize(&song, &mut surface);

        song.remove_clip(1, 1);
        sync.synchronize(&song, &mut surface);

        song.add_clip(Clip::new("again", 1, 1, 100))
            .unwrap()
            .set_state(ClipState::Starting);
        surface.take();
        assert_eq!(sync.synchronize(&song, &mut surface), 1);
        assert_eq!(
            surface.take(),
            vec![
                SurfaceCall::Color {
                    x: 1,
                    y: 1,
                    color: CellColor::Green
                },
                SurfaceCall::Blink {
                    x: 1,
                    y: 1,
                    blink: true
                },
            ]
        );
        assert!(sync.blink_scheduler().is_active());
    }

    #[test]
    fn invalidated_cell_is_repainted() {
        let song = song_with_stopped_clips();
        let mut sync = GridSynchronizer::for_song(&song, BlinkScheduler::default());
        let mut surface = RecordingSurface::new();
        sync.synchronize(&song, &mut surface);
        sync.invalidate(1, 1);
        assert_eq!(sync.synchronize(&song, &mut surface), 1);
    }
}
