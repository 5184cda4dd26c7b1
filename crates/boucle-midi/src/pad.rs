use boucle_session::{SessionError, Song};
use boucle_sync::DiffCache;
use tracing::{debug, trace, warn};

use crate::frame::{FrameKind, PadFrame, PadMessage};
use crate::layout::{self, PAD_COLUMNS, PAD_ROWS};
use crate::palette::PadPalette;

/// Two-way translator between the clip grid and a 4×4 pad controller.
///
/// Keeps its own [`DiffCache`] so the controller can lag behind (or be
/// unplugged from) the on-screen grid without either side missing updates.
#[derive(Debug, Clone)]
pub struct PadProtocol {
    cache: DiffCache,
    palette: PadPalette,
}

impl Default for PadProtocol {
    fn default() -> Self {
        Self::new(PadPalette::default())
    }
}

impl PadProtocol {
    /// Protocol with an empty cache: the first update lights every pad.
    pub fn new(palette: PadPalette) -> Self {
        Self {
            cache: DiffCache::new(PAD_ROWS, PAD_COLUMNS),
            palette,
        }
    }

    pub fn palette(&self) -> &PadPalette {
        &self.palette
    }

    /// Forget what the controller shows so the next update repaints every
    /// pad, e.g. after it was reconnected.
    pub fn reset(&mut self) {
        self.cache.reset();
    }

    /// Note-on messages for every addressable cell whose state changed
    /// since the last call, in row-major order. A pad whose clip was removed
    /// gets one message with the palette's `empty` velocity. Cells beyond
    /// the pad grid are skipped.
    pub fn update_pad(&mut self, song: &Song) -> Vec<PadMessage> {
        let mut messages = Vec::new();
        for x in 0..song.width().min(PAD_ROWS) {
            for y in 0..song.height().min(PAD_COLUMNS) {
                let Some(note) = layout::note_for(x, y) else {
                    continue;
                };
                let Some(clip) = song.clip_at(x, y) else {
                    if self.cache.last(x, y).is_some() {
                        self.cache.forget(x, y);
                        debug!(x, y, "clearing pad cell");
                        messages.push(PadMessage::note_on(note, self.palette.empty));
                    }
                    continue;
                };
                let state = clip.state();
                if !self.cache.observe(x, y, state) {
                    continue;
                }
                debug!(x, y, ?state, "updating pad cell");
                messages.push(PadMessage::note_on(note, self.palette.velocity(state)));
            }
        }
        messages
    }

    /// Turn pad releases into toggle commands. Frames of the wrong length,
    /// unmapped notes and anything but note-off are dropped. Returns the
    /// number of toggles queued.
    pub fn process_note<I>(&self, song: &Song, frames: I) -> usize
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let mut toggled = 0;
        for bytes in frames {
            let frame = match PadFrame::decode(bytes.as_ref()) {
                Ok(frame) => frame,
                Err(err) => {
                    trace!(%err, "discarding midi frame");
                    continue;
                }
            };
            trace!(kind = ?frame.kind, note = frame.note, velocity = frame.velocity, "note received");

            let Some((x, y)) = layout::coord_for(frame.note) else {
                continue;
            };
            if frame.kind != FrameKind::NoteOff {
                continue;
            }
            match song.toggle(x, y) {
                Ok(()) => toggled += 1,
                Err(err @ (SessionError::OutOfGrid { .. } | SessionError::EmptyCell { .. })) => {
                    debug!(%err, "pad press ignored");
                }
                Err(err) => warn!(%err, x, y, "pad toggle dropped"),
            }
        }
        toggled
    }
}
