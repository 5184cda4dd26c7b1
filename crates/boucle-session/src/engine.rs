use crossbeam_channel::Receiver;
use tracing::{debug, trace};

use crate::clip::{Clip, ClipState};
use crate::song::{Song, SongCommand};

/// Beats in one bar.
pub const BEATS_PER_BAR: u32 = 4;

/// Reference loop engine driving clip transport state.
///
/// Pending transitions (Starting, Stopping) settle when the global position
/// crosses one of the clip's launch points. Launch points are
/// `beat_divisor` beats apart, shifted by `beat_offset` beats plus
/// `frame_offset` frames; with the defaults they fall on every bar line.
/// An idle grid is no exception: a clip started from silence still waits
/// for its next launch point.
#[derive(Debug)]
pub struct LoopEngine {
    commands: Receiver<SongCommand>,
    bar_frames: u64,
    position: u64,
}

impl LoopEngine {
    pub fn new(commands: Receiver<SongCommand>, bar_frames: u64) -> Self {
        Self {
            commands,
            bar_frames: bar_frames.max(1),
            position: 0,
        }
    }

    /// Length of one bar at `bpm` with [`BEATS_PER_BAR`] beats per bar.
    pub fn bar_frames_for(sample_rate: u32, bpm: f32) -> u64 {
        let seconds_per_bar = BEATS_PER_BAR as f64 * 60.0 / bpm.max(1.0) as f64;
        (seconds_per_bar * sample_rate as f64) as u64
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn bar_frames(&self) -> u64 {
        self.bar_frames
    }

    /// Apply every queued command. Returns the number of clips toggled.
    pub fn process_commands(&mut self, song: &Song) -> usize {
        let mut applied = 0;
        for command in self.commands.try_iter() {
            match command {
                SongCommand::Toggle { x, y } => {
                    let Some(clip) = song.clip_at(x, y) else {
                        debug!(x, y, "toggle for an empty cell ignored");
                        continue;
                    };
                    let next = clip.state().toggled();
                    clip.set_state(next);
                    trace!(x, y, state = ?next, "clip toggled");
                    applied += 1;
                }
            }
        }
        applied
    }

    /// Frames between two launch points of `clip`.
    pub fn launch_period(&self, clip: &Clip) -> u64 {
        self.beats_to_frames(u64::from(clip.beat_divisor().max(1))).max(1)
    }

    /// Position of the first launch point of `clip`.
    pub fn launch_offset(&self, clip: &Clip) -> u64 {
        self.beats_to_frames(u64::from(clip.beat_offset()))
            .saturating_add(clip.frame_offset())
    }

    fn beats_to_frames(&self, beats: u64) -> u64 {
        self.bar_frames.saturating_mul(beats) / u64::from(BEATS_PER_BAR)
    }

    /// Whether a launch point of `clip` lies in `(start, start + frames]`.
    fn crosses_launch_point(&self, clip: &Clip, start: u64, frames: u64) -> bool {
        let period = self.launch_period(clip);
        let phase = self.launch_offset(clip) % period;
        let since_last = (start % period + period - phase) % period;
        since_last.saturating_add(frames) >= period
    }

    /// Advance playback by `frames`.
    pub fn advance(&mut self, song: &Song, frames: u64) {
        if frames == 0 {
            return;
        }
        let start = self.position;
        self.position = self.position.saturating_add(frames);

        for clip in song.clips() {
            let state = clip.state();
            if state.is_playing() {
                let length = clip.length();
                if length > 0 {
                    clip.set_last_offset((clip.last_offset() + frames) % length);
                }
            }
            if state.is_pending() && self.crosses_launch_point(clip, start, frames) {
                let settled = state.settled();
                clip.set_state(settled);
                clip.set_last_offset(0);
                debug!(x = clip.x(), y = clip.y(), state = ?settled, "clip settled");
            }
        }
    }

    pub fn is_idle(song: &Song) -> bool {
        song.clips().all(|clip| clip.state() == ClipState::Stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Clip;

    fn setup() -> (Song, LoopEngine) {
        let (mut song, rx) = Song::new(2, 2);
        song.add_clip(Clip::new("loop", 0, 0, 300)).unwrap();
        (song, LoopEngine::new(rx, 100))
    }

    #[test]
    fn toggle_waits_for_the_bar() {
        let (song, mut engine) = setup();
        song.toggle(0, 0).unwrap();
        assert_eq!(engine.process_commands(&song), 1);
        let clip = song.clip_at(0, 0).unwrap();
        assert_eq!(clip.state(), ClipState::Starting);

        engine.advance(&song, 40);
        assert_eq!(clip.state(), ClipState::Starting);
        engine.advance(&song, 60);
        assert_eq!(clip.state(), ClipState::Start);
        assert_eq!(clip.last_offset(), 0);
    }

    #[test]
    fn start_from_an_idle_grid_still_waits_for_the_launch_point() {
        let (song, mut engine) = setup();
        assert!(LoopEngine::is_idle(&song));
        song.toggle(0, 0).unwrap();
        engine.process_commands(&song);
        engine.advance(&song, 1);
        assert_eq!(song.clip_at(0, 0).unwrap().state(), ClipState::Starting);
    }

    #[test]
    fn beat_divisor_shortens_the_launch_period() {
        let (song, mut engine) = setup();
        let clip = song.clip_at(0, 0).unwrap();
        clip.set_beat_divisor(1);
        assert_eq!(engine.launch_period(clip), 25);
        clip.set_state(ClipState::Starting);
        engine.advance(&song, 20);
        assert_eq!(clip.state(), ClipState::Starting);
        engine.advance(&song, 5);
        assert_eq!(clip.state(), ClipState::Start);
    }

    #[test]
    fn offsets_shift_the_launch_points() {
        let (song, mut engine) = setup();
        let clip = song.clip_at(0, 0).unwrap();
        clip.set_beat_offset(1);
        clip.set_frame_offset(10);
        assert_eq!(engine.launch_offset(clip), 35);

        clip.set_state(ClipState::Starting);
        engine.advance(&song, 34);
        assert_eq!(clip.state(), ClipState::Starting);
        engine.advance(&song, 1);
        assert_eq!(clip.state(), ClipState::Start);

        engine.advance(&song, 10);
        clip.set_state(ClipState::Stopping);
        engine.advance(&song, 80);
        assert_eq!(clip.state(), ClipState::Stopping);
        engine.advance(&song, 10);
        assert_eq!(clip.state(), ClipState::Stop);
    }

    #[test]
    fn playing_clip_wraps_at_its_length() {
        let (song, mut engine) = setup();
        let clip = song.clip_at(0, 0).unwrap();
        clip.set_state(ClipState::Start);
        engine.advance(&song, 250);
        assert_eq!(clip.last_offset(), 250);
        engine.advance(&song, 100);
        assert_eq!(clip.last_offset(), 50);
    }

    #[test]
    fn stopping_clip_stops_on_the_bar() {
        let (song, mut engine) = setup();
        let clip = song.clip_at(0, 0).unwrap();
        clip.set_state(ClipState::Start);
        song.toggle(0, 0).unwrap();
        engine.process_commands(&song);
        assert_eq!(clip.state(), ClipState::Stopping);
        engine.advance(&song, 100);
        assert_eq!(clip.state(), ClipState::Stop);
        assert!(LoopEngine::is_idle(&song));
    }

    #[test]
    fn bar_length_follows_tempo() {
        assert_eq!(LoopEngine::bar_frames_for(48_000, 120.0), 96_000);
    }
}
