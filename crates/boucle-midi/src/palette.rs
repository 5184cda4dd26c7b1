use boucle_session::ClipState;
use serde::{Deserialize, Serialize};

use crate::MidiError;

/// Velocity sent for each clip state; the controller maps velocity to pad
/// color. `empty` turns off the pad of a cell whose clip was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PadPalette {
    pub stop: u8,
    pub starting: u8,
    pub start: u8,
    pub stopping: u8,
    pub empty: u8,
}

impl Default for PadPalette {
    fn default() -> Self {
        Self {
            stop: 12,
            starting: 13,
            start: 14,
            stopping: 15,
            empty: 0,
        }
    }
}

impl PadPalette {
    /// Velocity lighting a pad for `state`.
    pub fn velocity(&self, state: ClipState) -> u8 {
        match state {
            ClipState::Stop => self.stop,
            ClipState::Starting => self.starting,
            ClipState::Start => self.start,
            ClipState::Stopping => self.stopping,
        }
    }

    /// The four states and the empty pad must stay distinguishable on the
    /// hardware.
    pub fn validate(&self) -> Result<(), MidiError> {
        let values = [
            self.stop,
            self.starting,
            self.start,
            self.stopping,
            self.empty,
        ];
        if values.iter().any(|&value| value > 0x7F) {
            return Err(MidiError::InvalidPalette("velocity above 127"));
        }
        for (index, value) in values.iter().enumerate() {
            if values[index + 1..].contains(value) {
                return Err(MidiError::InvalidPalette("two states share a velocity"));
            }
        }
        Ok(())
    }
}
