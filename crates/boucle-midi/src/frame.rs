use thiserror::Error;

/// Status nibble of a note-off message.
pub const NOTE_OFF: u8 = 0x8;
/// Status nibble of a note-on message.
pub const NOTE_ON: u8 = 0x9;
/// Every frame this protocol understands is exactly this long.
pub const FRAME_LEN: usize = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("expected a 3-byte frame, got {0} bytes")]
    Length(usize),
}

/// Message type taken from the high nibble of the status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    NoteOff,
    NoteOn,
    Other(u8),
}

impl FrameKind {
    pub fn from_status(status: u8) -> Self {
        match status >> 4 {
            NOTE_OFF => FrameKind::NoteOff,
            NOTE_ON => FrameKind::NoteOn,
            other => FrameKind::Other(other),
        }
    }
}

/// Decoded inbound frame: `[status | channel, note, velocity]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadFrame {
    /// Message type from the status high nibble.
    pub kind: FrameKind,
    /// Status low nibble. Pad input is accepted on every channel.
    pub channel: u8,
    /// Note number, looked up in the pad layout.
    pub note: u8,
    /// Press velocity. Not used for toggling.
    pub velocity: u8,
}

impl PadFrame {
    /// Decode one whole frame. Partial frames are never buffered.
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        let &[status, note, velocity] = bytes else {
            return Err(FrameError::Length(bytes.len()));
        };
        Ok(Self {
            kind: FrameKind::from_status(status),
            channel: status & 0x0F,
            note,
            velocity,
        })
    }
}

/// Outbound pad update: status nibble, note and palette velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadMessage {
    /// Status nibble, shifted into the high bits by [`PadMessage::to_bytes`].
    pub status: u8,
    /// Pad note from the layout.
    pub note: u8,
    /// Palette velocity, which the controller shows as a color.
    pub velocity: u8,
}

impl PadMessage {
    /// Note-on lighting `note` with `velocity`.
    pub fn note_on(note: u8, velocity: u8) -> Self {
        Self {
            status: NOTE_ON,
            note,
            velocity,
        }
    }

    /// Wire frame for `channel` (0-15).
    pub fn to_bytes(&self, channel: u8) -> [u8; FRAME_LEN] {
        [
            (self.status << 4) | (channel & 0x0F),
            self.note & 0x7F,
            self.velocity & 0x7F,
        ]
    }
}
