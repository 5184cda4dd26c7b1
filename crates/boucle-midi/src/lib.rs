//! MIDI pad control surface for the Boucle clip grid.
//!
//! [`PadProtocol`] translates between clip states and 3-byte note frames:
//! outbound it lights pads for cells whose state changed, inbound it turns
//! pad releases into toggle commands. The transport plumbing in
//! [`device`], [`backend_midir`] and [`output`] only moves frames around.

#[cfg(feature = "midir")]
pub mod backend_midir;
pub mod config;
pub mod device;
pub mod frame;
pub mod layout;
#[cfg(feature = "midir")]
pub mod output;
pub mod pad;
pub mod palette;

use thiserror::Error;

pub use frame::{FrameError, FrameKind, PadFrame, PadMessage};
pub use pad::PadProtocol;
pub use palette::PadPalette;

/// Errors that can be produced while configuring the pad surface.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MidiError {
    /// The requested port could not be found.
    #[error("unknown MIDI port {0}")]
    UnknownPort(usize),
    /// Two states share a velocity, or a velocity is outside 0-127.
    #[error("invalid pad palette: {0}")]
    InvalidPalette(&'static str),
    /// MIDI channels are numbered 0-15 on the wire.
    #[error("MIDI channel {0} is out of range")]
    InvalidChannel(u8),
}
