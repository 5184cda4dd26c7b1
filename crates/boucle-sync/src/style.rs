use boucle_session::ClipState;

/// Color token understood by a display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellColor {
    Red,
    Green,
}

impl CellColor {
    /// Display value for surfaces that draw with raw colors.
    pub fn rgb(self) -> [u8; 3] {
        match self {
            CellColor::Red => [240, 0, 0],
            CellColor::Green => [0, 230, 0],
        }
    }
}

/// How a cell is drawn for a given clip state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellStyle {
    pub color: CellColor,
    pub blink: bool,
}

/// Fixed state to style table: pending transitions blink.
pub const fn cell_style(state: ClipState) -> CellStyle {
    match state {
        ClipState::Stop => CellStyle {
            color: CellColor::Red,
            blink: false,
        },
        ClipState::Starting => CellStyle {
            color: CellColor::Green,
            blink: true,
        },
        ClipState::Start => CellStyle {
            color: CellColor::Green,
            blink: false,
        },
        ClipState::Stopping => CellStyle {
            color: CellColor::Red,
            blink: true,
        },
    }
}
