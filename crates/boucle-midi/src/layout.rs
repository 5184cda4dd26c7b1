//! Fixed note layout of the 4×4 pad grid.
//!
//! Row `x` starts at `ROW_BASES[x]`; column `y` adds `COLUMN_OFFSETS[y]`.
//! Cells outside the 4×4 region have no pad.

use boucle_session::CellCoord;

pub const PAD_ROWS: usize = 4;
pub const PAD_COLUMNS: usize = 4;

const ROW_BASES: [u8; PAD_ROWS] = [36, 48, 60, 72];
const COLUMN_OFFSETS: [u8; PAD_COLUMNS] = [0, 2, 4, 5];

/// Note of the pad at `(x, y)`, or `None` outside the 4×4 region.
pub fn note_for(x: usize, y: usize) -> Option<u8> {
    let base = ROW_BASES.get(x)?;
    let offset = COLUMN_OFFSETS.get(y)?;
    Some(base + offset)
}

/// Cell addressed by `note`, or `None` for notes without a pad.
pub fn coord_for(note: u8) -> Option<CellCoord> {
    ROW_BASES.iter().enumerate().find_map(|(x, &base)| {
        COLUMN_OFFSETS
            .iter()
            .position(|&offset| base + offset == note)
            .map(|y| (x, y))
    })
}

/// Every pad as `(x, y, note)`, row-major.
pub fn pads() -> impl Iterator<Item = (usize, usize, u8)> {
    (0..PAD_ROWS).flat_map(|x| {
        (0..PAD_COLUMNS).map(move |y| (x, y, ROW_BASES[x] + COLUMN_OFFSETS[y]))
    })
}
