use std::sync::Arc;

use boucle_session::{CellCoord, Clip, SessionError, Song};

/// Input from a grid cell, tagged with the coordinate it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellCommand {
    StartStop { x: usize, y: usize },
    Edit { x: usize, y: usize },
    AddClip { x: usize, y: usize },
}

impl CellCommand {
    pub fn coord(&self) -> CellCoord {
        match *self {
            CellCommand::StartStop { x, y }
            | CellCommand::Edit { x, y }
            | CellCommand::AddClip { x, y } => (x, y),
        }
    }
}

/// What the front-end should do after a command was routed.
#[derive(Debug, Clone)]
pub enum CellAction {
    /// A toggle was queued for the engine.
    Toggled(CellCoord),
    /// Show the clip in the editor.
    Inspect(Arc<Clip>),
    /// Ask the user for a clip file to place at this cell.
    ChooseClipFile(CellCoord),
}

/// Single entry point for cell input, keyed by coordinate.
pub fn route_cell_command(song: &Song, command: CellCommand) -> Result<CellAction, SessionError> {
    let (x, y) = command.coord();
    if !song.contains(x, y) {
        return Err(SessionError::OutOfGrid {
            x,
            y,
            width: song.width(),
            height: song.height(),
        });
    }
    match command {
        CellCommand::StartStop { .. } => {
            song.toggle(x, y)?;
            Ok(CellAction::Toggled((x, y)))
        }
        CellCommand::Edit { .. } => song
            .clip_at(x, y)
            .cloned()
            .map(CellAction::Inspect)
            .ok_or(SessionError::EmptyCell { x, y }),
        CellCommand::AddClip { .. } => Ok(CellAction::ChooseClipFile((x, y))),
    }
}
