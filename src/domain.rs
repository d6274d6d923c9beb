use std::fmt;
use std::io::Error;

use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;

use crate::pointer::PointerEvent;

pub const HELP_TEXT: &str = "\
restab - resizable catalogue table

Filtering
  /          Edit the brand filter (applies while typing)
  Enter      Accept the brand filter
  Esc        Undo brand filter edits / close this popup
  c / C      Next / previous category
  x          Clear all filters

Columns
  Drag a header border with the mouse to resize a column
  r          Reset column widths

  ?          Show this help
  q          Quit";

#[derive(Debug)]
pub enum TVError {
    IoError(Error),
    PolarsError(PolarsError),
    LoadingFailed(String),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
    UnknownColumn(String),
    InvalidRecord(String),
}

impl From<Error> for TVError {
    fn from(err: Error) -> Self {
        TVError::IoError(err)
    }
}

impl From<PolarsError> for TVError {
    fn from(err: PolarsError) -> Self {
        TVError::PolarsError(err)
    }
}

impl fmt::Display for TVError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TVError::IoError(e) => write!(f, "io error: {e}"),
            TVError::PolarsError(e) => write!(f, "could not read data: {e}"),
            TVError::LoadingFailed(reason) => write!(f, "loading failed: {reason}"),
            TVError::FileNotFound => write!(f, "file not found"),
            TVError::PermissionDenied => write!(f, "permission denied"),
            TVError::UnknownFileType => write!(f, "unknown file type"),
            TVError::UnknownColumn(name) => write!(f, "unknown column \"{name}\""),
            TVError::InvalidRecord(reason) => write!(f, "invalid record: {reason}"),
        }
    }
}

impl std::error::Error for TVError {}

#[derive(Debug, Clone, Setters)]
pub struct TVConfig {
    pub event_poll_time: u64,
    /// Pixels covered by one terminal cell horizontally.
    pub cell_width: u32,
    /// Pixels covered by one terminal cell vertically.
    pub cell_height: u32,
    /// Below this width (in pixels) the filter bar is stacked.
    pub compact_width: u32,
}

impl Default for TVConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            cell_width: 10,
            cell_height: 20,
            compact_width: 768,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    Help,
    Exit,
    Enter,
    EditBrand,
    NextCategory,
    PreviousCategory,
    ClearFilters,
    ResetWidths,
    RawKey(KeyEvent),
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp,
    Resize(usize, usize),
}
