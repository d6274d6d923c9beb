//! Normalization of mouse and touch input into a single pointer value.
//!
//! Everything behind this module only ever sees [`PointerEvent`]. Hosts hand
//! in whatever their input device produced as a [`RawPointer`] and the
//! conversion picks the coordinate out of it.

use ratatui::crossterm::event::MouseEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchPoint {
    pub client_x: i32,
    pub client_y: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawPointer {
    /// Mouse style input carrying its coordinates directly.
    Mouse {
        client_x: Option<i32>,
        client_y: Option<i32>,
    },
    /// Touch style input carrying the list of active touch points.
    Touch { touches: Vec<TouchPoint> },
}

/// A pointer position in pixels.
///
/// Resizing only consumes `x`; `y` is needed to hit-test the header and may be
/// absent on mouse input that reports a horizontal coordinate only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub x: i32,
    pub y: Option<i32>,
}

impl PointerEvent {
    /// Extracts the pointer position, `None` if the raw event has no usable coordinate.
    pub fn from_raw(raw: &RawPointer) -> Option<Self> {
        match raw {
            RawPointer::Mouse { client_x, client_y } => client_x.map(|x| PointerEvent {
                x,
                y: *client_y,
            }),
            RawPointer::Touch { touches } => touches.first().map(|t| PointerEvent {
                x: t.client_x,
                y: Some(t.client_y),
            }),
        }
    }

    /// Terminal cell under the pointer, `None` without a vertical coordinate.
    pub fn cell(&self, cell_width: u32, cell_height: u32) -> Option<(u16, u16)> {
        let to_cell = |v: i32, size: u32| {
            let size = i64::from(size.max(1));
            u16::try_from((i64::from(v) / size).max(0)).unwrap_or(u16::MAX)
        };
        let y = self.y?;
        Some((to_cell(self.x, cell_width), to_cell(y, cell_height)))
    }
}

impl RawPointer {
    /// Scales a terminal mouse event from cells to pixels.
    ///
    /// Coordinates that do not fit an `i32` pixel value are dropped.
    pub fn from_mouse(event: &MouseEvent, cell_width: u32, cell_height: u32) -> Self {
        let scale = |v: u16, size: u32| i32::try_from(u64::from(v) * u64::from(size)).ok();
        RawPointer::Mouse {
            client_x: scale(event.column, cell_width),
            client_y: scale(event.row, cell_height),
        }
    }
}
