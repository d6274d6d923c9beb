use std::fmt;
use std::str::FromStr;

use tracing::{debug, trace, warn};

use crate::domain::TVError;
use crate::listeners::{GlobalListeners, ListenerHandle};
use crate::observer::Observable;

/// Narrowest width a column can be dragged to, in pixels.
pub const MIN_WIDTH: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    Id,
    Brand,
    Model,
    Category,
    Availability,
}

impl ColumnKey {
    /// All columns in display order.
    pub const ALL: [ColumnKey; 5] = [
        ColumnKey::Id,
        ColumnKey::Brand,
        ColumnKey::Model,
        ColumnKey::Category,
        ColumnKey::Availability,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ColumnKey::Id => "id",
            ColumnKey::Brand => "brand",
            ColumnKey::Model => "model",
            ColumnKey::Category => "category",
            ColumnKey::Availability => "availability",
        }
    }

    fn default_width(&self) -> u32 {
        match self {
            ColumnKey::Id => 100,
            ColumnKey::Brand => 150,
            ColumnKey::Model => 200,
            ColumnKey::Category => 150,
            ColumnKey::Availability => 150,
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColumnKey {
    type Err = TVError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColumnKey::ALL
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or_else(|| TVError::UnknownColumn(s.to_string()))
    }
}

/// Column widths in display order. Every key is always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnWidthMap {
    widths: [(ColumnKey, u32); 5],
}

impl Default for ColumnWidthMap {
    fn default() -> Self {
        Self {
            widths: ColumnKey::ALL.map(|key| (key, key.default_width())),
        }
    }
}

impl ColumnWidthMap {
    pub fn get(&self, key: ColumnKey) -> u32 {
        self.widths
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, w)| *w)
            .unwrap_or(MIN_WIDTH)
    }

    /// Sets a width, returns whether it changed.
    fn set(&mut self, key: ColumnKey, width: u32) -> bool {
        match self.widths.iter_mut().find(|(k, _)| *k == key) {
            Some((_, w)) if *w != width => {
                *w = width;
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColumnKey, u32)> + '_ {
        self.widths.iter().copied()
    }

    /// Number of terminal cells a width occupies.
    pub fn cells(width: u32, cell_width: u32) -> u16 {
        let cells = (width / cell_width.max(1)).max(1);
        u16::try_from(cells).unwrap_or(u16::MAX)
    }

    /// Column whose resize handle sits `offset` cells right of the table's left edge.
    ///
    /// Columns are laid out with a one cell separator; the handle is the
    /// column's last cell plus that separator.
    pub fn handle_at(&self, offset: u16, cell_width: u32) -> Option<ColumnKey> {
        let offset = u32::from(offset);
        let mut edge = 0u32;
        for (key, width) in self.iter() {
            edge += u32::from(Self::cells(width, cell_width));
            if offset + 1 == edge || offset == edge {
                return Some(key);
            }
            edge += 1;
            if offset < edge {
                return None;
            }
        }
        None
    }
}

/// Anchor of an active resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSession {
    pub column: ColumnKey,
    pub anchor_x: i32,
    pub anchor_width: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStyle {
    ColResize,
}

/// What the host should show while a drag is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragFeedback {
    pub column: ColumnKey,
    pub cursor: CursorStyle,
    pub suppress_selection: bool,
}

#[derive(Debug)]
pub struct ColumnWidthController {
    widths: Observable<ColumnWidthMap>,
    session: Observable<Option<DragSession>>,
    listeners: GlobalListeners,
    registration: Option<ListenerHandle>,
}

impl ColumnWidthController {
    pub fn new(listeners: GlobalListeners) -> Self {
        Self {
            widths: Observable::new(ColumnWidthMap::default()),
            session: Observable::new(None),
            listeners,
            registration: None,
        }
    }

    pub fn widths(&self) -> &Observable<ColumnWidthMap> {
        &self.widths
    }

    pub fn session(&self) -> &Observable<Option<DragSession>> {
        &self.session
    }

    pub fn width(&self, key: ColumnKey) -> u32 {
        self.widths.get().get(key)
    }

    pub fn active_column(&self) -> Option<ColumnKey> {
        self.session.get().map(|s| s.column)
    }

    pub fn is_dragging(&self) -> bool {
        self.session.get().is_some()
    }

    pub fn feedback(&self) -> Option<DragFeedback> {
        self.active_column().map(|column| DragFeedback {
            column,
            cursor: CursorStyle::ColResize,
            suppress_selection: true,
        })
    }

    /// Starts dragging `column`. A drag in progress is replaced.
    pub fn begin_resize(&mut self, column: ColumnKey, pointer_x: i32) {
        let session = DragSession {
            column,
            anchor_x: pointer_x,
            anchor_width: self.width(column),
        };
        if let Some(previous) = self.session.get() {
            debug!(
                "Replacing resize of {} with {}",
                previous.column, session.column
            );
        }
        if self.registration.is_none() {
            self.registration = Some(self.listeners.install());
        }
        trace!(
            "Begin resize {} at x={} width={}",
            column, pointer_x, session.anchor_width
        );
        self.session.set(Some(session));
    }

    /// Like [`Self::begin_resize`] for a column given by name. Unknown names are rejected.
    pub fn begin_resize_named(&mut self, column: &str, pointer_x: i32) -> Result<(), TVError> {
        let key = column.parse::<ColumnKey>().inspect_err(|e| {
            warn!("Ignoring resize request: {e}");
        })?;
        self.begin_resize(key, pointer_x);
        Ok(())
    }

    pub fn update_resize(&mut self, pointer_x: i32) {
        let Some(session) = *self.session.get() else {
            return;
        };
        let proposed =
            i64::from(session.anchor_width) + i64::from(pointer_x) - i64::from(session.anchor_x);
        let width = u32::try_from(proposed.max(i64::from(MIN_WIDTH))).unwrap_or(u32::MAX);
        self.widths.update(|map| map.set(session.column, width));
    }

    pub fn end_resize(&mut self) {
        if let Some(registration) = self.registration.take() {
            registration.release();
        }
        if let Some(session) = self.session.get() {
            trace!(
                "End resize {} at width {}",
                session.column,
                self.width(session.column)
            );
        }
        self.session.set(None);
    }

    pub fn reset_widths(&mut self) {
        self.widths.set(ColumnWidthMap::default());
    }
}
