use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::columns::{ColumnKey, ColumnWidthController, ColumnWidthMap, DragFeedback};
use crate::domain::{HELP_TEXT, Message, TVConfig};
use crate::filter::{FilterCriteria, RowFilter};
use crate::inputter::{InputResult, InputState, Inputter};
use crate::listeners::GlobalListeners;
use crate::observer::{RedrawFlag, Subscription};
use crate::pointer::PointerEvent;
use crate::table::Row;
use crate::ui::{
    FILTER_BAR_HEIGHT, FILTER_BAR_HEIGHT_COMPACT, STATUSLINE_HEIGHT, TABLE_BORDER,
};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    BRANDINPUT,
    POPUP,
}

/// Screen areas in terminal cells, shared by the model (hit testing) and the ui (drawing).
#[derive(Default, Clone, Debug, PartialEq)]
pub struct UILayout {
    pub width: u16,
    pub height: u16,
    pub compact: bool,
    pub filter_height: u16,
    pub table_y: u16,
    pub table_height: u16,
    pub statusline_y: u16,
}

impl UILayout {
    pub fn from_values(ui_width: u16, ui_height: u16, config: &TVConfig) -> Self {
        let compact = u32::from(ui_width).saturating_mul(config.cell_width) < config.compact_width;
        let filter_height = if compact {
            FILTER_BAR_HEIGHT_COMPACT
        } else {
            FILTER_BAR_HEIGHT
        };
        let table_height = ui_height
            .saturating_sub(filter_height)
            .saturating_sub(STATUSLINE_HEIGHT);

        let layout = UILayout {
            width: ui_width,
            height: ui_height,
            compact,
            filter_height,
            table_y: filter_height,
            table_height,
            statusline_y: filter_height + table_height,
        };
        trace!("Build UILayout: {:?}", layout);
        layout
    }

    /// Left edge of the first column.
    pub fn columns_x(&self) -> u16 {
        TABLE_BORDER
    }

    /// Row holding the column headers and their resize handles.
    pub fn header_y(&self) -> u16 {
        self.table_y + TABLE_BORDER
    }
}

/// Everything the presentation layer needs for one frame.
pub struct RenderRequest<'a> {
    pub name: &'a str,
    pub rows: Vec<&'a Row>,
    pub total_rows: usize,
    pub widths: &'a ColumnWidthMap,
    pub active_column: Option<ColumnKey>,
    pub feedback: Option<DragFeedback>,
    pub criteria: &'a FilterCriteria,
    pub brand_input: Option<InputResult>,
    pub layout: &'a UILayout,
    pub cell_width: u32,
    pub popup_message: Option<&'static str>,
    pub status_message: &'a str,
}

pub struct Model {
    config: TVConfig,
    pub status: Status,
    modus: Modus,
    name: String,
    filter: RowFilter,
    columns: ColumnWidthController,
    listeners: GlobalListeners,
    input: Inputter,
    uilayout: UILayout,
    status_message: String,
    redraw: RedrawFlag,
    _subscriptions: Vec<Subscription>,
}

impl Model {
    pub fn init(
        config: &TVConfig,
        name: impl Into<String>,
        rows: Vec<Row>,
        ui_width: u16,
        ui_height: u16,
    ) -> Self {
        let listeners = GlobalListeners::new();
        let filter = RowFilter::new(Arc::new(rows));
        let columns = ColumnWidthController::new(listeners.clone());

        let redraw = RedrawFlag::default();
        let subscriptions = vec![
            redraw.watch(columns.widths()),
            redraw.watch(columns.session()),
            redraw.watch(filter.criteria()),
        ];
        redraw.raise();

        let model = Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::TABLE,
            name: name.into(),
            status_message: format!("{} rows, press ? for help", filter.source_len()),
            filter,
            columns,
            listeners,
            input: Inputter::default(),
            uilayout: UILayout::from_values(ui_width, ui_height, config),
            redraw,
            _subscriptions: subscriptions,
        };
        info!(
            "Model ready: {} rows, categories {:?}",
            model.filter.source_len(),
            model.filter.categories()
        );
        model
    }

    pub fn listeners(&self) -> &GlobalListeners {
        &self.listeners
    }

    pub fn columns(&self) -> &ColumnWidthController {
        &self.columns
    }

    pub fn filter(&self) -> &RowFilter {
        &self.filter
    }

    pub fn layout(&self) -> &UILayout {
        &self.uilayout
    }

    /// Keys go to the brand input unmapped while it is active.
    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::BRANDINPUT
    }

    /// Whether something changed since the last frame.
    pub fn needs_redraw(&self) -> bool {
        self.redraw.take()
    }

    pub fn render_request(&self) -> RenderRequest<'_> {
        RenderRequest {
            name: &self.name,
            rows: self.filter.visible_rows().collect(),
            total_rows: self.filter.source_len(),
            widths: self.columns.widths().get(),
            active_column: self.columns.active_column(),
            feedback: self.columns.feedback(),
            criteria: self.filter.criteria().get(),
            brand_input: (self.modus == Modus::BRANDINPUT).then(|| self.input.get()),
            layout: &self.uilayout,
            cell_width: self.config.cell_width,
            popup_message: (self.modus == Modus::POPUP).then_some(HELP_TEXT),
            status_message: &self.status_message,
        }
    }

    pub fn quit(&mut self) {
        self.columns.end_resize();
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Message) {
        match message {
            // Drag handling is independent of the current modus. Width changes
            // request their own redraw through the widths observable.
            Message::PointerMove(pointer) => {
                self.columns.update_resize(pointer.x);
                return;
            }
            Message::PointerUp => self.pointer_up(),
            Message::Quit => self.quit(),
            Message::Resize(width, height) => self.ui_resize(width, height),
            msg => match self.modus {
                Modus::TABLE => match msg {
                    Message::Help => self.show_help(),
                    Message::EditBrand => self.edit_brand(),
                    Message::NextCategory => self.filter.next_category(),
                    Message::PreviousCategory => self.filter.previous_category(),
                    Message::ClearFilters => self.clear_filters(),
                    Message::ResetWidths => self.reset_widths(),
                    Message::PointerDown(pointer) => self.pointer_down(pointer),
                    _ => (),
                },
                Modus::BRANDINPUT => match msg {
                    Message::RawKey(key) => self.brand_input(key),
                    Message::PointerDown(pointer) => self.pointer_down(pointer),
                    _ => (),
                },
                Modus::POPUP => match msg {
                    Message::Exit | Message::Enter | Message::Help => self.close_popup(),
                    _ => (),
                },
            },
        }
        self.redraw.raise();
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        let width = u16::try_from(width).unwrap_or(u16::MAX);
        let height = u16::try_from(height).unwrap_or(u16::MAX);
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uilayout.width, width, self.uilayout.height, height
        );
        self.uilayout = UILayout::from_values(width, height, &self.config);
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    fn pointer_down(&mut self, pointer: PointerEvent) {
        let Some((x, y)) = pointer.cell(self.config.cell_width, self.config.cell_height) else {
            return;
        };
        if y != self.uilayout.header_y() || x < self.uilayout.columns_x() {
            return;
        }
        let offset = x - self.uilayout.columns_x();
        if let Some(column) = self
            .columns
            .widths()
            .get()
            .handle_at(offset, self.config.cell_width)
        {
            self.columns.begin_resize(column, pointer.x);
            self.set_status_message(format!("Resizing {column} ..."));
        }
    }

    fn pointer_up(&mut self) {
        if let Some(column) = self.columns.active_column() {
            self.columns.end_resize();
            let width = self.columns.width(column);
            debug!("Resized {column} to {width}px");
            self.set_status_message(format!("Resized {column} to {width}px"));
        }
    }

    fn reset_widths(&mut self) {
        self.columns.reset_widths();
        self.set_status_message("Column widths reset");
    }

    fn clear_filters(&mut self) {
        self.filter.clear();
        self.set_status_message("Filters cleared");
    }

    fn show_help(&mut self) {
        self.modus = Modus::POPUP;
    }

    fn close_popup(&mut self) {
        trace!("Close popup ...");
        self.modus = Modus::TABLE;
    }

    fn edit_brand(&mut self) {
        trace!("Entering brand input ...");
        self.input.start(&self.filter.criteria().get().brand_query);
        self.modus = Modus::BRANDINPUT;
    }

    fn brand_input(&mut self, key: ratatui::crossterm::event::KeyEvent) {
        let state = self.input.read(key);
        self.filter.set_brand_query(self.input.text());
        if state != InputState::Editing {
            trace!("Brand input finished: {state:?}");
            self.modus = Modus::TABLE;
            let shown = self.filter.visible_rows().count();
            self.set_status_message(format!("{shown} of {} rows", self.filter.source_len()));
        }
    }
}
