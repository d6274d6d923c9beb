use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, Wrap},
};

use crate::columns::{ColumnKey, ColumnWidthMap};
use crate::model::{Model, RenderRequest};
use crate::table::Availability;

pub const FILTER_BAR_HEIGHT: u16 = 3;
pub const FILTER_BAR_HEIGHT_COMPACT: u16 = 6;
pub const STATUSLINE_HEIGHT: u16 = 1;
pub const TABLE_BORDER: u16 = 1;
const COLUMN_SPACING: u16 = 1;

#[derive(Debug, Default)]
pub struct TableUI {}

impl TableUI {
    pub fn new() -> Self {
        Self {}
    }

    pub fn draw(&self, model: &Model, frame: &mut Frame) {
        let req = model.render_request();
        let layout = req.layout;
        let area = frame.area();

        let filter_area = Rect::new(0, 0, area.width, layout.filter_height).intersection(area);
        let table_area =
            Rect::new(0, layout.table_y, area.width, layout.table_height).intersection(area);
        let status_area =
            Rect::new(0, layout.statusline_y, area.width, STATUSLINE_HEIGHT).intersection(area);

        self.draw_filter_bar(&req, frame, filter_area);
        self.draw_table(&req, frame, table_area);
        self.draw_statusline(&req, frame, status_area);

        if let Some(message) = req.popup_message {
            self.draw_popup(message, frame, area);
        }
    }

    fn draw_filter_bar(&self, req: &RenderRequest, frame: &mut Frame, area: Rect) {
        let [brand_area, category_area] = if req.layout.compact {
            Layout::vertical([Constraint::Length(3), Constraint::Length(3)]).areas(area)
        } else {
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .spacing(1)
                .areas(area)
        };

        let editing = req.brand_input.is_some();
        let brand_text = match &req.brand_input {
            Some(input) => Line::from(input.text.clone()),
            None if req.criteria.brand_query.is_empty() => Line::from("Type brand name").dim(),
            None => Line::from(req.criteria.brand_query.clone()),
        };
        let brand_block = Block::bordered()
            .title(" Search By Brand ")
            .title_bottom(Line::from(" / ").right_aligned())
            .border_style(if editing {
                Style::new().fg(Color::Blue)
            } else {
                Style::new()
            });
        frame.render_widget(Paragraph::new(brand_text).block(brand_block), brand_area);

        if let Some(input) = &req.brand_input {
            let max_x = brand_area.right().saturating_sub(2);
            let x = (brand_area.x + 1 + u16::try_from(input.cursor).unwrap_or(u16::MAX)).min(max_x);
            frame.set_cursor_position((x, brand_area.y + 1));
        }

        let category_text = if req.criteria.category_query.is_empty() {
            Line::from("All Categories").dim()
        } else {
            Line::from(req.criteria.category_query.clone())
        };
        let category_block = Block::bordered()
            .title(" Category ")
            .title_bottom(Line::from(" c / C ").right_aligned());
        frame.render_widget(
            Paragraph::new(category_text).block(category_block),
            category_area,
        );
    }

    fn draw_table(&self, req: &RenderRequest, frame: &mut Frame, area: Rect) {
        let widths: Vec<Constraint> = req
            .widths
            .iter()
            .map(|(_, w)| Constraint::Length(ColumnWidthMap::cells(w, req.cell_width)))
            .collect();

        let header = Row::new(req.widths.iter().map(|(key, _)| {
            let cell = Cell::from(key.name().to_uppercase());
            if req.active_column == Some(key) {
                cell.style(Style::new().fg(Color::White).bg(Color::Blue))
            } else {
                cell
            }
        }))
        .style(Style::new().fg(Color::Gray).add_modifier(Modifier::BOLD));

        let rows = req.rows.iter().map(|row| {
            Row::new(ColumnKey::ALL.map(|key| match key {
                ColumnKey::Id => Cell::from(row.id.to_string()),
                ColumnKey::Brand => Cell::from(row.brand.as_str()),
                ColumnKey::Model => Cell::from(row.model.as_str()),
                ColumnKey::Category => Cell::from(row.category.as_str()),
                ColumnKey::Availability => availability_badge(row.availability),
            }))
        });

        let title = Line::from(format!(
            " {} [{}/{}] ",
            req.name,
            req.rows.len(),
            req.total_rows
        ))
        .bold();
        let block = Block::bordered()
            .title(title.centered())
            .border_set(border::PLAIN);

        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(COLUMN_SPACING)
            .block(block);
        frame.render_widget(table, area);
    }

    fn draw_statusline(&self, req: &RenderRequest, frame: &mut Frame, area: Rect) {
        let left = match req.feedback {
            Some(feedback) => Span::from(format!(
                "Resizing {}: {}px",
                feedback.column.name().to_uppercase(),
                req.widths.get(feedback.column)
            ))
            .fg(Color::Blue)
            .bold(),
            None => Span::from(req.status_message.to_string()),
        };
        let [left_area, right_area] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(40)]).areas(area);
        frame.render_widget(Paragraph::new(Line::from(left)), left_area);
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                " Help ".into(),
                "<?>".blue().bold(),
                " Reset ".into(),
                "<r>".blue().bold(),
                " Quit ".into(),
                "<q> ".blue().bold(),
            ]))
            .right_aligned(),
            right_area,
        );
    }

    fn draw_popup(&self, message: &str, frame: &mut Frame, area: Rect) {
        let [_, vertical, _] = Layout::vertical([
            Constraint::Percentage(15),
            Constraint::Percentage(70),
            Constraint::Percentage(15),
        ])
        .areas(area);
        let [_, popup_area, _] = Layout::horizontal([
            Constraint::Percentage(20),
            Constraint::Percentage(60),
            Constraint::Percentage(20),
        ])
        .areas(vertical);

        let block = Block::bordered()
            .title(Line::from(" Help ").centered())
            .title_bottom(Line::from(" <Esc> ").centered())
            .border_set(border::THICK);
        frame.render_widget(Clear, popup_area);
        frame.render_widget(
            Paragraph::new(message)
                .wrap(Wrap { trim: false })
                .block(block),
            popup_area,
        );
    }
}

fn availability_badge(availability: Availability) -> Cell<'static> {
    let color = match availability {
        Availability::Available => Color::Green,
        Availability::OutOfStock => Color::Red,
        Availability::LowStock => Color::Yellow,
    };
    Cell::from(availability.label()).style(Style::new().fg(color))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Message, TVConfig};
    use crate::pointer::PointerEvent;
    use crate::table::fixture_rows;
    use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};

    fn render(model: &Model, width: u16, height: u16) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let ui = TableUI::new();
        terminal.draw(|f| ui.draw(model, f)).unwrap();
        terminal.backend().buffer().clone()
    }

    /// Cell column where `needle` starts on `line`.
    fn column_of(line: &str, needle: &str) -> Option<usize> {
        line.find(needle).map(|idx| line[..idx].chars().count())
    }

    fn line(buffer: &Buffer, y: u16) -> String {
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn header_follows_column_widths() {
        let config = TVConfig::default();
        let mut model = Model::init(&config, "fixture", fixture_rows(), 100, 20);
        let header_y = model.layout().header_y();

        let buffer = render(&model, 100, 20);
        let header = line(&buffer, header_y);
        assert_eq!(column_of(&header, "BRAND"), Some(12));

        // Widen the id column by 5 cells
        model.update(Message::PointerDown(PointerEvent {
            x: 110,
            y: Some(i32::from(header_y) * 20),
        }));
        model.update(Message::PointerMove(PointerEvent { x: 160, y: None }));
        model.update(Message::PointerUp);

        let buffer = render(&model, 100, 20);
        let header = line(&buffer, header_y);
        assert_eq!(column_of(&header, "BRAND"), Some(17));
    }

    #[test]
    fn filtered_rows_are_drawn() {
        let config = TVConfig::default();
        let mut model = Model::init(&config, "fixture", fixture_rows(), 100, 20);
        model.update(Message::NextCategory);
        model.update(Message::NextCategory);

        let buffer = render(&model, 100, 20);
        let first_row = line(&buffer, model.layout().header_y() + 1);
        assert!(first_row.contains("Samsung"));
        assert!(line(&buffer, model.layout().table_y).contains("[3/10]"));
    }
}
