use std::time::Duration;
use tracing::trace;

use ratatui::crossterm::event::{
    self, Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind,
};

use crate::domain::{Message, TVConfig, TVError};
use crate::listeners::GlobalListeners;
use crate::model::Model;
use crate::pointer::{PointerEvent, RawPointer};

pub struct Controller {
    event_poll_time: u64,
    cell_width: u32,
    cell_height: u32,
}

impl Controller {
    pub fn new(cfg: &TVConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
            cell_width: cfg.cell_width,
            cell_height: cfg.cell_height,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, TVError> {
        if !event::poll(Duration::from_millis(self.event_poll_time))? {
            return Ok(None);
        }
        let message = match event::read()? {
            Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                if model.raw_keyevents() {
                    Some(Message::RawKey(key))
                } else {
                    self.handle_key(key)
                }
            }
            Event::Mouse(mouse) => self.handle_mouse(mouse, model.listeners()),
            Event::Resize(width, height) => {
                Some(Message::Resize(width as usize, height as usize))
            }
            _ => None,
        };
        Ok(message)
    }

    fn handle_key(&self, key: KeyEvent) -> Option<Message> {
        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Char('/') => Some(Message::EditBrand),
            KeyCode::Char('c') => Some(Message::NextCategory),
            KeyCode::Char('C') => Some(Message::PreviousCategory),
            KeyCode::Char('x') => Some(Message::ClearFilters),
            KeyCode::Char('r') => Some(Message::ResetWidths),
            KeyCode::Enter => Some(Message::Enter),
            KeyCode::Esc => Some(Message::Exit),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }

    /// Move and release events only reach the model while listeners are installed.
    fn handle_mouse(&self, mouse: MouseEvent, listeners: &GlobalListeners) -> Option<Message> {
        let raw = RawPointer::from_mouse(&mouse, self.cell_width, self.cell_height);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                PointerEvent::from_raw(&raw).map(Message::PointerDown)
            }
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved
                if listeners.is_listening() =>
            {
                PointerEvent::from_raw(&raw).map(Message::PointerMove)
            }
            MouseEventKind::Up(_) if listeners.is_listening() => Some(Message::PointerUp),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn mouse(kind: MouseEventKind, column: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row: 4,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn moves_are_dropped_without_listeners() {
        let controller = Controller::new(&TVConfig::default());
        let listeners = GlobalListeners::new();

        let drag = mouse(MouseEventKind::Drag(MouseButton::Left), 20);
        let up = mouse(MouseEventKind::Up(MouseButton::Left), 20);
        assert_eq!(controller.handle_mouse(drag, &listeners), None);
        assert_eq!(controller.handle_mouse(up, &listeners), None);

        let _handle = listeners.install();
        assert_eq!(
            controller.handle_mouse(drag, &listeners),
            Some(Message::PointerMove(PointerEvent { x: 200, y: Some(80) }))
        );
        assert_eq!(
            controller.handle_mouse(up, &listeners),
            Some(Message::PointerUp)
        );
    }

    #[test]
    fn press_is_always_forwarded() {
        let controller = Controller::new(&TVConfig::default());
        let listeners = GlobalListeners::new();
        let down = mouse(MouseEventKind::Down(MouseButton::Left), 3);
        assert_eq!(
            controller.handle_mouse(down, &listeners),
            Some(Message::PointerDown(PointerEvent { x: 30, y: Some(80) }))
        );
    }

    #[test]
    fn keys_map_to_messages() {
        let controller = Controller::new(&TVConfig::default());
        let key = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
        assert_eq!(controller.handle_key(key('/')), Some(Message::EditBrand));
        assert_eq!(controller.handle_key(key('C')), Some(Message::PreviousCategory));
        assert_eq!(controller.handle_key(key('z')), None);
    }
}
