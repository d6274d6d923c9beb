use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Single line text input used for the brand query.
#[derive(Debug, Default)]
pub struct Inputter {
    text: String,
    cursor: usize, // in chars
    original: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputState {
    Editing,
    Accepted,
    Canceled,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InputResult {
    pub text: String,
    pub cursor: usize,
}

impl Inputter {
    /// Starts editing `initial`, which is restored on cancel.
    pub fn start(&mut self, initial: &str) {
        self.text = initial.to_string();
        self.original = initial.to_string();
        self.cursor = self.text.chars().count();
    }

    pub fn read(&mut self, key: KeyEvent) -> InputState {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => return InputState::Accepted,
            (KeyCode::Esc, _) => {
                self.text = std::mem::take(&mut self.original);
                self.cursor = self.text.chars().count();
                return InputState::Canceled;
            }
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Delete, _) => self.delete(),
            (KeyCode::Left, _) => self.cursor = self.cursor.saturating_sub(1),
            (KeyCode::Right, _) => self.cursor = (self.cursor + 1).min(self.text.chars().count()),
            (KeyCode::Home, _) => self.cursor = 0,
            (KeyCode::End, _) => self.cursor = self.text.chars().count(),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.text.clear();
                self.cursor = 0;
            }
            (KeyCode::Char(chr), m) if !m.contains(KeyModifiers::CONTROL) => {
                self.text.insert(self.byte_pos(), chr);
                self.cursor += 1;
            }
            _ => {}
        }
        InputState::Editing
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            text: self.text.clone(),
            cursor: self.cursor,
        }
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let pos = self.byte_pos();
            self.text.remove(pos);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let pos = self.byte_pos();
            self.text.remove(pos);
        }
    }

    fn byte_pos(&self) -> usize {
        self.text
            .char_indices()
            .nth(self.cursor)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(input: &mut Inputter, s: &str) {
        for c in s.chars() {
            input.read(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn edits_at_cursor() {
        let mut input = Inputter::default();
        input.start("");
        type_str(&mut input, "Aer");
        input.read(key(KeyCode::Left));
        input.read(key(KeyCode::Left));
        type_str(&mut input, "c");
        assert_eq!(input.text(), "Acer");

        input.read(key(KeyCode::End));
        input.read(key(KeyCode::Backspace));
        assert_eq!(input.text(), "Ace");
        input.read(key(KeyCode::Home));
        input.read(key(KeyCode::Delete));
        assert_eq!(input.text(), "ce");
    }

    #[test]
    fn handles_multibyte_chars() {
        let mut input = Inputter::default();
        input.start("Xiäomi");
        input.read(key(KeyCode::Left));
        input.read(key(KeyCode::Left));
        input.read(key(KeyCode::Left));
        input.read(key(KeyCode::Backspace));
        assert_eq!(input.text(), "Xiomi");
    }

    #[test]
    fn escape_restores_initial_text() {
        let mut input = Inputter::default();
        input.start("hp");
        type_str(&mut input, "x");
        assert_eq!(input.read(key(KeyCode::Esc)), InputState::Canceled);
        assert_eq!(input.text(), "hp");
    }

    #[test]
    fn enter_accepts() {
        let mut input = Inputter::default();
        input.start("");
        type_str(&mut input, "dell");
        assert_eq!(input.read(key(KeyCode::Enter)), InputState::Accepted);
        assert_eq!(input.text(), "dell");
    }
}
