//! Single-line input field handling for the terminal user interface.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// A text input field with a cursor and an optional length limit.
///
/// The cursor counts characters, not bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputField {
    pub value: String,
    pub cursor: usize,
    pub limit: Option<usize>,
}

impl InputField {
    /// Create a new empty input field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an input field with initial text, cursor at the end.
    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.chars().count(),
            limit: None,
        }
    }

    /// Create an empty field that accepts at most `limit` characters.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.value.chars().count()
    }

    /// Whether no text has been entered.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Remove all text and reset the cursor.
    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    /// Insert a character at the cursor. Ignored once the limit is reached.
    pub fn handle_char(&mut self, c: char) {
        if self.limit.is_some_and(|max| self.len() >= max) {
            return;
        }
        let at = self.byte_index();
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    pub fn handle_backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index();
            self.value.remove(at);
        }
    }

    /// Delete the character at the cursor position.
    pub fn handle_delete(&mut self) {
        if self.cursor < self.len() {
            let at = self.byte_index();
            self.value.remove(at);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.len() {
            self.cursor += 1;
        }
    }

    /// Apply an editing key. Returns `false` when the key is not an edit.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => self.handle_char(c),
            KeyCode::Backspace => self.handle_backspace(),
            KeyCode::Delete => self.handle_delete(),
            KeyCode::Left => self.move_cursor_left(),
            KeyCode::Right => self.move_cursor_right(),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_backspace_mid_string() {
        let mut field = InputField::with_value("ac");
        field.move_cursor_left();
        field.handle_char('b');
        assert_eq!(field.value, "abc");
        assert_eq!(field.cursor, 2);

        field.handle_backspace();
        assert_eq!(field.value, "ac");
        assert_eq!(field.cursor, 1);
    }

    #[test]
    fn test_limit_rejects_extra_chars() {
        let mut field = InputField::with_limit(5);
        for c in "write!".chars() {
            field.handle_char(c);
        }
        assert_eq!(field.value, "write");
    }

    #[test]
    fn test_multibyte_chars() {
        let mut field = InputField::new();
        field.handle_char('é');
        field.handle_char('x');
        field.move_cursor_left();
        field.handle_delete();
        assert_eq!(field.value, "é");
        field.handle_backspace();
        assert!(field.is_empty());
    }

    #[test]
    fn test_control_chars_are_not_edits() {
        let mut field = InputField::new();
        let ctrl_a = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL);
        assert!(!field.handle_key(&ctrl_a));
        assert!(field.is_empty());
    }
}
