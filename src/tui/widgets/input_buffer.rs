//! Single-line text input shared by the creation form and the viewer modals.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::theme;

/// A text buffer with a byte-indexed cursor that always sits on a char boundary.
#[derive(Debug, Clone, Default)]
pub struct InputBuffer {
    content: String,
    cursor: usize,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer holding `text` with the cursor at the end.
    pub fn with_text(text: impl Into<String>) -> Self {
        let content = text.into();
        let cursor = content.len();
        Self { content, cursor }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.content = text.into();
        self.cursor = self.content.len();
    }

    pub fn insert_char(&mut self, c: char) {
        self.content.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = self.content[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.content.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.content.len() {
            let next = self.content[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.content.len());
            self.content.drain(self.cursor..next);
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.content[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.content.len() {
            self.cursor = self.content[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.content.len());
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.content.len();
    }

    /// Take the content out, resetting the buffer.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.content)
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Whitespace-only counts as empty.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub fn text(&self) -> &str {
        &self.content
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor
    }

    /// Apply an editing key. Returns false for keys this buffer does not handle.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return false;
        }
        match key.code {
            KeyCode::Char(c) => self.insert_char(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            _ => return false,
        }
        true
    }

    /// Render as a line, drawing a reversed block cursor when focused.
    pub fn line(&self, focused: bool) -> Line<'static> {
        let text_style = Style::default().fg(theme::TEXT);
        if !focused {
            return Line::from(Span::styled(self.content.clone(), text_style));
        }

        let (before, rest) = self.content.split_at(self.cursor);
        let mut chars = rest.chars();
        let under = chars.next().map(String::from).unwrap_or_else(|| " ".to_string());
        let after: String = chars.collect();
        let cursor_style = text_style.add_modifier(Modifier::REVERSED);

        Line::from(vec![
            Span::styled(before.to_string(), text_style),
            Span::styled(under, cursor_style),
            Span::styled(after, text_style),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_insert_and_cursor() {
        let mut buf = InputBuffer::new();
        buf.insert_char('h');
        buf.insert_char('i');
        assert_eq!(buf.text(), "hi");
        assert_eq!(buf.cursor_position(), 2);
    }

    #[test]
    fn test_backspace_multibyte() {
        let mut buf = InputBuffer::with_text("café");
        buf.backspace();
        assert_eq!(buf.text(), "caf");
        assert_eq!(buf.cursor_position(), 3);
    }

    #[test]
    fn test_movement_and_delete() {
        let mut buf = InputBuffer::with_text("abc");
        buf.move_home();
        assert_eq!(buf.cursor_position(), 0);
        buf.delete();
        assert_eq!(buf.text(), "bc");
        buf.move_end();
        buf.move_left();
        assert_eq!(buf.cursor_position(), 1);
        buf.move_right();
        assert_eq!(buf.cursor_position(), 2);
    }

    #[test]
    fn test_take_resets() {
        let mut buf = InputBuffer::with_text("x");
        assert_eq!(buf.take(), "x");
        assert!(buf.text().is_empty());
        assert_eq!(buf.cursor_position(), 0);
    }

    #[test]
    fn test_is_empty_trims() {
        let mut buf = InputBuffer::new();
        assert!(buf.is_empty());
        buf.insert_char(' ');
        assert!(buf.is_empty());
        buf.insert_char('a');
        assert!(!buf.is_empty());
    }

    #[test]
    fn test_handle_key_skips_control_chords() {
        let mut buf = InputBuffer::new();
        assert!(buf.handle_key(&key(KeyCode::Char('a'))));
        assert!(!buf.handle_key(&KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)));
        assert!(!buf.handle_key(&key(KeyCode::Enter)));
        assert_eq!(buf.text(), "a");
    }

    #[test]
    fn test_line_shows_cursor_cell_when_focused() {
        let buf = InputBuffer::with_text("ab");
        assert_eq!(line_text(&buf.line(true)), "ab ");
        assert_eq!(line_text(&buf.line(false)), "ab");

        let mut mid = InputBuffer::with_text("ab");
        mid.move_left();
        assert_eq!(line_text(&mid.line(true)), "ab");
    }
}
