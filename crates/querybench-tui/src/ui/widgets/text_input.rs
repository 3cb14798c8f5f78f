//! Single-box text input with a drawn cursor and submit-history recall.

use crate::ui::theme::Styles;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

/// Renderable snapshot of a [`TextInputState`].
#[derive(Debug, Clone)]
pub struct TextInput<'a> {
    content: &'a str,
    /// Character index of the cursor.
    cursor: usize,
    focused: bool,
    placeholder: Option<&'a str>,
    prompt: &'a str,
}

impl<'a> TextInput<'a> {
    fn new(content: &'a str, cursor: usize) -> Self {
        Self {
            content,
            cursor,
            focused: true,
            placeholder: None,
            prompt: "> ",
        }
    }

    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Dim text shown while the input is empty.
    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }
}

impl Widget for TextInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 || area.width < 1 {
            return;
        }

        if self.content.is_empty() {
            let mut spans = vec![Span::styled(self.prompt, Styles::active())];
            if self.focused {
                spans.push(Span::styled("_", Styles::active()));
            }
            if let Some(placeholder) = self.placeholder {
                spans.push(Span::styled(placeholder, Styles::dim()));
            }
            Paragraph::new(Line::from(spans)).render(area, buf);
            return;
        }

        // One Line per content line; the cursor is drawn as an underscore in
        // whichever line contains it. Continuation lines align to the prompt.
        let indent = " ".repeat(self.prompt.chars().count());
        let mut lines = Vec::new();
        let mut chars_seen = 0;
        let mut cursor_drawn = false;

        for (i, line_text) in self.content.split('\n').enumerate() {
            let line_chars = line_text.chars().count();
            let prefix = if i == 0 {
                Span::styled(self.prompt, Styles::active())
            } else {
                Span::styled(indent.clone(), Styles::default())
            };

            let mut spans = vec![prefix];
            if self.focused && !cursor_drawn && self.cursor <= chars_seen + line_chars {
                let split = self.cursor.saturating_sub(chars_seen);
                let before: String = line_text.chars().take(split).collect();
                let after: String = line_text.chars().skip(split).collect();
                spans.push(Span::styled(before, Styles::default()));
                spans.push(Span::styled("_", Styles::active()));
                spans.push(Span::styled(after, Styles::default()));
                cursor_drawn = true;
            } else {
                spans.push(Span::styled(line_text.to_string(), Styles::default()));
            }

            lines.push(Line::from(spans));
            chars_seen += line_chars + 1; // the newline itself
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

/// Owned input state: content, cursor, and entries recallable with Up/Down.
///
/// The cursor is tracked as a character index so multibyte input edits at
/// the right position.
#[derive(Debug, Clone, Default)]
pub struct TextInputState {
    content: String,
    cursor: usize,
    /// Previously submitted entries, oldest first.
    history: Vec<String>,
    /// How far back into history we are recalled (0 = not recalling).
    history_offset: usize,
    /// Draft stashed when recall starts, restored when it unwinds.
    saved_input: String,
}

impl TextInputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Replace the content and park the cursor at the end.
    pub fn set(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.cursor = self.content.chars().count();
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Hand the content out and reset.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.content)
    }

    fn cursor_byte_offset(&self) -> usize {
        self.content
            .char_indices()
            .nth(self.cursor)
            .map_or(self.content.len(), |(i, _)| i)
    }

    pub fn insert(&mut self, ch: char) {
        let at = self.cursor_byte_offset();
        self.content.insert(at, ch);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        let at = self.cursor_byte_offset();
        self.content.insert_str(at, s);
        self.cursor += s.chars().count();
    }

    /// Remove the character left of the cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.cursor_byte_offset();
            self.content.remove(at);
        }
    }

    /// Remove the character under the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.content.chars().count() {
            let at = self.cursor_byte_offset();
            self.content.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.content.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.content.chars().count();
    }

    /// Take the content, recording non-blank entries for recall.
    pub fn submit(&mut self) -> String {
        let content = self.take();
        if !content.trim().is_empty() {
            self.history.push(content.clone());
        }
        self.history_offset = 0;
        self.saved_input.clear();
        content
    }

    /// Step one entry further back in the recall history.
    pub fn history_prev(&mut self) {
        if self.history_offset >= self.history.len() {
            return;
        }
        if self.history_offset == 0 {
            self.saved_input = self.content.clone();
        }
        self.history_offset += 1;
        let entry = self.history[self.history.len() - self.history_offset].clone();
        self.set(entry);
    }

    /// Step forward again; unwinding fully restores the stashed draft.
    pub fn history_next(&mut self) {
        match self.history_offset {
            0 => {}
            1 => {
                self.history_offset = 0;
                let saved = std::mem::take(&mut self.saved_input);
                self.set(saved);
            }
            _ => {
                self.history_offset -= 1;
                let entry = self.history[self.history.len() - self.history_offset].clone();
                self.set(entry);
            }
        }
    }

    /// Snapshot this state as a renderable widget.
    pub fn widget(&self) -> TextInput<'_> {
        TextInput::new(&self.content, self.cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_editing() {
        let mut state = TextInputState::new();
        assert!(state.is_empty());

        state.insert('H');
        state.insert('i');
        assert_eq!(state.content(), "Hi");

        state.backspace();
        assert_eq!(state.content(), "H");

        state.clear();
        assert!(state.is_empty());
    }

    #[test]
    fn test_cursor_movement() {
        let mut state = TextInputState::new();
        state.insert_str("Hello");

        state.move_left();
        state.move_left();
        state.insert('X');
        assert_eq!(state.content(), "HelXlo");

        state.move_home();
        state.delete();
        assert_eq!(state.content(), "elXlo");

        state.move_end();
        state.backspace();
        assert_eq!(state.content(), "elXl");
    }

    #[test]
    fn test_multibyte_editing() {
        let mut state = TextInputState::new();
        state.insert_str("héllo");
        state.move_left();
        state.move_left();
        state.move_left();
        state.backspace();
        assert_eq!(state.content(), "hllo");
    }

    #[test]
    fn test_history_recall() {
        let mut state = TextInputState::new();

        state.insert_str("first");
        state.submit();
        state.insert_str("second");
        state.submit();

        state.insert_str("draft");
        state.history_prev();
        assert_eq!(state.content(), "second");

        state.history_prev();
        assert_eq!(state.content(), "first");

        state.history_next();
        assert_eq!(state.content(), "second");

        state.history_next();
        assert_eq!(state.content(), "draft");
    }

    #[test]
    fn test_render_multiline_content() {
        use ratatui::layout::Rect;

        let mut state = TextInputState::new();
        state.insert_str("line one");
        state.insert('\n');
        state.insert_str("line two");

        let area = Rect::new(0, 0, 20, 3);
        let mut buf = ratatui::buffer::Buffer::empty(area);
        state.widget().focused(true).render(area, &mut buf);

        let row = |y: u16| -> String {
            (0..20)
                .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
                .collect()
        };
        assert!(row(0).contains("line one"));
        assert!(row(1).contains("line two_"));
    }

    #[test]
    fn test_render_shows_placeholder() {
        use ratatui::layout::Rect;

        let state = TextInputState::new();
        let area = Rect::new(0, 0, 40, 1);
        let mut buf = ratatui::buffer::Buffer::empty(area);
        state
            .widget()
            .focused(true)
            .placeholder("Ask a question...")
            .render(area, &mut buf);

        let line: String = (0..40)
            .map(|x| buf.cell((x, 0)).unwrap().symbol().to_string())
            .collect();
        assert!(line.contains("Ask a question"));
    }
}
