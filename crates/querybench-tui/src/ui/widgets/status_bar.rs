//! One-line bottom bar: mode chip, key hints, right-aligned text.

use crate::ui::theme::{Palette, Styles};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

/// A key chip plus its short label.
#[derive(Debug, Clone)]
pub struct KeyHint {
    pub key: &'static str,
    pub label: &'static str,
}

impl KeyHint {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

/// The bottom bar widget.
#[derive(Debug, Clone)]
pub struct StatusBar<'a> {
    mode: &'a str,
    hints: Vec<KeyHint>,
    right_text: Option<&'a str>,
}

impl<'a> StatusBar<'a> {
    pub fn new(mode: &'a str) -> Self {
        Self {
            mode,
            hints: Vec::new(),
            right_text: None,
        }
    }

    #[must_use]
    pub fn hints(mut self, hints: Vec<KeyHint>) -> Self {
        self.hints = hints;
        self
    }

    #[must_use]
    pub fn right(mut self, text: &'a str) -> Self {
        self.right_text = Some(text);
        self
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let row = Rect { height: 1, ..area };
        buf.set_style(row, Styles::status_bar());
        for x in row.left()..row.right() {
            buf[(x, row.y)].set_char(' ');
        }

        let chip = Span::styled(
            format!(" {} ", self.mode),
            Styles::default().bg(Palette::ACCENT).fg(Palette::BG),
        );
        let mut spans = vec![chip, Span::raw(" ")];
        for hint in &self.hints {
            spans.push(Span::styled(format!(" {} ", hint.key), Styles::key_hint()));
            spans.push(Span::styled(format!(" {} ", hint.label), Styles::key_label()));
        }
        buf.set_line(row.x, row.y, &Line::from(spans), row.width);

        // Right text wins over hints if they collide; it is short (assistant
        // name or a notification) and more current.
        if let Some(text) = self.right_text {
            #[allow(clippy::cast_possible_truncation)]
            let len = text.chars().count() as u16;
            if len < row.width {
                buf.set_string(row.right() - len - 1, row.y, text, Styles::status_bar());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_bar_renders_mode_and_hints() {
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);

        StatusBar::new("Chat")
            .hints(vec![KeyHint::new("Enter", "Send")])
            .right("claude")
            .render(area, &mut buf);

        let line: String = (0..60)
            .map(|x| buf.cell((x, 0)).unwrap().symbol().to_string())
            .collect();
        assert!(line.contains("Chat"));
        assert!(line.contains("Enter"));
        assert!(line.contains("Send"));
        assert!(line.contains("claude"));
    }

    #[test]
    fn test_status_bar_zero_height_is_noop() {
        let area = Rect::new(0, 0, 10, 0);
        let mut buf = Buffer::empty(area);
        StatusBar::new("Chat").render(area, &mut buf);
    }
}
