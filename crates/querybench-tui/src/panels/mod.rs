//! Panel definitions for the querybench TUI.

mod chat;
mod config;
mod history;
mod updates;

pub use chat::ChatPanel;
pub use config::ConfigPanel;
pub use history::HistoryPanel;
pub use updates::UpdatesPanel;

use crate::app::App;
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

/// Trait for panels that can be rendered.
pub trait Panel {
    /// Render the panel to the buffer.
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

/// Key bindings shown in the help overlay.
const HELP_KEYS: [(&str, &str); 10] = [
    ("1 / F1", "Chat interface"),
    ("2 / F2", "Config editor"),
    ("Tab", "Focus history panel"),
    ("j/k or Up/Down", "Scroll / select"),
    ("Enter", "Send / edit / open"),
    ("Ctrl+N", "New conversation"),
    ("Ctrl+R", "Run or cancel evaluation"),
    ("Ctrl+S", "Save config"),
    ("q or Esc", "Quit"),
    ("?", "Toggle this help"),
];

/// Render the help overlay.
pub fn render_help_overlay(area: Rect, buf: &mut Buffer) {
    use crate::ui::centered_fixed;
    use crate::ui::theme::Styles;
    use ratatui::text::{Line, Span};
    use ratatui::widgets::{Block, Borders, Clear, Paragraph};

    let mut lines = vec![Line::from("")];
    for (key, what) in HELP_KEYS {
        lines.push(Line::from(vec![
            Span::styled(format!("  {key:<16}"), Styles::highlight()),
            Span::styled(what, Styles::default()),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  [Press any key to close]",
        Styles::dim(),
    )));

    #[allow(clippy::cast_possible_truncation)]
    let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(4));
    let width = 52.min(area.width.saturating_sub(4));
    let overlay = centered_fixed(width, height, area);

    Clear.render(overlay, buf);

    let block = Block::default()
        .title(" Help ")
        .title_style(Styles::title())
        .borders(Borders::ALL)
        .border_style(Styles::border_active())
        .style(Styles::default());

    Paragraph::new(lines)
        .block(block)
        .style(Styles::default())
        .render(overlay, buf);
}
