//! History panel - saved conversation threads.

use crate::app::{App, FocusedPane};
use crate::panels::Panel;
use crate::ui::theme::Styles;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// The conversation-history panel.
pub struct HistoryPanel;

impl Panel for HistoryPanel {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let focused = app.focus == FocusedPane::History;
        let block = Block::default()
            .title(" History ")
            .title_style(Styles::title())
            .borders(Borders::ALL)
            .border_style(if focused {
                Styles::border_active()
            } else {
                Styles::border()
            })
            .style(Styles::default());

        let inner = block.inner(area);
        block.render(area, buf);

        if app.threads.is_empty() {
            let hint = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled("  No saved conversations", Styles::dim())),
                Line::from(Span::styled("  yet.", Styles::dim())),
            ])
            .style(Styles::default());
            hint.render(inner, buf);
            return;
        }

        let width = usize::from(inner.width);
        let mut lines = Vec::new();
        for (i, summary) in app.threads.iter().enumerate() {
            let is_selected = focused && i == app.selected_thread;
            let prefix = if is_selected { "> " } else { "  " };
            let style = if is_selected {
                Styles::highlight()
            } else {
                Styles::default()
            };

            let title: String = summary
                .title
                .chars()
                .take(width.saturating_sub(prefix.len() + 1))
                .collect();
            lines.push(Line::from(Span::styled(format!("{prefix}{title}"), style)));
            lines.push(Line::from(Span::styled(
                format!(
                    "    {} · {} msgs",
                    summary.updated_at.format("%m-%d %H:%M"),
                    summary.messages
                ),
                Styles::dim(),
            )));
        }

        Paragraph::new(lines).style(Styles::default()).render(inner, buf);
    }
}
