//! Backend updates panel - the bounded engine activity feed.

use crate::app::{App, UpdateKind};
use crate::panels::Panel;
use crate::ui::theme::{meter, Glyphs, Styles};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

/// The backend-updates panel.
pub struct UpdatesPanel;

impl Panel for UpdatesPanel {
    #[allow(clippy::cast_precision_loss)]
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Backend Updates ")
            .title_style(Styles::title())
            .borders(Borders::ALL)
            .border_style(Styles::border())
            .style(Styles::default());

        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = Vec::new();

        if app.updates.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "  No backend activity yet.",
                Styles::dim(),
            )));
        } else {
            // Most recent entries at the bottom, as many as fit
            let visible = usize::from(inner.height).saturating_sub(2);
            let skip = app.updates.len().saturating_sub(visible);
            for entry in app.updates.iter().skip(skip) {
                let (symbol, style) = match entry.kind {
                    UpdateKind::Info => (Glyphs::NOTE, Styles::dim()),
                    UpdateKind::Success => (Glyphs::OK, Styles::success()),
                    UpdateKind::Error => (Glyphs::FAIL, Styles::error()),
                };
                lines.push(Line::from(vec![
                    Span::styled(format!("{} ", entry.timestamp.format("%H:%M:%S")), Styles::dim()),
                    Span::styled(format!("{symbol} "), style),
                    Span::styled(entry.message.as_str(), Styles::default()),
                ]));
            }
        }

        if app.eval_running {
            let progress = if app.eval_total == 0 {
                0.0
            } else {
                app.eval_done as f32 / app.eval_total as f32
            };
            let spinner = Glyphs::SPINNER[app.tick % Glyphs::SPINNER.len()];
            lines.push(Line::from(Span::styled(
                format!(
                    "{spinner} evaluating {} {}/{}",
                    meter(progress, 12),
                    app.eval_done,
                    app.eval_total
                ),
                Styles::active(),
            )));
        }

        Paragraph::new(lines)
            .style(Styles::default())
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
