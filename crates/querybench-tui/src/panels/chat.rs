//! Chat panel - the conversation transcript and input box.

use crate::app::{App, FocusedPane};
use crate::panels::Panel;
use crate::ui::theme::Styles;
use querybench_engine::Role;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

/// The chat interface panel.
pub struct ChatPanel;

impl Panel for ChatPanel {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),    // Transcript
                Constraint::Length(4), // Input
            ])
            .split(area);

        render_transcript(app, chunks[0], buf);
        render_input(app, chunks[1], buf);
    }
}

fn render_transcript(app: &App, area: Rect, buf: &mut Buffer) {
    let focused = app.focus == FocusedPane::Main;
    let block = Block::default()
        .title(" Chat ")
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

    if app.thread.messages.is_empty() {
        let hint = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Ask a question about your data:",
                Styles::highlight(),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "  Example: \"How many orders shipped",
                Styles::dim(),
            )),
            Line::from(Span::styled("  in the last 30 days?\"", Styles::dim())),
            Line::from(""),
            Line::from(Span::styled(
                "  The assistant answers with a SQL",
                Styles::dim(),
            )),
            Line::from(Span::styled("  statement you can run.", Styles::dim())),
        ])
        .style(Styles::default());
        hint.render(inner, buf);
        return;
    }

    let mut lines = Vec::new();
    for msg in &app.thread.messages {
        let (prefix, style) = match msg.role {
            Role::User => ("You", Styles::highlight()),
            Role::Assistant => (msg.assistant.as_deref().unwrap_or("Assistant"), Styles::active()),
            Role::System => ("System", Styles::dim()),
        };

        let content_lines: Vec<&str> = msg.content.lines().collect();
        if let Some(first) = content_lines.first() {
            lines.push(Line::from(vec![
                Span::styled(format!("{prefix}: "), style),
                Span::styled(*first, Styles::default()),
            ]));
        }
        for line in content_lines.iter().skip(1) {
            lines.push(Line::from(Span::styled(
                format!("  {line}"),
                Styles::default(),
            )));
        }
        lines.push(Line::from("")); // Blank line between messages
    }

    if app.chat_in_progress {
        lines.push(Line::from(Span::styled(
            format!("  Waiting for {}...", app.assistant_name()),
            Styles::dim(),
        )));
    }

    let visible: Vec<Line<'_>> = lines.into_iter().skip(app.transcript_scroll).collect();

    Paragraph::new(visible)
        .style(Styles::default())
        .wrap(Wrap { trim: false })
        .render(inner, buf);
}

fn render_input(app: &App, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .title(" Input ")
        .title_style(Styles::title())
        .borders(Borders::ALL)
        .border_style(if app.chat_in_progress {
            Styles::dim()
        } else {
            Styles::border_active()
        })
        .style(Styles::default());

    let inner = block.inner(area);
    block.render(area, buf);

    app.input_state
        .widget()
        .focused(!app.chat_in_progress && app.focus == FocusedPane::Main)
        .placeholder("Type your question here...")
        .render(inner, buf);
}
