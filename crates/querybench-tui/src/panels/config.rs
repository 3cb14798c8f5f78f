//! Config panel - form over the JSON configuration file.

use crate::app::{App, ConfigField};
use crate::panels::Panel;
use crate::ui::theme::Styles;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// The config editor panel.
pub struct ConfigPanel;

impl Panel for ConfigPanel {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Config Editor ")
            .title_style(Styles::title())
            .borders(Borders::ALL)
            .border_style(Styles::border_active())
            .style(Styles::default());

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Length(6), // Fields (blank line + one per field)
                Constraint::Length(3), // Edit box
                Constraint::Min(0),    // Footer
            ])
            .split(inner);

        let header = if app.config_exists {
            Line::from(Span::styled("  Workspace configuration", Styles::dim()))
        } else {
            Line::from(Span::styled(
                "  No config saved yet - Ctrl+S writes one",
                Styles::warning(),
            ))
        };
        Paragraph::new(vec![header]).render(chunks[0], buf);

        render_fields(app, chunks[1], buf);
        render_edit_box(app, chunks[2], buf);

        let footer = Line::from(vec![
            Span::styled("  ", Styles::dim()),
            Span::styled("[Enter]", Styles::key_hint()),
            Span::styled(" Edit field  ", Styles::dim()),
            Span::styled("[Ctrl+S]", Styles::key_hint()),
            Span::styled(" Save config", Styles::dim()),
        ]);
        Paragraph::new(vec![footer]).render(chunks[3], buf);
    }
}

fn render_fields(app: &App, area: Rect, buf: &mut Buffer) {
    let form = &app.config_form;
    let mut lines = vec![Line::from("")];

    for (i, field) in ConfigField::ALL.iter().enumerate() {
        let is_selected = i == form.selected;
        let prefix = if is_selected { "> " } else { "  " };

        let value = if form.values[i].is_empty() {
            Span::styled("(not set)", Styles::dim())
        } else {
            Span::styled(form.values[i].as_str(), Styles::default())
        };

        let label_style = if is_selected {
            Styles::highlight()
        } else {
            Styles::dim()
        };

        lines.push(Line::from(vec![
            Span::styled(prefix, label_style),
            Span::styled(format!("{:<22}", field.label()), label_style),
            value,
        ]));
    }

    Paragraph::new(lines).render(area, buf);
}

fn render_edit_box(app: &App, area: Rect, buf: &mut Buffer) {
    let form = &app.config_form;
    if !form.editing {
        return;
    }

    let block = Block::default()
        .title(format!(" Editing: {} ", form.field().label()))
        .title_style(Styles::title())
        .borders(Borders::ALL)
        .border_style(Styles::border_active())
        .style(Styles::default());

    let inner = block.inner(area);
    block.render(area, buf);

    form.input.widget().focused(true).render(inner, buf);
}
