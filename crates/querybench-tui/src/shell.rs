//! The three-column view shell.
//!
//! Columns: navigation + history (left), the active main panel (center),
//! backend updates (right), with a one-line status bar underneath. The
//! layout is a pure function of the terminal area so mouse hit-testing and
//! rendering always agree.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::app::{App, View};
use crate::panels::{render_help_overlay, ChatPanel, ConfigPanel, HistoryPanel, Panel, UpdatesPanel};
use crate::ui::theme::Styles;
use crate::ui::widgets::{KeyHint, StatusBar};

/// Minimum terminal width.
pub const MIN_WIDTH: u16 = 40;
/// Minimum terminal height.
pub const MIN_HEIGHT: u16 = 12;

/// Height of the navigation block (two entries plus borders).
const NAV_HEIGHT: u16 = 4;

/// Computed shell regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellLayout {
    pub nav: Rect,
    pub nav_chat: Rect,
    pub nav_config: Rect,
    pub history: Rect,
    pub main: Rect,
    pub updates: Rect,
    pub status: Rect,
}

/// Compute the shell regions for a terminal area.
pub fn shell_layout(area: Rect) -> ShellLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(50),
            Constraint::Percentage(25),
        ])
        .split(rows[0]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(NAV_HEIGHT), Constraint::Min(0)])
        .split(columns[0]);

    let nav = left[0];
    let nav_inner = Rect {
        x: nav.x.saturating_add(1),
        y: nav.y.saturating_add(1),
        width: nav.width.saturating_sub(2),
        height: nav.height.saturating_sub(2),
    };

    ShellLayout {
        nav,
        nav_chat: Rect { height: 1.min(nav_inner.height), ..nav_inner },
        nav_config: Rect {
            y: nav_inner.y.saturating_add(1),
            height: 1.min(nav_inner.height.saturating_sub(1)),
            ..nav_inner
        },
        history: left[1],
        main: columns[1],
        updates: columns[2],
        status: rows[1],
    }
}

/// What a mouse click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseTarget {
    NavChat,
    NavConfig,
    History,
    Main,
    Updates,
}

/// Resolve a click position against the shell layout.
pub fn hit_test(area: Rect, column: u16, row: u16) -> Option<MouseTarget> {
    let layout = shell_layout(area);
    let pos = ratatui::layout::Position::new(column, row);

    if layout.nav_chat.contains(pos) {
        Some(MouseTarget::NavChat)
    } else if layout.nav_config.contains(pos) {
        Some(MouseTarget::NavConfig)
    } else if layout.history.contains(pos) {
        Some(MouseTarget::History)
    } else if layout.main.contains(pos) {
        Some(MouseTarget::Main)
    } else if layout.updates.contains(pos) {
        Some(MouseTarget::Updates)
    } else {
        None
    }
}

/// Render the whole shell.
pub fn render_shell(app: &App, area: Rect, buf: &mut Buffer) {
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        render_too_small(area, buf);
        return;
    }

    let layout = shell_layout(area);

    render_nav(app, layout.nav, buf);
    HistoryPanel.render(app, layout.history, buf);

    match app.view {
        View::Chat => ChatPanel.render(app, layout.main, buf),
        View::Config => ConfigPanel.render(app, layout.main, buf),
    }

    UpdatesPanel.render(app, layout.updates, buf);

    render_status_bar(app, layout.status, buf);

    if app.show_help {
        render_help_overlay(area, buf);
    }
}

/// Render the navigation block with the active view highlighted.
fn render_nav(app: &App, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Styles::border())
        .style(Styles::default());

    let inner = block.inner(area);
    block.render(area, buf);

    let entries = [
        ("Chat Interface", View::Chat),
        ("Config Editor", View::Config),
    ];

    let lines: Vec<Line<'_>> = entries
        .iter()
        .map(|(label, view)| {
            if app.view == *view {
                Line::from(Span::styled(format!(" > {label} "), Styles::nav_active()))
            } else {
                Line::from(Span::styled(format!("   {label} "), Styles::dim()))
            }
        })
        .collect();

    Paragraph::new(lines).render(inner, buf);
}

fn render_status_bar(app: &App, area: Rect, buf: &mut Buffer) {
    let (mode, mut hints) = match app.view {
        View::Chat => (
            "Chat",
            vec![
                KeyHint::new("Enter", "Send"),
                KeyHint::new("Tab", "History"),
                KeyHint::new("Ctrl+N", "New"),
                KeyHint::new("Ctrl+R", "Evaluate"),
            ],
        ),
        View::Config => (
            "Config",
            vec![
                KeyHint::new("Enter", "Edit"),
                KeyHint::new("Ctrl+S", "Save"),
                KeyHint::new("Esc", "Cancel"),
            ],
        ),
    };
    hints.push(KeyHint::new("?", "Help"));

    let mut status_bar = StatusBar::new(mode).hints(hints);
    if let Some(notification) = &app.notification {
        status_bar = status_bar.right(notification);
    } else {
        status_bar = status_bar.right(app.assistant_name());
    }
    status_bar.render(area, buf);
}

/// Render the "terminal too small" notice.
fn render_too_small(area: Rect, buf: &mut Buffer) {
    let msg = format!("Terminal too small (need {MIN_WIDTH}x{MIN_HEIGHT})");
    Paragraph::new(Line::from(Span::styled(msg, Styles::warning()))).render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_regions_tile_the_area() {
        let area = Rect::new(0, 0, 80, 24);
        let layout = shell_layout(area);

        assert_eq!(layout.status.height, 1);
        assert_eq!(layout.status.y, 23);
        assert_eq!(layout.nav.height, NAV_HEIGHT);
        assert_eq!(layout.history.x, layout.nav.x);
        assert!(layout.main.x > layout.nav.x);
        assert!(layout.updates.x > layout.main.x);
        assert_eq!(
            layout.nav.width + layout.main.width + layout.updates.width,
            area.width
        );
    }

    #[test]
    fn test_nav_rows_sit_inside_nav_block() {
        let layout = shell_layout(Rect::new(0, 0, 80, 24));
        assert_eq!(layout.nav_chat.y, layout.nav.y + 1);
        assert_eq!(layout.nav_config.y, layout.nav.y + 2);
        assert_eq!(layout.nav_chat.height, 1);
        assert_eq!(layout.nav_config.height, 1);
    }

    #[test]
    fn test_hit_test_nav_rows() {
        let area = Rect::new(0, 0, 80, 24);
        let layout = shell_layout(area);

        assert_eq!(
            hit_test(area, layout.nav_chat.x + 2, layout.nav_chat.y),
            Some(MouseTarget::NavChat)
        );
        assert_eq!(
            hit_test(area, layout.nav_config.x + 2, layout.nav_config.y),
            Some(MouseTarget::NavConfig)
        );
    }

    #[test]
    fn test_hit_test_columns() {
        let area = Rect::new(0, 0, 80, 24);
        let layout = shell_layout(area);

        assert_eq!(
            hit_test(area, layout.history.x + 1, layout.history.y + 2),
            Some(MouseTarget::History)
        );
        assert_eq!(
            hit_test(area, layout.main.x + 5, layout.main.y + 5),
            Some(MouseTarget::Main)
        );
        assert_eq!(
            hit_test(area, layout.updates.x + 1, layout.updates.y + 1),
            Some(MouseTarget::Updates)
        );
    }
}
