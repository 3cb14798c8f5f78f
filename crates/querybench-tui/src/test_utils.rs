//! Shared helpers for exercising the shell in tests.

use crate::app::App;
use crate::shell::render_shell;
use ratatui::{buffer::Buffer, layout::Rect};

/// Standard test terminal size.
pub const TEST_WIDTH: u16 = 80;
pub const TEST_HEIGHT: u16 = 24;

/// App seeded with in-memory fixtures; never touches the filesystem.
pub fn create_test_app() -> App {
    App::new_for_test()
}

/// Flatten a buffer into newline-joined rows, trailing blanks removed, so
/// assertions can use plain `contains`.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut rows = Vec::with_capacity(usize::from(area.height));
    for y in area.y..area.y + area.height {
        let row: String = (area.x..area.x + area.width)
            .map(|x| buffer.cell((x, y)).map_or(" ", ratatui::buffer::Cell::symbol))
            .collect();
        rows.push(row.trim_end().to_string());
    }
    rows.join("\n")
}

/// Render the full shell at the standard size.
pub fn render_shell_to_string(app: &App) -> String {
    render_shell_to_string_sized(app, TEST_WIDTH, TEST_HEIGHT)
}

/// Render the full shell at a custom size.
pub fn render_shell_to_string_sized(app: &App, width: u16, height: u16) -> String {
    let area = Rect::new(0, 0, width, height);
    let mut buffer = Buffer::empty(area);
    render_shell(app, area, &mut buffer);
    buffer_to_string(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_to_string_trims_rows() {
        let area = Rect::new(0, 0, 10, 2);
        let mut buffer = Buffer::empty(area);
        buffer.set_string(0, 0, "Hello", ratatui::style::Style::default());

        let result = buffer_to_string(&buffer);
        assert_eq!(result, "Hello\n");
    }
}
