//! Palette, glyphs, and the style table shared by every panel.

use ratatui::style::{Color, Modifier, Style};

const fn tone(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(r, g, b)
}

/// Fixed color palette. Panels never name colors directly; everything
/// routes through [`Styles`] so the palette can change in one place.
pub struct Palette;

impl Palette {
    pub const BG: Color = tone(28, 30, 38);
    pub const FG: Color = tone(222, 222, 230);
    pub const DIM: Color = tone(136, 140, 158);

    pub const ACCENT: Color = tone(120, 170, 255);

    pub const SUCCESS: Color = tone(130, 220, 130);
    pub const WARNING: Color = tone(240, 200, 100);
    pub const ERROR: Color = tone(240, 100, 100);

    pub const BORDER: Color = tone(80, 80, 100);
    pub const BORDER_ACTIVE: Color = Self::ACCENT;

    // Status bar, kept high-contrast against BG
    pub const STATUS_BG: Color = tone(44, 46, 60);
    pub const STATUS_KEY_BG: Color = tone(68, 90, 140);
}

/// Feed glyphs, ASCII so any terminal renders them.
pub struct Glyphs;

impl Glyphs {
    pub const OK: &'static str = "[ok]";
    pub const FAIL: &'static str = "[x]";
    pub const NOTE: &'static str = "[i]";
    pub const SPINNER: [&'static str; 4] = ["|", "/", "-", "\\"];
}

fn on_base(fg: Color) -> Style {
    Style::default().fg(fg).bg(Palette::BG)
}

/// Style table for the TUI.
pub struct Styles;

impl Styles {
    pub fn default() -> Style {
        on_base(Palette::FG)
    }

    pub fn dim() -> Style {
        on_base(Palette::DIM)
    }

    /// Selected row or emphasized label.
    pub fn highlight() -> Style {
        on_base(Palette::ACCENT).add_modifier(Modifier::BOLD)
    }

    pub fn active() -> Style {
        on_base(Palette::ACCENT)
    }

    /// Inverted fill for the navigation entry matching the current view.
    pub fn nav_active() -> Style {
        Style::default()
            .fg(Palette::BG)
            .bg(Palette::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn success() -> Style {
        on_base(Palette::SUCCESS)
    }

    pub fn warning() -> Style {
        on_base(Palette::WARNING)
    }

    pub fn error() -> Style {
        on_base(Palette::ERROR)
    }

    /// Block titles.
    pub fn title() -> Style {
        Style::default()
            .fg(Palette::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    /// Key chip in the status bar.
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Palette::FG)
            .bg(Palette::STATUS_KEY_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Label next to a key chip.
    pub fn key_label() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::STATUS_BG)
    }

    pub fn status_bar() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::STATUS_BG)
    }

    pub fn border() -> Style {
        Style::default().fg(Palette::BORDER)
    }

    pub fn border_active() -> Style {
        Style::default().fg(Palette::BORDER_ACTIVE)
    }
}

/// Fixed-width `[====  ]` meter for the evaluation progress line.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn meter(fraction: f32, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f32).round() as usize).min(width);
    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    for slot in 0..width {
        bar.push(if slot < filled { '=' } else { ' ' });
    }
    bar.push(']');
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meter_fill() {
        assert_eq!(meter(0.0, 10), "[          ]");
        assert_eq!(meter(0.5, 10), "[=====     ]");
        assert_eq!(meter(1.0, 10), "[==========]");
        assert_eq!(meter(2.0, 4), "[====]");
    }
}
