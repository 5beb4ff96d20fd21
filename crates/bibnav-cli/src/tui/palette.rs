use bibnav_engine::Attr;
use bibnav_runtime::{ColorSpec, Config};
use ratatui::style::{Color, Style};

/// Terminal styles of every configurable color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub cursor_line: Style,
    pub top_statusbar: Style,
    pub bottom_statusbar: Style,
    pub search_label: Style,
    pub search_query: Style,
    pub popup_help: Style,
    pub popup_stdout: Style,
    pub popup_stderr: Style,
    pub selection: Style,
}

impl Palette {
    pub fn from_config(config: &Config) -> Self {
        let style = |name: &str| {
            let (fg, bg) = config.color(name);
            Style::default().fg(to_color(fg)).bg(to_color(bg))
        };

        Self {
            cursor_line: style("cursor_line"),
            top_statusbar: style("top_statusbar"),
            bottom_statusbar: style("bottom_statusbar"),
            search_label: style("search_label"),
            search_query: style("search_query"),
            popup_help: style("popup_help"),
            popup_stdout: style("popup_stdout"),
            popup_stderr: style("popup_stderr"),
            selection: style("selection"),
        }
    }

    /// Style of a viewport run. Normal text keeps whatever the cell has.
    pub fn style(&self, attr: Attr) -> Style {
        match attr {
            Attr::Normal => Style::default(),
            Attr::Cursor => self.cursor_line,
            Attr::Selection => self.selection,
            Attr::SearchLabel => self.search_label,
            Attr::SearchQuery => self.search_query,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub fn to_color(spec: ColorSpec) -> Color {
    match spec {
        ColorSpec::Ansi(0) => Color::Black,
        ColorSpec::Ansi(1) => Color::Red,
        ColorSpec::Ansi(2) => Color::Green,
        ColorSpec::Ansi(3) => Color::Yellow,
        ColorSpec::Ansi(4) => Color::Blue,
        ColorSpec::Ansi(5) => Color::Magenta,
        ColorSpec::Ansi(6) => Color::Cyan,
        ColorSpec::Ansi(7) => Color::Gray,
        ColorSpec::Ansi(index) => Color::Indexed(index),
        ColorSpec::Rgb(r, g, b) => Color::Rgb(r, g, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette_matches_config_defaults() {
        let palette = Palette::default();
        assert_eq!(palette.cursor_line, Style::default().fg(Color::Gray).bg(Color::Cyan));
        assert_eq!(palette.top_statusbar, Style::default().fg(Color::Black).bg(Color::Yellow));
        assert_eq!(palette.style(Attr::Selection), palette.selection);
        assert_eq!(palette.style(Attr::Normal), Style::default());
    }

    #[test]
    fn test_configured_rgb_color() {
        let mut config = Config::default();
        config
            .tui
            .colors
            .insert("selection_bg".to_string(), "#102030".to_string());

        let palette = Palette::from_config(&config);
        assert_eq!(palette.selection.bg, Some(Color::Rgb(0x10, 0x20, 0x30)));
    }
}
