//! Theme system for the TUI.
//!
//! Semantic color roles map to ratatui `Style` values. `ThemeVariant`
//! selects the Dark or Light palette, and `StyleMap` resolves role names to
//! concrete styles.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

use crate::chart::Rgba;

// ============================================================================
// Theme Variant
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }

    /// Lower-case key as stored in config and preferences.
    pub fn key(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

/// Every semantic UI role mapped to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Lists --
    pub list_normal: Style,
    pub list_selected: Style,
    pub list_secondary: Style,
    pub favorite_mark: Style,

    // -- Tabs --
    pub tab_active: Style,
    pub tab_inactive: Style,

    // -- Detail overlay --
    pub detail_label: Style,
    pub detail_value: Style,

    // -- Dashboard --
    pub chart_title: Style,
    pub chart_value: Style,

    // -- Settings forms --
    pub form_label: Style,
    pub form_input: Style,
    pub form_input_focused: Style,

    // -- Chrome --
    pub status_bar: Style,
    pub status_error: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
    pub muted: Style,
    pub error_text: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            list_normal: Style::default(),
            list_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            list_secondary: Style::default().fg(Color::Gray),
            favorite_mark: Style::default().fg(Color::Yellow),

            tab_active: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),

            detail_label: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            detail_value: Style::default(),

            chart_title: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            chart_value: Style::default().add_modifier(Modifier::BOLD),

            form_label: Style::default().fg(Color::Gray),
            form_input: Style::default(),
            form_input_focused: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::UNDERLINED),

            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            status_error: Style::default().bg(Color::Red).fg(Color::White),
            panel_border: Style::default(),
            panel_border_focused: Style::default().fg(Color::Cyan),
            muted: Style::default().fg(Color::DarkGray),
            error_text: Style::default().fg(Color::Red),
        }
    }

    fn light() -> Self {
        Self {
            list_normal: Style::default().fg(Color::Black),
            list_selected: Style::default().bg(Color::Blue).fg(Color::White),
            list_secondary: Style::default().fg(Color::DarkGray),
            favorite_mark: Style::default().fg(Color::Magenta),

            tab_active: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),

            detail_label: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            detail_value: Style::default().fg(Color::Black),

            chart_title: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            chart_value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            form_label: Style::default().fg(Color::DarkGray),
            form_input: Style::default().fg(Color::Black),
            form_input_focused: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::UNDERLINED),

            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            status_error: Style::default().bg(Color::Red).fg(Color::White),
            panel_border: Style::default().fg(Color::DarkGray),
            panel_border_focused: Style::default().fg(Color::Blue),
            muted: Style::default().fg(Color::Gray),
            error_text: Style::default().fg(Color::Red),
        }
    }
}

/// Terminal colour for a chart slice. Terminals have no alpha; opacity is dropped.
pub fn slice_color(c: Rgba) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

// ============================================================================
// Style Map
// ============================================================================

/// Role-name lookup over a `ColorPalette`.
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

const ROLE_NAMES: [&str; 19] = [
    "list_normal",
    "list_selected",
    "list_secondary",
    "favorite_mark",
    "tab_active",
    "tab_inactive",
    "detail_label",
    "detail_value",
    "chart_title",
    "chart_value",
    "form_label",
    "form_input",
    "form_input_focused",
    "status_bar",
    "status_error",
    "panel_border",
    "panel_border_focused",
    "muted",
    "error_text",
];

impl StyleMap {
    pub fn from_palette(p: &ColorPalette) -> Self {
        let styles: [Style; 19] = [
            p.list_normal,
            p.list_selected,
            p.list_secondary,
            p.favorite_mark,
            p.tab_active,
            p.tab_inactive,
            p.detail_label,
            p.detail_value,
            p.chart_title,
            p.chart_value,
            p.form_label,
            p.form_input,
            p.form_input_focused,
            p.status_bar,
            p.status_error,
            p.panel_border,
            p.panel_border_focused,
            p.muted,
            p.error_text,
        ];

        Self {
            map: ROLE_NAMES.into_iter().zip(styles).collect(),
        }
    }

    pub fn for_variant(variant: ThemeVariant) -> Self {
        Self::from_palette(&variant.palette())
    }

    /// Style for a role; unknown roles get `Style::default()`.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_from_str_name() {
        assert_eq!(ThemeVariant::from_str_name("dark"), Some(ThemeVariant::Dark));
        assert_eq!(ThemeVariant::from_str_name(" Light "), Some(ThemeVariant::Light));
        assert_eq!(ThemeVariant::from_str_name("neon"), None);
    }

    #[test]
    fn variant_cycles() {
        assert_eq!(ThemeVariant::Dark.next(), ThemeVariant::Light);
        assert_eq!(ThemeVariant::Light.next().key(), "dark");
    }

    #[test]
    fn light_selection_differs_from_dark() {
        let dark = ThemeVariant::Dark.palette();
        let light = ThemeVariant::Light.palette();
        assert_ne!(dark.list_selected, light.list_selected);
        assert_eq!(dark.error_text, light.error_text);
    }

    #[test]
    fn style_map_resolves_known_roles() {
        let palette = ThemeVariant::Dark.palette();
        let sm = StyleMap::from_palette(&palette);
        assert_eq!(sm.resolve("favorite_mark"), palette.favorite_mark);
        assert_eq!(sm.resolve("status_bar"), palette.status_bar);
        assert_eq!(sm.resolve("nonexistent_role"), Style::default());
    }

    #[test]
    fn style_map_has_every_role() {
        let sm = StyleMap::for_variant(ThemeVariant::Light);
        assert_eq!(sm.map.len(), ROLE_NAMES.len());
    }

    #[test]
    fn slice_color_drops_alpha() {
        assert_eq!(slice_color(Rgba::new(1, 2, 3, 0.9)), Color::Rgb(1, 2, 3));
    }
}
