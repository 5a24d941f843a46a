//! Theme colors for the dashboard
//! Defaults can be overridden per role from the `[theme]` table in config.toml

use ratatui::style::Color;
use std::collections::BTreeMap;

/// Theme colors for the UI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub accent: Color,           // Active borders, key hints
    pub primary: Color,          // Rate mode badges
    pub success: Color,          // Collateral checks
    pub warning: Color,          // Isolation mode, status messages
    pub danger: Color,           // Disabled reasons
    pub text: Color,             // Primary text
    pub text_secondary: Color,   // Labels, checkbox border and fill
    pub disabled: Color,         // Disabled checkbox border
    pub paper: Color,            // Unchecked checkbox fill
    pub bg_selected: Color,      // Selection background
    pub inactive: Color,         // Inactive borders
    pub header: Color,           // Table headers
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Rgb(182, 80, 158),
            primary: Color::Rgb(56, 61, 81),
            success: Color::Rgb(70, 188, 74),
            warning: Color::Rgb(247, 159, 26),
            danger: Color::Rgb(188, 0, 55),
            text: Color::Rgb(241, 241, 243),
            text_secondary: Color::Rgb(166, 168, 179),
            disabled: Color::Rgb(98, 103, 125),
            paper: Color::Rgb(41, 46, 65),
            bg_selected: Color::Rgb(56, 61, 81),
            inactive: Color::Rgb(98, 103, 125),
            header: Color::Rgb(166, 168, 179),
        }
    }
}

impl Theme {
    /// Apply `role = "#rrggbb"` overrides on top of the defaults.
    /// Unknown roles and malformed colors are skipped with a warning.
    pub fn from_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut theme = Self::default();

        for (role, value) in overrides {
            let Some(color) = Self::parse_hex_color(value) else {
                tracing::warn!("Ignoring theme color {} = {:?}: not a hex color", role, value);
                continue;
            };

            let slot = match role.as_str() {
                "accent" => &mut theme.accent,
                "primary" => &mut theme.primary,
                "success" => &mut theme.success,
                "warning" => &mut theme.warning,
                "danger" => &mut theme.danger,
                "text" => &mut theme.text,
                "text_secondary" => &mut theme.text_secondary,
                "disabled" => &mut theme.disabled,
                "paper" => &mut theme.paper,
                "bg_selected" => &mut theme.bg_selected,
                "inactive" => &mut theme.inactive,
                "header" => &mut theme.header,
                _ => {
                    tracing::warn!("Ignoring unknown theme role {}", role);
                    continue;
                }
            };
            *slot = color;
        }

        theme
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');

        if !s.is_ascii() {
            return None;
        }

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(Theme::parse_hex_color("#ffc107"), Some(Color::Rgb(255, 193, 7)));
        assert_eq!(Theme::parse_hex_color("fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(Theme::parse_hex_color("#12345"), None);
        assert_eq!(Theme::parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn test_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert("success".to_string(), "#00ff00".to_string());
        overrides.insert("nonsense".to_string(), "#000000".to_string());
        overrides.insert("danger".to_string(), "red".to_string());

        let theme = Theme::from_overrides(&overrides);
        assert_eq!(theme.success, Color::Rgb(0, 255, 0));
        assert_eq!(theme.danger, Theme::default().danger);
    }
}
