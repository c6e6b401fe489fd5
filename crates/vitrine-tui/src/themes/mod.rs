//! Theme registry and loader

mod dracula;
mod nord;
mod one_dark;

use ratatui::style::Color;

use crate::theme::Theme;

/// Parse a hex color string into a ratatui Color
/// Accepts formats: "#RRGGBB", "RRGGBB", "#RGB", "RGB"
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.trim().trim_start_matches('#');

    match hex.len() {
        // Short form: RGB -> RRGGBB
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        _ => None,
    }
}

/// Load a theme by name.
///
/// A name of the form `<theme>:<hex>` overrides the accent color, e.g.
/// `nord:#ff8800`. Unknown names fall back to gruvbox-dark.
pub fn load_theme(name: &str) -> Theme {
    let (base_name, accent) = match name.split_once(':') {
        Some((base, hex)) => (base, parse_hex_color(hex)),
        None => (name, None),
    };

    let mut theme = match base_name.trim().to_lowercase().as_str() {
        "gruvbox-dark" | "gruvbox" => Theme::default(),
        "nord" => nord::default(),
        "dracula" => dracula::default(),
        "one-dark" | "onedark" => one_dark::default(),
        other => {
            tracing::warn!("Unknown theme '{}', using gruvbox-dark", other);
            Theme::default()
        }
    };

    if let Some(color) = accent {
        theme.accent = color;
    }
    theme
}

/// Get list of available theme names
pub fn available_themes() -> Vec<&'static str> {
    vec!["gruvbox-dark", "nord", "dracula", "one-dark"]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color_6digit() {
        let color = parse_hex_color("#ff5500").unwrap();
        assert!(matches!(color, Color::Rgb(255, 85, 0)));
    }

    #[test]
    fn test_parse_hex_color_3digit() {
        let color = parse_hex_color("#f50").unwrap();
        assert!(matches!(color, Color::Rgb(255, 85, 0)));
    }

    #[test]
    fn test_parse_hex_color_invalid() {
        assert!(parse_hex_color("invalid").is_none());
        assert!(parse_hex_color("#gg0000").is_none());
    }

    #[test]
    fn test_load_theme_default() {
        let theme = load_theme("gruvbox-dark");
        assert!(matches!(theme.bg0, Color::Rgb(0x28, 0x28, 0x28)));
        let fallback = load_theme("does-not-exist");
        assert_eq!(fallback.bg0, theme.bg0);
    }

    #[test]
    fn test_load_theme_with_accent() {
        let theme = load_theme("nord:#ff0000");
        assert!(matches!(theme.accent, Color::Rgb(255, 0, 0)));
        assert!(matches!(theme.bg0, Color::Rgb(0x2e, 0x34, 0x40)));
    }

    #[test]
    fn test_every_listed_theme_loads() {
        for name in available_themes() {
            let _ = load_theme(name);
        }
    }
}
