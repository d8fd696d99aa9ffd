//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Priority;

pub const ACCENT: Color = Color::Rgb(123, 104, 238);
pub const ERROR_RED: Color = Color::Rgb(200, 40, 40);
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
pub const MUTED: Color = Color::DarkGray;

/// Row color for a priority in the wizard.
pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Urgent => Color::Rgb(245, 60, 60),
        Priority::High => Color::Rgb(255, 200, 0),
        Priority::Normal => Color::Rgb(100, 150, 255),
        Priority::Low => Color::Rgb(160, 160, 160),
        Priority::None => Color::White,
    }
}

/// Parse a `#rrggbb` color as sent by the service.
pub fn hex_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color("#d3d3d3"), Some(Color::Rgb(211, 211, 211)));
        assert_eq!(hex_color("6bc950"), Some(Color::Rgb(107, 201, 80)));
        assert_eq!(hex_color("#fff"), None);
        assert_eq!(hex_color("#zzzzzz"), None);
        assert_eq!(hex_color(""), None);
    }
}
