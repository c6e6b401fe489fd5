//! Nord theme
//! https://www.nordtheme.com/

use ratatui::style::Color;
use crate::theme::Theme;

pub fn default() -> Theme {
    Theme {
        // Polar Night
        bg0: Color::Rgb(0x2e, 0x34, 0x40), // nord0
        bg1: Color::Rgb(0x3b, 0x42, 0x52), // nord1
        bg2: Color::Rgb(0x43, 0x4c, 0x5e), // nord2
        // Snow Storm
        fg0: Color::Rgb(0xec, 0xef, 0xf4), // nord6
        fg1: Color::Rgb(0xe5, 0xe9, 0xf0), // nord5
        muted: Color::Rgb(0x61, 0x6e, 0x88),
        // Aurora
        red: Color::Rgb(0xbf, 0x61, 0x6a),    // nord11
        yellow: Color::Rgb(0xeb, 0xcb, 0x8b), // nord13
        green: Color::Rgb(0xa3, 0xbe, 0x8c),  // nord14
        purple: Color::Rgb(0xb4, 0x8e, 0xad), // nord15
        // Frost
        aqua: Color::Rgb(0x8f, 0xbc, 0xbb), // nord7
        blue: Color::Rgb(0x81, 0xa1, 0xc1), // nord9
        selection: Color::Rgb(0x43, 0x4c, 0x5e),
        link: Color::Rgb(0x88, 0xc0, 0xd0), // nord8
        error: Color::Rgb(0xbf, 0x61, 0x6a),
        accent: Color::Rgb(0x8f, 0xbc, 0xbb),
    }
}
