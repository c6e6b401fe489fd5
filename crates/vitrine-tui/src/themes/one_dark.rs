//! One Dark theme
//! https://github.com/atom/atom/tree/master/packages/one-dark-syntax

use ratatui::style::Color;
use crate::theme::Theme;

pub fn default() -> Theme {
    Theme {
        bg0: Color::Rgb(0x28, 0x2c, 0x34), // bg
        bg1: Color::Rgb(0x21, 0x25, 0x2b), // bg-darker
        bg2: Color::Rgb(0x3e, 0x44, 0x51), // bg-highlight
        fg0: Color::Rgb(0xab, 0xb2, 0xbf), // fg
        fg1: Color::Rgb(0x9d, 0xa5, 0xb4),
        muted: Color::Rgb(0x5c, 0x63, 0x70), // comment
        red: Color::Rgb(0xe0, 0x6c, 0x75),
        yellow: Color::Rgb(0xe5, 0xc0, 0x7b),
        green: Color::Rgb(0x98, 0xc3, 0x79),
        aqua: Color::Rgb(0x56, 0xb6, 0xc2),
        blue: Color::Rgb(0x61, 0xaf, 0xef),
        purple: Color::Rgb(0xc6, 0x78, 0xdd),
        selection: Color::Rgb(0x3e, 0x44, 0x51),
        link: Color::Rgb(0x61, 0xaf, 0xef),
        error: Color::Rgb(0xe0, 0x6c, 0x75),
        accent: Color::Rgb(0x56, 0xb6, 0xc2),
    }
}
