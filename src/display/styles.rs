//! ANSI color palette and text layout helpers

use std::collections::HashMap;

pub const RESET: &str = "\x1b[0m";
pub const CLEAR_SCREEN: &str = "\x1b[2J";

/// Text colors understood by the screen renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Green,
    Cyan,
    Magenta,
    White,
}

impl Color {
    pub fn code(self) -> &'static str {
        match self {
            Color::Red => "\x1b[31m",
            Color::Green => "\x1b[32m",
            Color::Cyan => "\x1b[36m",
            Color::Magenta => "\x1b[35m",
            Color::White => "\x1b[37m",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Cyan => "cyan",
            Color::Magenta => "magenta",
            Color::White => "white",
        }
    }
}

/// Name -> escape code palette.
pub fn palette() -> HashMap<&'static str, &'static str> {
    [
        Color::Red,
        Color::Green,
        Color::Cyan,
        Color::Magenta,
        Color::White,
    ]
    .into_iter()
    .map(|c| (c.name(), c.code()))
    .collect()
}

/// Wrap text in an ANSI code, resetting afterwards.
pub fn ansi_wrap(text: &str, code: &str) -> String {
    format!("{}{}{}", code, text, RESET)
}

/// Center text in a column of `width`, padding with `fill`.
///
/// On odd slack the extra fill goes to the trailing side. Text wider than
/// the column is returned unchanged.
pub fn center_text(text: &str, width: usize, fill: char) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let slack = width - len;
    let front = slack / 2;
    let mut out = String::with_capacity(width);
    for _ in 0..front {
        out.push(fill);
    }
    out.push_str(text);
    for _ in 0..slack - front {
        out.push(fill);
    }
    out
}

/// Singular or plural unit for a count.
pub fn plural(num: i64, unit: &str) -> String {
    if num == 1 {
        unit.to_string()
    } else {
        format!("{}s", unit)
    }
}
