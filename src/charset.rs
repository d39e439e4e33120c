//! Glyph tables for box-drawing output at different terminal capability
//! levels, plus per-style line/arrow glyph selection (spec.md §6, §4.7).

use serde::Deserialize;

/// Terminal capability descriptor, supplied by an external collaborator
/// (spec.md §6): controls which glyph set is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnicodeLevel {
    /// No box-drawing: everything collapses to `+ - | < > ^ v`.
    None,
    /// Lines become plain `- |`, corners/junctions still collapse to `+`.
    Basic,
    /// Full Unicode box-drawing set.
    Extended,
    #[default]
    Full,
}

impl UnicodeLevel {
    fn uses_box_drawing(self) -> bool {
        matches!(self, UnicodeLevel::Extended | UnicodeLevel::Full)
    }
}

/// The full glyph palette for one capability level: corners, lines,
/// T-junctions, cross, and arrowheads.
#[derive(Debug, Clone, Copy)]
pub struct BoxChars {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
    pub tee_right: char, // ├
    pub tee_left: char,  // ┤
    pub tee_down: char,  // ┬
    pub tee_up: char,    // ┴
    pub cross: char,     // ┼
    pub arrow_right: char,
    pub arrow_left: char,
    pub arrow_down: char,
    pub arrow_up: char,
    pub bullet: char,
}

impl BoxChars {
    pub fn for_level(level: UnicodeLevel) -> Self {
        if level.uses_box_drawing() {
            Self::unicode()
        } else {
            Self::ascii()
        }
    }

    fn unicode() -> Self {
        Self {
            top_left: '┌',
            top_right: '┐',
            bottom_left: '└',
            bottom_right: '┘',
            horizontal: '─',
            vertical: '│',
            tee_right: '├',
            tee_left: '┤',
            tee_down: '┬',
            tee_up: '┴',
            cross: '┼',
            arrow_right: '▶',
            arrow_left: '◀',
            arrow_down: '▼',
            arrow_up: '▲',
            bullet: '●',
        }
    }

    fn ascii() -> Self {
        Self {
            top_left: '+',
            top_right: '+',
            bottom_left: '+',
            bottom_right: '+',
            horizontal: '-',
            vertical: '|',
            tee_right: '+',
            tee_left: '+',
            tee_down: '+',
            tee_up: '+',
            cross: '+',
            arrow_right: '>',
            arrow_left: '<',
            arrow_down: 'v',
            arrow_up: '^',
            bullet: 'o',
        }
    }

    /// Double-stroked border variant for `box-style=double` / `style=double`.
    pub fn double() -> Self {
        let mut bc = Self::unicode();
        bc.top_left = '╔';
        bc.top_right = '╗';
        bc.bottom_left = '╚';
        bc.bottom_right = '╝';
        bc.horizontal = '═';
        bc.vertical = '║';
        bc
    }

    /// Rounded-corner variant for `style=rounded`.
    pub fn rounded() -> Self {
        let mut bc = Self::unicode();
        bc.top_left = '╭';
        bc.top_right = '╮';
        bc.bottom_left = '╰';
        bc.bottom_right = '╯';
        bc
    }
}

/// Which line glyph a connection's `style` hint selects for its
/// horizontal/vertical runs (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    Thick,
}

impl LineStyle {
    pub fn from_hint(value: Option<&str>) -> Self {
        match value {
            Some("dashed") => LineStyle::Dashed,
            Some("dotted") => LineStyle::Dotted,
            Some("thick") => LineStyle::Thick,
            _ => LineStyle::Solid,
        }
    }

    /// (horizontal, vertical) line glyphs for this style under the given
    /// capability level. Dashed/dotted/thick fall back to plain glyphs
    /// when box-drawing isn't available.
    pub fn glyphs(self, level: UnicodeLevel) -> (char, char) {
        let bc = BoxChars::for_level(level);
        if !level.uses_box_drawing() {
            return (bc.horizontal, bc.vertical);
        }
        match self {
            LineStyle::Solid => (bc.horizontal, bc.vertical),
            LineStyle::Dashed => ('╌', '╎'),
            LineStyle::Dotted => ('·', '·'),
            LineStyle::Thick => ('━', '┃'),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_and_basic_collapse_to_ascii() {
        assert_eq!(BoxChars::for_level(UnicodeLevel::None).cross, '+');
        assert_eq!(BoxChars::for_level(UnicodeLevel::Basic).vertical, '|');
    }

    #[test]
    fn extended_and_full_use_box_drawing() {
        assert_eq!(BoxChars::for_level(UnicodeLevel::Extended).cross, '┼');
        assert_eq!(BoxChars::for_level(UnicodeLevel::Full).cross, '┼');
    }

    #[test]
    fn dashed_falls_back_without_unicode() {
        let style = LineStyle::Dashed;
        assert_eq!(style.glyphs(UnicodeLevel::None), ('-', '|'));
        assert_eq!(style.glyphs(UnicodeLevel::Full), ('╌', '╎'));
    }
}
