//! Canvas (C2): a bounds-checked 2-D grid of glyphs with optional per-cell
//! colour/style attributes.
//!
//! Grounded on the teacher's `renderers/canvas.rs` (`Canvas`, `set_merge`,
//! `hline`/`vline`/`draw_box`, `render_to_string`), extended with a
//! per-cell `CellStyle` (colour + bold) and an ANSI-annotated render path
//! per spec.md §6 ("lines are annotated with ANSI SGR escape sequences").

use crate::charset::BoxChars;
use crate::geometry::{Bounds, Point};
use crate::junction::{self, Glyph};

/// A colour token as accepted in node/connection `color`/`border-color`
/// hints (spec.md §6): a named colour or a 3-/6-digit hex code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Color {
    Named(String),
    Rgb(u8, u8, u8),
}

impl Color {
    pub fn parse(value: &str) -> Option<Self> {
        let v = value.trim();
        if let Some(hex) = v.strip_prefix('#') {
            return Self::from_hex(hex);
        }
        if v.chars().all(|c| c.is_ascii_hexdigit()) && (v.len() == 3 || v.len() == 6) {
            return Self::from_hex(v);
        }
        match v.to_ascii_lowercase().as_str() {
            "black" | "red" | "green" | "yellow" | "blue" | "magenta" | "cyan" | "white" => {
                Some(Color::Named(v.to_ascii_lowercase()))
            }
            _ => None,
        }
    }

    fn from_hex(hex: &str) -> Option<Self> {
        let expand = |c: char| -> Option<u8> {
            let s: String = [c, c].iter().collect();
            u8::from_str_radix(&s, 16).ok()
        };
        match hex.len() {
            3 => {
                let mut chars = hex.chars();
                let r = expand(chars.next()?)?;
                let g = expand(chars.next()?)?;
                let b = expand(chars.next()?)?;
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

    /// ANSI SGR foreground escape sequence for this colour.
    fn ansi_fg(&self) -> String {
        match self {
            Color::Named(name) => {
                let code = match name.as_str() {
                    "black" => 30,
                    "red" => 31,
                    "green" => 32,
                    "yellow" => 33,
                    "blue" => 34,
                    "magenta" => 35,
                    "cyan" => 36,
                    "white" => 37,
                    _ => 39,
                };
                format!("\x1b[{code}m")
            }
            Color::Rgb(r, g, b) => format!("\x1b[38;2;{r};{g};{b}m"),
        }
    }
}

/// Per-cell style attributes. `None` throughout a run means no escape
/// sequences are emitted for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellStyle {
    pub color: Option<Color>,
    pub bold: bool,
}

impl CellStyle {
    fn ansi_prefix(&self) -> String {
        let mut out = String::new();
        if self.bold {
            out.push_str("\x1b[1m");
        }
        if let Some(color) = &self.color {
            out.push_str(&color.ansi_fg());
        }
        out
    }

    fn is_plain(&self) -> bool {
        self.color.is_none() && !self.bold
    }
}

/// A 2-D character grid. All writes are bounds-checked and silently
/// ignored out of range; all reads return `' '` for out-of-range cells.
pub struct Canvas {
    width: usize,
    height: usize,
    charset: BoxChars,
    cells: Vec<Vec<char>>,
    styles: Vec<Vec<CellStyle>>,
}

impl Canvas {
    pub fn new(width: usize, height: usize, charset: BoxChars) -> Self {
        Self {
            width,
            height,
            charset,
            cells: vec![vec![' '; width]; height],
            styles: vec![vec![CellStyle::default(); width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn charset(&self) -> &BoxChars {
        &self.charset
    }

    pub fn in_bounds(&self, col: i64, row: i64) -> bool {
        col >= 0 && row >= 0 && (col as usize) < self.width && (row as usize) < self.height
    }

    pub fn get(&self, col: i64, row: i64) -> char {
        if self.in_bounds(col, row) {
            self.cells[row as usize][col as usize]
        } else {
            ' '
        }
    }

    pub fn get_point(&self, p: Point) -> char {
        self.get(p.x, p.y)
    }

    pub fn set(&mut self, col: i64, row: i64, ch: char) {
        if self.in_bounds(col, row) {
            self.cells[row as usize][col as usize] = ch;
        }
    }

    pub fn set_point(&mut self, p: Point, ch: char) {
        self.set(p.x, p.y, ch);
    }

    pub fn set_style(&mut self, col: i64, row: i64, style: CellStyle) {
        if self.in_bounds(col, row) {
            self.styles[row as usize][col as usize] = style;
        }
    }

    /// Write `ch`, merging it with whatever glyph already occupies the
    /// cell via the junction resolver (C8).
    pub fn set_merge(&mut self, col: i64, row: i64, ch: char) {
        if !self.in_bounds(col, row) {
            return;
        }
        let existing = self.cells[row as usize][col as usize];
        let merged = junction::merge(
            Glyph::decode(existing, &self.charset),
            Glyph::decode(ch, &self.charset),
        );
        self.cells[row as usize][col as usize] = merged.to_char(&self.charset);
    }

    pub fn set_merge_point(&mut self, p: Point, ch: char) {
        self.set_merge(p.x, p.y, ch);
    }

    pub fn hline(&mut self, row: i64, x1: i64, x2: i64, ch: char) {
        let (lo, hi) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        for col in lo..=hi {
            self.set_merge(col, row, ch);
        }
    }

    pub fn vline(&mut self, col: i64, y1: i64, y2: i64, ch: char) {
        let (lo, hi) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        for row in lo..=hi {
            self.set_merge(col, row, ch);
        }
    }

    /// Draw a box border for `bounds` using `bc`'s glyph set.
    pub fn draw_box(&mut self, bounds: Bounds, bc: &BoxChars) {
        if bounds.width < 2 || bounds.height < 2 {
            return;
        }
        let x0 = bounds.x;
        let y0 = bounds.y;
        let x1 = bounds.right() - 1;
        let y1 = bounds.bottom() - 1;
        self.set(x0, y0, bc.top_left);
        self.set(x1, y0, bc.top_right);
        self.set(x0, y1, bc.bottom_left);
        self.set(x1, y1, bc.bottom_right);
        for col in (x0 + 1)..x1 {
            self.set(col, y0, bc.horizontal);
            self.set(col, y1, bc.horizontal);
        }
        for row in (y0 + 1)..y1 {
            self.set(x0, row, bc.vertical);
            self.set(x1, row, bc.vertical);
        }
    }

    pub fn write_str(&mut self, col: i64, row: i64, s: &str) {
        if row < 0 || row as usize >= self.height {
            return;
        }
        for (i, ch) in s.chars().enumerate() {
            let c = col + i as i64;
            if c < 0 || c as usize >= self.width {
                continue;
            }
            self.cells[row as usize][c as usize] = ch;
        }
    }

    /// Render to plain text, one line per row, trailing whitespace and
    /// trailing blank lines trimmed (matches the teacher's behaviour).
    pub fn render_to_string(&self) -> String {
        let mut lines: Vec<String> = self
            .cells
            .iter()
            .map(|row| row.iter().collect::<String>().trim_end().to_string())
            .collect();
        while lines.last().map(|l| l.is_empty()).unwrap_or(false) {
            lines.pop();
        }
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    /// Render with ANSI SGR escapes bracketing runs that carry a
    /// non-default style, resetting at the end of each run (spec.md §6).
    pub fn render_to_ansi_string(&self) -> String {
        let mut out = String::new();
        for (row_idx, row) in self.cells.iter().enumerate() {
            let mut line = String::new();
            let mut active: Option<CellStyle> = None;
            for (col_idx, &ch) in row.iter().enumerate() {
                let style = &self.styles[row_idx][col_idx];
                if style.is_plain() {
                    if active.is_some() {
                        line.push_str("\x1b[0m");
                        active = None;
                    }
                } else if active.as_ref() != Some(style) {
                    if active.is_some() {
                        line.push_str("\x1b[0m");
                    }
                    line.push_str(&style.ansi_prefix());
                    active = Some(style.clone());
                }
                line.push(ch);
            }
            if active.is_some() {
                line.push_str("\x1b[0m");
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        while out.ends_with("\n\n") {
            out.pop();
        }
        out
    }
}

impl std::fmt::Display for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render_to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::UnicodeLevel;

    fn canvas(w: usize, h: usize) -> Canvas {
        Canvas::new(w, h, BoxChars::for_level(UnicodeLevel::Full))
    }

    #[test]
    fn out_of_range_reads_return_blank() {
        let c = canvas(3, 3);
        assert_eq!(c.get(10, 10), ' ');
        assert_eq!(c.get(-1, 0), ' ');
    }

    #[test]
    fn out_of_range_writes_are_ignored() {
        let mut c = canvas(3, 3);
        c.set(10, 10, 'x');
        assert_eq!(c.get(10, 10), ' ');
    }

    #[test]
    fn set_merge_combines_perpendicular_lines_into_cross() {
        let mut c = canvas(3, 3);
        c.set_merge(1, 1, '─');
        c.set_merge(1, 1, '│');
        assert_eq!(c.get(1, 1), '┼');
    }

    #[test]
    fn draw_box_places_corners_and_sides() {
        let mut c = canvas(5, 5);
        let bc = BoxChars::for_level(UnicodeLevel::Full);
        c.draw_box(Bounds::new(0, 0, 4, 3), &bc);
        assert_eq!(c.get(0, 0), '┌');
        assert_eq!(c.get(3, 0), '┐');
        assert_eq!(c.get(0, 2), '└');
        assert_eq!(c.get(3, 2), '┘');
        assert_eq!(c.get(1, 0), '─');
        assert_eq!(c.get(0, 1), '│');
    }

    #[test]
    fn color_parses_named_and_hex() {
        assert_eq!(Color::parse("red"), Some(Color::Named("red".into())));
        assert_eq!(Color::parse("#ff0000"), Some(Color::Rgb(255, 0, 0)));
        assert_eq!(Color::parse("f00"), Some(Color::Rgb(255, 0, 0)));
        assert_eq!(Color::parse("not-a-color"), None);
    }

    #[test]
    fn ansi_render_wraps_styled_runs() {
        let mut c = canvas(3, 1);
        c.set(0, 0, 'a');
        c.set_style(
            0,
            0,
            CellStyle {
                color: Some(Color::Named("red".into())),
                bold: false,
            },
        );
        let rendered = c.render_to_ansi_string();
        assert!(rendered.contains("\x1b[31m"));
        assert!(rendered.contains("\x1b[0m"));
    }
}
