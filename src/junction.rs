//! Junction resolver (C8): decides the glyph that results when two pieces
//! of line art land on the same canvas cell.
//!
//! Grounded on the teacher's `renderers/charset.rs` `Arms` type (decode a
//! box-drawing char into which of its four sides carry a line, OR them
//! together, re-encode), extended per spec.md §4.6 with the cases a plain
//! arms-OR doesn't cover on its own: two *different* corners forming a
//! cross even when their arms don't literally union to four, and the
//! arrow-vs-line precedence rule.

use crate::charset::BoxChars;
use crate::geometry::Direction;

/// Which of a cell's four sides currently carry a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Arms {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Arms {
    pub fn new(up: bool, down: bool, left: bool, right: bool) -> Self {
        Self {
            up,
            down,
            left,
            right,
        }
    }

    pub fn all() -> Self {
        Self::new(true, true, true, true)
    }

    pub fn has(self, dir: Direction) -> bool {
        match dir {
            Direction::North => self.up,
            Direction::South => self.down,
            Direction::West => self.left,
            Direction::East => self.right,
        }
    }

    pub fn with(mut self, dir: Direction, value: bool) -> Self {
        match dir {
            Direction::North => self.up = value,
            Direction::South => self.down = value,
            Direction::West => self.left = value,
            Direction::East => self.right = value,
        }
        self
    }

    pub fn count(self) -> u32 {
        self.up as u32 + self.down as u32 + self.left as u32 + self.right as u32
    }

    /// Exactly two opposite arms: a straight horizontal or vertical run.
    pub fn is_line(self) -> bool {
        (self.left && self.right && !self.up && !self.down)
            || (self.up && self.down && !self.left && !self.right)
    }

    /// Exactly two adjacent arms: one of the four corner shapes.
    pub fn is_corner(self) -> bool {
        self.count() == 2 && !self.is_line()
    }

    /// Decode a rendered character into its arms. Returns `None` for
    /// characters that aren't a recognised line/corner/tee/cross glyph.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '─' | '-' | '╌' | '━' | '·' => Some(Self::new(false, false, true, true)),
            '│' | '|' | '╎' | '┃' => Some(Self::new(true, true, false, false)),
            '┌' | '╭' | '╔' => Some(Self::new(false, true, false, true)),
            '┐' | '╮' | '╗' => Some(Self::new(false, true, true, false)),
            '└' | '╰' | '╚' => Some(Self::new(true, false, false, true)),
            '┘' | '╯' | '╝' => Some(Self::new(true, false, true, false)),
            '├' => Some(Self::new(true, true, false, true)),
            '┤' => Some(Self::new(true, true, true, false)),
            '┬' => Some(Self::new(false, true, true, true)),
            '┴' => Some(Self::new(true, false, true, true)),
            '┼' | '+' => Some(Self::all()),
            _ => None,
        }
    }

    /// OR each side together — the non-cross, non-differing-corner merge.
    pub fn merge(self, other: Self) -> Self {
        Self {
            up: self.up || other.up,
            down: self.down || other.down,
            left: self.left || other.left,
            right: self.right || other.right,
        }
    }

    pub fn to_char(self, bc: &BoxChars) -> char {
        match (self.up, self.down, self.left, self.right) {
            (false, false, false, false) => ' ',
            (false, false, true, true) => bc.horizontal,
            (true, true, false, false) => bc.vertical,
            (false, true, false, true) => bc.top_left,
            (false, true, true, false) => bc.top_right,
            (true, false, false, true) => bc.bottom_left,
            (true, false, true, false) => bc.bottom_right,
            (true, true, false, true) => bc.tee_right,
            (true, true, true, false) => bc.tee_left,
            (false, true, true, true) => bc.tee_down,
            (true, false, true, true) => bc.tee_up,
            (true, true, true, true) => bc.cross,
            // single-arm dangling ends (e.g. a one-cell stub) fall back to
            // the line glyph for that axis.
            (true, false, false, false) | (false, true, false, false) => bc.vertical,
            (false, false, true, false) | (false, false, false, true) => bc.horizontal,
        }
    }
}

/// A cell's content, decoded into the categories the resolver reasons
/// about. `Other` covers label text and anything else that isn't
/// line art — the resolver never overwrites it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Blank,
    Arms(Arms),
    Arrow(Direction),
    Bullet,
    Other(char),
}

impl Glyph {
    pub fn decode(c: char, bc: &BoxChars) -> Self {
        if c == ' ' {
            Glyph::Blank
        } else if c == bc.bullet {
            Glyph::Bullet
        } else if c == bc.arrow_up {
            Glyph::Arrow(Direction::North)
        } else if c == bc.arrow_down {
            Glyph::Arrow(Direction::South)
        } else if c == bc.arrow_left {
            Glyph::Arrow(Direction::West)
        } else if c == bc.arrow_right {
            Glyph::Arrow(Direction::East)
        } else if let Some(arms) = Arms::from_char(c) {
            Glyph::Arms(arms)
        } else {
            Glyph::Other(c)
        }
    }

    pub fn to_char(self, bc: &BoxChars) -> char {
        match self {
            Glyph::Blank => ' ',
            Glyph::Arms(a) => a.to_char(bc),
            Glyph::Arrow(Direction::North) => bc.arrow_up,
            Glyph::Arrow(Direction::South) => bc.arrow_down,
            Glyph::Arrow(Direction::West) => bc.arrow_left,
            Glyph::Arrow(Direction::East) => bc.arrow_right,
            Glyph::Bullet => bc.bullet,
            Glyph::Other(c) => c,
        }
    }
}

/// Resolve what a cell should show after `incoming` is written where
/// `existing` already is. Pure function, per spec.md §4.6.
pub fn merge(existing: Glyph, incoming: Glyph) -> Glyph {
    match (existing, incoming) {
        (Glyph::Blank, x) => x,
        (x, Glyph::Blank) => x,
        (Glyph::Other(c), _) => Glyph::Other(c),
        (_, Glyph::Other(c)) => Glyph::Other(c),
        (Glyph::Bullet, _) | (_, Glyph::Bullet) => Glyph::Bullet,

        (Glyph::Arms(a), Glyph::Arms(b)) => {
            if a.is_corner() && b.is_corner() && a != b {
                Glyph::Arms(Arms::all())
            } else {
                Glyph::Arms(a.merge(b))
            }
        }

        (Glyph::Arms(line), Glyph::Arrow(dir)) => arrow_onto_line(line, dir),
        (Glyph::Arrow(dir), Glyph::Arms(line)) => arrow_onto_line(line, dir),

        (Glyph::Arrow(d1), Glyph::Arrow(d2)) => {
            if d1 == d2 {
                Glyph::Arrow(d1)
            } else {
                Glyph::Arms(Arms::all())
            }
        }
    }
}

/// An arrow wins only if the side it points toward isn't already a line
/// arm (spec.md §4.6: "arrowhead wins if pointing outward through a free
/// side; otherwise the line wins").
fn arrow_onto_line(line: Arms, dir: Direction) -> Glyph {
    if line.has(dir) {
        Glyph::Arms(line)
    } else {
        Glyph::Arrow(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::UnicodeLevel;

    fn bc() -> BoxChars {
        BoxChars::for_level(UnicodeLevel::Full)
    }

    #[test]
    fn line_same_axis_unchanged() {
        let h = Glyph::Arms(Arms::new(false, false, true, true));
        assert_eq!(merge(h, h), h);
    }

    #[test]
    fn line_other_axis_becomes_cross() {
        let h = Glyph::Arms(Arms::new(false, false, true, true));
        let v = Glyph::Arms(Arms::new(true, true, false, false));
        assert_eq!(merge(h, v), Glyph::Arms(Arms::all()));
        assert_eq!(merge(v, h), Glyph::Arms(Arms::all()));
    }

    #[test]
    fn corner_plus_perpendicular_line_is_tee() {
        // top_left corner (down, right) + vertical line (up, down) -> tee_right
        let corner = Glyph::Arms(Arms::new(false, true, false, true));
        let vertical = Glyph::Arms(Arms::new(true, true, false, false));
        let merged = merge(corner, vertical);
        assert_eq!(merged.to_char(&bc()), '├');
    }

    #[test]
    fn same_corner_unchanged() {
        let corner = Glyph::Arms(Arms::new(false, true, false, true));
        assert_eq!(merge(corner, corner), corner);
    }

    #[test]
    fn differing_corners_force_full_cross() {
        let top_left = Glyph::Arms(Arms::new(false, true, false, true));
        let top_right = Glyph::Arms(Arms::new(false, true, true, false));
        // naive OR would only produce a 3-arm tee_down here; spec demands cross.
        assert_eq!(merge(top_left, top_right), Glyph::Arms(Arms::all()));
    }

    #[test]
    fn arrow_wins_on_free_side() {
        let vertical = Glyph::Arms(Arms::new(true, true, false, false));
        let arrow = Glyph::Arrow(Direction::East);
        assert_eq!(merge(vertical, arrow), Glyph::Arrow(Direction::East));
    }

    #[test]
    fn arrow_loses_when_side_occupied() {
        let vertical = Glyph::Arms(Arms::new(true, true, false, false));
        let arrow = Glyph::Arrow(Direction::North);
        assert_eq!(merge(vertical, arrow), vertical);
    }

    #[test]
    fn blank_always_loses() {
        let h = Glyph::Arms(Arms::new(false, false, true, true));
        assert_eq!(merge(Glyph::Blank, h), h);
        assert_eq!(merge(h, Glyph::Blank), h);
    }

    #[test]
    fn tee_plus_fourth_side_is_cross() {
        let tee = Glyph::Arms(Arms::new(true, true, false, true)); // tee_right
        let left_stub = Glyph::Arms(Arms::new(false, false, true, false));
        assert_eq!(merge(tee, left_stub), Glyph::Arms(Arms::all()));
    }

    #[test]
    fn line_merge_is_commutative() {
        let a = Glyph::Arms(Arms::new(false, true, false, true));
        let b = Glyph::Arms(Arms::new(true, false, true, false));
        assert_eq!(merge(a, b), merge(b, a));
    }

    #[test]
    fn decode_roundtrip_for_known_glyphs() {
        let b = bc();
        for c in ['─', '│', '┌', '┐', '└', '┘', '├', '┤', '┬', '┴', '┼'] {
            let decoded = Glyph::decode(c, &b);
            assert_eq!(decoded.to_char(&b), c);
        }
    }
}
