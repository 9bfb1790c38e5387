//! A double-buffered character grid.
//!
//! Draw calls mutate the current grid and mark it dirty. [`Canvas::render`]
//! writes the whole grid in one buffered write, then copies it into the
//! reference grid. Coordinates are signed so that layouts computed off the
//! edge of a small terminal clip instead of wrapping.

use std::io::Write;

use crossterm::{
    QueueableCommand,
    cursor::MoveTo,
    style::Print,
    terminal::{Clear, ClearType},
};
use unicode_width::UnicodeWidthChar;

use crate::{
    error::{Result, translate_result},
    geom::{Expanse, Point, Rect},
};

/// Placeholder for the second cell of a double-width glyph.
const NULL: char = '\0';

/// Fill character for filled boxes.
pub const SHADE: char = '░';

/// The set of glyphs used to draw a box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoxGlyphs {
    /// Top-left corner glyph.
    pub topleft: char,
    /// Top-right corner glyph.
    pub topright: char,
    /// Bottom-left corner glyph.
    pub bottomleft: char,
    /// Bottom-right corner glyph.
    pub bottomright: char,
    /// Horizontal border glyph.
    pub horizontal: char,
    /// Vertical border glyph.
    pub vertical: char,
}

/// Box border styles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BoxStyle {
    /// Thin single lines.
    #[default]
    Single,
    /// Double lines, used for pressed widgets.
    Double,
    /// Thin lines with rounded corners.
    Round,
    /// Plain ASCII for terminals without box drawing glyphs.
    Ascii,
}

impl BoxStyle {
    /// The glyph set for this style.
    pub fn glyphs(&self) -> BoxGlyphs {
        match self {
            Self::Single => BoxGlyphs {
                topleft: '┌',
                topright: '┐',
                bottomleft: '└',
                bottomright: '┘',
                horizontal: '─',
                vertical: '│',
            },
            Self::Double => BoxGlyphs {
                topleft: '╔',
                topright: '╗',
                bottomleft: '╚',
                bottomright: '╝',
                horizontal: '═',
                vertical: '║',
            },
            Self::Round => BoxGlyphs {
                topleft: '╭',
                topright: '╮',
                bottomleft: '╰',
                bottomright: '╯',
                horizontal: '─',
                vertical: '│',
            },
            Self::Ascii => BoxGlyphs {
                topleft: '+',
                topright: '+',
                bottomleft: '+',
                bottomright: '+',
                horizontal: '-',
                vertical: '|',
            },
        }
    }
}

/// Display width of a string in cells.
pub fn text_width(s: &str) -> u32 {
    s.chars().map(|c| c.width().unwrap_or(0) as u32).sum()
}

/// Column at which `s` starts when centred in `width` cells starting at `x`.
pub fn centered(x: i32, width: u32, s: &str) -> i32 {
    x + (i64::from(width) - i64::from(text_width(s))).div_euclid(2) as i32
}

/// The character grid.
#[derive(Debug, Clone)]
pub struct Canvas {
    /// Grid size.
    size: Expanse,
    /// Current grid, row-major.
    cells: Vec<char>,
    /// The grid as of the last successful render.
    reference: Vec<char>,
    /// Has the current grid changed since the last render?
    dirty: bool,
}

impl Canvas {
    /// Create a blank canvas. A fresh canvas is dirty.
    pub fn new(size: Expanse) -> Self {
        Self {
            size,
            cells: vec![' '; size.area() as usize],
            reference: vec![' '; size.area() as usize],
            dirty: true,
        }
    }

    /// Grid size.
    pub fn size(&self) -> Expanse {
        self.size
    }

    /// Grid width in cells.
    pub fn width(&self) -> u32 {
        self.size.w
    }

    /// Grid height in cells.
    pub fn height(&self) -> u32 {
        self.size.h
    }

    /// Does the grid need rendering?
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Force the next render to write a frame.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Adopt a new terminal size. Contents are discarded.
    pub fn resize(&mut self, size: Expanse) {
        if size == self.size {
            return;
        }
        *self = Self::new(size);
    }

    /// Index of a signed cell coordinate, if it lies on the grid.
    fn idx(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let p = Point {
            x: x as u32,
            y: y as u32,
        };
        if self.size.rect().contains_point(p) {
            Some(p.y as usize * self.size.w as usize + p.x as usize)
        } else {
            None
        }
    }

    /// Put a single character, clipping silently. Overwriting either half of
    /// a wide glyph blanks the other half, so every row keeps its width.
    fn put(&mut self, x: i32, y: i32, ch: char) {
        let Some(i) = self.idx(x, y) else {
            return;
        };
        if self.cells[i] == NULL {
            // The tail of a glyph being placed here is written as NULL.
            if ch != NULL && x > 0 {
                self.cells[i - 1] = ' ';
            }
        } else if x + 1 < self.size.w as i32 && self.cells[i + 1] == NULL {
            self.cells[i + 1] = ' ';
        }
        self.cells[i] = ch;
    }

    /// Character at a cell. The second half of a wide glyph reads as `'\0'`.
    pub fn get(&self, x: u32, y: u32) -> Option<char> {
        let (x, y) = (i32::try_from(x).ok()?, i32::try_from(y).ok()?);
        self.idx(x, y).map(|i| self.cells[i])
    }

    /// Blank the whole grid.
    pub fn clear(&mut self) {
        self.cells.fill(' ');
        self.dirty = true;
    }

    /// Fill a rectangle with a character.
    pub fn fill(&mut self, r: Rect, ch: char) {
        if let Some(isec) = self.size.rect().intersect(&r) {
            for y in isec.tl.y..isec.tl.y + isec.h {
                for x in isec.tl.x..isec.tl.x + isec.w {
                    self.put(x as i32, y as i32, ch);
                }
            }
        }
        self.dirty = true;
    }

    /// Draw text starting at a cell. Text running off either edge is
    /// clipped; wide glyphs occupy two cells.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str) {
        self.dirty = true;
        if y < 0 || y as u32 >= self.size.h {
            return;
        }
        let mut px = x;
        for ch in text.chars() {
            let w = ch.width().unwrap_or(0) as i32;
            if w == 0 {
                continue;
            }
            if px >= self.size.w as i32 {
                break;
            }
            if w == 2 {
                // A wide glyph that would straddle an edge is dropped.
                if px >= 0 && px + 1 < self.size.w as i32 {
                    self.put(px, y, ch);
                    self.put(px + 1, y, NULL);
                }
            } else {
                self.put(px, y, ch);
            }
            px += w;
        }
    }

    /// Draw a box border, optionally shading its interior first.
    pub fn draw_box(&mut self, x: i32, y: i32, w: u32, h: u32, style: BoxStyle, filled: bool) {
        self.dirty = true;
        if w == 0 || h == 0 {
            return;
        }
        let g = style.glyphs();
        let (w, h) = (w as i32, h as i32);
        if filled {
            for row in y..y + h {
                for col in x..x + w {
                    self.put(col, row, SHADE);
                }
            }
        }
        let (right, bottom) = (x + w - 1, y + h - 1);
        for col in x + 1..right {
            self.put(col, y, g.horizontal);
            self.put(col, bottom, g.horizontal);
        }
        for row in y + 1..bottom {
            self.put(x, row, g.vertical);
            self.put(right, row, g.vertical);
        }
        self.put(x, y, g.topleft);
        self.put(right, y, g.topright);
        self.put(x, bottom, g.bottomleft);
        self.put(right, bottom, g.bottomright);
    }

    /// The text of one row, with wide-glyph placeholders removed.
    fn row_text(&self, y: u32) -> String {
        let start = y as usize * self.size.w as usize;
        self.cells[start..start + self.size.w as usize]
            .iter()
            .filter(|c| **c != NULL)
            .collect()
    }

    /// Each row of the current grid as a string.
    pub fn lines(&self) -> Vec<String> {
        (0..self.size.h).map(|y| self.row_text(y)).collect()
    }

    /// Each row of the grid as of the last render.
    pub fn reference_lines(&self) -> Vec<String> {
        let w = self.size.w as usize;
        if w == 0 {
            return vec![String::new(); self.size.h as usize];
        }
        self.reference
            .chunks(w)
            .map(|row| row.iter().filter(|c| **c != NULL).collect())
            .collect()
    }

    /// Write the whole grid to `out` if dirty. Returns true if a frame was
    /// written. The frame is assembled in memory and handed to `out` in a
    /// single write, and the dirty flag is only cleared once that write and
    /// the flush succeed.
    pub fn render<W: Write>(&mut self, out: &mut W) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        let mut frame: Vec<u8> = Vec::with_capacity(self.cells.len() * 3 + 16);
        for y in 0..self.size.h {
            let row = self.row_text(y);
            translate_result(frame.queue(MoveTo(0, y as u16)).map(|_| ()))?;
            translate_result(frame.queue(Clear(ClearType::UntilNewLine)).map(|_| ()))?;
            translate_result(frame.queue(Print(row)).map(|_| ()))?;
        }
        translate_result(out.write_all(&frame))?;
        translate_result(out.flush())?;
        self.reference.copy_from_slice(&self.cells);
        self.dirty = false;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use unicode_width::UnicodeWidthStr;

    use super::*;
    use crate::{buf, testing::*};

    #[test]
    fn draw_text_clips() {
        let mut c = Canvas::new(Expanse::new(6, 2));
        c.draw_text(-2, 0, "abcdefgh");
        c.draw_text(4, 1, "xyz");
        c.draw_text(0, 5, "gone");
        assert_canvas(&c, buf!("cdefgh" "    xy"));
    }

    #[test]
    fn wide_glyphs_take_two_cells() {
        let mut c = Canvas::new(Expanse::new(6, 1));
        c.draw_text(0, 0, "📺ab");
        assert_eq!(c.get(0, 0), Some('📺'));
        assert_eq!(c.get(1, 0), Some('\0'));
        assert_eq!(c.get(2, 0), Some('a'));
        assert_eq!(c.lines()[0], "📺ab  ");
        c.draw_text(5, 0, "📺");
        assert_eq!(c.get(5, 0), Some(' '));
    }

    #[test]
    fn overwriting_half_a_wide_glyph_blanks_the_rest() {
        let mut c = Canvas::new(Expanse::new(6, 1));
        c.draw_text(0, 0, "📺");
        c.draw_text(1, 0, "x");
        assert_eq!(c.lines()[0], " x    ");

        c.draw_text(0, 0, "📺");
        c.draw_text(0, 0, "y");
        assert_eq!(c.lines()[0], "y     ");

        c.draw_text(0, 0, "📺📺");
        c.draw_text(1, 0, "📺");
        assert_eq!(c.lines()[0], " 📺   ");
        assert_eq!(c.lines()[0].width(), 6);
    }

    #[test]
    fn boxes() {
        let mut c = Canvas::new(Expanse::new(6, 4));
        c.draw_box(0, 0, 6, 4, BoxStyle::Single, false);
        assert_canvas(&c, buf!("┌────┐" "│    │" "│    │" "└────┘"));
        c.draw_box(1, 1, 4, 3, BoxStyle::Double, true);
        assert_canvas(&c, buf!("┌────┐" "│╔══╗│" "│║░░║│" "└╚══╝┘"));
        c.clear();
        c.draw_box(-1, -1, 3, 3, BoxStyle::Ascii, false);
        assert_canvas(&c, buf!(" |    " "-+    " "      " "      "));
    }

    #[test]
    fn render_only_when_dirty() -> Result<()> {
        let mut c = Canvas::new(Expanse::new(4, 2));
        c.draw_text(0, 0, "hi");
        let mut w = CountingWriter::default();
        assert!(c.render(&mut w)?);
        assert_eq!(w.writes, 1);
        assert!(!c.is_dirty());
        assert_eq!(c.reference_lines(), vec!["hi  ", "    "]);

        assert!(!c.render(&mut w)?);
        assert_eq!(w.writes, 1);

        c.draw_text(0, 1, "yo");
        assert!(c.render(&mut w)?);
        assert_eq!(w.writes, 2);
        let text = String::from_utf8_lossy(&w.bytes);
        assert!(text.contains("yo"));
        Ok(())
    }

    #[test]
    fn failed_write_keeps_dirty() {
        let mut c = Canvas::new(Expanse::new(4, 2));
        let mut w = CountingWriter {
            fail: true,
            ..Default::default()
        };
        assert!(c.render(&mut w).is_err());
        assert!(c.is_dirty());
    }

    #[test]
    fn resize_marks_dirty() -> Result<()> {
        let mut c = Canvas::new(Expanse::new(4, 2));
        c.render(&mut CountingWriter::default())?;
        c.resize(Expanse::new(5, 3));
        assert!(c.is_dirty());
        assert_eq!(c.lines().len(), 3);
        Ok(())
    }

    #[test]
    fn centering() {
        assert_eq!(centered(0, 10, "abcd"), 3);
        assert_eq!(centered(2, 3, "abcdef"), 0);
        assert_eq!(text_width("📺 TV"), 5);
    }
}
