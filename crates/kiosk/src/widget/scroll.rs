use std::ops::Range;

use super::Bounds;
use crate::canvas::Canvas;

/// A scroll window over a list.
///
/// Invariants: `visible >= 1`; when `total > 0`, `visible <= total` and
/// `position + visible <= total`; when `total == 0`, `position == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollState {
    /// Number of items.
    total: usize,
    /// Number of items shown at once.
    visible: usize,
    /// First shown item.
    position: usize,
}

impl ScrollState {
    /// Construct a state, clamping all values into range.
    pub fn new(total: usize, visible: usize, position: usize) -> Self {
        let mut s = Self {
            total,
            visible: visible.max(1),
            position,
        };
        s.clamp();
        s
    }

    /// Restore the invariants.
    fn clamp(&mut self) {
        self.visible = self.visible.max(1);
        if self.total > 0 {
            self.visible = self.visible.min(self.total);
        }
        self.position = self.position.min(self.max_position());
    }

    /// Number of items.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of items shown at once.
    pub fn visible(&self) -> usize {
        self.visible
    }

    /// First shown item.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Largest valid position.
    pub fn max_position(&self) -> usize {
        self.total.saturating_sub(self.visible)
    }

    /// Can the window move at all?
    pub fn scrollable(&self) -> bool {
        self.max_position() > 0
    }

    /// Change the item count, keeping the window in range.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        self.clamp();
    }

    /// Change the window size, keeping it in range.
    pub fn set_visible(&mut self, visible: usize) {
        self.visible = visible;
        self.clamp();
    }

    /// Move the window, clamping to range.
    pub fn set_position(&mut self, position: usize) {
        self.position = position;
        self.clamp();
    }

    /// Move the window by a signed amount. Returns true if it moved.
    pub fn scroll_by(&mut self, delta: isize) -> bool {
        let before = self.position;
        let target = if delta < 0 {
            self.position.saturating_sub(delta.unsigned_abs())
        } else {
            self.position.saturating_add(delta.unsigned_abs())
        };
        self.set_position(target);
        self.position != before
    }

    /// The indices currently shown.
    pub fn range(&self) -> Range<usize> {
        self.position..(self.position + self.visible).min(self.total)
    }

    /// Thumb offset and length for a track of `height` cells.
    pub fn thumb(&self, height: u32) -> (u32, u32) {
        if self.total == 0 || height == 0 {
            return (0, height);
        }
        let len = ((height as usize * self.visible / self.total) as u32).clamp(1, height);
        let max = self.max_position();
        let off = if max > 0 {
            ((height - len) as usize * self.position / max) as u32
        } else {
            0
        };
        (off, len)
    }
}

/// A vertical scroll bar.
#[derive(Debug, Clone)]
pub struct ScrollBar<M> {
    /// The window this bar controls.
    pub state: ScrollState,
    /// Builds the message fired with a new position.
    pub on_scroll: fn(usize) -> M,
    /// Is the bar being dragged?
    pub dragging: bool,
}

impl<M> ScrollBar<M> {
    /// Set the position from a touch row, returning the message for it.
    pub(super) fn seek(&mut self, b: Bounds, row: u32) -> M {
        let rel = (i64::from(row) - i64::from(b.y)).max(0) as f64;
        let norm = if b.h == 0 {
            0.0
        } else {
            (rel / f64::from(b.h)).clamp(0.0, 1.0)
        };
        let pos = (norm * self.state.max_position() as f64) as usize;
        self.state.set_position(pos);
        (self.on_scroll)(self.state.position())
    }

    pub(super) fn draw(&self, b: Bounds, c: &mut Canvas) {
        if !self.state.scrollable() {
            return;
        }
        for i in 0..b.h as i32 {
            c.draw_text(b.x, b.y + i, "│");
        }
        let (off, len) = self.state.thumb(b.h);
        for i in off..off + len {
            c.draw_text(b.x, b.y + i as i32, "█");
        }
    }
}
