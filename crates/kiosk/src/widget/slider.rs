use super::Bounds;
use crate::canvas::{Canvas, centered};

/// A horizontal slider over `[min, max]`.
///
/// The track runs along the middle row between two end caps; the value is
/// printed above it as a percentage.
#[derive(Debug, Clone)]
pub struct Slider<M> {
    /// Lower bound.
    pub min: i32,
    /// Upper bound.
    pub max: i32,
    /// Current value.
    pub value: i32,
    /// Builds the message fired with a new value.
    pub on_change: fn(i32) -> M,
    /// Is the handle being dragged?
    pub dragging: bool,
}

impl<M> Slider<M> {
    /// Position of the value within the range, in `[0, 1]`.
    fn normalized(&self) -> f64 {
        if self.max <= self.min {
            return 0.0;
        }
        let (lo, hi) = (f64::from(self.min), f64::from(self.max));
        ((f64::from(self.value) - lo) / (hi - lo)).clamp(0.0, 1.0)
    }

    /// Set the value from a touch column, returning the message for it.
    pub(super) fn seek(&mut self, b: Bounds, col: u32) -> M {
        let rel = i64::from(col) - i64::from(b.x) - 1;
        let span = b.w.saturating_sub(3).max(1);
        let norm = (rel as f64 / f64::from(span)).clamp(0.0, 1.0);
        let span = i64::from(self.max) - i64::from(self.min);
        let value = i64::from(self.min) + (norm * span as f64) as i64;
        self.value = value.clamp(i64::from(self.min), i64::from(self.max)) as i32;
        (self.on_change)(self.value)
    }

    pub(super) fn draw(&self, b: Bounds, c: &mut Canvas) {
        if b.w < 3 {
            return;
        }
        let track = format!("├{}┤", "─".repeat(b.w as usize - 2));
        c.draw_text(b.x, b.y + 1, &track);
        let handle = b.x + 1 + (f64::from(b.w - 3) * self.normalized()) as i32;
        c.draw_text(handle, b.y + 1, "●");
        let label = format!("{}%", self.value);
        c.draw_text(centered(b.x, b.w, &label), b.y, &label);
    }
}
