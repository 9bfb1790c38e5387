use super::Bounds;
use crate::canvas::{BoxStyle, Canvas, centered, text_width};

/// Width of a menu button.
pub const MENU_BUTTON_WIDTH: u32 = 18;
/// Height of a menu button.
pub const MENU_BUTTON_HEIGHT: u32 = 7;

/// Marker drawn before an item label.
const ITEM_ICON: &str = "▶ ";

/// A boxed text button.
#[derive(Debug, Clone)]
pub struct Button<M> {
    /// Label.
    pub text: String,
    /// Message fired on activation.
    pub message: M,
    /// Border style when not pressed.
    pub style: BoxStyle,
    /// Is the button held down?
    pub pressed: bool,
}

impl<M> Button<M> {
    /// Natural size: the label plus two cells of padding and border on each
    /// side, three rows tall.
    pub fn size(text: &str) -> (u32, u32) {
        (text_width(text) + 4, 3)
    }

    pub(super) fn draw(&self, b: Bounds, c: &mut Canvas) {
        let style = if self.pressed {
            BoxStyle::Double
        } else {
            self.style
        };
        c.draw_box(b.x, b.y, b.w, b.h, style, self.pressed);
        c.draw_text(centered(b.x, b.w, &self.text), b.y + 1, &self.text);
    }
}

/// A large menu button: a small multi-line icon above a label.
#[derive(Debug, Clone)]
pub struct MenuButton<M> {
    /// Label, drawn on the second-to-last row.
    pub label: String,
    /// Icon lines separated by newlines.
    pub icon: String,
    /// Message fired on activation.
    pub message: M,
    /// Is the button held down?
    pub pressed: bool,
}

impl<M> MenuButton<M> {
    pub(super) fn draw(&self, b: Bounds, c: &mut Canvas) {
        let style = if self.pressed {
            BoxStyle::Double
        } else {
            BoxStyle::Round
        };
        c.draw_box(b.x, b.y, b.w, b.h, style, self.pressed);
        for (i, line) in self.icon.lines().enumerate() {
            c.draw_text(centered(b.x, b.w, line), b.y + 1 + i as i32, line);
        }
        c.draw_text(
            centered(b.x, b.w, &self.label),
            b.y + b.h as i32 - 2,
            &self.label,
        );
    }
}

/// A selectable list entry.
#[derive(Debug, Clone)]
pub struct ItemButton<M> {
    /// Label, truncated to fit.
    pub label: String,
    /// Message fired on activation.
    pub message: M,
    /// Is the item held down?
    pub pressed: bool,
}

impl<M> ItemButton<M> {
    pub(super) fn draw(&self, b: Bounds, c: &mut Canvas) {
        let style = if self.pressed {
            BoxStyle::Double
        } else {
            BoxStyle::Single
        };
        c.draw_box(b.x, b.y, b.w, b.h, style, self.pressed);
        let room = b.w.saturating_sub(4 + text_width(ITEM_ICON));
        let label = truncate(&self.label, room);
        c.draw_text(b.x + 2, b.y + 1, &format!("{ITEM_ICON}{label}"));
    }
}

/// Cut `s` to at most `width` cells.
pub fn truncate(s: &str, width: u32) -> String {
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let w = text_width(ch.encode_utf8(&mut [0; 4]));
        if used + w > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}
