//! Touch widgets.
//!
//! A [`Widget`] is a positioned, possibly hidden instance of one of a closed
//! set of kinds. Widgets are generic over the message type of the screen that
//! owns them: activating a widget pushes a value of that type, which the
//! screen then applies to its own state.

use std::mem;

use crate::{
    canvas::{BoxStyle, Canvas},
    event::{Gesture, GestureKind},
    geom::{Expanse, Point, SensorSpace},
};

/// Buttons of various shapes.
mod button;
/// Scroll state and the scroll bar.
mod scroll;
/// Horizontal slider.
mod slider;

pub use button::{Button, ItemButton, MENU_BUTTON_HEIGHT, MENU_BUTTON_WIDTH, MenuButton, truncate};
pub use scroll::{ScrollBar, ScrollState};
pub use slider::Slider;

/// A widget's cell rectangle. The origin may lie off screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    /// Left column.
    pub x: i32,
    /// Top row.
    pub y: i32,
    /// Width in cells.
    pub w: u32,
    /// Height in cells.
    pub h: u32,
}

impl Bounds {
    /// Construct bounds.
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Does the half-open area `[x, x+w) × [y, y+h)` contain the cell?
    pub fn contains(&self, p: Point) -> bool {
        let (px, py) = (i64::from(p.x), i64::from(p.y));
        let (x, y) = (i64::from(self.x), i64::from(self.y));
        px >= x && px < x + i64::from(self.w) && py >= y && py < y + i64::from(self.h)
    }
}

/// The kinds of widget.
#[derive(Debug, Clone)]
pub enum WidgetKind<M> {
    /// Text button.
    Button(Button<M>),
    /// Icon-and-label menu button.
    MenuButton(MenuButton<M>),
    /// List item.
    Item(ItemButton<M>),
    /// Vertical scroll bar.
    ScrollBar(ScrollBar<M>),
    /// Horizontal slider.
    Slider(Slider<M>),
}

/// A positioned widget.
#[derive(Debug, Clone)]
pub struct Widget<M> {
    /// Where the widget sits.
    pub bounds: Bounds,
    /// Hidden widgets neither draw, hit-test nor handle gestures.
    pub visible: bool,
    /// What the widget is.
    pub kind: WidgetKind<M>,
}

impl<M: Clone> Widget<M> {
    /// Wrap a kind at some bounds.
    pub fn new(bounds: Bounds, kind: WidgetKind<M>) -> Self {
        Self {
            bounds,
            visible: true,
            kind,
        }
    }

    /// A text button sized to its label.
    pub fn button(x: i32, y: i32, text: &str, message: M) -> Self {
        let (w, h) = Button::<M>::size(text);
        Self::new(
            Bounds::new(x, y, w, h),
            WidgetKind::Button(Button {
                text: text.into(),
                message,
                style: BoxStyle::Single,
                pressed: false,
            }),
        )
    }

    /// A menu button with an icon above its label.
    pub fn menu_button(x: i32, y: i32, label: &str, icon: &str, message: M) -> Self {
        Self::new(
            Bounds::new(x, y, MENU_BUTTON_WIDTH, MENU_BUTTON_HEIGHT),
            WidgetKind::MenuButton(MenuButton {
                label: label.into(),
                icon: icon.into(),
                message,
                pressed: false,
            }),
        )
    }

    /// A three-row list item.
    pub fn item(x: i32, y: i32, width: u32, label: &str, message: M) -> Self {
        Self::new(
            Bounds::new(x, y, width, 3),
            WidgetKind::Item(ItemButton {
                label: label.into(),
                message,
                pressed: false,
            }),
        )
    }

    /// A three-column scroll bar.
    pub fn scrollbar(
        x: i32,
        y: i32,
        height: u32,
        state: ScrollState,
        on_scroll: fn(usize) -> M,
    ) -> Self {
        Self::new(
            Bounds::new(x, y, 3, height),
            WidgetKind::ScrollBar(ScrollBar {
                state,
                on_scroll,
                dragging: false,
            }),
        )
    }

    /// A three-row slider.
    pub fn slider(
        x: i32,
        y: i32,
        width: u32,
        range: (i32, i32),
        value: i32,
        on_change: fn(i32) -> M,
    ) -> Self {
        Self::new(
            Bounds::new(x, y, width, 3),
            WidgetKind::Slider(Slider {
                min: range.0,
                max: range.1,
                value: value.clamp(range.0, range.1.max(range.0)),
                on_change,
                dragging: false,
            }),
        )
    }

    /// Set the border style of a text button.
    pub fn with_style(mut self, style: BoxStyle) -> Self {
        if let WidgetKind::Button(b) = &mut self.kind {
            b.style = style;
        }
        self
    }

    /// Is the widget held down?
    pub fn is_pressed(&self) -> bool {
        match &self.kind {
            WidgetKind::Button(b) => b.pressed,
            WidgetKind::MenuButton(b) => b.pressed,
            WidgetKind::Item(b) => b.pressed,
            WidgetKind::ScrollBar(s) => s.dragging,
            WidgetKind::Slider(s) => s.dragging,
        }
    }

    /// Drop any held or dragging state.
    pub fn reset(&mut self) {
        match &mut self.kind {
            WidgetKind::Button(b) => b.pressed = false,
            WidgetKind::MenuButton(b) => b.pressed = false,
            WidgetKind::Item(b) => b.pressed = false,
            WidgetKind::ScrollBar(s) => s.dragging = false,
            WidgetKind::Slider(s) => s.dragging = false,
        }
    }

    /// Is the touch position over this widget? The position is mapped to a
    /// cell using the terminal size passed in, which must be current.
    pub fn hit_test(&self, x: i32, y: i32, space: SensorSpace, term: Expanse) -> bool {
        self.visible && self.bounds.contains(space.to_cell(x, y, term))
    }

    /// Handle a gesture, pushing any resulting message onto `out`. Returns
    /// true if the widget consumed the gesture.
    pub fn handle(
        &mut self,
        g: &Gesture,
        space: SensorSpace,
        term: Expanse,
        out: &mut Vec<M>,
    ) -> bool {
        if !self.visible {
            return false;
        }
        let b = self.bounds;
        match &mut self.kind {
            WidgetKind::Button(w) => activate(&mut w.pressed, &w.message, g.kind, out),
            WidgetKind::MenuButton(w) => activate(&mut w.pressed, &w.message, g.kind, out),
            WidgetKind::Item(w) => activate(&mut w.pressed, &w.message, g.kind, out),
            WidgetKind::ScrollBar(w) => match g.kind {
                GestureKind::Press | GestureKind::Tap => {
                    w.dragging = true;
                    out.push(w.seek(b, space.row(g.y, term.h)));
                    true
                }
                GestureKind::Release => {
                    w.dragging = false;
                    true
                }
                _ => false,
            },
            WidgetKind::Slider(w) => match g.kind {
                GestureKind::Press | GestureKind::Tap => {
                    w.dragging = true;
                    out.push(w.seek(b, space.column(g.x, term.w)));
                    true
                }
                GestureKind::Release => {
                    w.dragging = false;
                    true
                }
                _ => false,
            },
        }
    }

    /// Draw onto the canvas.
    pub fn draw(&self, c: &mut Canvas) {
        if !self.visible {
            return;
        }
        let b = self.bounds;
        match &self.kind {
            WidgetKind::Button(w) => w.draw(b, c),
            WidgetKind::MenuButton(w) => w.draw(b, c),
            WidgetKind::Item(w) => w.draw(b, c),
            WidgetKind::ScrollBar(w) => w.draw(b, c),
            WidgetKind::Slider(w) => w.draw(b, c),
        }
    }
}

/// Shared press/activate logic for button-like widgets: a press holds the
/// button, and a release or tap while held fires its message. Either always
/// clears the held state.
fn activate<M: Clone>(pressed: &mut bool, message: &M, kind: GestureKind, out: &mut Vec<M>) -> bool {
    match kind {
        GestureKind::Press => {
            *pressed = true;
            true
        }
        GestureKind::Release | GestureKind::Tap => {
            if mem::take(pressed) {
                out.push(message.clone());
            }
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        buf,
        testing::{assert_canvas, canvas_contains},
    };

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Msg {
        Ok,
        Scroll(usize),
        Level(i32),
    }

    fn term() -> Expanse {
        Expanse::new(80, 24)
    }

    fn send(w: &mut Widget<Msg>, kind: GestureKind, x: i32, y: i32) -> (bool, Vec<Msg>) {
        let mut out = vec![];
        let handled = w.handle(&Gesture::at(kind, x, y), SensorSpace::default(), term(), &mut out);
        (handled, out)
    }

    #[test]
    fn hit_test_maps_sensor_to_cells() {
        let w = Widget::button(38, 11, "Ok", Msg::Ok);
        assert_eq!(w.bounds, Bounds::new(38, 11, 6, 3));
        assert!(w.hit_test(400, 240, SensorSpace::default(), term()));
        assert!(!w.hit_test(10, 10, SensorSpace::default(), term()));
        // The same touch misses once the terminal is larger.
        assert!(!w.hit_test(400, 240, SensorSpace::default(), Expanse::new(120, 40)));
    }

    #[test]
    fn button_fires_on_tap_after_press() {
        let mut w = Widget::button(0, 0, "Ok", Msg::Ok);
        assert_eq!(send(&mut w, GestureKind::Tap, 0, 0), (true, vec![]));
        assert_eq!(send(&mut w, GestureKind::Press, 0, 0), (true, vec![]));
        assert!(w.is_pressed());
        assert_eq!(send(&mut w, GestureKind::Tap, 0, 0), (true, vec![Msg::Ok]));
        assert!(!w.is_pressed());
        send(&mut w, GestureKind::Press, 0, 0);
        assert_eq!(send(&mut w, GestureKind::SwipeLeft, 0, 0), (false, vec![]));
        assert_eq!(send(&mut w, GestureKind::Release, 0, 0), (true, vec![Msg::Ok]));
    }

    #[test]
    fn hidden_widgets_are_inert() {
        let mut w = Widget::button(38, 11, "Ok", Msg::Ok);
        w.visible = false;
        assert!(!w.hit_test(400, 240, SensorSpace::default(), term()));
        assert_eq!(send(&mut w, GestureKind::Press, 400, 240), (false, vec![]));
        let mut c = Canvas::new(Expanse::new(4, 1));
        w.draw(&mut c);
        assert_canvas(&c, buf!("    "));
    }

    #[test]
    fn button_drawing() {
        let mut w = Widget::button(0, 0, "Go", Msg::Ok);
        let mut c = Canvas::new(Expanse::new(6, 3));
        w.draw(&mut c);
        assert_canvas(&c, buf!("┌────┐" "│ Go │" "└────┘"));
        send(&mut w, GestureKind::Press, 0, 0);
        w.draw(&mut c);
        assert_canvas(&c, buf!("╔════╗" "║░Go░║" "╚════╝"));
    }

    #[test]
    fn scrollbar_seeks_from_row() {
        // Rows 5..15 on an 80x24 terminal; sensor row 20 per cell.
        let mut w = Widget::scrollbar(70, 5, 10, ScrollState::new(30, 10, 0), Msg::Scroll);
        assert_eq!(send(&mut w, GestureKind::Press, 700, 200), (true, vec![Msg::Scroll(10)]));
        assert!(w.is_pressed());
        assert_eq!(send(&mut w, GestureKind::Release, 700, 200), (true, vec![]));
        assert!(!w.is_pressed());
        assert_eq!(send(&mut w, GestureKind::Tap, 700, 479), (true, vec![Msg::Scroll(20)]));
        assert_eq!(send(&mut w, GestureKind::Tap, 700, 0), (true, vec![Msg::Scroll(0)]));
    }

    #[test]
    fn slider_seeks_from_column() {
        let mut w = Widget::slider(20, 8, 42, (0, 100), 50, Msg::Level);
        // Column 21 is the left end of the track, column 60 the right.
        assert_eq!(send(&mut w, GestureKind::Tap, 210, 180), (true, vec![Msg::Level(0)]));
        assert_eq!(send(&mut w, GestureKind::Press, 600, 180), (true, vec![Msg::Level(100)]));
        assert_eq!(send(&mut w, GestureKind::Tap, 410, 180), (true, vec![Msg::Level(51)]));
    }

    #[test]
    fn slider_spans_full_i32_range() {
        let mut w = Widget::slider(20, 8, 42, (i32::MIN, i32::MAX), 0, Msg::Level);
        let mut c = Canvas::new(term());
        w.draw(&mut c);
        assert_eq!(send(&mut w, GestureKind::Tap, 210, 180), (true, vec![Msg::Level(i32::MIN)]));
        assert_eq!(send(&mut w, GestureKind::Press, 600, 180), (true, vec![Msg::Level(i32::MAX)]));
        w.draw(&mut c);
        assert!(canvas_contains(&c, "●"));
    }

    #[test]
    fn slider_drawing() {
        let w = Widget::slider(0, 0, 7, (0, 100), 100, Msg::Level);
        let mut c = Canvas::new(Expanse::new(7, 3));
        w.draw(&mut c);
        assert_canvas(&c, buf!(" 100%" "├────●┤" ""));
    }
}
