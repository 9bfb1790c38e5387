//! Screens, the per-dispatch context they act through, and the widget panel
//! most screens are built on.

use std::time::Instant;

use crate::{
    canvas::{Canvas, centered},
    event::{Gesture, GestureKind},
    geom::{Expanse, SensorSpace},
    widget::Widget,
};

/// Navigation requests a screen can make. The application applies them after
/// the current dispatch returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Make the named screen current.
    Switch(&'static str),
    /// Return to the previous screen.
    Back,
    /// Stop the application.
    Quit,
}

/// What a screen sees while handling a gesture or a tick.
#[derive(Debug, Clone)]
pub struct Context {
    /// Time of the current loop iteration.
    now: Instant,
    /// Terminal size as of this iteration.
    term: Expanse,
    /// Touch sensor space.
    space: SensorSpace,
    /// Pending navigation request. Later requests replace earlier ones.
    request: Option<Request>,
    /// Does the screen need redrawing?
    dirty: bool,
}

impl Context {
    /// Construct a context.
    pub fn new(now: Instant, term: Expanse, space: SensorSpace) -> Self {
        Self {
            now,
            term,
            space,
            request: None,
            dirty: false,
        }
    }

    /// Time of the current loop iteration.
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Current terminal size.
    pub fn term(&self) -> Expanse {
        self.term
    }

    /// Touch sensor space.
    pub fn space(&self) -> SensorSpace {
        self.space
    }

    /// Ask to switch to a named screen.
    pub fn switch(&mut self, name: &'static str) {
        self.request = Some(Request::Switch(name));
    }

    /// Ask to return to the previous screen.
    pub fn back(&mut self) {
        self.request = Some(Request::Back);
    }

    /// Ask the application to stop.
    pub fn quit(&mut self) {
        self.request = Some(Request::Quit);
    }

    /// Ask for a redraw.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Was a redraw requested?
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The pending request, if any.
    pub fn request(&self) -> Option<&Request> {
        self.request.as_ref()
    }

    /// Take the pending request.
    pub fn take_request(&mut self) -> Option<Request> {
        self.request.take()
    }
}

/// A full-screen view.
///
/// Exactly one screen is active at a time. The application calls `exit` on
/// the outgoing screen before `enter` on the incoming one, and `layout`
/// whenever the terminal size changes and before every `enter`.
pub trait Screen {
    /// Title shown in the title bar.
    fn title(&self) -> &str;

    /// Recompute widget positions for a terminal size.
    fn layout(&mut self, _size: Expanse) {}

    /// The screen became active.
    fn enter(&mut self, _ctx: &mut Context) {}

    /// The screen is about to become inactive. Any running collaborator
    /// must be terminated here.
    fn exit(&mut self, _ctx: &mut Context) {}

    /// Handle a gesture. Returns true if it was consumed.
    fn handle(&mut self, g: &Gesture, ctx: &mut Context) -> bool;

    /// Called once per loop iteration while active.
    fn tick(&mut self, _ctx: &mut Context) {}

    /// Draw the whole screen.
    fn draw(&self, c: &mut Canvas);

    /// Does a collaborator currently own the terminal? While true, the
    /// application neither renders nor reads the keyboard.
    fn holds_terminal(&self) -> bool {
        false
    }
}

/// Draw the standard title bar: a centred `╔══ TITLE ══╗` on row 1 and a
/// double rule across row 2.
pub fn draw_title(c: &mut Canvas, title: &str) {
    if title.is_empty() {
        return;
    }
    let text = format!("╔══ {title} ══╗");
    c.draw_text(centered(0, c.width(), &text), 1, &text);
    c.draw_text(0, 2, &"═".repeat(c.width() as usize));
}

/// A titled, ordered set of widgets. Draw order is sequence order; touches
/// are offered in reverse, so the topmost widget wins.
#[derive(Debug, Clone)]
pub struct Panel<M> {
    /// Title bar text.
    pub title: String,
    /// Widgets in draw order.
    pub widgets: Vec<Widget<M>>,
}

impl<M: Clone> Panel<M> {
    /// An empty panel.
    pub fn new(title: &str) -> Self {
        Self {
            title: title.into(),
            widgets: vec![],
        }
    }

    /// Append a widget, returning its index.
    pub fn push(&mut self, w: Widget<M>) -> usize {
        self.widgets.push(w);
        self.widgets.len() - 1
    }

    /// Remove all widgets.
    pub fn clear(&mut self) {
        self.widgets.clear();
    }

    /// Clear the canvas, then draw the title bar and every widget.
    pub fn draw(&self, c: &mut Canvas) {
        c.clear();
        draw_title(c, &self.title);
        for w in &self.widgets {
            w.draw(c);
        }
    }

    /// Offer a gesture to the topmost widget under it, collecting messages
    /// into `out`. A contact that ends anywhere releases every held widget.
    pub fn handle(&mut self, g: &Gesture, ctx: &Context, out: &mut Vec<M>) -> bool {
        let (space, term) = (ctx.space(), ctx.term());
        let mut handled = false;
        for w in self.widgets.iter_mut().rev() {
            if w.hit_test(g.x, g.y, space, term) && w.handle(g, space, term, out) {
                handled = true;
                break;
            }
        }
        if g.kind != GestureKind::Press {
            for w in &mut self.widgets {
                w.reset();
            }
        }
        handled
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
        Under,
        Over,
    }

    fn ctx() -> Context {
        Context::new(Instant::now(), Expanse::new(80, 24), SensorSpace::default())
    }

    #[test]
    fn topmost_widget_wins() {
        let mut p = Panel::new("T");
        p.push(Widget::button(36, 10, "Under wide", Msg::Under));
        p.push(Widget::button(38, 11, "Ok", Msg::Over));
        let c = ctx();
        let mut out = vec![];
        assert!(p.handle(&Gesture::at(GestureKind::Press, 400, 240), &c, &mut out));
        assert!(p.widgets[1].is_pressed());
        assert!(!p.widgets[0].is_pressed());
        assert!(p.handle(&Gesture::at(GestureKind::Tap, 400, 240), &c, &mut out));
        assert_eq!(out, vec![Msg::Over]);
    }

    #[test]
    fn release_elsewhere_clears_held_widgets() {
        let mut p = Panel::new("T");
        p.push(Widget::button(38, 11, "Ok", Msg::Over));
        let c = ctx();
        let mut out = vec![];
        p.handle(&Gesture::at(GestureKind::Press, 400, 240), &c, &mut out);
        assert!(!p.handle(&Gesture::at(GestureKind::Release, 5, 5), &c, &mut out));
        assert!(!p.widgets[0].is_pressed());
        assert!(out.is_empty());
    }

    #[test]
    fn misses_are_not_consumed() {
        let mut p: Panel<Msg> = Panel::new("T");
        p.push(Widget::button(0, 0, "Ok", Msg::Over));
        let mut out = vec![];
        assert!(!p.handle(&Gesture::at(GestureKind::Tap, 790, 470), &ctx(), &mut out));
    }

    #[test]
    fn title_bar() {
        let p: Panel<Msg> = Panel::new("HI");
        let mut c = Canvas::new(Expanse::new(12, 4));
        p.draw(&mut c);
        assert_canvas(&c, buf!("" " ╔══ HI ══╗" "════════════" ""));
        assert!(canvas_contains(&c, "HI"));
    }

    #[test]
    fn last_request_wins() {
        let mut c = ctx();
        c.switch("apps");
        c.back();
        assert_eq!(c.take_request(), Some(Request::Back));
        assert_eq!(c.take_request(), None);
    }
}
