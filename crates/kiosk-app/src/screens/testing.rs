use std::collections::VecDeque;

use kiosk::{
    Context, Gesture, Panel, Screen,
    canvas::{BoxStyle, Canvas},
    geom::Expanse,
    widget::truncate,
};

use super::{MAIN, return_button};

/// Gestures kept in the history.
const HISTORY: usize = 5;

/// Touch test actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Msg {
    /// Back to the main menu.
    Back,
}

/// Shows every gesture as it arrives, for checking the panel and the
/// classifier.
#[derive(Debug)]
pub struct TouchTest {
    /// Widgets.
    panel: Panel<Msg>,
    /// The most recent gesture.
    last: Option<Gesture>,
    /// Recent gestures, oldest first.
    history: VecDeque<Gesture>,
}

impl TouchTest {
    /// Construct the screen.
    pub fn new() -> Self {
        Self {
            panel: Panel::new("TESTING"),
            last: None,
            history: VecDeque::with_capacity(HISTORY),
        }
    }

    /// Recent gestures, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Gesture> {
        self.history.iter()
    }
}

impl Default for TouchTest {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for TouchTest {
    fn title(&self) -> &str {
        &self.panel.title
    }

    fn layout(&mut self, size: Expanse) {
        self.panel.clear();
        self.panel
            .push(return_button(size, size.h as i32 - 3, "← Main Menu", Msg::Back));
    }

    fn handle(&mut self, g: &Gesture, ctx: &mut Context) -> bool {
        if self.history.len() == HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(*g);
        self.last = Some(*g);
        ctx.mark_dirty();

        let mut out = vec![];
        let handled = self.panel.handle(g, ctx, &mut out);
        for Msg::Back in out {
            ctx.switch(MAIN);
        }
        handled
    }

    fn draw(&self, c: &mut Canvas) {
        self.panel.draw(c);
        let w = c.width().saturating_sub(20).min(50);
        let x = (c.width() as i32 - w as i32).div_euclid(2);
        // Header rows, then one row per history entry.
        c.draw_box(x, 5, w, 8 + HISTORY as u32, BoxStyle::Single, false);
        c.draw_text(x + 2, 6, "Touch Test Area");
        if let Some(g) = &self.last {
            c.draw_text(x + 2, 8, &format!("Last: {}", g.kind));
            c.draw_text(x + 2, 9, &format!("Position: ({}, {})", g.x, g.y));
        }
        c.draw_text(x + 2, 11, "History:");
        for (i, g) in self.history.iter().rev().enumerate() {
            let line = truncate(&g.to_string(), w.saturating_sub(6));
            c.draw_text(x + 2, 12 + i as i32, &format!("  {line}"));
        }
    }
}
