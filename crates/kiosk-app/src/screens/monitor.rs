use kiosk::{
    Context, Gesture, GestureKind, Screen,
    canvas::Canvas,
    handoff::{Handoff, HandoffAction, HandoffEvent, HandoffState},
    screen::draw_title,
};

use super::centered_lines;
use crate::config::AppConfig;

/// Title bar text.
const TITLE: &str = "SYSTEM MONITOR";

/// Shown when the monitor is not running.
const INSTRUCTIONS: [&str; 2] = ["Double-tap anywhere to exit the monitor", "and return to main menu"];

/// Runs a terminal system monitor for as long as the screen is active. The
/// monitor draws on the terminal itself, so the kiosk stops rendering until
/// it exits.
#[derive(Debug)]
pub struct Monitor {
    /// The monitor process.
    handoff: Handoff,
}

impl Monitor {
    /// Construct the screen.
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            handoff: Handoff::new(cfg.collaborators.monitor.clone())
                .bind(GestureKind::DoubleTap, HandoffAction::Back),
        }
    }

    /// The monitor state.
    pub fn handoff(&self) -> &Handoff {
        &self.handoff
    }
}

impl Screen for Monitor {
    fn title(&self) -> &str {
        TITLE
    }

    fn enter(&mut self, ctx: &mut Context) {
        self.handoff.launch(None, ctx.now());
        ctx.mark_dirty();
    }

    fn exit(&mut self, _ctx: &mut Context) {
        self.handoff.stop();
    }

    fn handle(&mut self, g: &Gesture, ctx: &mut Context) -> bool {
        if self.handoff.handle(g, ctx) {
            return true;
        }
        if g.kind == GestureKind::DoubleTap {
            ctx.back();
            return true;
        }
        false
    }

    fn tick(&mut self, ctx: &mut Context) {
        match self.handoff.tick(ctx.now()) {
            // There is nothing to show without the monitor.
            Some(HandoffEvent::Recovered) => ctx.back(),
            Some(_) => ctx.mark_dirty(),
            None => {}
        }
    }

    fn draw(&self, c: &mut Canvas) {
        if matches!(self.handoff.state(), HandoffState::Failed { .. }) {
            self.handoff.draw_overlay(c, TITLE, &[]);
            return;
        }
        c.clear();
        draw_title(c, TITLE);
        let h = c.height() as i32;
        centered_lines(c, h / 2, h, &INSTRUCTIONS);
    }

    fn holds_terminal(&self) -> bool {
        self.handoff.holds_terminal()
    }
}
