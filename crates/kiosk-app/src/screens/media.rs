use std::path::PathBuf;

use kiosk::{
    Context, Gesture, GestureKind, Panel, Screen,
    canvas::{Canvas, text_width},
    control::ControlChannel,
    geom::Expanse,
    handoff::{Handoff, HandoffAction, HandoffState},
    widget::{ScrollState, Widget},
};
use serde_json::json;

use super::{APPS, centered_lines, return_button};
use crate::config::AppConfig;

/// Most list items shown at once.
pub const VISIBLE_ITEMS: usize = 10;

/// Rows per list item.
const ITEM_HEIGHT: i32 = 3;

/// First list row.
const LIST_Y: i32 = 5;

/// A full-width swipe seeks this far.
const SEEK_SPAN_SECS: f64 = 120.0;

/// Volume change per vertical swipe, in percent.
const VOLUME_STEP: i32 = 5;

/// Shown while the player runs.
const INSTRUCTIONS: [&str; 5] = [
    "Player controls:",
    "• Tap: pause / resume",
    "• Swipe left / right: seek",
    "• Swipe up / down: volume",
    "• Long press: stop playback",
];

/// Media list actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Msg {
    /// Play the media at an index.
    Play(usize),
    /// The scroll bar moved.
    Scroll(usize),
    /// Back to the apps menu.
    Back,
}

/// A scrolling list of the configured media files. Tapping one hands the
/// display to the player, which is then steered with gestures over its
/// control socket.
#[derive(Debug)]
pub struct Media {
    /// Widgets shown while idle.
    panel: Panel<Msg>,
    /// Media paths.
    media: Vec<PathBuf>,
    /// The visible window into `media`.
    scroll: ScrollState,
    /// Terminal size from the last layout.
    size: Expanse,
    /// The player.
    handoff: Handoff,
}

impl Media {
    /// Construct the screen from the configured media and player.
    pub fn new(cfg: &AppConfig) -> Self {
        let handoff = Handoff::new(cfg.collaborators.player.clone())
            .with_control(ControlChannel::new(&cfg.player_socket))
            .bind(
                GestureKind::Tap,
                HandoffAction::Send(vec![json!("cycle"), json!("pause")]),
            )
            .bind(GestureKind::LongPress, HandoffAction::Send(vec![json!("quit")]))
            .bind(
                GestureKind::SwipeLeft,
                HandoffAction::Seek {
                    span_secs: SEEK_SPAN_SECS,
                },
            )
            .bind(
                GestureKind::SwipeRight,
                HandoffAction::Seek {
                    span_secs: SEEK_SPAN_SECS,
                },
            )
            .bind(
                GestureKind::SwipeUp,
                HandoffAction::Send(vec![json!("add"), json!("volume"), json!(VOLUME_STEP)]),
            )
            .bind(
                GestureKind::SwipeDown,
                HandoffAction::Send(vec![json!("add"), json!("volume"), json!(-VOLUME_STEP)]),
            );
        Self {
            panel: Panel::new("VIDEO PLAYER"),
            scroll: ScrollState::new(cfg.media.len(), VISIBLE_ITEMS, 0),
            media: cfg.media.clone(),
            size: Expanse::new(80, 24),
            handoff,
        }
    }

    /// The scroll window.
    pub fn scroll(&self) -> &ScrollState {
        &self.scroll
    }

    /// The player state.
    pub fn handoff(&self) -> &Handoff {
        &self.handoff
    }

    /// Width and left column of the list.
    fn list_geometry(&self) -> (u32, i32) {
        let w = self.size.w.saturating_sub(10).min(60);
        (w, (self.size.w as i32 - w as i32).div_euclid(2))
    }

    /// Recreate the widgets for the current size and scroll window.
    fn rebuild(&mut self) {
        let (w, x) = self.list_geometry();
        self.panel.clear();
        self.panel.push(return_button(
            self.size,
            self.size.h as i32 - 3,
            "← Apps Menu",
            Msg::Back,
        ));
        self.panel.push(Widget::scrollbar(
            x + w as i32 + 2,
            LIST_Y,
            (self.scroll.visible() as i32 * ITEM_HEIGHT) as u32,
            self.scroll,
            Msg::Scroll,
        ));
        for (row, idx) in self.scroll.range().enumerate() {
            let name = self.media[idx]
                .file_name()
                .map_or_else(|| self.media[idx].display().to_string(), |n| {
                    n.to_string_lossy().into_owned()
                });
            self.panel.push(Widget::item(
                x,
                LIST_Y + row as i32 * ITEM_HEIGHT,
                w,
                &name,
                Msg::Play(idx),
            ));
        }
    }

    /// Move the window by `delta` items. Returns true if it moved.
    fn scroll_by(&mut self, delta: isize) -> bool {
        let moved = self.scroll.scroll_by(delta);
        if moved {
            self.rebuild();
        }
        moved
    }

    /// Hand the display to the player for one file.
    fn play(&mut self, idx: usize, ctx: &Context) {
        if let Some(p) = self.media.get(idx) {
            let arg = p.display().to_string();
            self.handoff.launch(Some(&arg), ctx.now());
        }
    }
}

impl Screen for Media {
    fn title(&self) -> &str {
        &self.panel.title
    }

    fn layout(&mut self, size: Expanse) {
        self.size = size;
        let fit = (size.h as i32 - LIST_Y - 3) / ITEM_HEIGHT;
        self.scroll
            .set_visible((fit.max(1) as usize).min(VISIBLE_ITEMS));
        self.rebuild();
    }

    fn exit(&mut self, _ctx: &mut Context) {
        self.handoff.stop();
    }

    fn handle(&mut self, g: &Gesture, ctx: &mut Context) -> bool {
        if self.handoff.handle(g, ctx) || self.handoff.failure().is_some() {
            return true;
        }
        match g.kind {
            GestureKind::SwipeUp => return self.scroll_by(-1),
            GestureKind::SwipeDown => return self.scroll_by(1),
            _ => {}
        }
        let mut out = vec![];
        let handled = self.panel.handle(g, ctx, &mut out);
        for m in out {
            match m {
                Msg::Play(idx) => self.play(idx, ctx),
                Msg::Scroll(pos) => {
                    self.scroll.set_position(pos);
                    self.rebuild();
                }
                Msg::Back => ctx.switch(APPS),
            }
        }
        handled
    }

    fn tick(&mut self, ctx: &mut Context) {
        if self.handoff.tick(ctx.now()).is_some() {
            ctx.mark_dirty();
        }
    }

    fn draw(&self, c: &mut Canvas) {
        if !matches!(self.handoff.state(), HandoffState::Idle) {
            self.handoff
                .draw_overlay(c, &self.panel.title, &INSTRUCTIONS);
            return;
        }
        self.panel.draw(c);
        if self.media.is_empty() {
            let h = c.height() as i32;
            centered_lines(
                c,
                h / 2,
                h - 3,
                &["No media configured", "", "Add file paths to \"media\" in the config"],
            );
            return;
        }
        let (w, x) = self.list_geometry();
        c.draw_text(x, LIST_Y - 2, &format!("Videos: {}", self.media.len()));
        if self.scroll.scrollable() {
            let hint = "↑↓ Swipe to scroll";
            c.draw_text(x + w as i32 - text_width(hint) as i32, LIST_Y - 2, hint);
        }
    }

    fn holds_terminal(&self) -> bool {
        self.handoff.holds_terminal()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use kiosk::{geom::SensorSpace, testing::canvas_contains};

    use super::*;

    fn media(n: usize) -> Media {
        let cfg = AppConfig {
            media: (0..n).map(|i| format!("/srv/media/clip{i:02}.mp4").into()).collect(),
            ..AppConfig::default()
        };
        let mut m = Media::new(&cfg);
        m.layout(Expanse::new(80, 24));
        m
    }

    fn ctx() -> Context {
        Context::new(Instant::now(), Expanse::new(80, 24), SensorSpace::default())
    }

    #[test]
    fn window_fits_terminal() {
        let m = media(25);
        assert_eq!(m.scroll().visible(), 5);
        let mut big = media(25);
        big.layout(Expanse::new(100, 60));
        assert_eq!(big.scroll().visible(), VISIBLE_ITEMS);
    }

    #[test]
    fn swipes_scroll_by_one() {
        let mut m = media(25);
        let mut c = ctx();
        assert!(!m.handle(&Gesture::at(GestureKind::SwipeUp, 400, 240), &mut c));
        assert!(m.handle(&Gesture::at(GestureKind::SwipeDown, 400, 240), &mut c));
        assert_eq!(m.scroll().position(), 1);
        let mut canvas = Canvas::new(Expanse::new(80, 24));
        m.draw(&mut canvas);
        assert!(canvas_contains(&canvas, "clip01.mp4"));
        assert!(!canvas_contains(&canvas, "clip00.mp4"));
        assert!(canvas_contains(&canvas, "Videos: 25"));
        assert!(canvas_contains(&canvas, "Swipe to scroll"));
    }

    #[test]
    fn empty_list_message() {
        let m = media(0);
        let mut canvas = Canvas::new(Expanse::new(80, 24));
        m.draw(&mut canvas);
        assert!(canvas_contains(&canvas, "No media configured"));
    }

    #[test]
    fn player_bindings() {
        let m = media(1);
        let h = m.handoff();
        assert_eq!(
            h.binding(GestureKind::Tap),
            Some(&HandoffAction::Send(vec![json!("cycle"), json!("pause")]))
        );
        assert_eq!(
            h.binding(GestureKind::SwipeDown),
            Some(&HandoffAction::Send(vec![json!("add"), json!("volume"), json!(-5)]))
        );
        assert!(matches!(
            h.binding(GestureKind::SwipeLeft),
            Some(HandoffAction::Seek { .. })
        ));
        assert_eq!(h.binding(GestureKind::DoubleTap), None);
    }
}
