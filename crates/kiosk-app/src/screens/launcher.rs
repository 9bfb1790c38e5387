use std::path::PathBuf;

use kiosk::{
    Context, Gesture, GestureKind, Panel, Screen,
    canvas::Canvas,
    geom::Expanse,
    handoff::{Handoff, HandoffAction, HandoffState},
    widget::{MENU_BUTTON_HEIGHT, MENU_BUTTON_WIDTH, Widget},
};

use super::{APPS, centered_lines, return_button};
use crate::config::AppConfig;

/// Launcher actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Msg {
    /// Start the collaborator.
    Launch,
    /// Back to the apps menu.
    Back,
}

/// A screen with one big button that hands the display to a collaborator,
/// and a status panel for when nothing is running.
#[derive(Debug)]
pub struct Launcher {
    /// Widgets shown while idle.
    panel: Panel<Msg>,
    /// Label of the launch button.
    label: &'static str,
    /// Icon of the launch button.
    icon: &'static str,
    /// Info lines shown below the launch button while idle.
    info: Vec<String>,
    /// Overlay lines shown while the collaborator runs.
    instructions: Vec<String>,
    /// A path that must exist before launching.
    requires: Option<PathBuf>,
    /// Extra argument appended on launch.
    extra: Option<String>,
    /// The collaborator.
    handoff: Handoff,
}

/// How a long press is described to the user.
fn long_press_hint(cfg: &AppConfig) -> String {
    format!(
        "(>{}s)",
        cfg.core.gesture.long_press_time().as_secs_f64()
    )
}

impl Launcher {
    /// The AirPlay receiver screen.
    pub fn airplay(cfg: &AppConfig) -> Self {
        let handoff = Handoff::new(cfg.collaborators.airplay.clone())
            .bind(GestureKind::DoubleTap, HandoffAction::Stop)
            .bind(GestureKind::LongPress, HandoffAction::Stop);
        Self {
            panel: Panel::new("AIRPLAY"),
            label: "Start AirPlay",
            icon: " 📡📺 \n ▲▲▲",
            info: vec![
                "AirPlay Server Control".into(),
                String::new(),
                "• Look for this device in AirPlay settings".into(),
            ],
            instructions: vec![
                "AirPlay receiver controls:".into(),
                "• Double tap: Stop AirPlay".into(),
                format!("• Long press {}: Stop AirPlay", long_press_hint(cfg)),
            ],
            requires: None,
            extra: None,
            handoff,
        }
    }

    /// The camera preview screen. The video device is checked before every
    /// launch and passed to the player.
    pub fn camera(cfg: &AppConfig) -> Self {
        let handoff = Handoff::new(cfg.collaborators.camera.clone())
            .bind(GestureKind::LongPress, HandoffAction::Stop);
        let device = cfg.video_device.display().to_string();
        Self {
            panel: Panel::new("CAMERA PREVIEW"),
            label: "Start Camera",
            icon: " 📷📺 \n ▲▲▲",
            info: vec![
                "Camera Preview Control".into(),
                String::new(),
                format!("Device: {device}"),
            ],
            instructions: vec![
                "Camera preview controls:".into(),
                format!("• Long press {}: Exit preview", long_press_hint(cfg)),
            ],
            requires: Some(cfg.video_device.clone()),
            extra: Some(device),
            handoff,
        }
    }

    /// The collaborator state.
    pub fn handoff(&self) -> &Handoff {
        &self.handoff
    }

    /// Check the precondition and start the collaborator.
    fn launch(&mut self, ctx: &Context) {
        if let Some(p) = &self.requires
            && !p.exists()
        {
            let msg = format!("Video device {} not found", p.display());
            self.handoff.fail(msg, ctx.now());
            return;
        }
        self.handoff.launch(self.extra.as_deref(), ctx.now());
    }
}

impl Screen for Launcher {
    fn title(&self) -> &str {
        &self.panel.title
    }

    fn layout(&mut self, size: Expanse) {
        let (bw, bh) = (MENU_BUTTON_WIDTH as i32, MENU_BUTTON_HEIGHT as i32);
        let (w, h) = (size.w as i32, size.h as i32);
        self.panel.clear();
        self.panel.push(Widget::menu_button(
            (w - bw).div_euclid(2),
            (h - bh) / 2 - 3,
            self.label,
            self.icon,
            Msg::Launch,
        ));
        self.panel
            .push(return_button(size, h - 5, "← Apps Menu", Msg::Back));
    }

    fn exit(&mut self, _ctx: &mut Context) {
        self.handoff.stop();
    }

    fn handle(&mut self, g: &Gesture, ctx: &mut Context) -> bool {
        if self.handoff.handle(g, ctx) || self.handoff.failure().is_some() {
            return true;
        }
        let mut out = vec![];
        let handled = self.panel.handle(g, ctx, &mut out);
        for m in out {
            match m {
                Msg::Launch => self.launch(ctx),
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
            let lines: Vec<&str> = self.instructions.iter().map(String::as_str).collect();
            self.handoff.draw_overlay(c, &self.panel.title, &lines);
            return;
        }
        self.panel.draw(c);
        let status = format!(
            "Status: {}",
            if self.handoff.is_active() {
                "Running"
            } else {
                "Stopped"
            }
        );
        let mut lines = self.info.clone();
        lines.push(status);
        let h = c.height() as i32;
        centered_lines(c, h / 2 + 3, h - 5, &lines);
    }

    fn holds_terminal(&self) -> bool {
        self.handoff.holds_terminal()
    }
}
