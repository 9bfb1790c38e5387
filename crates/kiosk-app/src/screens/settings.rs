use kiosk::{
    Context, Gesture, Panel, Screen,
    canvas::{Canvas, centered},
    geom::Expanse,
    widget::{Widget, WidgetKind},
};
use tracing::info;

use super::{MAIN, return_button};

/// Label drawn above the slider.
const LABEL: &str = "Brightness";

/// Settings actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Msg {
    /// The slider moved.
    Brightness(i32),
    /// Back to the main menu.
    Back,
}

/// Display settings. Only brightness for now, and the value is recorded but
/// not applied to hardware.
#[derive(Debug)]
pub struct Settings {
    /// Widgets.
    panel: Panel<Msg>,
    /// Brightness, 0-100.
    brightness: i32,
}

impl Settings {
    /// Construct the screen with brightness at 50%.
    pub fn new() -> Self {
        Self {
            panel: Panel::new("SETTINGS"),
            brightness: 50,
        }
    }

    /// Current brightness setting.
    pub fn brightness(&self) -> i32 {
        self.brightness
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for Settings {
    fn title(&self) -> &str {
        &self.panel.title
    }

    fn layout(&mut self, size: Expanse) {
        let w = size.w.saturating_sub(30).min(40);
        let x = (size.w as i32 - w as i32).div_euclid(2);
        self.panel.clear();
        self.panel.push(Widget::slider(
            x,
            7,
            w,
            (0, 100),
            self.brightness,
            Msg::Brightness,
        ));
        self.panel
            .push(return_button(size, size.h as i32 - 5, "← Main Menu", Msg::Back));
    }

    fn handle(&mut self, g: &Gesture, ctx: &mut Context) -> bool {
        let mut out = vec![];
        let handled = self.panel.handle(g, ctx, &mut out);
        for m in out {
            match m {
                Msg::Brightness(v) => {
                    if v != self.brightness {
                        info!("brightness set to {v}%");
                    }
                    self.brightness = v;
                }
                Msg::Back => ctx.switch(MAIN),
            }
        }
        handled
    }

    fn draw(&self, c: &mut Canvas) {
        self.panel.draw(c);
        if let Some(s) = self
            .panel
            .widgets
            .iter()
            .find(|w| matches!(w.kind, WidgetKind::Slider(_)))
        {
            c.draw_text(centered(0, c.width(), LABEL), s.bounds.y - 1, LABEL);
        }
    }
}
