use kiosk::{
    Context, Gesture, Panel, Screen,
    canvas::Canvas,
    geom::Expanse,
    widget::{MENU_BUTTON_HEIGHT, MENU_BUTTON_WIDTH, Widget},
};

use super::{APPS, MONITOR, SETTINGS, TESTING, return_button};

/// Menu entries: label, icon, target screen.
const ENTRIES: [(&str, &str, &str); 4] = [
    ("Settings", "  ⚙  \n ───", SETTINGS),
    ("Apps", " ▣▣▣ \n ▣▣▣", APPS),
    ("Monitor", " ▂▄▆ \n ───", MONITOR),
    ("Testing", " ✓✗ \n ───", TESTING),
];

/// Menu actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Msg {
    /// Switch to a screen.
    Open(&'static str),
    /// Leave the kiosk.
    Quit,
}

/// The top-level menu: a 2×2 grid of menu buttons and an exit button.
#[derive(Debug)]
pub struct MainMenu {
    /// Widgets.
    panel: Panel<Msg>,
}

impl MainMenu {
    /// Construct the menu. Widgets are placed on the first layout.
    pub fn new() -> Self {
        Self {
            panel: Panel::new("MAIN MENU"),
        }
    }
}

impl Default for MainMenu {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for MainMenu {
    fn title(&self) -> &str {
        &self.panel.title
    }

    fn layout(&mut self, size: Expanse) {
        let (bw, bh) = (MENU_BUTTON_WIDTH as i32, MENU_BUTTON_HEIGHT as i32);
        let (w, h) = (size.w as i32, size.h as i32);
        // Leave room for the title bar and the exit button.
        let gap_x = ((w - 2 * bw) / 3).max(0);
        let gap_y = ((h - 2 * bh - 8) / 3).max(0);
        self.panel.clear();
        for (i, (label, icon, target)) in ENTRIES.into_iter().enumerate() {
            let (row, col) = (i as i32 / 2, i as i32 % 2);
            let x = gap_x + col * (bw + gap_x);
            let y = 5 + row * (bh + gap_y);
            self.panel
                .push(Widget::menu_button(x, y, label, icon, Msg::Open(target)));
        }
        self.panel.push(return_button(size, h - 3, "Exit", Msg::Quit));
    }

    fn handle(&mut self, g: &Gesture, ctx: &mut Context) -> bool {
        let mut out = vec![];
        let handled = self.panel.handle(g, ctx, &mut out);
        for m in out {
            match m {
                Msg::Open(name) => ctx.switch(name),
                Msg::Quit => ctx.quit(),
            }
        }
        handled
    }

    fn draw(&self, c: &mut Canvas) {
        self.panel.draw(c);
    }
}
