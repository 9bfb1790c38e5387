use kiosk::{
    Context, Gesture, Panel, Screen,
    canvas::Canvas,
    geom::Expanse,
    widget::{MENU_BUTTON_HEIGHT, MENU_BUTTON_WIDTH, Widget},
};

use super::{AIRPLAY, CAMERA, MAIN, MEDIA, return_button};

/// Entries: label, icon, target screen.
const ENTRIES: [(&str, &str, &str); 3] = [
    ("Video Player", " ▶▶▶ \n ═══", MEDIA),
    ("AirPlay", " 📱📺 \n ~~~", AIRPLAY),
    ("Camera", " 📷📺 \n ▲▲▲", CAMERA),
];

/// Apps menu actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Msg {
    /// Switch to a screen.
    Open(&'static str),
}

/// The apps menu: one menu button per collaborator screen.
#[derive(Debug)]
pub struct Apps {
    /// Widgets.
    panel: Panel<Msg>,
}

impl Apps {
    /// Construct the menu.
    pub fn new() -> Self {
        Self {
            panel: Panel::new("APPLICATIONS"),
        }
    }
}

impl Default for Apps {
    fn default() -> Self {
        Self::new()
    }
}

/// Origins for the three buttons: a single row when the terminal is wide
/// enough, otherwise two on top and one centred below.
fn positions(size: Expanse) -> [(i32, i32); 3] {
    let (bw, bh) = (MENU_BUTTON_WIDTH as i32, MENU_BUTTON_HEIGHT as i32);
    let (w, h) = (size.w as i32, size.h as i32);
    if w >= 3 * bw + 40 {
        let gap = (w - 3 * bw) / 4;
        let y = (h - bh) / 2 - 2;
        [0, 1, 2].map(|i| (gap + i * (bw + gap), y))
    } else {
        let gap_x = ((w - 2 * bw) / 3).max(0);
        let gap_y = ((h - 2 * bh - 8) / 3).max(0);
        [
            (gap_x, 5),
            (gap_x + bw + gap_x, 5),
            ((w - bw).div_euclid(2), 5 + bh + gap_y),
        ]
    }
}

impl Screen for Apps {
    fn title(&self) -> &str {
        &self.panel.title
    }

    fn layout(&mut self, size: Expanse) {
        self.panel.clear();
        for ((label, icon, target), (x, y)) in ENTRIES.into_iter().zip(positions(size)) {
            self.panel
                .push(Widget::menu_button(x, y, label, icon, Msg::Open(target)));
        }
        self.panel
            .push(return_button(size, size.h as i32 - 5, "← Main Menu", Msg::Open(MAIN)));
    }

    fn handle(&mut self, g: &Gesture, ctx: &mut Context) -> bool {
        let mut out = vec![];
        let handled = self.panel.handle(g, ctx, &mut out);
        for Msg::Open(name) in out {
            ctx.switch(name);
        }
        handled
    }

    fn draw(&self, c: &mut Canvas) {
        self.panel.draw(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_or_grid() {
        let row = positions(Expanse::new(120, 30));
        assert!(row.iter().all(|p| p.1 == row[0].1));
        let grid = positions(Expanse::new(80, 24));
        assert_eq!(grid[0].1, grid[1].1);
        assert!(grid[2].1 > grid[0].1);
        assert_eq!(grid[2].0, 31);
    }
}
