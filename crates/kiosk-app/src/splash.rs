//! The loading animation played at startup.

use std::time::Duration;

use kiosk::{
    Animation,
    canvas::{Canvas, centered},
};

/// Logo frames, cycled.
const LOGO: [[&str; 6]; 3] = [
    [
        "╔═══════════════════╗",
        "║  ▄▄▄▄▄▄▄▄▄▄▄▄▄▄▄  ║",
        "║  ███████████████  ║",
        "║  ▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀  ║",
        "╚═══════════════════╝",
        "LOADING...",
    ],
    [
        "╔═══════════════════╗",
        "║  ▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀  ║",
        "║  ▄▄▄▄▄▄▄▄▄▄▄▄▄▄▄  ║",
        "║  ███████████████  ║",
        "╚═══════════════════╝",
        "LOADING...",
    ],
    [
        "╔═══════════════════╗",
        "║  ███████████████  ║",
        "║  ▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀  ║",
        "║  ▄▄▄▄▄▄▄▄▄▄▄▄▄▄▄  ║",
        "╚═══════════════════╝",
        "LOADING...",
    ],
];

/// Braille spinner.
const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Width of the progress bar, excluding brackets.
const BAR_WIDTH: usize = 40;

/// Progress gained per frame, in percent.
const STEP: u32 = 2;

/// Logo, progress bar, percentage and spinner, advancing to 100%.
#[derive(Debug, Default)]
pub struct Splash {
    /// Frames drawn so far.
    frame: usize,
    /// Progress in percent.
    progress: u32,
}

impl Splash {
    /// A splash at 0%.
    pub fn new() -> Self {
        Self::default()
    }

    /// Progress in percent.
    pub fn progress(&self) -> u32 {
        self.progress
    }
}

impl Animation for Splash {
    fn frame(&mut self, c: &mut Canvas) -> bool {
        let logo = &LOGO[self.frame % LOGO.len()];
        let top = (c.height() as i32 - logo.len() as i32) / 2 - 2;
        for (i, line) in logo.iter().enumerate() {
            c.draw_text(centered(0, c.width(), line), top + i as i32, line);
        }

        let filled = BAR_WIDTH * self.progress.min(100) as usize / 100;
        let bar = format!("[{}{}]", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled));
        let y = top + logo.len() as i32 + 2;
        c.draw_text(centered(0, c.width(), &bar), y, &bar);
        let pct = format!("{}%", self.progress.min(100));
        c.draw_text(centered(0, c.width(), &pct), y + 1, &pct);
        let spin = format!("Initializing {}", SPINNER[self.frame % SPINNER.len()]);
        c.draw_text(centered(0, c.width(), &spin), y + 3, &spin);

        self.frame += 1;
        self.progress += STEP;
        self.progress < 100
    }

    fn interval(&self) -> Duration {
        Duration::from_millis(50)
    }
}

#[cfg(test)]
mod tests {
    use kiosk::{geom::Expanse, testing::canvas_contains};

    use super::*;

    #[test]
    fn runs_to_completion() {
        let mut s = Splash::new();
        let mut c = Canvas::new(Expanse::new(80, 24));
        let mut frames = 1;
        while s.frame(&mut c) {
            frames += 1;
            c.clear();
        }
        assert_eq!(frames, 50);
        assert_eq!(s.progress(), 100);
    }

    #[test]
    fn first_frame() {
        let mut s = Splash::new();
        let mut c = Canvas::new(Expanse::new(80, 24));
        assert!(s.frame(&mut c));
        assert!(canvas_contains(&c, "LOADING..."));
        assert!(canvas_contains(&c, "0%"));
        assert!(canvas_contains(&c, "Initializing ⠋"));
    }
}
