//! The kiosk's screens.

use kiosk::{
    App,
    canvas::{BoxStyle, Canvas, centered},
    geom::Expanse,
    widget::{Button, Widget},
};

use crate::config::AppConfig;

/// Main menu.
mod main_menu;
/// Video list and player hand-off.
mod media;
/// System monitor.
mod monitor;
/// Settings.
mod settings;
/// Apps menu.
mod apps;
/// Launchers for AirPlay and the camera preview.
mod launcher;
/// Touch test.
mod testing;

pub use apps::Apps;
pub use launcher::Launcher;
pub use main_menu::MainMenu;
pub use media::Media;
pub use monitor::Monitor;
pub use settings::Settings;
pub use testing::TouchTest;

/// Main menu screen name.
pub const MAIN: &str = "main";
/// Settings screen name.
pub const SETTINGS: &str = "settings";
/// Apps menu screen name.
pub const APPS: &str = "apps";
/// Video list screen name.
pub const MEDIA: &str = "media";
/// AirPlay screen name.
pub const AIRPLAY: &str = "airplay";
/// Camera screen name.
pub const CAMERA: &str = "camera";
/// Monitor screen name.
pub const MONITOR: &str = "monitor";
/// Touch test screen name.
pub const TESTING: &str = "testing";

/// Register every screen with the application.
pub fn install(app: &mut App, cfg: &AppConfig) {
    app.add_screen(MAIN, MainMenu::new());
    app.add_screen(SETTINGS, Settings::new());
    app.add_screen(APPS, Apps::new());
    app.add_screen(MEDIA, Media::new(cfg));
    app.add_screen(AIRPLAY, Launcher::airplay(cfg));
    app.add_screen(CAMERA, Launcher::camera(cfg));
    app.add_screen(MONITOR, Monitor::new(cfg));
    app.add_screen(TESTING, TouchTest::new());
}

/// A round-bordered return button, centred horizontally on row `y`.
fn return_button<M: Clone>(size: Expanse, y: i32, label: &str, message: M) -> Widget<M> {
    let (w, _) = Button::<M>::size(label);
    let x = (size.w as i32 - w as i32).div_euclid(2);
    Widget::button(x, y, label, message).with_style(BoxStyle::Round)
}

/// Draw lines centred horizontally, one per row from `top`, skipping rows
/// at or below `limit`.
fn centered_lines<S: AsRef<str>>(c: &mut Canvas, top: i32, limit: i32, lines: &[S]) {
    for (i, l) in lines.iter().enumerate() {
        let y = top + i as i32;
        if y >= limit {
            break;
        }
        let l = l.as_ref();
        c.draw_text(centered(0, c.width(), l), y, l);
    }
}
