//! The touch kiosk application: configuration, the concrete screens and the
//! startup animation, assembled on top of the `kiosk` core.

/// Application configuration.
pub mod config;
/// Screens.
pub mod screens;
/// Startup animation.
pub mod splash;

use std::sync::mpsc::Receiver;

use kiosk::{App, Gesture, Result, geom::Expanse};

pub use config::AppConfig;

/// Build the application with every screen installed. No screen is active
/// until the caller switches to one, normally [`screens::MAIN`].
pub fn build(cfg: &AppConfig, gestures: Receiver<Gesture>, term: Expanse) -> Result<App> {
    let mut app = App::new(&cfg.core, gestures, term)?;
    screens::install(&mut app, cfg);
    Ok(app)
}
