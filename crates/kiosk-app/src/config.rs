//! Application configuration: the core sections plus the collaborators and
//! media the screens use.

use std::{
    fs,
    path::{Path, PathBuf},
};

use kiosk::{Config, Error, Result, collaborator::CollaboratorSpec};
use serde::{Deserialize, Serialize};

/// Collaborator launch specs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Collaborators {
    /// Media player. The selected media path is appended.
    pub player: CollaboratorSpec,
    /// AirPlay receiver.
    pub airplay: CollaboratorSpec,
    /// Camera preview. The video device path is appended.
    pub camera: CollaboratorSpec,
    /// System monitor. Draws on the terminal.
    pub monitor: CollaboratorSpec,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            player: CollaboratorSpec::new(
                "mpv",
                &["--quiet", "--vo=drm", "--input-ipc-server=/tmp/mpvsocket"],
            ),
            airplay: CollaboratorSpec::new("uxplay", &["-bt709", "-s", "800x480", "-vs", "kmssink"]),
            camera: CollaboratorSpec::new(
                "ffplay",
                &["-f", "v4l2", "-vf", "scale=640:480", "-an", "-sn", "-i"],
            ),
            monitor: CollaboratorSpec::new("htop", &[]).holding_terminal(),
        }
    }
}

/// Everything the binary reads from its config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Core settings: sensor, gesture, runloop and input sections.
    #[serde(flatten)]
    pub core: Config,
    /// External programs.
    pub collaborators: Collaborators,
    /// The player's IPC socket.
    pub player_socket: PathBuf,
    /// Camera device node.
    pub video_device: PathBuf,
    /// Media files offered on the video list, in display order.
    pub media: Vec<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            core: Config::default(),
            collaborators: Collaborators::default(),
            player_socket: "/tmp/mpvsocket".into(),
            video_device: "/dev/video0".into(),
            media: vec![],
        }
    }
}

impl AppConfig {
    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        let cfg: Self = serde_json::from_str(&raw)?;
        cfg.core.validate()?;
        Ok(cfg)
    }

    /// The config as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() -> Result<()> {
        let cfg: AppConfig = serde_json::from_str("{}")?;
        assert_eq!(cfg, AppConfig::default());
        assert!(cfg.collaborators.monitor.holds_terminal);
        assert!(!cfg.collaborators.player.holds_terminal);
        Ok(())
    }

    #[test]
    fn core_sections_sit_at_top_level() -> Result<()> {
        let cfg: AppConfig = serde_json::from_str(
            r#"{
                "gesture": {"long_press_time_ms": 1000},
                "media": ["/srv/a.mp4", "/srv/b.mkv"],
                "collaborators": {"monitor": {"program": "btop", "holds_terminal": true}}
            }"#,
        )?;
        assert_eq!(cfg.core.gesture.long_press_time_ms, 1000);
        assert_eq!(cfg.core.gesture.double_tap_window_ms, 500);
        assert_eq!(cfg.media.len(), 2);
        assert_eq!(cfg.collaborators.monitor.program, "btop");
        assert_eq!(cfg.collaborators.player.program, "mpv");
        Ok(())
    }

    #[test]
    fn printed_config_reloads() -> Result<()> {
        let cfg = AppConfig::default();
        let back: AppConfig = serde_json::from_str(&cfg.to_json()?)?;
        assert_eq!(back, cfg);
        Ok(())
    }
}
