use std::{
    collections::VecDeque,
    os::fd::{AsRawFd, BorrowedFd},
    path::{Path, PathBuf},
    time::Duration,
};

use ::evdev::{Device, EventType, InputEvent};
use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
use tracing::{debug, info};

use super::InputSource;
use crate::{
    error::{Error, Result},
    event::{Axis, RawEvent},
};

/// Absolute x position.
const ABS_X: u16 = 0x00;
/// Absolute y position.
const ABS_Y: u16 = 0x01;
/// Multi-touch x position.
const ABS_MT_POSITION_X: u16 = 0x35;
/// Multi-touch y position.
const ABS_MT_POSITION_Y: u16 = 0x36;
/// Multi-touch contact tracking id.
const ABS_MT_TRACKING_ID: u16 = 0x39;
/// Touch contact key.
const BTN_TOUCH: u16 = 0x14a;

/// An input device as seen during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Device node.
    pub path: PathBuf,
    /// Reported device name.
    pub name: String,
}

/// List the input devices visible to this process.
pub fn list_devices() -> Vec<DeviceInfo> {
    let mut devs: Vec<DeviceInfo> = ::evdev::enumerate()
        .map(|(path, dev)| DeviceInfo {
            path,
            name: dev.name().unwrap_or("").to_string(),
        })
        .collect();
    devs.sort_by(|a, b| a.path.cmp(&b.path));
    devs
}

/// Does a device name contain any of the patterns, ignoring case?
pub fn name_matches(name: &str, patterns: &[String]) -> bool {
    let name = name.to_lowercase();
    patterns
        .iter()
        .any(|p| !p.is_empty() && name.contains(&p.to_lowercase()))
}

/// Translate an evdev event into a raw touch event. Events that carry no
/// touch information map to `None`.
pub fn translate(event_type: EventType, code: u16, value: i32) -> Option<RawEvent> {
    if event_type == EventType::ABSOLUTE {
        match code {
            ABS_X | ABS_MT_POSITION_X => Some(RawEvent::AxisUpdate {
                axis: Axis::X,
                value,
            }),
            ABS_Y | ABS_MT_POSITION_Y => Some(RawEvent::AxisUpdate {
                axis: Axis::Y,
                value,
            }),
            ABS_MT_TRACKING_ID => Some(RawEvent::TrackingUpdate { id: value }),
            _ => None,
        }
    } else if event_type == EventType::KEY && code == BTN_TOUCH {
        Some(RawEvent::ContactUpdate { down: value != 0 })
    } else {
        None
    }
}

/// Translate a device event.
fn translate_event(e: &InputEvent) -> Option<RawEvent> {
    translate(e.event_type(), e.code(), e.value())
}

/// A touch panel read through the Linux evdev interface.
pub struct EvdevSource {
    /// The open device.
    device: Device,
    /// Device node.
    path: PathBuf,
    /// Reported device name.
    name: String,
    /// Translated events not yet handed out.
    pending: VecDeque<RawEvent>,
}

impl std::fmt::Debug for EvdevSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvdevSource")
            .field("path", &self.path)
            .field("name", &self.name)
            .finish()
    }
}

impl EvdevSource {
    /// Open a specific device node.
    pub fn open(path: &Path) -> Result<Self> {
        let device = Device::open(path)
            .map_err(|e| Error::Device(format!("{}: {e}", path.display())))?;
        let name = device.name().unwrap_or("").to_string();
        info!(path = %path.display(), name = %name, "opened touch device");
        Ok(Self {
            device,
            path: path.to_path_buf(),
            name,
            pending: VecDeque::new(),
        })
    }

    /// Open the first device whose name matches one of `patterns`.
    pub fn find(patterns: &[String]) -> Result<Self> {
        for (path, device) in ::evdev::enumerate() {
            let name = device.name().unwrap_or("").to_string();
            if name_matches(&name, patterns) {
                info!(path = %path.display(), name = %name, "found touch device");
                return Ok(Self {
                    device,
                    path,
                    name,
                    pending: VecDeque::new(),
                });
            }
            debug!(path = %path.display(), name = %name, "skipping input device");
        }
        Err(Error::Device(format!(
            "no input device matching any of: {}",
            patterns.join(", ")
        )))
    }

    /// Device node.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reported device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait until the device is readable or the timeout passes.
    fn readable(&self, timeout: Duration) -> Result<bool> {
        let ms = u16::try_from(timeout.as_millis()).unwrap_or(u16::MAX);
        // SAFETY: the descriptor is owned by `self.device`, which outlives
        // this call.
        let fd = unsafe { BorrowedFd::borrow_raw(self.device.as_raw_fd()) };
        let mut fds = [PollFd::new(fd, PollFlags::POLLIN)];
        match poll(&mut fds, PollTimeout::from(ms)) {
            Ok(n) => Ok(n > 0),
            Err(nix::errno::Errno::EINTR) => Ok(false),
            Err(e) => Err(Error::Device(format!("poll: {e}"))),
        }
    }
}

impl InputSource for EvdevSource {
    fn next_event(&mut self, timeout: Duration) -> Result<Option<RawEvent>> {
        if let Some(e) = self.pending.pop_front() {
            return Ok(Some(e));
        }
        if !self.readable(timeout)? {
            return Ok(None);
        }
        let events = self.device.fetch_events().map_err(Error::device)?;
        self.pending.extend(events.filter_map(|e| translate_event(&e)));
        Ok(self.pending.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_touch_codes() {
        assert_eq!(
            translate(EventType::ABSOLUTE, ABS_MT_POSITION_X, 412),
            Some(RawEvent::AxisUpdate {
                axis: Axis::X,
                value: 412
            })
        );
        assert_eq!(
            translate(EventType::ABSOLUTE, ABS_Y, 17),
            Some(RawEvent::AxisUpdate {
                axis: Axis::Y,
                value: 17
            })
        );
        assert_eq!(
            translate(EventType::ABSOLUTE, ABS_MT_TRACKING_ID, -1),
            Some(RawEvent::TrackingUpdate { id: -1 })
        );
        assert_eq!(
            translate(EventType::KEY, BTN_TOUCH, 1),
            Some(RawEvent::ContactUpdate { down: true })
        );
        assert_eq!(
            translate(EventType::KEY, BTN_TOUCH, 0),
            Some(RawEvent::ContactUpdate { down: false })
        );
    }

    #[test]
    fn ignores_unrelated_codes() {
        assert_eq!(translate(EventType::SYNCHRONIZATION, 0, 0), None);
        assert_eq!(translate(EventType::KEY, 0x110, 1), None);
        assert_eq!(translate(EventType::ABSOLUTE, 0x18, 30), None);
    }

    #[test]
    fn matches_names_case_insensitively() {
        let pats: Vec<String> = vec!["ft5x06".into(), "10-0038".into()];
        assert!(name_matches("Generic FT5x06 (79)", &pats));
        assert!(name_matches("1-0038 10-0038 touch", &pats));
        assert!(!name_matches("AT Translated Set 2 keyboard", &pats));
        assert!(!name_matches("anything", &[String::new()]));
    }
}
