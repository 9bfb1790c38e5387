//! Touch input: the source abstraction, the Linux evdev implementation, and
//! the reader thread that classifies events into gestures.

use std::time::Duration;

use crate::{Result, event::RawEvent};

/// Linux evdev touch devices.
pub mod evdev;
/// Background reader thread.
mod reader;

pub use reader::InputThread;

/// A producer of raw touch events.
pub trait InputSource {
    /// Wait at most `timeout` for the next event. `Ok(None)` means the wait
    /// timed out; errors are fatal for the source.
    fn next_event(&mut self, timeout: Duration) -> Result<Option<RawEvent>>;
}

impl<T: InputSource + ?Sized> InputSource for Box<T> {
    fn next_event(&mut self, timeout: Duration) -> Result<Option<RawEvent>> {
        (**self).next_event(timeout)
    }
}
