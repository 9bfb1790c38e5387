//! Helpers for testing screens, widgets and the application loop without a
//! touch panel or a terminal.

use std::{
    collections::VecDeque,
    io::{self, Write},
    time::Duration,
};

use crate::{
    canvas::Canvas,
    error::{Error, Result},
    event::RawEvent,
    input::InputSource,
};

/// A helper macro to create expected-line slices for [`assert_canvas`].
#[macro_export]
macro_rules! buf {
    ($($line:literal)*) => {
        &[$($line),*]
    };
}

/// Asserts that the canvas text matches the expected lines, ignoring
/// trailing whitespace.
pub fn assert_canvas(canvas: &Canvas, expected: &[&str]) {
    let lines = canvas.lines();
    assert_eq!(
        expected.len(),
        lines.len(),
        "expected {} lines, canvas has {}",
        expected.len(),
        lines.len()
    );
    for (y, (want, got)) in expected.iter().zip(lines.iter()).enumerate() {
        assert_eq!(
            got.trim_end(),
            want.trim_end(),
            "line {y} mismatch:\nexpected: '{want}'\nactual:   '{got}'"
        );
    }
}

/// Does any canvas row contain `needle`?
pub fn canvas_contains(canvas: &Canvas, needle: &str) -> bool {
    canvas.lines().iter().any(|l| l.contains(needle))
}

/// A writer that records what it is given and counts `write` calls.
#[derive(Debug, Default)]
pub struct CountingWriter {
    /// Everything written so far.
    pub bytes: Vec<u8>,
    /// Number of `write` calls.
    pub writes: usize,
    /// Number of `flush` calls.
    pub flushes: usize,
    /// Fail every write.
    pub fail: bool,
}

impl Write for CountingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        }
        self.writes += 1;
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

/// An input source that replays a fixed script of events, then reports
/// timeouts until the script is exhausted, and finally an error.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    /// Remaining events. `None` entries simulate a read timeout.
    script: VecDeque<Option<RawEvent>>,
    /// Report a device error once the script is exhausted.
    fail_at_end: bool,
}

impl ScriptedSource {
    /// Replay `events` in order.
    pub fn new(events: impl IntoIterator<Item = RawEvent>) -> Self {
        Self {
            script: events.into_iter().map(Some).collect(),
            fail_at_end: false,
        }
    }

    /// Insert a simulated timeout.
    pub fn pause(mut self) -> Self {
        self.script.push_back(None);
        self
    }

    /// Append events.
    pub fn then(mut self, events: impl IntoIterator<Item = RawEvent>) -> Self {
        self.script.extend(events.into_iter().map(Some));
        self
    }

    /// Fail with a device error once the script runs out.
    pub fn fail_at_end(mut self) -> Self {
        self.fail_at_end = true;
        self
    }
}

impl InputSource for ScriptedSource {
    fn next_event(&mut self, timeout: Duration) -> Result<Option<RawEvent>> {
        match self.script.pop_front() {
            Some(e) => Ok(e),
            None if self.fail_at_end => Err(Error::Device("script exhausted".into())),
            None => {
                std::thread::sleep(timeout.min(Duration::from_millis(5)));
                Ok(None)
            }
        }
    }
}
