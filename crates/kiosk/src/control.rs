//! Fire-and-forget commands to a running collaborator over a Unix socket.
//!
//! Each command is one line of JSON, `{"command": [...]}`, the framing used by
//! mpv's IPC server. Nothing is read back.

use std::{
    io::{self, Write},
    os::{fd::AsRawFd, unix::net::UnixStream},
    path::{Path, PathBuf},
    time::Duration,
};

use nix::sys::socket::{AddressFamily, SockFlag, SockType, UnixAddr, connect, socket};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Default bound on a single send.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// A collaborator's control socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlChannel {
    /// Socket path.
    path: PathBuf,
    /// Write timeout.
    timeout: Duration,
}

impl ControlChannel {
    /// A channel to the socket at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the send timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Socket path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The wire form of a command, newline included.
    pub fn encode(command: &[Value]) -> String {
        format!("{}\n", json!({ "command": command }))
    }

    /// Send a command, reporting failure.
    pub fn try_send(&self, command: &[Value]) -> Result<()> {
        let fail = |e: std::io::Error| Error::Control(format!("{}: {e}", self.path.display()));
        let mut stream = connect_nonblocking(&self.path).map_err(fail)?;
        stream.set_write_timeout(Some(self.timeout)).map_err(fail)?;
        stream
            .write_all(Self::encode(command).as_bytes())
            .map_err(fail)?;
        stream.flush().map_err(fail)?;
        Ok(())
    }

    /// Send a command, logging failure. Returns true if it was delivered.
    pub fn send(&self, command: &[Value]) -> bool {
        match self.try_send(command) {
            Ok(()) => {
                debug!(path = %self.path.display(), ?command, "sent control command");
                true
            }
            Err(e) => {
                warn!("{e}");
                false
            }
        }
    }
}

/// Connect without waiting on the peer: a listener with a full backlog fails
/// with `EAGAIN` instead of blocking. The stream is blocking afterwards.
fn connect_nonblocking(path: &Path) -> io::Result<UnixStream> {
    let fd = socket(
        AddressFamily::Unix,
        SockType::Stream,
        SockFlag::SOCK_NONBLOCK | SockFlag::SOCK_CLOEXEC,
        None,
    )?;
    let addr = UnixAddr::new(path)?;
    connect(fd.as_raw_fd(), &addr)?;
    let stream = UnixStream::from(fd);
    stream.set_nonblocking(false)?;
    Ok(stream)
}
