use std::{io, result::Result as StdResult, sync::mpsc};

use thiserror::Error;

/// Result type for kiosk operations.
pub type Result<T> = StdResult<T, Error>;

/// Core error type.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    #[error("device: {0}")]
    /// The touch device could not be found, opened or read.
    Device(String),
    #[error("terminal: {0}")]
    /// Terminal setup, restore or output failure.
    Terminal(String),
    #[error("collaborator: {0}")]
    /// An external process could not be launched or supervised.
    Collaborator(String),
    #[error("control channel: {0}")]
    /// A collaborator control socket could not be reached.
    Control(String),
    #[error("config: {0}")]
    /// Invalid or unreadable configuration.
    Config(String),
    #[error("runloop: {0}")]
    /// Run loop failure.
    RunLoop(String),
    #[error("geometry: {0}")]
    /// Geometry failure.
    Geometry(String),
}

impl Error {
    /// Wrap an IO error as a terminal failure.
    pub fn terminal(e: io::Error) -> Self {
        Self::Terminal(e.to_string())
    }

    /// Wrap an IO error as a device failure.
    pub fn device(e: io::Error) -> Self {
        Self::Device(e.to_string())
    }
}

impl From<mpsc::RecvError> for Error {
    fn from(e: mpsc::RecvError) -> Self {
        Self::RunLoop(e.to_string())
    }
}

impl From<geom::Error> for Error {
    fn from(e: geom::Error) -> Self {
        Self::Geometry(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}

/// Map IO results into terminal errors.
pub(crate) fn translate_result<T>(e: io::Result<T>) -> Result<T> {
    e.map_err(Error::terminal)
}
