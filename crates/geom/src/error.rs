/// Geometry error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A geometry computation was given unusable input.
    Geometry(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Geometry(s) => write!(f, "{s}"),
        }
    }
}

impl std::error::Error for Error {}

/// Result type for geometry operations.
pub type Result<T> = std::result::Result<T, Error>;
