use std::fmt;

use bibnav_engine::CollaboratorError;

/// Result type for bibnav-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug)]
pub enum Error {
    /// Engine error (key tables built from configuration)
    Engine(bibnav_engine::Error),

    /// IO operation failed
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// The record file could not be parsed or written
    Store(String),

    /// No record with the given label
    NotFound(String),

    /// Arguments of a record command were malformed
    InvalidArgs(String),

    /// An external program (editor, opener) failed
    External(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Engine(err) => write!(f, "Engine error: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Store(msg) => write!(f, "Record store error: {}", msg),
            Error::NotFound(label) => write!(f, "No entry with the label '{}'", label),
            Error::InvalidArgs(msg) => write!(f, "Invalid arguments: {}", msg),
            Error::External(msg) => write!(f, "External command failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Engine(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Config(_)
            | Error::Store(_)
            | Error::NotFound(_)
            | Error::InvalidArgs(_)
            | Error::External(_) => None,
        }
    }
}

impl From<bibnav_engine::Error> for Error {
    fn from(err: bibnav_engine::Error) -> Self {
        Error::Engine(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<Error> for CollaboratorError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound(_) | Error::InvalidArgs(_) | Error::External(_) => {
                CollaboratorError(err.to_string())
            }
            other => CollaboratorError(format!("Error: {}", other)),
        }
    }
}
