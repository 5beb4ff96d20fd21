use std::fmt;

/// Result type for bibnav-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that escape the dispatch loop.
///
/// Collaborator failures never end up here: they are shown on the prompt line
/// and the loop keeps running.
#[derive(Debug)]
pub enum Error {
    /// Reading input or drawing to the terminal failed
    Io(std::io::Error),

    /// The terminal backend reported a failure that is not an `io::Error`
    Terminal(String),

    /// A key specification could not be parsed
    KeySpec(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Terminal(msg) => write!(f, "Terminal error: {}", msg),
            Error::KeySpec(msg) => write!(f, "Invalid key binding: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Terminal(_) | Error::KeySpec(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
