//! Interface to the record collaborator.
//!
//! The engine never looks inside records. It asks the collaborator to write
//! display rows into a [`TextBuffer`] and interprets only the buffer's shape:
//! an empty buffer after a command means "stay in (or return to) the list".

use std::fmt;

use crate::buffer::TextBuffer;
use crate::command::Command;

/// A record operation requested by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub command: Command,
    pub labels: Vec<String>,
    pub args: Vec<String>,
}

impl Request {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            labels: Vec::new(),
            args: Vec::new(),
        }
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// Failure reported by a collaborator; shown on the prompt line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollaboratorError(pub String);

impl fmt::Display for CollaboratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for CollaboratorError {}

impl From<String> for CollaboratorError {
    fn from(msg: String) -> Self {
        CollaboratorError(msg)
    }
}

impl From<&str> for CollaboratorError {
    fn from(msg: &str) -> Self {
        CollaboratorError(msg.to_string())
    }
}

pub trait Records {
    /// Write one row per record matching `args` into `out` and return the
    /// labels in display order.
    fn list(&mut self, args: &[String], out: &mut TextBuffer) -> Result<Vec<String>, CollaboratorError>;

    /// Run `request`, writing any output rows into `out`. The returned count
    /// is command specific (search hits, affected records).
    fn execute(&mut self, request: &Request, out: &mut TextBuffer) -> Result<usize, CollaboratorError>;
}
