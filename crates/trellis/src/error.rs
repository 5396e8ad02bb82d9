use std::result::Result as StdResult;

use thiserror::Error;

use crate::id::WidgetId;

/// Result type for trellis operations.
pub type Result<T> = StdResult<T, Error>;

/// Parse error marker type.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
#[error("{message}")]
pub struct ParseError {
    /// Parse error message, optionally including the offending input.
    message: String,
}

impl ParseError {
    /// Construct a parse error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Construct a parse error that quotes the input it failed on.
    pub fn with_input(message: impl Into<String>, input: &str) -> Self {
        Self {
            message: format!("{}: {input:?}", message.into()),
        }
    }
}

/// Core error type.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    #[error("parse error: {0}")]
    /// Parsing failure.
    Parse(#[source] ParseError),

    #[error("unknown widget: {0:?}")]
    /// A widget handle that is not registered with the coordinator.
    UnknownWidget(WidgetId),

    #[error("unknown container: {0}")]
    /// A connector id that does not name a layout container.
    UnknownContainer(String),

    #[error("index {index} out of range for {len} items")]
    /// An item index past the end of a container.
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of items.
        len: usize,
    },

    #[error("config: {0}")]
    /// Invalid configuration.
    Config(String),

    #[error("invalid: {0}")]
    /// Invalid input error.
    Invalid(String),

    #[error("internal: {0}")]
    /// Internal error.
    Internal(String),
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}
