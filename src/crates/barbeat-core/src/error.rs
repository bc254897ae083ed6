use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of a failure, used by callers that only care about
/// which class of problem they hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Format,
    Range,
    Config,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid format '{input}': {message}")]
    Format { input: String, message: String },

    #[error("Division by zero in '{input}'")]
    DivisionByZero { input: String },

    #[error("Out of range: {message}")]
    Range { message: String },

    #[error("Invalid options: {0}")]
    Config(String),
}

impl Error {
    pub fn format(input: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Format {
            input: input.into(),
            message: message.into(),
        }
    }

    pub fn division_by_zero(input: impl Into<String>) -> Self {
        Error::DivisionByZero {
            input: input.into(),
        }
    }

    pub fn range(message: impl Into<String>) -> Self {
        Error::Range {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Format { .. } => ErrorKind::Format,
            Error::DivisionByZero { .. } | Error::Range { .. } => ErrorKind::Range,
            Error::Config(_) => ErrorKind::Config,
        }
    }
}
