use barbeat_core::{Error as CoreError, ErrorKind};
use thiserror::Error;

use crate::lexer::Span;

pub type Result<T> = std::result::Result<T, NotationError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotationError {
    /// A token failed to parse or was out of range
    #[error("{source} (token '{token}' at {span})")]
    Token {
        token: String,
        span: Span,
        #[source]
        source: CoreError,
    },

    /// Failure not tied to a single token: bad options, or an invalid note
    /// handed to the serializer
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl NotationError {
    pub fn at_token(token: impl Into<String>, span: Span, source: CoreError) -> Self {
        NotationError::Token {
            token: token.into(),
            span,
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            NotationError::Token { source, .. } => source.kind(),
            NotationError::Core(source) => source.kind(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            NotationError::Token { span, .. } => Some(*span),
            NotationError::Core(_) => None,
        }
    }
}
