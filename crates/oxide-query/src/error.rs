//! Crate-level error type.

use crate::builder::BuilderError;
use crate::context::ContextError;
use crate::parser::ParseError;
use crate::schema::SchemaError;

/// Any error this crate raises.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The schema declaration is invalid.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A reference is out of scope.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// A builder call was invalid.
    #[error(transparent)]
    Builder(BuilderError),

    /// The query text is malformed or unsupported.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl From<BuilderError> for Error {
    /// Scope errors keep their context error whichever path raised them.
    fn from(error: BuilderError) -> Self {
        match error {
            BuilderError::Context(error) => Self::Context(error),
            other => Self::Builder(other),
        }
    }
}

/// Result type using this crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
