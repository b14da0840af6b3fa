//! Builder error types.

use crate::context::ContextError;

/// Errors raised by a builder call.
///
/// Every error is raised at the call that caused it; no builder state is
/// produced for a failed call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuilderError {
    /// The table is neither in the schema nor a CTE of the query.
    #[error("unknown table '{table}'")]
    UnknownTable {
        /// The table name as written.
        table: String,
    },

    /// `*` was combined with explicit columns.
    #[error("'*' cannot be combined with other columns")]
    MixedWildcard,

    /// A column list with no columns.
    #[error("column list is empty")]
    EmptyColumnList,

    /// A table reference that is not `name`, `name alias` or `name AS alias`.
    #[error("invalid table reference '{text}'")]
    InvalidTableReference {
        /// The reference as written.
        text: String,
    },

    /// A column token that is not `column [AS alias]`.
    #[error("invalid column '{token}'")]
    InvalidColumnToken {
        /// The token as written.
        token: String,
    },

    /// An operand that is neither a column, a parameter nor a literal.
    #[error("invalid operand '{token}'")]
    InvalidOperand {
        /// The token as written.
        token: String,
    },

    /// A comparison operator outside `= != <> < <= > >= LIKE`.
    #[error("unknown operator '{operator}'")]
    UnknownOperator {
        /// The operator as written.
        operator: String,
    },

    /// A join kind outside `INNER`, `LEFT`, `RIGHT` and `FULL`.
    #[error("unknown join kind '{kind}'")]
    UnknownJoinKind {
        /// The kind as written.
        kind: String,
    },

    /// The same column is assigned twice in one SET or VALUES list.
    #[error("column '{column}' is assigned more than once")]
    DuplicateAssignment {
        /// The column name as declared.
        column: String,
    },

    /// A reference failed to resolve against the query context.
    #[error(transparent)]
    Context(#[from] ContextError),
}

impl BuilderError {
    /// Maps a failed table lookup to [`BuilderError::UnknownTable`], keeping
    /// any other context error as is.
    pub(crate) fn from_lookup(error: ContextError) -> Self {
        match error {
            ContextError::UnknownTable { table } => Self::UnknownTable { table },
            other => Self::Context(other),
        }
    }
}
