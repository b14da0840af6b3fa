//! Parser error types.

/// Errors in the text of a query.
///
/// A parse error always rejects the whole query; no partial AST is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The input ended where more text was required.
    #[error("unexpected end of input: expected {expected}")]
    UnexpectedEnd {
        /// What the parser was looking for.
        expected: String,
    },

    /// A query starts with a word that is not a statement keyword.
    #[error("unknown statement keyword '{keyword}'")]
    UnknownKeyword {
        /// The word as written.
        keyword: String,
    },

    /// A clause appears where the statement does not allow it.
    #[error("{clause} is not allowed here in a {statement} statement")]
    ClauseOutOfOrder {
        /// The misplaced clause keyword.
        clause: String,
        /// The statement being parsed.
        statement: String,
    },

    /// A required clause is absent.
    #[error("{statement} statement requires a {clause} clause")]
    MissingClause {
        /// The missing clause keyword.
        clause: String,
        /// The statement being parsed.
        statement: String,
    },

    /// A string literal or parenthesis is never closed.
    #[error("unterminated {what} starting at byte {position}")]
    Unterminated {
        /// `string literal` or `parenthesis`.
        what: &'static str,
        /// Byte offset of the opening quote or parenthesis.
        position: usize,
    },

    /// Valid SQL the text grammar does not model, such as JOIN.
    #[error("unsupported construct: {construct}")]
    UnsupportedConstruct {
        /// The construct, by its leading keyword.
        construct: String,
    },

    /// Any other malformed input.
    #[error("syntax error: {message}")]
    Syntax {
        /// Description of the problem.
        message: String,
    },
}

impl ParseError {
    /// Creates a syntax error.
    #[must_use]
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
        }
    }

    /// Creates an unsupported-construct error.
    #[must_use]
    pub fn unsupported(construct: impl Into<String>) -> Self {
        Self::UnsupportedConstruct {
            construct: construct.into(),
        }
    }
}
