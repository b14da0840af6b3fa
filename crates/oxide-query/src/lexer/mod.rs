//! Keyword matching and clause splitting.
//!
//! The query dialect is split at top-level keywords and commas instead of
//! being tokenized into a full token stream; see [`splitter`] for the scanner.

mod keyword;
pub mod splitter;

pub use keyword::Keyword;
pub use splitter::{
    Delimiter, check_balanced, extract_until, next_token, split_clauses, split_operator,
    split_top_level, starts_with, strip_parens,
};
