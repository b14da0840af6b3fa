//! Text parser for the query dialect.
//!
//! The dialect covers `WITH` (non-recursive, SELECT bodies), `SELECT`,
//! `INSERT`, `UPDATE` and `DELETE` with `WHERE` and `RETURNING`. Joins are
//! only available through the builder: any JOIN spelling in text is rejected
//! with [`ParseError::UnsupportedConstruct`].

mod error;
mod parser;

pub use error::ParseError;
pub use parser::{Parser, parse_sql};
