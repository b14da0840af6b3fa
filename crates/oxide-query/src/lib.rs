//! # oxide-query
//!
//! Schema-aware query construction. A query is described either as text in a
//! small SQL dialect or through a fluent builder, and both produce the same
//! validated AST.
//!
//! This crate provides:
//! - A schema model with case-insensitive table and column lookup
//! - A query context that tracks which tables and columns are in scope
//! - A typestate query builder that checks every reference as it is added
//! - A text parser that replays its input on the builder
//!
//! ## Building and parsing agree
//!
//! ```rust
//! use oxide_query::{parse_sql, query_builder};
//! use oxide_query::schema::{DataType, Database, Table};
//!
//! let db = Database::builder()
//!     .table(
//!         Table::builder("users")
//!             .column("id", DataType::Integer)
//!             .nullable_column("address", DataType::Text)
//!             .primary_key("id"),
//!     )
//!     .build()?;
//!
//! let parsed = parse_sql(&db, "SELECT address, id AS user_id FROM users WHERE id > :id")?;
//! let built = query_builder(&db)
//!     .select()
//!     .from("users")?
//!     .columns(&["address", "id AS user_id"])?
//!     .where_clause(|b| b.filter("id", ">", ":id"))?
//!     .query();
//!
//! assert_eq!(parsed, built);
//! # Ok::<(), oxide_query::Error>(())
//! ```
//!
//! ## Scope is checked eagerly
//!
//! ```rust
//! use oxide_query::context::ContextError;
//! use oxide_query::schema::{DataType, Database, Table};
//! use oxide_query::{parse_sql, Error};
//!
//! let db = Database::builder()
//!     .table(Table::builder("users").column("id", DataType::Integer).primary_key("id"))
//!     .build()?;
//!
//! let err = parse_sql(&db, "SELECT email FROM users").unwrap_err();
//! assert!(matches!(err, Error::Context(ContextError::UnknownColumn { .. })));
//! # Ok::<(), oxide_query::Error>(())
//! ```

pub mod ast;
pub mod builder;
pub mod context;
mod error;
pub mod lexer;
pub mod parser;
pub mod schema;

pub use ast::SqlQuery;
pub use builder::{BuilderError, QueryBuilder, query_builder};
pub use context::{ContextError, QueryContext};
pub use error::{Error, Result};
pub use parser::{ParseError, Parser, parse_sql};
pub use schema::{Database, SchemaError, create_database};
