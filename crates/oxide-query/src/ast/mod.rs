//! Abstract Syntax Tree (AST) types for queries.
//!
//! Both the builder and the parser emit these types, and only ever emit them
//! after every table and column reference has been checked against the query
//! context, so a value of [`SqlQuery`] is schema-valid by construction.

mod display;
mod expression;
mod statement;
mod tree;

pub use expression::{
    ColumnAssignment, ColumnReference, ComparisonOp, Condition, SelectColumn, Value,
};
pub use statement::{
    DeleteClause, InsertClause, JoinClause, JoinKind, NamedQuery, QueryClause, ReturningClause,
    SelectClause, SelectColumns, SqlQuery, TableReference, UpdateClause, WhereClause, WithClause,
};
pub use tree::{AstTree, Node, NodeId, NodeKind, NodeRef};
