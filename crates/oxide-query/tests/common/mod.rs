#![allow(dead_code)]

use oxide_query::ast::{QueryClause, SelectClause, SqlQuery};
use oxide_query::schema::{DataType, Database, ForeignKey, Table};
use oxide_query::{Error, parse_sql};

/// `users` and `orders` share `id` and `name`, so bare references to either
/// are ambiguous once both are active.
pub fn db() -> Database {
    Database::builder()
        .table(
            Table::builder("users")
                .column("id", DataType::Integer)
                .column("name", DataType::Text)
                .nullable_column("address", DataType::Text)
                .nullable_column("email", DataType::Varchar(Some(255)))
                .primary_key("id"),
        )
        .table(
            Table::builder("orders")
                .column("id", DataType::Integer)
                .column("user_id", DataType::Integer)
                .column("name", DataType::Text)
                .column("total", DataType::Double)
                .column("created_at", DataType::Timestamp)
                .primary_key("id"),
        )
        .foreign_key(ForeignKey::new("orders", "user_id", "users", "id"))
        .build()
        .unwrap_or_else(|e| panic!("fixture schema is invalid: {e}"))
}

pub fn parse(db: &Database, sql: &str) -> SqlQuery {
    parse_sql(db, sql).unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e:?}"))
}

pub fn parse_err(db: &Database, sql: &str) -> Error {
    match parse_sql(db, sql) {
        Ok(query) => panic!("Expected error for: {sql}\nParsed: {query}"),
        Err(e) => e,
    }
}

pub fn parse_select(db: &Database, sql: &str) -> SelectClause {
    match parse(db, sql).query {
        QueryClause::Select(s) => s,
        other => panic!("Expected SELECT, got {other:?}"),
    }
}
