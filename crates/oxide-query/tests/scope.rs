//! Scope enforcement shared by the builder and the parser.

mod common;
use common::*;

use oxide_query::ast::{
    ColumnReference, ComparisonOp, Condition, JoinKind, SelectColumn, SelectColumns, SqlQuery,
    TableReference, Value,
};
use oxide_query::schema::Database;
use oxide_query::{BuilderError, ContextError, Error, query_builder};
use pretty_assertions::assert_eq;

fn unknown_column(column: &str) -> ContextError {
    ContextError::UnknownColumn {
        column: column.to_string(),
    }
}

#[test]
fn alias_is_tracked_apart_from_reference() {
    let db = db();
    let select = parse_select(&db, "SELECT id AS user_id FROM users AS u");
    assert_eq!(select.from, TableReference::new("users").alias("u"));
    assert_eq!(
        select.columns,
        SelectColumns::List(vec![SelectColumn::with_alias(
            ColumnReference::unbound("id"),
            "user_id"
        )])
    );
}

#[test]
fn unknown_column_in_text_and_builder() {
    let db = db();
    assert_eq!(
        parse_err(&db, "SELECT total FROM users"),
        Error::Context(unknown_column("total"))
    );
    assert_eq!(
        parse_err(&db, "SELECT id FROM users WHERE total > 1"),
        Error::Context(unknown_column("total"))
    );
    let err = query_builder(&db)
        .select()
        .from("users")
        .unwrap()
        .where_clause(|b| b.filter("total", ">", 1_i64))
        .unwrap_err();
    assert_eq!(err, BuilderError::Context(unknown_column("total")));
}

#[test]
fn alias_hides_table_name() {
    let db = db();
    assert_eq!(
        parse_err(&db, "SELECT users.id FROM users AS u"),
        Error::Context(unknown_column("users.id"))
    );
    let select = parse_select(&db, "SELECT users.id FROM users");
    assert_eq!(
        select.columns,
        SelectColumns::List(vec![SelectColumn::new(ColumnReference::qualified(
            "users", "id"
        ))])
    );
}

#[test]
fn unknown_table() {
    let db = db();
    assert_eq!(
        parse_err(&db, "SELECT id FROM products"),
        Error::Builder(BuilderError::UnknownTable {
            table: String::from("products"),
        })
    );
    assert_eq!(
        parse_err(&db, "DELETE FROM products"),
        Error::Builder(BuilderError::UnknownTable {
            table: String::from("products"),
        })
    );
}

#[test]
fn join_scope_growth() {
    let db = db();
    let select = query_builder(&db)
        .select()
        .from("users AS u")
        .unwrap()
        .join("INNER", "orders AS o", |b| b.filter("user_id", "=", "u.id"))
        .unwrap()
        .columns(&["u.name", "o.total", "created_at"])
        .unwrap()
        .where_clause(|b| b.filter("o.total", ">", ":min"))
        .unwrap()
        .ast();

    assert_eq!(select.joins.len(), 1);
    assert_eq!(select.joins[0].kind, JoinKind::Inner);
    assert_eq!(
        select.joins[0].on,
        Condition::compare(
            Value::Column(ColumnReference::unbound("user_id")),
            ComparisonOp::Eq,
            Value::Column(ColumnReference::qualified("u", "id")),
        )
    );
    assert_eq!(
        select.to_string(),
        "SELECT u.name, o.total, created_at FROM users AS u \
         INNER JOIN orders AS o ON user_id = u.id WHERE o.total > :min"
    );
}

#[test]
fn joined_columns_are_out_of_scope_before_the_join() {
    let db = db();
    let from = query_builder(&db).select().from("users AS u").unwrap();
    assert_eq!(
        from.clone()
            .where_clause(|b| b.filter("o.total", ">", 1_i64))
            .unwrap_err(),
        BuilderError::Context(unknown_column("o.total"))
    );
    assert_eq!(
        from.join("LEFT", "orders AS o", |b| b.filter("o.user_id", "=", "x.id"))
            .unwrap_err(),
        BuilderError::Context(unknown_column("x.id"))
    );
}

#[test]
fn bare_column_on_two_tables_is_ambiguous() {
    let db = db();
    let joined = query_builder(&db)
        .select()
        .from("users AS u")
        .unwrap()
        .join("left join", "orders AS o", |b| b.filter("o.user_id", "=", "u.id"))
        .unwrap();

    assert_eq!(
        joined.clone().columns(&["name"]).unwrap_err(),
        BuilderError::Context(ContextError::AmbiguousColumn {
            column: String::from("name"),
            tables: vec![String::from("u"), String::from("o")],
        })
    );
    let select = joined.columns(&["u.name", "o.name AS item"]).unwrap().ast();
    assert_eq!(
        select.columns,
        SelectColumns::List(vec![
            SelectColumn::new(ColumnReference::qualified("u", "name")),
            SelectColumn::with_alias(ColumnReference::qualified("o", "name"), "item"),
        ])
    );
}

#[test]
fn self_join_needs_distinct_aliases() {
    let db = db();
    let err = query_builder(&db)
        .select()
        .from("users")
        .unwrap()
        .join("INNER", "users", |b| b.filter("id", "=", "id"))
        .unwrap_err();
    assert_eq!(
        err,
        BuilderError::Context(ContextError::DuplicateAlias {
            alias: String::from("users"),
        })
    );

    assert!(query_builder(&db)
        .select()
        .from("users AS a")
        .unwrap()
        .join("INNER", "users AS b", |b| b.filter("a.id", "=", "b.id"))
        .is_ok());
}

#[test]
fn returning_is_limited_to_the_target_table() {
    let db = db();
    assert_eq!(
        parse_err(&db, "DELETE FROM users RETURNING total"),
        Error::Context(unknown_column("total"))
    );
    assert_eq!(
        parse_err(&db, "UPDATE users u SET name = 'x' RETURNING o.id"),
        Error::Context(unknown_column("o.id"))
    );
}

#[test]
fn returning_overwrites() {
    let db = db();
    let delete = query_builder(&db)
        .delete_from("users")
        .unwrap()
        .returning(&["id", "name"])
        .unwrap()
        .returning(&["email"])
        .unwrap()
        .ast();
    assert_eq!(
        delete.returning.unwrap().columns,
        SelectColumns::List(vec![SelectColumn::new(ColumnReference::unbound("email"))])
    );
}

#[test]
fn cte_columns_replace_source_columns() {
    let db = db();
    assert_eq!(
        parse_err(
            &db,
            "WITH t AS (SELECT id AS key FROM users) SELECT id FROM t"
        ),
        Error::Context(unknown_column("id"))
    );
    assert_eq!(
        parse_err(
            &db,
            "WITH t AS (SELECT id FROM users), t AS (SELECT id FROM users) SELECT id FROM t"
        ),
        Error::Context(ContextError::DuplicateAlias {
            alias: String::from("t"),
        })
    );
}

fn enclosing_tables(db: &Database, query: &SqlQuery) -> Vec<(String, String)> {
    let tree = query.tree();
    tree.column_references()
        .map(|(id, column)| {
            let table = tree
                .enclosing_table(id, db)
                .unwrap_or_else(|| panic!("{column:?} has no enclosing table"));
            (column.column().to_string(), table.table.clone())
        })
        .collect()
}

fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected
        .iter()
        .map(|(c, t)| ((*c).to_string(), (*t).to_string()))
        .collect()
}

#[test]
fn every_reference_resolves_in_the_tree() {
    let db = db();
    let query = query_builder(&db)
        .select()
        .from("users AS u")
        .unwrap()
        .join("INNER", "orders AS o", |b| b.filter("o.user_id", "=", "u.id"))
        .unwrap()
        .columns(&["u.name", "o.total"])
        .unwrap()
        .query();
    assert_eq!(
        enclosing_tables(&db, &query),
        pairs(&[
            ("name", "users"),
            ("total", "orders"),
            ("user_id", "orders"),
            ("id", "users"),
        ])
    );
}

#[test]
fn bare_joined_columns_belong_to_the_joined_table() {
    let db = db();
    let query = query_builder(&db)
        .select()
        .from("users AS u")
        .unwrap()
        .join("INNER", "orders AS o", |b| b.filter("user_id", "=", "u.id"))
        .unwrap()
        .columns(&["total", "address"])
        .unwrap()
        .where_clause(|b| b.filter("created_at", ">", ":t"))
        .unwrap()
        .query();
    assert_eq!(
        enclosing_tables(&db, &query),
        pairs(&[
            ("total", "orders"),
            ("address", "users"),
            ("user_id", "orders"),
            ("id", "users"),
            ("created_at", "orders"),
        ])
    );
}

#[test]
fn bare_columns_of_a_cte_belong_to_the_cte() {
    let db = db();
    let query = query_builder(&db)
        .with("big", |qb| {
            qb.select()
                .from("orders")?
                .columns(&["user_id", "total AS amount"])
        })
        .unwrap()
        .select()
        .from("big")
        .unwrap()
        .join("INNER", "users", |b| b.filter("user_id", "=", "users.id"))
        .unwrap()
        .columns(&["amount", "name"])
        .unwrap()
        .query();
    assert_eq!(
        enclosing_tables(&db, &query),
        pairs(&[
            ("user_id", "orders"),
            ("total", "orders"),
            ("amount", "big"),
            ("name", "users"),
            ("user_id", "big"),
            ("id", "users"),
        ])
    );
}
