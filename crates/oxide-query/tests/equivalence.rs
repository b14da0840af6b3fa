//! Text queries and the equivalent builder chains produce equal ASTs.

mod common;
use common::*;

use oxide_query::ast::Value;
use oxide_query::query_builder;
use pretty_assertions::assert_eq;

#[test]
fn select_with_alias_and_parameter() {
    let db = db();
    let parsed = parse(&db, "SELECT address, id AS user_id FROM users WHERE id > :id");
    let built = query_builder(&db)
        .select()
        .from("users")
        .unwrap()
        .columns(&["address", "id AS user_id"])
        .unwrap()
        .where_clause(|b| b.filter("id", ">", ":id"))
        .unwrap()
        .query();
    assert_eq!(parsed, built);
}

#[test]
fn select_star() {
    let db = db();
    let built = query_builder(&db)
        .select()
        .from("orders")
        .unwrap()
        .columns(&["*"])
        .unwrap()
        .query();
    assert_eq!(parse(&db, "SELECT * FROM orders"), built);
}

#[test]
fn keywords_and_names_ignore_case() {
    let db = db();
    let built = query_builder(&db)
        .select()
        .from("users AS u")
        .unwrap()
        .columns(&["u.name"])
        .unwrap()
        .query();
    assert_eq!(parse(&db, "select U.NAME from Users as u"), built);
    assert_eq!(parse(&db, "SeLeCt u.Name FrOm USERS u;"), built);
}

#[test]
fn compound_where() {
    let db = db();
    let parsed = parse(
        &db,
        "SELECT id FROM orders WHERE total >= 10.5 AND (name LIKE 'a%' OR user_id = :user)",
    );
    let built = query_builder(&db)
        .select()
        .from("orders")
        .unwrap()
        .columns(&["id"])
        .unwrap()
        .where_clause(|b| {
            Ok(b.filter("total", ">=", 10.5)?.and(
                b.filter("name", "LIKE", Value::string("a%"))?
                    .or(b.filter("user_id", "=", ":user")?),
            ))
        })
        .unwrap()
        .query();
    assert_eq!(parsed, built);
}

#[test]
fn literal_operands() {
    let db = db();
    let parsed = parse(
        &db,
        "SELECT id FROM users WHERE email = NULL OR name <> 'O''Brien' OR id = -3",
    );
    let built = query_builder(&db)
        .select()
        .from("users")
        .unwrap()
        .columns(&["id"])
        .unwrap()
        .where_clause(|b| {
            Ok(b.filter("email", "=", Value::Null)?
                .or(b.filter("name", "!=", "'O''Brien'")?)
                .or(b.filter("id", "=", -3_i64)?))
        })
        .unwrap()
        .query();
    assert_eq!(parsed, built);
}

#[test]
fn update_with_returning() {
    let db = db();
    let parsed = parse(
        &db,
        "UPDATE users SET name = :name, address = NULL WHERE id = :id \
         RETURNING id, name AS new_name",
    );
    let built = query_builder(&db)
        .update("users")
        .unwrap()
        .set("name", ":name")
        .unwrap()
        .set("address", Value::Null)
        .unwrap()
        .where_clause(|b| b.filter("id", "=", ":id"))
        .unwrap()
        .returning(&["id", "name AS new_name"])
        .unwrap()
        .query();
    assert_eq!(parsed, built);
}

#[test]
fn delete_with_returning() {
    let db = db();
    let parsed = parse(&db, "DELETE FROM orders o WHERE o.total < 0 RETURNING *");
    let built = query_builder(&db)
        .delete_from("orders AS o")
        .unwrap()
        .where_clause(|b| b.filter("o.total", "<", 0_i64))
        .unwrap()
        .returning(&["*"])
        .unwrap()
        .query();
    assert_eq!(parsed, built);
}

#[test]
fn insert_with_returning() {
    let db = db();
    let parsed = parse(
        &db,
        "INSERT INTO users (id, name, email) VALUES (:id, 'Ada', NULL) RETURNING id",
    );
    let built = query_builder(&db)
        .insert_into("users")
        .unwrap()
        .value("id", ":id")
        .unwrap()
        .value("name", "'Ada'")
        .unwrap()
        .value("email", Value::Null)
        .unwrap()
        .returning(&["id"])
        .unwrap()
        .query();
    assert_eq!(parsed, built);
}

#[test]
fn with_clause() {
    let db = db();
    let parsed = parse(
        &db,
        "WITH big AS (SELECT user_id, total AS amount FROM orders WHERE total > 100) \
         SELECT user_id, amount FROM big WHERE amount < :cap",
    );
    let built = query_builder(&db)
        .with("big", |qb| {
            qb.select()
                .from("orders")?
                .columns(&["user_id", "total AS amount"])?
                .where_clause(|b| b.filter("total", ">", 100_i64))
        })
        .unwrap()
        .select()
        .from("big")
        .unwrap()
        .columns(&["user_id", "amount"])
        .unwrap()
        .where_clause(|b| b.filter("amount", "<", ":cap"))
        .unwrap()
        .query();
    assert_eq!(parsed, built);
}

#[test]
fn with_clause_before_update() {
    let db = db();
    let parsed = parse(
        &db,
        "WITH vip AS (SELECT id FROM users WHERE name = 'x') UPDATE users SET email = :email",
    );
    let built = query_builder(&db)
        .with("vip", |qb| {
            qb.select()
                .from("users")?
                .columns(&["id"])?
                .where_clause(|b| b.filter("name", "=", "'x'"))
        })
        .unwrap()
        .update("users")
        .unwrap()
        .set("email", ":email")
        .unwrap()
        .query();
    assert_eq!(parsed, built);
}

#[test]
fn rendered_sql_parses_back_to_the_same_ast() {
    let db = db();
    for sql in [
        "SELECT address, id AS user_id FROM users WHERE id > :id",
        "SELECT * FROM orders AS o WHERE (o.total > 1 OR o.total < -1) AND o.name = 'it''s'",
        "SELECT id FROM users WHERE id = 1 AND (name = 'a' AND email = 'b')",
        "UPDATE orders SET total = 2.5, name = :n WHERE id = :id RETURNING total",
        "DELETE FROM users WHERE email LIKE '%@example.com' RETURNING id, email AS gone",
        "INSERT INTO orders (id, user_id, total) VALUES (1, :user, 9.75)",
        "WITH a AS (SELECT id, name FROM users), b AS (SELECT name FROM a) SELECT name FROM b",
    ] {
        let query = parse(&db, sql);
        let rendered = query.to_string();
        assert_eq!(parse(&db, &rendered), query, "{rendered}");
    }
}
