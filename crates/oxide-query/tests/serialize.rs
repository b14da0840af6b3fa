//! JSON shape of serialized ASTs, as printed by the CLI.

mod common;
use common::*;

use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn select_serializes_with_tagged_nodes() {
    let db = db();
    let query = parse(&db, "SELECT id AS user_id FROM users AS u WHERE u.id = :id");
    let value = serde_json::to_value(&query).unwrap();

    assert_eq!(value["with"], json!(null));
    assert_eq!(value["query"]["type"], "Select");
    assert_eq!(
        value["query"]["from"],
        json!({"table": "users", "alias": "u"})
    );
    assert_eq!(
        value["query"]["columns"],
        json!({"List": [{
            "column": {"type": "Unbound", "column": "id"},
            "alias": "user_id"
        }]})
    );
    assert_eq!(
        value["query"]["where_clause"]["condition"],
        json!({
            "type": "Compare",
            "left": {"type": "Column", "value": {"type": "Table", "table": "u", "column": "id"}},
            "op": "Eq",
            "right": {"type": "Parameter", "value": "id"}
        })
    );
}

#[test]
fn mutation_serializes_assignments_and_returning() {
    let db = db();
    let query = parse(&db, "UPDATE users SET name = 'x', email = NULL RETURNING *");
    let value = serde_json::to_value(&query).unwrap();

    assert_eq!(value["query"]["type"], "Update");
    assert_eq!(
        value["query"]["columns"][0],
        json!({
            "column": {"type": "Unbound", "column": "name"},
            "value": {"type": "String", "value": "x"}
        })
    );
    assert_eq!(value["query"]["columns"][1]["value"], json!({"type": "Null"}));
    assert_eq!(value["query"]["returning"], json!({"columns": "All"}));
}
