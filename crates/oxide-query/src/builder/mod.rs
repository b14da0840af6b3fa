//! Schema-validated query builder.
//!
//! Every call resolves its table and column tokens against a
//! [`QueryContext`] and fails on the spot when one is out of scope, so a
//! finished builder always yields a valid AST.
//!
//! # Example
//!
//! ```rust
//! use oxide_query::builder::query_builder;
//! use oxide_query::schema::{DataType, Database, Table};
//!
//! let db = Database::builder()
//!     .table(
//!         Table::builder("users")
//!             .column("id", DataType::Integer)
//!             .nullable_column("address", DataType::Text)
//!             .primary_key("id"),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let query = query_builder(&db)
//!     .select()
//!     .from("users")?
//!     .columns(&["address", "id AS user_id"])?
//!     .where_clause(|b| b.filter("id", ">", ":id"))?
//!     .query();
//!
//! assert_eq!(
//!     query.to_string(),
//!     "SELECT address, id AS user_id FROM users WHERE id > :id"
//! );
//! # Ok::<(), oxide_query::builder::BuilderError>(())
//! ```

mod condition;
mod delete;
mod error;
mod insert;
mod select;
mod update;

use std::sync::Arc;

use tracing::debug;

pub use condition::{ConditionBuilder, IntoOperand};
pub use delete::DeleteBuilder;
pub use error::BuilderError;
pub use insert::{HasValues, InsertBuilder, NoValues};
pub use select::{ColumnsBuilder, FromBuilder, HasColumns, IntoJoinKind, NoColumns, SelectBuilder};
pub use update::{HasSet, NoSet, UpdateBuilder};

use crate::ast::{ColumnAssignment, NamedQuery, ReturningClause, TableReference, Value, WithClause};
use crate::context::QueryContext;
use crate::schema::{Database, TableColumns};

use condition::{is_identifier, parse_select_column, parse_table_reference};
use select::select_columns;

/// Creates a query builder over a schema.
#[must_use]
pub const fn query_builder(database: &Database) -> QueryBuilder<'_> {
    QueryBuilder::new(database)
}

/// Entry point of the builder: declares CTEs and starts a statement.
#[derive(Debug, Clone)]
pub struct QueryBuilder<'db> {
    /// Holds the CTEs as derived tables; never has active tables.
    context: QueryContext<'db>,
    ctes: Vec<NamedQuery>,
}

impl<'db> QueryBuilder<'db> {
    /// Creates a query builder over a schema.
    #[must_use]
    pub const fn new(database: &'db Database) -> Self {
        Self {
            context: QueryContext::new(database),
            ctes: Vec::new(),
        }
    }

    /// The CTEs declared so far, in order.
    #[must_use]
    pub fn ctes(&self) -> &[NamedQuery] {
        &self.ctes
    }

    /// Declares a CTE: `alias AS (body)`.
    ///
    /// `body` receives this builder, so it may read CTEs declared before it.
    /// The columns the body selects (by alias, else by name) become a table
    /// called `alias` for every later CTE and for the main statement.
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidTableReference` for a malformed alias,
    /// `ContextError::DuplicateAlias` when the name is taken, or any error
    /// of the body.
    pub fn with<F>(&self, alias: &str, body: F) -> Result<Self, BuilderError>
    where
        F: FnOnce(&Self) -> Result<SelectBuilder<'db, HasColumns>, BuilderError>,
    {
        let alias = alias.trim();
        if !is_identifier(alias) {
            return Err(BuilderError::InvalidTableReference {
                text: alias.to_string(),
            });
        }
        let body = body(self)?;
        let context = self
            .context
            .derive(alias, Arc::new(body.output_columns()))?;
        let mut ctes = self.ctes.clone();
        ctes.push(NamedQuery {
            alias: alias.to_string(),
            query: body.ast(),
        });
        debug!(cte = alias, count = ctes.len(), "CTE registered");
        Ok(Self { context, ctes })
    }

    /// Starts a SELECT.
    #[must_use]
    pub fn select(&self) -> FromBuilder<'db> {
        FromBuilder::new(self.context.clone(), self.ctes.clone())
    }

    /// Starts an UPDATE of a schema table.
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::UnknownTable` if the schema has no such table.
    pub fn update(&self, table: &str) -> Result<UpdateBuilder<'db, NoSet>, BuilderError> {
        let (table, context) = activate_target(&self.context, table)?;
        Ok(UpdateBuilder::new(context, self.ctes.clone(), table))
    }

    /// Starts a DELETE from a schema table.
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::UnknownTable` if the schema has no such table.
    pub fn delete_from(&self, table: &str) -> Result<DeleteBuilder<'db>, BuilderError> {
        let (table, context) = activate_target(&self.context, table)?;
        Ok(DeleteBuilder::new(context, self.ctes.clone(), table))
    }

    /// Starts an INSERT into a schema table.
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::UnknownTable` if the schema has no such table.
    pub fn insert_into(&self, table: &str) -> Result<InsertBuilder<'db, NoValues>, BuilderError> {
        let (table, context) = activate_target(&self.context, table)?;
        Ok(InsertBuilder::new(context, self.ctes.clone(), table))
    }
}

/// Resolves a FROM or JOIN table (schema table or CTE) and makes it active.
fn activate<'db>(
    context: &QueryContext<'db>,
    text: &str,
) -> Result<(TableReference, QueryContext<'db>), BuilderError> {
    let written = parse_table_reference(text)?;
    let (table, columns) = context
        .lookup_table(&written.table)
        .map_err(BuilderError::from_lookup)?;
    let reference = TableReference {
        table,
        alias: written.alias,
    };
    let context = context.add(reference.scope_name(), columns)?;
    Ok((reference, context))
}

/// Resolves the target of INSERT, UPDATE or DELETE. Only schema tables can be
/// written to; their columns also become the RETURNING set.
fn activate_target<'db>(
    context: &QueryContext<'db>,
    text: &str,
) -> Result<(TableReference, QueryContext<'db>), BuilderError> {
    let written = parse_table_reference(text)?;
    let table = context
        .database()
        .table(&written.table)
        .ok_or_else(|| BuilderError::UnknownTable {
            table: written.table.clone(),
        })?;
    let columns: Arc<TableColumns> = Arc::clone(table.columns());
    let reference = TableReference {
        table: table.name().to_string(),
        alias: written.alias,
    };
    let context = context
        .scope()
        .add(reference.scope_name(), Arc::clone(&columns))?
        .returning(columns);
    Ok((reference, context))
}

/// Resolves a RETURNING list against the context's RETURNING set.
fn returning_clause(
    context: &QueryContext<'_>,
    tokens: &[&str],
) -> Result<ReturningClause, BuilderError> {
    let columns = select_columns(tokens, |token| {
        parse_select_column(token, |column| Ok(context.resolve_returning(column)?))
    })?;
    Ok(ReturningClause { columns })
}

/// Appends `column = value`, rejecting a second assignment to one column.
fn assign(
    assignments: &mut Vec<ColumnAssignment>,
    context: &QueryContext<'_>,
    column: &str,
    value: Value,
) -> Result<(), BuilderError> {
    let column = context.resolve(column)?;
    if assignments
        .iter()
        .any(|a| a.column.column() == column.column())
    {
        return Err(BuilderError::DuplicateAssignment {
            column: column.column().to_string(),
        });
    }
    assignments.push(ColumnAssignment { column, value });
    Ok(())
}

fn with_clause(ctes: &[NamedQuery]) -> Option<WithClause> {
    (!ctes.is_empty()).then(|| WithClause {
        ctes: ctes.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ColumnReference, SelectColumns};
    use crate::context::ContextError;
    use crate::schema::{DataType, Table};

    fn db() -> Database {
        Database::builder()
            .table(
                Table::builder("users")
                    .column("id", DataType::Integer)
                    .column("name", DataType::Text)
                    .primary_key("id"),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_cte_becomes_table() {
        let db = db();
        let query = query_builder(&db)
            .with("named", |qb| {
                qb.select()
                    .from("users")?
                    .columns(&["id AS user_id", "name"])
            })
            .unwrap()
            .select()
            .from("named")
            .unwrap()
            .columns(&["user_id"])
            .unwrap()
            .query();

        let with = query.with.unwrap();
        assert_eq!(with.ctes.len(), 1);
        assert_eq!(with.ctes[0].alias, "named");
        assert_eq!(with.ctes[0].query.from, TableReference::new("users"));
    }

    #[test]
    fn test_cte_hides_source_columns() {
        let db = db();
        let err = query_builder(&db)
            .with("named", |qb| qb.select().from("users")?.columns(&["id AS user_id"]))
            .unwrap()
            .select()
            .from("named")
            .unwrap()
            .columns(&["id"])
            .unwrap_err();
        assert_eq!(
            err,
            BuilderError::Context(ContextError::UnknownColumn {
                column: String::from("id"),
            })
        );
    }

    #[test]
    fn test_later_cte_reads_earlier_one() {
        let db = db();
        let qb = query_builder(&db)
            .with("a", |qb| qb.select().from("users")?.columns(&["*"]))
            .unwrap()
            .with("b", |qb| qb.select().from("a")?.columns(&["name"]))
            .unwrap();
        assert_eq!(qb.ctes().len(), 2);
        assert!(qb.with("a", |qb| qb.select().from("b")?.columns(&["*"])).is_err());
    }

    #[test]
    fn test_cannot_write_to_cte() {
        let db = db();
        let qb = query_builder(&db)
            .with("a", |qb| qb.select().from("users")?.columns(&["id"]))
            .unwrap();
        assert_eq!(
            qb.delete_from("a").unwrap_err(),
            BuilderError::UnknownTable {
                table: String::from("a"),
            }
        );
    }

    #[test]
    fn test_select_without_with_has_no_with_clause() {
        let db = db();
        let query = query_builder(&db)
            .select()
            .from("users")
            .unwrap()
            .columns(&["*"])
            .unwrap()
            .query();
        assert!(query.with.is_none());
        assert!(matches!(
            query.query,
            crate::ast::QueryClause::Select(ref s) if s.columns == SelectColumns::All
        ));
    }

    #[test]
    fn test_assign_rejects_duplicates() {
        let db = db();
        let (_, ctx) = activate_target(&QueryContext::new(&db), "users").unwrap();
        let mut assignments = Vec::new();
        assign(&mut assignments, &ctx, "name", Value::string("a")).unwrap();
        assert_eq!(assignments[0].column, ColumnReference::unbound("name"));
        assert_eq!(
            assign(&mut assignments, &ctx, "NAME", Value::Null).unwrap_err(),
            BuilderError::DuplicateAssignment {
                column: String::from("name"),
            }
        );
    }
}
