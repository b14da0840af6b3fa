//! DELETE builder.

use crate::ast::{
    Condition, DeleteClause, NamedQuery, ReturningClause, SqlQuery, TableReference, WhereClause,
};
use crate::context::QueryContext;

use super::condition::ConditionBuilder;
use super::{BuilderError, returning_clause, with_clause};

/// A DELETE statement under construction.
///
/// A DELETE without WHERE is valid and removes every row, so there is no
/// typestate here.
#[derive(Debug, Clone)]
pub struct DeleteBuilder<'db> {
    context: QueryContext<'db>,
    ctes: Vec<NamedQuery>,
    table: TableReference,
    where_clause: Option<WhereClause>,
    returning: Option<ReturningClause>,
}

impl<'db> DeleteBuilder<'db> {
    pub(crate) const fn new(
        context: QueryContext<'db>,
        ctes: Vec<NamedQuery>,
        table: TableReference,
    ) -> Self {
        Self {
            context,
            ctes,
            table,
            where_clause: None,
            returning: None,
        }
    }

    /// Sets the WHERE condition, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns the first error of the condition callback.
    pub fn where_clause<F>(self, condition: F) -> Result<Self, BuilderError>
    where
        F: FnOnce(&ConditionBuilder<'_, 'db>) -> Result<Condition, BuilderError>,
    {
        let condition = condition(&ConditionBuilder::new(&self.context))?;
        Ok(Self {
            where_clause: Some(WhereClause { condition }),
            ..self
        })
    }

    /// Sets the RETURNING list, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns the error of a column that is not on the target table.
    pub fn returning(self, columns: &[&str]) -> Result<Self, BuilderError> {
        let returning = returning_clause(&self.context, columns)?;
        Ok(Self {
            returning: Some(returning),
            ..self
        })
    }

    /// Returns the DELETE clause built so far.
    #[must_use]
    pub fn ast(&self) -> DeleteClause {
        DeleteClause {
            table: self.table.clone(),
            where_clause: self.where_clause.clone(),
            returning: self.returning.clone(),
        }
    }

    /// Returns the full query, including CTEs declared with `with`.
    #[must_use]
    pub fn query(&self) -> SqlQuery {
        SqlQuery {
            query: self.ast().into(),
            with: with_clause(&self.ctes),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{ReturningClause, SelectColumns, TableReference};
    use crate::builder::query_builder;
    use crate::schema::{DataType, Database, Table};

    #[test]
    fn test_delete_with_alias() {
        let db = Database::builder()
            .table(
                Table::builder("sessions")
                    .column("id", DataType::Uuid)
                    .column("expires_at", DataType::Timestamp)
                    .primary_key("id"),
            )
            .build()
            .unwrap();
        let delete = query_builder(&db)
            .delete_from("Sessions AS s")
            .unwrap()
            .where_clause(|b| b.filter("s.expires_at", "<", ":now"))
            .unwrap()
            .returning(&["*"])
            .unwrap()
            .ast();
        assert_eq!(delete.table, TableReference::new("sessions").alias("s"));
        assert_eq!(
            delete.returning,
            Some(ReturningClause {
                columns: SelectColumns::All,
            })
        );
        assert_eq!(
            delete.to_string(),
            "DELETE FROM sessions AS s WHERE s.expires_at < :now RETURNING *"
        );
    }
}
