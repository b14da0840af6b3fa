//! INSERT builder using the typestate pattern.

use std::marker::PhantomData;

use crate::ast::{
    ColumnAssignment, InsertClause, NamedQuery, ReturningClause, SqlQuery, TableReference, Value,
};
use crate::context::QueryContext;

use super::condition::IntoOperand;
use super::{BuilderError, assign, returning_clause, with_clause};

// Typestate markers

/// Marker: No values yet.
#[derive(Debug, Clone, Copy)]
pub struct NoValues;
/// Marker: At least one value.
#[derive(Debug, Clone, Copy)]
pub struct HasValues;

/// An INSERT statement under construction.
#[derive(Debug, Clone)]
pub struct InsertBuilder<'db, Values> {
    context: QueryContext<'db>,
    ctes: Vec<NamedQuery>,
    table: TableReference,
    values: Vec<ColumnAssignment>,
    returning: Option<ReturningClause>,
    _state: PhantomData<Values>,
}

impl<'db> InsertBuilder<'db, NoValues> {
    pub(crate) const fn new(
        context: QueryContext<'db>,
        ctes: Vec<NamedQuery>,
        table: TableReference,
    ) -> Self {
        Self {
            context,
            ctes,
            table,
            values: Vec::new(),
            returning: None,
            _state: PhantomData,
        }
    }
}

impl<'db, Values> InsertBuilder<'db, Values> {
    /// Inserts `value` into `column`.
    ///
    /// Values are parameters or literals; they cannot read columns.
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::DuplicateAssignment` if the column already has
    /// a value, or the error of the column or value.
    pub fn value(
        self,
        column: &str,
        value: impl IntoOperand,
    ) -> Result<InsertBuilder<'db, HasValues>, BuilderError> {
        let value = value.into_operand(&self.context.scope())?;
        self.push(column, value)
    }

    /// Inserts a list of `(column, value token)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::EmptyColumnList` for an empty list, or the
    /// first error of [`InsertBuilder::value`].
    pub fn values(
        self,
        pairs: &[(&str, &str)],
    ) -> Result<InsertBuilder<'db, HasValues>, BuilderError> {
        let Some(((column, value), rest)) = pairs.split_first() else {
            return Err(BuilderError::EmptyColumnList);
        };
        let mut builder = self.value(column, *value)?;
        for (column, value) in rest {
            builder = builder.value(column, *value)?;
        }
        Ok(builder)
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

    fn push(
        self,
        column: &str,
        value: Value,
    ) -> Result<InsertBuilder<'db, HasValues>, BuilderError> {
        let mut values = self.values;
        assign(&mut values, &self.context, column, value)?;
        Ok(InsertBuilder {
            context: self.context,
            ctes: self.ctes,
            table: self.table,
            values,
            returning: self.returning,
            _state: PhantomData,
        })
    }
}

impl InsertBuilder<'_, HasValues> {
    /// Returns the INSERT clause built so far.
    #[must_use]
    pub fn ast(&self) -> InsertClause {
        InsertClause {
            table: self.table.clone(),
            columns: self.values.clone(),
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
    use super::*;
    use crate::builder::query_builder;
    use crate::context::ContextError;
    use crate::schema::{DataType, Database, Table};

    fn db() -> Database {
        Database::builder()
            .table(
                Table::builder("users")
                    .column("id", DataType::Integer)
                    .nullable_column("name", DataType::Text)
                    .primary_key("id"),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_insert() {
        let db = db();
        let insert = query_builder(&db)
            .insert_into("users")
            .unwrap()
            .values(&[("id", ":id"), ("name", "NULL")])
            .unwrap()
            .returning(&["id"])
            .unwrap();
        assert_eq!(
            insert.query().to_string(),
            "INSERT INTO users (id, name) VALUES (:id, NULL) RETURNING id"
        );
    }

    #[test]
    fn test_typed_values() {
        let db = db();
        let insert = query_builder(&db)
            .insert_into("users")
            .unwrap()
            .value("id", 7_i64)
            .unwrap()
            .value("name", Value::string("Ada"))
            .unwrap()
            .ast();
        assert_eq!(insert.columns[0].value, Value::Integer(7));
        assert_eq!(insert.columns[1].value, Value::string("Ada"));
    }

    #[test]
    fn test_values_cannot_read_columns() {
        let db = db();
        let insert = query_builder(&db).insert_into("users").unwrap();
        assert_eq!(
            insert.clone().value("name", "id").unwrap_err(),
            BuilderError::Context(ContextError::UnknownColumn {
                column: String::from("id"),
            })
        );
        assert_eq!(
            insert.values(&[]).unwrap_err(),
            BuilderError::EmptyColumnList
        );
    }
}
