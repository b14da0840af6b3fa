//! UPDATE builder using the typestate pattern.

use std::marker::PhantomData;

use crate::ast::{
    ColumnAssignment, Condition, NamedQuery, ReturningClause, SqlQuery, TableReference,
    UpdateClause, WhereClause,
};
use crate::context::QueryContext;

use super::condition::{ConditionBuilder, IntoOperand};
use super::{BuilderError, assign, returning_clause, with_clause};

// Typestate markers

/// Marker: No SET assignment yet.
#[derive(Debug, Clone, Copy)]
pub struct NoSet;
/// Marker: At least one SET assignment.
#[derive(Debug, Clone, Copy)]
pub struct HasSet;

/// An UPDATE statement under construction.
#[derive(Debug, Clone)]
pub struct UpdateBuilder<'db, Set> {
    context: QueryContext<'db>,
    ctes: Vec<NamedQuery>,
    table: TableReference,
    assignments: Vec<ColumnAssignment>,
    where_clause: Option<WhereClause>,
    returning: Option<ReturningClause>,
    _state: PhantomData<Set>,
}

impl<'db> UpdateBuilder<'db, NoSet> {
    pub(crate) const fn new(
        context: QueryContext<'db>,
        ctes: Vec<NamedQuery>,
        table: TableReference,
    ) -> Self {
        Self {
            context,
            ctes,
            table,
            assignments: Vec::new(),
            where_clause: None,
            returning: None,
            _state: PhantomData,
        }
    }
}

impl<'db, Set> UpdateBuilder<'db, Set> {
    /// Adds `column = value` to the SET list.
    ///
    /// The value may read columns of the target table.
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::DuplicateAssignment` if the column is already
    /// set, or the error of the column or value.
    pub fn set(
        self,
        column: &str,
        value: impl IntoOperand,
    ) -> Result<UpdateBuilder<'db, HasSet>, BuilderError> {
        let value = value.into_operand(&self.context)?;
        let mut assignments = self.assignments;
        assign(&mut assignments, &self.context, column, value)?;
        Ok(UpdateBuilder {
            context: self.context,
            ctes: self.ctes,
            table: self.table,
            assignments,
            where_clause: self.where_clause,
            returning: self.returning,
            _state: PhantomData,
        })
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
}

impl UpdateBuilder<'_, HasSet> {
    /// Returns the UPDATE clause built so far.
    #[must_use]
    pub fn ast(&self) -> UpdateClause {
        UpdateClause {
            columns: self.assignments.clone(),
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
