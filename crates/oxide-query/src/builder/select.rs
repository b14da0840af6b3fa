//! SELECT builder using the typestate pattern.
//!
//! `ast()` and `query()` only exist once the column list is known, so a
//! SELECT without columns does not compile.

use std::marker::PhantomData;

use crate::ast::{
    Condition, JoinClause, JoinKind, NamedQuery, SelectClause, SelectColumn, SelectColumns,
    SqlQuery, TableReference, WhereClause,
};
use crate::context::QueryContext;
use crate::schema::TableColumns;

use super::condition::{ConditionBuilder, parse_select_column};
use super::{BuilderError, with_clause};

// Typestate markers (zero-sized types)

/// Marker: No columns specified yet.
#[derive(Debug, Clone, Copy)]
pub struct NoColumns;
/// Marker: Columns have been specified.
#[derive(Debug, Clone, Copy)]
pub struct HasColumns;

/// A join kind given either as a [`JoinKind`] or by name (`"INNER"`,
/// `"left"`, ...).
pub trait IntoJoinKind {
    /// Converts into a [`JoinKind`].
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::UnknownJoinKind` for an unknown name.
    fn into_join_kind(self) -> Result<JoinKind, BuilderError>;
}

impl IntoJoinKind for JoinKind {
    fn into_join_kind(self) -> Result<JoinKind, BuilderError> {
        Ok(self)
    }
}

impl IntoJoinKind for &str {
    fn into_join_kind(self) -> Result<JoinKind, BuilderError> {
        // "left", "LEFT JOIN" and "left outer join" all name the same kind
        let upper = self.trim().to_ascii_uppercase();
        let name = upper.strip_suffix("JOIN").unwrap_or(&upper).trim_end();
        let name = name.strip_suffix("OUTER").unwrap_or(name).trim_end();
        JoinKind::from_name(name).ok_or_else(|| BuilderError::UnknownJoinKind {
            kind: self.trim().to_string(),
        })
    }
}

/// Starts a SELECT: the only step available is FROM.
#[derive(Debug, Clone)]
pub struct FromBuilder<'db> {
    context: QueryContext<'db>,
    ctes: Vec<NamedQuery>,
}

impl<'db> FromBuilder<'db> {
    pub(crate) const fn new(context: QueryContext<'db>, ctes: Vec<NamedQuery>) -> Self {
        Self { context, ctes }
    }

    /// Sets the FROM table: `"name"` or `"name AS alias"`. The name may be a
    /// schema table or a CTE declared earlier with `with`.
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::UnknownTable` if the table does not exist, or
    /// `BuilderError::InvalidTableReference` for malformed text.
    pub fn from(self, table: &str) -> Result<SelectBuilder<'db, NoColumns>, BuilderError> {
        let (from, context) = super::activate(&self.context, table)?;
        Ok(SelectBuilder {
            context,
            ctes: self.ctes,
            from,
            joins: Vec::new(),
            columns: SelectColumns::List(Vec::new()),
            where_clause: None,
            _state: PhantomData,
        })
    }
}

/// A SELECT statement under construction.
///
/// Every method returns a new builder; the receiver is consumed, so clone a
/// builder to reuse it as a template.
#[derive(Debug, Clone)]
pub struct SelectBuilder<'db, Cols> {
    context: QueryContext<'db>,
    ctes: Vec<NamedQuery>,
    from: TableReference,
    joins: Vec<JoinClause>,
    columns: SelectColumns,
    where_clause: Option<WhereClause>,
    _state: PhantomData<Cols>,
}

/// A SELECT right after FROM, before its columns are chosen.
pub type ColumnsBuilder<'db> = SelectBuilder<'db, NoColumns>;

impl<'db, Cols> SelectBuilder<'db, Cols> {
    /// The tables in scope so far.
    #[must_use]
    pub const fn context(&self) -> &QueryContext<'db> {
        &self.context
    }

    /// Adds a JOIN.
    ///
    /// The joined table is active before `on` runs, so the condition may use
    /// columns of either side; it stays active for later calls.
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::UnknownTable`, `BuilderError::UnknownJoinKind`,
    /// a duplicate alias, or any error of the condition.
    pub fn join<K, F>(self, kind: K, table: &str, on: F) -> Result<Self, BuilderError>
    where
        K: IntoJoinKind,
        F: FnOnce(&ConditionBuilder<'_, 'db>) -> Result<Condition, BuilderError>,
    {
        let kind = kind.into_join_kind()?;
        let (table, context) = super::activate(&self.context, table)?;
        let on = on(&ConditionBuilder::new(&context))?;
        let mut joins = self.joins;
        joins.push(JoinClause { kind, table, on });
        Ok(Self {
            context,
            joins,
            ..self
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
}

// Transition: NoColumns -> HasColumns
impl<'db> SelectBuilder<'db, NoColumns> {
    /// Sets the column list: `"column"`, `"table.column"` or
    /// `"column AS alias"` tokens, or `"*"` alone for every active column.
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::EmptyColumnList`, `BuilderError::MixedWildcard`,
    /// `BuilderError::InvalidColumnToken`, or the context error of a column
    /// that is not in scope.
    pub fn columns(self, columns: &[&str]) -> Result<SelectBuilder<'db, HasColumns>, BuilderError> {
        let columns = select_columns(columns, |token| {
            parse_select_column(token, |column| Ok(self.context.resolve(column)?))
        })?;
        Ok(SelectBuilder {
            context: self.context,
            ctes: self.ctes,
            from: self.from,
            joins: self.joins,
            columns,
            where_clause: self.where_clause,
            _state: PhantomData,
        })
    }
}

impl SelectBuilder<'_, HasColumns> {
    /// Returns the SELECT clause built so far.
    #[must_use]
    pub fn ast(&self) -> SelectClause {
        SelectClause {
            columns: self.columns.clone(),
            from: self.from.clone(),
            joins: self.joins.clone(),
            where_clause: self.where_clause.clone(),
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

    /// The columns this SELECT produces, named by alias where one is given.
    /// When two outputs share a name the first one wins.
    pub(crate) fn output_columns(&self) -> TableColumns {
        let mut output = TableColumns::new();
        match &self.columns {
            SelectColumns::All => {
                for column in self.context.active().iter().flat_map(|t| t.columns().iter()) {
                    output.insert(column.name.clone(), column.def.clone());
                }
            }
            SelectColumns::List(columns) => {
                for column in columns {
                    if let Some(source) = self.context.column(&column.column) {
                        output.insert(column.output_name(), source.def.clone());
                    }
                }
            }
        }
        output
    }
}

/// Resolves a SELECT or RETURNING list. `"*"` must stand alone.
pub(crate) fn select_columns<F>(
    tokens: &[&str],
    mut resolve: F,
) -> Result<SelectColumns, BuilderError>
where
    F: FnMut(&str) -> Result<SelectColumn, BuilderError>,
{
    if tokens.is_empty() {
        return Err(BuilderError::EmptyColumnList);
    }
    if tokens.iter().any(|t| t.trim() == "*") {
        return if tokens.len() == 1 {
            Ok(SelectColumns::All)
        } else {
            Err(BuilderError::MixedWildcard)
        };
    }
    tokens
        .iter()
        .map(|token| resolve(*token))
        .collect::<Result<Vec<_>, _>>()
        .map(SelectColumns::List)
}
