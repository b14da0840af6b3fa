//! Scope tracking during query construction.
//!
//! A [`QueryContext`] records which tables are addressable at a given point of
//! building a query: the FROM table and every JOIN so far, keyed by alias, plus
//! the column set a trailing RETURNING clause may use. Column tokens are only
//! ever turned into [`ColumnReference`]s through [`QueryContext::resolve`].
//!
//! Contexts are values. `add`, `copy`, `derive` and `returning` leave `self`
//! untouched and return a new context; column sets are shared through `Arc`,
//! so a copy costs one `Vec` of handles.

use std::sync::Arc;

use tracing::debug;

use crate::ast::{ColumnReference, TableReference};
use crate::schema::{Column, Database, TableColumns};

/// Errors raised while resolving references against a query context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// The column is not on any active table (or the qualifier is unknown).
    #[error("unknown column '{column}'")]
    UnknownColumn {
        /// The token as written.
        column: String,
    },

    /// A bare column name exists on more than one active table.
    #[error("column '{column}' is ambiguous between {}", tables.join(", "))]
    AmbiguousColumn {
        /// The token as written.
        column: String,
        /// Aliases of every active table declaring the column.
        tables: Vec<String>,
    },

    /// The alias is already active in this query.
    #[error("alias '{alias}' is already in use")]
    DuplicateAlias {
        /// The repeated alias.
        alias: String,
    },

    /// The table is neither declared in the schema nor a CTE of this query.
    #[error("unknown table '{table}'")]
    UnknownTable {
        /// The table name as written.
        table: String,
    },
}

/// A table addressable in the current scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTable {
    alias: String,
    columns: Arc<TableColumns>,
}

impl ActiveTable {
    /// The name the table's columns are qualified with.
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// The table's columns.
    #[must_use]
    pub const fn columns(&self) -> &Arc<TableColumns> {
        &self.columns
    }
}

/// The set of tables and columns a query may reference at one point of its
/// construction.
#[derive(Debug, Clone)]
pub struct QueryContext<'db> {
    database: &'db Database,
    /// CTEs declared by the enclosing WITH clause, by name.
    derived: Vec<(String, Arc<TableColumns>)>,
    /// Tables introduced by FROM and JOIN, in order.
    active: Vec<ActiveTable>,
    /// Columns available to RETURNING after INSERT, UPDATE or DELETE.
    returning: Option<Arc<TableColumns>>,
}

impl<'db> QueryContext<'db> {
    /// Creates an empty context over a schema.
    #[must_use]
    pub const fn new(database: &'db Database) -> Self {
        Self {
            database,
            derived: Vec::new(),
            active: Vec::new(),
            returning: None,
        }
    }

    /// The schema this context validates against.
    #[must_use]
    pub const fn database(&self) -> &'db Database {
        self.database
    }

    /// Tables currently in scope, in the order they were added.
    #[must_use]
    pub fn active(&self) -> &[ActiveTable] {
        &self.active
    }

    /// The RETURNING column set, if one was set.
    #[must_use]
    pub const fn returning_columns(&self) -> Option<&Arc<TableColumns>> {
        self.returning.as_ref()
    }

    /// Returns a context with `columns` active under `alias`.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::DuplicateAlias` if the alias is already active.
    pub fn add(&self, alias: &str, columns: Arc<TableColumns>) -> Result<Self, ContextError> {
        if self.find_active(alias).is_some() {
            return Err(ContextError::DuplicateAlias {
                alias: alias.to_string(),
            });
        }
        debug!(alias, columns = columns.len(), "table added to query context");
        let mut next = self.clone();
        next.active.push(ActiveTable {
            alias: alias.to_string(),
            columns,
        });
        Ok(next)
    }

    /// Returns a context with a declared table (or CTE) active under the
    /// reference's alias, or its name when it has none.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::UnknownTable` if the table is not declared, or
    /// `ContextError::DuplicateAlias` if its scope name is already active.
    pub fn copy(&self, table: &TableReference) -> Result<Self, ContextError> {
        let (_, columns) = self.lookup_table(&table.table)?;
        self.add(table.scope_name(), columns)
    }

    /// Returns a context where `columns` is the RETURNING set. A previous set
    /// is replaced, not merged.
    #[must_use]
    pub fn returning(&self, columns: Arc<TableColumns>) -> Self {
        let mut next = self.clone();
        next.returning = Some(columns);
        next
    }

    /// Returns a context where `name` can be used as a table, backed by the
    /// output columns of a CTE.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::DuplicateAlias` if a CTE with that name already
    /// exists.
    pub fn derive(&self, name: &str, columns: Arc<TableColumns>) -> Result<Self, ContextError> {
        if self
            .derived
            .iter()
            .any(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            return Err(ContextError::DuplicateAlias {
                alias: name.to_string(),
            });
        }
        debug!(cte = name, columns = columns.len(), "derived table registered");
        let mut next = self.clone();
        next.derived.push((name.to_string(), columns));
        Ok(next)
    }

    /// Returns a context with the same schema and CTEs but nothing active.
    #[must_use]
    pub fn scope(&self) -> Self {
        Self {
            database: self.database,
            derived: self.derived.clone(),
            active: Vec::new(),
            returning: None,
        }
    }

    /// Finds a table by name: CTEs shadow schema tables. Returns the declared
    /// spelling of the name together with the columns.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::UnknownTable` if neither knows the name.
    pub fn lookup_table(&self, name: &str) -> Result<(String, Arc<TableColumns>), ContextError> {
        if let Some((declared, columns)) = self
            .derived
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            return Ok((declared.clone(), Arc::clone(columns)));
        }
        self.database
            .table(name)
            .map(|t| (t.name().to_string(), Arc::clone(t.columns())))
            .ok_or_else(|| ContextError::UnknownTable {
                table: name.to_string(),
            })
    }

    /// Resolves a `column` or `table.column` token against the active tables.
    ///
    /// A bare name must exist on exactly one active table and resolves to an
    /// unbound reference; a qualified name must name an active alias that
    /// declares the column. Names in the result use the declared spelling.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::UnknownColumn` or
    /// `ContextError::AmbiguousColumn`.
    pub fn resolve(&self, token: &str) -> Result<ColumnReference, ContextError> {
        let token = token.trim();
        let unknown = || ContextError::UnknownColumn {
            column: token.to_string(),
        };

        if let Some((qualifier, name)) = token.split_once('.') {
            let table = self.find_active(qualifier).ok_or_else(unknown)?;
            let column = table.columns.get(name).ok_or_else(unknown)?;
            return Ok(ColumnReference::qualified(&table.alias, &column.name));
        }

        let mut matches = self
            .active
            .iter()
            .filter_map(|t| t.columns.get(token).map(|c| (t, c)));
        let Some((_, column)) = matches.next() else {
            return Err(unknown());
        };
        if matches.next().is_some() {
            let tables = self
                .active
                .iter()
                .filter(|t| t.columns.contains(token))
                .map(|t| t.alias.clone())
                .collect();
            return Err(ContextError::AmbiguousColumn {
                column: token.to_string(),
                tables,
            });
        }
        Ok(ColumnReference::unbound(&column.name))
    }

    /// Resolves a token of a RETURNING list: the column must be in the
    /// RETURNING set, and a qualifier must name an active alias.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::UnknownColumn` when no RETURNING set is present
    /// or the column is not in it.
    pub fn resolve_returning(&self, token: &str) -> Result<ColumnReference, ContextError> {
        let token = token.trim();
        let unknown = || ContextError::UnknownColumn {
            column: token.to_string(),
        };
        let returning = self.returning.as_ref().ok_or_else(unknown)?;

        match token.split_once('.') {
            Some((qualifier, name)) => {
                let table = self.find_active(qualifier).ok_or_else(unknown)?;
                let column = returning.get(name).ok_or_else(unknown)?;
                Ok(ColumnReference::qualified(&table.alias, &column.name))
            }
            None => {
                let column = returning.get(token).ok_or_else(unknown)?;
                Ok(ColumnReference::unbound(&column.name))
            }
        }
    }

    /// Looks up the definition behind a resolved reference.
    #[must_use]
    pub fn column(&self, reference: &ColumnReference) -> Option<&Column> {
        match reference.table() {
            Some(alias) => self.find_active(alias)?.columns.get(reference.column()),
            None => self
                .active
                .iter()
                .find_map(|t| t.columns.get(reference.column())),
        }
    }

    fn find_active(&self, alias: &str) -> Option<&ActiveTable> {
        self.active
            .iter()
            .find(|t| t.alias.eq_ignore_ascii_case(alias))
    }
}
