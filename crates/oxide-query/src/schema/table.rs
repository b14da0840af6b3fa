//! Table declarations.

use std::collections::HashMap;
use std::sync::Arc;

use super::error::SchemaError;
use super::types::{ColumnDef, DataType};

/// A named column and its definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// The column name as declared.
    pub name: String,
    /// Type and nullability.
    pub def: ColumnDef,
}

/// An ordered set of columns with case-insensitive lookup.
///
/// This is the unit a query context tracks per active table: schema tables
/// share theirs through an `Arc`, and CTEs produce fresh ones from their
/// output columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableColumns {
    columns: Vec<Column>,
    /// Lower-cased name to position in `columns`.
    index: HashMap<String, usize>,
}

impl TableColumns {
    /// Creates an empty column set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column. Returns `false` (and leaves the set untouched) when a
    /// column with the same name already exists.
    pub fn insert(&mut self, name: impl Into<String>, def: ColumnDef) -> bool {
        let name = name.into();
        let key = name.to_ascii_lowercase();
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.columns.len());
        self.columns.push(Column { name, def });
        true
    }

    /// Looks up a column by name, ignoring ASCII case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Column> {
        self.index
            .get(&name.to_ascii_lowercase())
            .map(|&i| &self.columns[i])
    }

    /// Returns true if a column with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_ascii_lowercase())
    }

    /// Iterates columns in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if there are no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// A table's primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryKey {
    /// A single-column key.
    Single(String),
    /// A key spanning several columns.
    Composite(Vec<String>),
}

impl PrimaryKey {
    /// Returns the key's column names.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Self::Single(column) => vec![column.as_str()],
            Self::Composite(columns) => columns.iter().map(String::as_str).collect(),
        }
    }
}

/// A declared table. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    columns: Arc<TableColumns>,
    primary_key: PrimaryKey,
}

impl Table {
    /// Starts declaring a table.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> TableBuilder {
        TableBuilder::new(name)
    }

    /// The table name as declared.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The table's columns, shared with every query context that uses it.
    #[must_use]
    pub const fn columns(&self) -> &Arc<TableColumns> {
        &self.columns
    }

    /// Looks up a column, ignoring ASCII case.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// The primary key.
    #[must_use]
    pub const fn primary_key(&self) -> &PrimaryKey {
        &self.primary_key
    }
}

/// Builder for [`Table`].
///
/// # Example
///
/// ```rust
/// use oxide_query::schema::{DataType, Table};
///
/// let users = Table::builder("users")
///     .column("id", DataType::Integer)
///     .nullable_column("address", DataType::Text)
///     .primary_key("id")
///     .build()
///     .unwrap();
///
/// assert_eq!(users.columns().len(), 2);
/// assert!(users.column("ADDRESS").unwrap().def.nullable);
/// ```
#[derive(Debug, Clone)]
pub struct TableBuilder {
    name: String,
    columns: Vec<(String, ColumnDef)>,
    primary_key: Option<PrimaryKey>,
}

impl TableBuilder {
    /// Creates a builder for a table with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: None,
        }
    }

    /// Adds a NOT NULL column.
    #[must_use]
    pub fn column(self, name: impl Into<String>, data_type: DataType) -> Self {
        self.column_def(name, ColumnDef::new(data_type))
    }

    /// Adds a nullable column.
    #[must_use]
    pub fn nullable_column(self, name: impl Into<String>, data_type: DataType) -> Self {
        self.column_def(name, ColumnDef::nullable(data_type))
    }

    /// Adds a column with an explicit definition.
    #[must_use]
    pub fn column_def(mut self, name: impl Into<String>, def: ColumnDef) -> Self {
        self.columns.push((name.into(), def));
        self
    }

    /// Sets a single-column primary key.
    #[must_use]
    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = Some(PrimaryKey::Single(column.into()));
        self
    }

    /// Sets a composite primary key.
    #[must_use]
    pub fn composite_primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = Some(PrimaryKey::Composite(
            columns.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Validates the declaration and produces the table.
    ///
    /// # Errors
    ///
    /// Returns a `SchemaError` on duplicate columns, a missing or empty primary
    /// key, or a key column that is not declared.
    pub fn build(self) -> Result<Table, SchemaError> {
        let mut columns = TableColumns::new();
        for (column, def) in self.columns {
            if !columns.insert(column.clone(), def) {
                return Err(SchemaError::DuplicateColumn {
                    table: self.name,
                    column,
                });
            }
        }

        let primary_key = match self.primary_key {
            Some(PrimaryKey::Composite(cols)) if cols.is_empty() => None,
            other => other,
        }
        .ok_or_else(|| SchemaError::MissingPrimaryKey {
            table: self.name.clone(),
        })?;

        if let Some(missing) = primary_key
            .columns()
            .into_iter()
            .find(|c| !columns.contains(c))
        {
            return Err(SchemaError::UnknownColumn {
                table: self.name.clone(),
                column: missing.to_string(),
            });
        }

        Ok(Table {
            name: self.name,
            columns: Arc::new(columns),
            primary_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_columns_case_insensitive() {
        let mut columns = TableColumns::new();
        assert!(columns.insert("UserId", ColumnDef::new(DataType::Integer)));
        assert!(!columns.insert("userid", ColumnDef::new(DataType::Text)));
        assert_eq!(columns.get("USERID").unwrap().name, "UserId");
        assert_eq!(columns.len(), 1);
    }

    #[test]
    fn test_composite_primary_key() {
        let table = Table::builder("memberships")
            .column("user_id", DataType::Integer)
            .column("group_id", DataType::Integer)
            .composite_primary_key(["user_id", "group_id"])
            .build()
            .unwrap();
        assert_eq!(table.primary_key().columns(), vec!["user_id", "group_id"]);
    }

    #[test]
    fn test_primary_key_must_exist() {
        let err = Table::builder("t")
            .column("id", DataType::Integer)
            .composite_primary_key(["id", "missing"])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownColumn {
                table: String::from("t"),
                column: String::from("missing"),
            }
        );
    }

    #[test]
    fn test_missing_primary_key() {
        let err = Table::builder("t")
            .column("id", DataType::Integer)
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingPrimaryKey { .. }));

        let err = Table::builder("t")
            .column("id", DataType::Integer)
            .composite_primary_key(Vec::<String>::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingPrimaryKey { .. }));
    }

    #[test]
    fn test_duplicate_column() {
        let err = Table::builder("t")
            .column("id", DataType::Integer)
            .column("ID", DataType::Bigint)
            .primary_key("id")
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateColumn { column, .. } if column == "ID"));
    }
}
