//! Schema declaration errors.

/// Errors raised while declaring a schema.
///
/// These are fatal at schema-build time: a `Database` is only ever handed out
/// once every table, key and foreign key has been checked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Two tables share a name (names are compared case-insensitively).
    #[error("table '{table}' is declared more than once")]
    DuplicateTable {
        /// The duplicated table name.
        table: String,
    },

    /// Two columns of one table share a name.
    #[error("column '{column}' is declared more than once on table '{table}'")]
    DuplicateColumn {
        /// The table being declared.
        table: String,
        /// The duplicated column name.
        column: String,
    },

    /// A table was declared without a primary key.
    #[error("table '{table}' has no primary key")]
    MissingPrimaryKey {
        /// The table being declared.
        table: String,
    },

    /// A foreign key points at a table that was never declared.
    #[error("foreign key references undeclared table '{table}'")]
    UnknownTable {
        /// The missing table.
        table: String,
    },

    /// A key references a column its table does not declare.
    #[error("key references undeclared column '{table}.{column}'")]
    UnknownColumn {
        /// The table the key points into.
        table: String,
        /// The missing column.
        column: String,
    },
}
