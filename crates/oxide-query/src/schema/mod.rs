//! Database schema declarations.
//!
//! A [`Database`] is declared once (through [`Database::builder`],
//! [`create_database`], or a JSON schema document) and is immutable
//! afterwards. Every query built or parsed against it is validated against
//! these declarations.
//!
//! ```rust
//! use oxide_query::schema::{DataType, Database, ForeignKey, Table};
//!
//! let db = Database::builder()
//!     .table(
//!         Table::builder("users")
//!             .column("id", DataType::Integer)
//!             .column("name", DataType::Text)
//!             .primary_key("id"),
//!     )
//!     .table(
//!         Table::builder("orders")
//!             .column("id", DataType::Integer)
//!             .column("user_id", DataType::Integer)
//!             .primary_key("id"),
//!     )
//!     .foreign_key(ForeignKey::new("orders", "user_id", "users", "id"))
//!     .build()
//!     .unwrap();
//!
//! assert!(db.table("Users").is_some());
//! assert!(db.column("orders", "user_id").is_some());
//! ```

mod error;
mod table;
mod types;

use std::collections::HashMap;

use serde::Deserialize;

pub use error::SchemaError;
pub use table::{Column, PrimaryKey, Table, TableBuilder, TableColumns};
pub use types::{ColumnDef, DataType, UnknownDataType};

/// A foreign key from `left_table.left_column` to `right_table.right_column`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    /// The referencing table.
    pub left_table: String,
    /// The referencing column.
    pub left_column: String,
    /// The referenced table.
    pub right_table: String,
    /// The referenced column.
    pub right_column: String,
}

impl ForeignKey {
    /// Creates a foreign key.
    #[must_use]
    pub fn new(
        left_table: impl Into<String>,
        left_column: impl Into<String>,
        right_table: impl Into<String>,
        right_column: impl Into<String>,
    ) -> Self {
        Self {
            left_table: left_table.into(),
            left_column: left_column.into(),
            right_table: right_table.into(),
            right_column: right_column.into(),
        }
    }
}

/// A validated, immutable set of tables and foreign keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "SchemaDocument")]
pub struct Database {
    tables: Vec<Table>,
    /// Lower-cased table name to position in `tables`.
    index: HashMap<String, usize>,
    foreign_keys: Vec<ForeignKey>,
}

impl Database {
    /// Starts declaring a database.
    #[must_use]
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::default()
    }

    /// Looks up a table, ignoring ASCII case.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.index
            .get(&name.to_ascii_lowercase())
            .map(|&i| &self.tables[i])
    }

    /// Looks up a column of a table, ignoring ASCII case.
    #[must_use]
    pub fn column(&self, table: &str, column: &str) -> Option<&ColumnDef> {
        self.table(table)?.column(column).map(|c| &c.def)
    }

    /// Iterates tables in declaration order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }

    /// All declared foreign keys.
    #[must_use]
    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    /// Foreign keys linking the two tables, in either direction.
    pub fn foreign_keys_between<'a>(
        &'a self,
        left: &'a str,
        right: &'a str,
    ) -> impl Iterator<Item = &'a ForeignKey> + 'a {
        self.foreign_keys.iter().filter(move |fk| {
            let forward = fk.left_table.eq_ignore_ascii_case(left)
                && fk.right_table.eq_ignore_ascii_case(right);
            let backward = fk.left_table.eq_ignore_ascii_case(right)
                && fk.right_table.eq_ignore_ascii_case(left);
            forward || backward
        })
    }
}

/// Creates a database from already-built tables and foreign keys.
///
/// # Errors
///
/// Returns a `SchemaError` if two tables share a name or a foreign key
/// references an undeclared table or column.
pub fn create_database(
    tables: impl IntoIterator<Item = Table>,
    foreign_keys: impl IntoIterator<Item = ForeignKey>,
) -> Result<Database, SchemaError> {
    let mut db = Database {
        tables: Vec::new(),
        index: HashMap::new(),
        foreign_keys: Vec::new(),
    };

    for table in tables {
        let key = table.name().to_ascii_lowercase();
        if db.index.contains_key(&key) {
            return Err(SchemaError::DuplicateTable {
                table: table.name().to_string(),
            });
        }
        db.index.insert(key, db.tables.len());
        db.tables.push(table);
    }

    for fk in foreign_keys {
        check_key_column(&db, &fk.left_table, &fk.left_column)?;
        check_key_column(&db, &fk.right_table, &fk.right_column)?;
        db.foreign_keys.push(fk);
    }

    Ok(db)
}

fn check_key_column(db: &Database, table: &str, column: &str) -> Result<(), SchemaError> {
    let declared = db.table(table).ok_or_else(|| SchemaError::UnknownTable {
        table: table.to_string(),
    })?;
    if declared.column(column).is_none() {
        return Err(SchemaError::UnknownColumn {
            table: table.to_string(),
            column: column.to_string(),
        });
    }
    Ok(())
}

/// Builder for [`Database`].
#[derive(Debug, Clone, Default)]
pub struct DatabaseBuilder {
    tables: Vec<TableBuilder>,
    foreign_keys: Vec<ForeignKey>,
}

impl DatabaseBuilder {
    /// Adds a table declaration.
    #[must_use]
    pub fn table(mut self, table: TableBuilder) -> Self {
        self.tables.push(table);
        self
    }

    /// Adds a foreign key.
    #[must_use]
    pub fn foreign_key(mut self, fk: ForeignKey) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    /// Validates every declaration and produces the database.
    ///
    /// # Errors
    ///
    /// Returns the first `SchemaError` found.
    pub fn build(self) -> Result<Database, SchemaError> {
        let tables = self
            .tables
            .into_iter()
            .map(TableBuilder::build)
            .collect::<Result<Vec<_>, _>>()?;
        create_database(tables, self.foreign_keys)
    }
}

/// JSON form of a schema, as loaded from a schema file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaDocument {
    tables: Vec<TableDocument>,
    #[serde(default)]
    foreign_keys: Vec<ForeignKey>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableDocument {
    name: String,
    columns: Vec<ColumnDocument>,
    #[serde(default)]
    primary_key: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ColumnDocument {
    name: String,
    #[serde(rename = "type")]
    data_type: DataType,
    #[serde(default)]
    nullable: bool,
}

impl TryFrom<SchemaDocument> for Database {
    type Error = SchemaError;

    fn try_from(doc: SchemaDocument) -> Result<Self, Self::Error> {
        let mut builder = Self::builder();
        for table in doc.tables {
            let mut decl = Table::builder(table.name);
            for column in table.columns {
                decl = if column.nullable {
                    decl.nullable_column(column.name, column.data_type)
                } else {
                    decl.column(column.name, column.data_type)
                };
            }
            decl = match table.primary_key.len() {
                1 => decl.primary_key(table.primary_key[0].clone()),
                _ => decl.composite_primary_key(table.primary_key),
            };
            builder = builder.table(decl);
        }
        for fk in doc.foreign_keys {
            builder = builder.foreign_key(fk);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> TableBuilder {
        Table::builder("users")
            .column("id", DataType::Integer)
            .column("name", DataType::Text)
            .primary_key("id")
    }

    fn orders() -> TableBuilder {
        Table::builder("orders")
            .column("id", DataType::Integer)
            .column("user_id", DataType::Integer)
            .primary_key("id")
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let db = Database::builder().table(users()).build().unwrap();
        assert_eq!(db.table("USERS").unwrap().name(), "users");
        assert_eq!(db.column("Users", "NAME").unwrap().data_type, DataType::Text);
        assert!(db.table("orders").is_none());
        assert!(db.column("users", "email").is_none());
    }

    #[test]
    fn test_duplicate_table() {
        let err = Database::builder()
            .table(users())
            .table(users())
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateTable { .. }));
    }

    #[test]
    fn test_foreign_key_validation() {
        let err = Database::builder()
            .table(users())
            .table(orders())
            .foreign_key(ForeignKey::new("orders", "customer_id", "users", "id"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownColumn {
                table: String::from("orders"),
                column: String::from("customer_id"),
            }
        );

        let err = Database::builder()
            .table(orders())
            .foreign_key(ForeignKey::new("orders", "user_id", "users", "id"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownTable { table } if table == "users"));
    }

    #[test]
    fn test_foreign_keys_between() {
        let db = Database::builder()
            .table(users())
            .table(orders())
            .foreign_key(ForeignKey::new("orders", "user_id", "users", "id"))
            .build()
            .unwrap();
        assert_eq!(db.foreign_keys_between("users", "orders").count(), 1);
        assert_eq!(db.foreign_keys_between("orders", "users").count(), 1);
        assert_eq!(db.foreign_keys_between("users", "users").count(), 0);
    }

    #[test]
    fn test_deserialize_schema_document() {
        let json = r#"{
            "tables": [
                {
                    "name": "users",
                    "columns": [
                        {"name": "id", "type": "integer"},
                        {"name": "address", "type": "varchar(255)", "nullable": true}
                    ],
                    "primaryKey": ["id"]
                },
                {
                    "name": "orders",
                    "columns": [
                        {"name": "id", "type": "bigint"},
                        {"name": "user_id", "type": "integer"}
                    ],
                    "primaryKey": ["id"]
                }
            ],
            "foreignKeys": [
                {"leftTable": "orders", "leftColumn": "user_id",
                 "rightTable": "users", "rightColumn": "id"}
            ]
        }"#;
        let db: Database = serde_json::from_str(json).unwrap();
        assert_eq!(db.tables().count(), 2);
        assert_eq!(
            db.column("users", "address").unwrap(),
            &ColumnDef::nullable(DataType::Varchar(Some(255)))
        );
        assert_eq!(db.foreign_keys().len(), 1);
    }

    #[test]
    fn test_deserialize_rejects_invalid_schema() {
        let json = r#"{"tables": [{"name": "t", "columns": [{"name": "id", "type": "integer"}]}]}"#;
        let err = serde_json::from_str::<Database>(json).unwrap_err();
        assert!(err.to_string().contains("no primary key"));
    }
}
