//! Column data types and definitions.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Built-in SQL data types a schema column can declare.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DataType {
    // Integer types
    /// Small integer (2 bytes).
    Smallint,
    /// Integer (4 bytes).
    Integer,
    /// Big integer (8 bytes).
    Bigint,

    // Floating point
    /// Real (4-byte float).
    Real,
    /// Double precision (8-byte float).
    Double,
    /// Exact decimal.
    Decimal,

    // Boolean
    /// Boolean.
    Boolean,

    // String types
    /// Fixed-length character string.
    Char(Option<u32>),
    /// Variable-length character string.
    Varchar(Option<u32>),
    /// Text (variable length, no limit).
    Text,

    // Binary
    /// Binary large object.
    Blob,

    // Date/time types
    /// Date.
    Date,
    /// Time.
    Time,
    /// Timestamp.
    Timestamp,

    // Structured
    /// JSON document.
    Json,
    /// UUID.
    Uuid,
}

impl DataType {
    /// Returns the SQL representation of the data type.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::Smallint => String::from("SMALLINT"),
            Self::Integer => String::from("INTEGER"),
            Self::Bigint => String::from("BIGINT"),
            Self::Real => String::from("REAL"),
            Self::Double => String::from("DOUBLE"),
            Self::Decimal => String::from("DECIMAL"),
            Self::Boolean => String::from("BOOLEAN"),
            Self::Char(len) => match len {
                Some(n) => format!("CHAR({n})"),
                None => String::from("CHAR"),
            },
            Self::Varchar(len) => match len {
                Some(n) => format!("VARCHAR({n})"),
                None => String::from("VARCHAR"),
            },
            Self::Text => String::from("TEXT"),
            Self::Blob => String::from("BLOB"),
            Self::Date => String::from("DATE"),
            Self::Time => String::from("TIME"),
            Self::Timestamp => String::from("TIMESTAMP"),
            Self::Json => String::from("JSON"),
            Self::Uuid => String::from("UUID"),
        }
    }

    /// Returns true for integer, floating point and decimal types.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Smallint
                | Self::Integer
                | Self::Bigint
                | Self::Real
                | Self::Double
                | Self::Decimal
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// Error returned when a type name is not one of the built-in types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown data type: {0}")]
pub struct UnknownDataType(pub String);

impl FromStr for DataType {
    type Err = UnknownDataType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        let (name, length) = match normalized.split_once('(') {
            Some((name, rest)) => {
                let digits = rest
                    .strip_suffix(')')
                    .ok_or_else(|| UnknownDataType(s.to_string()))?;
                let length = digits
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| UnknownDataType(s.to_string()))?;
                (name.trim().to_string(), Some(length))
            }
            None => (normalized, None),
        };

        let data_type = match (name.as_str(), length) {
            ("SMALLINT", None) => Self::Smallint,
            ("INT" | "INTEGER", None) => Self::Integer,
            ("BIGINT", None) => Self::Bigint,
            ("REAL" | "FLOAT", None) => Self::Real,
            ("DOUBLE", None) => Self::Double,
            ("DECIMAL" | "NUMERIC", None) => Self::Decimal,
            ("BOOL" | "BOOLEAN", None) => Self::Boolean,
            ("CHAR", len) => Self::Char(len),
            ("VARCHAR", len) => Self::Varchar(len),
            ("TEXT", None) => Self::Text,
            ("BLOB", None) => Self::Blob,
            ("DATE", None) => Self::Date,
            ("TIME", None) => Self::Time,
            ("TIMESTAMP" | "DATETIME", None) => Self::Timestamp,
            ("JSON", None) => Self::Json,
            ("UUID", None) => Self::Uuid,
            _ => return Err(UnknownDataType(s.to_string())),
        };
        Ok(data_type)
    }
}

impl TryFrom<String> for DataType {
    type Error = UnknownDataType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DataType> for String {
    fn from(value: DataType) -> Self {
        value.to_sql()
    }
}

/// The type and nullability of a declared column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    /// Data type.
    pub data_type: DataType,
    /// Whether the column is nullable.
    pub nullable: bool,
}

impl ColumnDef {
    /// Creates a NOT NULL column definition.
    #[must_use]
    pub const fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            nullable: false,
        }
    }

    /// Creates a nullable column definition.
    #[must_use]
    pub const fn nullable(data_type: DataType) -> Self {
        Self {
            data_type,
            nullable: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_to_sql() {
        assert_eq!(DataType::Integer.to_sql(), "INTEGER");
        assert_eq!(DataType::Varchar(Some(255)).to_sql(), "VARCHAR(255)");
        assert_eq!(DataType::Char(None).to_sql(), "CHAR");
    }

    #[test]
    fn test_data_type_from_str() {
        assert_eq!("int".parse::<DataType>(), Ok(DataType::Integer));
        assert_eq!(
            "varchar(64)".parse::<DataType>(),
            Ok(DataType::Varchar(Some(64)))
        );
        assert_eq!(" Text ".parse::<DataType>(), Ok(DataType::Text));
        assert!("integer(4)".parse::<DataType>().is_err());
        assert!("geometry".parse::<DataType>().is_err());
        assert!("varchar(abc)".parse::<DataType>().is_err());
    }

    #[test]
    fn test_column_def_constructors() {
        assert!(!ColumnDef::new(DataType::Integer).nullable);
        assert!(ColumnDef::nullable(DataType::Text).nullable);
    }
}
