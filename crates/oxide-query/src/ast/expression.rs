//! Column references, values and conditions.

use serde::Serialize;

/// A reference to a column that was validated against the query context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ColumnReference {
    /// A bare column name (`id`).
    Unbound {
        /// Column name as declared in the schema.
        column: String,
    },
    /// A column qualified by an active table or alias (`u.id`).
    Table {
        /// The alias (or table name) the column was resolved through.
        table: String,
        /// Column name as declared in the schema.
        column: String,
    },
}

impl ColumnReference {
    /// Creates an unbound reference.
    #[must_use]
    pub fn unbound(column: impl Into<String>) -> Self {
        Self::Unbound {
            column: column.into(),
        }
    }

    /// Creates a table-qualified reference.
    #[must_use]
    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::Table {
            table: table.into(),
            column: column.into(),
        }
    }

    /// The referenced column name.
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Self::Unbound { column } | Self::Table { column, .. } => column,
        }
    }

    /// The table qualifier, if any.
    #[must_use]
    pub fn table(&self) -> Option<&str> {
        match self {
            Self::Unbound { .. } => None,
            Self::Table { table, .. } => Some(table),
        }
    }
}

/// An operand of a condition or assignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// A column of an active table.
    Column(ColumnReference),
    /// A named parameter (`:id`), stored without the colon.
    Parameter(String),
    /// A single-quoted string literal, unescaped.
    String(String),
    /// An integer literal.
    Integer(i64),
    /// A floating point literal.
    Float(f64),
    /// `TRUE` or `FALSE`.
    Boolean(bool),
    /// `NULL`.
    Null,
}

impl Value {
    /// Creates a parameter value.
    #[must_use]
    pub fn parameter(name: impl Into<String>) -> Self {
        Self::Parameter(name.into())
    }

    /// Creates a string literal.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }
}

impl From<ColumnReference> for Value {
    fn from(column: ColumnReference) -> Self {
        Self::Column(column)
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComparisonOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Like,
}

impl ComparisonOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Like => "LIKE",
        }
    }

    /// Parses an operator token. `<>` is accepted as `!=`, `LIKE` in any case.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "=" => Some(Self::Eq),
            "!=" | "<>" => Some(Self::NotEq),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::LtEq),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::GtEq),
            _ if token.eq_ignore_ascii_case("LIKE") => Some(Self::Like),
            _ => None,
        }
    }
}

/// A boolean condition in WHERE or JOIN ... ON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Condition {
    /// A binary comparison of two values.
    Compare {
        left: Value,
        op: ComparisonOp,
        right: Value,
    },
    /// Both conditions hold.
    And {
        left: Box<Condition>,
        right: Box<Condition>,
    },
    /// Either condition holds.
    Or {
        left: Box<Condition>,
        right: Box<Condition>,
    },
}

impl Condition {
    /// Creates a comparison.
    #[must_use]
    pub const fn compare(left: Value, op: ComparisonOp, right: Value) -> Self {
        Self::Compare { left, op, right }
    }

    /// Combines two conditions with AND.
    #[must_use]
    pub fn and(self, right: Self) -> Self {
        Self::And {
            left: Box::new(self),
            right: Box::new(right),
        }
    }

    /// Combines two conditions with OR.
    #[must_use]
    pub fn or(self, right: Self) -> Self {
        Self::Or {
            left: Box::new(self),
            right: Box::new(right),
        }
    }
}

/// A column in a SELECT or RETURNING list.
///
/// The alias is tracked separately from the reference: `id AS user_id` is the
/// reference `id` with the alias `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectColumn {
    /// The referenced column.
    pub column: ColumnReference,
    /// Output alias.
    pub alias: Option<String>,
}

impl SelectColumn {
    /// Creates a select column without an alias.
    #[must_use]
    pub const fn new(column: ColumnReference) -> Self {
        Self {
            column,
            alias: None,
        }
    }

    /// Creates a select column with an alias.
    #[must_use]
    pub fn with_alias(column: ColumnReference, alias: impl Into<String>) -> Self {
        Self {
            column,
            alias: Some(alias.into()),
        }
    }

    /// The name this column has in the result: the alias, else the column.
    #[must_use]
    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or_else(|| self.column.column())
    }
}

/// `column = value` in UPDATE ... SET or INSERT.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnAssignment {
    /// The assigned column of the target table.
    pub column: ColumnReference,
    /// The assigned value.
    pub value: Value,
}
