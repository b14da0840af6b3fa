//! Statement and clause AST types.

use serde::Serialize;

use super::expression::{ColumnAssignment, Condition, SelectColumn};

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JoinKind {
    /// INNER JOIN.
    Inner,
    /// LEFT OUTER JOIN.
    Left,
    /// RIGHT OUTER JOIN.
    Right,
    /// FULL OUTER JOIN.
    Full,
}

impl JoinKind {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
        }
    }

    /// Parses a join kind name (`INNER`, `left`, ...).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "INNER" => Some(Self::Inner),
            "LEFT" => Some(Self::Left),
            "RIGHT" => Some(Self::Right),
            "FULL" => Some(Self::Full),
            _ => None,
        }
    }
}

/// A table in FROM, JOIN, UPDATE, DELETE FROM or INSERT INTO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReference {
    /// Table (or CTE) name as declared.
    pub table: String,
    /// Alias.
    pub alias: Option<String>,
}

impl TableReference {
    /// Creates a table reference without an alias.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            alias: None,
        }
    }

    /// Adds an alias to this table reference.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The name columns of this table are addressed by: the alias if there
    /// is one, else the table name.
    #[must_use]
    pub fn scope_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }
}

/// A JOIN clause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinClause {
    /// The type of join.
    pub kind: JoinKind,
    /// The joined table.
    pub table: TableReference,
    /// The join condition.
    pub on: Condition,
}

/// A WHERE clause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhereClause {
    /// The filter condition.
    pub condition: Condition,
}

/// The column list of SELECT or RETURNING.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SelectColumns {
    /// `*`: every active column.
    All,
    /// An explicit list.
    List(Vec<SelectColumn>),
}

/// A RETURNING clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturningClause {
    /// The returned columns.
    pub columns: SelectColumns,
}

/// A SELECT clause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectClause {
    /// The columns to select.
    pub columns: SelectColumns,
    /// The FROM table.
    pub from: TableReference,
    /// JOIN clauses, in order.
    pub joins: Vec<JoinClause>,
    /// The WHERE clause.
    pub where_clause: Option<WhereClause>,
}

/// An INSERT clause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertClause {
    /// The target table.
    pub table: TableReference,
    /// Inserted values, one per column.
    pub columns: Vec<ColumnAssignment>,
    /// The RETURNING clause.
    pub returning: Option<ReturningClause>,
}

/// An UPDATE clause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateClause {
    /// SET assignments.
    pub columns: Vec<ColumnAssignment>,
    /// The target table.
    pub table: TableReference,
    /// The WHERE clause.
    pub where_clause: Option<WhereClause>,
    /// The RETURNING clause.
    pub returning: Option<ReturningClause>,
}

/// A DELETE clause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteClause {
    /// The target table.
    pub table: TableReference,
    /// The WHERE clause.
    pub where_clause: Option<WhereClause>,
    /// The RETURNING clause.
    pub returning: Option<ReturningClause>,
}

/// The statement part of a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum QueryClause {
    /// SELECT statement.
    Select(SelectClause),
    /// INSERT statement.
    Insert(InsertClause),
    /// UPDATE statement.
    Update(UpdateClause),
    /// DELETE statement.
    Delete(DeleteClause),
}

/// A common table expression: `alias AS (query)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedQuery {
    /// The CTE name.
    pub alias: String,
    /// The CTE body.
    pub query: SelectClause,
}

/// A WITH clause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithClause {
    /// CTEs, in declaration order.
    pub ctes: Vec<NamedQuery>,
}

/// A complete query: the root of every AST.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlQuery {
    /// The statement.
    pub query: QueryClause,
    /// Leading WITH clause.
    pub with: Option<WithClause>,
}

impl SqlQuery {
    /// Wraps a statement without a WITH clause.
    #[must_use]
    pub const fn new(query: QueryClause) -> Self {
        Self { query, with: None }
    }
}

impl From<SelectClause> for QueryClause {
    fn from(clause: SelectClause) -> Self {
        Self::Select(clause)
    }
}

impl From<InsertClause> for QueryClause {
    fn from(clause: InsertClause) -> Self {
        Self::Insert(clause)
    }
}

impl From<UpdateClause> for QueryClause {
    fn from(clause: UpdateClause) -> Self {
        Self::Update(clause)
    }
}

impl From<DeleteClause> for QueryClause {
    fn from(clause: DeleteClause) -> Self {
        Self::Delete(clause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_kind() {
        assert_eq!(JoinKind::Inner.as_str(), "INNER JOIN");
        assert_eq!(JoinKind::from_name("left"), Some(JoinKind::Left));
        assert_eq!(JoinKind::from_name("CROSS"), None);
    }

    #[test]
    fn test_table_reference_scope_name() {
        let table = TableReference::new("users").alias("u");
        assert_eq!(table.scope_name(), "u");
        assert_eq!(TableReference::new("users").scope_name(), "users");
    }
}
