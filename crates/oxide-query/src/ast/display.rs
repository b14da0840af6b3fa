//! Canonical SQL rendering of AST nodes.
//!
//! The rendered text of a join-free query parses back to an equal AST.

use core::fmt::{self, Display, Formatter};

use super::expression::{ColumnAssignment, ColumnReference, Condition, SelectColumn, Value};
use super::statement::{
    DeleteClause, InsertClause, JoinClause, NamedQuery, QueryClause, ReturningClause, SelectClause,
    SelectColumns, SqlQuery, TableReference, UpdateClause, WhereClause, WithClause,
};

fn write_list<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl Display for ColumnReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbound { column } => f.write_str(column),
            Self::Table { table, column } => write!(f, "{table}.{column}"),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(column) => write!(f, "{column}"),
            Self::Parameter(name) => write!(f, ":{name}"),
            Self::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Integer(n) => write!(f, "{n}"),
            // Debug keeps the fractional part, so 1.0 does not read back as 1.
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Boolean(true) => f.write_str("TRUE"),
            Self::Boolean(false) => f.write_str("FALSE"),
            Self::Null => f.write_str("NULL"),
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare { left, op, right } => write!(f, "{left} {} {right}", op.as_str()),
            Self::And { left, right } => {
                match left.as_ref() {
                    Self::Or { .. } => write!(f, "({left})")?,
                    _ => write!(f, "{left}")?,
                }
                f.write_str(" AND ")?;
                match right.as_ref() {
                    Self::Compare { .. } => write!(f, "{right}"),
                    _ => write!(f, "({right})"),
                }
            }
            Self::Or { left, right } => {
                write!(f, "{left} OR ")?;
                match right.as_ref() {
                    Self::Or { .. } => write!(f, "({right})"),
                    _ => write!(f, "{right}"),
                }
            }
        }
    }
}

impl Display for SelectColumn {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        Ok(())
    }
}

impl Display for SelectColumns {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("*"),
            Self::List(columns) => write_list(f, columns),
        }
    }
}

impl Display for ColumnAssignment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.column, self.value)
    }
}

impl Display for TableReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.table)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        Ok(())
    }
}

impl Display for JoinClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ON {}", self.kind.as_str(), self.table, self.on)
    }
}

impl Display for WhereClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "WHERE {}", self.condition)
    }
}

impl Display for ReturningClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "RETURNING {}", self.columns)
    }
}

impl Display for SelectClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT {} FROM {}", self.columns, self.from)?;
        for join in &self.joins {
            write!(f, " {join}")?;
        }
        if let Some(where_clause) = &self.where_clause {
            write!(f, " {where_clause}")?;
        }
        Ok(())
    }
}

impl Display for InsertClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "INSERT INTO {} (", self.table)?;
        let columns: Vec<&ColumnReference> = self.columns.iter().map(|a| &a.column).collect();
        write_list(f, &columns)?;
        f.write_str(") VALUES (")?;
        let values: Vec<&Value> = self.columns.iter().map(|a| &a.value).collect();
        write_list(f, &values)?;
        f.write_str(")")?;
        if let Some(returning) = &self.returning {
            write!(f, " {returning}")?;
        }
        Ok(())
    }
}

impl Display for UpdateClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "UPDATE {} SET ", self.table)?;
        write_list(f, &self.columns)?;
        if let Some(where_clause) = &self.where_clause {
            write!(f, " {where_clause}")?;
        }
        if let Some(returning) = &self.returning {
            write!(f, " {returning}")?;
        }
        Ok(())
    }
}

impl Display for DeleteClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "DELETE FROM {}", self.table)?;
        if let Some(where_clause) = &self.where_clause {
            write!(f, " {where_clause}")?;
        }
        if let Some(returning) = &self.returning {
            write!(f, " {returning}")?;
        }
        Ok(())
    }
}

impl Display for QueryClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select(clause) => write!(f, "{clause}"),
            Self::Insert(clause) => write!(f, "{clause}"),
            Self::Update(clause) => write!(f, "{clause}"),
            Self::Delete(clause) => write!(f, "{clause}"),
        }
    }
}

impl Display for NamedQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} AS ({})", self.alias, self.query)
    }
}

impl Display for WithClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("WITH ")?;
        write_list(f, &self.ctes)
    }
}

impl Display for SqlQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(with) = &self.with {
            write!(f, "{with} ")?;
        }
        write!(f, "{}", self.query)
    }
}
