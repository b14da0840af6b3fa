//! Conditions and operand tokens.

use crate::ast::{ColumnReference, ComparisonOp, Condition, SelectColumn, TableReference, Value};
use crate::context::QueryContext;

use super::BuilderError;

/// Something that can stand on either side of a comparison.
///
/// String tokens are classified the same way by the builder and the parser:
/// `:name` is a parameter, `'text'` a string literal, a number a numeric
/// literal, `TRUE`/`FALSE`/`NULL` the matching constants, and anything else a
/// column resolved through the query context.
pub trait IntoOperand {
    /// Converts into a [`Value`], resolving columns against `context`.
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidOperand` for malformed tokens or the
    /// context error of an unresolvable column.
    fn into_operand(self, context: &QueryContext<'_>) -> Result<Value, BuilderError>;
}

impl IntoOperand for &str {
    fn into_operand(self, context: &QueryContext<'_>) -> Result<Value, BuilderError> {
        parse_operand(context, self)
    }
}

impl IntoOperand for &String {
    fn into_operand(self, context: &QueryContext<'_>) -> Result<Value, BuilderError> {
        parse_operand(context, self)
    }
}

impl IntoOperand for String {
    fn into_operand(self, context: &QueryContext<'_>) -> Result<Value, BuilderError> {
        parse_operand(context, &self)
    }
}

impl IntoOperand for i64 {
    fn into_operand(self, _: &QueryContext<'_>) -> Result<Value, BuilderError> {
        Ok(Value::Integer(self))
    }
}

impl IntoOperand for f64 {
    fn into_operand(self, _: &QueryContext<'_>) -> Result<Value, BuilderError> {
        Ok(Value::Float(self))
    }
}

impl IntoOperand for bool {
    fn into_operand(self, _: &QueryContext<'_>) -> Result<Value, BuilderError> {
        Ok(Value::Boolean(self))
    }
}

impl IntoOperand for Value {
    /// Literals pass through; a column reference must still be in scope.
    fn into_operand(self, context: &QueryContext<'_>) -> Result<Value, BuilderError> {
        if let Self::Column(reference) = &self {
            let token = match reference.table() {
                Some(table) => format!("{table}.{}", reference.column()),
                None => reference.column().to_string(),
            };
            return Ok(Self::Column(context.resolve(&token)?));
        }
        Ok(self)
    }
}

/// Builds conditions against the tables active when it was created.
///
/// Handed to `where_clause` and `join` callbacks.
#[derive(Debug, Clone, Copy)]
pub struct ConditionBuilder<'c, 'db> {
    context: &'c QueryContext<'db>,
}

impl<'c, 'db> ConditionBuilder<'c, 'db> {
    /// Creates a condition builder over a context.
    #[must_use]
    pub const fn new(context: &'c QueryContext<'db>) -> Self {
        Self { context }
    }

    /// The context columns are resolved against.
    #[must_use]
    pub const fn context(&self) -> &'c QueryContext<'db> {
        self.context
    }

    /// Builds the comparison `lhs op rhs`.
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::UnknownOperator` for an unknown operator, or
    /// the error of either operand.
    pub fn filter(
        &self,
        lhs: impl IntoOperand,
        op: &str,
        rhs: impl IntoOperand,
    ) -> Result<Condition, BuilderError> {
        let op = ComparisonOp::from_token(op.trim()).ok_or_else(|| {
            BuilderError::UnknownOperator {
                operator: op.trim().to_string(),
            }
        })?;
        let left = lhs.into_operand(self.context)?;
        let right = rhs.into_operand(self.context)?;
        Ok(Condition::compare(left, op, right))
    }
}

/// Classifies and resolves one operand token.
pub(crate) fn parse_operand(
    context: &QueryContext<'_>,
    token: &str,
) -> Result<Value, BuilderError> {
    let token = token.trim();
    let invalid = || BuilderError::InvalidOperand {
        token: token.to_string(),
    };

    if let Some(name) = token.strip_prefix(':') {
        return if is_identifier(name) {
            Ok(Value::parameter(name))
        } else {
            Err(invalid())
        };
    }

    if token.starts_with('\'') {
        return parse_string(token).map(Value::String).ok_or_else(invalid);
    }

    if token.eq_ignore_ascii_case("TRUE") {
        return Ok(Value::Boolean(true));
    }
    if token.eq_ignore_ascii_case("FALSE") {
        return Ok(Value::Boolean(false));
    }
    if token.eq_ignore_ascii_case("NULL") {
        return Ok(Value::Null);
    }

    let unsigned = token.strip_prefix(['-', '+']).unwrap_or(token);
    if unsigned.starts_with(|c: char| c.is_ascii_digit()) {
        if !unsigned.contains(['.', 'e', 'E']) {
            return token.parse::<i64>().map(Value::Integer).map_err(|_| invalid());
        }
        return token.parse::<f64>().map(Value::Float).map_err(|_| invalid());
    }

    if !is_column_token(token) {
        return Err(invalid());
    }
    Ok(Value::Column(context.resolve(token)?))
}

/// Unquotes a `'...'` literal, undoing `''` escapes. Returns `None` if the
/// token is not exactly one literal.
fn parse_string(token: &str) -> Option<String> {
    let inner = token.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\'' && chars.next() != Some('\'') {
            return None;
        }
        value.push(c);
    }
    Some(value)
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub(crate) fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `column` or `table.column`.
pub(crate) fn is_column_token(text: &str) -> bool {
    match text.split_once('.') {
        Some((table, column)) => is_identifier(table) && is_identifier(column),
        None => is_identifier(text),
    }
}

/// Parses `name`, `name alias` or `name AS alias`. The name is kept as
/// written; callers replace it with the declared spelling.
pub(crate) fn parse_table_reference(text: &str) -> Result<TableReference, BuilderError> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let (table, alias) = match words.as_slice() {
        [table] => (*table, None),
        [table, alias] if !alias.eq_ignore_ascii_case("AS") => (*table, Some(*alias)),
        [table, kw, alias] if kw.eq_ignore_ascii_case("AS") => (*table, Some(*alias)),
        _ => ("", None),
    };
    if !is_identifier(table) || alias.is_some_and(|a| !is_identifier(a)) {
        return Err(BuilderError::InvalidTableReference {
            text: text.trim().to_string(),
        });
    }
    let reference = TableReference::new(table);
    Ok(match alias {
        Some(alias) => reference.alias(alias),
        None => reference,
    })
}

/// Splits `column [AS alias]` into the column token and alias.
pub(crate) fn split_column_alias(token: &str) -> Result<(&str, Option<&str>), BuilderError> {
    let words: Vec<&str> = token.split_whitespace().collect();
    let parts = match words.as_slice() {
        [column] => Some((*column, None)),
        [column, kw, alias] if kw.eq_ignore_ascii_case("AS") && is_identifier(alias) => {
            Some((*column, Some(*alias)))
        }
        _ => None,
    };
    parts.ok_or_else(|| BuilderError::InvalidColumnToken {
        token: token.trim().to_string(),
    })
}

/// Resolves `column [AS alias]` with `resolve`.
pub(crate) fn parse_select_column<F>(token: &str, resolve: F) -> Result<SelectColumn, BuilderError>
where
    F: FnOnce(&str) -> Result<ColumnReference, BuilderError>,
{
    let (column, alias) = split_column_alias(token)?;
    if !is_column_token(column) {
        return Err(BuilderError::InvalidColumnToken {
            token: token.trim().to_string(),
        });
    }
    let column = resolve(column)?;
    Ok(match alias {
        Some(alias) => SelectColumn::with_alias(column, alias),
        None => SelectColumn::new(column),
    })
}
