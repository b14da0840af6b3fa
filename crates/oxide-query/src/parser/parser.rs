//! Recursive-descent parser for the query dialect.
//!
//! Parsing runs in two passes. The first cuts the text into a plan of clause
//! slices, enforcing clause order and rejecting constructs the dialect does
//! not model; it only raises [`ParseError`]. The second replays the plan on
//! the query builder, so every table and column is resolved exactly as a
//! builder caller's would be and both paths produce the same AST.

use tracing::{debug, trace};

use super::error::ParseError;
use crate::ast::{Condition, SqlQuery};
use crate::builder::{BuilderError, ConditionBuilder, HasColumns, QueryBuilder, SelectBuilder};
use crate::lexer::{
    Delimiter, Keyword, check_balanced, extract_until, next_token, split_clauses, split_operator,
    split_top_level, starts_with, strip_parens,
};
use crate::schema::Database;

/// Parses query text against a schema.
///
/// # Example
///
/// ```rust
/// use oxide_query::parser::Parser;
/// use oxide_query::schema::{DataType, Database, Table};
///
/// let db = Database::builder()
///     .table(
///         Table::builder("users")
///             .column("id", DataType::Integer)
///             .primary_key("id"),
///     )
///     .build()
///     .unwrap();
///
/// let parser = Parser::new(&db);
/// let query = parser.parse("select id from USERS where id = :id;").unwrap();
/// assert_eq!(query.to_string(), "SELECT id FROM users WHERE id = :id");
/// assert!(parser.parse("SELECT id FROM users JOIN orders ON id = id").is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Parser<'db> {
    database: &'db Database,
}

impl<'db> Parser<'db> {
    /// Creates a parser for a schema.
    #[must_use]
    pub const fn new(database: &'db Database) -> Self {
        Self { database }
    }

    /// Parses one query.
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` for malformed or unsupported text, and the
    /// builder or context error for references the schema does not allow.
    /// Nothing is returned for a query that fails anywhere.
    pub fn parse(&self, sql: &str) -> crate::Result<SqlQuery> {
        check_balanced(sql)?;
        let text = sql.trim();
        let text = text.strip_suffix(';').unwrap_or(text).trim_end();

        let (ctes, statement) = parse_query(text)?;

        let mut builder = QueryBuilder::new(self.database);
        for (alias, body) in &ctes {
            builder = builder.with(alias, |qb| body.build(qb))?;
        }
        let query = statement.build(&builder)?;
        debug!(
            statement = statement.keyword().as_str(),
            ctes = ctes.len(),
            "statement parsed"
        );
        Ok(query)
    }
}

/// Parses one query against a schema.
///
/// # Errors
///
/// See [`Parser::parse`].
pub fn parse_sql(database: &Database, sql: &str) -> crate::Result<SqlQuery> {
    Parser::new(database).parse(sql)
}

/// Named CTE plans followed by the statement plan.
type QueryPlan<'t> = (Vec<(&'t str, SelectPlan<'t>)>, StatementPlan<'t>);

/// Splits `[WITH cte, ...] statement` into CTE plans and a statement plan.
fn parse_query(text: &str) -> Result<QueryPlan<'_>, ParseError> {
    let Some((word, rest)) = next_token(text) else {
        return Err(ParseError::UnexpectedEnd {
            expected: String::from("a statement"),
        });
    };

    if Keyword::lookup(word) != Some(Keyword::With) {
        return Ok((Vec::new(), parse_statement(word, rest)?));
    }

    if starts_with(rest, &[Keyword::Recursive]).is_some() {
        return Err(ParseError::unsupported("WITH RECURSIVE"));
    }
    let Some((ctes, keyword, body)) = extract_until(rest, Keyword::STATEMENTS)? else {
        return Err(ParseError::UnexpectedEnd {
            expected: String::from("a statement after WITH"),
        });
    };
    let ctes = split_top_level(ctes, Delimiter::Comma)?
        .into_iter()
        .map(parse_cte)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((ctes, parse_statement(keyword.as_str(), body)?))
}

/// Parses `alias AS ( SELECT ... )`.
fn parse_cte(text: &str) -> Result<(&str, SelectPlan<'_>), ParseError> {
    let missing_body = || ParseError::UnexpectedEnd {
        expected: String::from("a CTE of the form name AS (SELECT ...)"),
    };
    let (alias, rest) = next_token(text).ok_or_else(missing_body)?;
    let (as_kw, rest) = next_token(rest).ok_or_else(missing_body)?;
    if Keyword::lookup(as_kw) != Some(Keyword::As) {
        return Err(ParseError::syntax(format!(
            "expected AS after CTE name '{alias}', found '{as_kw}'"
        )));
    }
    let body = strip_parens(rest).ok_or_else(|| {
        ParseError::syntax(format!("CTE '{alias}' must be wrapped in parentheses"))
    })?;
    let (keyword, body) = next_token(body).ok_or_else(missing_body)?;
    match Keyword::lookup(keyword) {
        Some(Keyword::Select) => Ok((alias, SelectPlan::parse(body)?)),
        Some(Keyword::With) => Err(ParseError::unsupported("nested WITH")),
        Some(Keyword::Insert | Keyword::Update | Keyword::Delete) => {
            Err(ParseError::unsupported(format!("{} in a CTE", keyword.to_ascii_uppercase())))
        }
        _ => Err(ParseError::UnknownKeyword {
            keyword: keyword.to_string(),
        }),
    }
}

fn parse_statement<'t>(
    keyword: &str,
    body: &'t str,
) -> Result<StatementPlan<'t>, ParseError> {
    match Keyword::lookup(keyword) {
        Some(Keyword::Select) => SelectPlan::parse(body).map(StatementPlan::Select),
        Some(Keyword::Insert) => InsertPlan::parse(body).map(StatementPlan::Insert),
        Some(Keyword::Update) => UpdatePlan::parse(body).map(StatementPlan::Update),
        Some(Keyword::Delete) => DeletePlan::parse(body).map(StatementPlan::Delete),
        _ => Err(ParseError::UnknownKeyword {
            keyword: keyword.to_string(),
        }),
    }
}

/// Assigns every clause to its slot in `allowed`, which lists the clauses of
/// `statement` in the only order they may appear.
fn order_clauses<'t, const N: usize>(
    statement: Keyword,
    clauses: Vec<(Keyword, &'t str)>,
    allowed: [Keyword; N],
) -> Result<[Option<&'t str>; N], ParseError> {
    let mut slots = [None; N];
    let mut last: Option<usize> = None;
    for (keyword, body) in clauses {
        trace!(clause = keyword.as_str(), body, "clause segment");
        if keyword.is_join() {
            return Err(ParseError::unsupported("JOIN"));
        }
        if Keyword::UNSUPPORTED.contains(&keyword) {
            return Err(ParseError::unsupported(match keyword {
                Keyword::Order => "ORDER BY",
                Keyword::Group => "GROUP BY",
                other => other.as_str(),
            }));
        }
        let position = allowed.iter().position(|k| *k == keyword);
        match position {
            Some(i) if last.map_or(true, |l| i > l) => {
                if body.is_empty() {
                    return Err(ParseError::UnexpectedEnd {
                        expected: format!("text after {keyword}"),
                    });
                }
                slots[i] = Some(body);
                last = Some(i);
            }
            _ => {
                return Err(ParseError::ClauseOutOfOrder {
                    clause: keyword.as_str().to_string(),
                    statement: statement.as_str().to_string(),
                });
            }
        }
    }
    Ok(slots)
}

fn required<'t>(
    slot: Option<&'t str>,
    clause: Keyword,
    statement: Keyword,
) -> Result<&'t str, ParseError> {
    slot.ok_or_else(|| ParseError::MissingClause {
        clause: clause.as_str().to_string(),
        statement: statement.as_str().to_string(),
    })
}

/// Text before the first clause keyword must be empty for DELETE and INSERT.
fn expect_empty_head(head: &str, next: Keyword) -> Result<(), ParseError> {
    if head.is_empty() {
        Ok(())
    } else {
        Err(ParseError::syntax(format!("unexpected '{head}' before {next}")))
    }
}

/// Splits a comma list, rejecting empty entries.
fn comma_list(text: &str) -> Result<Vec<&str>, ParseError> {
    let items = split_top_level(text, Delimiter::Comma)?;
    if items.iter().any(|item| item.is_empty()) {
        return Err(ParseError::syntax(format!("empty entry in list '{text}'")));
    }
    Ok(items)
}

/// A table in FROM, UPDATE, DELETE FROM or INSERT INTO.
fn table_text(text: &str) -> Result<&str, ParseError> {
    if text.starts_with('(') {
        return Err(ParseError::unsupported("subquery"));
    }
    // "FROM a, b" is an implicit join
    if split_top_level(text, Delimiter::Comma)?.len() > 1 {
        return Err(ParseError::unsupported("JOIN"));
    }
    Ok(text)
}

/// A parsed but unresolved WHERE condition.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConditionPlan<'t> {
    Compare(&'t str, &'t str, &'t str),
    And(Box<Self>, Box<Self>),
    Or(Box<Self>, Box<Self>),
}

impl<'t> ConditionPlan<'t> {
    /// `a OR b` binds loosest, then `a AND b`, then parentheses and
    /// comparisons. Both fold to the left.
    fn parse(text: &'t str) -> Result<Self, ParseError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ParseError::UnexpectedEnd {
                expected: String::from("a condition"),
            });
        }
        Self::fold(text, Keyword::Or, Self::parse_conjunction, |l, r| {
            Self::Or(Box::new(l), Box::new(r))
        })
    }

    fn parse_conjunction(text: &'t str) -> Result<Self, ParseError> {
        Self::fold(text, Keyword::And, Self::parse_atom, |l, r| {
            Self::And(Box::new(l), Box::new(r))
        })
    }

    fn fold(
        text: &'t str,
        keyword: Keyword,
        operand: fn(&'t str) -> Result<Self, ParseError>,
        combine: fn(Self, Self) -> Self,
    ) -> Result<Self, ParseError> {
        let mut parts = split_top_level(text, Delimiter::Keywords(&[keyword]))?.into_iter();
        let first = parts.next().unwrap_or_default();
        parts.try_fold(
            operand(first)?,
            |acc, part| -> Result<Self, ParseError> {
                Ok(combine(acc, operand(part)?))
            },
        )
    }

    fn parse_atom(text: &'t str) -> Result<Self, ParseError> {
        if text.is_empty() {
            return Err(ParseError::UnexpectedEnd {
                expected: String::from("a comparison"),
            });
        }
        if let Some(inner) = strip_parens(text) {
            return Self::parse(inner);
        }
        match split_operator(text)? {
            Some((lhs, op, rhs)) if !lhs.is_empty() && !rhs.is_empty() => {
                Ok(Self::Compare(lhs, op, rhs))
            }
            Some(_) => Err(ParseError::syntax(format!("incomplete comparison '{text}'"))),
            None => Err(ParseError::syntax(format!("expected a comparison, found '{text}'"))),
        }
    }

    fn build(&self, b: &ConditionBuilder<'_, '_>) -> Result<Condition, BuilderError> {
        match self {
            Self::Compare(lhs, op, rhs) => b.filter(*lhs, op, *rhs),
            Self::And(l, r) => Ok(l.build(b)?.and(r.build(b)?)),
            Self::Or(l, r) => Ok(l.build(b)?.or(r.build(b)?)),
        }
    }
}

#[derive(Debug)]
struct SelectPlan<'t> {
    columns: Vec<&'t str>,
    from: &'t str,
    condition: Option<ConditionPlan<'t>>,
}

impl<'t> SelectPlan<'t> {
    /// Parses everything after `SELECT`.
    fn parse(text: &'t str) -> Result<Self, ParseError> {
        if text.is_empty() {
            return Err(ParseError::UnexpectedEnd {
                expected: String::from("a column list"),
            });
        }
        if starts_with(text, &[Keyword::Distinct]).is_some() {
            return Err(ParseError::unsupported("DISTINCT"));
        }
        let (head, clauses) = split_clauses(text, Keyword::CLAUSES)?;
        let [from, condition] =
            order_clauses(Keyword::Select, clauses, [Keyword::From, Keyword::Where])?;
        if head.is_empty() {
            return Err(ParseError::UnexpectedEnd {
                expected: String::from("a column list"),
            });
        }
        Ok(Self {
            columns: comma_list(head)?,
            from: table_text(required(from, Keyword::From, Keyword::Select)?)?,
            condition: condition.map(ConditionPlan::parse).transpose()?,
        })
    }

    fn build<'db>(
        &self,
        qb: &QueryBuilder<'db>,
    ) -> Result<SelectBuilder<'db, HasColumns>, BuilderError> {
        let select = qb.select().from(self.from)?.columns(&self.columns)?;
        match &self.condition {
            Some(condition) => select.where_clause(|b| condition.build(b)),
            None => Ok(select),
        }
    }
}

#[derive(Debug)]
struct UpdatePlan<'t> {
    table: &'t str,
    assignments: Vec<(&'t str, &'t str)>,
    condition: Option<ConditionPlan<'t>>,
    returning: Option<Vec<&'t str>>,
}

impl<'t> UpdatePlan<'t> {
    /// Parses everything after `UPDATE`.
    fn parse(text: &'t str) -> Result<Self, ParseError> {
        let (head, clauses) = split_clauses(text, Keyword::CLAUSES)?;
        let [set, condition, returning] = order_clauses(
            Keyword::Update,
            clauses,
            [Keyword::Set, Keyword::Where, Keyword::Returning],
        )?;
        if head.is_empty() {
            return Err(ParseError::UnexpectedEnd {
                expected: String::from("a table after UPDATE"),
            });
        }
        let assignments = comma_list(required(set, Keyword::Set, Keyword::Update)?)?
            .into_iter()
            .map(|assignment| match split_operator(assignment)? {
                Some((column, "=", value)) if !column.is_empty() && !value.is_empty() => {
                    Ok((column, value))
                }
                _ => Err(ParseError::syntax(format!(
                    "expected column = value, found '{assignment}'"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            table: table_text(head)?,
            assignments,
            condition: condition.map(ConditionPlan::parse).transpose()?,
            returning: returning.map(comma_list).transpose()?,
        })
    }

    fn build(&self, qb: &QueryBuilder<'_>) -> Result<SqlQuery, BuilderError> {
        let Some(((column, value), rest)) = self.assignments.split_first() else {
            return Err(BuilderError::EmptyColumnList);
        };
        let mut update = qb.update(self.table)?.set(column, *value)?;
        for (column, value) in rest {
            update = update.set(column, *value)?;
        }
        if let Some(condition) = &self.condition {
            update = update.where_clause(|b| condition.build(b))?;
        }
        if let Some(returning) = &self.returning {
            update = update.returning(returning)?;
        }
        Ok(update.query())
    }
}

#[derive(Debug)]
struct DeletePlan<'t> {
    table: &'t str,
    condition: Option<ConditionPlan<'t>>,
    returning: Option<Vec<&'t str>>,
}

impl<'t> DeletePlan<'t> {
    /// Parses everything after `DELETE`.
    fn parse(text: &'t str) -> Result<Self, ParseError> {
        let (head, clauses) = split_clauses(text, Keyword::CLAUSES)?;
        let [from, condition, returning] = order_clauses(
            Keyword::Delete,
            clauses,
            [Keyword::From, Keyword::Where, Keyword::Returning],
        )?;
        let from = required(from, Keyword::From, Keyword::Delete)?;
        expect_empty_head(head, Keyword::From)?;
        Ok(Self {
            table: table_text(from)?,
            condition: condition.map(ConditionPlan::parse).transpose()?,
            returning: returning.map(comma_list).transpose()?,
        })
    }

    fn build(&self, qb: &QueryBuilder<'_>) -> Result<SqlQuery, BuilderError> {
        let mut delete = qb.delete_from(self.table)?;
        if let Some(condition) = &self.condition {
            delete = delete.where_clause(|b| condition.build(b))?;
        }
        if let Some(returning) = &self.returning {
            delete = delete.returning(returning)?;
        }
        Ok(delete.query())
    }
}

#[derive(Debug)]
struct InsertPlan<'t> {
    table: &'t str,
    values: Vec<(&'t str, &'t str)>,
    returning: Option<Vec<&'t str>>,
}

impl<'t> InsertPlan<'t> {
    /// Parses everything after `INSERT`.
    fn parse(text: &'t str) -> Result<Self, ParseError> {
        let (head, clauses) = split_clauses(text, Keyword::CLAUSES)?;
        let [into, values, returning] = order_clauses(
            Keyword::Insert,
            clauses,
            [Keyword::Into, Keyword::Values, Keyword::Returning],
        )?;
        let into = required(into, Keyword::Into, Keyword::Insert)?;
        let values = required(values, Keyword::Values, Keyword::Insert)?;
        expect_empty_head(head, Keyword::Into)?;

        let Some(open) = into.find('(') else {
            return Err(ParseError::syntax(format!(
                "INSERT INTO {into} requires a column list"
            )));
        };
        let columns = strip_parens(&into[open..]).ok_or_else(|| {
            ParseError::syntax(format!("malformed column list '{}'", &into[open..]))
        })?;
        let columns = comma_list(columns)?;

        let row = match strip_parens(values) {
            Some(row) => row,
            None if split_top_level(values, Delimiter::Comma)?.len() > 1 => {
                return Err(ParseError::unsupported("multi-row VALUES"));
            }
            None => {
                return Err(ParseError::syntax(format!(
                    "VALUES must be wrapped in parentheses, found '{values}'"
                )));
            }
        };
        let row = comma_list(row)?;
        if row.len() != columns.len() {
            return Err(ParseError::syntax(format!(
                "{} columns but {} values",
                columns.len(),
                row.len()
            )));
        }

        Ok(Self {
            table: table_text(into[..open].trim())?,
            values: columns.into_iter().zip(row).collect(),
            returning: returning.map(comma_list).transpose()?,
        })
    }

    fn build(&self, qb: &QueryBuilder<'_>) -> Result<SqlQuery, BuilderError> {
        let mut insert = qb.insert_into(self.table)?.values(&self.values)?;
        if let Some(returning) = &self.returning {
            insert = insert.returning(returning)?;
        }
        Ok(insert.query())
    }
}

#[derive(Debug)]
enum StatementPlan<'t> {
    Select(SelectPlan<'t>),
    Insert(InsertPlan<'t>),
    Update(UpdatePlan<'t>),
    Delete(DeletePlan<'t>),
}

impl StatementPlan<'_> {
    const fn keyword(&self) -> Keyword {
        match self {
            Self::Select(_) => Keyword::Select,
            Self::Insert(_) => Keyword::Insert,
            Self::Update(_) => Keyword::Update,
            Self::Delete(_) => Keyword::Delete,
        }
    }

    fn build(&self, qb: &QueryBuilder<'_>) -> Result<SqlQuery, BuilderError> {
        match self {
            Self::Select(plan) => plan.build(qb).map(|select| select.query()),
            Self::Insert(plan) => plan.build(qb),
            Self::Update(plan) => plan.build(qb),
            Self::Delete(plan) => plan.build(qb),
        }
    }
}
