//! Keywords of the query dialect.

/// Keywords recognised at clause boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // Statements
    With,
    Select,
    Insert,
    Update,
    Delete,

    // Clauses
    From,
    Where,
    Set,
    Returning,
    Into,
    Values,
    As,

    // Joins (builder only)
    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    Cross,
    On,

    // Condition operators
    And,
    Or,
    Like,

    // Recognised but not modelled
    Distinct,
    Recursive,
    Order,
    Group,
    Having,
    Limit,
    Offset,
    Union,
    Intersect,
    Except,
}

impl Keyword {
    /// Statement keywords a query may start with (after an optional WITH).
    pub const STATEMENTS: &'static [Self] =
        &[Self::Select, Self::Insert, Self::Update, Self::Delete];

    /// Every keyword that starts a JOIN, however it is spelled.
    pub const JOINS: &'static [Self] = &[
        Self::Join,
        Self::Inner,
        Self::Left,
        Self::Right,
        Self::Full,
        Self::Cross,
    ];

    /// Clause keywords of SQL the dialect does not model.
    pub const UNSUPPORTED: &'static [Self] = &[
        Self::Order,
        Self::Group,
        Self::Having,
        Self::Limit,
        Self::Offset,
        Self::Union,
        Self::Intersect,
        Self::Except,
    ];

    /// Keywords that open a clause inside a statement.
    pub const CLAUSES: &'static [Self] = &[
        Self::From,
        Self::Where,
        Self::Set,
        Self::Returning,
        Self::Into,
        Self::Values,
        Self::Join,
        Self::Inner,
        Self::Left,
        Self::Right,
        Self::Full,
        Self::Cross,
        Self::Order,
        Self::Group,
        Self::Having,
        Self::Limit,
        Self::Offset,
        Self::Union,
        Self::Intersect,
        Self::Except,
    ];

    /// Looks a word up, ignoring ASCII case.
    #[must_use]
    pub fn lookup(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "WITH" => Some(Self::With),
            "SELECT" => Some(Self::Select),
            "INSERT" => Some(Self::Insert),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            "FROM" => Some(Self::From),
            "WHERE" => Some(Self::Where),
            "SET" => Some(Self::Set),
            "RETURNING" => Some(Self::Returning),
            "INTO" => Some(Self::Into),
            "VALUES" => Some(Self::Values),
            "AS" => Some(Self::As),
            "JOIN" => Some(Self::Join),
            "INNER" => Some(Self::Inner),
            "LEFT" => Some(Self::Left),
            "RIGHT" => Some(Self::Right),
            "FULL" => Some(Self::Full),
            "OUTER" => Some(Self::Outer),
            "CROSS" => Some(Self::Cross),
            "ON" => Some(Self::On),
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "LIKE" => Some(Self::Like),
            "DISTINCT" => Some(Self::Distinct),
            "RECURSIVE" => Some(Self::Recursive),
            "ORDER" => Some(Self::Order),
            "GROUP" => Some(Self::Group),
            "HAVING" => Some(Self::Having),
            "LIMIT" => Some(Self::Limit),
            "OFFSET" => Some(Self::Offset),
            "UNION" => Some(Self::Union),
            "INTERSECT" => Some(Self::Intersect),
            "EXCEPT" => Some(Self::Except),
            _ => None,
        }
    }

    /// Returns the canonical spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::With => "WITH",
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::From => "FROM",
            Self::Where => "WHERE",
            Self::Set => "SET",
            Self::Returning => "RETURNING",
            Self::Into => "INTO",
            Self::Values => "VALUES",
            Self::As => "AS",
            Self::Join => "JOIN",
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Full => "FULL",
            Self::Outer => "OUTER",
            Self::Cross => "CROSS",
            Self::On => "ON",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Like => "LIKE",
            Self::Distinct => "DISTINCT",
            Self::Recursive => "RECURSIVE",
            Self::Order => "ORDER",
            Self::Group => "GROUP",
            Self::Having => "HAVING",
            Self::Limit => "LIMIT",
            Self::Offset => "OFFSET",
            Self::Union => "UNION",
            Self::Intersect => "INTERSECT",
            Self::Except => "EXCEPT",
        }
    }

    /// Returns true if the keyword opens any JOIN spelling.
    #[must_use]
    pub fn is_join(&self) -> bool {
        Self::JOINS.contains(self)
    }
}

impl core::fmt::Display for Keyword {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(Keyword::lookup("select"), Some(Keyword::Select));
        assert_eq!(Keyword::lookup("ReTuRnInG"), Some(Keyword::Returning));
        assert_eq!(Keyword::lookup("users"), None);
    }

    #[test]
    fn test_canonical_spelling_round_trips() {
        for kw in Keyword::CLAUSES.iter().chain(Keyword::STATEMENTS) {
            assert_eq!(Keyword::lookup(kw.as_str()), Some(*kw));
        }
    }

    #[test]
    fn test_join_spellings() {
        assert!(Keyword::Left.is_join());
        assert!(Keyword::Cross.is_join());
        assert!(!Keyword::Outer.is_join());
        assert!(!Keyword::Where.is_join());
    }
}
