//! Clause-boundary scanning.
//!
//! The text grammar is split rather than tokenized: a single pass over the
//! input tracks parenthesis depth and whether it is inside a single-quoted
//! string, and reports only what sits at depth zero outside strings (words,
//! commas and comparison symbols). Everything else is left inside the slices
//! handed back to the caller.

use super::Keyword;
use crate::parser::ParseError;

/// What to split a segment on.
#[derive(Debug, Clone, Copy)]
pub enum Delimiter<'k> {
    /// Top-level commas.
    Comma,
    /// Top-level occurrences of any of these keywords.
    Keywords(&'k [Keyword]),
}

/// A top-level piece of the input, as byte ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece {
    Word(usize, usize),
    Comma(usize),
    Symbol(usize, usize),
}

const fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '$') || !c.is_ascii()
}

const fn is_symbol_char(c: char) -> bool {
    matches!(c, '=' | '<' | '>' | '!')
}

/// Scans `text` once and returns its top-level pieces.
fn scan(text: &str) -> Result<Vec<Piece>, ParseError> {
    let mut pieces = Vec::new();
    let mut open_parens: Vec<usize> = Vec::new();
    let mut string_start: Option<usize> = None;
    let mut run: Option<(usize, bool)> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if string_start.is_some() {
            if c == '\'' {
                // '' is an escaped quote inside the literal
                if chars.peek().is_some_and(|&(_, next)| next == '\'') {
                    chars.next();
                } else {
                    string_start = None;
                }
            }
            continue;
        }

        let top = open_parens.is_empty();
        let symbol = is_symbol_char(c);
        if top && (is_word_char(c) || symbol) {
            match run {
                Some((_, is_symbol)) if is_symbol == symbol => continue,
                Some((start, is_symbol)) => pieces.push(close_run(start, i, is_symbol)),
                None => {}
            }
            run = Some((i, symbol));
            continue;
        }

        if let Some((start, is_symbol)) = run.take() {
            pieces.push(close_run(start, i, is_symbol));
        }

        match c {
            '\'' => string_start = Some(i),
            '(' => open_parens.push(i),
            ')' => {
                if open_parens.pop().is_none() {
                    return Err(ParseError::syntax(format!("unbalanced ')' at byte {i}")));
                }
            }
            ',' if top => pieces.push(Piece::Comma(i)),
            _ => {}
        }
    }

    if let Some((start, is_symbol)) = run {
        pieces.push(close_run(start, text.len(), is_symbol));
    }
    if let Some(position) = string_start {
        return Err(ParseError::Unterminated {
            what: "string literal",
            position,
        });
    }
    if let Some(&position) = open_parens.last() {
        return Err(ParseError::Unterminated {
            what: "parenthesis",
            position,
        });
    }
    Ok(pieces)
}

const fn close_run(start: usize, end: usize, is_symbol: bool) -> Piece {
    if is_symbol {
        Piece::Symbol(start, end)
    } else {
        Piece::Word(start, end)
    }
}

/// Top-level words of `text` that are one of `keywords`, with their ranges.
fn keyword_positions(
    text: &str,
    keywords: &[Keyword],
) -> Result<Vec<(Keyword, usize, usize)>, ParseError> {
    Ok(scan(text)?
        .into_iter()
        .filter_map(|piece| match piece {
            Piece::Word(start, end) => Keyword::lookup(&text[start..end])
                .filter(|kw| keywords.contains(kw))
                .map(|kw| (kw, start, end)),
            _ => None,
        })
        .collect())
}

/// Checks that every string literal and parenthesis in `text` is closed.
///
/// # Errors
///
/// Returns `ParseError::Unterminated` for the first unclosed construct, or
/// `ParseError::Syntax` for a stray `)`.
pub fn check_balanced(text: &str) -> Result<(), ParseError> {
    scan(text).map(|_| ())
}

/// Splits off the first whitespace-delimited word.
///
/// Returns the word and the remainder with leading whitespace removed, or
/// `None` for blank input. Use [`Keyword::lookup`] to match the word.
#[must_use]
pub fn next_token(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    let end = text.find(char::is_whitespace).unwrap_or(text.len());
    Some((&text[..end], text[end..].trim_start()))
}

/// Returns the keyword `text` starts with, if it is one of `keywords`. Does
/// not consume anything.
#[must_use]
pub fn starts_with(text: &str, keywords: &[Keyword]) -> Option<Keyword> {
    let (word, _) = next_token(text)?;
    // "(SELECT" and "users," should still see their leading word
    let word = word
        .split(|c: char| !is_word_char(c))
        .next()
        .unwrap_or(word);
    Keyword::lookup(word).filter(|kw| keywords.contains(kw))
}

/// Splits `text` on a top-level delimiter and trims each segment.
///
/// Delimiters nested in parentheses or inside string literals are ignored.
/// Empty segments are kept so callers can reject them.
///
/// # Errors
///
/// Returns a `ParseError` if a string literal or parenthesis is unbalanced.
pub fn split_top_level<'a>(
    text: &'a str,
    delimiter: Delimiter<'_>,
) -> Result<Vec<&'a str>, ParseError> {
    let cuts: Vec<(usize, usize)> = match delimiter {
        Delimiter::Comma => scan(text)?
            .into_iter()
            .filter_map(|piece| match piece {
                Piece::Comma(at) => Some((at, at + 1)),
                _ => None,
            })
            .collect(),
        Delimiter::Keywords(keywords) => keyword_positions(text, keywords)?
            .into_iter()
            .map(|(_, start, end)| (start, end))
            .collect(),
    };

    let mut segments = Vec::with_capacity(cuts.len() + 1);
    let mut from = 0;
    for (start, end) in cuts {
        segments.push(text[from..start].trim());
        from = end;
    }
    segments.push(text[from..].trim());
    Ok(segments)
}

/// Finds the first top-level occurrence of any stop keyword.
///
/// Returns the trimmed text before it, the keyword, and the trimmed text
/// after it; `None` when no stop keyword occurs, in which case the caller
/// treats the whole input as the final clause.
///
/// # Errors
///
/// Returns a `ParseError` if a string literal or parenthesis is unbalanced.
pub fn extract_until<'a>(
    text: &'a str,
    stop: &[Keyword],
) -> Result<Option<(&'a str, Keyword, &'a str)>, ParseError> {
    Ok(keyword_positions(text, stop)?
        .first()
        .map(|&(kw, start, end)| (text[..start].trim(), kw, text[end..].trim())))
}

/// Splits `text` at every top-level keyword in `keywords`.
///
/// Returns the text before the first keyword and each keyword with the text
/// that follows it up to the next one.
///
/// # Errors
///
/// Returns a `ParseError` if a string literal or parenthesis is unbalanced.
pub fn split_clauses<'a>(
    text: &'a str,
    keywords: &[Keyword],
) -> Result<(&'a str, Vec<(Keyword, &'a str)>), ParseError> {
    let positions = keyword_positions(text, keywords)?;
    let head_end = positions.first().map_or(text.len(), |&(_, start, _)| start);

    let mut clauses = Vec::with_capacity(positions.len());
    for (i, &(kw, _, end)) in positions.iter().enumerate() {
        let next = positions.get(i + 1).map_or(text.len(), |&(_, start, _)| start);
        clauses.push((kw, text[end..next].trim()));
    }
    Ok((text[..head_end].trim(), clauses))
}

/// Splits a comparison at its top-level operator: a run of `= < > !` or the
/// word `LIKE`.
///
/// Returns the trimmed left side, the operator text and the trimmed right
/// side, or `None` when there is no operator.
///
/// # Errors
///
/// Returns a `ParseError` if a string literal or parenthesis is unbalanced,
/// or if there is more than one operator.
pub fn split_operator(text: &str) -> Result<Option<(&str, &str, &str)>, ParseError> {
    let operators: Vec<(usize, usize)> = scan(text)?
        .into_iter()
        .filter_map(|piece| match piece {
            Piece::Symbol(start, end) => Some((start, end)),
            Piece::Word(start, end) if text[start..end].eq_ignore_ascii_case("LIKE") => {
                Some((start, end))
            }
            _ => None,
        })
        .collect();

    match operators.as_slice() {
        [] => Ok(None),
        [(start, end)] => Ok(Some((
            text[..*start].trim(),
            &text[*start..*end],
            text[*end..].trim(),
        ))),
        _ => Err(ParseError::syntax(format!(
            "expected a single comparison in '{}'",
            text.trim()
        ))),
    }
}

/// Returns the inside of `text` if it is wrapped in one pair of parentheses
/// that spans the whole input, e.g. `(a = 1 OR b = 2)`.
#[must_use]
pub fn strip_parens(text: &str) -> Option<&str> {
    let inner = text.trim().strip_prefix('(')?.strip_suffix(')')?;
    // "(a) AND (b)" also starts and ends with parens; its inside is unbalanced
    let mut depth = 0usize;
    let mut in_string = false;
    for c in inner.chars() {
        match c {
            '\'' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => {
                if depth == 0 {
                    return None;
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    (depth == 0).then_some(inner.trim())
}
