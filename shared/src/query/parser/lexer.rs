//! Lexical building blocks shared by the dialect front-ends.
//!
//! Everything here is quote-aware: separators and keywords inside `'...'` or
//! `"..."` are never treated as structure.

use crate::query::ast::{ComparisonOp, Condition, OrderBy, Predicate, SortOrder};
use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while, take_while1},
    character::complete::{char, digit1, multispace0, multispace1},
    combinator::{all_consuming, map_res, not, value},
    error::Error,
    sequence::delimited,
    IResult, Parser,
};

/// Characters allowed in field names.
pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

/// A field name (`username`, `src.ip`, `event_id`).
pub(crate) fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(is_ident_char)(input)
}

/// A case-insensitive keyword that is not immediately followed by more
/// identifier characters.
pub(crate) fn keyword<'a>(word: &'static str, input: &'a str) -> IResult<&'a str, &'a str> {
    let (rest, matched) = tag_no_case(word)(input)?;
    let (rest, ()) = not(take_while1::<_, _, Error<&str>>(is_ident_char)).parse(rest)?;
    Ok((rest, matched))
}

fn like_op(input: &str) -> IResult<&str, &str> {
    keyword("LIKE", input)
}

fn contains_op(input: &str) -> IResult<&str, &str> {
    keyword("CONTAINS", input)
}

/// ` AS alias` following a column or aggregate.
pub(crate) fn alias_suffix(input: &str) -> IResult<&str, &str> {
    let (input, _) = multispace1(input)?;
    let (input, _) = keyword("AS", input)?;
    let (input, _) = multispace1(input)?;
    identifier(input)
}

/// A single- or double-quoted string, returned without its quotes.
pub(crate) fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
        delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
    ))
    .parse(input)
}

/// A literal: quoted string, or a run of non-whitespace characters.
pub(crate) fn literal(input: &str) -> IResult<&str, &str> {
    alt((
        quoted,
        take_while1(|c: char| !c.is_whitespace() && c != '\'' && c != '"'),
    ))
    .parse(input)
}

/// An unsigned count (`LIMIT 5`, `head 10`).
pub(crate) fn count(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse::<usize>).parse(input)
}

/// Parses an entire (trimmed) argument as a count.
pub(crate) fn parse_count(input: &str) -> Option<usize> {
    all_consuming(count)
        .parse(input.trim())
        .ok()
        .map(|(_, n)| n)
}

fn comparison_op(input: &str) -> IResult<&str, ComparisonOp> {
    alt((
        value(ComparisonOp::NotEq, alt((tag("!="), tag("<>")))),
        value(ComparisonOp::GtEq, tag(">=")),
        value(ComparisonOp::LtEq, tag("<=")),
        value(ComparisonOp::Eq, tag("==")),
        value(ComparisonOp::Eq, tag("=")),
        value(ComparisonOp::Gt, tag(">")),
        value(ComparisonOp::Lt, tag("<")),
        value(ComparisonOp::Like, like_op),
        value(ComparisonOp::Contains, contains_op),
    ))
    .parse(input)
}

/// `field <op> literal`, e.g. `action == "failed_login"` or `bytes>100`.
pub(crate) fn predicate(input: &str) -> IResult<&str, Predicate> {
    let (input, field) = identifier(input)?;
    let (input, _) = multispace0(input)?;
    let (input, operator) = comparison_op(input)?;
    let (input, _) = multispace0(input)?;
    let (input, operand) = literal(input)?;

    Ok((input, Predicate::new(field, operator, operand)))
}

/// Parses an AND-joined condition leniently.
///
/// Each AND-separated part contributes the predicate found at its start; any
/// text after that predicate is ignored, and a part with no recognizable
/// predicate is dropped.
pub(crate) fn parse_condition(input: &str) -> Condition {
    let mut predicates = Vec::new();
    for part in split_phrase(input, &["AND"]) {
        let part = part.trim();
        match predicate(part) {
            Ok((rest, predicate)) => {
                if !rest.trim().is_empty() {
                    tracing::debug!(ignored = rest.trim(), "Ignoring text after predicate");
                }
                predicates.push(predicate);
            }
            Err(_) => tracing::debug!(part, "Skipping unrecognized condition"),
        }
    }
    Condition::all(predicates)
}

/// Byte offsets of every character outside quoted strings (quote characters
/// themselves excluded). An unterminated quote runs to the end of input.
fn unquoted_offsets(input: &str) -> Vec<(usize, char)> {
    let mut quote: Option<char> = None;
    let mut offsets = Vec::new();
    for (i, c) in input.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None => offsets.push((i, c)),
        }
    }
    offsets
}

/// Splits on `separator` outside quotes and parentheses.
pub(crate) fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in unquoted_offsets(input) {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

/// Splits on runs of whitespace outside quotes.
pub(crate) fn split_words(input: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut cursor = 0;
    for (i, c) in unquoted_offsets(input) {
        if c.is_whitespace() {
            if i > cursor {
                words.push(&input[cursor..i]);
            }
            cursor = i + c.len_utf8();
        }
    }
    if cursor < input.len() {
        words.push(&input[cursor..]);
    }
    words
}

/// Returns the length of `words` matched at the start of `input`, where the
/// words are separated by whitespace and the last one ends on a word boundary.
fn match_phrase(input: &str, words: &[&'static str]) -> Option<usize> {
    let mut rest = input;
    for (n, word) in words.iter().enumerate() {
        if n > 0 {
            let (r, _) = multispace1::<&str, Error<&str>>(rest).ok()?;
            rest = r;
        }
        let (r, _) = keyword(*word, rest).ok()?;
        rest = r;
    }
    Some(input.len() - rest.len())
}

fn at_word_start(input: &str, offset: usize) -> bool {
    !matches!(input[..offset].chars().next_back(), Some(c) if is_ident_char(c))
}

/// Finds every occurrence of any of the `phrases` outside quotes, in order.
///
/// Returns `(phrase index, start, end)` triples. Matches never overlap.
pub(crate) fn find_phrases(input: &str, phrases: &[&[&'static str]]) -> Vec<(usize, usize, usize)> {
    let mut found = Vec::new();
    let mut next_free = 0;
    for (i, _) in unquoted_offsets(input) {
        if i < next_free || !at_word_start(input, i) {
            continue;
        }
        for (index, words) in phrases.iter().enumerate() {
            if let Some(len) = match_phrase(&input[i..], words) {
                found.push((index, i, i + len));
                next_free = i + len;
                break;
            }
        }
    }
    found
}

/// Splits `input` around every occurrence of `words` outside quotes.
pub(crate) fn split_phrase<'a>(input: &'a str, words: &[&'static str]) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (_, from, to) in find_phrases(input, &[words]) {
        parts.push(&input[start..from]);
        start = to;
    }
    parts.push(&input[start..]);
    parts
}

/// Splits a pipeline command into its lowercased keyword and argument text.
pub(crate) fn command(segment: &str) -> (String, &str) {
    let segment = segment.trim();
    match identifier(segment) {
        Ok((rest, word)) => (word.to_ascii_lowercase(), rest.trim()),
        Err(_) => (String::new(), segment),
    }
}

/// Splits a pipeline on `|` outside quotes, dropping empty segments.
pub(crate) fn split_pipeline(query: &str) -> Vec<&str> {
    split_top_level(query, '|')
        .into_iter()
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// `asc` or `desc`, in any case.
pub(crate) fn sort_direction(word: &str) -> Option<SortOrder> {
    if word.eq_ignore_ascii_case("asc") {
        Some(SortOrder::Asc)
    } else if word.eq_ignore_ascii_case("desc") {
        Some(SortOrder::Desc)
    } else {
        None
    }
}

/// `field [asc|desc]`, falling back to `default` when no direction is given.
/// Anything after the direction is ignored.
pub(crate) fn sort_key(input: &str, default: SortOrder) -> Option<OrderBy> {
    let (rest, field) = identifier(input.trim()).ok()?;
    let order = rest
        .split_whitespace()
        .next()
        .and_then(sort_direction)
        .unwrap_or(default);
    Some(OrderBy {
        field: field.to_string(),
        order,
    })
}
