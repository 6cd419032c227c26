//! SPL (Splunk Search Processing Language) front-end.
//!
//! A query is a `|`-separated list of commands, each compiled to one
//! operation:
//!
//! | Command                     | Operation                              |
//! |-----------------------------|----------------------------------------|
//! | `search f=v [AND] g=w`      | filter, substring match per term       |
//! | `where <condition>`         | filter                                 |
//! | `stats count by f`          | group by `f` and count                 |
//! | `table a, b c`              | project                                |
//! | `head N` / `tail N`         | first / last N records                 |
//! | `sort [-\|+]f [asc\|desc]`  | sort                                   |
//!
//! Unknown commands, and commands whose arguments cannot be understood, are
//! skipped.

use super::lexer::{self, alias_suffix, identifier, keyword, literal};
use super::ParseError;
use crate::query::ast::{
    Aggregate, ComparisonOp, Condition, GroupAggregate, Limit, Operation, Pipeline, Predicate,
    Projection, SortOrder,
};
use nom::{
    bytes::complete::take_while,
    character::complete::{char, multispace0},
    combinator::{all_consuming, opt, recognize},
    sequence::delimited,
    IResult, Parser,
};
use tracing::debug;

/// Compiles an SPL pipeline.
///
/// # Errors
///
/// SPL compilation is lenient and never fails; the `Result` keeps the
/// signature uniform with the other dialects.
///
/// # Example
///
/// ```
/// use shared::query::parser::spl;
///
/// let pipeline = spl::compile("search action=failed_login | head 5").unwrap();
/// assert_eq!(pipeline.len(), 2);
/// ```
pub fn compile(query: &str) -> Result<Pipeline, ParseError> {
    let mut pipeline = Pipeline::new();
    for segment in lexer::split_pipeline(query) {
        let (command, args) = lexer::command(segment);
        let operation = match command.as_str() {
            "search" => search(args),
            "where" => filter(args),
            "stats" => stats(args),
            "table" => table(args),
            "head" => lexer::parse_count(args).map(|n| Operation::Limit(Limit::head(n))),
            "tail" => lexer::parse_count(args).map(|n| Operation::Limit(Limit::tail(n))),
            "sort" => sort(args),
            _ => {
                debug!(segment, "Skipping unknown SPL command");
                continue;
            }
        };
        match operation {
            Some(operation) => pipeline.push(operation),
            None => debug!(segment, "Skipping SPL command with unusable arguments"),
        }
    }
    Ok(pipeline)
}

/// `field=value`, the only term shape `search` understands.
fn search_term(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, field) = identifier(input)?;
    let (input, _) = char('=')(input)?;
    let (input, value) = literal(input)?;
    Ok((input, (field, value)))
}

fn search(args: &str) -> Option<Operation> {
    let mut predicates = Vec::new();
    for word in lexer::split_words(args) {
        if word.eq_ignore_ascii_case("AND") {
            continue;
        }
        match all_consuming(search_term).parse(word) {
            Ok((_, (field, value))) => {
                predicates.push(Predicate::new(
                    field,
                    ComparisonOp::Contains,
                    value.replace('*', ""),
                ));
            }
            Err(_) => debug!(term = word, "Ignoring search term"),
        }
    }
    Some(Operation::Filter(Condition::all(predicates)))
}

fn filter(args: &str) -> Option<Operation> {
    let condition = lexer::parse_condition(args);
    (!condition.is_empty()).then_some(Operation::Filter(condition))
}

/// `count`, `count()`, `count(*)` or `count(field)`, with an optional
/// `as name`. Every form counts rows.
fn count_item(input: &str) -> IResult<&str, Aggregate> {
    let (input, _) = keyword("count", input)?;
    let (input, _) = opt((multispace0, paren_group)).parse(input)?;
    let (input, alias) = opt(alias_suffix).parse(input)?;
    let count = match alias {
        Some(alias) => Aggregate::count().with_alias(alias),
        None => Aggregate::count(),
    };
    Ok((input, count))
}

fn paren_group(input: &str) -> IResult<&str, &str> {
    delimited(char('('), take_while(|c: char| c != ')'), char(')')).parse(input)
}

/// Any other aggregate (`dc(src)`, `avg(bytes) as mean`), skipped whole.
fn other_item(input: &str) -> IResult<&str, &str> {
    recognize((
        take_while(|c: char| !c.is_whitespace() && c != ',' && c != '('),
        opt(paren_group),
        opt(alias_suffix),
    ))
    .parse(input)
}

/// `stats count [as name] by field`. Only counting is supported; anything
/// else in the aggregate list is ignored, and without `by` the command does
/// nothing.
fn stats(args: &str) -> Option<Operation> {
    let parts = lexer::split_phrase(args, &["by"]);
    let [aggregates, group, ..] = parts.as_slice() else {
        return None;
    };
    let (_, group_by) = identifier(group.trim()).ok()?;

    let mut counts = Vec::new();
    let mut rest = *aggregates;
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }
        if let Ok((r, count)) = count_item(rest) {
            counts.push(count);
            rest = r;
            continue;
        }
        match other_item(rest) {
            Ok((r, skipped)) if !skipped.is_empty() => {
                debug!(aggregate = skipped, "Ignoring unsupported stats function");
                rest = r;
            }
            // A stray character such as an unmatched `(`
            _ => rest = &rest[rest.chars().next().map_or(1, char::len_utf8)..],
        }
    }

    Some(Operation::GroupAggregate(GroupAggregate {
        group_by: Some(group_by.to_string()),
        aggregates: counts,
    }))
}

fn table(args: &str) -> Option<Operation> {
    let fields: Vec<Projection> = args
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|f| !f.is_empty())
        .map(Projection::field)
        .collect();
    (!fields.is_empty()).then_some(Operation::Project(fields))
}

/// `sort -f` (descending), `sort +f`, `sort f desc`, `sort - f`.
fn sort(args: &str) -> Option<Operation> {
    let args = args.trim();
    let (default, key) = if let Some(rest) = args.strip_prefix('-') {
        (SortOrder::Desc, rest)
    } else if let Some(rest) = args.strip_prefix('+') {
        (SortOrder::Asc, rest)
    } else {
        (SortOrder::Asc, args)
    };
    lexer::sort_key(key, default).map(Operation::Sort)
}
