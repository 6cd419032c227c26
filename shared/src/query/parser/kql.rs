//! KQL (Kusto Query Language) front-end.
//!
//! ```text
//! auth_logs
//! | where action == "failed_login"
//! | summarize count() by username
//! | where count > 2
//! | sort by count desc
//! | take 10
//! ```
//!
//! A leading bare name is the table and is dropped; a query may also start
//! straight with a command. Each segment is one command; unknown commands and
//! unusable arguments are skipped.

use super::lexer::{self, identifier};
use super::ParseError;
use crate::query::ast::{
    Aggregate, Condition, GroupAggregate, Limit, Operation, Pipeline, Projection, SortOrder,
};
use nom::{
    bytes::complete::tag,
    character::complete::multispace0,
    combinator::{all_consuming, opt},
    sequence::terminated,
    IResult, Parser,
};
use tracing::debug;

/// Compiles a KQL pipeline.
///
/// # Errors
///
/// KQL compilation is lenient and never fails; the `Result` keeps the
/// signature uniform with the other dialects.
///
/// # Example
///
/// ```
/// use shared::query::parser::kql;
///
/// let pipeline = kql::compile("auth_logs | take 5").unwrap();
/// assert_eq!(pipeline.to_string(), "LIMIT 5");
/// ```
pub fn compile(query: &str) -> Result<Pipeline, ParseError> {
    let mut pipeline = Pipeline::new();
    let mut segments = lexer::split_pipeline(query).into_iter().peekable();
    if let Some(table) = segments.next_if(|segment| is_table_name(segment)) {
        debug!(table, "KQL table");
    }

    for segment in segments {
        let (command, args) = lexer::command(segment);
        let operation = match command.as_str() {
            "where" => filter(args),
            "summarize" => summarize(args),
            "project" => project(args),
            "take" => lexer::parse_count(args).map(|n| Operation::Limit(Limit::head(n))),
            "sort" => sort(args),
            _ => {
                debug!(segment, "Skipping unknown KQL command");
                continue;
            }
        };
        match operation {
            Some(operation) => pipeline.push(operation),
            None => debug!(segment, "Skipping KQL command with unusable arguments"),
        }
    }
    Ok(pipeline)
}

const COMMANDS: [&str; 5] = ["where", "summarize", "project", "take", "sort"];

/// A lone identifier that is not itself a command.
fn is_table_name(segment: &str) -> bool {
    all_consuming(identifier)
        .parse(segment.trim())
        .is_ok_and(|(_, name)| !COMMANDS.iter().any(|c| c.eq_ignore_ascii_case(name)))
}

/// A single predicate; anything after it (such as `and ...`) is ignored.
fn filter(args: &str) -> Option<Operation> {
    let (rest, predicate) = lexer::predicate(args.trim()).ok()?;
    if !rest.trim().is_empty() {
        debug!(ignored = rest.trim(), "Ignoring text after KQL predicate");
    }
    Some(Operation::Filter(Condition::all(vec![predicate])))
}

/// `name = ` prefix of a KQL column expression.
fn assignment(input: &str) -> IResult<&str, &str> {
    terminated(identifier, (multispace0, tag("="), multispace0)).parse(input)
}

/// `[name =] count()`
fn count_call(input: &str) -> Option<Aggregate> {
    let (call, alias) = opt(assignment).parse(input.trim()).ok()?;
    let call: String = call.chars().filter(|c| !c.is_whitespace()).collect();
    if !call.eq_ignore_ascii_case("count()") {
        debug!(aggregate = input.trim(), "Ignoring unsupported summarize function");
        return None;
    }
    Some(match alias {
        Some(alias) => Aggregate::count().with_alias(alias),
        None => Aggregate::count(),
    })
}

/// `summarize [name =] count() by field`. Without `count()` only the group
/// keys are emitted; without `by` the command does nothing.
fn summarize(args: &str) -> Option<Operation> {
    let parts = lexer::split_phrase(args, &["by"]);
    let [aggregates, group, ..] = parts.as_slice() else {
        return None;
    };
    let (_, group_by) = identifier(group.trim()).ok()?;

    let aggregates = lexer::split_top_level(aggregates, ',')
        .into_iter()
        .filter(|item| !item.trim().is_empty())
        .filter_map(count_call)
        .collect();

    Some(Operation::GroupAggregate(GroupAggregate {
        group_by: Some(group_by.to_string()),
        aggregates,
    }))
}

/// `alias = field` or `field`.
fn projection(item: &str) -> Projection {
    let item = item.trim();
    if let Ok((_, (alias, field))) = all_consuming((assignment, identifier)).parse(item) {
        return Projection::renamed(field, alias);
    }
    Projection::field(item)
}

fn project(args: &str) -> Option<Operation> {
    let fields: Vec<Projection> = lexer::split_top_level(args, ',')
        .into_iter()
        .filter(|item| !item.trim().is_empty())
        .map(projection)
        .collect();
    (!fields.is_empty()).then_some(Operation::Project(fields))
}

/// `sort by field [asc|desc]`, ascending unless stated.
fn sort(args: &str) -> Option<Operation> {
    let (key, _) = lexer::keyword("by", args).ok()?;
    lexer::sort_key(key, SortOrder::Asc).map(Operation::Sort)
}
