//! SQL front-end.
//!
//! Supports a single `SELECT` statement:
//!
//! ```sql
//! SELECT username, COUNT(*) AS attempts
//! FROM auth_logs
//! WHERE action = 'failed_login' AND source_ip LIKE '10.%'
//! GROUP BY username
//! ORDER BY attempts DESC
//! LIMIT 5;
//! ```
//!
//! The statement is cut into clauses at the clause keywords (outside quotes),
//! and each clause body is parsed on its own. A clause that does not parse is
//! skipped; if a clause appears twice the first usable one wins.

use super::lexer::{self, alias_suffix, identifier, keyword};
use super::ParseError;
use crate::query::ast::{
    Aggregate, AggregateFunction, Condition, GroupAggregate, Limit, Operation, OrderBy, Pipeline,
    Projection, SortOrder,
};
use nom::{
    branch::alt,
    bytes::complete::take_while,
    character::complete::{char, multispace0},
    combinator::{all_consuming, map_opt, opt, value},
    sequence::delimited,
    IResult, Parser,
};
use tracing::debug;

/// One entry of a `SELECT` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectItem {
    /// `*`
    Wildcard,
    /// `field` or `field AS alias`.
    Column(Projection),
    /// `FUNC(arg)` with an optional alias.
    Aggregate(Aggregate),
}

/// A parsed `SELECT` statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlQuery {
    /// The select list, in written order. Empty when nothing usable was listed.
    pub select: Vec<SelectItem>,
    /// The `FROM` table, informational only.
    pub from: Option<String>,
    /// The `WHERE` condition.
    pub filter: Option<Condition>,
    /// The `GROUP BY` field.
    pub group_by: Option<String>,
    /// The `ORDER BY` key.
    pub order_by: Option<OrderBy>,
    /// The `LIMIT` count.
    pub limit: Option<usize>,
}

const FROM: usize = 0;
const WHERE: usize = 1;
const GROUP_BY: usize = 2;
const ORDER_BY: usize = 3;
const LIMIT: usize = 4;

const CLAUSE_KEYWORDS: [&[&str]; 5] = [
    &["FROM"],
    &["WHERE"],
    &["GROUP", "BY"],
    &["ORDER", "BY"],
    &["LIMIT"],
];

impl SqlQuery {
    /// Lowers the statement to operators.
    ///
    /// Evaluation order is `WHERE`, grouping, `ORDER BY`, `LIMIT`, and the
    /// projection last, so sorting can use fields that are not selected.
    #[must_use]
    pub fn to_pipeline(&self) -> Pipeline {
        let mut pipeline = Pipeline::new();

        if let Some(condition) = self.filter.as_ref().filter(|c| !c.is_empty()) {
            pipeline.push(Operation::Filter(condition.clone()));
        }

        let aggregates: Vec<Aggregate> = self
            .select
            .iter()
            .filter_map(|item| match item {
                SelectItem::Aggregate(aggregate) => Some(aggregate.clone()),
                _ => None,
            })
            .collect();
        if self.group_by.is_some() || !aggregates.is_empty() {
            pipeline.push(Operation::GroupAggregate(GroupAggregate {
                group_by: self.group_by.clone(),
                aggregates,
            }));
        }

        if let Some(order_by) = &self.order_by {
            pipeline.push(Operation::Sort(order_by.clone()));
        }
        if let Some(count) = self.limit {
            pipeline.push(Operation::Limit(Limit::head(count)));
        }

        if let Some(projections) = self.projections() {
            pipeline.push(Operation::Project(projections));
        }

        pipeline
    }

    /// The final projection, or `None` for `SELECT *` (or an empty list).
    fn projections(&self) -> Option<Vec<Projection>> {
        if self.select.is_empty() || self.select.contains(&SelectItem::Wildcard) {
            return None;
        }
        let projections = self
            .select
            .iter()
            .map(|item| match item {
                SelectItem::Column(projection) => projection.clone(),
                SelectItem::Aggregate(aggregate) => Projection::field(aggregate.output_name()),
                SelectItem::Wildcard => Projection::field("*"),
            })
            .collect();
        Some(projections)
    }

    fn apply_clause(&mut self, clause: usize, body: &str) {
        match clause {
            FROM => set_first(
                &mut self.from,
                "FROM",
                body,
                identifier(body).ok().map(|(_, table)| table.to_string()),
            ),
            WHERE => {
                let condition = lexer::parse_condition(body);
                set_first(
                    &mut self.filter,
                    "WHERE",
                    body,
                    (!condition.is_empty()).then_some(condition),
                );
            }
            GROUP_BY => set_first(
                &mut self.group_by,
                "GROUP BY",
                body,
                identifier(body).ok().map(|(_, field)| field.to_string()),
            ),
            ORDER_BY => set_first(
                &mut self.order_by,
                "ORDER BY",
                body,
                lexer::sort_key(body, SortOrder::Asc),
            ),
            LIMIT => set_first(
                &mut self.limit,
                "LIMIT",
                body,
                lexer::count(body).ok().map(|(_, n)| n),
            ),
            _ => {}
        }
    }
}

fn set_first<T>(slot: &mut Option<T>, clause: &str, body: &str, parsed: Option<T>) {
    if slot.is_some() {
        debug!(clause, body, "Ignoring repeated clause");
        return;
    }
    match parsed {
        Some(parsed) => *slot = Some(parsed),
        None => debug!(clause, body, "Skipping unparseable clause"),
    }
}

fn wildcard(input: &str) -> IResult<&str, SelectItem> {
    value(SelectItem::Wildcard, char('*')).parse(input)
}

fn aggregate_item(input: &str) -> IResult<&str, SelectItem> {
    let (input, function) = map_opt(identifier, AggregateFunction::from_name).parse(input)?;
    let (input, _) = multispace0(input)?;
    let (input, argument) =
        delimited(char('('), take_while(|c: char| c != ')'), char(')')).parse(input)?;
    let (input, alias) = opt(alias_suffix).parse(input)?;

    let argument = match argument.trim() {
        "" => "*",
        argument => argument,
    };
    let mut aggregate = Aggregate::new(function, argument);
    if let Some(alias) = alias {
        aggregate = aggregate.with_alias(alias);
    }
    Ok((input, SelectItem::Aggregate(aggregate)))
}

fn column_item(input: &str) -> IResult<&str, SelectItem> {
    let (input, field) = identifier(input)?;
    let (input, alias) = opt(alias_suffix).parse(input)?;

    let projection = match alias {
        Some(alias) => Projection::renamed(field, alias),
        None => Projection::field(field),
    };
    Ok((input, SelectItem::Column(projection)))
}

fn select_item(item: &str) -> SelectItem {
    match all_consuming(alt((wildcard, aggregate_item, column_item))).parse(item) {
        Ok((_, item)) => item,
        Err(_) => {
            debug!(item, "Selecting unrecognized item verbatim");
            SelectItem::Column(Projection::field(item))
        }
    }
}

fn select_list(text: &str) -> Vec<SelectItem> {
    lexer::split_top_level(text, ',')
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(select_item)
        .collect()
}

/// Parses a `SELECT` statement.
///
/// A trailing `;` is ignored, keywords are case-insensitive, and `FROM` is
/// optional.
///
/// # Errors
///
/// Returns [`ParseError::MissingSelect`] if the statement does not begin with
/// the word `SELECT` (this includes the empty statement).
///
/// # Example
///
/// ```
/// use shared::query::parser::sql;
///
/// let query = sql::parse("SELECT user FROM auth_logs LIMIT 2;").unwrap();
/// assert_eq!(query.from.as_deref(), Some("auth_logs"));
/// assert_eq!(query.limit, Some(2));
/// ```
pub fn parse(input: &str) -> Result<SqlQuery, ParseError> {
    let statement = input.trim();
    let statement = statement.strip_suffix(';').unwrap_or(statement);
    let Ok((body, _)) = keyword("SELECT", statement) else {
        return Err(ParseError::MissingSelect);
    };

    let clauses = lexer::find_phrases(body, &CLAUSE_KEYWORDS);
    let select_end = clauses.first().map_or(body.len(), |&(_, start, _)| start);

    let mut query = SqlQuery {
        select: select_list(&body[..select_end]),
        ..SqlQuery::default()
    };
    for (n, &(clause, _, end)) in clauses.iter().enumerate() {
        let next = clauses.get(n + 1).map_or(body.len(), |&(_, start, _)| start);
        query.apply_clause(clause, body[end..next].trim());
    }

    Ok(query)
}

/// Parses a `SELECT` statement and lowers it to a pipeline.
///
/// # Errors
///
/// Returns [`ParseError::MissingSelect`] if the statement is not a `SELECT`.
pub fn compile(input: &str) -> Result<Pipeline, ParseError> {
    parse(input).map(|query| query.to_pipeline())
}
