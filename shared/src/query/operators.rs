//! Relational operator library.
//!
//! Dialect-independent implementations of filter, projection, group-by
//! aggregation, sort and limit. Every operator takes ownership of the
//! intermediate dataset it transforms; [`Pipeline::apply`] clones the caller's
//! dataset once up front, so the caller's data is never mutated.

use super::ast::{
    Aggregate, AggregateFunction, Condition, GroupAggregate, Limit, LimitFrom, Operation,
    OrderBy, Pipeline, Projection, SortOrder,
};
use crate::models::{coerce_number, field, number_value, text, Dataset, Record};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

impl Pipeline {
    /// Applies every operation in order to a copy of `dataset`.
    #[must_use]
    pub fn apply(&self, dataset: &[Record]) -> Dataset {
        self.operations
            .iter()
            .fold(dataset.to_vec(), |data, operation| operation.apply(data))
    }
}

impl Operation {
    /// Applies this operation to a dataset.
    #[must_use]
    pub fn apply(&self, data: Dataset) -> Dataset {
        match self {
            Self::Filter(condition) => filter(data, condition),
            Self::Project(fields) => project(data, fields),
            Self::GroupAggregate(group) => group_aggregate(&data, group),
            Self::Sort(order_by) => sort(data, order_by),
            Self::Limit(limit) => apply_limit(data, *limit),
        }
    }
}

/// Keeps the records satisfying `condition`, preserving order.
#[must_use]
pub fn filter(data: Dataset, condition: &Condition) -> Dataset {
    data.into_iter()
        .filter(|record| condition.matches(record))
        .collect()
}

/// Reshapes each record to the requested fields, in the requested order.
///
/// Fields missing from a source record are omitted from its output record.
#[must_use]
pub fn project(data: Dataset, fields: &[Projection]) -> Dataset {
    data.into_iter()
        .map(|record| {
            let mut projected = Record::new();
            for projection in fields {
                if let Some(value) = record.get(&projection.field) {
                    projected.insert(projection.output_name().to_string(), value.clone());
                }
            }
            projected
        })
        .collect()
}

/// Partitions records by the string form of the group field and reduces each
/// partition to one record.
///
/// Partitions are emitted in order of first appearance. Records without the
/// group field share a partition whose key is emitted as `null`. Without a
/// group field the whole dataset is one partition, so an empty input still
/// yields one record.
#[must_use]
pub fn group_aggregate(data: &[Record], group: &GroupAggregate) -> Dataset {
    let Some(group_by) = &group.group_by else {
        let rows: Vec<&Record> = data.iter().collect();
        let mut out = Record::new();
        for aggregate in &group.aggregates {
            out.insert(aggregate.output_name(), reduce(aggregate, &rows));
        }
        return vec![out];
    };

    let mut index: HashMap<Option<String>, usize> = HashMap::new();
    let mut partitions: Vec<(Value, Vec<&Record>)> = Vec::new();

    for record in data {
        let key_value = field(record, group_by);
        let key = key_value.map(text);
        let slot = *index.entry(key).or_insert_with(|| {
            partitions.push((key_value.cloned().unwrap_or(Value::Null), Vec::new()));
            partitions.len() - 1
        });
        partitions[slot].1.push(record);
    }

    partitions
        .into_iter()
        .map(|(key, rows)| {
            let mut out = Record::new();
            out.insert(group_by.clone(), key);
            for aggregate in &group.aggregates {
                out.insert(aggregate.output_name(), reduce(aggregate, &rows));
            }
            out
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn reduce(aggregate: &Aggregate, rows: &[&Record]) -> Value {
    let numbers = || numeric_values(rows, &aggregate.field);

    match aggregate.function {
        AggregateFunction::Count => Value::from(rows.len()),
        AggregateFunction::Sum => number_value(numbers().map(|n| n.unwrap_or(0.0)).sum()),
        AggregateFunction::Avg => {
            if rows.is_empty() {
                return Value::Null;
            }
            let sum: f64 = numbers().map(|n| n.unwrap_or(0.0)).sum();
            number_value(sum / rows.len() as f64)
        }
        AggregateFunction::Min => numbers()
            .flatten()
            .reduce(f64::min)
            .map_or(Value::Null, number_value),
        AggregateFunction::Max => numbers()
            .flatten()
            .reduce(f64::max)
            .map_or(Value::Null, number_value),
    }
}

fn numeric_values<'a>(
    rows: &'a [&'a Record],
    name: &'a str,
) -> impl Iterator<Item = Option<f64>> + 'a {
    rows.iter()
        .map(move |row| field(row, name).and_then(coerce_number))
}

/// Sorts records by one field.
///
/// Values compare numerically when both coerce to numbers and
/// lexicographically by string form otherwise; absent values sort after
/// present ones. `Desc` reverses the whole comparator. Equal keys keep their
/// input order, but callers should not rely on that.
#[must_use]
pub fn sort(mut data: Dataset, order_by: &OrderBy) -> Dataset {
    data.sort_by(|a, b| {
        let cmp = compare_values(field(a, &order_by.field), field(b, &order_by.field));
        match order_by.order {
            SortOrder::Asc => cmp,
            SortOrder::Desc => cmp.reverse(),
        }
    });
    data
}

/// Total ordering of two optional field values: numbers (including numeric
/// strings) by value, then other values by text, then missing values.
#[must_use]
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match (coerce_number(a), coerce_number(b)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => text(a).cmp(&text(b)),
        },
    }
}

/// Keeps the first (or, for a tail limit, the last) `count` records.
#[must_use]
pub fn apply_limit(mut data: Dataset, limit: Limit) -> Dataset {
    match limit.from {
        LimitFrom::Start => {
            data.truncate(limit.count);
            data
        }
        LimitFrom::End => {
            let skip = data.len().saturating_sub(limit.count);
            data.split_off(skip)
        }
    }
}
