//! Declarative result checks for exercise lessons.
//!
//! A [`Check`] is data, not code: the curriculum document describes what a
//! correct answer looks like, and [`Check::evaluate`] decides whether a result
//! set satisfies it.

use crate::models::{field, Record};
use crate::query::{compare_values, SortOrder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which records a field check inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Only the first record (fails on empty results).
    #[default]
    First,
    /// Every record (fails on empty results).
    Every,
}

/// A predicate over a query's result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Check {
    /// Always passes.
    AcceptAny,
    /// At least `count` records.
    MinCount {
        /// Lower bound, inclusive.
        count: usize,
    },
    /// At most `count` records.
    MaxCount {
        /// Upper bound, inclusive.
        count: usize,
    },
    /// Exactly `count` records.
    ExactCount {
        /// Required size.
        count: usize,
    },
    /// The field is present.
    HasField {
        /// Field name.
        field: String,
        /// Records inspected.
        #[serde(default)]
        scope: Scope,
    },
    /// The first record has exactly `count` fields.
    FieldCount {
        /// Required number of fields.
        count: usize,
    },
    /// Every record has the field with exactly this JSON value.
    FieldEquals {
        /// Field name.
        field: String,
        /// Required value.
        value: Value,
    },
    /// Every record has the field and it is a JSON number.
    FieldIsNumber {
        /// Field name.
        field: String,
    },
    /// Records are ordered by the field.
    SortedBy {
        /// Field name.
        field: String,
        /// Required direction.
        #[serde(default)]
        order: SortOrder,
    },
    /// Every nested check passes.
    All {
        /// Nested checks.
        checks: Vec<Check>,
    },
    /// At least one nested check passes.
    Any {
        /// Nested checks.
        checks: Vec<Check>,
    },
}

impl Check {
    /// Evaluates the check against a result set.
    ///
    /// # Example
    ///
    /// ```
    /// use serde_json::json;
    /// use shared::lab::Check;
    /// use shared::models::dataset_from_json;
    ///
    /// let check: Check = serde_json::from_value(json!({
    ///     "type": "all",
    ///     "checks": [
    ///         {"type": "min_count", "count": 1},
    ///         {"type": "has_field", "field": "username"}
    ///     ]
    /// }))
    /// .unwrap();
    ///
    /// let results = dataset_from_json(json!([{"username": "admin"}])).unwrap();
    /// assert!(check.evaluate(&results));
    /// assert!(!check.evaluate(&[]));
    /// ```
    #[must_use]
    pub fn evaluate(&self, results: &[Record]) -> bool {
        match self {
            Self::AcceptAny => true,
            Self::MinCount { count } => results.len() >= *count,
            Self::MaxCount { count } => results.len() <= *count,
            Self::ExactCount { count } => results.len() == *count,
            Self::HasField { field, scope } => match scope {
                Scope::First => results.first().is_some_and(|r| r.contains_key(field)),
                Scope::Every => {
                    !results.is_empty() && results.iter().all(|r| r.contains_key(field))
                }
            },
            Self::FieldCount { count } => results.first().is_some_and(|r| r.len() == *count),
            Self::FieldEquals { field, value } => {
                results.iter().all(|r| r.get(field) == Some(value))
            }
            Self::FieldIsNumber { field } => results
                .iter()
                .all(|r| r.get(field).is_some_and(Value::is_number)),
            Self::SortedBy { field: name, order } => results.windows(2).all(|pair| {
                let ordering = compare_values(field(&pair[0], name), field(&pair[1], name));
                match order {
                    SortOrder::Asc => ordering.is_le(),
                    SortOrder::Desc => ordering.is_ge(),
                }
            }),
            Self::All { checks } => checks.iter().all(|c| c.evaluate(results)),
            Self::Any { checks } => checks.iter().any(|c| c.evaluate(results)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{dataset_from_json, Dataset};
    use serde_json::json;

    fn results() -> Dataset {
        dataset_from_json(json!([
            {"username": "admin", "count": 4},
            {"username": "root", "count": 3},
            {"username": "guest", "count": 1}
        ]))
        .unwrap()
    }

    fn check(value: serde_json::Value) -> Check {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_counts() {
        let data = results();
        assert!(check(json!({"type": "min_count", "count": 3})).evaluate(&data));
        assert!(!check(json!({"type": "min_count", "count": 4})).evaluate(&data));
        assert!(check(json!({"type": "max_count", "count": 3})).evaluate(&data));
        assert!(!check(json!({"type": "max_count", "count": 2})).evaluate(&data));
        assert!(check(json!({"type": "exact_count", "count": 3})).evaluate(&data));
        assert!(check(json!({"type": "accept_any"})).evaluate(&[]));
    }

    #[test]
    fn test_has_field_scopes() {
        let data = dataset_from_json(json!([{"a": 1}, {"b": 2}])).unwrap();
        assert!(check(json!({"type": "has_field", "field": "a"})).evaluate(&data));
        assert!(!check(json!({"type": "has_field", "field": "a", "scope": "every"})).evaluate(&data));
        assert!(!check(json!({"type": "has_field", "field": "a"})).evaluate(&[]));
        assert!(!check(json!({"type": "has_field", "field": "a", "scope": "every"})).evaluate(&[]));
    }

    #[test]
    fn test_field_count_looks_at_first_record() {
        let data = dataset_from_json(json!([{"a": 1, "b": 2}, {"a": 1}])).unwrap();
        assert!(check(json!({"type": "field_count", "count": 2})).evaluate(&data));
        assert!(!check(json!({"type": "field_count", "count": 1})).evaluate(&data));
        assert!(!check(json!({"type": "field_count", "count": 0})).evaluate(&[]));
    }

    #[test]
    fn test_field_equals_is_exact() {
        let data = dataset_from_json(json!([{"action": "failed_login"}, {"action": "failed_login"}]))
            .unwrap();
        let failed = check(json!({"type": "field_equals", "field": "action", "value": "failed_login"}));
        assert!(failed.evaluate(&data));

        let upper = dataset_from_json(json!([{"action": "FAILED_LOGIN"}])).unwrap();
        assert!(!failed.evaluate(&upper));
    }

    #[test]
    fn test_field_is_number() {
        let numeric = check(json!({"type": "field_is_number", "field": "count"}));
        assert!(numeric.evaluate(&results()));
        let data = dataset_from_json(json!([{"count": "4"}])).unwrap();
        assert!(!numeric.evaluate(&data));
    }

    #[test]
    fn test_sorted_by() {
        let desc = check(json!({"type": "sorted_by", "field": "count", "order": "desc"}));
        let asc = check(json!({"type": "sorted_by", "field": "count"}));
        assert!(desc.evaluate(&results()));
        assert!(!asc.evaluate(&results()));
        assert!(asc.evaluate(&[]));
    }

    #[test]
    fn test_combinators() {
        let data = results();
        let all = Check::All {
            checks: vec![
                Check::MinCount { count: 1 },
                Check::FieldIsNumber {
                    field: "count".to_string(),
                },
            ],
        };
        assert!(all.evaluate(&data));

        let any = Check::Any {
            checks: vec![Check::ExactCount { count: 99 }, Check::MaxCount { count: 3 }],
        };
        assert!(any.evaluate(&data));
        assert!(!Check::Any { checks: vec![] }.evaluate(&data));
    }
}
