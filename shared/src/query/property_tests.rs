//! Property tests for the relational operators.

use super::*;
use crate::models::{Dataset, Record};
use proptest::prelude::*;
use serde_json::Value;

fn record_strategy() -> impl Strategy<Value = Record> {
    (
        proptest::option::of(prop::sample::select(vec!["alice", "bob", "carol", "Alice"])),
        proptest::option::of(-50i64..50),
        prop::sample::select(vec!["failed_login", "successful_login", "logout"]),
    )
        .prop_map(|(user, bytes, action)| {
            let mut record = Record::new();
            if let Some(user) = user {
                record.insert("user".to_string(), Value::from(user));
            }
            if let Some(bytes) = bytes {
                record.insert("bytes".to_string(), Value::from(bytes));
            }
            record.insert("action".to_string(), Value::from(action));
            record
        })
}

fn dataset_strategy() -> impl Strategy<Value = Dataset> {
    prop::collection::vec(record_strategy(), 0..40)
}

fn condition_strategy() -> impl Strategy<Value = Condition> {
    let predicate = prop_oneof![
        (-60i64..60).prop_map(|n| Predicate::new("bytes", ComparisonOp::Gt, n.to_string())),
        (-60i64..60).prop_map(|n| Predicate::new("bytes", ComparisonOp::LtEq, n.to_string())),
        Just(Predicate::new("user", ComparisonOp::Eq, "alice")),
        Just(Predicate::new("action", ComparisonOp::Contains, "login")),
        Just(Predicate::new("user", ComparisonOp::Like, "%o%")),
    ];
    prop::collection::vec(predicate, 0..3).prop_map(Condition::all)
}

fn order_strategy() -> impl Strategy<Value = OrderBy> {
    (
        prop::sample::select(vec!["user", "bytes", "action", "missing"]),
        prop_oneof![Just(SortOrder::Asc), Just(SortOrder::Desc)],
    )
        .prop_map(|(field, order)| OrderBy {
            field: field.to_string(),
            order,
        })
}

/// Returns true if `sub` appears in `data` in the same relative order.
fn is_subsequence(sub: &[Record], data: &[Record]) -> bool {
    let mut rest = data.iter();
    sub.iter().all(|wanted| rest.any(|record| record == wanted))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn filter_keeps_an_ordered_subsequence(data in dataset_strategy(), condition in condition_strategy()) {
        let kept = filter(data.clone(), &condition);
        prop_assert!(is_subsequence(&kept, &data));
        prop_assert!(kept.iter().all(|r| condition.matches(r)));
        let dropped = data.iter().filter(|r| !condition.matches(r)).count();
        prop_assert_eq!(kept.len() + dropped, data.len());
    }

    #[test]
    fn limit_is_bounded_and_idempotent(data in dataset_strategy(), n in 0usize..50, tail in any::<bool>()) {
        let limit = if tail { Limit::tail(n) } else { Limit::head(n) };
        let once = apply_limit(data.clone(), limit);
        prop_assert_eq!(once.len(), n.min(data.len()));
        prop_assert!(is_subsequence(&once, &data));
        let twice = apply_limit(once.clone(), limit);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn project_is_idempotent(data in dataset_strategy(), rename in any::<bool>()) {
        let fields = if rename {
            vec![Projection::renamed("user", "who"), Projection::field("bytes")]
        } else {
            vec![Projection::field("action"), Projection::field("user")]
        };
        let once = project(data, &fields);
        let output: Vec<Projection> = fields
            .iter()
            .map(|p| Projection::field(p.output_name()))
            .collect();
        let twice = project(once.clone(), &output);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn counts_sum_to_input_size(data in dataset_strategy(), by_user in any::<bool>()) {
        let group = GroupAggregate {
            group_by: Some(if by_user { "user" } else { "action" }.to_string()),
            aggregates: vec![Aggregate::count()],
        };
        let groups = group_aggregate(&data, &group);
        let total: u64 = groups.iter().filter_map(|g| g["count"].as_u64()).sum();
        prop_assert_eq!(total, data.len() as u64);
    }

    #[test]
    fn sort_is_idempotent(data in dataset_strategy(), order_by in order_strategy()) {
        let once = sort(data, &order_by);
        let twice = sort(once.clone(), &order_by);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn sort_orders_keys(data in dataset_strategy(), order_by in order_strategy()) {
        let sorted = sort(data, &order_by);
        for pair in sorted.windows(2) {
            let ordering = compare_values(pair[0].get(&order_by.field), pair[1].get(&order_by.field));
            match order_by.order {
                SortOrder::Asc => prop_assert!(ordering.is_le()),
                SortOrder::Desc => prop_assert!(ordering.is_ge()),
            }
        }
    }
}
