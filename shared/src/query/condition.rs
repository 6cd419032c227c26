//! Predicate evaluation shared by every dialect's filtering stage.

use super::ast::{ComparisonOp, Condition, Predicate};
use crate::models::{coerce_number, field, text, Record};

impl Condition {
    /// Returns true if the record satisfies every predicate.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }
}

impl Predicate {
    /// Evaluates this predicate against one record.
    ///
    /// A field that is absent (or `null`) never matches, whatever the operator.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        let Some(value) = field(record, &self.field) else {
            return false;
        };

        match self.operator {
            ComparisonOp::Eq => text(value).to_lowercase() == self.value.to_lowercase(),
            ComparisonOp::NotEq => text(value).to_lowercase() != self.value.to_lowercase(),
            ComparisonOp::Lt | ComparisonOp::LtEq | ComparisonOp::Gt | ComparisonOp::GtEq => {
                let (Some(lhs), Some(rhs)) = (
                    coerce_number(value),
                    coerce_number(&serde_json::Value::String(self.value.clone())),
                ) else {
                    return false;
                };
                match self.operator {
                    ComparisonOp::Lt => lhs < rhs,
                    ComparisonOp::LtEq => lhs <= rhs,
                    ComparisonOp::Gt => lhs > rhs,
                    _ => lhs >= rhs,
                }
            }
            ComparisonOp::Like => like_match(&text(value), &self.value),
            ComparisonOp::Contains => text(value)
                .to_lowercase()
                .contains(&self.value.to_lowercase()),
        }
    }
}

/// Case-insensitive LIKE match over the whole text.
///
/// `%` matches any run of characters (including none) and `_` matches exactly
/// one character; everything else matches itself.
#[must_use]
pub fn like_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.to_lowercase().chars().collect();
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();

    let (mut t, mut p) = (0, 0);
    // Pattern index after the latest `%`, and the text index it currently covers up to.
    let mut resume: Option<(usize, usize)> = None;
    while t < text.len() {
        match pattern.get(p) {
            Some('%') => {
                p += 1;
                resume = Some((p, t));
            }
            Some(&c) if c == '_' || c == text[t] => {
                t += 1;
                p += 1;
            }
            _ => match resume {
                Some((after, start)) => {
                    p = after;
                    t = start + 1;
                    resume = Some((after, t));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|&c| c == '%')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dataset_from_json;
    use serde_json::json;

    fn record() -> Record {
        dataset_from_json(json!([{
            "username": "Administrator",
            "action": "failed_login",
            "bytes": 1500,
            "port": "22",
            "note": null
        }]))
        .unwrap()
        .remove(0)
    }

    fn eval(field: &str, op: ComparisonOp, value: &str) -> bool {
        Predicate::new(field, op, value).matches(&record())
    }

    #[test]
    fn test_eq_is_case_insensitive() {
        assert!(eval("username", ComparisonOp::Eq, "administrator"));
        assert!(eval("action", ComparisonOp::Eq, "FAILED_LOGIN"));
        assert!(!eval("action", ComparisonOp::Eq, "failed"));
        assert!(eval("bytes", ComparisonOp::Eq, "1500"));
    }

    #[test]
    fn test_not_eq() {
        assert!(eval("action", ComparisonOp::NotEq, "successful_login"));
        assert!(!eval("action", ComparisonOp::NotEq, "Failed_Login"));
    }

    #[test]
    fn test_numeric_comparisons() {
        assert!(eval("bytes", ComparisonOp::Gt, "1000"));
        assert!(eval("bytes", ComparisonOp::GtEq, "1500"));
        assert!(eval("bytes", ComparisonOp::LtEq, "1500"));
        assert!(!eval("bytes", ComparisonOp::Lt, "1500"));
        // Numeric strings coerce.
        assert!(eval("port", ComparisonOp::Lt, "1024"));
    }

    #[test]
    fn test_numeric_comparison_with_non_numbers_is_false() {
        assert!(!eval("username", ComparisonOp::Gt, "0"));
        assert!(!eval("username", ComparisonOp::Lt, "0"));
        assert!(!eval("bytes", ComparisonOp::Gt, "many"));
    }

    #[test]
    fn test_like() {
        assert!(eval("username", ComparisonOp::Like, "admin%"));
        assert!(eval("username", ComparisonOp::Like, "%TRATOR"));
        assert!(eval("username", ComparisonOp::Like, "%nistr%"));
        assert!(eval("username", ComparisonOp::Like, "a%n%r"));
        assert!(!eval("username", ComparisonOp::Like, "%root%"));
        assert!(!eval("username", ComparisonOp::Like, "admin"));
        assert!(eval("username", ComparisonOp::Like, "administrator"));
    }

    #[test]
    fn test_like_match_edges() {
        assert!(like_match("abc", "%"));
        assert!(like_match("", "%"));
        assert!(like_match("abc", "abc%"));
        assert!(!like_match("ab", "ab%b"));
        assert!(like_match("abab", "ab%b"));
        assert!(!like_match("abc", "ab"));
    }

    #[test]
    fn test_like_underscore_matches_one_character() {
        assert!(like_match("ws-01", "ws-0_"));
        assert!(like_match("WS-01", "ws-__"));
        assert!(!like_match("ws-1", "ws-__"));
        assert!(!like_match("ws-001", "ws-__"));
        assert!(like_match("failed_login", "f_iled%"));
        assert!(like_match("é1", "_1"));
        assert!(like_match("x", "%_"));
        assert!(!like_match("", "%_"));
    }

    #[test]
    fn test_contains() {
        assert!(eval("username", ComparisonOp::Contains, "ADMIN"));
        assert!(!eval("username", ComparisonOp::Contains, "root"));
    }

    #[test]
    fn test_absent_and_null_fields_never_match() {
        for op in [
            ComparisonOp::Eq,
            ComparisonOp::NotEq,
            ComparisonOp::Gt,
            ComparisonOp::Like,
            ComparisonOp::Contains,
        ] {
            assert!(!eval("missing", op, "x"), "{op} matched a missing field");
            assert!(!eval("note", op, "x"), "{op} matched a null field");
        }
    }

    #[test]
    fn test_condition_is_conjunction() {
        let condition = Condition::all(vec![
            Predicate::new("action", ComparisonOp::Eq, "failed_login"),
            Predicate::new("bytes", ComparisonOp::Gt, "1000"),
        ]);
        assert!(condition.matches(&record()));

        let condition = Condition::all(vec![
            Predicate::new("action", ComparisonOp::Eq, "failed_login"),
            Predicate::new("bytes", ComparisonOp::Gt, "2000"),
        ]);
        assert!(!condition.matches(&record()));

        assert!(Condition::default().matches(&record()));
    }
}
