//! Record and dataset model.
//!
//! A [`Record`] is a flat, insertion-ordered mapping from field name to a JSON
//! scalar. Field order carries no meaning for filtering, but it is the column
//! order used for display, so every operator that builds a record inserts its
//! fields in the order the caller asked for them.

use serde_json::{Number, Value};

/// One row of structured data.
pub type Record = serde_json::Map<String, Value>;

/// An ordered sequence of records.
pub type Dataset = Vec<Record>;

/// Builds a dataset from a JSON array of flat objects.
///
/// # Errors
///
/// Returns an error if `value` is not an array of objects.
///
/// # Example
///
/// ```
/// use shared::models::dataset_from_json;
/// use serde_json::json;
///
/// let data = dataset_from_json(json!([{"user": "a"}, {"user": "b", "port": 22}])).unwrap();
/// assert_eq!(data.len(), 2);
/// assert_eq!(data[1]["port"], 22);
/// ```
pub fn dataset_from_json(value: Value) -> Result<Dataset, serde_json::Error> {
    serde_json::from_value(value)
}

/// Returns a field's value, treating JSON `null` the same as an absent field.
#[must_use]
pub fn field<'a>(record: &'a Record, name: &str) -> Option<&'a Value> {
    record.get(name).filter(|v| !v.is_null())
}

/// Returns the string form of a scalar value.
///
/// Strings are returned verbatim (no quotes), numbers and booleans use their
/// JSON spelling, and `null` becomes `"null"`.
#[must_use]
pub fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Coerces a value to a number.
///
/// JSON numbers coerce directly; strings coerce when their trimmed content
/// parses as a finite float. Everything else (including the empty string) does
/// not coerce.
#[must_use]
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

/// Converts a computed number back into a JSON value.
///
/// Integral results are emitted as JSON integers so that `2.0` and `2` compare
/// equal for consumers. Non-finite results become `null`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn number_value(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 {
        return Value::from(n as i64);
    }
    Number::from_f64(n).map_or(Value::Null, Value::Number)
}
