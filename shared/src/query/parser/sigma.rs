//! Sigma detection rule front-end.
//!
//! Only the `detection.selection` block is evaluated:
//!
//! ```yaml
//! title: Brute force
//! detection:
//!   selection:
//!     action: failed_login
//!     username|startswith: adm
//!   condition: selection
//! ```
//!
//! Every scalar selection entry becomes a predicate and all of them must
//! hold. The `condition` is recorded but not evaluated.

use super::ParseError;
use crate::query::ast::{ComparisonOp, Condition, Operation, Pipeline, Predicate};
use serde_yaml::Value;
use tracing::debug;

/// Field match modifier (`field|modifier: value`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modifier {
    /// Substring match. Also used for unknown modifiers.
    #[default]
    Contains,
    /// Prefix match.
    StartsWith,
    /// Suffix match.
    EndsWith,
}

impl Modifier {
    fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "startswith" => Self::StartsWith,
            "endswith" => Self::EndsWith,
            "contains" => Self::Contains,
            other => {
                debug!(modifier = other, "Unknown Sigma modifier, matching as substring");
                Self::Contains
            }
        }
    }
}

/// One `field[|modifier]: value` line of a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEntry {
    /// The record field.
    pub field: String,
    /// How the value is matched.
    pub modifier: Modifier,
    /// The value, unquoted.
    pub value: String,
}

impl SelectionEntry {
    fn to_predicate(&self) -> Predicate {
        let (operator, value) = match self.modifier {
            Modifier::Contains => (ComparisonOp::Contains, self.value.clone()),
            Modifier::StartsWith => (ComparisonOp::Like, format!("{}%", self.value)),
            Modifier::EndsWith => (ComparisonOp::Like, format!("%{}", self.value)),
        };
        Predicate::new(self.field.clone(), operator, value)
    }
}

/// The parts of a Sigma rule this engine reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SigmaRule {
    /// The top-level `title`, if any.
    pub title: Option<String>,
    /// The selection entries, in written order.
    pub selection: Vec<SelectionEntry>,
    /// The `condition` expression, if any. Not evaluated.
    pub condition: Option<String>,
}

impl SigmaRule {
    /// Lowers the rule to a single filter. An empty selection keeps every
    /// record.
    #[must_use]
    pub fn to_pipeline(&self) -> Pipeline {
        let predicates = self.selection.iter().map(SelectionEntry::to_predicate).collect();
        Pipeline::new().then(Operation::Filter(Condition::all(predicates)))
    }
}

/// Text of a string, number or boolean.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// `field[|modifier]: value`. Further modifiers in a chain are ignored.
fn selection_entry(key: &Value, value: &Value) -> Option<SelectionEntry> {
    let key = key.as_str()?;
    let value = scalar_text(value)?;
    let mut parts = key.split('|');
    let field = parts.next().filter(|field| !field.is_empty())?;
    let modifier = parts.next().map(Modifier::from_name).unwrap_or_default();
    if parts.next().is_some() {
        debug!(key, "Ignoring chained Sigma modifiers");
    }
    Some(SelectionEntry {
        field: field.to_string(),
        modifier,
        value,
    })
}

/// Parses a Sigma rule.
///
/// # Errors
///
/// Returns [`ParseError::MissingSelection`] if the input is not YAML, or has
/// no `detection` mapping holding a `selection` mapping. An empty
/// `selection:` is accepted.
///
/// # Example
///
/// ```
/// use shared::query::parser::sigma;
///
/// let rule = sigma::parse("detection:\n  selection:\n    action: failed\n  condition: selection")
///     .unwrap();
/// assert_eq!(rule.selection[0].field, "action");
/// assert_eq!(rule.condition.as_deref(), Some("selection"));
/// ```
pub fn parse(input: &str) -> Result<SigmaRule, ParseError> {
    let document: Value = serde_yaml::from_str(input).map_err(|e| {
        debug!(error = %e, "Sigma rule is not valid YAML");
        ParseError::MissingSelection
    })?;

    let detection = document
        .get("detection")
        .and_then(Value::as_mapping)
        .ok_or(ParseError::MissingSelection)?;
    let entries = match detection.get("selection") {
        Some(Value::Mapping(selection)) => selection
            .iter()
            .filter_map(|(key, value)| {
                let entry = selection_entry(key, value);
                if entry.is_none() {
                    debug!(key = ?key, "Skipping unsupported selection entry");
                }
                entry
            })
            .collect(),
        Some(Value::Null) => Vec::new(),
        _ => return Err(ParseError::MissingSelection),
    };

    Ok(SigmaRule {
        title: document.get("title").and_then(scalar_text),
        selection: entries,
        condition: detection.get("condition").and_then(scalar_text),
    })
}

/// Parses a Sigma rule and lowers its selection to a filter.
///
/// # Errors
///
/// Returns [`ParseError::MissingSelection`] if the rule has no selection.
pub fn compile(input: &str) -> Result<Pipeline, ParseError> {
    parse(input).map(|rule| rule.to_pipeline())
}
