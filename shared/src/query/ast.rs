//! Operator IR shared by every dialect front-end.
//!
//! Each front-end compiles its query text into a [`Pipeline`]: an ordered list
//! of [`Operation`]s drawn from a small relational vocabulary.

use serde::{Deserialize, Serialize};

/// Comparison operators for predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOp {
    /// Equal (`=`, `==`), case-insensitive on the string form.
    Eq,
    /// Not equal (`!=`, `<>`), case-insensitive on the string form.
    NotEq,
    /// Less than (`<`), numeric.
    Lt,
    /// Less than or equal (`<=`), numeric.
    LtEq,
    /// Greater than (`>`), numeric.
    Gt,
    /// Greater than or equal (`>=`), numeric.
    GtEq,
    /// `%` wildcard match, case-insensitive.
    Like,
    /// Case-insensitive substring match.
    Contains,
}

impl std::fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::NotEq => write!(f, "!="),
            Self::Lt => write!(f, "<"),
            Self::LtEq => write!(f, "<="),
            Self::Gt => write!(f, ">"),
            Self::GtEq => write!(f, ">="),
            Self::Like => write!(f, "LIKE"),
            Self::Contains => write!(f, "CONTAINS"),
        }
    }
}

/// A single comparison (e.g. `action = 'failed_login'`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    /// The field name to compare.
    pub field: String,
    /// The comparison operator.
    pub operator: ComparisonOp,
    /// The literal to compare against, unquoted.
    pub value: String,
}

impl Predicate {
    /// Creates a new predicate.
    #[must_use]
    pub fn new(field: impl Into<String>, operator: ComparisonOp, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} '{}'", self.field, self.operator, self.value)
    }
}

/// A conjunction of predicates. An empty condition matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Condition {
    /// The AND-combined predicates.
    pub predicates: Vec<Predicate>,
}

impl Condition {
    /// Creates a condition from its predicates.
    #[must_use]
    pub fn all(predicates: Vec<Predicate>) -> Self {
        Self { predicates }
    }

    /// Returns true if the condition has no predicates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.predicates.is_empty() {
            return write!(f, "TRUE");
        }
        for (i, predicate) in self.predicates.iter().enumerate() {
            if i > 0 {
                write!(f, " AND ")?;
            }
            write!(f, "{predicate}")?;
        }
        Ok(())
    }
}

/// One output column of a projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    /// Source field name.
    pub field: String,
    /// Output name, if renamed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl Projection {
    /// Projects a field under its own name.
    #[must_use]
    pub fn field(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            alias: None,
        }
    }

    /// Projects a field under a new name.
    #[must_use]
    pub fn renamed(field: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            alias: Some(alias.into()),
        }
    }

    /// The name the field has in the output record.
    #[must_use]
    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.field)
    }
}

impl std::fmt::Display for Projection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} AS {alias}", self.field),
            None => write!(f, "{}", self.field),
        }
    }
}

/// Aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AggregateFunction {
    /// Number of records in the partition.
    Count,
    /// Numeric sum, non-numeric values counted as 0.
    Sum,
    /// Numeric mean over the partition size, non-numeric values counted as 0.
    Avg,
    /// Smallest numeric value.
    Min,
    /// Largest numeric value.
    Max,
}

impl AggregateFunction {
    /// Parses a function name case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "COUNT" => Some(Self::Count),
            "SUM" => Some(Self::Sum),
            "AVG" => Some(Self::Avg),
            "MIN" => Some(Self::Min),
            "MAX" => Some(Self::Max),
            _ => None,
        }
    }
}

impl std::fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Count => write!(f, "COUNT"),
            Self::Sum => write!(f, "SUM"),
            Self::Avg => write!(f, "AVG"),
            Self::Min => write!(f, "MIN"),
            Self::Max => write!(f, "MAX"),
        }
    }
}

/// One aggregate column (e.g. `COUNT(*) AS attempts`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    /// The aggregate function.
    pub function: AggregateFunction,
    /// The field the function reads (`*` for a bare count).
    pub field: String,
    /// Output name, if given explicitly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl Aggregate {
    /// Creates an aggregate without an explicit alias.
    #[must_use]
    pub fn new(function: AggregateFunction, field: impl Into<String>) -> Self {
        Self {
            function,
            field: field.into(),
            alias: None,
        }
    }

    /// A `COUNT(*)` aggregate, output as `count`.
    #[must_use]
    pub fn count() -> Self {
        Self::new(AggregateFunction::Count, "*")
    }

    /// Sets the output name.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The name of the aggregate in the output record.
    ///
    /// Defaults to `<func>_<field>` in lowercase, except `COUNT` which is
    /// always `count`.
    #[must_use]
    pub fn output_name(&self) -> String {
        if let Some(alias) = &self.alias {
            return alias.clone();
        }
        match self.function {
            AggregateFunction::Count => "count".to_string(),
            function => format!("{function}_{}", self.field).to_lowercase(),
        }
    }
}

impl std::fmt::Display for Aggregate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({}) AS {}", self.function, self.field, self.output_name())
    }
}

/// Partition-and-reduce step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupAggregate {
    /// The grouping field; `None` aggregates the whole dataset into one record.
    pub group_by: Option<String>,
    /// The aggregates computed per partition.
    pub aggregates: Vec<Aggregate>,
}

impl std::fmt::Display for GroupAggregate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let aggregates: Vec<String> = self.aggregates.iter().map(ToString::to_string).collect();
        write!(f, "AGGREGATE {}", aggregates.join(", "))?;
        if let Some(group_by) = &self.group_by {
            write!(f, " BY {group_by}")?;
        }
        Ok(())
    }
}

/// Sort order for sort operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asc => write!(f, "ASC"),
            Self::Desc => write!(f, "DESC"),
        }
    }
}

/// Sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    /// The field to sort by.
    pub field: String,
    /// The sort order.
    pub order: SortOrder,
}

impl std::fmt::Display for OrderBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.order)
    }
}

/// Which end of the dataset a limit keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LimitFrom {
    /// Keep the first records.
    #[default]
    Start,
    /// Keep the last records.
    End,
}

/// Row limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limit {
    /// Maximum number of records kept.
    pub count: usize,
    /// Which end of the dataset is kept.
    #[serde(default)]
    pub from: LimitFrom,
}

impl Limit {
    /// Keeps the first `count` records.
    #[must_use]
    pub fn head(count: usize) -> Self {
        Self {
            count,
            from: LimitFrom::Start,
        }
    }

    /// Keeps the last `count` records.
    #[must_use]
    pub fn tail(count: usize) -> Self {
        Self {
            count,
            from: LimitFrom::End,
        }
    }
}

impl std::fmt::Display for Limit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.from {
            LimitFrom::Start => write!(f, "LIMIT {}", self.count),
            LimitFrom::End => write!(f, "TAIL {}", self.count),
        }
    }
}

/// One relational transformation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "args", rename_all = "snake_case")]
pub enum Operation {
    /// Keep records satisfying the condition.
    Filter(Condition),
    /// Reshape records to the listed fields.
    Project(Vec<Projection>),
    /// Partition and reduce.
    GroupAggregate(GroupAggregate),
    /// Reorder records.
    Sort(OrderBy),
    /// Keep the first or last N records.
    Limit(Limit),
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Filter(condition) => write!(f, "FILTER {condition}"),
            Self::Project(fields) => {
                let fields: Vec<String> = fields.iter().map(ToString::to_string).collect();
                write!(f, "PROJECT {}", fields.join(", "))
            }
            Self::GroupAggregate(group) => write!(f, "{group}"),
            Self::Sort(order_by) => write!(f, "SORT {order_by}"),
            Self::Limit(limit) => write!(f, "{limit}"),
        }
    }
}

/// The ordered operations compiled from one query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pipeline {
    /// Operations, applied first to last.
    pub operations: Vec<Operation>,
}

impl Pipeline {
    /// Creates an empty pipeline (returns its input unchanged).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an operation.
    #[must_use]
    pub fn then(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Appends an operation in place.
    pub fn push(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    /// Returns the number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns true if the pipeline has no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl std::fmt::Display for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, operation) in self.operations.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{operation}")?;
        }
        Ok(())
    }
}
