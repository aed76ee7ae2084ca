//! Filter tree as built in the admin UI.
//!
//! A tree is a root [`FilterGroup`] whose children are either nested groups or
//! leaf [`Criterion`]s. The serialized form is the UI payload:
//!
//! ```json
//! {"conjunction": "and", "filters": [
//!     {"columnId": "fldA", "columnName": "Status", "operator": "isAnyOf", "value": ["Todo", "Doing"]},
//!     {"conjunction": "or", "filters": []}
//! ]}
//! ```

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::error::{FilterError, FilterResult};
use super::value::FilterValue;

/// Combinator joining the children of a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Conjunction {
    #[default]
    And,
    Or,
}

impl Conjunction {
    /// The formula function name (`AND` / `OR`).
    pub fn keyword(self) -> &'static str {
        match self {
            Conjunction::And => "AND",
            Conjunction::Or => "OR",
        }
    }
}

impl FromStr for Conjunction {
    type Err = FilterError;

    fn from_str(s: &str) -> FilterResult<Self> {
        match s {
            "and" => Ok(Conjunction::And),
            "or" => Ok(Conjunction::Or),
            _ => Err(FilterError::unknown_conjunction(s)),
        }
    }
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Criterion operator, as sent by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // ==================== Comparisons ====================
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,

    // ==================== Text ====================
    Contains,
    DoesNotContain,
    /// Attachment file name contains.
    Filename,

    // ==================== Presence ====================
    IsEmpty,
    IsNotEmpty,

    // ==================== Dates ====================
    /// Between the two boundaries of a date range.
    IsWithin,

    // ==================== Multi-value ====================
    /// Equal to any of the values.
    IsAnyOf,
    /// Equal to none of the values.
    IsNoneOf,
    /// `|`: contains any of the values.
    HasAnyOf,
    /// `&`: contains all of the values.
    HasAllOf,
    /// Contains none of the values.
    HasNoneOf,
}

impl Operator {
    /// The wire token of the operator.
    pub fn token(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Contains => "contains",
            Operator::DoesNotContain => "doesNotContain",
            Operator::Filename => "filename",
            Operator::IsEmpty => "isEmpty",
            Operator::IsNotEmpty => "isNotEmpty",
            Operator::IsWithin => "isWithin",
            Operator::IsAnyOf => "isAnyOf",
            Operator::IsNoneOf => "isNoneOf",
            Operator::HasAnyOf => "|",
            Operator::HasAllOf => "&",
            Operator::HasNoneOf => "hasNoneOf",
        }
    }

    /// Returns true for the operators taking a list of values.
    pub fn is_of_many(self) -> bool {
        matches!(
            self,
            Operator::IsAnyOf
                | Operator::IsNoneOf
                | Operator::HasAnyOf
                | Operator::HasAllOf
                | Operator::HasNoneOf
        )
    }
}

impl FromStr for Operator {
    type Err = FilterError;

    fn from_str(s: &str) -> FilterResult<Self> {
        let operator = match s {
            "=" => Operator::Eq,
            "!=" => Operator::Ne,
            ">" => Operator::Gt,
            ">=" => Operator::Gte,
            "<" => Operator::Lt,
            "<=" => Operator::Lte,
            "contains" => Operator::Contains,
            "doesNotContain" => Operator::DoesNotContain,
            "filename" => Operator::Filename,
            "isEmpty" => Operator::IsEmpty,
            "isNotEmpty" => Operator::IsNotEmpty,
            "isWithin" => Operator::IsWithin,
            "isAnyOf" => Operator::IsAnyOf,
            "isNoneOf" => Operator::IsNoneOf,
            "|" => Operator::HasAnyOf,
            "&" => Operator::HasAllOf,
            "hasNoneOf" => Operator::HasNoneOf,
            other => return Err(FilterError::unsupported_operator(other, "any")),
        };
        Ok(operator)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A node of the filter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    Group(FilterGroup),
    Criterion(Criterion),
}

impl From<FilterGroup> for FilterNode {
    fn from(group: FilterGroup) -> Self {
        FilterNode::Group(group)
    }
}

impl From<Criterion> for FilterNode {
    fn from(criterion: Criterion) -> Self {
        FilterNode::Criterion(criterion)
    }
}

/// A conjunction over ordered child nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterGroup {
    pub conjunction: Conjunction,
    pub filters: Vec<FilterNode>,
}

impl FilterGroup {
    /// Creates a group.
    pub fn new(conjunction: Conjunction, filters: Vec<FilterNode>) -> Self {
        Self {
            conjunction,
            filters,
        }
    }

    /// Creates an `AND` group.
    pub fn and(filters: Vec<FilterNode>) -> Self {
        Self::new(Conjunction::And, filters)
    }

    /// Creates an `OR` group.
    pub fn or(filters: Vec<FilterNode>) -> Self {
        Self::new(Conjunction::Or, filters)
    }

    /// Returns true if the group has no children.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Parses the JSON payload sent by the admin UI.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::MalformedTree` if the payload is not a filter tree,
    /// `FilterError::UnknownConjunction` for a conjunction other than `and`/`or`
    /// and `FilterError::UnsupportedOperator` for an unknown operator token.
    pub fn from_json(json: &str) -> FilterResult<Self> {
        let raw: RawNode = serde_json::from_str(json)?;
        raw.into_group()
    }

    /// Same as [`FilterGroup::from_json`], from an already decoded value.
    pub fn from_value(value: serde_json::Value) -> FilterResult<Self> {
        let raw: RawNode = serde_json::from_value(value)?;
        raw.into_group()
    }
}

/// A single test against one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    pub column_id: String,
    pub column_name: String,
    pub operator: Operator,
    pub value: FilterValue,
}

impl Criterion {
    /// Creates a criterion.
    pub fn new(
        column_id: impl Into<String>,
        column_name: impl Into<String>,
        operator: Operator,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self {
            column_id: column_id.into(),
            column_name: column_name.into(),
            operator,
            value: value.into(),
        }
    }
}

/// Loosely typed node, as deserialized from the UI payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    #[serde(default)]
    conjunction: Option<String>,
    #[serde(default, alias = "children")]
    filters: Option<Vec<RawNode>>,
    #[serde(default)]
    column_id: Option<String>,
    #[serde(default)]
    column_name: Option<String>,
    #[serde(default)]
    operator: Option<String>,
    #[serde(default)]
    value: FilterValue,
}

impl RawNode {
    fn into_group(self) -> FilterResult<FilterGroup> {
        let filters = self.filters.unwrap_or_default();
        // An empty group renders nothing, whatever its conjunction.
        if filters.is_empty() {
            return Ok(FilterGroup::default());
        }

        let conjunction = self.conjunction.as_deref().unwrap_or_default().parse()?;
        let filters = filters
            .into_iter()
            .map(RawNode::into_node)
            .collect::<FilterResult<Vec<_>>>()?;
        Ok(FilterGroup::new(conjunction, filters))
    }

    fn into_node(self) -> FilterResult<FilterNode> {
        if self.conjunction.is_some() {
            return self.into_group().map(FilterNode::Group);
        }

        let column_id = self
            .column_id
            .ok_or_else(|| FilterError::MalformedTree("criterion without columnId".to_string()))?;
        let operator = self
            .operator
            .ok_or_else(|| FilterError::MalformedTree("criterion without operator".to_string()))?
            .parse()?;

        Ok(FilterNode::Criterion(Criterion {
            column_name: self.column_name.unwrap_or_default(),
            column_id,
            operator,
            value: self.value,
        }))
    }
}
