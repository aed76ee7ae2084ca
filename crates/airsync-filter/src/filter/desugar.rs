//! Expansion of multi-value operators.
//!
//! `isAnyOf`, `isNoneOf`, `|`, `&` and `hasNoneOf` are not rendered directly: each
//! is rewritten into a group holding one primitive criterion per value. After this
//! pass the tree only contains [`Primitive`] operators, with every column resolved
//! against the available filters.

use std::borrow::Cow;
use std::collections::HashMap;

use super::ast::{Conjunction, Criterion, FilterGroup, FilterNode, Operator};
use super::classify::{FilterDescriptor, FilterType};
use super::error::{FilterError, FilterResult};
use super::escape::value_list;
use super::value::FilterValue;

/// Available filters by column id.
pub(crate) type FilterIndex<'a> = HashMap<&'a str, &'a FilterDescriptor>;

/// Operators with a direct formula rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Primitive {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    Filename,
    DoesNotContain,
    IsEmpty,
    IsNotEmpty,
    IsWithin,
}

impl Primitive {
    /// Returns the primitive form of `operator`, or `None` for multi-value operators.
    fn of(operator: Operator) -> Option<Self> {
        let primitive = match operator {
            Operator::Eq => Primitive::Eq,
            Operator::Ne => Primitive::Ne,
            Operator::Gt => Primitive::Gt,
            Operator::Gte => Primitive::Gte,
            Operator::Lt => Primitive::Lt,
            Operator::Lte => Primitive::Lte,
            Operator::Contains => Primitive::Contains,
            Operator::Filename => Primitive::Filename,
            Operator::DoesNotContain => Primitive::DoesNotContain,
            Operator::IsEmpty => Primitive::IsEmpty,
            Operator::IsNotEmpty => Primitive::IsNotEmpty,
            Operator::IsWithin => Primitive::IsWithin,
            Operator::IsAnyOf
            | Operator::IsNoneOf
            | Operator::HasAnyOf
            | Operator::HasAllOf
            | Operator::HasNoneOf => return None,
        };
        Some(primitive)
    }

    /// The operator token, for messages.
    pub(crate) fn token(self) -> &'static str {
        match self {
            Primitive::Eq => "=",
            Primitive::Ne => "!=",
            Primitive::Gt => ">",
            Primitive::Gte => ">=",
            Primitive::Lt => "<",
            Primitive::Lte => "<=",
            Primitive::Contains => "contains",
            Primitive::Filename => "filename",
            Primitive::DoesNotContain => "doesNotContain",
            Primitive::IsEmpty => "isEmpty",
            Primitive::IsNotEmpty => "isNotEmpty",
            Primitive::IsWithin => "isWithin",
        }
    }
}

/// Conjunction and per-value operator a multi-value operator expands to.
fn expansion(operator: Operator) -> Option<(Conjunction, Primitive)> {
    match operator {
        Operator::IsAnyOf => Some((Conjunction::Or, Primitive::Eq)),
        Operator::IsNoneOf => Some((Conjunction::And, Primitive::Ne)),
        Operator::HasAnyOf => Some((Conjunction::Or, Primitive::Contains)),
        Operator::HasAllOf => Some((Conjunction::And, Primitive::Contains)),
        Operator::HasNoneOf => Some((Conjunction::And, Primitive::DoesNotContain)),
        _ => None,
    }
}

/// A filter tree with resolved columns and primitive operators only.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Lowered<'a> {
    Group {
        conjunction: Conjunction,
        children: Vec<Lowered<'a>>,
    },
    Test(Test<'a>),
}

/// A primitive criterion.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Test<'a> {
    pub column_name: &'a str,
    pub filter: &'a FilterDescriptor,
    pub operator: Primitive,
    pub value: Cow<'a, FilterValue>,
}

/// Lowers filter trees against an index of available filters.
pub(crate) struct Desugarer<'i, 'a> {
    index: &'i FilterIndex<'a>,
    max_depth: usize,
}

impl<'i, 'a> Desugarer<'i, 'a> {
    pub(crate) fn new(index: &'i FilterIndex<'a>, max_depth: usize) -> Self {
        Self { index, max_depth }
    }

    /// Lowers a root group.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::FilterNotAvailable` for a column missing from the
    /// index, `FilterError::UnsupportedOperator` for a multi-value operator on a
    /// date or checkbox column and `FilterError::TooDeep` when groups (including
    /// expanded ones) nest deeper than the limit.
    pub(crate) fn lower<'t>(&self, root: &'t FilterGroup) -> FilterResult<Lowered<'t>>
    where
        'a: 't,
    {
        self.group(root, 1)
    }

    fn enter(&self, depth: usize) -> FilterResult<()> {
        if depth > self.max_depth {
            return Err(FilterError::TooDeep {
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    fn group<'t>(&self, group: &'t FilterGroup, depth: usize) -> FilterResult<Lowered<'t>>
    where
        'a: 't,
    {
        self.enter(depth)?;
        let children = group
            .filters
            .iter()
            .map(|node| match node {
                FilterNode::Group(nested) => self.group(nested, depth + 1),
                FilterNode::Criterion(criterion) => self.criterion(criterion, depth),
            })
            .collect::<FilterResult<Vec<_>>>()?;

        Ok(Lowered::Group {
            conjunction: group.conjunction,
            children,
        })
    }

    fn criterion<'t>(&self, criterion: &'t Criterion, depth: usize) -> FilterResult<Lowered<'t>>
    where
        'a: 't,
    {
        let filter: &'t FilterDescriptor = self
            .index
            .get(criterion.column_id.as_str())
            .copied()
            .ok_or_else(|| FilterError::filter_not_available(column_label(criterion)))?;

        if let Some(operator) = Primitive::of(criterion.operator) {
            return Ok(Lowered::Test(Test {
                column_name: &criterion.column_name,
                filter,
                operator,
                value: Cow::Borrowed(&criterion.value),
            }));
        }

        let Some((conjunction, operator)) = expansion(criterion.operator) else {
            return Err(FilterError::unsupported_operator(
                criterion.operator.token(),
                filter.filter_type.as_str(),
            ));
        };
        if matches!(filter.filter_type, FilterType::Date | FilterType::Checkbox) {
            return Err(FilterError::unsupported_operator(
                criterion.operator.token(),
                filter.filter_type.as_str(),
            ));
        }
        self.enter(depth + 1)?;

        let children = value_list(&criterion.value)
            .into_iter()
            .map(|value| {
                Lowered::Test(Test {
                    column_name: &criterion.column_name,
                    filter,
                    operator,
                    value: Cow::Owned(value),
                })
            })
            .collect();

        Ok(Lowered::Group {
            conjunction,
            children,
        })
    }
}

fn column_label(criterion: &Criterion) -> &str {
    if criterion.column_name.is_empty() {
        &criterion.column_id
    } else {
        &criterion.column_name
    }
}

/// Indexes available filters by id. Later duplicates win.
pub(crate) fn index_filters(filters: &[FilterDescriptor]) -> FilterIndex<'_> {
    filters.iter().map(|f| (f.id.as_str(), f)).collect()
}
