//! Formula rendering.
//!
//! The [`FormulaCompiler`] turns a filter tree into an Airtable formula, e.g.
//!
//! ```text
//! AND({Status}="Todo", OR(FIND("urgent",{Tags}), IS_AFTER({Due},'2024-03-09','days')))
//! ```
//!
//! Compilation is a pure function of the tree, the available filters and the
//! anchor date: the same input always yields the same formula.

use chrono::NaiveDate;
use tracing::{debug, trace};

use super::ast::FilterGroup;
use super::classify::{FilterDescriptor, FilterType};
use super::dates::{add_days, DateResolver};
use super::desugar::{index_filters, Desugarer, FilterIndex, Lowered, Primitive, Test};
use super::error::{FilterError, FilterResult};
use super::escape::{date_filter, escape_column_name, literal, ValueShape};
use super::value::FilterValue;
use crate::config::CompilerConfig;

/// Compiles filter trees into formulas against a set of available filters.
///
/// # Example
///
/// ```
/// use airsync_filter::filter::{
///     Criterion, FilterDescriptor, FilterGroup, FilterType, FormulaCompiler, Operator,
/// };
/// use chrono::NaiveDate;
///
/// let available = vec![FilterDescriptor::new("fld1", "Status", FilterType::Select)];
/// let tree = FilterGroup::and(vec![
///     Criterion::new("fld1", "Status", Operator::IsAnyOf, vec!["Todo", "Doing"]).into(),
/// ]);
///
/// let anchor = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
/// let formula = FormulaCompiler::new(&available).compile(&tree, anchor).unwrap();
/// assert_eq!(formula, r#"AND(OR({Status}="Todo", {Status}="Doing"))"#);
/// ```
#[derive(Debug)]
pub struct FormulaCompiler<'a> {
    index: FilterIndex<'a>,
    resolver: DateResolver,
    max_depth: usize,
}

impl<'a> FormulaCompiler<'a> {
    /// Creates a compiler with the default configuration.
    pub fn new(available: &'a [FilterDescriptor]) -> Self {
        Self::with_config(available, &CompilerConfig::default())
    }

    /// Creates a compiler with the given configuration.
    pub fn with_config(available: &'a [FilterDescriptor], config: &CompilerConfig) -> Self {
        Self {
            index: index_filters(available),
            resolver: DateResolver::new(config.week_starts_on),
            max_depth: config.max_depth,
        }
    }

    /// Compiles a filter tree into a formula.
    ///
    /// An empty tree compiles to an empty string.
    ///
    /// # Errors
    ///
    /// Any error aborts the whole compilation:
    ///
    /// - `FilterError::FilterNotAvailable` if a criterion references an unknown column
    /// - `FilterError::UnsupportedOperator` if an operator does not apply to its column
    /// - `FilterError::InvalidDateValue` / `FilterError::InvalidValue` for malformed values
    /// - `FilterError::TooDeep` if groups nest deeper than the configured limit
    pub fn compile(&self, tree: &FilterGroup, anchor: NaiveDate) -> FilterResult<String> {
        let lowered = Desugarer::new(&self.index, self.max_depth).lower(tree)?;
        let formula = self.render(&lowered, anchor)?;

        debug!(
            available = self.index.len(),
            anchor = %anchor,
            length = formula.len(),
            "compiled filter formula"
        );
        Ok(formula)
    }

    fn render(&self, node: &Lowered<'_>, anchor: NaiveDate) -> FilterResult<String> {
        match node {
            Lowered::Group {
                conjunction,
                children,
            } => {
                let mut rendered = Vec::with_capacity(children.len());
                for child in children {
                    let formula = self.render(child, anchor)?;
                    if !formula.is_empty() {
                        rendered.push(formula);
                    }
                }

                if rendered.is_empty() {
                    return Ok(String::new());
                }
                Ok(format!("{}({})", conjunction.keyword(), rendered.join(", ")))
            }
            Lowered::Test(test) => self.render_test(test, anchor),
        }
    }

    fn render_test(&self, test: &Test<'_>, anchor: NaiveDate) -> FilterResult<String> {
        trace!(
            column = test.column_name,
            operator = test.operator.token(),
            "rendering criterion"
        );

        let column = escape_column_name(test.column_name);
        match (test.filter.filter_type, test.operator) {
            (_, Primitive::IsEmpty) => Ok(format!("{column}=BLANK()")),
            (_, Primitive::IsNotEmpty) => Ok(format!("NOT({column}=BLANK())")),
            (FilterType::Date, operator) => self.render_date(&column, operator, test, anchor),
            (FilterType::Checkbox, Primitive::Eq) => {
                let flag = if is_checked(&test.value) {
                    "TRUE()"
                } else {
                    "FALSE()"
                };
                Ok(format!("{column}={flag}"))
            }
            (FilterType::Checkbox, _) => Err(unsupported(test)),
            (FilterType::Number, operator) => {
                render_scalar(&column, operator, test, ValueShape::Number)
            }
            (_, operator) => render_scalar(&column, operator, test, ValueShape::String),
        }
    }

    fn render_date(
        &self,
        column: &str,
        operator: Primitive,
        test: &Test<'_>,
        anchor: NaiveDate,
    ) -> FilterResult<String> {
        if matches!(
            operator,
            Primitive::Contains | Primitive::Filename | Primitive::DoesNotContain
        ) {
            return Err(unsupported(test));
        }

        let range = self.resolver.resolve(&date_filter(&test.value)?, anchor)?;
        let (start, end) = (range.start, range.end);

        let formula = match operator {
            Primitive::Eq => format!("IS_SAME({column},'{start}','days')"),
            Primitive::Ne => format!("NOT(IS_SAME({column},'{start}','days'))"),
            Primitive::Lt => format!("IS_BEFORE({column},'{start}','days')"),
            Primitive::Gt => format!("IS_AFTER({column},'{start}','days')"),
            Primitive::Lte => format!("IS_BEFORE({column},'{}','days')", add_days(start, 1)?),
            Primitive::Gte => format!("IS_AFTER({column},'{}','days')", add_days(start, -1)?),
            Primitive::IsWithin => {
                format!("AND(IS_AFTER({column},'{start}'),IS_BEFORE({column},'{end}'))")
            }
            Primitive::Contains
            | Primitive::Filename
            | Primitive::DoesNotContain
            | Primitive::IsEmpty
            | Primitive::IsNotEmpty => return Err(unsupported(test)),
        };
        Ok(formula)
    }
}

fn render_scalar(
    column: &str,
    operator: Primitive,
    test: &Test<'_>,
    shape: ValueShape,
) -> FilterResult<String> {
    let formula = match operator {
        Primitive::Eq
        | Primitive::Ne
        | Primitive::Gt
        | Primitive::Gte
        | Primitive::Lt
        | Primitive::Lte => {
            format!("{column}{}{}", operator.token(), literal(&test.value, shape)?)
        }
        Primitive::Contains | Primitive::Filename => {
            format!("FIND({},{column})", literal(&test.value, shape)?)
        }
        Primitive::DoesNotContain => {
            format!("FIND({},{column})=FALSE()", literal(&test.value, shape)?)
        }
        Primitive::IsWithin | Primitive::IsEmpty | Primitive::IsNotEmpty => {
            return Err(unsupported(test))
        }
    };
    Ok(formula)
}

/// Checkbox filters are checked for `"1"` (or `true`).
fn is_checked(value: &FilterValue) -> bool {
    match value {
        FilterValue::Text(s) => s == "1",
        FilterValue::Bool(b) => *b,
        _ => false,
    }
}

fn unsupported(test: &Test<'_>) -> FilterError {
    FilterError::unsupported_operator(test.operator.token(), test.filter.filter_type.as_str())
}

/// Compiles `tree` with the default configuration.
///
/// See [`FormulaCompiler::compile`].
pub fn compile(
    tree: &FilterGroup,
    available: &[FilterDescriptor],
    anchor: NaiveDate,
) -> FilterResult<String> {
    FormulaCompiler::new(available).compile(tree, anchor)
}

/// Parses the admin UI payload and compiles it with the default configuration.
///
/// See [`FilterGroup::from_json`] and [`FormulaCompiler::compile`].
pub fn compile_json(
    json: &str,
    available: &[FilterDescriptor],
    anchor: NaiveDate,
) -> FilterResult<String> {
    compile(&FilterGroup::from_json(json)?, available, anchor)
}
