//! Tests for formula compilation.

use chrono::{NaiveDate, Weekday};
use serde_json::json;

use super::*;
use crate::config::CompilerConfig;

fn anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
}

fn available() -> Vec<FilterDescriptor> {
    vec![
        FilterDescriptor::new("fldTitle", "Title", FilterType::String),
        FilterDescriptor::new("fldPages", "Pages", FilterType::Number),
        FilterDescriptor::new("fldDue", "Due", FilterType::Date),
        FilterDescriptor::new("fldOwner", "Owner", FilterType::User),
        FilterDescriptor::new("fldStatus", "Status", FilterType::Select),
        FilterDescriptor::new("fldTags", "Tags", FilterType::MultiSelect),
        FilterDescriptor::new("fldLinks", "Links", FilterType::LinkToAnotherRecord),
        FilterDescriptor::new("fldFiles", "Files", FilterType::Attachment),
        FilterDescriptor::new("fldDone", "Done", FilterType::Checkbox),
    ]
}

fn column_name(id: &str) -> String {
    id.trim_start_matches("fld").to_string()
}

fn criterion(id: &str, operator: Operator, value: impl Into<FilterValue>) -> FilterNode {
    Criterion::new(id, column_name(id), operator, value).into()
}

fn compile_and(nodes: Vec<FilterNode>) -> FilterResult<String> {
    compile(&FilterGroup::and(nodes), &available(), anchor())
}

fn compile_one(id: &str, operator: Operator, value: impl Into<FilterValue>) -> String {
    compile_and(vec![criterion(id, operator, value)]).unwrap()
}

fn date(mode: &str) -> DateValue {
    DateValue::mode(mode)
}

// ==================== Groups ====================

#[test]
fn test_empty_root_is_empty_string() {
    assert_eq!(compile_and(vec![]).unwrap(), "");
    assert_eq!(
        compile(&FilterGroup::or(vec![]), &available(), anchor()).unwrap(),
        ""
    );
}

#[test]
fn test_empty_root_with_no_available_filters() {
    assert_eq!(compile(&FilterGroup::default(), &[], anchor()).unwrap(), "");
}

#[test]
fn test_children_are_joined_in_order() {
    let formula = compile_and(vec![
        criterion("fldTitle", Operator::Eq, "A"),
        criterion("fldPages", Operator::Gt, 10_i64),
        criterion("fldTitle", Operator::Eq, "A"),
    ])
    .unwrap();
    assert_eq!(formula, r#"AND({Title}="A", {Pages}>10, {Title}="A")"#);
}

#[test]
fn test_nested_groups() {
    let formula = compile_and(vec![
        criterion("fldTitle", Operator::Contains, "rust"),
        FilterGroup::or(vec![
            criterion("fldPages", Operator::Lt, 100_i64),
            criterion("fldOwner", Operator::IsEmpty, FilterValue::Null),
        ])
        .into(),
    ])
    .unwrap();
    assert_eq!(
        formula,
        r#"AND(FIND("rust",{Title}), OR({Pages}<100, {Owner}=BLANK()))"#
    );
}

#[test]
fn test_nested_empty_group_is_dropped() {
    let formula = compile_and(vec![
        FilterGroup::or(vec![]).into(),
        criterion("fldTitle", Operator::IsNotEmpty, FilterValue::Null),
        FilterGroup::and(vec![FilterGroup::or(vec![]).into()]).into(),
    ])
    .unwrap();
    assert_eq!(formula, "AND(NOT({Title}=BLANK()))");
}

#[test]
fn test_group_of_empty_groups_is_empty() {
    let formula = compile_and(vec![FilterGroup::or(vec![]).into()]).unwrap();
    assert_eq!(formula, "");
}

// ==================== Scalar operators ====================

#[test]
fn test_string_comparisons() {
    assert_eq!(
        compile_one("fldTitle", Operator::Eq, "x"),
        r#"AND({Title}="x")"#
    );
    assert_eq!(
        compile_one("fldTitle", Operator::Ne, "x"),
        r#"AND({Title}!="x")"#
    );
    assert_eq!(
        compile_one("fldOwner", Operator::Eq, "Ann"),
        r#"AND({Owner}="Ann")"#
    );
    assert_eq!(
        compile_one("fldStatus", Operator::Ne, "Done"),
        r#"AND({Status}!="Done")"#
    );
}

#[test]
fn test_number_comparisons() {
    assert_eq!(
        compile_one("fldPages", Operator::Gt, 10_i64),
        "AND({Pages}>10)"
    );
    assert_eq!(
        compile_one("fldPages", Operator::Gte, "10"),
        "AND({Pages}>=10)"
    );
    assert_eq!(
        compile_one("fldPages", Operator::Lt, "2.5"),
        "AND({Pages}<2.5)"
    );
    assert_eq!(
        compile_one("fldPages", Operator::Lte, -3_i64),
        "AND({Pages}<=-3)"
    );
    assert_eq!(
        compile_one("fldPages", Operator::Eq, 0_i64),
        "AND({Pages}=0)"
    );
    assert_eq!(
        compile_one("fldPages", Operator::Ne, "7"),
        "AND({Pages}!=7)"
    );
}

#[test]
fn test_number_rejects_non_numeric_text() {
    let err = compile_and(vec![criterion("fldPages", Operator::Gt, "1 OR TRUE()")]).unwrap_err();
    assert!(matches!(err, FilterError::InvalidValue { .. }));
}

#[test]
fn test_contains_and_filename() {
    assert_eq!(
        compile_one("fldTitle", Operator::Contains, "rust"),
        r#"AND(FIND("rust",{Title}))"#
    );
    assert_eq!(
        compile_one("fldFiles", Operator::Filename, ".pdf"),
        r#"AND(FIND(".pdf",{Files}))"#
    );
    assert_eq!(
        compile_one("fldTitle", Operator::DoesNotContain, "draft"),
        r#"AND(FIND("draft",{Title})=FALSE())"#
    );
}

#[test]
fn test_contains_on_number_uses_number_literal() {
    assert_eq!(
        compile_one("fldPages", Operator::Contains, 42_i64),
        "AND(FIND(42,{Pages}))"
    );
}

#[test]
fn test_presence_on_every_type() {
    for filter in available() {
        let empty = compile_one(&filter.id, Operator::IsEmpty, FilterValue::Null);
        let not_empty = compile_one(&filter.id, Operator::IsNotEmpty, "ignored");
        let column = format!("{{{}}}", column_name(&filter.id));
        assert_eq!(empty, format!("AND({column}=BLANK())"));
        assert_eq!(not_empty, format!("AND(NOT({column}=BLANK()))"));
    }
}

#[test]
fn test_string_value_escaping() {
    assert_eq!(
        compile_one("fldTitle", Operator::Eq, r#"He said "hi""#),
        r#"AND({Title}="He said \"hi\"")"#
    );
    assert_eq!(
        compile_one("fldTitle", Operator::Contains, r#"a\"), TRUE(), ("#),
        r#"AND(FIND("a\\\"), TRUE(), (",{Title}))"#
    );
}

#[test]
fn test_missing_value_is_empty_string() {
    assert_eq!(
        compile_one("fldTitle", Operator::Eq, FilterValue::Null),
        r#"AND({Title}="")"#
    );
}

#[test]
fn test_is_within_on_string_is_unsupported() {
    let err = compile_and(vec![criterion("fldTitle", Operator::IsWithin, date("pastWeek"))])
        .unwrap_err();
    assert_eq!(err, FilterError::unsupported_operator("isWithin", "string"));
}

// ==================== Multi-value operators ====================

#[test]
fn test_is_any_of_matches_hand_built_or() {
    let expanded = compile_one("fldStatus", Operator::IsAnyOf, vec!["a", "b"]);
    let hand_built = compile_and(vec![FilterGroup::or(vec![
        criterion("fldStatus", Operator::Eq, "a"),
        criterion("fldStatus", Operator::Eq, "b"),
    ])
    .into()])
    .unwrap();

    assert_eq!(expanded, hand_built);
    assert_eq!(expanded, r#"AND(OR({Status}="a", {Status}="b"))"#);
}

#[test]
fn test_is_none_of_matches_hand_built_and() {
    let expanded = compile_one("fldTitle", Operator::IsNoneOf, vec!["a", "b"]);
    let hand_built = compile_and(vec![FilterGroup::and(vec![
        criterion("fldTitle", Operator::Ne, "a"),
        criterion("fldTitle", Operator::Ne, "b"),
    ])
    .into()])
    .unwrap();

    assert_eq!(expanded, hand_built);
    assert_eq!(expanded, r#"AND(AND({Title}!="a", {Title}!="b"))"#);
}

#[test]
fn test_has_operators() {
    assert_eq!(
        compile_one("fldTags", Operator::HasAnyOf, vec!["x", "y"]),
        r#"AND(OR(FIND("x",{Tags}), FIND("y",{Tags})))"#
    );
    assert_eq!(
        compile_one("fldTags", Operator::HasAllOf, vec!["x", "y"]),
        r#"AND(AND(FIND("x",{Tags}), FIND("y",{Tags})))"#
    );
    assert_eq!(
        compile_one("fldLinks", Operator::HasNoneOf, vec!["x", "y"]),
        r#"AND(AND(FIND("x",{Links})=FALSE(), FIND("y",{Links})=FALSE()))"#
    );
}

#[test]
fn test_of_many_scalar_value_is_single_element() {
    assert_eq!(
        compile_one("fldStatus", Operator::IsAnyOf, "a"),
        r#"AND(OR({Status}="a"))"#
    );
}

#[test]
fn test_of_many_empty_list_is_dropped() {
    let formula = compile_and(vec![
        criterion("fldStatus", Operator::IsAnyOf, Vec::<String>::new()),
        criterion("fldTitle", Operator::Eq, "x"),
    ])
    .unwrap();
    assert_eq!(formula, r#"AND({Title}="x")"#);

    assert_eq!(
        compile_one("fldStatus", Operator::IsAnyOf, FilterValue::Null),
        ""
    );
}

#[test]
fn test_of_many_on_number_field() {
    assert_eq!(
        compile_one("fldPages", Operator::IsAnyOf, vec![1_i64, 2_i64]),
        "AND(OR({Pages}=1, {Pages}=2))"
    );
}

#[test]
fn test_of_many_escapes_each_value() {
    assert_eq!(
        compile_one("fldTags", Operator::HasAnyOf, vec![r#"say "x""#]),
        r#"AND(OR(FIND("say \"x\"",{Tags})))"#
    );
}

// ==================== Dates ====================

#[test]
fn test_date_comparisons() {
    let exact = DateValue::exact("2024-03-10");
    assert_eq!(
        compile_one("fldDue", Operator::Eq, exact.clone()),
        "AND(IS_SAME({Due},'2024-03-10','days'))"
    );
    assert_eq!(
        compile_one("fldDue", Operator::Ne, exact.clone()),
        "AND(NOT(IS_SAME({Due},'2024-03-10','days')))"
    );
    assert_eq!(
        compile_one("fldDue", Operator::Lt, exact.clone()),
        "AND(IS_BEFORE({Due},'2024-03-10','days'))"
    );
    assert_eq!(
        compile_one("fldDue", Operator::Gt, exact.clone()),
        "AND(IS_AFTER({Due},'2024-03-10','days'))"
    );
    assert_eq!(
        compile_one("fldDue", Operator::Lte, exact.clone()),
        "AND(IS_BEFORE({Due},'2024-03-11','days'))"
    );
    assert_eq!(
        compile_one("fldDue", Operator::Gte, exact),
        "AND(IS_AFTER({Due},'2024-03-09','days'))"
    );
}

#[test]
fn test_date_relative_modes_use_anchor() {
    assert_eq!(
        compile_one("fldDue", Operator::Eq, date("today")),
        "AND(IS_SAME({Due},'2024-03-10','days'))"
    );
    assert_eq!(
        compile_one("fldDue", Operator::Gt, date("tomorrow")),
        "AND(IS_AFTER({Due},'2024-03-11','days'))"
    );
    assert_eq!(
        compile_one("fldDue", Operator::Lt, date("daysAgo").with_days(3)),
        "AND(IS_BEFORE({Due},'2024-03-07','days'))"
    );
}

#[test]
fn test_date_is_within() {
    assert_eq!(
        compile_one("fldDue", Operator::IsWithin, date("pastWeek")),
        "AND(AND(IS_AFTER({Due},'2024-03-03'),IS_BEFORE({Due},'2024-03-11')))"
    );
    assert_eq!(
        compile_one("fldDue", Operator::IsWithin, date("nextNumberOfDays").with_days(2)),
        "AND(AND(IS_AFTER({Due},'2024-03-09'),IS_BEFORE({Due},'2024-03-13')))"
    );
    assert_eq!(
        compile_one("fldDue", Operator::IsWithin, date("calendarMonth")),
        "AND(AND(IS_AFTER({Due},'2024-02-29'),IS_BEFORE({Due},'2024-04-01')))"
    );
}

#[test]
fn test_calendar_week_follows_config() {
    let available = available();
    let tree = FilterGroup::and(vec![criterion(
        "fldDue",
        Operator::IsWithin,
        date("calendarWeek"),
    )]);

    let monday = FormulaCompiler::new(&available).compile(&tree, anchor()).unwrap();
    assert_eq!(
        monday,
        "AND(AND(IS_AFTER({Due},'2024-03-03'),IS_BEFORE({Due},'2024-03-11')))"
    );

    let config = CompilerConfig {
        week_starts_on: Weekday::Sun,
        ..CompilerConfig::default()
    };
    let sunday = FormulaCompiler::with_config(&available, &config)
        .compile(&tree, anchor())
        .unwrap();
    assert_eq!(
        sunday,
        "AND(AND(IS_AFTER({Due},'2024-03-09'),IS_BEFORE({Due},'2024-03-17')))"
    );
}

#[test]
fn test_date_invalid_values() {
    let cases: Vec<FilterValue> = vec![
        FilterValue::Null,
        FilterValue::from("2024-03-10"),
        date("someday").into(),
        DateValue::exact("10/03/2024").into(),
        serde_json::from_value(json!({"mode": "daysAgo", "numberOfDays": "many"})).unwrap(),
        date("daysAgo").into(),
    ];

    for value in cases {
        let err = compile_and(vec![criterion("fldDue", Operator::Eq, value.clone())]).unwrap_err();
        assert!(
            matches!(err, FilterError::InvalidDateValue { .. }),
            "{value:?}: {err}"
        );
    }
}

#[test]
fn test_date_fields_of_wrong_json_type_are_invalid_dates() {
    for value in [
        json!({"mode": "daysAgo", "numberOfDays": true}),
        json!({"mode": "exactDate", "input": 20240310}),
        json!({"mode": 5}),
    ] {
        let payload = json!({
            "conjunction": "and",
            "filters": [
                {"columnId": "fldDue", "columnName": "Due", "operator": "=", "value": value}
            ]
        });

        let err = compile_json(&payload.to_string(), &available(), anchor()).unwrap_err();
        assert!(
            matches!(err, FilterError::InvalidDateValue { .. }),
            "{value}: {err}"
        );
    }
}

#[test]
fn test_date_text_operators_are_unsupported() {
    let err = compile_and(vec![criterion("fldDue", Operator::Contains, date("today"))])
        .unwrap_err();
    assert_eq!(err, FilterError::unsupported_operator("contains", "date"));
}

// ==================== Checkboxes ====================

#[test]
fn test_checkbox_equality() {
    assert_eq!(
        compile_one("fldDone", Operator::Eq, "1"),
        "AND({Done}=TRUE())"
    );
    assert_eq!(
        compile_one("fldDone", Operator::Eq, "0"),
        "AND({Done}=FALSE())"
    );
    assert_eq!(
        compile_one("fldDone", Operator::Eq, true),
        "AND({Done}=TRUE())"
    );
    assert_eq!(
        compile_one("fldDone", Operator::Eq, FilterValue::Null),
        "AND({Done}=FALSE())"
    );
}

#[test]
fn test_checkbox_other_operators_are_unsupported() {
    let err = compile_and(vec![criterion("fldDone", Operator::Ne, "1")]).unwrap_err();
    assert_eq!(err, FilterError::unsupported_operator("!=", "checkbox"));
}

// ==================== Errors ====================

#[test]
fn test_unknown_column_fails() {
    let err = compile_and(vec![
        criterion("fldTitle", Operator::Eq, "x"),
        Criterion::new("fldRemoved", "Removed", Operator::Eq, "x").into(),
    ])
    .unwrap_err();
    assert_eq!(err, FilterError::filter_not_available("Removed"));
}

#[test]
fn test_unknown_column_in_nested_group_fails() {
    let err = compile_and(vec![FilterGroup::or(vec![
        Criterion::new("fldRemoved", "Removed", Operator::IsEmpty, FilterValue::Null).into(),
    ])
    .into()])
    .unwrap_err();
    assert_eq!(err, FilterError::filter_not_available("Removed"));
}

#[test]
fn test_too_deep() {
    let mut tree = FilterGroup::and(vec![criterion("fldTitle", Operator::Eq, "x")]);
    for _ in 0..40 {
        tree = FilterGroup::or(vec![tree.into()]);
    }

    let err = compile(&tree, &available(), anchor()).unwrap_err();
    assert_eq!(err, FilterError::TooDeep { limit: 32 });

    let config = CompilerConfig {
        max_depth: 64,
        ..CompilerConfig::default()
    };
    let available = available();
    assert!(FormulaCompiler::with_config(&available, &config)
        .compile(&tree, anchor())
        .is_ok());
}

// ==================== Properties ====================

#[test]
fn test_compile_is_deterministic() {
    let tree = FilterGroup::or(vec![
        criterion("fldStatus", Operator::IsAnyOf, vec!["a", "b", "c"]),
        criterion("fldDue", Operator::IsWithin, date("pastMonth")),
        FilterGroup::and(vec![
            criterion("fldPages", Operator::Gte, 3_i64),
            criterion("fldDone", Operator::Eq, "1"),
        ])
        .into(),
    ]);

    let first = compile(&tree, &available(), anchor()).unwrap();
    for _ in 0..10 {
        assert_eq!(compile(&tree, &available(), anchor()).unwrap(), first);
    }
}

#[test]
fn test_compile_json() {
    let payload = json!({
        "conjunction": "or",
        "filters": [
            {"columnId": "fldStatus", "columnName": "Status", "operator": "isNoneOf", "value": ["Done"]},
            {"conjunction": "and", "filters": [
                {"columnId": "fldDue", "columnName": "Due", "operator": "<=", "value": {"mode": "exactDate", "input": "2024-12-31"}},
                {"columnId": "fldDone", "columnName": "Done", "operator": "=", "value": "1"}
            ]}
        ]
    });

    let formula = compile_json(&payload.to_string(), &available(), anchor()).unwrap();
    assert_eq!(
        formula,
        r#"OR(AND({Status}!="Done"), AND(IS_BEFORE({Due},'2025-01-01','days'), {Done}=TRUE()))"#
    );
}

#[test]
fn test_compile_json_unknown_conjunction() {
    let payload = r#"{"conjunction": "nand", "filters": [
        {"columnId": "fldTitle", "columnName": "Title", "operator": "isEmpty"}
    ]}"#;
    let err = compile_json(payload, &available(), anchor()).unwrap_err();
    assert_eq!(err, FilterError::unknown_conjunction("nand"));
}
