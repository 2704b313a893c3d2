use super::*;
use serde_json::json;

fn to_json(steps: Vec<Transform>) -> Value {
    Value::Array(steps.iter().map(Transform::to_json).collect())
}

#[test]
fn aggregate_and_calculate_shapes() {
    let steps = TransformPipeline::new()
        .aggregate("mean", "val", "mean_y")
        .calculate("'mean:' + format(datum['mean_y'], '.2f')", "mean_label")
        .build();
    assert_eq!(
        to_json(steps),
        json!([
            {"aggregate": [{"op": "mean", "field": "val", "as": "mean_y"}]},
            {"calculate": "'mean:' + format(datum['mean_y'], '.2f')", "as": "mean_label"}
        ])
    );
}

#[test]
fn filter_if_skips_absent_predicate() {
    assert!(TransformPipeline::new().filter_if(None).build().is_empty());
    let steps = TransformPipeline::new()
        .filter_if(Some(json!({"field": "a", "oneOf": ["x"]})))
        .build();
    assert_eq!(steps, vec![Transform::Filter(json!({"field": "a", "oneOf": ["x"]}))]);
}

#[test]
fn row_number_filter_selects_single_row() {
    assert_eq!(
        to_json(TransformPipeline::new().row_number_filter(1).build()),
        json!([
            {"window": [{"op": "row_number", "as": "index"}]},
            {"filter": "datum.index == 1"}
        ])
    );
}

#[test]
fn adjusted_value_and_rank_window() {
    let steps = TransformPipeline::new()
        .max_and_adjusted_value("val", "20.0")
        .rank_window("val", SortOrder::Descending, "rank")
        .build();
    assert_eq!(
        to_json(steps),
        json!([
            {"window": [{"op": "max", "as": "max_value", "field": "val"}]},
            {"calculate": "datum['val'] + (datum['max_value'] / 20.0)", "as": "adjusted_y"},
            {"window": [{"op": "rank", "as": "rank"}], "sort": [{"field": "val", "order": "descending"}]}
        ])
    );
}

#[test]
fn regression_omits_empty_groupby() {
    let plain = TransformPipeline::new().regression("y", "x", vec![]).build();
    assert_eq!(to_json(plain), json!([{"regression": "y", "on": "x"}]));
    let grouped = TransformPipeline::new()
        .regression("y", "x", vec!["g".to_string()])
        .build();
    assert_eq!(
        to_json(grouped),
        json!([{"regression": "y", "on": "x", "groupby": ["g"]}])
    );
}

#[test]
fn datum_ref_escapes_quotes_and_backslashes() {
    assert_eq!(datum_ref("val"), "datum['val']");
    assert_eq!(datum_ref("it's"), r"datum['it\'s']");
    assert_eq!(datum_ref(r"a\b"), r"datum['a\\b']");
}

#[test]
fn adjusted_value_escapes_field_names() {
    let steps = TransformPipeline::new()
        .max_and_adjusted_value("o'clock", "20")
        .build();
    assert_eq!(
        to_json(steps)[1],
        json!({"calculate": r"datum['o\'clock'] + (datum['max_value'] / 20)", "as": "adjusted_y"})
    );
}
