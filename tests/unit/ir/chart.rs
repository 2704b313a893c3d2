use super::*;
use crate::ir::encoding::Encoding;
use crate::ir::layer::Mark;
use serde_json::json;

#[test]
fn serializes_top_level_keys_in_order() {
    let mut enc = Encoding::new();
    enc.set_field("x", "cat", "nominal");
    let chart = ChartIr::new(
        "Sales",
        vec![json!({"cat": "A"})],
        Layer::new(Mark::new("bar")).with_encoding(enc),
    );
    let text = serde_json::to_string(&chart.to_json()).unwrap();
    assert!(text.starts_with(r#"{"$schema":"https://vega.github.io/schema/vega-lite/v5.json","title":"Sales","data":"#));
    assert!(text.contains(r#""layer":[{"mark":{"type":"bar"},"encoding":{"x":{"field":"cat","type":"nominal"}}}]"#));
}

#[test]
fn parse_keeps_layers_and_extras() {
    let src = json!({
        "$schema": VEGA_LITE_SCHEMA,
        "title": "t",
        "data": {"values": [{"a": 1}, {"a": 4}]},
        "layer": [
            {"mark": {"type": "line", "point": true}, "encoding": {}},
            {"mark": {"type": "rule"}, "encoding": {}, "transform": [{"filter": "datum.a > 1"}]}
        ],
        "width": 400
    });
    let chart = ChartIr::from_json(&src).unwrap();
    assert_eq!(chart.layers.len(), 2);
    assert_eq!(chart.field_numbers("a"), vec![1.0, 4.0]);
    assert_eq!(chart.to_json(), src);
}

#[test]
fn layerless_chart_is_structural_error() {
    let err = ChartIr::from_json(&json!({"data": {}})).unwrap_err();
    assert!(matches!(err, ChartmarkError::Structural(_)));
    let err = ChartIr::from_json(&json!({"layer": [{"encoding": {}}]})).unwrap_err();
    assert!(err.to_string().contains("$.layer[0]"));
}
