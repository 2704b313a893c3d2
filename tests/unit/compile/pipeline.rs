use super::*;
use serde_json::json;

fn bar_doc(annotations: Value) -> Value {
    json!({
        "chart": {
            "title": "Sales", "type": "bar", "x_name": "cat", "y_name": "val",
            "x_data": ["A", "B", "C"], "y_data": [1, 2, 3]
        },
        "annotations": annotations
    })
}

fn stroke(color: &str, category: &str) -> Value {
    json!({
        "id": format!("stroke-{color}"),
        "method": {"type": "highlight"},
        "techniques": [{
            "name": "stroke",
            "target": {"type": "data_items", "filter": {"axisType": "category", "oneOf": [category]}},
            "marker": {"stroke": {"width": 2, "color": color}}
        }]
    })
}

fn broken_grid() -> Value {
    json!({
        "id": "grid",
        "method": {"type": "reference", "subType": "grid_line"},
        "techniques": [{"name": "grid_line", "target": {"type": "chart_element", "yAxis": {"grid": true, "interval": -5}}}]
    })
}

#[test]
fn stroke_conditions_base_layer() {
    let out = Compiler::default()
        .compile_value(&bar_doc(json!([stroke("red", "B")])))
        .unwrap();
    assert!(out.skipped.is_empty());
    let chart = out.chart.to_json();
    assert_eq!(chart["layer"].as_array().map(Vec::len), Some(1));
    let enc = &chart["layer"][0]["encoding"];
    assert_eq!(
        enc["stroke"],
        json!({"condition": {"test": {"field": "cat", "oneOf": ["B"]}, "value": "red"}, "value": null})
    );
    assert_eq!(enc["strokeWidth"]["condition"]["test"], json!({"field": "cat", "oneOf": ["B"]}));
}

#[test]
fn later_techniques_win() {
    let out = Compiler::default()
        .compile_value(&bar_doc(json!([stroke("red", "A"), stroke("blue", "C")])))
        .unwrap();
    let stroke = &out.chart.to_json()["layer"][0]["encoding"]["stroke"];
    assert_eq!(stroke["condition"]["value"], "blue");
    assert_eq!(stroke["condition"]["test"]["oneOf"], json!(["C"]));
}

#[test]
fn failed_lowering_is_skipped_and_reported() {
    let out = Compiler::default()
        .compile_value(&bar_doc(json!([broken_grid(), stroke("red", "B")])))
        .unwrap();
    assert_eq!(out.skipped.len(), 1);
    let skip = &out.skipped[0];
    assert_eq!(
        (skip.annotation_id.as_str(), skip.annotation_index, skip.technique.as_str()),
        ("grid", 0, "grid_line")
    );
    assert!(skip.error.contains("interval"), "{}", skip.error);
    let enc = &out.chart.to_json()["layer"][0]["encoding"];
    assert_eq!(enc["stroke"]["condition"]["value"], "red");
    assert!(enc["y"]["axis"].get("values").is_none());
}

#[test]
fn strict_mode_aborts_on_first_failure() {
    let compiler = Compiler::new(TechniqueRegistry::builtin(), CompileOptions { strict: true });
    let err = compiler
        .compile_value(&bar_doc(json!([broken_grid(), stroke("red", "B")])))
        .unwrap_err();
    assert!(matches!(err, ChartmarkError::Lowering(_)));
    assert!(err.to_string().contains("annotation 0 ('grid')"), "{err}");
}

#[test]
fn parse_errors_are_never_soft() {
    let doc = bar_doc(json!([{"method": {"type": "highlight"}, "techniques": []}]));
    assert!(matches!(
        Compiler::default().compile_value(&doc),
        Err(ChartmarkError::Structural(_))
    ));
}

#[test]
fn compile_onto_external_chart() {
    let chart = ChartIr::from_json(&json!({
        "title": "ext",
        "data": {"values": [{"k": "a", "n": 4}, {"k": "b", "n": 6}]},
        "layer": [{
            "mark": "bar",
            "encoding": {"x": {"field": "k", "type": "nominal"}, "y": {"field": "n", "type": "quantitative"}}
        }]
    }))
    .unwrap();
    let compiler = Compiler::default();
    let archetype = chart.field_info().unwrap().archetype();
    let annotations = Annotation::list_from_json(
        &json!([{
            "method": {"type": "encoding"},
            "techniques": [{"name": "label", "target": {"type": "data_items"}, "marker": {"text": {"field": "n"}}}]
        }]),
        compiler.registry(),
        archetype,
    )
    .unwrap();
    let out = compiler.compile_onto(chart, &annotations).unwrap();
    assert_eq!(out.chart.layers.len(), 2);
    assert_eq!(out.chart.layers[1].mark.kind, "text");
}

#[test]
fn no_annotations_is_the_base_chart() {
    let doc = bar_doc(Value::Null);
    let out = Compiler::default().compile_value(&doc).unwrap();
    let parsed = Compiler::default().parse(&doc).unwrap();
    assert_eq!(out.chart, render_base_chart(parsed.chart()).unwrap());
}
