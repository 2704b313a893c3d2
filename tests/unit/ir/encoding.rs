use super::*;
use serde_json::json;

#[test]
fn conditional_value_serializes_in_vega_lite_shape() {
    let mut enc = Encoding::new();
    enc.set_value_with_condition("stroke", json!({"field": "cat"}), json!("red"), Value::Null);
    assert_eq!(
        enc.to_json(),
        json!({"stroke": {"condition": {"test": {"field": "cat"}, "value": "red"}, "value": null}})
    );
}

#[test]
fn rebinding_keeps_channel_position() {
    let mut enc = Encoding::new();
    enc.set_field("x", "a", "nominal");
    enc.set_field("y", "b", "quantitative");
    enc.set_value("x", json!(3));
    let names: Vec<&str> = enc.channels().collect();
    assert_eq!(names, ["x", "y"]);
    assert_eq!(enc.get("x"), Some(&Binding::Value(json!(3))));
}

#[test]
fn parse_recognizes_typed_shapes() {
    let enc = Encoding::from_json(&json!({
        "x": {"field": "cat", "type": "nominal", "axis": {"labelAngle": -45}},
        "y": {"datum": 4},
        "size": {"value": 2},
        "color": {"condition": {"test": "datum.a", "value": "red"}, "field": "g", "type": "nominal"},
        "tooltip": [{"field": "cat"}, {"field": "val"}]
    }))
    .unwrap();
    let x = enc.field("x").unwrap();
    assert_eq!(x.field, "cat");
    assert_eq!(x.extra["axis"], json!({"labelAngle": -45}));
    assert_eq!(enc.get("y"), Some(&Binding::Datum(json!(4))));
    assert_eq!(enc.get("size"), Some(&Binding::Value(json!(2))));
    assert!(matches!(enc.get("color"), Some(Binding::Condition(_))));
    assert!(matches!(enc.get("tooltip"), Some(Binding::Raw(_))));
}

#[test]
fn parse_then_serialize_preserves_document() {
    let src = json!({
        "theta": {"field": "v", "type": "quantitative", "stack": true, "title": "v"},
        "color": {"field": "k", "type": "nominal", "title": "k"},
        "tooltip": [{"field": "k", "type": "nominal"}],
        "opacity": {"value": 1}
    });
    assert_eq!(Encoding::from_json(&src).unwrap().to_json(), src);
}

#[test]
fn update_axis_merges_into_existing_axis() {
    let mut enc = Encoding::from_json(&json!({
        "y": {"field": "v", "type": "quantitative", "axis": {"grid": false}}
    }))
    .unwrap();
    let mut props = Map::new();
    props.insert("grid".to_string(), json!(true));
    props.insert("tickCount".to_string(), json!(4));
    enc.update_axis("y", props).unwrap();
    assert_eq!(enc.field("y").unwrap().extra["axis"], json!({"grid": true, "tickCount": 4}));
}

#[test]
fn update_axis_requires_field_binding() {
    let mut enc = Encoding::new();
    enc.set_value("y", json!(0));
    assert!(enc.update_axis("y", Map::new()).is_err());
}

#[test]
fn copy_from_reports_missing_channel() {
    let src = Encoding::new();
    let mut dst = Encoding::new();
    assert!(matches!(
        dst.copy_from(&src, "x"),
        Err(ChartmarkError::Lowering(_))
    ));
    dst.copy_if_present(&src, "color");
    assert!(dst.is_empty());
}

#[test]
fn value_default_field_condition_shape() {
    let mut enc = Encoding::new();
    enc.set_value_default_field_with_condition(
        "color",
        json!("datum.is_max"),
        json!("black"),
        &FieldBinding::new("k", "nominal"),
    );
    assert_eq!(
        enc.to_json(),
        json!({"color": {"condition": {"test": "datum.is_max", "value": "black"}, "field": "k", "type": "nominal"}})
    );
}
