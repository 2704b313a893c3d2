use super::*;
use serde_json::json;

fn render(v: Value) -> Value {
    let spec = ChartSpec::from_json(&v).unwrap();
    render_base_chart(&spec).unwrap().to_json()
}

#[test]
fn bar_template() {
    let out = render(json!({
        "title": "Sales", "type": "bar", "x_name": "cat", "y_name": "val",
        "x_data": ["A", "B"], "y_data": [1, 2]
    }));
    assert_eq!(out["$schema"], "https://vega.github.io/schema/vega-lite/v5.json");
    assert_eq!(out["title"], "Sales");
    assert_eq!(out["data"]["values"][1], json!({"cat": "B", "val": 2}));
    assert_eq!(
        out["layer"],
        json!([{
            "mark": {"type": "bar"},
            "encoding": {
                "x": {"field": "cat", "type": "nominal", "title": "cat", "axis": {"labelAngle": -45}},
                "y": {"field": "val", "type": "quantitative", "title": "val", "axis": {"grid": false}}
            }
        }])
    );
}

#[test]
fn line_template_has_nice_scale_but_group_line_does_not() {
    let line = render(json!({"type": "line", "x_name": "d", "y_name": "v", "x_data": ["2024-1-1"], "y_data": [1]}));
    let x = &line["layer"][0]["encoding"]["x"];
    assert_eq!(x["type"], "temporal");
    assert_eq!(x["scale"], json!({"nice": true}));
    assert_eq!(line["layer"][0]["mark"], json!({"type": "line", "point": true}));

    let grouped = render(json!({
        "type": "group_line", "x_name": "d", "y_name": "v", "classify_name": "g",
        "x_data": ["2024-1-1"], "y_data": [[1]], "classify": ["a"]
    }));
    let enc = &grouped["layer"][0]["encoding"];
    assert!(enc["x"].get("scale").is_none());
    assert_eq!(enc["color"], json!({"field": "g", "type": "nominal", "title": "g"}));
}

#[test]
fn group_bar_offsets_by_group() {
    let out = render(json!({
        "type": "group_bar", "x_name": "c", "y_name": "v", "classify_name": "g",
        "x_data": ["A"], "y_data": [[1], [2]], "classify": ["x", "y"]
    }));
    let enc = out["layer"][0]["encoding"].as_object().unwrap();
    let channels: Vec<&str> = enc.keys().map(String::as_str).collect();
    assert_eq!(channels, vec!["x", "xOffset", "y", "color"]);
    assert_eq!(enc["xOffset"], json!({"field": "g", "type": "nominal"}));
}

#[test]
fn pie_template_classifies_as_pie() {
    let spec = ChartSpec::from_json(&json!({
        "title": "Share", "type": "pie", "x_name": "brand", "y_name": "share",
        "x_data": ["A", "B"], "y_data": [60, 40]
    }))
    .unwrap();
    let chart = render_base_chart(&spec).unwrap();
    assert_eq!(chart.field_info().unwrap().archetype(), Archetype::Pie);
    let enc = chart.to_json()["layer"][0]["encoding"].clone();
    assert_eq!(
        enc,
        json!({
            "theta": {"field": "share", "type": "quantitative", "stack": true, "title": "share"},
            "color": {"field": "brand", "type": "nominal", "title": "brand"},
            "tooltip": [{"field": "brand", "type": "nominal"}, {"field": "share", "type": "quantitative"}],
            "opacity": {"value": 1}
        })
    );
}

#[test]
fn every_kind_round_trips_its_archetype() {
    for kind in Archetype::ALL {
        let grouped = kind.is_grouped();
        let spec = ChartSpec::from_json(&json!({
            "type": kind.as_str(), "x_name": "x", "y_name": "y",
            "classify_name": if grouped { json!("g") } else { Value::Null },
            "x_data": if kind.is_scatter() { json!([1, 2]) } else if kind.is_line() { json!(["2024-1-1", "2024-1-2"]) } else { json!(["a", "b"]) },
            "y_data": if grouped { json!([[1, 2]]) } else { json!([1, 2]) },
            "classify": ["one"]
        }))
        .unwrap();
        let chart = render_base_chart(&spec).unwrap();
        assert_eq!(chart.field_info().unwrap().archetype(), kind, "{kind}");
    }
}
