use super::*;
use crate::technique::TechniqueKind;
use crate::technique::tests::{bar_chart, layer, line_chart, pie_chart, scatter_chart, technique};

#[test]
fn bar_data_line_is_a_single_y_rule() {
    let t = technique(
        TechniqueKind::DataLine,
        Archetype::Bar,
        json!({
            "name": "data_line",
            "target": {"type": "data_items", "filter": {"axisType": "category", "oneOf": ["B"]}},
            "marker": {"line": {"color": "green", "size": 1}}
        }),
    )
    .unwrap();
    let out = t.lower(bar_chart(), Archetype::Bar, None).unwrap();
    assert_eq!(out.layers.len(), 2);
    let rule = layer(&out, 1);
    assert_eq!(rule["mark"], json!({"type": "rule", "color": "green", "size": 1}));
    assert_eq!(rule["encoding"]["x2"], json!({"value": 0}));
    assert_eq!(
        rule["transform"],
        json!([{"filter": {"field": "category", "oneOf": ["B"]}}])
    );
}

#[test]
fn line_data_line_adds_both_rules_and_pie_is_untouched() {
    let record = json!({"name": "data_line", "target": {"type": "data_items"}, "marker": {"line": {}}});
    let out = technique(TechniqueKind::DataLine, Archetype::Line, record.clone())
        .unwrap()
        .lower(line_chart(), Archetype::Line, None)
        .unwrap();
    assert_eq!(out.layers.len(), 3);
    assert_eq!(layer(&out, 2)["encoding"]["y2"], json!({"value": "height"}));

    let pie = pie_chart();
    let same = technique(TechniqueKind::DataLine, Archetype::Pie, record)
        .unwrap()
        .lower(pie.clone(), Archetype::Pie, None)
        .unwrap();
    assert_eq!(same, pie);
}

#[test]
fn grid_line_merges_axis_properties() {
    let t = technique(
        TechniqueKind::GridLine,
        Archetype::Bar,
        json!({
            "name": "grid_line",
            "target": {"type": "chart_element", "yAxis": {"grid": true, "tickCount": 4, "interval": 10}}
        }),
    )
    .unwrap();
    let out = t.lower(bar_chart(), Archetype::Bar, None).unwrap();
    assert_eq!(out.layers.len(), 1);
    assert_eq!(
        layer(&out, 0)["encoding"]["y"]["axis"],
        json!({"grid": true, "tickCount": 4, "values": [0, 10, 20, 30]})
    );
    assert!(layer(&out, 0)["encoding"]["x"]["axis"].get("grid").is_none());
}

#[test]
fn grid_line_rejects_non_positive_interval() {
    let t = technique(
        TechniqueKind::GridLine,
        Archetype::Bar,
        json!({"name": "grid_line", "target": {"type": "chart_element", "yAxis": {"grid": true, "interval": 0}}}),
    )
    .unwrap();
    let err = t.lower(bar_chart(), Archetype::Bar, None).unwrap_err();
    assert!(matches!(err, ChartmarkError::Semantic(_)));
}

#[test]
fn grid_line_values_stop_at_field_max() {
    let t = technique(
        TechniqueKind::GridLine,
        Archetype::Bar,
        json!({"name": "grid_line", "target": {"type": "chart_element", "yAxis": {"grid": true, "interval": 0.5}}}),
    )
    .unwrap();
    let out = t.lower(bar_chart(), Archetype::Bar, None).unwrap();
    let values = layer(&out, 0)["encoding"]["y"]["axis"]["values"].clone();
    assert_eq!(values.as_array().map(Vec::len), Some(61));
    assert_eq!(values[60], json!(30));
}

#[test]
fn grid_line_refuses_intervals_needing_too_many_ticks() {
    let t = technique(
        TechniqueKind::GridLine,
        Archetype::Bar,
        json!({"name": "grid_line", "target": {"type": "chart_element", "yAxis": {"grid": true, "interval": 0.0001}}}),
    )
    .unwrap();
    let err = t.lower(bar_chart(), Archetype::Bar, None).unwrap_err();
    assert!(matches!(err, ChartmarkError::Semantic(_)), "{err}");
    assert!(err.to_string().contains("1000"), "{err}");
}

#[test]
fn pie_grid_refuses_huge_tick_count() {
    let t = technique(
        TechniqueKind::GridLine,
        Archetype::Pie,
        json!({"name": "grid_line", "target": {"type": "chart_element", "thetaAxis": {"grid": true, "tickCount": 10_000_000_000_i64}}}),
    )
    .unwrap();
    let err = t.lower(pie_chart(), Archetype::Pie, None).unwrap_err();
    assert!(matches!(err, ChartmarkError::Semantic(_)), "{err}");
}

#[test]
fn pie_grid_uses_theta_interval_without_grid_flag() {
    let t = technique(
        TechniqueKind::GridLine,
        Archetype::Pie,
        json!({
            "name": "grid_line",
            "target": {
                "type": "chart_element",
                "xAxis": {"grid": true},
                "thetaAxis": {"interval": 10, "tickCount": 3}
            }
        }),
    )
    .unwrap();
    let out = t.lower(pie_chart(), Archetype::Pie, None).unwrap();
    let values = layer(&out, 1)["data"]["values"].clone();
    assert_eq!(values.as_array().map(Vec::len), Some(6));
    assert_eq!(values[0], json!({"interval": 10}));
}

#[test]
fn pie_grid_splits_total_into_ticks() {
    let t = technique(
        TechniqueKind::GridLine,
        Archetype::Pie,
        json!({"name": "grid_line", "target": {"type": "chart_element", "thetaAxis": {"grid": true, "tickCount": 4}}}),
    )
    .unwrap();
    let out = t.lower(pie_chart(), Archetype::Pie, None).unwrap();
    let arc = layer(&out, 1);
    assert_eq!(arc["data"]["values"].as_array().map(Vec::len), Some(4));
    assert_eq!(arc["data"]["values"][0], json!({"interval": 25}));
    assert_eq!(arc["encoding"]["theta"], json!({"field": "interval", "type": "quantitative"}));
    assert_eq!(arc["mark"]["outerRadius"], 80);
}

#[test]
fn bounding_box_uses_coordinate_datums() {
    let t = technique(
        TechniqueKind::BoundingBox,
        Archetype::Scatter,
        json!({
            "name": "bounding_box",
            "target": {"type": "coordinate", "xyCoordinate": {"x": 150, "x1": 170, "y": 50, "y1": 60}},
            "marker": {"rect": {"stroke": "black", "strokeWidth": 1}}
        }),
    )
    .unwrap();
    let out = t.lower(scatter_chart(), Archetype::Scatter, None).unwrap();
    let rect = layer(&out, 1);
    assert_eq!(
        rect["encoding"],
        json!({"y": {"datum": 50}, "y2": {"datum": 60}, "x": {"datum": 150}, "x2": {"datum": 170}})
    );
    assert_eq!(
        rect["mark"],
        json!({"type": "rect", "fillOpacity": 0, "stroke": "black", "strokeWidth": 1})
    );
}

#[test]
fn shadow_prefers_y_range() {
    let t = technique(
        TechniqueKind::Shadow,
        Archetype::Line,
        json!({
            "name": "shadow",
            "target": {"type": "coordinate", "xyCoordinate": {
                "x": {"year": 2024, "month": 1}, "x1": {"year": 2024, "month": "March"},
                "y": 6, "y1": 8
            }},
            "marker": {"rect": {"color": "yellow", "opacity": 0.3}}
        }),
    )
    .unwrap();
    let out = t.lower(line_chart(), Archetype::Line, None).unwrap();
    let rect = layer(&out, 1);
    assert_eq!(rect["encoding"], json!({"y": {"datum": 6}, "y2": {"datum": 8}}));
    assert_eq!(rect["mark"], json!({"type": "rect", "color": "yellow", "opacity": 0.3}));
}

#[test]
fn pie_shadow_is_an_arc() {
    let t = technique(
        TechniqueKind::Shadow,
        Archetype::Pie,
        json!({
            "name": "shadow",
            "target": {"type": "coordinate", "polarCoordinate": {"theta": 10, "theta2": 40}},
            "marker": {"rect": {}}
        }),
    )
    .unwrap();
    let out = t.lower(pie_chart(), Archetype::Pie, None).unwrap();
    let arc = layer(&out, 1);
    assert_eq!(arc["encoding"], json!({"theta": {"datum": 10}, "theta2": {"datum": 40}}));
    assert_eq!(arc["mark"]["outerRadius"], 90);
    assert_eq!(arc["mark"]["fillOpacity"], 0.5);
}

#[test]
fn label_line_on_y_pins_x_to_width() {
    let t = technique(
        TechniqueKind::LabelLine,
        Archetype::Bar,
        json!({
            "name": "label_line",
            "target": {"type": "coordinate", "xyCoordinate": {"y": 25}},
            "marker": {"line": {"color": "gray", "size": 1}}
        }),
    )
    .unwrap();
    let out = t.lower(bar_chart(), Archetype::Bar, None).unwrap();
    assert_eq!(out.layers.len(), 3);
    assert_eq!(layer(&out, 1)["encoding"], json!({"y": {"datum": 25}}));
    let text = layer(&out, 2);
    assert_eq!(
        text["mark"],
        json!({"type": "text", "color": "red", "baseline": "middle", "align": "left", "dx": 3})
    );
    assert_eq!(
        text["encoding"],
        json!({"text": {"value": "25"}, "y": {"datum": 25}, "x": {"value": "width"}})
    );
}

#[test]
fn label_line_on_temporal_x_uses_iso_label() {
    let t = technique(
        TechniqueKind::LabelLine,
        Archetype::Line,
        json!({
            "name": "label_line",
            "target": {"type": "coordinate", "xyCoordinate": {"x": {"year": 2024, "month": 2}}},
            "marker": {"line": {}, "text": {"field": "date", "color": "purple"}}
        }),
    )
    .unwrap();
    let out = t.lower(line_chart(), Archetype::Line, None).unwrap();
    let text = layer(&out, 2);
    assert_eq!(text["encoding"]["text"], json!({"value": "2024-02-01"}));
    assert_eq!(text["encoding"]["y"], json!({"value": 0}));
    assert_eq!(text["mark"]["angle"], 300);
    assert_eq!(text["mark"]["color"], "purple");
}

#[test]
fn check_range_requires_one_complete_pair() {
    use crate::annotation::target::{CartesianPoint, Coordinate, PolarPoint};
    use crate::foundation::value::Comparable;

    let n = |v: i64| Some(Comparable::Number(v.into()));
    let lone = Coordinate::Cartesian(CartesianPoint {
        x: n(1),
        ..CartesianPoint::default()
    });
    assert!(check_range(&lone).is_err());
    let empty = Coordinate::Cartesian(CartesianPoint::default());
    assert!(check_range(&empty).is_err());
    let polar = Coordinate::Polar(PolarPoint {
        theta: Some(5.into()),
        theta2: Some(9.into()),
        ..PolarPoint::default()
    });
    assert!(check_range(&polar).is_ok());
    assert!(check_line(&Coordinate::Polar(PolarPoint::default())).is_err());
}
