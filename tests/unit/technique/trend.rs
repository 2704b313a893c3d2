use super::*;
use crate::technique::TechniqueKind;
use crate::technique::tests::{bar_chart, group_scatter_chart, layer, line_chart, technique};
use serde_json::json;

fn regression(archetype: Archetype) -> Technique {
    technique(
        TechniqueKind::LinearRegression,
        archetype,
        json!({
            "name": "linear_regression",
            "target": {"type": "data_items"},
            "marker": {"line": {"color": "orange", "size": 3}}
        }),
    )
    .unwrap()
}

#[test]
fn line_regression_of_y_on_x() {
    let out = regression(Archetype::Line)
        .lower(line_chart(), Archetype::Line, None)
        .unwrap();
    let trend = layer(&out, 1);
    assert_eq!(trend["transform"], json!([{"regression": "visits", "on": "date"}]));
    assert_eq!(trend["mark"], json!({"type": "line", "size": 3, "color": "orange"}));
}

#[test]
fn grouped_regression_groups_by_color() {
    let out = regression(Archetype::GroupScatter)
        .lower(group_scatter_chart(), Archetype::GroupScatter, None)
        .unwrap();
    let trend = layer(&out, 1);
    assert_eq!(
        trend["transform"],
        json!([{"regression": "weight", "on": "height", "groupby": ["sex"]}])
    );
    assert_eq!(trend["encoding"]["color"]["field"], "sex");
}

#[test]
fn bar_chart_is_unchanged() {
    let chart = bar_chart();
    let out = regression(Archetype::Bar)
        .lower(chart.clone(), Archetype::Bar, None)
        .unwrap();
    assert_eq!(out, chart);
}
