use super::*;
use serde_json::json;

#[test]
fn data_items_without_filter_selects_all() {
    let t = Target::from_json(&json!({"type": "data_items"}), Archetype::Bar).unwrap();
    assert_eq!(t, Target::DataItems(None));
    let t = Target::from_json(&json!({"type": "data_items", "filter": {}}), Archetype::Bar).unwrap();
    assert_eq!(t, Target::DataItems(None));
}

#[test]
fn data_items_filter_is_validated_against_archetype() {
    let f = json!({"type": "data_items", "filter": {"and": [{"axisType": "temporal", "gt": {"year": 2000, "month": 1}}]}});
    assert!(Target::from_json(&f, Archetype::Line).is_ok());
    assert!(Target::from_json(&f, Archetype::Scatter).is_err());
}

#[test]
fn pie_requires_polar_coordinates() {
    let xy = json!({"type": "coordinate", "xyCoordinate": {"x": 1}});
    assert!(matches!(
        Target::from_json(&xy, Archetype::Pie),
        Err(ChartmarkError::Structural(_))
    ));
    let polar = json!({"type": "coordinate", "polarCoordinate": {"theta": 10, "theta2": 20}});
    let t = Target::from_json(&polar, Archetype::Pie).unwrap();
    assert!(matches!(t, Target::Coordinate(Coordinate::Polar(_))));
    assert!(Target::from_json(&polar, Archetype::Bar).is_err());
}

#[test]
fn cartesian_values_may_be_dates() {
    let t = Target::from_json(
        &json!({"type": "coordinate", "xyCoordinate": {"x": {"year": 2020, "month": "may"}, "y": 3}}),
        Archetype::Line,
    )
    .unwrap();
    let Target::Coordinate(Coordinate::Cartesian(p)) = t else {
        panic!("expected cartesian target");
    };
    assert!(matches!(p.x, Some(Comparable::Date(_))));
    assert!(matches!(p.y, Some(Comparable::Number(_))));
    assert!(p.x1.is_none());
}

#[test]
fn chart_element_reads_axis_configs() {
    let t = Target::from_json(
        &json!({"type": "chart_element", "yAxis": {"grid": true, "tickCount": 4}}),
        Archetype::Bar,
    )
    .unwrap();
    let e = t.chart_element("grid_line").unwrap();
    assert!(e.has_grid());
    assert_eq!(e.y_axis.as_ref().unwrap().tick_count, Some(4));
    assert!(e.x_axis.is_none());
}

#[test]
fn annotation_target_needs_prior() {
    assert!(Target::from_json(&json!({"type": "annotation"}), Archetype::Bar).is_err());
    let t = Target::from_json(&json!({"type": "annotation", "prior": "a1"}), Archetype::Bar).unwrap();
    assert_eq!(t.kind_name(), "annotation");
}

#[test]
fn accessors_report_wrong_kind() {
    let t = Target::DataItems(None);
    assert!(t.coordinate("bounding_box").is_err());
    assert!(t.data_items("stroke").unwrap().is_none());
}

#[test]
fn validate_rechecks_coordinate_system() {
    let t = Target::Coordinate(Coordinate::Polar(PolarPoint::default()));
    assert!(t.validate(Archetype::Pie).is_ok());
    assert!(t.validate(Archetype::Scatter).is_err());
}
