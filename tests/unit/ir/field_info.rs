use super::*;
use serde_json::json;

fn chart(encoding: serde_json::Value) -> ChartIr {
    ChartIr::from_json(&json!({
        "data": {"values": []},
        "layer": [{"mark": "bar", "encoding": encoding}]
    }))
    .unwrap()
}

#[test]
fn nominal_quantitative_is_bar() {
    let info = chart(json!({
        "x": {"field": "cat", "type": "nominal"},
        "y": {"field": "val", "type": "quantitative"}
    }))
    .field_info()
    .unwrap();
    assert_eq!(
        info,
        FieldInfo::Bar {
            category: "cat".into(),
            quantity: "val".into(),
            group: None
        }
    );
    assert_eq!(info.archetype(), Archetype::Bar);
}

#[test]
fn color_field_makes_grouped_variant() {
    let info = chart(json!({
        "x": {"field": "day", "type": "temporal"},
        "y": {"field": "val", "type": "quantitative"},
        "color": {"field": "series", "type": "nominal"}
    }))
    .field_info()
    .unwrap();
    assert_eq!(info.archetype(), Archetype::GroupLine);
    assert_eq!(info.group(), Some("series"));
}

#[test]
fn theta_with_color_is_pie_without_group() {
    let info = chart(json!({
        "theta": {"field": "val", "type": "quantitative", "stack": true},
        "color": {"field": "cat", "type": "nominal"}
    }))
    .field_info()
    .unwrap();
    assert_eq!(info.archetype(), Archetype::Pie);
    assert_eq!(info.group(), None);
}

#[test]
fn quantitative_pair_is_scatter() {
    let info = chart(json!({
        "x": {"field": "a", "type": "quantitative"},
        "y": {"field": "b", "type": "quantitative"}
    }))
    .field_info()
    .unwrap();
    assert!(matches!(info, FieldInfo::Scatter { .. }));
}

#[test]
fn unknown_bindings_are_unsupported() {
    let err = chart(json!({
        "x": {"field": "a", "type": "ordinal"},
        "y": {"field": "b", "type": "ordinal"}
    }))
    .field_info()
    .unwrap_err();
    assert!(matches!(err, ChartmarkError::UnsupportedType(_)));
}

#[test]
fn archetype_parses_snake_case_names() {
    for a in Archetype::ALL {
        assert_eq!(a.as_str().parse::<Archetype>().unwrap(), a);
    }
    assert!("donut".parse::<Archetype>().is_err());
    assert!(Archetype::GroupScatter.is_grouped());
    assert!(Archetype::Pie.is_polar());
}
