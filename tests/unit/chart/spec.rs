use super::*;
use serde_json::json;

fn spec(v: Value) -> ChartSpec {
    ChartSpec::from_json(&v).unwrap()
}

#[test]
fn bar_pads_shorter_series() {
    let s = spec(json!({
        "title": "Sales", "type": "bar", "x_name": "cat", "y_name": "val",
        "x_data": ["A", "B", "C"], "y_data": [1, "oops"]
    }));
    assert_eq!(
        s.rows().unwrap(),
        vec![
            json!({"cat": "A", "val": 1}),
            json!({"cat": "B", "val": 0}),
            json!({"cat": "C", "val": 0}),
        ]
    );
}

#[test]
fn pie_pads_missing_categories_with_empty_names() {
    let s = spec(json!({"type": "pie", "x_name": "k", "y_name": "v", "x_data": ["a"], "y_data": [1.5, 2]}));
    let rows = s.rows().unwrap();
    assert_eq!(rows[1], json!({"k": "", "v": 2}));
    assert_eq!(rows[0]["v"], 1.5);
}

#[test]
fn line_dates_are_normalized_and_extended() {
    let s = spec(json!({
        "type": "line", "x_name": "d", "y_name": "v",
        "x_data": ["2024/1/30", "2024-1-31"], "y_data": [1, 2, 3, 4]
    }));
    let xs: Vec<Value> = s.rows().unwrap().into_iter().map(|r| r["d"].clone()).collect();
    assert_eq!(xs, vec![json!("2024-01-30"), json!("2024-01-31"), json!("2024-02-01"), json!("2024-02-02")]);
}

#[test]
fn line_without_dates_starts_at_epoch() {
    assert_eq!(dates(&[], 2), vec!["1970-01-01", "1970-01-01"]);
    assert_eq!(dates(&[json!("Q1")], 1), vec!["Q1"]);
    assert!(parse_date("2024-13-01").is_none());
}

#[test]
fn grouped_rows_follow_shared_x() {
    let s = spec(json!({
        "type": "group_bar", "x_name": "city", "y_name": "sales", "classify_name": "year",
        "x_data": ["NY", "LA"], "y_data": [[1, 2, 3], [4]], "classify": ["2023", 2024]
    }));
    assert_eq!(
        s.rows().unwrap(),
        vec![
            json!({"city": "NY", "sales": 1, "year": "2023"}),
            json!({"city": "LA", "sales": 2, "year": "2023"}),
            json!({"city": "NY", "sales": 4, "year": "2024"}),
            json!({"city": "LA", "sales": 0, "year": "2024"}),
        ]
    );
}

#[test]
fn grouped_rows_follow_per_series_x() {
    let s = spec(json!({
        "type": "group_scatter", "x_name": "h", "y_name": "w", "classify_name": "sex",
        "x_data": [[150, 160], [170]], "y_data": [[50, 55], [70, 71]], "classify": ["f", "m"]
    }));
    let rows = s.rows().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2], json!({"h": 170, "w": 70, "sex": "m"}));
}

#[test]
fn rejects_bad_headers() {
    let unknown = ChartSpec::from_json(&json!({"type": "radar", "x_name": "a", "y_name": "b"}));
    assert!(matches!(unknown, Err(ChartmarkError::UnsupportedType(_))));
    let unnamed = ChartSpec::from_json(&json!({"type": "bar", "x_name": "a"}));
    assert!(matches!(unnamed, Err(ChartmarkError::Structural(_))));
    let ungrouped = ChartSpec::from_json(&json!({"type": "group_line", "x_name": "a", "y_name": "b"}));
    assert!(matches!(ungrouped, Err(ChartmarkError::Structural(_))));
}

#[test]
fn empty_chart_has_no_rows() {
    let s = spec(json!({"type": "bar", "x_name": "a", "y_name": "b"}));
    assert!(matches!(s.rows(), Err(ChartmarkError::Semantic(_))));
}
