use super::*;
use serde_json::json;

#[test]
fn output_names_replace_the_extension() {
    assert_eq!(
        output_path(Path::new("/out"), Path::new("/in/sales.json")),
        PathBuf::from("/out/sales.vl.json")
    );
}

#[test]
fn inputs_are_sorted_and_skip_outputs() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["b.json", "a.json", "a.vl.json", "notes.txt"] {
        std::fs::write(dir.path().join(name), "{}").unwrap();
    }
    let names: Vec<String> = batch_inputs(dir.path())
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.json", "b.json"]);
}

#[test]
fn write_chart_creates_parents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/deeper/chart.vl.json");
    let spec = ChartSpec::from_json(&json!({
        "title": "t", "type": "bar", "x_name": "a", "y_name": "b", "x_data": ["x"], "y_data": [1]
    }))
    .unwrap();
    let chart = render_base_chart(&spec).unwrap();
    write_chart(&path, &chart).unwrap();
    let back: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(back, chart.to_json());
}

#[test]
fn render_chart_path_accepts_bare_or_wrapped_charts() {
    let dir = tempfile::tempdir().unwrap();
    let chart = json!({"title": "t", "type": "pie", "x_name": "k", "y_name": "v", "x_data": ["p"], "y_data": [3]});
    let bare = dir.path().join("bare.json");
    let wrapped = dir.path().join("wrapped.json");
    std::fs::write(&bare, chart.to_string()).unwrap();
    std::fs::write(&wrapped, json!({"chart": chart, "annotations": []}).to_string()).unwrap();
    assert_eq!(render_chart_path(&bare).unwrap(), render_chart_path(&wrapped).unwrap());
}

#[test]
fn missing_file_mentions_its_path() {
    let err = compile_path(Path::new("/nope/doc.json"), &Compiler::default()).unwrap_err();
    assert!(matches!(err, ChartmarkError::Other(_)));
    assert!(format!("{err:#}").contains("/nope/doc.json"));
}
