use super::*;

#[test]
fn root_renders_as_dollar() {
    assert_eq!(JsonPath::root().to_string(), "$");
}

#[test]
fn fields_and_indices_nest() {
    let p = JsonPath::root()
        .field("annotations")
        .index(2)
        .field("techniques")
        .index(0)
        .field("target");
    assert_eq!(p.to_string(), "$.annotations[2].techniques[0].target");
}

#[test]
fn children_do_not_mutate_parent() {
    let parent = JsonPath::root().field("chart");
    let _child = parent.field("x_data");
    assert_eq!(parent.to_string(), "$.chart");
}
