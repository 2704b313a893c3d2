use crate::foundation::error::ChartmarkResult;
use crate::ir::chart::ChartIr;
use crate::ir::field_info::Archetype;
use crate::ir::layer::{Layer, Mark};
use crate::ir::transform::TransformPipeline;
use crate::technique::{Technique, base_channels};
use serde_json::{Value, json};

/// Outline the selected marks.
///
/// Line charts get an extra layer of outlined points; other archetypes gain conditional
/// `stroke`/`strokeWidth` channels on the base layer.
pub(crate) fn lower_stroke(
    t: &Technique,
    mut chart: ChartIr,
    archetype: Archetype,
) -> ChartmarkResult<ChartIr> {
    let stroke = t.sub_mark("stroke", |m| m.stroke.as_ref())?;
    let pred = t.predicate(&chart)?;

    if archetype.is_line() {
        let enc = base_channels(&chart, &["x", "y"], &["color"])?;
        let mark = Mark::new("line").with(
            "point",
            json!({"stroke": stroke.color, "strokeWidth": stroke.width}),
        );
        chart.push_layer(
            Layer::new(mark)
                .with_encoding(enc)
                .with_transform(TransformPipeline::new().filter_if(pred.filter()).build()),
        );
        return Ok(chart);
    }

    let base = chart.base_mut()?;
    base.encoding.set_value_with_condition(
        "stroke",
        pred.test(),
        Value::String(stroke.color.clone()),
        Value::Null,
    );
    base.encoding
        .set_value_with_condition("strokeWidth", pred.test(), json!(stroke.width), json!(0));
    Ok(chart)
}

/// Fade everything except the selected marks.
pub(crate) fn lower_opacity(
    t: &Technique,
    mut chart: ChartIr,
    archetype: Archetype,
) -> ChartmarkResult<ChartIr> {
    let opacity = t.sub_mark("opacity", |m| m.opacity.as_ref())?;
    let pred = t.predicate(&chart)?;

    if archetype.is_line() {
        let enc = base_channels(&chart, &["x", "y"], &["color"])?;
        chart
            .base_mut()?
            .encoding
            .set_value("opacity", json!(opacity.other));
        chart.push_layer(
            Layer::new(Mark::new("line").with("point", true))
                .with_encoding(enc)
                .with_transform(TransformPipeline::new().filter_if(pred.filter()).build()),
        );
        return Ok(chart);
    }

    chart.base_mut()?.encoding.set_value_with_condition(
        "opacity",
        pred.test(),
        json!(opacity.selected),
        json!(opacity.other),
    );
    Ok(chart)
}

#[cfg(test)]
#[path = "../../tests/unit/technique/highlight.rs"]
mod tests;
