use crate::foundation::error::{ChartmarkError, ChartmarkResult};
use crate::ir::chart::ChartIr;
use crate::ir::encoding::Binding;
use crate::ir::field_info::Archetype;
use crate::ir::layer::{Layer, Mark};
use crate::ir::transform::{TransformPipeline, datum_ref};
use crate::technique::{Technique, base_channels};
use serde_json::{Value, json};

/// Value labels over the selected marks.
pub(crate) fn lower_label(
    t: &Technique,
    mut chart: ChartIr,
    archetype: Archetype,
) -> ChartmarkResult<ChartIr> {
    let text = t.sub_mark("text", |m| m.text.as_ref())?;
    let pred = t.predicate(&chart)?;

    let layer = if archetype.is_polar() {
        let mut enc = base_channels(&chart, &["theta", "color"], &[])?;
        let theta = enc
            .field("theta")
            .cloned()
            .ok_or_else(|| ChartmarkError::lowering("pie theta is not bound to a field"))?;
        if pred.is_neutral() {
            enc.set("text", Binding::Field(theta));
        } else {
            enc.set_field_with_condition("text", pred.test(), &theta, json!([]));
        }
        Layer::new(
            Mark::new("text")
                .with("radius", 90)
                .with("color", text.color.clone()),
        )
        .with_encoding(enc)
    } else if archetype.is_scatter() {
        let enc0 = base_channels(&chart, &["x", "y"], &["color"])?;
        let (x, y) = match (enc0.field("x"), enc0.field("y")) {
            (Some(x), Some(y)) => (x.field.clone(), y.field.clone()),
            _ => return Err(ChartmarkError::lowering("scatter x/y are not bound to fields")),
        };
        let mut enc = enc0;
        enc.set_field("text", "xy", "nominal");
        Layer::new(
            Mark::new("text")
                .with("baseline", "line-top")
                .with("color", text.color.clone()),
        )
        .with_encoding(enc)
        .with_transform(
            TransformPipeline::new()
                .calculate(
                    format!("'(' + {} + ', ' + {} + ')'", datum_ref(&x), datum_ref(&y)),
                    "xy",
                )
                .filter_if(pred.filter())
                .build(),
        )
    } else {
        let mut enc = base_channels(&chart, &["x", "y"], &["color", "xOffset"])?;
        let y = enc
            .field("y")
            .map(|f| f.bare())
            .ok_or_else(|| ChartmarkError::lowering("y is not bound to a field"))?;
        enc.set("text", Binding::Field(y));
        Layer::new(
            Mark::new("text")
                .with("baseline", "line-bottom")
                .with("color", Value::String(text.color.clone())),
        )
        .with_encoding(enc)
        .with_transform(TransformPipeline::new().filter_if(pred.filter()).build())
    };

    chart.push_layer(layer);
    Ok(chart)
}

#[cfg(test)]
#[path = "../../tests/unit/technique/encoding.rs"]
mod tests;
