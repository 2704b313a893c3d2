use crate::foundation::error::{ChartmarkError, ChartmarkResult};
use crate::ir::chart::ChartIr;
use crate::ir::field_info::Archetype;
use crate::ir::layer::{Layer, Mark};
use crate::ir::transform::TransformPipeline;
use crate::technique::{Technique, base_channels};

/// Least-squares line of y on x, one per color group on grouped charts.
///
/// Bar and pie charts are returned unchanged.
pub(crate) fn lower_linear_regression(
    t: &Technique,
    mut chart: ChartIr,
    archetype: Archetype,
) -> ChartmarkResult<ChartIr> {
    if !(archetype.is_line() || archetype.is_scatter()) {
        return Ok(chart);
    }
    let line = t.sub_mark("line", |m| m.line.as_ref())?;
    let pred = t.predicate(&chart)?;

    let optional: &[&str] = if archetype.is_grouped() { &["color"] } else { &[] };
    let enc = base_channels(&chart, &["x", "y"], optional)?;
    let (x, y) = match (enc.field("x"), enc.field("y")) {
        (Some(x), Some(y)) => (x.field.clone(), y.field.clone()),
        _ => return Err(ChartmarkError::lowering("x/y are not bound to fields")),
    };
    let group_by = match enc.field("color") {
        Some(c) if archetype.is_grouped() => vec![c.field.clone()],
        _ => Vec::new(),
    };

    chart.push_layer(
        Layer::new(
            Mark::new("line")
                .with("size", line.size)
                .with("color", line.color.clone()),
        )
        .with_encoding(enc)
        .with_transform(
            TransformPipeline::new()
                .regression(&y, &x, group_by)
                .filter_if(pred.filter())
                .build(),
        ),
    );
    Ok(chart)
}

#[cfg(test)]
#[path = "../../tests/unit/technique/trend.rs"]
mod tests;
