use crate::annotation::marker::RectMark;
use crate::foundation::error::{ChartmarkError, ChartmarkResult};
use crate::ir::chart::ChartIr;
use crate::ir::encoding::{Binding, Encoding, FieldBinding};
use crate::ir::field_info::Archetype;
use crate::ir::layer::{Layer, Mark};
use crate::ir::transform::{SortOrder, TransformPipeline};
use crate::technique::text_layout::{TextBlock, TextLayout};
use crate::technique::{Technique, base_channels};
use serde_json::{Value, json};

const NOTE_Y: i64 = -8;
const LINE_HEIGHT: i64 = 12;
const LIFT_FACTOR: &str = "20.0";

fn note_block(t: &Technique) -> ChartmarkResult<TextBlock> {
    let text = t
        .note()
        .ok_or_else(|| ChartmarkError::lowering(format!("{} has no note text", t.name())))?;
    Ok(TextLayout::default().layout(text))
}

fn text_color(t: &Technique) -> String {
    t.marker()
        .map(|m| m.text_color_or("black"))
        .unwrap_or_else(|| "black".to_string())
}

fn lines_value(block: &TextBlock) -> Value {
    Value::Array(block.lines.iter().cloned().map(Value::String).collect())
}

fn background_mark(rect: &RectMark, block: &TextBlock) -> Mark {
    Mark::new("rect")
        .with("width", block.width + 10)
        .with("height", block.height + 2)
        .with("cornerRadius", rect.corner_radius)
        .with("baseline", "bottom")
        .with("stroke", rect.stroke.clone())
        .with("strokeWidth", rect.stroke_width)
        .with("color", rect.color.clone())
        .with("opacity", rect.opacity)
}

fn note_text_mark(color: String, block: &TextBlock) -> Mark {
    Mark::new("text")
        .with("baseline", "top")
        .with("dy", -i64::from(block.height))
        .with("lineHeight", LINE_HEIGHT)
        .with("color", color)
}

/// A note block in the top-right margin, drawn once.
pub(crate) fn lower_out_plot(t: &Technique, mut chart: ChartIr) -> ChartmarkResult<ChartIr> {
    let block = note_block(t)?;
    let once = TransformPipeline::new().row_number_filter(1).build();

    if let Some(rect) = t.marker().and_then(|m| m.rect.as_ref()) {
        let mut enc = Encoding::new();
        enc.set_value("y", json!(NOTE_Y));
        chart.push_layer(
            Layer::new(background_mark(rect, &block))
                .with_encoding(enc)
                .with_transform(once.clone()),
        );
    }

    let mut enc = Encoding::new();
    enc.set_value("x", json!("width"));
    enc.set_value("y", json!(NOTE_Y));
    enc.set_value("text", lines_value(&block));
    chart.push_layer(
        Layer::new(note_text_mark(text_color(t), &block))
            .with_encoding(enc)
            .with_transform(once),
    );
    Ok(chart)
}

/// A note block above the tallest selected mark, optionally outlining the selection.
pub(crate) fn lower_in_plot(
    t: &Technique,
    mut chart: ChartIr,
    archetype: Archetype,
) -> ChartmarkResult<ChartIr> {
    let block = note_block(t)?;
    let pred = t.predicate(&chart)?;
    let marker = t.marker();
    let base_mark = chart.base()?.mark.clone();

    if archetype.is_polar() {
        let base = &chart.base()?.encoding;
        let (theta, group) = match (base.field("theta"), base.field("color")) {
            (Some(theta), Some(color)) => (theta.field.clone(), color.field.clone()),
            _ => return Err(ChartmarkError::lowering("pie theta/color are not bound to fields")),
        };
        let mut enc = Encoding::new();
        enc.set(
            "theta",
            Binding::Field(FieldBinding::new(theta, "quantitative").with("stack", json!(true))),
        );
        enc.set_field("color", group, "nominal");
        enc.set_value_with_condition("text", pred.test(), lines_value(&block), json!([]));
        let offset = 12 * (block.lines.len() / 2);
        chart.push_layer(
            Layer::new(
                Mark::new("text")
                    .with("radiusOffset", offset)
                    .with("radius", 80)
                    .with("stroke", "black")
                    .with("color", text_color(t))
                    .with("strokeWidth", 0.1),
            )
            .with_encoding(enc),
        );

        if let Some(stroke) = marker.and_then(|m| m.stroke.as_ref()) {
            let mut enc = base_channels(&chart, &["theta", "color"], &[])?;
            outline(&mut enc, pred.test(), &stroke.color, stroke.width);
            chart.push_layer(Layer::new(base_mark).with_encoding(enc));
        }
        return Ok(chart);
    }

    let base = &chart.base()?.encoding;
    let (x, y) = match (base.field("x"), base.field("y")) {
        (Some(x), Some(y)) => (x.bare(), y.field.clone()),
        _ => return Err(ChartmarkError::lowering("x/y are not bound to fields")),
    };
    let lifted = TransformPipeline::new()
        .filter_if(pred.filter())
        .max_and_adjusted_value(&y, LIFT_FACTOR)
        .rank_window(&y, SortOrder::Descending, "rank")
        .filter(json!("datum.rank == 1"))
        .build();

    if let Some(rect) = marker.and_then(|m| m.rect.as_ref()) {
        let mut enc = base_channels(&chart, &["x"], &["color", "xOffset"])?;
        enc.set_field("y", "adjusted_y", "quantitative");
        chart.push_layer(
            Layer::new(background_mark(rect, &block))
                .with_encoding(enc)
                .with_transform(lifted.clone()),
        );
    }

    let mut enc = Encoding::new();
    enc.set("x", Binding::Field(x));
    enc.copy_if_present(&chart.base()?.encoding, "xOffset");
    enc.set_field("y", "adjusted_y", "quantitative");
    enc.set_value("text", lines_value(&block));
    chart.push_layer(
        Layer::new(note_text_mark(text_color(t), &block))
            .with_encoding(enc)
            .with_transform(lifted),
    );

    if let Some(stroke) = marker.and_then(|m| m.stroke.as_ref()) {
        let optional: &[&str] = if archetype.is_grouped() {
            &["color", "xOffset"]
        } else {
            &[]
        };
        let mut enc = base_channels(&chart, &["x", "y"], optional)?;
        outline(&mut enc, pred.test(), &stroke.color, stroke.width);
        chart.push_layer(Layer::new(base_mark).with_encoding(enc));
    }
    Ok(chart)
}

fn outline(enc: &mut Encoding, test: Value, color: &str, width: i64) {
    enc.set_value_with_condition("stroke", test.clone(), json!(color), Value::Null);
    enc.set_value_with_condition("strokeOpacity", test.clone(), json!(1), json!(0));
    enc.set_value_with_condition("strokeWidth", test, json!(width), json!(0));
    enc.set_value("fillOpacity", json!(0));
}

#[cfg(test)]
#[path = "../../tests/unit/technique/description.rs"]
mod tests;
