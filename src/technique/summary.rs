use crate::annotation::method::{Subtype, SummaryStat};
use crate::foundation::error::{ChartmarkError, ChartmarkResult};
use crate::ir::chart::ChartIr;
use crate::ir::encoding::{Binding, Encoding, FieldBinding};
use crate::ir::field_info::Archetype;
use crate::ir::layer::{Layer, Mark};
use crate::ir::transform::{TransformPipeline, datum_ref};
use crate::technique::reference::{axis_text_mark, pin_other_axis};
use crate::technique::{Technique, base_channels};
use serde_json::{Value, json};

fn stat_of(t: &Technique, subtype: Option<Subtype>) -> ChartmarkResult<SummaryStat> {
    subtype.and_then(Subtype::stat).ok_or_else(|| {
        ChartmarkError::lowering(format!("{} needs a summary statistic subtype", t.name()))
    })
}

const SCATTER_AXES: &[&str] = &["x", "y"];
const VALUE_AXES: &[&str] = &["y"];

// Axes a cartesian summary is computed over.
fn summary_axes(archetype: Archetype) -> &'static [&'static str] {
    if archetype.is_scatter() {
        SCATTER_AXES
    } else {
        VALUE_AXES
    }
}

fn axis_field(chart: &ChartIr, axis: &str) -> ChartmarkResult<String> {
    chart
        .base()?
        .encoding
        .field(axis)
        .map(|f| f.field.clone())
        .ok_or_else(|| ChartmarkError::lowering(format!("{axis} is not bound to a field")))
}

fn text_color(t: &Technique) -> String {
    t.marker()
        .map(|m| m.text_color_or("black"))
        .unwrap_or_else(|| "black".to_string())
}

/// A labeled rule (or arc on pie charts) at the summary statistic.
pub(crate) fn lower_summary_line(
    t: &Technique,
    mut chart: ChartIr,
    archetype: Archetype,
    subtype: Option<Subtype>,
) -> ChartmarkResult<ChartIr> {
    let stat = stat_of(t, subtype)?.as_str();
    let line = t.sub_mark("line", |m| m.line.as_ref())?;
    let color = text_color(t);

    if archetype.is_polar() {
        let field = axis_field(&chart, "theta")?;
        let alias = format!("{stat}_theta");

        let mut arc_enc = Encoding::new();
        arc_enc.set_field("theta", alias.as_str(), "quantitative");
        chart.push_layer(
            Layer::new(
                Mark::new("arc")
                    .with("innerRadius", 85)
                    .with("outerRadius", 85 + line.size)
                    .with("color", line.color.clone())
                    .with("opacity", 0.7)
                    .with("cornerRadius", 2),
            )
            .with_encoding(arc_enc)
            .with_transform(TransformPipeline::new().aggregate(stat, &field, &alias).build()),
        );

        let label = format!("{stat}_label");
        let mut text_enc = Encoding::new();
        text_enc.set(
            "theta",
            Binding::Field(
                FieldBinding::new(alias.as_str(), "quantitative").with("stack", json!(true)),
            ),
        );
        text_enc.set_field("text", label.as_str(), "nominal");
        chart.push_layer(
            Layer::new(
                Mark::new("text")
                    .with("radius", 100)
                    .with("radiusOffset", 10)
                    .with("color", color),
            )
            .with_encoding(text_enc)
            .with_transform(
                TransformPipeline::new()
                    .aggregate(stat, &field, &alias)
                    .calculate(
                        format!("'{stat}:' + format({}, '.2f')", datum_ref(&alias)),
                        label.as_str(),
                    )
                    .build(),
            ),
        );
        return Ok(chart);
    }

    let pred = t.predicate(&chart)?;
    for &axis in summary_axes(archetype) {
        let field = axis_field(&chart, axis)?;
        let alias = format!("{stat}_{axis}");
        let transform = TransformPipeline::new()
            .filter_if(pred.filter())
            .aggregate(stat, &field, &alias)
            .build();

        let mut rule_enc = Encoding::new();
        rule_enc.set_field(axis, alias.as_str(), "quantitative");
        chart.push_layer(
            Layer::new(
                Mark::new("rule")
                    .with("color", line.color.clone())
                    .with("size", line.size),
            )
            .with_encoding(rule_enc)
            .with_transform(transform.clone()),
        );

        let mut text_enc = Encoding::new();
        text_enc.set_field(axis, alias.as_str(), "quantitative");
        text_enc.set_value("text", json!(stat));
        pin_other_axis(&mut text_enc, axis);
        chart.push_layer(
            Layer::new(axis_text_mark(axis, color.clone()))
                .with_encoding(text_enc)
                .with_transform(transform),
        );
    }
    Ok(chart)
}

/// Outline and tag the marks equal to the summary statistic.
pub(crate) fn lower_summary_stroke(
    t: &Technique,
    mut chart: ChartIr,
    archetype: Archetype,
    subtype: Option<Subtype>,
) -> ChartmarkResult<ChartIr> {
    let stat = stat_of(t, subtype)?.as_str();
    let stroke = t.sub_mark("stroke", |m| m.stroke.as_ref())?;
    let color = text_color(t);
    let flag = format!("is_{stat}");
    let test = Value::String(format!("datum.{flag}"));
    let base_mark = chart.base()?.mark.clone();

    if archetype.is_polar() {
        let field = axis_field(&chart, "theta")?;
        let alias = format!("{stat}_theta");
        let transform = TransformPipeline::new()
            .joinaggregate(stat, &field, &alias)
            .calculate(
                format!("{} == {}", datum_ref(&field), datum_ref(&alias)),
                flag.as_str(),
            )
            .build();

        let mut enc = base_channels(&chart, &["theta", "color"], &[])?;
        enc.set_value_with_condition(
            "stroke",
            test.clone(),
            json!(stroke.color),
            Value::Null,
        );
        enc.set_value_with_condition("opacity", test.clone(), json!(1), json!(0));
        enc.set_value_with_condition("strokeWidth", test.clone(), json!(stroke.width), json!(0));
        chart.push_layer(
            Layer::new(base_mark)
                .with_encoding(enc)
                .with_transform(transform.clone()),
        );

        let group = chart
            .base()?
            .encoding
            .field("color")
            .cloned()
            .ok_or_else(|| ChartmarkError::lowering("pie color is not bound to a field"))?;
        let mut text_enc = base_channels(&chart, &["theta"], &[])?;
        text_enc.set_value_with_condition("text", test.clone(), json!(stat), json!(""));
        text_enc.set_value_default_field_with_condition(
            "color",
            test,
            json!(color),
            &FieldBinding::new(group.field, "nominal"),
        );
        chart.push_layer(
            Layer::new(Mark::new("text").with("radius", 95))
                .with_encoding(text_enc)
                .with_transform(transform),
        );
        return Ok(chart);
    }

    let pred = t.predicate(&chart)?;
    for &axis in summary_axes(archetype) {
        let field = axis_field(&chart, axis)?;
        let alias = format!("{stat}_{axis}");
        let transform = TransformPipeline::new()
            .filter_if(pred.filter())
            .joinaggregate(stat, &field, &alias)
            .calculate(
                format!("{} == {}", datum_ref(&field), datum_ref(&alias)),
                flag.as_str(),
            )
            .build();

        let mut enc = base_channels(&chart, &["x", "y"], &["color", "xOffset"])?;
        enc.set_value_with_condition(
            "stroke",
            test.clone(),
            json!(stroke.color),
            Value::Null,
        );
        enc.set_value_with_condition("strokeOpacity", test.clone(), json!(1), json!(0));
        enc.set_value_with_condition("strokeWidth", test.clone(), json!(stroke.width), json!(0));
        enc.set_value("fillOpacity", json!(0));
        chart.push_layer(
            Layer::new(base_mark.clone())
                .with_encoding(enc)
                .with_transform(transform.clone()),
        );

        let mut text_enc = base_channels(&chart, &["x", "y"], &["color", "xOffset"])?;
        text_enc.set_value_with_condition("text", test.clone(), json!(stat), json!(""));
        text_enc.set_value("color", json!(color));
        chart.push_layer(
            Layer::new(Mark::new("text").with("baseline", "line-bottom"))
                .with_encoding(text_enc)
                .with_transform(transform),
        );
    }
    Ok(chart)
}

#[cfg(test)]
#[path = "../../tests/unit/technique/summary.rs"]
mod tests;
