use crate::annotation::target::{AxisConfig, CartesianPoint, Coordinate, PolarPoint};
use crate::foundation::error::{ChartmarkError, ChartmarkResult};
use crate::foundation::value::{Comparable, number_value};
use crate::ir::chart::ChartIr;
use crate::ir::encoding::Encoding;
use crate::ir::field_info::Archetype;
use crate::ir::layer::{Layer, Mark};
use crate::ir::transform::TransformPipeline;
use crate::technique::{Technique, base_channels, check_ordered};
use serde_json::{Map, Number, Value, json};
use std::cmp::Ordering;

const PIE_GRID_TICKS: i64 = 6;
const MAX_GRID_TICKS: usize = 1000;

fn cmp_number(a: &Number, b: &Number) -> ChartmarkResult<Ordering> {
    let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
    a.partial_cmp(&b)
        .ok_or_else(|| ChartmarkError::semantic("coordinate values are not comparable"))
}

fn cmp_comparable(a: &Comparable, b: &Comparable) -> ChartmarkResult<Ordering> {
    a.try_cmp(b)
}

/// `bounding_box` needs a complete, ascending cartesian area.
pub(crate) fn check_area(c: &Coordinate) -> ChartmarkResult<()> {
    let Coordinate::Cartesian(p) = c else {
        return Ok(());
    };
    let x = check_ordered("x range", p.x.as_ref(), p.x1.as_ref(), cmp_comparable)?;
    let y = check_ordered("y range", p.y.as_ref(), p.y1.as_ref(), cmp_comparable)?;
    if x && y {
        Ok(())
    } else {
        Err(ChartmarkError::semantic(
            "bounding_box needs all of x, x1, y and y1",
        ))
    }
}

/// `shadow` needs at least one complete, ascending range.
pub(crate) fn check_range(c: &Coordinate) -> ChartmarkResult<()> {
    let any = match c {
        Coordinate::Cartesian(p) => {
            let x = check_ordered("x range", p.x.as_ref(), p.x1.as_ref(), cmp_comparable)?;
            let y = check_ordered("y range", p.y.as_ref(), p.y1.as_ref(), cmp_comparable)?;
            x || y
        }
        Coordinate::Polar(p) => {
            check_ordered("theta range", p.theta.as_ref(), p.theta2.as_ref(), cmp_number)?
        }
    };
    if any {
        Ok(())
    } else {
        Err(ChartmarkError::semantic(
            "shadow needs a complete x, y or theta range",
        ))
    }
}

/// `label_line` sits on exactly one cartesian axis, or at a theta.
pub(crate) fn check_line(c: &Coordinate) -> ChartmarkResult<()> {
    match c {
        Coordinate::Cartesian(p) => match (&p.x, &p.y) {
            (Some(_), None) | (None, Some(_)) => Ok(()),
            (Some(_), Some(_)) => Err(ChartmarkError::semantic(
                "label_line takes either x or y, not both",
            )),
            (None, None) => Err(ChartmarkError::semantic("label_line needs an x or a y")),
        },
        Coordinate::Polar(p) if p.theta.is_none() => {
            Err(ChartmarkError::semantic("label_line needs a theta"))
        }
        Coordinate::Polar(_) => Ok(()),
    }
}

/// Rules from the selected points back to the axes.
pub(crate) fn lower_data_line(
    t: &Technique,
    mut chart: ChartIr,
    archetype: Archetype,
) -> ChartmarkResult<ChartIr> {
    if archetype.is_polar() {
        return Ok(chart);
    }
    let line = t.sub_mark("line", |m| m.line.as_ref())?;
    let pred = t.predicate(&chart)?;
    let mark = Mark::new("rule")
        .with("color", line.color.clone())
        .with("size", line.size);

    let mut rules = vec![("x2", json!(0))];
    if !archetype.is_bar() {
        rules.push(("y2", json!("height")));
    }
    for (channel, value) in rules {
        let mut enc = base_channels(&chart, &["x", "y"], &[])?;
        enc.set_value(channel, value);
        chart.push_layer(
            Layer::new(mark.clone())
                .with_encoding(enc)
                .with_transform(TransformPipeline::new().filter_if(pred.filter()).build()),
        );
    }
    Ok(chart)
}

/// Axis grid lines, or a ring of arcs on pie charts.
pub(crate) fn lower_grid_line(
    t: &Technique,
    mut chart: ChartIr,
    archetype: Archetype,
) -> ChartmarkResult<ChartIr> {
    let element = t.target().chart_element(t.name())?;
    if archetype.is_polar() {
        return pie_grid(chart, element.theta_axis.as_ref());
    }

    for (channel, axis) in [("x", &element.x_axis), ("y", &element.y_axis)] {
        let Some(axis) = axis.as_ref().filter(|a| a.grid) else {
            continue;
        };
        let mut props = Map::new();
        props.insert("grid".to_string(), Value::Bool(true));
        if let Some(n) = axis.tick_count {
            props.insert("tickCount".to_string(), json!(n));
        }
        if let Some(interval) = axis.interval {
            let values = grid_values(&chart, channel, interval)?;
            if !values.is_empty() {
                props.insert("values".to_string(), Value::Array(values));
            }
        }
        chart.base_mut()?.encoding.update_axis(channel, props)?;
    }
    Ok(chart)
}

// Multiples of `interval` from zero up to the largest value of the channel's field.
fn grid_values(chart: &ChartIr, channel: &str, interval: f64) -> ChartmarkResult<Vec<Value>> {
    if interval.is_nan() || interval <= 0.0 {
        return Err(ChartmarkError::semantic(format!(
            "{channel} grid interval must be positive, got {interval}"
        )));
    }
    let field = chart
        .base()?
        .encoding
        .field(channel)
        .map(|f| f.field.clone())
        .ok_or_else(|| ChartmarkError::lowering(format!("{channel} is not bound to a field")))?;
    let Some(max) = chart.field_numbers(&field).into_iter().reduce(f64::max) else {
        return Ok(Vec::new());
    };
    if max < 0.0 {
        return Ok(Vec::new());
    }
    let steps = (max / interval).floor();
    if !steps.is_finite() || steps >= MAX_GRID_TICKS as f64 {
        return Err(ChartmarkError::semantic(format!(
            "{channel} grid interval {interval} gives more than {MAX_GRID_TICKS} ticks up to {max}"
        )));
    }
    let values = (0..MAX_GRID_TICKS)
        .map(|k| k as f64 * interval)
        .take_while(|v| *v <= max)
        .map(number_value)
        .collect();
    Ok(values)
}

// `tickCount` applies only to a `grid: true` theta axis; `interval` applies whenever it is set.
fn pie_grid(mut chart: ChartIr, axis: Option<&AxisConfig>) -> ChartmarkResult<ChartIr> {
    let count = axis
        .filter(|a| a.grid)
        .and_then(|a| a.tick_count)
        .unwrap_or(PIE_GRID_TICKS);
    if count <= 0 || count as usize > MAX_GRID_TICKS {
        return Err(ChartmarkError::semantic(format!(
            "theta tickCount must be in 1..={MAX_GRID_TICKS}, got {count}"
        )));
    }
    let interval = match axis.and_then(|a| a.interval) {
        Some(i) if i > 0.0 => i,
        Some(i) => {
            return Err(ChartmarkError::semantic(format!(
                "theta grid interval must be positive, got {i}"
            )));
        }
        None => {
            let theta = chart
                .base()?
                .encoding
                .field("theta")
                .map(|f| f.field.clone())
                .ok_or_else(|| ChartmarkError::lowering("pie theta is not bound to a field"))?;
            chart.field_numbers(&theta).iter().sum::<f64>() / count as f64
        }
    };

    let mut enc = Encoding::new();
    enc.set_field("theta", "interval", "quantitative");
    let rows: Vec<Value> = (0..count)
        .map(|_| json!({"interval": number_value(interval)}))
        .collect();
    chart.push_layer(
        Layer::new(
            Mark::new("arc")
                .with("innerRadius", 1)
                .with("outerRadius", 80)
                .with("stroke", "black")
                .with("strokeWidth", 3)
                .with("fillOpacity", 0)
                .with("color", "black"),
        )
        .with_encoding(enc)
        .with_data(json!({"values": rows})),
    );
    Ok(chart)
}

/// Outline a rectangular coordinate area.
pub(crate) fn lower_bounding_box(
    t: &Technique,
    mut chart: ChartIr,
    archetype: Archetype,
) -> ChartmarkResult<ChartIr> {
    if !(archetype.is_line() || archetype.is_scatter()) {
        return Ok(chart);
    }
    let Coordinate::Cartesian(p) = t.coordinate()? else {
        return Ok(chart);
    };
    let rect = t.sub_mark("rect", |m| m.rect.as_ref())?;

    let mut enc = Encoding::new();
    for (channel, value) in [("y", &p.y), ("y2", &p.y1), ("x", &p.x), ("x2", &p.x1)] {
        if let Some(v) = value {
            enc.set_datum(channel, v.to_json());
        }
    }
    chart.push_layer(
        Layer::new(
            Mark::new("rect")
                .with("fillOpacity", 0)
                .with("stroke", rect.stroke.clone())
                .with("strokeWidth", rect.stroke_width),
        )
        .with_encoding(enc),
    );
    Ok(chart)
}

/// Shade a coordinate range.
pub(crate) fn lower_shadow(
    t: &Technique,
    mut chart: ChartIr,
    _archetype: Archetype,
) -> ChartmarkResult<ChartIr> {
    let rect = t.sub_mark("rect", |m| m.rect.as_ref())?;
    let layer = match t.coordinate()? {
        Coordinate::Polar(PolarPoint { theta, theta2, .. }) => {
            let mut enc = Encoding::new();
            for (channel, value) in [("theta", theta), ("theta2", theta2)] {
                if let Some(v) = value {
                    enc.set_datum(channel, Value::Number(v.clone()));
                }
            }
            Layer::new(
                Mark::new("arc")
                    .with("innerRadius", 1)
                    .with("outerRadius", 90)
                    .with("fillOpacity", rect.opacity)
                    .with("color", rect.color.clone()),
            )
            .with_encoding(enc)
        }
        Coordinate::Cartesian(p) => {
            let (lo, hi, a, a2) = match (&p.y, &p.y1) {
                (Some(y), Some(y1)) => (y, y1, "y", "y2"),
                _ => match (&p.x, &p.x1) {
                    (Some(x), Some(x1)) => (x, x1, "x", "x2"),
                    _ => return Err(ChartmarkError::lowering("shadow has no complete range")),
                },
            };
            let mut enc = Encoding::new();
            enc.set_datum(a, lo.to_json());
            enc.set_datum(a2, hi.to_json());
            Layer::new(
                Mark::new("rect")
                    .with("color", rect.color.clone())
                    .with("opacity", rect.opacity),
            )
            .with_encoding(enc)
        }
    };
    chart.push_layer(layer);
    Ok(chart)
}

/// A labeled line at a single coordinate.
pub(crate) fn lower_label_line(
    t: &Technique,
    mut chart: ChartIr,
    _archetype: Archetype,
) -> ChartmarkResult<ChartIr> {
    let line = t.sub_mark("line", |m| m.line.as_ref())?;
    let text_color = t
        .marker()
        .map(|m| m.text_color_or("red"))
        .unwrap_or_else(|| "red".to_string());

    match t.coordinate()? {
        Coordinate::Polar(p) => {
            let theta = p
                .theta
                .as_ref()
                .ok_or_else(|| ChartmarkError::lowering("label_line has no theta"))?;
            let mut arc_enc = Encoding::new();
            arc_enc.set_datum("theta", Value::Number(theta.clone()));
            chart.push_layer(
                Layer::new(
                    Mark::new("arc")
                        .with("innerRadius", 1)
                        .with("outerRadius", 80)
                        .with("stroke", line.color.clone())
                        .with("strokeWidth", line.size)
                        .with("fillOpacity", 0),
                )
                .with_encoding(arc_enc),
            );

            let mut text_enc = Encoding::new();
            text_enc.set_datum("theta", Value::Number(theta.clone()));
            text_enc.set_value("text", Value::String(theta.to_string()));
            chart.push_layer(
                Layer::new(
                    Mark::new("text")
                        .with("radius", 80)
                        .with("radiusOffset", 12)
                        .with("color", text_color),
                )
                .with_encoding(text_enc),
            );
        }
        Coordinate::Cartesian(p) => {
            let (axis, at) = cartesian_line(p)?;
            let mut rule_enc = Encoding::new();
            rule_enc.set_datum(axis, at.to_json());
            chart.push_layer(
                Layer::new(
                    Mark::new("rule")
                        .with("color", line.color.clone())
                        .with("size", line.size),
                )
                .with_encoding(rule_enc),
            );

            let mut text_enc = Encoding::new();
            text_enc.set_value("text", Value::String(at.label()));
            text_enc.set_datum(axis, at.to_json());
            pin_other_axis(&mut text_enc, axis);
            chart.push_layer(
                Layer::new(axis_text_mark(axis, text_color)).with_encoding(text_enc),
            );
        }
    }
    Ok(chart)
}

fn cartesian_line(p: &CartesianPoint) -> ChartmarkResult<(&'static str, &Comparable)> {
    match (&p.x, &p.y) {
        (None, Some(y)) => Ok(("y", y)),
        (Some(x), None) => Ok(("x", x)),
        _ => Err(ChartmarkError::lowering(
            "label_line needs exactly one of x or y",
        )),
    }
}

/// Text mark placed beside a rule on `axis`.
pub(crate) fn axis_text_mark(axis: &str, color: String) -> Mark {
    let mark = Mark::new("text")
        .with("color", color)
        .with("baseline", "middle")
        .with("align", "left");
    if axis == "y" {
        mark.with("dx", 3)
    } else {
        mark.with("dy", -3).with("angle", 300)
    }
}

/// Pin the axis the label does not sit on to the plot edge.
pub(crate) fn pin_other_axis(enc: &mut Encoding, axis: &str) {
    if axis == "y" {
        enc.set_value("x", json!("width"));
    } else {
        enc.set_value("y", json!(0));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/technique/reference.rs"]
mod tests;
