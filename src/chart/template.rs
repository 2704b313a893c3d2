use crate::chart::spec::ChartSpec;
use crate::foundation::error::ChartmarkResult;
use crate::ir::chart::ChartIr;
use crate::ir::encoding::{Binding, Encoding, FieldBinding};
use crate::ir::field_info::Archetype;
use crate::ir::layer::{Layer, Mark};
use serde_json::{Value, json};

/// Render `spec` as a one-layer chart over its normalized rows.
#[tracing::instrument(skip(spec), fields(kind = %spec.kind))]
pub fn render_base_chart(spec: &ChartSpec) -> ChartmarkResult<ChartIr> {
    let rows = spec.rows()?;
    tracing::debug!(rows = rows.len(), "normalized chart data");
    let layer = Layer::new(base_mark(spec.kind)).with_encoding(base_encoding(spec));
    Ok(ChartIr::new(spec.title.clone(), rows, layer))
}

fn base_mark(kind: Archetype) -> Mark {
    match kind {
        Archetype::Bar | Archetype::GroupBar => Mark::new("bar"),
        Archetype::Line | Archetype::GroupLine => Mark::new("line").with("point", true),
        Archetype::Scatter | Archetype::GroupScatter => Mark::new("point")
            .with("filled", true)
            .with("size", 80),
        Archetype::Pie => Mark::new("arc")
            .with("innerRadius", 0)
            .with("outerRadius", 80),
    }
}

fn titled(field: &str, ty: &str) -> FieldBinding {
    FieldBinding::new(field, ty).with("title", Value::String(field.to_string()))
}

fn no_grid() -> Value {
    json!({"grid": false})
}

fn base_encoding(spec: &ChartSpec) -> Encoding {
    let x = spec.x_name.as_str();
    let y = spec.y_name.as_str();
    let mut enc = Encoding::new();

    if spec.kind == Archetype::Pie {
        enc.set(
            "theta",
            Binding::Field(
                FieldBinding::new(y, "quantitative")
                    .with("stack", Value::Bool(true))
                    .with("title", Value::String(y.to_string())),
            ),
        );
        enc.set("color", Binding::Field(titled(x, "nominal")));
        enc.set(
            "tooltip",
            Binding::Raw(json!([
                {"field": x, "type": "nominal"},
                {"field": y, "type": "quantitative"}
            ])),
        );
        enc.set_value("opacity", json!(1));
        return enc;
    }

    let x_binding = if spec.kind.is_line() {
        let mut b = titled(x, "temporal").with(
            "axis",
            json!({"labelAngle": -45, "labelOverlap": false, "grid": false}),
        );
        if spec.kind == Archetype::Line {
            b = b.with("scale", json!({"nice": true}));
        }
        b
    } else if spec.kind.is_bar() {
        titled(x, "nominal").with("axis", json!({"labelAngle": -45}))
    } else {
        titled(x, "quantitative").with("axis", no_grid())
    };
    enc.set("x", Binding::Field(x_binding));

    let group = spec.classify_name.as_deref().filter(|_| spec.kind.is_grouped());
    if spec.kind == Archetype::GroupBar
        && let Some(g) = group
    {
        enc.set_field("xOffset", g, "nominal");
    }
    enc.set(
        "y",
        Binding::Field(titled(y, "quantitative").with("axis", no_grid())),
    );
    if let Some(g) = group {
        enc.set("color", Binding::Field(titled(g, "nominal")));
    }
    enc
}

#[cfg(test)]
#[path = "../../tests/unit/chart/template.rs"]
mod tests;
