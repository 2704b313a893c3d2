use crate::foundation::error::{ChartmarkError, ChartmarkResult};
use serde::Deserialize;
use serde_json::{Map, Value, json};

fn black() -> String {
    "black".to_string()
}

fn red() -> String {
    "red".to_string()
}

fn gray() -> String {
    "gray".to_string()
}

fn two() -> i64 {
    2
}

fn four() -> i64 {
    4
}

fn half() -> f64 {
    0.5
}

fn one() -> f64 {
    1.0
}

/// Text styling.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TextMark {
    /// Field the text refers to.
    pub field: String,
    /// Text color.
    #[serde(default = "black")]
    pub color: String,
}

/// Rule and line styling.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LineMark {
    /// Stroke color.
    #[serde(default = "red")]
    pub color: String,
    /// Stroke size in pixels, `> 0`.
    #[serde(default = "two")]
    pub size: i64,
}

impl Default for LineMark {
    fn default() -> Self {
        Self {
            color: red(),
            size: 2,
        }
    }
}

/// Rectangle and area styling.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectMark {
    /// Fill color.
    #[serde(default = "red")]
    pub color: String,
    /// Fill opacity in `[0, 1]`.
    #[serde(default = "half")]
    pub opacity: f64,
    /// Border color.
    #[serde(default = "gray")]
    pub stroke: String,
    /// Border width, `>= 0`.
    #[serde(default = "two")]
    pub stroke_width: i64,
    /// Corner radius, `>= 0`.
    #[serde(default = "four")]
    pub corner_radius: i64,
}

/// Outline styling for highlighted marks.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StrokeMark {
    /// Outline width, `> 0`.
    #[serde(default = "two")]
    pub width: i64,
    /// Outline color.
    #[serde(default = "black")]
    pub color: String,
}

/// Opacity split between selected and other marks.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct OpacityMark {
    /// Opacity of selected marks, in `[0, 1]`.
    #[serde(default = "one")]
    pub selected: f64,
    /// Opacity of the remaining marks, in `[0, 1]`.
    #[serde(default = "half")]
    pub other: f64,
}

#[derive(Deserialize)]
struct MarkerDef {
    #[serde(default)]
    text: Option<TextMark>,
    #[serde(default)]
    line: Option<LineMark>,
    #[serde(default)]
    rect: Option<RectMark>,
    #[serde(default)]
    stroke: Option<StrokeMark>,
    #[serde(default)]
    opacity: Option<OpacityMark>,
    #[serde(flatten)]
    extensions: Map<String, Value>,
}

/// Styling bag attached to a technique.
///
/// Unknown keys are kept in `extensions` and written back after the typed sub-marks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Marker {
    /// Text styling.
    pub text: Option<TextMark>,
    /// Rule and line styling.
    pub line: Option<LineMark>,
    /// Rectangle styling.
    pub rect: Option<RectMark>,
    /// Outline styling.
    pub stroke: Option<StrokeMark>,
    /// Opacity styling.
    pub opacity: Option<OpacityMark>,
    /// Extension attributes, in input order.
    pub extensions: Map<String, Value>,
}

impl Marker {
    /// Parse and validate a marker object.
    pub fn from_json(value: &Value) -> ChartmarkResult<Self> {
        if !value.is_object() {
            return Err(ChartmarkError::structural("marker must be an object"));
        }
        let def: MarkerDef = serde_json::from_value(value.clone())
            .map_err(|e| ChartmarkError::structural(format!("invalid marker: {e}")))?;
        let marker = Self {
            text: def.text,
            line: def.line,
            rect: def.rect,
            stroke: def.stroke,
            opacity: def.opacity,
            extensions: def.extensions,
        };
        marker.validate()?;
        Ok(marker)
    }

    /// Check sub-mark ranges and that the marker is not empty.
    pub fn validate(&self) -> ChartmarkResult<()> {
        if self.text.is_none()
            && self.line.is_none()
            && self.rect.is_none()
            && self.stroke.is_none()
            && self.opacity.is_none()
            && self.extensions.is_empty()
        {
            return Err(ChartmarkError::semantic(
                "marker needs at least one sub-mark or extension attribute",
            ));
        }
        if let Some(line) = &self.line
            && line.size <= 0
        {
            return Err(ChartmarkError::semantic("line size must be a positive integer"));
        }
        if let Some(rect) = &self.rect {
            unit_interval("rect opacity", rect.opacity)?;
            if rect.stroke_width < 0 {
                return Err(ChartmarkError::semantic("rect strokeWidth must be >= 0"));
            }
            if rect.corner_radius < 0 {
                return Err(ChartmarkError::semantic("rect cornerRadius must be >= 0"));
            }
        }
        if let Some(stroke) = &self.stroke
            && stroke.width <= 0
        {
            return Err(ChartmarkError::semantic("stroke width must be a positive integer"));
        }
        if let Some(opacity) = &self.opacity {
            unit_interval("opacity selected", opacity.selected)?;
            unit_interval("opacity other", opacity.other)?;
        }
        Ok(())
    }

    /// Serialize: typed sub-marks in fixed order, then extensions.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        if let Some(t) = &self.text {
            obj.insert("text".into(), json!({"field": t.field, "color": t.color}));
        }
        if let Some(l) = &self.line {
            obj.insert("line".into(), json!({"color": l.color, "size": l.size}));
        }
        if let Some(r) = &self.rect {
            obj.insert(
                "rect".into(),
                json!({
                    "color": r.color,
                    "opacity": r.opacity,
                    "stroke": r.stroke,
                    "strokeWidth": r.stroke_width,
                    "cornerRadius": r.corner_radius,
                }),
            );
        }
        if let Some(s) = &self.stroke {
            obj.insert("stroke".into(), json!({"width": s.width, "color": s.color}));
        }
        if let Some(o) = &self.opacity {
            obj.insert(
                "opacity".into(),
                json!({"selected": o.selected, "other": o.other}),
            );
        }
        for (k, v) in &self.extensions {
            obj.insert(k.clone(), v.clone());
        }
        Value::Object(obj)
    }

    /// Text color, or `fallback` when no text sub-mark is present.
    pub fn text_color_or(&self, fallback: &str) -> String {
        self.text
            .as_ref()
            .map(|t| t.color.clone())
            .unwrap_or_else(|| fallback.to_string())
    }
}

fn unit_interval(what: &str, v: f64) -> ChartmarkResult<()> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(ChartmarkError::semantic(format!(
            "{what} must be in [0, 1], got {v}"
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/annotation/marker.rs"]
mod tests;
