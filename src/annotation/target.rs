use crate::annotation::filter::FilterNode;
use crate::foundation::error::{ChartmarkError, ChartmarkResult};
use crate::foundation::value::Comparable;
use crate::ir::field_info::Archetype;
use serde::Deserialize;
use serde_json::{Map, Number, Value};

/// Cartesian coordinates; any subset of `x, x1, y, y1`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CartesianPoint {
    /// Start on x.
    pub x: Option<Comparable>,
    /// End on x.
    pub x1: Option<Comparable>,
    /// Start on y.
    pub y: Option<Comparable>,
    /// End on y.
    pub y1: Option<Comparable>,
}

/// Polar coordinates; any subset of `theta, theta2, radius, radius2`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolarPoint {
    /// Start angle, in theta-field units.
    pub theta: Option<Number>,
    /// End angle.
    pub theta2: Option<Number>,
    /// Inner radius.
    pub radius: Option<Number>,
    /// Outer radius.
    pub radius2: Option<Number>,
}

/// Coordinate target payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Coordinate {
    /// `xyCoordinate`.
    Cartesian(CartesianPoint),
    /// `polarCoordinate`.
    Polar(PolarPoint),
}

/// Per-axis chart element configuration.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisConfig {
    /// Draw grid lines.
    #[serde(default)]
    pub grid: bool,
    /// Spacing between explicit tick values.
    #[serde(default)]
    pub interval: Option<f64>,
    /// Desired tick count.
    #[serde(default)]
    pub tick_count: Option<i64>,
}

/// `chart_element` target payload.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartElement {
    /// x axis.
    #[serde(default)]
    pub x_axis: Option<AxisConfig>,
    /// y axis.
    #[serde(default)]
    pub y_axis: Option<AxisConfig>,
    /// theta axis of pie charts.
    #[serde(default)]
    pub theta_axis: Option<AxisConfig>,
}

impl ChartElement {
    /// Whether any axis asks for grid lines.
    pub fn has_grid(&self) -> bool {
        [&self.x_axis, &self.y_axis, &self.theta_axis]
            .into_iter()
            .flatten()
            .any(|a| a.grid)
    }
}

/// What a technique points at.
#[derive(Clone, Debug, PartialEq)]
pub enum Target {
    /// Data items selected by an optional filter; `None` selects everything.
    DataItems(Option<FilterNode>),
    /// A point or region in chart coordinates.
    Coordinate(Coordinate),
    /// Axes and other chart furniture.
    ChartElement(ChartElement),
    /// Another annotation, by id.
    Annotation {
        /// Referenced annotation id.
        prior: String,
    },
}

impl Target {
    /// Target kind name as written in documents.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::DataItems(_) => "data_items",
            Self::Coordinate(_) => "coordinate",
            Self::ChartElement(_) => "chart_element",
            Self::Annotation { .. } => "annotation",
        }
    }

    /// Parse `{type, ...}` for a chart of the given archetype.
    pub fn from_json(value: &Value, archetype: Archetype) -> ChartmarkResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| ChartmarkError::structural("target must be an object"))?;
        let kind = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ChartmarkError::structural("target requires a 'type'"))?;
        match kind {
            "data_items" => {
                let filter = match obj.get("filter") {
                    None | Some(Value::Null) => None,
                    Some(Value::Object(f)) if f.is_empty() => None,
                    Some(f) => Some(FilterNode::parse_for(f, archetype)?),
                };
                Ok(Self::DataItems(filter))
            }
            "coordinate" => parse_coordinate(obj, archetype).map(Self::Coordinate),
            "chart_element" => {
                let element: ChartElement = serde_json::from_value(value.clone()).map_err(|e| {
                    ChartmarkError::structural(format!("invalid chart_element target: {e}"))
                })?;
                Ok(Self::ChartElement(element))
            }
            "annotation" => match obj.get("prior").and_then(Value::as_str) {
                Some(prior) if !prior.is_empty() => Ok(Self::Annotation {
                    prior: prior.to_string(),
                }),
                _ => Err(ChartmarkError::structural(
                    "annotation target requires a non-empty 'prior'",
                )),
            },
            other => Err(ChartmarkError::structural(format!(
                "unknown target type '{other}'"
            ))),
        }
    }

    /// Re-check archetype-dependent rules, for targets built in code.
    pub fn validate(&self, archetype: Archetype) -> ChartmarkResult<()> {
        match self {
            Self::DataItems(Some(filter)) => filter.validate(archetype),
            Self::Coordinate(Coordinate::Cartesian(_)) if archetype.is_polar() => Err(
                ChartmarkError::structural("pie chart targets must use polarCoordinate"),
            ),
            Self::Coordinate(Coordinate::Polar(_)) if !archetype.is_polar() => {
                Err(ChartmarkError::structural(format!(
                    "{archetype} chart targets must use xyCoordinate"
                )))
            }
            Self::Annotation { prior } if prior.is_empty() => Err(ChartmarkError::structural(
                "annotation target requires a non-empty 'prior'",
            )),
            _ => Ok(()),
        }
    }

    /// The data-items filter, or an error naming `technique`.
    pub fn data_items(&self, technique: &str) -> ChartmarkResult<Option<&FilterNode>> {
        match self {
            Self::DataItems(f) => Ok(f.as_ref()),
            other => Err(wrong_kind(technique, "data_items", other)),
        }
    }

    /// The coordinate payload, or an error naming `technique`.
    pub fn coordinate(&self, technique: &str) -> ChartmarkResult<&Coordinate> {
        match self {
            Self::Coordinate(c) => Ok(c),
            other => Err(wrong_kind(technique, "coordinate", other)),
        }
    }

    /// The chart element payload, or an error naming `technique`.
    pub fn chart_element(&self, technique: &str) -> ChartmarkResult<&ChartElement> {
        match self {
            Self::ChartElement(e) => Ok(e),
            other => Err(wrong_kind(technique, "chart_element", other)),
        }
    }
}

fn wrong_kind(technique: &str, expected: &str, got: &Target) -> ChartmarkError {
    ChartmarkError::semantic(format!(
        "{technique} requires a {expected} target, got {}",
        got.kind_name()
    ))
}

fn parse_coordinate(obj: &Map<String, Value>, archetype: Archetype) -> ChartmarkResult<Coordinate> {
    if archetype.is_polar() {
        let polar = obj
            .get("polarCoordinate")
            .and_then(Value::as_object)
            .ok_or_else(|| ChartmarkError::structural("pie chart targets must use polarCoordinate"))?;
        let num = |key: &str| -> ChartmarkResult<Option<Number>> {
            match polar.get(key) {
                None | Some(Value::Null) => Ok(None),
                Some(Value::Number(n)) => Ok(Some(n.clone())),
                Some(other) => Err(ChartmarkError::semantic(format!(
                    "polar {key} must be a number, got {other}"
                ))),
            }
        };
        Ok(Coordinate::Polar(PolarPoint {
            theta: num("theta")?,
            theta2: num("theta2")?,
            radius: num("radius")?,
            radius2: num("radius2")?,
        }))
    } else {
        let xy = obj
            .get("xyCoordinate")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                ChartmarkError::structural(format!(
                    "{archetype} chart targets must use xyCoordinate"
                ))
            })?;
        let val = |key: &str| -> ChartmarkResult<Option<Comparable>> {
            match xy.get(key) {
                None | Some(Value::Null) => Ok(None),
                Some(v) => Comparable::from_json(v)
                    .map(Some)
                    .map_err(|e| e.at(&format!("xyCoordinate.{key}"))),
            }
        };
        Ok(Coordinate::Cartesian(CartesianPoint {
            x: val("x")?,
            x1: val("x1")?,
            y: val("y")?,
            y1: val("y1")?,
        }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/annotation/target.rs"]
mod tests;
