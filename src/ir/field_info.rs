use crate::foundation::error::{ChartmarkError, ChartmarkResult};
use crate::ir::chart::ChartIr;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chart archetype; technique lowering branches on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    /// Nominal x, quantitative y.
    Bar,
    /// Temporal x, quantitative y.
    Line,
    /// Quantitative x and y.
    Scatter,
    /// Quantitative theta, nominal color.
    Pie,
    /// Bar split by a color group.
    GroupBar,
    /// Line split by a color group.
    GroupLine,
    /// Scatter split by a color group.
    GroupScatter,
}

impl Archetype {
    /// All archetypes, in declaration order.
    pub const ALL: [Archetype; 7] = [
        Self::Bar,
        Self::Line,
        Self::Scatter,
        Self::Pie,
        Self::GroupBar,
        Self::GroupLine,
        Self::GroupScatter,
    ];

    /// Snake-case name used in documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Scatter => "scatter",
            Self::Pie => "pie",
            Self::GroupBar => "group_bar",
            Self::GroupLine => "group_line",
            Self::GroupScatter => "group_scatter",
        }
    }

    /// Whether the archetype carries a color group.
    pub fn is_grouped(self) -> bool {
        matches!(self, Self::GroupBar | Self::GroupLine | Self::GroupScatter)
    }

    /// Whether the chart is drawn in polar coordinates.
    pub fn is_polar(self) -> bool {
        self == Self::Pie
    }

    /// Whether lowering treats this archetype as a line chart.
    pub fn is_line(self) -> bool {
        matches!(self, Self::Line | Self::GroupLine)
    }

    /// Whether lowering treats this archetype as a scatter chart.
    pub fn is_scatter(self) -> bool {
        matches!(self, Self::Scatter | Self::GroupScatter)
    }

    /// Whether lowering treats this archetype as a bar chart.
    pub fn is_bar(self) -> bool {
        matches!(self, Self::Bar | Self::GroupBar)
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Archetype {
    type Err = ChartmarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| ChartmarkError::unsupported(format!("unknown chart type '{s}'")))
    }
}

/// Field names of the base layer, classified by archetype.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldInfo {
    /// Nominal x over quantitative y.
    Bar {
        /// Field bound to x.
        category: String,
        /// Field bound to y.
        quantity: String,
        /// Field bound to color, when grouped.
        group: Option<String>,
    },
    /// Temporal x over quantitative y.
    Line {
        /// Field bound to x.
        temporal: String,
        /// Field bound to y.
        quantity: String,
        /// Field bound to color, when grouped.
        group: Option<String>,
    },
    /// Quantitative x and y.
    Scatter {
        /// Field bound to x.
        x_quantity: String,
        /// Field bound to y.
        y_quantity: String,
        /// Field bound to color, when grouped.
        group: Option<String>,
    },
    /// Quantitative theta with nominal color.
    Pie {
        /// Field bound to color.
        category: String,
        /// Field bound to theta.
        quantity: String,
    },
}

impl FieldInfo {
    /// Archetype implied by the bindings.
    pub fn archetype(&self) -> Archetype {
        match self {
            Self::Bar { group: None, .. } => Archetype::Bar,
            Self::Bar { .. } => Archetype::GroupBar,
            Self::Line { group: None, .. } => Archetype::Line,
            Self::Line { .. } => Archetype::GroupLine,
            Self::Scatter { group: None, .. } => Archetype::Scatter,
            Self::Scatter { .. } => Archetype::GroupScatter,
            Self::Pie { .. } => Archetype::Pie,
        }
    }

    /// The color-group field, if any.
    pub fn group(&self) -> Option<&str> {
        match self {
            Self::Bar { group, .. } | Self::Line { group, .. } | Self::Scatter { group, .. } => {
                group.as_deref()
            }
            Self::Pie { .. } => None,
        }
    }
}

impl ChartIr {
    /// Classify layer 0's `x`, `y`, `color` and `theta` bindings.
    pub fn field_info(&self) -> ChartmarkResult<FieldInfo> {
        let enc = &self.base()?.encoding;
        let x = enc.field("x");
        let y = enc.field("y");
        let color = enc.field("color");
        let theta = enc.field("theta");

        let group = match (color, theta) {
            (Some(c), None) => Some(c.field.clone()),
            _ => None,
        };

        if let (Some(x), Some(y)) = (x, y) {
            match (x.ty.as_str(), y.ty.as_str()) {
                ("temporal", "quantitative") => {
                    return Ok(FieldInfo::Line {
                        temporal: x.field.clone(),
                        quantity: y.field.clone(),
                        group,
                    });
                }
                ("nominal", "quantitative") => {
                    return Ok(FieldInfo::Bar {
                        category: x.field.clone(),
                        quantity: y.field.clone(),
                        group,
                    });
                }
                ("quantitative", "quantitative") => {
                    return Ok(FieldInfo::Scatter {
                        x_quantity: x.field.clone(),
                        y_quantity: y.field.clone(),
                        group,
                    });
                }
                _ => {}
            }
        }
        if let (Some(c), Some(t)) = (color, theta)
            && t.ty == "quantitative"
        {
            return Ok(FieldInfo::Pie {
                category: c.field.clone(),
                quantity: t.field.clone(),
            });
        }
        Err(ChartmarkError::unsupported(
            "base layer bindings do not match any chart archetype",
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ir/field_info.rs"]
mod tests;
