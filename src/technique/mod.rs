//! Technique nodes and their lowering onto the chart IR.

pub(crate) mod description;
pub(crate) mod encoding;
pub(crate) mod highlight;
pub(crate) mod reference;
pub(crate) mod registry;
pub(crate) mod summary;
pub(crate) mod text_layout;
pub(crate) mod trend;

use crate::annotation::data::DataSource;
use crate::annotation::filter::Predicate;
use crate::annotation::marker::Marker;
use crate::annotation::method::{
    AnnotationKind, DescriptionScope, Method, ReferenceSubtype, Subtype,
};
use crate::annotation::target::{Coordinate, Target};
use crate::foundation::error::{ChartmarkError, ChartmarkResult};
use crate::foundation::path::JsonPath;
use crate::ir::chart::ChartIr;
use crate::ir::encoding::Encoding;
use crate::ir::field_info::Archetype;
use serde::Deserialize;
use serde_json::Value;
use std::cmp::Ordering;

/// Concrete technique kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TechniqueKind {
    /// Outline the selected marks.
    Stroke,
    /// Fade the marks that are not selected.
    Opacity,
    /// Value labels on the selected marks.
    Label,
    /// Rules from the selected points to the axes.
    DataLine,
    /// Axis grid lines.
    GridLine,
    /// Box around a coordinate area.
    BoundingBox,
    /// Shaded coordinate range.
    Shadow,
    /// Labeled line at a coordinate.
    LabelLine,
    /// Labeled rule at a summary statistic.
    SummaryLine,
    /// Outline of the marks equal to a summary statistic.
    SummaryStroke,
    /// Least-squares trend line.
    LinearRegression,
    /// Note drawn in the plot margin.
    OutPlot,
    /// Note drawn next to the selected marks.
    InPlot,
}

impl TechniqueKind {
    /// Technique name as written in documents.
    pub fn name(self) -> &'static str {
        match self {
            Self::Stroke | Self::SummaryStroke => "stroke",
            Self::Opacity => "opacity",
            Self::Label => "label",
            Self::DataLine => "data_line",
            Self::GridLine => "grid_line",
            Self::BoundingBox => "bounding_box",
            Self::Shadow => "shadow",
            Self::LabelLine | Self::SummaryLine => "label_line",
            Self::LinearRegression => "linear_regression",
            Self::OutPlot => "out_plot",
            Self::InPlot => "in_plot",
        }
    }

    fn target_kind(self) -> &'static str {
        match self {
            Self::GridLine | Self::OutPlot => "chart_element",
            Self::BoundingBox | Self::Shadow | Self::LabelLine => "coordinate",
            _ => "data_items",
        }
    }

    pub(crate) fn is_description(self) -> bool {
        matches!(self, Self::OutPlot | Self::InPlot)
    }

    /// Whether a technique of this kind may appear in an annotation of `method`.
    pub fn fits(self, method: &Method) -> bool {
        use AnnotationKind as K;
        use ReferenceSubtype as R;

        let sub = method.subtype();
        match self {
            Self::Stroke | Self::Opacity => method.kind() == K::Highlight,
            Self::Label => method.kind() == K::Encoding,
            Self::DataLine => sub == Some(Subtype::Reference(R::DataLine)),
            Self::GridLine => sub == Some(Subtype::Reference(R::GridLine)),
            Self::BoundingBox => sub == Some(Subtype::Reference(R::ExtraArea)),
            Self::Shadow => sub == Some(Subtype::Reference(R::ExtraRange)),
            Self::LabelLine => sub == Some(Subtype::Reference(R::ExtraLine)),
            Self::SummaryLine | Self::SummaryStroke => method.kind() == K::Summary,
            Self::LinearRegression => method.kind() == K::Trend,
            Self::OutPlot => method.kind() == K::Description,
            Self::InPlot => sub == Some(Subtype::Description(DescriptionScope::LocalNote)),
        }
    }
}

/// Raw technique record as it appears in an annotation document.
#[derive(Clone, Debug, Deserialize)]
pub struct TechniqueRecord {
    /// Technique name.
    pub name: String,
    /// Target object.
    pub target: Value,
    /// Optional marker object.
    #[serde(default)]
    pub marker: Option<Value>,
    /// Optional data override; description techniques otherwise use the annotation's data.
    #[serde(default)]
    pub data: Option<Value>,
}

/// Inputs shared by every technique constructor.
#[derive(Clone, Copy, Debug)]
pub struct BuildContext<'a> {
    /// Archetype of the chart being annotated.
    pub archetype: Archetype,
    /// Data source of the owning annotation.
    pub data: &'a DataSource,
}

/// A validated technique node.
#[derive(Clone, Debug, PartialEq)]
pub struct Technique {
    kind: TechniqueKind,
    target: Target,
    marker: Option<Marker>,
    note: Option<String>,
}

impl Technique {
    /// Build and validate a technique of `kind`.
    pub fn new(
        kind: TechniqueKind,
        target: Target,
        marker: Option<Marker>,
        note: Option<String>,
    ) -> ChartmarkResult<Self> {
        let t = Self {
            kind,
            target,
            marker,
            note,
        };
        t.validate()?;
        Ok(t)
    }

    /// Build from a document record.
    pub fn from_record(
        kind: TechniqueKind,
        record: &TechniqueRecord,
        cx: &BuildContext<'_>,
    ) -> ChartmarkResult<Self> {
        let here = JsonPath::root();
        let target = Target::from_json(&record.target, cx.archetype)
            .map_err(|e| e.at(&here.field("target").to_string()))?;
        let marker = record
            .marker
            .as_ref()
            .map(Marker::from_json)
            .transpose()
            .map_err(|e| e.at(&here.field("marker").to_string()))?;
        let note = if kind.is_description() {
            let own = record
                .data
                .as_ref()
                .map(DataSource::from_json)
                .transpose()
                .map_err(|e| e.at(&here.field("data").to_string()))?;
            own.as_ref()
                .unwrap_or(cx.data)
                .text_content()
                .map(str::to_string)
        } else {
            None
        };
        Self::new(kind, target, marker, note)
    }

    /// Technique kind.
    pub fn kind(&self) -> TechniqueKind {
        self.kind
    }

    /// Technique name.
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Target.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Marker, if any.
    pub fn marker(&self) -> Option<&Marker> {
        self.marker.as_ref()
    }

    /// Note text of description techniques.
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Replace the target; returns `false` and keeps the old one when the new target is invalid.
    pub fn set_target(&mut self, target: Target, archetype: Archetype) -> bool {
        if target.validate(archetype).is_err() {
            return false;
        }
        let old = std::mem::replace(&mut self.target, target);
        if self.validate().is_err() {
            self.target = old;
            return false;
        }
        true
    }

    /// Replace the marker; returns `false` and keeps the old one when the new marker is invalid.
    pub fn set_marker(&mut self, marker: Option<Marker>) -> bool {
        if let Some(m) = &marker
            && m.validate().is_err()
        {
            return false;
        }
        let old = std::mem::replace(&mut self.marker, marker);
        if self.validate().is_err() {
            self.marker = old;
            return false;
        }
        true
    }

    /// Swap the note of a description technique; returns `false` for other kinds or an empty note.
    pub(crate) fn set_note(&mut self, note: &str) -> bool {
        if !self.kind.is_description() || note.is_empty() {
            return false;
        }
        self.note = Some(note.to_string());
        true
    }

    /// Check target kind, marker requirements and coordinate ordering.
    pub fn validate(&self) -> ChartmarkResult<()> {
        let name = self.name();
        if self.target.kind_name() != self.kind.target_kind() {
            return Err(ChartmarkError::semantic(format!(
                "{name} requires a {} target, got {}",
                self.kind.target_kind(),
                self.target.kind_name()
            )));
        }
        let m = self.marker.as_ref();
        let has = |pick: fn(&Marker) -> bool| m.is_some_and(pick);
        let require = |ok: bool, what: &str| {
            if ok {
                Ok(())
            } else {
                Err(ChartmarkError::semantic(format!("{name} marker requires {what}")))
            }
        };
        match self.kind {
            TechniqueKind::Stroke | TechniqueKind::SummaryStroke => {
                require(has(|m| m.stroke.is_some()), "stroke")?
            }
            TechniqueKind::Opacity => require(has(|m| m.opacity.is_some()), "opacity")?,
            TechniqueKind::Label => require(has(|m| m.text.is_some()), "text")?,
            TechniqueKind::DataLine
            | TechniqueKind::LabelLine
            | TechniqueKind::SummaryLine
            | TechniqueKind::LinearRegression => require(has(|m| m.line.is_some()), "line")?,
            TechniqueKind::BoundingBox | TechniqueKind::Shadow => {
                require(has(|m| m.rect.is_some()), "rect")?
            }
            TechniqueKind::GridLine => {}
            TechniqueKind::OutPlot => {
                require(has(|m| m.text.is_some() || m.rect.is_some()), "text or rect")?;
                if has(|m| m.line.is_some()) {
                    return Err(ChartmarkError::semantic(format!(
                        "{name} marker does not support line"
                    )));
                }
            }
            TechniqueKind::InPlot => require(
                has(|m| m.stroke.is_some() || m.text.is_some() || m.rect.is_some()),
                "stroke, text or rect",
            )?,
        }
        if self.kind.is_description() && self.note.as_deref().is_none_or(str::is_empty) {
            return Err(ChartmarkError::semantic(format!(
                "{name} needs external data with text content"
            )));
        }
        match (self.kind, &self.target) {
            (TechniqueKind::GridLine, Target::ChartElement(e)) if !e.has_grid() => Err(
                ChartmarkError::semantic("grid_line needs at least one axis with grid: true"),
            ),
            (TechniqueKind::BoundingBox, Target::Coordinate(c)) => reference::check_area(c),
            (TechniqueKind::Shadow, Target::Coordinate(c)) => reference::check_range(c),
            (TechniqueKind::LabelLine, Target::Coordinate(c)) => reference::check_line(c),
            _ => Ok(()),
        }
    }

    /// Apply this technique to `chart`, returning the next chart IR.
    ///
    /// Archetypes a technique does not support return the chart unchanged.
    pub fn lower(
        &self,
        chart: ChartIr,
        archetype: Archetype,
        subtype: Option<Subtype>,
    ) -> ChartmarkResult<ChartIr> {
        match self.kind {
            TechniqueKind::Stroke => highlight::lower_stroke(self, chart, archetype),
            TechniqueKind::Opacity => highlight::lower_opacity(self, chart, archetype),
            TechniqueKind::Label => encoding::lower_label(self, chart, archetype),
            TechniqueKind::DataLine => reference::lower_data_line(self, chart, archetype),
            TechniqueKind::GridLine => reference::lower_grid_line(self, chart, archetype),
            TechniqueKind::BoundingBox => reference::lower_bounding_box(self, chart, archetype),
            TechniqueKind::Shadow => reference::lower_shadow(self, chart, archetype),
            TechniqueKind::LabelLine => reference::lower_label_line(self, chart, archetype),
            TechniqueKind::SummaryLine => {
                summary::lower_summary_line(self, chart, archetype, subtype)
            }
            TechniqueKind::SummaryStroke => {
                summary::lower_summary_stroke(self, chart, archetype, subtype)
            }
            TechniqueKind::LinearRegression => {
                trend::lower_linear_regression(self, chart, archetype)
            }
            TechniqueKind::OutPlot => description::lower_out_plot(self, chart),
            TechniqueKind::InPlot => description::lower_in_plot(self, chart, archetype),
        }
    }

    /// Compile the data-items filter against `chart`'s field names.
    pub(crate) fn predicate(&self, chart: &ChartIr) -> ChartmarkResult<Predicate> {
        let filter = self.target.data_items(self.name())?;
        let info = chart.field_info()?;
        Predicate::compile(filter, &info)
    }

    pub(crate) fn coordinate(&self) -> ChartmarkResult<&Coordinate> {
        self.target.coordinate(self.name())
    }

    /// A sub-mark the technique's validation already requires.
    pub(crate) fn sub_mark<'a, T>(
        &'a self,
        what: &str,
        pick: impl Fn(&'a Marker) -> Option<&'a T>,
    ) -> ChartmarkResult<&'a T> {
        self.marker.as_ref().and_then(pick).ok_or_else(|| {
            ChartmarkError::semantic(format!("{} marker requires {what}", self.name()))
        })
    }
}

/// Copy `required` channels (which must exist) and `optional` channels (when bound) from the
/// base layer.
pub(crate) fn base_channels(
    chart: &ChartIr,
    required: &[&str],
    optional: &[&str],
) -> ChartmarkResult<Encoding> {
    let base = &chart.base()?.encoding;
    let mut enc = Encoding::new();
    for ch in required {
        enc.copy_from(base, ch)?;
    }
    for ch in optional {
        enc.copy_if_present(base, ch);
    }
    Ok(enc)
}

/// Require `lo < hi` when both ends are present; a lone end is an error.
pub(crate) fn check_ordered<T>(
    what: &str,
    lo: Option<&T>,
    hi: Option<&T>,
    cmp: impl Fn(&T, &T) -> ChartmarkResult<Ordering>,
) -> ChartmarkResult<bool> {
    match (lo, hi) {
        (None, None) => Ok(false),
        (Some(lo), Some(hi)) => {
            if cmp(lo, hi)? == Ordering::Less {
                Ok(true)
            } else {
                Err(ChartmarkError::semantic(format!(
                    "{what} start must be less than its end"
                )))
            }
        }
        _ => Err(ChartmarkError::semantic(format!(
            "{what} needs both a start and an end"
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/technique/mod.rs"]
mod tests;
