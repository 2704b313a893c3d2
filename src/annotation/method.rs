use crate::foundation::error::{ChartmarkError, ChartmarkResult};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Top-level annotation kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnnotationKind {
    /// Reference lines, areas and ranges.
    Reference,
    /// Emphasis of selected data items.
    Highlight,
    /// Extra encodings such as value labels.
    Encoding,
    /// Summary statistics.
    Summary,
    /// Textual notes.
    Description,
    /// Fitted trends.
    Trend,
}

impl AnnotationKind {
    /// All kinds, in declaration order.
    pub const ALL: [AnnotationKind; 6] = [
        Self::Reference,
        Self::Highlight,
        Self::Encoding,
        Self::Summary,
        Self::Description,
        Self::Trend,
    ];

    /// Name used in documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Highlight => "highlight",
            Self::Encoding => "encoding",
            Self::Summary => "summary",
            Self::Description => "description",
            Self::Trend => "trend",
        }
    }

    fn parse(s: &str) -> ChartmarkResult<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ChartmarkError::unsupported(format!("unknown annotation type '{s}'")))
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference subtypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReferenceSubtype {
    /// Axis grid lines.
    GridLine,
    /// Rules from data points to the axes.
    DataLine,
    /// A labeled line at a coordinate.
    ExtraLine,
    /// A shaded coordinate range.
    ExtraRange,
    /// A box around a coordinate area.
    ExtraArea,
}

/// Summary statistic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SummaryStat {
    /// Maximum.
    Max,
    /// Minimum.
    Min,
    /// Median.
    Median,
    /// Arithmetic mean.
    Mean,
}

impl SummaryStat {
    /// Vega-Lite aggregate op name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::Min => "min",
            Self::Median => "median",
            Self::Mean => "mean",
        }
    }
}

/// Description scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DescriptionScope {
    /// A note about the whole chart.
    GlobalNote,
    /// A note about specific data items.
    LocalNote,
}

/// Method subtype; gates which technique names a kind accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subtype {
    /// Reference subtype.
    Reference(ReferenceSubtype),
    /// Summary statistic.
    Summary(SummaryStat),
    /// Description scope.
    Description(DescriptionScope),
}

impl Subtype {
    /// Name used in documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reference(ReferenceSubtype::GridLine) => "grid_line",
            Self::Reference(ReferenceSubtype::DataLine) => "data_line",
            Self::Reference(ReferenceSubtype::ExtraLine) => "extra_line",
            Self::Reference(ReferenceSubtype::ExtraRange) => "extra_range",
            Self::Reference(ReferenceSubtype::ExtraArea) => "extra_area",
            Self::Summary(stat) => stat.as_str(),
            Self::Description(DescriptionScope::GlobalNote) => "global_note",
            Self::Description(DescriptionScope::LocalNote) => "local_note",
        }
    }

    /// Statistic of a summary subtype.
    pub fn stat(self) -> Option<SummaryStat> {
        match self {
            Self::Summary(stat) => Some(stat),
            _ => None,
        }
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const REFERENCE_SUBTYPES: [ReferenceSubtype; 5] = [
    ReferenceSubtype::GridLine,
    ReferenceSubtype::DataLine,
    ReferenceSubtype::ExtraLine,
    ReferenceSubtype::ExtraRange,
    ReferenceSubtype::ExtraArea,
];

const SUMMARY_STATS: [SummaryStat; 4] = [
    SummaryStat::Max,
    SummaryStat::Min,
    SummaryStat::Median,
    SummaryStat::Mean,
];

const DESCRIPTION_SCOPES: [DescriptionScope; 2] =
    [DescriptionScope::GlobalNote, DescriptionScope::LocalNote];

#[derive(Deserialize)]
struct MethodDef {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, rename = "subType", alias = "subtype")]
    sub_type: Option<String>,
}

/// Annotation method: a kind plus the subtype that kind requires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Method {
    kind: AnnotationKind,
    subtype: Option<Subtype>,
}

impl Method {
    /// Build a method, checking that `subtype` belongs to `kind`.
    pub fn new(kind: AnnotationKind, subtype: Option<Subtype>) -> ChartmarkResult<Self> {
        let ok = matches!(
            (kind, subtype),
            (AnnotationKind::Reference, Some(Subtype::Reference(_)))
                | (AnnotationKind::Summary, Some(Subtype::Summary(_)))
                | (AnnotationKind::Description, Some(Subtype::Description(_)))
                | (
                    AnnotationKind::Highlight | AnnotationKind::Encoding | AnnotationKind::Trend,
                    None
                )
        );
        if !ok {
            return Err(ChartmarkError::semantic(format!(
                "subtype {} does not belong to method '{kind}'",
                subtype.map_or("<none>", Subtype::as_str)
            )));
        }
        Ok(Self { kind, subtype })
    }

    /// Parse `{type, subType?}`.
    pub fn from_json(value: &Value) -> ChartmarkResult<Self> {
        let def: MethodDef = serde_json::from_value(value.clone())
            .map_err(|e| ChartmarkError::structural(format!("invalid method: {e}")))?;
        let kind = AnnotationKind::parse(&def.kind)?;
        let needs_subtype = matches!(
            kind,
            AnnotationKind::Reference | AnnotationKind::Summary | AnnotationKind::Description
        );
        let subtype = match (needs_subtype, def.sub_type.as_deref()) {
            (false, _) => None,
            (true, None) => {
                return Err(ChartmarkError::structural(format!(
                    "'{kind}' method requires a subType"
                )));
            }
            (true, Some(s)) => Some(parse_subtype(kind, s)?),
        };
        Self::new(kind, subtype)
    }

    /// Annotation kind.
    pub fn kind(&self) -> AnnotationKind {
        self.kind
    }

    /// Subtype, for kinds that carry one.
    pub fn subtype(&self) -> Option<Subtype> {
        self.subtype
    }
}

fn parse_subtype(kind: AnnotationKind, s: &str) -> ChartmarkResult<Subtype> {
    let candidates: Vec<Subtype> = match kind {
        AnnotationKind::Reference => REFERENCE_SUBTYPES.map(Subtype::Reference).to_vec(),
        AnnotationKind::Summary => SUMMARY_STATS.map(Subtype::Summary).to_vec(),
        AnnotationKind::Description => DESCRIPTION_SCOPES.map(Subtype::Description).to_vec(),
        _ => Vec::new(),
    };
    candidates
        .into_iter()
        .find(|c| c.as_str() == s)
        .ok_or_else(|| {
            ChartmarkError::unsupported(format!("unknown subType '{s}' for '{kind}' method"))
        })
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.subtype {
            Some(sub) => write!(f, "{}/{}", self.kind, sub),
            None => write!(f, "{}", self.kind),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/annotation/method.rs"]
mod tests;
