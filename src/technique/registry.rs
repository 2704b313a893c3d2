use crate::annotation::method::{
    AnnotationKind, DescriptionScope, ReferenceSubtype, Subtype, SummaryStat,
};
use crate::foundation::error::{ChartmarkError, ChartmarkResult};
use crate::technique::{BuildContext, Technique, TechniqueKind, TechniqueRecord};
use std::collections::BTreeMap;
use std::fmt;

/// Builds a technique from its document record.
pub type TechniqueCtor = fn(&TechniqueRecord, &BuildContext<'_>) -> ChartmarkResult<Technique>;

/// A `(kind, subtype)` pair that technique names are registered under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    /// Annotation kind.
    pub kind: AnnotationKind,
    /// Subtype, for kinds that carry one.
    pub subtype: Option<Subtype>,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.subtype {
            Some(s) => write!(f, "{}/{s}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// Immutable `(kind, subtype) -> name -> constructor` table.
#[derive(Clone, Debug, Default)]
pub struct TechniqueRegistry {
    slots: BTreeMap<Slot, BTreeMap<String, TechniqueCtor>>,
}

/// Accumulates registrations for a [`TechniqueRegistry`].
#[derive(Clone, Debug, Default)]
pub struct RegistryBuilder {
    slots: BTreeMap<Slot, BTreeMap<String, TechniqueCtor>>,
}

impl RegistryBuilder {
    /// Register `name` under `(kind, subtype)`; a later registration replaces an earlier one.
    pub fn register(
        mut self,
        kind: AnnotationKind,
        subtype: Option<Subtype>,
        name: &str,
        ctor: TechniqueCtor,
    ) -> Self {
        self.slots
            .entry(Slot { kind, subtype })
            .or_default()
            .insert(name.to_string(), ctor);
        self
    }

    /// Freeze the table.
    pub fn build(self) -> TechniqueRegistry {
        TechniqueRegistry { slots: self.slots }
    }
}

macro_rules! ctor {
    ($kind:ident) => {
        (|r: &TechniqueRecord, cx: &BuildContext<'_>| {
            Technique::from_record(TechniqueKind::$kind, r, cx)
        }) as TechniqueCtor
    };
}

impl TechniqueRegistry {
    /// Empty builder.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Every built-in technique.
    pub fn builtin() -> Self {
        use AnnotationKind as K;
        use ReferenceSubtype as R;

        let mut b = Self::builder()
            .register(K::Highlight, None, "stroke", ctor!(Stroke))
            .register(K::Highlight, None, "opacity", ctor!(Opacity))
            .register(K::Encoding, None, "label", ctor!(Label))
            .register(
                K::Reference,
                Some(Subtype::Reference(R::DataLine)),
                "data_line",
                ctor!(DataLine),
            )
            .register(
                K::Reference,
                Some(Subtype::Reference(R::GridLine)),
                "grid_line",
                ctor!(GridLine),
            )
            .register(
                K::Reference,
                Some(Subtype::Reference(R::ExtraArea)),
                "bounding_box",
                ctor!(BoundingBox),
            )
            .register(
                K::Reference,
                Some(Subtype::Reference(R::ExtraLine)),
                "label_line",
                ctor!(LabelLine),
            )
            .register(
                K::Reference,
                Some(Subtype::Reference(R::ExtraRange)),
                "shadow",
                ctor!(Shadow),
            )
            .register(K::Trend, None, "linear_regression", ctor!(LinearRegression))
            .register(
                K::Description,
                Some(Subtype::Description(DescriptionScope::GlobalNote)),
                "out_plot",
                ctor!(OutPlot),
            )
            .register(
                K::Description,
                Some(Subtype::Description(DescriptionScope::LocalNote)),
                "in_plot",
                ctor!(InPlot),
            )
            .register(
                K::Description,
                Some(Subtype::Description(DescriptionScope::LocalNote)),
                "out_plot",
                ctor!(OutPlot),
            );
        for stat in [
            SummaryStat::Max,
            SummaryStat::Min,
            SummaryStat::Median,
            SummaryStat::Mean,
        ] {
            b = b
                .register(
                    K::Summary,
                    Some(Subtype::Summary(stat)),
                    "label_line",
                    ctor!(SummaryLine),
                )
                .register(
                    K::Summary,
                    Some(Subtype::Summary(stat)),
                    "stroke",
                    ctor!(SummaryStroke),
                );
        }
        b.build()
    }

    /// Constructor registered for `name` under `(kind, subtype)`.
    pub fn lookup(
        &self,
        kind: AnnotationKind,
        subtype: Option<Subtype>,
        name: &str,
    ) -> ChartmarkResult<TechniqueCtor> {
        let slot = Slot { kind, subtype };
        let names = self.slots.get(&slot).ok_or_else(|| {
            ChartmarkError::unsupported(format!("no techniques registered for '{slot}'"))
        })?;
        names.get(name).copied().ok_or_else(|| {
            let known: Vec<&str> = names.keys().map(String::as_str).collect();
            ChartmarkError::unsupported(format!(
                "unknown technique '{name}' for '{slot}' (expected one of: {})",
                known.join(", ")
            ))
        })
    }

    /// Build a technique from `record` for an annotation of `(kind, subtype)`.
    pub fn build(
        &self,
        kind: AnnotationKind,
        subtype: Option<Subtype>,
        record: &TechniqueRecord,
        cx: &BuildContext<'_>,
    ) -> ChartmarkResult<Technique> {
        let ctor = self.lookup(kind, subtype, &record.name)?;
        ctor(record, cx)
    }

    /// Whether `name` is registered under `(kind, subtype)`.
    pub fn contains(&self, kind: AnnotationKind, subtype: Option<Subtype>, name: &str) -> bool {
        self.lookup(kind, subtype, name).is_ok()
    }

    /// Slots and their technique names, in a stable order.
    pub fn slots(&self) -> impl Iterator<Item = (Slot, Vec<&str>)> + '_ {
        self.slots
            .iter()
            .map(|(slot, names)| (*slot, names.keys().map(String::as_str).collect()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/technique/registry.rs"]
mod tests;
