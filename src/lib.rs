//! ChartMark compiles declarative chart annotations into layered Vega-Lite v5 specifications.
//!
//! An [`AnnotationDocument`] pairs raw chart data ([`ChartSpec`]) with annotations: highlights,
//! labels, reference lines, summaries, trends and notes. The [`Compiler`] renders the base chart,
//! then folds every annotation's techniques over it in document order:
//!
//! - Parse a document with [`AnnotationDocument::from_path`] or [`Compiler::parse`]
//! - Compile it with [`Compiler::compile`] into a [`CompileOutput`]
//! - Serialize the resulting [`ChartIr`] with [`ChartIr::to_json`] or [`write_chart`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod annotation;
pub(crate) mod chart;
pub(crate) mod compile;
pub(crate) mod ir;
pub(crate) mod technique;

pub use crate::foundation::error::{ChartmarkError, ChartmarkResult};
pub use crate::foundation::value::{Comparable, DateValue, Month};

pub use crate::annotation::data::{DataSource, ExternalItem};
pub use crate::annotation::filter::{AxisType, Bounds, FilterCondition, FilterNode, Predicate};
pub use crate::annotation::marker::{
    LineMark, Marker, OpacityMark, RectMark, StrokeMark, TextMark,
};
pub use crate::annotation::method::{
    AnnotationKind, DescriptionScope, Method, ReferenceSubtype, Subtype, SummaryStat,
};
pub use crate::annotation::model::{Annotation, AnnotationDocument};
pub use crate::annotation::target::{
    AxisConfig, CartesianPoint, ChartElement, Coordinate, PolarPoint, Target,
};
pub use crate::chart::spec::ChartSpec;
pub use crate::chart::template::render_base_chart;
pub use crate::compile::io::{
    BatchEntry, BatchFailure, BatchReport, batch_compile, compile_path, render_chart_path,
    write_chart,
};
pub use crate::compile::pipeline::{CompileOptions, CompileOutput, Compiler, SkippedTechnique};
pub use crate::ir::chart::{ChartIr, VEGA_LITE_SCHEMA};
pub use crate::ir::encoding::{Binding, Branch, ConditionalBinding, Encoding, FieldBinding};
pub use crate::ir::field_info::{Archetype, FieldInfo};
pub use crate::ir::layer::{Layer, Mark};
pub use crate::ir::transform::{FieldOp, SortOrder, Transform, TransformPipeline, WindowOp};
pub use crate::technique::registry::{RegistryBuilder, Slot, TechniqueCtor, TechniqueRegistry};
pub use crate::technique::text_layout::{TextBlock, TextLayout};
pub use crate::technique::{BuildContext, Technique, TechniqueKind, TechniqueRecord};
