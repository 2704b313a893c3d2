use crate::annotation::model::{Annotation, AnnotationDocument};
use crate::chart::template::render_base_chart;
use crate::foundation::error::{ChartmarkError, ChartmarkResult};
use crate::ir::chart::ChartIr;
use crate::ir::field_info::Archetype;
use crate::technique::registry::TechniqueRegistry;
use serde_json::Value;

/// Knobs for a compile run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Abort on the first technique that fails to lower instead of skipping it.
    pub strict: bool,
}

/// A technique that failed to lower and was left out of the output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedTechnique {
    /// Id of the owning annotation (may be empty).
    pub annotation_id: String,
    /// Position of the owning annotation in the document.
    pub annotation_index: usize,
    /// Technique name.
    pub technique: String,
    /// Rendered error.
    pub error: String,
}

/// Result of a compile: the final chart plus what had to be skipped.
#[derive(Clone, Debug, PartialEq)]
pub struct CompileOutput {
    /// Final chart IR.
    pub chart: ChartIr,
    /// Techniques skipped in non-strict mode, in application order.
    pub skipped: Vec<SkippedTechnique>,
}

/// Folds annotation documents into Vega-Lite charts.
///
/// Holds the immutable technique registry shared by parsing and lowering; one compiler can serve
/// any number of documents, including from several threads.
#[derive(Clone, Debug)]
pub struct Compiler {
    registry: TechniqueRegistry,
    options: CompileOptions,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(TechniqueRegistry::builtin(), CompileOptions::default())
    }
}

impl Compiler {
    /// Compiler over `registry`.
    pub fn new(registry: TechniqueRegistry, options: CompileOptions) -> Self {
        Self { registry, options }
    }

    /// Technique registry used for parsing.
    pub fn registry(&self) -> &TechniqueRegistry {
        &self.registry
    }

    /// Compile options.
    pub fn options(&self) -> CompileOptions {
        self.options
    }

    /// Parse a document against this compiler's registry.
    pub fn parse(&self, value: &Value) -> ChartmarkResult<AnnotationDocument> {
        AnnotationDocument::from_value(value, &self.registry)
    }

    /// Parse and compile a JSON document.
    pub fn compile_value(&self, value: &Value) -> ChartmarkResult<CompileOutput> {
        let doc = self.parse(value)?;
        self.compile(&doc)
    }

    /// Render the document's base chart, then apply every annotation in order.
    #[tracing::instrument(skip_all, fields(chart = %doc.chart().kind, annotations = doc.annotations().len()))]
    pub fn compile(&self, doc: &AnnotationDocument) -> ChartmarkResult<CompileOutput> {
        let base = render_base_chart(doc.chart())?;
        self.compile_onto(base, doc.annotations())
    }

    /// Apply `annotations` to an existing chart, classifying it from its base layer.
    #[tracing::instrument(skip_all, fields(annotations = annotations.len()))]
    pub fn compile_onto(
        &self,
        chart: ChartIr,
        annotations: &[Annotation],
    ) -> ChartmarkResult<CompileOutput> {
        let archetype = chart.field_info()?.archetype();
        let mut out = CompileOutput {
            chart,
            skipped: Vec::new(),
        };
        for (index, annotation) in annotations.iter().enumerate() {
            out = self.apply_annotation(out, index, annotation, archetype)?;
        }
        tracing::debug!(
            layers = out.chart.layers.len(),
            skipped = out.skipped.len(),
            "compiled chart"
        );
        Ok(out)
    }

    fn apply_annotation(
        &self,
        mut out: CompileOutput,
        index: usize,
        annotation: &Annotation,
        archetype: Archetype,
    ) -> ChartmarkResult<CompileOutput> {
        let subtype = annotation.method().subtype();
        for technique in annotation.techniques() {
            match technique.lower(out.chart.clone(), archetype, subtype) {
                Ok(next) => {
                    tracing::debug!(
                        annotation = index,
                        method = %annotation.method(),
                        technique = technique.name(),
                        layers = next.layers.len(),
                        "applied technique"
                    );
                    out.chart = next;
                }
                Err(e) if self.options.strict => {
                    return Err(ChartmarkError::lowering(format!(
                        "annotation {index} ('{}') technique '{}': {e}",
                        annotation.id(),
                        technique.name()
                    )));
                }
                Err(e) => {
                    tracing::warn!(
                        annotation = index,
                        id = annotation.id(),
                        technique = technique.name(),
                        error = %e,
                        "skipping technique"
                    );
                    out.skipped.push(SkippedTechnique {
                        annotation_id: annotation.id().to_string(),
                        annotation_index: index,
                        technique: technique.name().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/pipeline.rs"]
mod tests;
