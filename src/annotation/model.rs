use crate::annotation::data::DataSource;
use crate::annotation::method::{AnnotationKind, Method};
use crate::chart::spec::ChartSpec;
use crate::foundation::error::{ChartmarkError, ChartmarkResult};
use crate::foundation::path::JsonPath;
use crate::ir::field_info::Archetype;
use crate::technique::registry::TechniqueRegistry;
use crate::technique::{BuildContext, Technique, TechniqueRecord};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// One annotation: a method, its data and the techniques that draw it, in order.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    id: String,
    method: Method,
    data: DataSource,
    techniques: Vec<Technique>,
}

impl Annotation {
    /// Build an annotation; `techniques` must be non-empty and fit `method`.
    pub fn new(
        id: impl Into<String>,
        method: Method,
        data: DataSource,
        techniques: Vec<Technique>,
    ) -> ChartmarkResult<Self> {
        let a = Self {
            id: id.into(),
            method,
            data,
            techniques,
        };
        a.validate()?;
        Ok(a)
    }

    /// Parse `{id?, method, data?, techniques}` for a chart of `archetype`.
    pub fn from_json(
        value: &Value,
        registry: &TechniqueRegistry,
        archetype: Archetype,
    ) -> ChartmarkResult<Self> {
        let here = JsonPath::root();
        let obj = value
            .as_object()
            .ok_or_else(|| ChartmarkError::structural("annotation must be an object"))?;
        let id = match obj.get("id") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(_) => {
                return Err(ChartmarkError::structural(format!(
                    "{}: id must be a string",
                    here.field("id")
                )));
            }
        };
        let method_at = here.field("method").to_string();
        let method = obj
            .get("method")
            .ok_or_else(|| ChartmarkError::structural("annotation requires a 'method'"))
            .and_then(Method::from_json)
            .map_err(|e| e.at(&method_at))?;
        let data = match obj.get("data") {
            None | Some(Value::Null) => DataSource::None,
            Some(d) => DataSource::from_json(d).map_err(|e| e.at(&here.field("data").to_string()))?,
        };
        if method.kind() == AnnotationKind::Description && data.text_content().is_none() {
            return Err(ChartmarkError::semantic(
                "description annotations need external data with a text item",
            )
            .at(&here.field("data").to_string()));
        }

        let records = match obj.get("techniques") {
            Some(Value::Array(items)) if !items.is_empty() => items,
            _ => {
                return Err(ChartmarkError::structural(format!(
                    "{}: annotation requires a non-empty 'techniques' array",
                    here.field("techniques")
                )));
            }
        };
        let cx = BuildContext {
            archetype,
            data: &data,
        };
        let techniques = records
            .iter()
            .enumerate()
            .map(|(j, raw)| {
                let at = here.field("techniques").index(j).to_string();
                let record: TechniqueRecord = serde_json::from_value(raw.clone())
                    .map_err(|e| ChartmarkError::structural(format!("{at}: invalid technique: {e}")))?;
                registry
                    .build(method.kind(), method.subtype(), &record, &cx)
                    .map_err(|e| e.at(&at))
            })
            .collect::<ChartmarkResult<Vec<_>>>()?;

        Ok(Self {
            id,
            method,
            data,
            techniques,
        })
    }

    /// Parse an `annotations` array; errors are located as `$.annotations[i]...`.
    pub fn list_from_json(
        value: &Value,
        registry: &TechniqueRegistry,
        archetype: Archetype,
    ) -> ChartmarkResult<Vec<Self>> {
        let list = JsonPath::root().field("annotations");
        let items = value.as_array().ok_or_else(|| {
            ChartmarkError::structural(format!("{list}: annotations must be an array"))
        })?;
        items
            .iter()
            .enumerate()
            .map(|(i, a)| {
                Self::from_json(a, registry, archetype).map_err(|e| e.at(&list.index(i).to_string()))
            })
            .collect()
    }

    /// Check the non-empty and method-fit invariants.
    pub fn validate(&self) -> ChartmarkResult<()> {
        if self.techniques.is_empty() {
            return Err(ChartmarkError::structural(
                "annotation requires at least one technique",
            ));
        }
        if let Some(t) = self.techniques.iter().find(|t| !t.kind().fits(&self.method)) {
            return Err(ChartmarkError::unsupported(format!(
                "technique '{}' does not belong to method '{}'",
                t.name(),
                self.method
            )));
        }
        if self.method.kind() == AnnotationKind::Description && self.data.text_content().is_none() {
            return Err(ChartmarkError::semantic(
                "description annotations need external data with a text item",
            ));
        }
        Ok(())
    }

    /// Annotation id; empty when the document gave none.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Data source.
    pub fn data(&self) -> &DataSource {
        &self.data
    }

    /// Techniques in application order.
    pub fn techniques(&self) -> &[Technique] {
        &self.techniques
    }

    /// Append a technique that fits this annotation's method.
    pub fn add_technique(&mut self, technique: Technique) -> bool {
        if !technique.kind().fits(&self.method) {
            return false;
        }
        self.techniques.push(technique);
        true
    }

    /// Remove the technique at `index`; the last technique cannot be removed.
    pub fn remove_technique(&mut self, index: usize) -> bool {
        if index >= self.techniques.len() || self.techniques.len() == 1 {
            return false;
        }
        self.techniques.remove(index);
        true
    }

    /// Change the method when every technique fits it.
    pub fn set_method(&mut self, method: Method) -> bool {
        let description = method.kind() == AnnotationKind::Description;
        if !self.techniques.iter().all(|t| t.kind().fits(&method))
            || (description && self.data.text_content().is_none())
        {
            return false;
        }
        self.method = method;
        true
    }

    /// Replace the data source. Description techniques take the new text as their note.
    pub fn set_data(&mut self, data: DataSource) -> bool {
        if self.method.kind() == AnnotationKind::Description {
            let Some(text) = data.text_content() else {
                return false;
            };
            for t in &mut self.techniques {
                t.set_note(text);
            }
        }
        self.data = data;
        true
    }

    /// Change the id; an empty id is refused.
    pub fn set_id(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if id.is_empty() {
            return false;
        }
        self.id = id;
        true
    }
}

/// A parsed input document: the chart data plus the annotations to draw on it.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationDocument {
    chart: ChartSpec,
    annotations: Vec<Annotation>,
}

impl AnnotationDocument {
    /// Document over `chart` with no annotations.
    pub fn new(chart: ChartSpec) -> Self {
        Self {
            chart,
            annotations: Vec::new(),
        }
    }

    /// Parse `{chart, annotations?}`. A missing `annotations` key means none.
    pub fn from_value(value: &Value, registry: &TechniqueRegistry) -> ChartmarkResult<Self> {
        let root = JsonPath::root();
        let obj = value
            .as_object()
            .ok_or_else(|| ChartmarkError::structural("document must be a JSON object"))?;
        let chart_at = root.field("chart").to_string();
        let chart = obj
            .get("chart")
            .ok_or_else(|| ChartmarkError::structural("document requires a 'chart'"))
            .and_then(ChartSpec::from_json)
            .map_err(|e| e.at(&chart_at))?;
        let annotations = match obj.get("annotations") {
            None | Some(Value::Null) => Vec::new(),
            Some(list) => Annotation::list_from_json(list, registry, chart.kind)?,
        };
        tracing::debug!(
            chart = %chart.kind,
            annotations = annotations.len(),
            "parsed annotation document"
        );
        Ok(Self { chart, annotations })
    }

    /// Parse a document from JSON text.
    pub fn from_reader<R: Read>(r: R, registry: &TechniqueRegistry) -> ChartmarkResult<Self> {
        let value: Value = serde_json::from_reader(r)
            .map_err(|e| ChartmarkError::serde(format!("parse annotation document JSON: {e}")))?;
        Self::from_value(&value, registry)
    }

    /// Parse a document file.
    pub fn from_path(path: &Path, registry: &TechniqueRegistry) -> ChartmarkResult<Self> {
        let f = File::open(path).map_err(|e| {
            ChartmarkError::Other(anyhow::anyhow!(
                "open annotation document '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_reader(BufReader::new(f), registry)
    }

    /// Chart data.
    pub fn chart(&self) -> &ChartSpec {
        &self.chart
    }

    /// Annotations in document order.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// First annotation with the given id.
    pub fn annotation_by_id(&self, id: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    /// Append an annotation whose techniques were built for this chart kind.
    pub fn add_annotation(&mut self, annotation: Annotation) -> bool {
        if annotation.validate().is_err() || !targets_fit(&annotation, self.chart.kind) {
            return false;
        }
        self.annotations.push(annotation);
        true
    }

    /// Replace the chart when every annotation's targets stay legal for the new kind.
    pub fn set_chart(&mut self, chart: ChartSpec) -> bool {
        if !self.annotations.iter().all(|a| targets_fit(a, chart.kind)) {
            return false;
        }
        self.chart = chart;
        true
    }
}

fn targets_fit(annotation: &Annotation, archetype: Archetype) -> bool {
    annotation
        .techniques
        .iter()
        .all(|t| t.target().validate(archetype).is_ok())
}

#[cfg(test)]
#[path = "../../tests/unit/annotation/model.rs"]
mod tests;
