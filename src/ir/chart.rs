use crate::foundation::error::{ChartmarkError, ChartmarkResult};
use crate::ir::layer::Layer;
use serde_json::{Map, Value};

/// Vega-Lite v5 schema URL written into every chart.
pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// Layered chart specification threaded through the technique fold.
///
/// Layer 0 is the base rendering. Techniques may rewrite its encoding but only ever append
/// further layers.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartIr {
    /// `$schema` URL.
    pub schema: String,
    /// Chart title (string or title object).
    pub title: Value,
    /// Optional description.
    pub description: Option<Value>,
    /// Top-level `data` object, normally `{values: [...]}`.
    pub data: Value,
    /// Layers, base first.
    pub layers: Vec<Layer>,
    /// Other top-level properties carried verbatim.
    pub extra: Map<String, Value>,
}

impl ChartIr {
    /// Chart with a single base layer over inline `values`.
    pub fn new(title: impl Into<String>, values: Vec<Value>, base: Layer) -> Self {
        let mut data = Map::new();
        data.insert("values".to_string(), Value::Array(values));
        Self {
            schema: VEGA_LITE_SCHEMA.to_string(),
            title: Value::String(title.into()),
            description: None,
            data: Value::Object(data),
            layers: vec![base],
            extra: Map::new(),
        }
    }

    /// Parse a layered Vega-Lite document.
    pub fn from_json(value: &Value) -> ChartmarkResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| ChartmarkError::structural("chart must be a JSON object"))?;
        let layers = match obj.get("layer") {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, l)| Layer::from_json(l).map_err(|e| e.at(&format!("$.layer[{i}]"))))
                .collect::<ChartmarkResult<Vec<_>>>()?,
            _ => return Err(ChartmarkError::structural("chart requires a 'layer' array")),
        };
        if layers.is_empty() {
            return Err(ChartmarkError::structural("chart requires at least one layer"));
        }
        let extra = obj
            .iter()
            .filter(|(k, _)| {
                !matches!(
                    k.as_str(),
                    "$schema" | "title" | "description" | "data" | "layer"
                )
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(Self {
            schema: obj
                .get("$schema")
                .and_then(Value::as_str)
                .unwrap_or(VEGA_LITE_SCHEMA)
                .to_string(),
            title: obj.get("title").cloned().unwrap_or(Value::String(String::new())),
            description: obj.get("description").cloned(),
            data: obj.get("data").cloned().unwrap_or(Value::Object(Map::new())),
            layers,
            extra,
        })
    }

    /// Serialize to `{$schema, title, description?, data, layer, ...}`.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("$schema".to_string(), Value::String(self.schema.clone()));
        obj.insert("title".to_string(), self.title.clone());
        if let Some(description) = &self.description {
            obj.insert("description".to_string(), description.clone());
        }
        obj.insert("data".to_string(), self.data.clone());
        obj.insert(
            "layer".to_string(),
            Value::Array(self.layers.iter().map(Layer::to_json).collect()),
        );
        for (k, v) in &self.extra {
            obj.insert(k.clone(), v.clone());
        }
        Value::Object(obj)
    }

    /// The base layer.
    pub fn base(&self) -> ChartmarkResult<&Layer> {
        self.layers
            .first()
            .ok_or_else(|| ChartmarkError::lowering("chart has no base layer"))
    }

    /// The base layer, mutably.
    pub fn base_mut(&mut self) -> ChartmarkResult<&mut Layer> {
        self.layers
            .first_mut()
            .ok_or_else(|| ChartmarkError::lowering("chart has no base layer"))
    }

    /// Append a layer.
    pub fn push_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Inline data rows (`data.values`), empty when the chart uses another data source.
    pub fn data_values(&self) -> &[Value] {
        self.data
            .get("values")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Numeric values of `field` across the inline data rows.
    pub fn field_numbers(&self, field: &str) -> Vec<f64> {
        self.data_values()
            .iter()
            .filter_map(|row| row.get(field).and_then(Value::as_f64))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ir/chart.rs"]
mod tests;
