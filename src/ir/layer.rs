use crate::foundation::error::{ChartmarkError, ChartmarkResult};
use crate::ir::encoding::Encoding;
use crate::ir::transform::Transform;
use serde_json::{Map, Value};

/// Mark descriptor; always serialized as an object with `type` first.
#[derive(Clone, Debug, PartialEq)]
pub struct Mark {
    /// Mark type (`bar`, `line`, `rule`, `text`, `rect`, `arc`, `point`, ...).
    pub kind: String,
    /// Mark properties, in order.
    pub props: Map<String, Value>,
}

impl Mark {
    /// Mark of the given type with no properties.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            props: Map::new(),
        }
    }

    /// Builder-style property.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.props.insert(key.to_string(), value.into());
        self
    }

    /// Accepts `"bar"` or `{type: "bar", ...}`.
    pub fn from_json(value: &Value) -> ChartmarkResult<Self> {
        match value {
            Value::String(kind) => Ok(Self::new(kind.clone())),
            Value::Object(obj) => {
                let kind = obj
                    .get("type")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ChartmarkError::structural("mark object requires a 'type'"))?;
                let props = obj
                    .iter()
                    .filter(|(k, _)| k.as_str() != "type")
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                Ok(Self {
                    kind: kind.to_string(),
                    props,
                })
            }
            _ => Err(ChartmarkError::structural(
                "mark must be a string or an object",
            )),
        }
    }

    /// Serialize to `{type, ...props}`.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("type".to_string(), Value::String(self.kind.clone()));
        for (k, v) in &self.props {
            obj.insert(k.clone(), v.clone());
        }
        Value::Object(obj)
    }
}

/// One layer of a layered chart.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    /// Mark descriptor.
    pub mark: Mark,
    /// Channel bindings.
    pub encoding: Encoding,
    /// Transform pipeline, applied before encoding.
    pub transform: Vec<Transform>,
    /// Layer-local data, overriding the chart's data.
    pub data: Option<Value>,
    /// Other layer properties carried verbatim.
    pub extra: Map<String, Value>,
}

impl Layer {
    /// Layer with a mark and an empty encoding.
    pub fn new(mark: Mark) -> Self {
        Self {
            mark,
            encoding: Encoding::new(),
            transform: Vec::new(),
            data: None,
            extra: Map::new(),
        }
    }

    /// Builder-style encoding.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Builder-style transform list.
    pub fn with_transform(mut self, transform: Vec<Transform>) -> Self {
        self.transform = transform;
        self
    }

    /// Builder-style layer data.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Parse a layer object. Transforms are kept verbatim.
    pub fn from_json(value: &Value) -> ChartmarkResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| ChartmarkError::structural("layer must be an object"))?;
        let mark = Mark::from_json(
            obj.get("mark")
                .ok_or_else(|| ChartmarkError::structural("layer requires a 'mark'"))?,
        )?;
        let encoding = match obj.get("encoding") {
            Some(enc) => Encoding::from_json(enc)?,
            None => Encoding::new(),
        };
        let transform = match obj.get("transform") {
            None => Vec::new(),
            Some(Value::Array(items)) => items.iter().cloned().map(Transform::Raw).collect(),
            Some(_) => {
                return Err(ChartmarkError::structural("layer transform must be an array"));
            }
        };
        let extra = obj
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), "mark" | "encoding" | "transform" | "data"))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(Self {
            mark,
            encoding,
            transform,
            data: obj.get("data").cloned(),
            extra,
        })
    }

    /// Serialize to `{mark, encoding, transform?, data?, ...}`.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("mark".to_string(), self.mark.to_json());
        obj.insert("encoding".to_string(), self.encoding.to_json());
        if !self.transform.is_empty() {
            obj.insert(
                "transform".to_string(),
                Value::Array(self.transform.iter().map(Transform::to_json).collect()),
            );
        }
        if let Some(data) = &self.data {
            obj.insert("data".to_string(), data.clone());
        }
        for (k, v) in &self.extra {
            obj.insert(k.clone(), v.clone());
        }
        Value::Object(obj)
    }
}
