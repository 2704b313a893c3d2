use crate::foundation::error::{ChartmarkError, ChartmarkResult};
use serde_json::{Map, Value};

/// A `{field, type, ...}` channel binding.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldBinding {
    /// Data field name.
    pub field: String,
    /// Vega-Lite measurement type (`nominal`, `quantitative`, `temporal`, ...).
    pub ty: String,
    /// Remaining properties (`title`, `axis`, `scale`, `stack`, ...), in order.
    pub extra: Map<String, Value>,
}

impl FieldBinding {
    /// Binding with only `field` and `type`.
    pub fn new(field: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ty: ty.into(),
            extra: Map::new(),
        }
    }

    /// Builder-style extra property.
    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    /// Same field and type, dropping every other property.
    pub fn bare(&self) -> Self {
        Self::new(self.field.clone(), self.ty.clone())
    }
}

/// One side of a conditional binding.
#[derive(Clone, Debug, PartialEq)]
pub enum Branch {
    /// Constant value.
    Value(Value),
    /// Field reference.
    Field {
        /// Data field name.
        field: String,
        /// Measurement type.
        ty: String,
    },
}

/// `{condition: {test, <then>}, <otherwise>}`.
#[derive(Clone, Debug, PartialEq)]
pub struct ConditionalBinding {
    /// Vega-Lite predicate or expression string.
    pub test: Value,
    /// Branch used where `test` holds.
    pub then: Branch,
    /// Branch used everywhere else.
    pub otherwise: Branch,
}

/// Value bound to an encoding channel.
#[derive(Clone, Debug, PartialEq)]
pub enum Binding {
    /// Field reference.
    Field(FieldBinding),
    /// `{datum: v}` in data space.
    Datum(Value),
    /// `{value: v}` in visual space.
    Value(Value),
    /// Conditional binding.
    Condition(ConditionalBinding),
    /// Any other shape (tooltip arrays, multi-condition objects), carried verbatim.
    Raw(Value),
}

impl Binding {
    /// Parse a channel definition, falling back to [`Binding::Raw`] for shapes without a typed form.
    pub fn from_json(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::Raw(value.clone());
        };
        if obj.len() == 1 {
            if let Some(v) = obj.get("datum") {
                return Self::Datum(v.clone());
            }
            if let Some(v) = obj.get("value") {
                return Self::Value(v.clone());
            }
        }
        if let Some(cond) = parse_conditional(obj) {
            return Self::Condition(cond);
        }
        if let (Some(Value::String(field)), Some(Value::String(ty))) =
            (obj.get("field"), obj.get("type"))
        {
            let extra = obj
                .iter()
                .filter(|(k, _)| k.as_str() != "field" && k.as_str() != "type")
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            return Self::Field(FieldBinding {
                field: field.clone(),
                ty: ty.clone(),
                extra,
            });
        }
        Self::Raw(value.clone())
    }

    /// Serialize to the Vega-Lite channel definition.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Field(f) => {
                let mut obj = Map::new();
                obj.insert("field".to_string(), Value::String(f.field.clone()));
                obj.insert("type".to_string(), Value::String(f.ty.clone()));
                for (k, v) in &f.extra {
                    obj.insert(k.clone(), v.clone());
                }
                Value::Object(obj)
            }
            Self::Datum(v) => single("datum", v.clone()),
            Self::Value(v) => single("value", v.clone()),
            Self::Condition(c) => {
                let mut cond = Map::new();
                cond.insert("test".to_string(), c.test.clone());
                write_branch(&mut cond, &c.then);
                let mut obj = Map::new();
                obj.insert("condition".to_string(), Value::Object(cond));
                write_branch(&mut obj, &c.otherwise);
                Value::Object(obj)
            }
            Self::Raw(v) => v.clone(),
        }
    }

    /// The field binding, if this is one.
    pub fn as_field(&self) -> Option<&FieldBinding> {
        match self {
            Self::Field(f) => Some(f),
            _ => None,
        }
    }
}

fn single(key: &str, value: Value) -> Value {
    let mut obj = Map::new();
    obj.insert(key.to_string(), value);
    Value::Object(obj)
}

fn write_branch(obj: &mut Map<String, Value>, branch: &Branch) {
    match branch {
        Branch::Value(v) => {
            obj.insert("value".to_string(), v.clone());
        }
        Branch::Field { field, ty } => {
            obj.insert("field".to_string(), Value::String(field.clone()));
            obj.insert("type".to_string(), Value::String(ty.clone()));
        }
    }
}

fn read_branch(obj: &Map<String, Value>, skip: &str) -> Option<Branch> {
    let keys: Vec<&str> = obj
        .keys()
        .map(String::as_str)
        .filter(|k| *k != skip)
        .collect();
    match keys.as_slice() {
        ["value"] => obj.get("value").cloned().map(Branch::Value),
        ["field", "type"] | ["type", "field"] => {
            match (obj.get("field"), obj.get("type")) {
                (Some(Value::String(field)), Some(Value::String(ty))) => Some(Branch::Field {
                    field: field.clone(),
                    ty: ty.clone(),
                }),
                _ => None,
            }
        }
        _ => None,
    }
}

fn parse_conditional(obj: &Map<String, Value>) -> Option<ConditionalBinding> {
    let cond = obj.get("condition")?.as_object()?;
    let test = cond.get("test")?.clone();
    let then = read_branch(cond, "test")?;
    let otherwise = read_branch(obj, "condition")?;
    Some(ConditionalBinding {
        test,
        then,
        otherwise,
    })
}

/// Insertion-ordered map from channel name to [`Binding`].
///
/// Re-binding an existing channel keeps its position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Encoding {
    channels: Vec<(String, Binding)>,
}

impl Encoding {
    /// Empty encoding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `encoding` object.
    pub fn from_json(value: &Value) -> ChartmarkResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| ChartmarkError::structural("layer encoding must be an object"))?;
        Ok(Self {
            channels: obj
                .iter()
                .map(|(k, v)| (k.clone(), Binding::from_json(v)))
                .collect(),
        })
    }

    /// Serialize to an `encoding` object.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.channels
                .iter()
                .map(|(k, b)| (k.clone(), b.to_json()))
                .collect(),
        )
    }

    /// Whether no channel is bound.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Channel names in order.
    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|(k, _)| k.as_str())
    }

    /// Binding for `channel`.
    pub fn get(&self, channel: &str) -> Option<&Binding> {
        self.channels
            .iter()
            .find(|(k, _)| k == channel)
            .map(|(_, b)| b)
    }

    /// Field binding for `channel`, if the channel is bound to a field.
    pub fn field(&self, channel: &str) -> Option<&FieldBinding> {
        self.get(channel).and_then(Binding::as_field)
    }

    /// Bind `channel`, replacing any previous binding in place.
    pub fn set(&mut self, channel: &str, binding: Binding) {
        match self.channels.iter_mut().find(|(k, _)| k == channel) {
            Some((_, slot)) => *slot = binding,
            None => self.channels.push((channel.to_string(), binding)),
        }
    }

    /// Bind `channel` to `{field, type}`.
    pub fn set_field(&mut self, channel: &str, field: impl Into<String>, ty: impl Into<String>) {
        self.set(channel, Binding::Field(FieldBinding::new(field, ty)));
    }

    /// Bind `channel` to `{datum}`.
    pub fn set_datum(&mut self, channel: &str, datum: Value) {
        self.set(channel, Binding::Datum(datum));
    }

    /// Bind `channel` to `{value}`.
    pub fn set_value(&mut self, channel: &str, value: Value) {
        self.set(channel, Binding::Value(value));
    }

    /// `{condition: {test, value: then}, value: otherwise}`.
    pub fn set_value_with_condition(
        &mut self,
        channel: &str,
        test: Value,
        then: Value,
        otherwise: Value,
    ) {
        self.set(
            channel,
            Binding::Condition(ConditionalBinding {
                test,
                then: Branch::Value(then),
                otherwise: Branch::Value(otherwise),
            }),
        );
    }

    /// `{condition: {test, field, type}, value: otherwise}`.
    pub fn set_field_with_condition(
        &mut self,
        channel: &str,
        test: Value,
        field: &FieldBinding,
        otherwise: Value,
    ) {
        self.set(
            channel,
            Binding::Condition(ConditionalBinding {
                test,
                then: Branch::Field {
                    field: field.field.clone(),
                    ty: field.ty.clone(),
                },
                otherwise: Branch::Value(otherwise),
            }),
        );
    }

    /// `{condition: {test, value: then}, field, type}`.
    pub fn set_value_default_field_with_condition(
        &mut self,
        channel: &str,
        test: Value,
        then: Value,
        field: &FieldBinding,
    ) {
        self.set(
            channel,
            Binding::Condition(ConditionalBinding {
                test,
                then: Branch::Value(then),
                otherwise: Branch::Field {
                    field: field.field.clone(),
                    ty: field.ty.clone(),
                },
            }),
        );
    }

    /// Merge `props` into the `axis` object of a field-bound channel.
    pub fn update_axis(&mut self, channel: &str, props: Map<String, Value>) -> ChartmarkResult<()> {
        let Some((_, Binding::Field(f))) = self.channels.iter_mut().find(|(k, _)| k == channel)
        else {
            return Err(ChartmarkError::lowering(format!(
                "channel '{channel}' is not bound to a field; cannot update its axis"
            )));
        };
        let axis = f
            .extra
            .entry("axis".to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !axis.is_object() {
            *axis = Value::Object(Map::new());
        }
        if let Value::Object(axis) = axis {
            for (k, v) in props {
                axis.insert(k, v);
            }
        }
        Ok(())
    }

    /// Copy `channel` from `src`; fails when `src` does not bind it.
    pub fn copy_from(&mut self, src: &Encoding, channel: &str) -> ChartmarkResult<()> {
        let binding = src.get(channel).ok_or_else(|| {
            ChartmarkError::lowering(format!("base layer has no '{channel}' channel"))
        })?;
        self.set(channel, binding.clone());
        Ok(())
    }

    /// Copy `channel` from `src` when bound there.
    pub fn copy_if_present(&mut self, src: &Encoding, channel: &str) {
        if let Some(binding) = src.get(channel) {
            self.set(channel, binding.clone());
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ir/encoding.rs"]
mod tests;
