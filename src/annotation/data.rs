use crate::foundation::error::{ChartmarkError, ChartmarkResult};
use serde::Deserialize;
use serde_json::Value;

/// One item of an external payload.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExternalItem {
    /// Free text.
    Text {
        /// The text.
        content: String,
    },
    /// Image reference.
    Image {
        /// Image URL.
        url: String,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(ExternalItem),
    Many(Vec<ExternalItem>),
}

/// Where an annotation's content comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum DataSource {
    /// User-supplied payload.
    External(Vec<ExternalItem>),
    /// Derived from the chart data.
    Derived,
    /// Internal to the chart.
    Internal,
    /// No data.
    None,
}

impl DataSource {
    /// Parse `{source, value?}`.
    pub fn from_json(value: &Value) -> ChartmarkResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| ChartmarkError::structural("data must be an object"))?;
        let source = obj
            .get("source")
            .and_then(Value::as_str)
            .ok_or_else(|| ChartmarkError::structural("data requires a 'source' string"))?;
        let payload = obj.get("value").filter(|v| !v.is_null());
        let simple = |kind: DataSource| match payload {
            Some(_) => Err(ChartmarkError::semantic(format!(
                "'{source}' data must not carry a value; only external data has a payload"
            ))),
            None => Ok(kind),
        };
        match source {
            "external" => {
                let payload = payload.ok_or_else(|| {
                    ChartmarkError::structural("external data requires a 'value'")
                })?;
                let items = match serde_json::from_value::<OneOrMany>(payload.clone()) {
                    Ok(OneOrMany::One(item)) => vec![item],
                    Ok(OneOrMany::Many(items)) => items,
                    Err(_) => {
                        return Err(ChartmarkError::semantic(
                            "external value items must be {type: text, content} or {type: image, url}",
                        ));
                    }
                };
                if items.is_empty() {
                    return Err(ChartmarkError::semantic(
                        "external value must contain at least one item",
                    ));
                }
                Ok(Self::External(items))
            }
            "derived" => simple(Self::Derived),
            "internal" => simple(Self::Internal),
            "none" => simple(Self::None),
            other => Err(ChartmarkError::structural(format!(
                "unknown data source '{other}'"
            ))),
        }
    }

    /// Content of the last text item of an external payload.
    pub fn text_content(&self) -> Option<&str> {
        match self {
            Self::External(items) => items.iter().rev().find_map(|item| match item {
                ExternalItem::Text { content } => Some(content.as_str()),
                ExternalItem::Image { .. } => None,
            }),
            _ => None,
        }
    }

    /// Source name as written in documents.
    pub fn source_name(&self) -> &'static str {
        match self {
            Self::External(_) => "external",
            Self::Derived => "derived",
            Self::Internal => "internal",
            Self::None => "none",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/annotation/data.rs"]
mod tests;
