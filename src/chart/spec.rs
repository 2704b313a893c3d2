use crate::foundation::error::{ChartmarkError, ChartmarkResult};
use crate::foundation::value::number_value;
use crate::ir::field_info::Archetype;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};

const EPOCH_DATE: &str = "1970-01-01";

#[derive(Deserialize)]
struct ChartDef {
    #[serde(default)]
    title: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    x_name: String,
    #[serde(default)]
    y_name: String,
    #[serde(default)]
    classify_name: Option<String>,
    #[serde(default)]
    x_data: Vec<Value>,
    #[serde(default)]
    y_data: Vec<Value>,
    #[serde(default)]
    classify: Vec<Value>,
}

/// Raw chart data: axis names plus the series to plot.
///
/// Grouped kinds take one `y_data` series per `classify` entry and either a shared 1-D `x_data`
/// or one x series per group.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSpec {
    /// Chart title.
    pub title: String,
    /// Chart kind.
    pub kind: Archetype,
    /// Field name of the x values (the category for pie charts).
    pub x_name: String,
    /// Field name of the y values.
    pub y_name: String,
    /// Field name of the group, for grouped kinds.
    pub classify_name: Option<String>,
    /// X values.
    pub x_data: Vec<Value>,
    /// Y values.
    pub y_data: Vec<Value>,
    /// Group labels, for grouped kinds.
    pub classify: Vec<Value>,
}

impl ChartSpec {
    /// Parse `{title, type, x_name, y_name, classify_name?, x_data, y_data, classify?}`.
    pub fn from_json(value: &Value) -> ChartmarkResult<Self> {
        let def: ChartDef = serde_json::from_value(value.clone())
            .map_err(|e| ChartmarkError::structural(format!("invalid chart: {e}")))?;
        let kind: Archetype = def.kind.parse()?;
        if def.x_name.is_empty() || def.y_name.is_empty() {
            return Err(ChartmarkError::structural(
                "chart requires non-empty 'x_name' and 'y_name'",
            ));
        }
        let classify_name = def.classify_name.filter(|s| !s.is_empty());
        if kind.is_grouped() && classify_name.is_none() {
            return Err(ChartmarkError::structural(format!(
                "'{kind}' chart requires a 'classify_name'"
            )));
        }
        Ok(Self {
            title: def.title,
            kind,
            x_name: def.x_name,
            y_name: def.y_name,
            classify_name,
            x_data: def.x_data,
            y_data: def.y_data,
            classify: def.classify,
        })
    }

    /// Normalized data rows, in series order.
    pub fn rows(&self) -> ChartmarkResult<Vec<Value>> {
        let rows = if self.kind.is_grouped() {
            self.grouped_rows()?
        } else {
            self.plain_rows()
        };
        if rows.is_empty() {
            return Err(ChartmarkError::semantic(format!(
                "'{}' chart has no data points",
                self.kind
            )));
        }
        Ok(rows)
    }

    fn plain_rows(&self) -> Vec<Value> {
        let len = self.x_data.len().max(self.y_data.len());
        let xs = normalize_x(self.kind, &self.x_data, len);
        let ys = numbers(&self.y_data, len);
        xs.into_iter()
            .zip(ys)
            .map(|(x, y)| row(&[(self.x_name.as_str(), x), (self.y_name.as_str(), y)]))
            .collect()
    }

    fn grouped_rows(&self) -> ChartmarkResult<Vec<Value>> {
        let Some(group_name) = self.classify_name.as_deref() else {
            return Err(ChartmarkError::structural(format!(
                "'{}' chart requires a 'classify_name'",
                self.kind
            )));
        };
        let per_series_x = self.x_data.first().is_some_and(Value::is_array);
        let shared_x = if per_series_x {
            Vec::new()
        } else {
            normalize_x(self.kind, &self.x_data, self.x_data.len())
        };

        let mut rows = Vec::new();
        for (i, group) in self.classify.iter().enumerate() {
            let xs = if per_series_x {
                let series = series_at(&self.x_data, i);
                normalize_x(self.kind, series, series.len())
            } else {
                shared_x.clone()
            };
            let ys = numbers(series_at(&self.y_data, i), xs.len());
            let group = Value::String(label(group));
            for (x, y) in xs.into_iter().zip(ys) {
                rows.push(row(&[
                    (self.x_name.as_str(), x),
                    (self.y_name.as_str(), y),
                    (group_name, group.clone()),
                ]));
            }
        }
        Ok(rows)
    }
}

fn row(cells: &[(&str, Value)]) -> Value {
    let mut obj = Map::new();
    for (k, v) in cells {
        obj.insert((*k).to_string(), v.clone());
    }
    Value::Object(obj)
}

fn series_at(data: &[Value], i: usize) -> &[Value] {
    data.get(i)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn label(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `len` numbers; non-numbers become `0.0`, missing entries are `0.0`, extras are dropped.
fn numbers(raw: &[Value], len: usize) -> Vec<Value> {
    (0..len)
        .map(|i| number_value(raw.get(i).and_then(Value::as_f64).unwrap_or(0.0)))
        .collect()
}

fn normalize_x(kind: Archetype, raw: &[Value], len: usize) -> Vec<Value> {
    if kind.is_scatter() {
        return numbers(raw, len);
    }
    if kind.is_line() {
        return dates(raw, len).into_iter().map(Value::String).collect();
    }
    (0..len)
        .map(|i| Value::String(raw.get(i).map(label).unwrap_or_default()))
        .collect()
}

/// `YYYY-M-D` or `YYYY/M/D`; anything else is `None`.
pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    let sep = if s.contains('-') { '-' } else { '/' };
    let mut parts = s.trim().split(sep);
    let (Some(y), Some(m), Some(d), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
}

/// Normalize to `YYYY-MM-DD`, leaving unparseable text as written, then pad with successive days.
pub(crate) fn dates(raw: &[Value], len: usize) -> Vec<String> {
    let mut out: Vec<String> = raw
        .iter()
        .take(len)
        .map(|v| {
            let text = label(v);
            parse_date(&text).map_or(text, |d| d.format("%Y-%m-%d").to_string())
        })
        .collect();
    let mut last = out.last().and_then(|s| parse_date(s));
    while out.len() < len {
        let next = last.and_then(|d| d.succ_opt());
        out.push(next.map_or_else(|| EPOCH_DATE.to_string(), |d| d.format("%Y-%m-%d").to_string()));
        last = next;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/chart/spec.rs"]
mod tests;
