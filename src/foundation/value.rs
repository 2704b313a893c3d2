use crate::foundation::error::{ChartmarkError, ChartmarkResult};
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;

/// Month component of a [`DateValue`], kept in the form it was written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Month {
    /// Numeric month, `1..=12`.
    Number(i64),
    /// English month name or three-letter abbreviation, e.g. `"apr"`.
    Name(String),
}

impl Month {
    /// Month number in `1..=12`.
    pub fn number(&self) -> i64 {
        match self {
            Self::Number(n) => *n,
            // Names are checked at construction.
            Self::Name(name) => month_from_name(name).unwrap_or(0),
        }
    }
}

const MONTH_NAMES: [(&str, &str); 12] = [
    ("jan", "january"),
    ("feb", "february"),
    ("mar", "march"),
    ("apr", "april"),
    ("may", "may"),
    ("jun", "june"),
    ("jul", "july"),
    ("aug", "august"),
    ("sep", "september"),
    ("oct", "october"),
    ("nov", "november"),
    ("dec", "december"),
];

fn month_from_name(name: &str) -> Option<i64> {
    let lower = name.to_ascii_lowercase();
    MONTH_NAMES
        .iter()
        .position(|(short, long)| lower == *short || lower == *long)
        .map(|i| i as i64 + 1)
}

/// Structured calendar date as written in annotation documents: `{year, month, date?}`.
///
/// Serializes back to the same shape, which Vega-Lite accepts as a `DateTime` datum.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateValue {
    /// Calendar year.
    pub year: i64,
    /// Month, numeric or named.
    pub month: Month,
    /// Day of month; comparisons treat a missing day as `1`.
    pub date: Option<i64>,
}

impl DateValue {
    /// Parse a `{year, month, date?}` object.
    pub fn from_json(value: &Value) -> ChartmarkResult<Self> {
        let obj = value.as_object().ok_or_else(|| {
            ChartmarkError::structural(format!(
                "date value must be an object {{year, month, date?}}, got {value}"
            ))
        })?;
        let year = obj.get("year").and_then(Value::as_i64).ok_or_else(|| {
            ChartmarkError::structural("date value requires an integer 'year'")
        })?;
        let month = match obj.get("month") {
            Some(Value::String(name)) => {
                if month_from_name(name).is_none() {
                    return Err(ChartmarkError::semantic(format!(
                        "unknown month name '{name}'"
                    )));
                }
                Month::Name(name.clone())
            }
            Some(v) => match v.as_i64() {
                Some(n) if (1..=12).contains(&n) => Month::Number(n),
                Some(n) => {
                    return Err(ChartmarkError::semantic(format!(
                        "month must be in 1..=12, got {n}"
                    )));
                }
                None => {
                    return Err(ChartmarkError::structural(
                        "date 'month' must be an integer or a month name",
                    ));
                }
            },
            None => return Err(ChartmarkError::structural("date value requires 'month'")),
        };
        let date = match obj.get("date") {
            None => None,
            Some(v) => match v.as_i64() {
                Some(d) if (1..=31).contains(&d) => Some(d),
                Some(d) => {
                    return Err(ChartmarkError::semantic(format!(
                        "day of month must be in 1..=31, got {d}"
                    )));
                }
                None => return Err(ChartmarkError::structural("date 'date' must be an integer")),
            },
        };
        Ok(Self { year, month, date })
    }

    /// Serialize to `{year, month, date?}`.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("year".to_string(), Value::from(self.year));
        obj.insert(
            "month".to_string(),
            match &self.month {
                Month::Number(n) => Value::from(*n),
                Month::Name(s) => Value::String(s.clone()),
            },
        );
        if let Some(d) = self.date {
            obj.insert("date".to_string(), Value::from(d));
        }
        Value::Object(obj)
    }

    /// `YYYY-MM-DD`, with the day defaulting to `01`.
    pub fn to_iso_string(&self) -> String {
        format!(
            "{:04}-{:02}-{:02}",
            self.year,
            self.month.number(),
            self.date.unwrap_or(1)
        )
    }

    fn sort_key(&self) -> (i64, i64, i64) {
        (self.year, self.month.number(), self.date.unwrap_or(1))
    }
}

impl PartialOrd for DateValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DateValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// Coordinate value that is either a plain number or a structured date.
#[derive(Clone, Debug, PartialEq)]
pub enum Comparable {
    /// Numeric value; the original JSON number is kept so integers stay integers.
    Number(Number),
    /// Structured date.
    Date(DateValue),
}

impl Comparable {
    /// Parse a number or a `{year, month, date?}` object.
    pub fn from_json(value: &Value) -> ChartmarkResult<Self> {
        match value {
            Value::Number(n) => Ok(Self::Number(n.clone())),
            Value::Object(_) => DateValue::from_json(value).map(Self::Date),
            other => Err(ChartmarkError::semantic(format!(
                "coordinate must be a number or a date object, got {other}"
            ))),
        }
    }

    /// Datum representation for Vega-Lite encodings.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Number(n) => Value::Number(n.clone()),
            Self::Date(d) => d.to_json(),
        }
    }

    /// Human-readable label: the number as written, or the date as `YYYY-MM-DD`.
    pub fn label(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Date(d) => d.to_iso_string(),
        }
    }

    /// Compare two values of the same kind.
    ///
    /// Mixing a number with a date is a semantic error.
    pub fn try_cmp(&self, other: &Self) -> ChartmarkResult<Ordering> {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => {
                let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
                a.partial_cmp(&b)
                    .ok_or_else(|| ChartmarkError::semantic("coordinate values are not comparable"))
            }
            (Self::Date(a), Self::Date(b)) => Ok(a.cmp(b)),
            _ => Err(ChartmarkError::semantic(
                "cannot compare a number with a date; both bounds must have the same kind",
            )),
        }
    }
}

/// JSON number for a computed quantity: integral values are written without a fraction.
pub fn number_value(x: f64) -> Value {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 9.0e15 {
        Value::from(x as i64)
    } else {
        Number::from_f64(x).map(Value::Number).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/value.rs"]
mod tests;
