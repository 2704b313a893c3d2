use serde_json::{Map, Value};

/// `{op, field, as}` entry of an `aggregate` or `joinaggregate` transform.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldOp {
    /// Aggregate operation (`max`, `mean`, ...).
    pub op: String,
    /// Input field.
    pub field: String,
    /// Output field.
    pub alias: String,
}

/// `{op, as, field?}` entry of a `window` transform.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowOp {
    /// Window or aggregate operation (`row_number`, `rank`, `max`, ...).
    pub op: String,
    /// Output field.
    pub alias: String,
    /// Input field, for aggregate operations.
    pub field: Option<String>,
}

/// Sort direction for window `sort` entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

impl SortOrder {
    fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }
}

/// One step of a layer's `transform` pipeline.
#[derive(Clone, Debug, PartialEq)]
pub enum Transform {
    /// `{filter: predicate}`.
    Filter(Value),
    /// `{calculate: expr, as: alias}`.
    Calculate {
        /// Vega expression.
        expr: String,
        /// Output field.
        alias: String,
    },
    /// `{aggregate: [...]}`.
    Aggregate(Vec<FieldOp>),
    /// `{joinaggregate: [...]}`.
    JoinAggregate(Vec<FieldOp>),
    /// `{window: [...], sort?: [...]}`.
    Window {
        /// Window operations.
        ops: Vec<WindowOp>,
        /// Sort order within the window.
        sort: Vec<(String, SortOrder)>,
    },
    /// `{regression: target, on: field, groupby?: [...]}`.
    Regression {
        /// Dependent field.
        target: String,
        /// Independent field.
        on: String,
        /// Fields that split the fit into separate groups.
        group_by: Vec<String>,
    },
    /// A transform read from external JSON, carried verbatim.
    Raw(Value),
}

impl Transform {
    /// Serialize to a Vega-Lite transform object.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        match self {
            Self::Filter(pred) => {
                obj.insert("filter".to_string(), pred.clone());
            }
            Self::Calculate { expr, alias } => {
                obj.insert("calculate".to_string(), Value::String(expr.clone()));
                obj.insert("as".to_string(), Value::String(alias.clone()));
            }
            Self::Aggregate(ops) => {
                obj.insert("aggregate".to_string(), field_ops(ops));
            }
            Self::JoinAggregate(ops) => {
                obj.insert("joinaggregate".to_string(), field_ops(ops));
            }
            Self::Window { ops, sort } => {
                let window = ops
                    .iter()
                    .map(|w| {
                        let mut o = Map::new();
                        o.insert("op".to_string(), Value::String(w.op.clone()));
                        o.insert("as".to_string(), Value::String(w.alias.clone()));
                        if let Some(field) = &w.field {
                            o.insert("field".to_string(), Value::String(field.clone()));
                        }
                        Value::Object(o)
                    })
                    .collect();
                obj.insert("window".to_string(), Value::Array(window));
                if !sort.is_empty() {
                    let sort = sort
                        .iter()
                        .map(|(field, order)| {
                            let mut o = Map::new();
                            o.insert("field".to_string(), Value::String(field.clone()));
                            o.insert("order".to_string(), Value::String(order.as_str().into()));
                            Value::Object(o)
                        })
                        .collect();
                    obj.insert("sort".to_string(), Value::Array(sort));
                }
            }
            Self::Regression {
                target,
                on,
                group_by,
            } => {
                obj.insert("regression".to_string(), Value::String(target.clone()));
                obj.insert("on".to_string(), Value::String(on.clone()));
                if !group_by.is_empty() {
                    obj.insert(
                        "groupby".to_string(),
                        Value::Array(group_by.iter().cloned().map(Value::String).collect()),
                    );
                }
            }
            Self::Raw(v) => return v.clone(),
        }
        Value::Object(obj)
    }
}

/// `datum['field']` with `\\` and `'` escaped, for use inside Vega expressions.
pub(crate) fn datum_ref(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 9);
    out.push_str("datum['");
    for c in field.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push_str("']");
    out
}

fn field_ops(ops: &[FieldOp]) -> Value {
    Value::Array(
        ops.iter()
            .map(|f| {
                let mut o = Map::new();
                o.insert("op".to_string(), Value::String(f.op.clone()));
                o.insert("field".to_string(), Value::String(f.field.clone()));
                o.insert("as".to_string(), Value::String(f.alias.clone()));
                Value::Object(o)
            })
            .collect(),
    )
}

/// Builder for an ordered transform list.
#[derive(Clone, Debug, Default)]
pub struct TransformPipeline {
    steps: Vec<Transform>,
}

impl TransformPipeline {
    /// Empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a `filter`.
    pub fn filter(mut self, predicate: Value) -> Self {
        self.steps.push(Transform::Filter(predicate));
        self
    }

    /// Append a `filter` when a predicate is given.
    pub fn filter_if(self, predicate: Option<Value>) -> Self {
        match predicate {
            Some(p) => self.filter(p),
            None => self,
        }
    }

    /// Append a `calculate`.
    pub fn calculate(mut self, expr: impl Into<String>, alias: impl Into<String>) -> Self {
        self.steps.push(Transform::Calculate {
            expr: expr.into(),
            alias: alias.into(),
        });
        self
    }

    /// Append a single-op `aggregate`.
    pub fn aggregate(mut self, op: &str, field: &str, alias: &str) -> Self {
        self.steps.push(Transform::Aggregate(vec![FieldOp {
            op: op.to_string(),
            field: field.to_string(),
            alias: alias.to_string(),
        }]));
        self
    }

    /// Append a single-op `joinaggregate`.
    pub fn joinaggregate(mut self, op: &str, field: &str, alias: &str) -> Self {
        self.steps.push(Transform::JoinAggregate(vec![FieldOp {
            op: op.to_string(),
            field: field.to_string(),
            alias: alias.to_string(),
        }]));
        self
    }

    /// Append a `regression` of `target` on `on`.
    pub fn regression(mut self, target: &str, on: &str, group_by: Vec<String>) -> Self {
        self.steps.push(Transform::Regression {
            target: target.to_string(),
            on: on.to_string(),
            group_by,
        });
        self
    }

    /// Append a `window`.
    pub fn window(mut self, ops: Vec<WindowOp>, sort: Vec<(String, SortOrder)>) -> Self {
        self.steps.push(Transform::Window { ops, sort });
        self
    }

    /// Keep only the row whose `row_number` equals `index`.
    pub fn row_number_filter(self, index: usize) -> Self {
        self.window(
            vec![WindowOp {
                op: "row_number".to_string(),
                alias: "index".to_string(),
                field: None,
            }],
            Vec::new(),
        )
        .filter(Value::String(format!("datum.index == {index}")))
    }

    /// Add `max_value` (the max of `field`) and `adjusted_y` (`field` lifted by `max / factor`).
    pub fn max_and_adjusted_value(self, field: &str, factor: &str) -> Self {
        self.window(
            vec![WindowOp {
                op: "max".to_string(),
                alias: "max_value".to_string(),
                field: Some(field.to_string()),
            }],
            Vec::new(),
        )
        .calculate(
            format!("{} + (datum['max_value'] / {factor})", datum_ref(field)),
            "adjusted_y",
        )
    }

    /// Rank rows by `field` into `alias`.
    pub fn rank_window(self, field: &str, order: SortOrder, alias: &str) -> Self {
        self.window(
            vec![WindowOp {
                op: "rank".to_string(),
                alias: alias.to_string(),
                field: None,
            }],
            vec![(field.to_string(), order)],
        )
    }

    /// Finished transform list.
    pub fn build(self) -> Vec<Transform> {
        self.steps
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ir/transform.rs"]
mod tests;
