//! Boolean filter expressions over chart axes.
//!
//! A filter is written against abstract axis roles (`category`, `quantity`, `temporal`, ...)
//! rather than field names; [`FilterNode::compile`] resolves the roles against the base
//! layer's [`FieldInfo`] and emits a Vega-Lite predicate.

use crate::foundation::error::{ChartmarkError, ChartmarkResult};
use crate::foundation::value::DateValue;
use crate::ir::field_info::{Archetype, FieldInfo};
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;

/// Axis role a filter condition applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisType {
    /// Nominal x of bar charts, color of pie charts.
    Category,
    /// Color group of grouped charts.
    Group,
    /// Quantitative y of bar/line charts, theta of pie charts.
    Quantity,
    /// Quantitative x of scatter charts.
    XQuantity,
    /// Quantitative y of scatter charts.
    YQuantity,
    /// Temporal x of line charts.
    Temporal,
}

impl AxisType {
    fn parse(s: &str) -> ChartmarkResult<Self> {
        Ok(match s {
            "category" => Self::Category,
            "group" => Self::Group,
            "quantity" => Self::Quantity,
            "x_quantity" => Self::XQuantity,
            "y_quantity" => Self::YQuantity,
            "temporal" => Self::Temporal,
            other => {
                return Err(ChartmarkError::semantic(format!(
                    "invalid axisType '{other}'"
                )));
            }
        })
    }

    /// Name used in documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Group => "group",
            Self::Quantity => "quantity",
            Self::XQuantity => "x_quantity",
            Self::YQuantity => "y_quantity",
            Self::Temporal => "temporal",
        }
    }

    /// Whether conditions on this axis may appear in filters for `archetype`.
    pub fn is_legal_for(self, archetype: Archetype) -> bool {
        match archetype {
            Archetype::Bar | Archetype::Pie => matches!(self, Self::Category | Self::Quantity),
            Archetype::Scatter => matches!(self, Self::XQuantity | Self::YQuantity),
            Archetype::Line => matches!(self, Self::Temporal | Self::Quantity),
            Archetype::GroupBar | Archetype::GroupLine | Archetype::GroupScatter => true,
        }
    }

    fn resolve(self, info: &FieldInfo) -> Option<&str> {
        match (self, info) {
            (Self::Category, FieldInfo::Bar { category, .. })
            | (Self::Category, FieldInfo::Pie { category, .. }) => Some(category.as_str()),
            (Self::Quantity, FieldInfo::Bar { quantity, .. })
            | (Self::Quantity, FieldInfo::Pie { quantity, .. })
            | (Self::Quantity, FieldInfo::Line { quantity, .. }) => Some(quantity.as_str()),
            (Self::Group, info) => info.group(),
            (Self::Temporal, FieldInfo::Line { temporal, .. }) => Some(temporal.as_str()),
            (Self::XQuantity, FieldInfo::Scatter { x_quantity, .. }) => Some(x_quantity.as_str()),
            (Self::YQuantity, FieldInfo::Scatter { y_quantity, .. }) => Some(y_quantity.as_str()),
            _ => None,
        }
    }
}

/// Comparison operators shared by quantity and temporal conditions.
#[derive(Clone, Debug, PartialEq)]
pub struct Bounds<T> {
    /// Inclusive `[lo, hi]`, `lo < hi`.
    pub range: Option<(T, T)>,
    /// Exact match.
    pub equal: Option<T>,
    /// Strictly less than.
    pub lt: Option<T>,
    /// Less than or equal.
    pub lte: Option<T>,
    /// Strictly greater than.
    pub gt: Option<T>,
    /// Greater than or equal.
    pub gte: Option<T>,
}

impl<T> Default for Bounds<T> {
    fn default() -> Self {
        Self {
            range: None,
            equal: None,
            lt: None,
            lte: None,
            gt: None,
            gte: None,
        }
    }
}

impl<T> Bounds<T> {
    fn is_empty(&self) -> bool {
        self.range.is_none()
            && self.equal.is_none()
            && self.lt.is_none()
            && self.lte.is_none()
            && self.gt.is_none()
            && self.gte.is_none()
    }

    fn parse(
        obj: &Map<String, Value>,
        axis: &str,
        item: impl Fn(&Value) -> ChartmarkResult<T>,
    ) -> ChartmarkResult<Self> {
        let one = |key: &str| obj.get(key).map(&item).transpose();
        let range = match obj.get("range") {
            None => None,
            Some(Value::Array(items)) if items.len() == 2 => {
                Some((item(&items[0])?, item(&items[1])?))
            }
            Some(_) => {
                return Err(ChartmarkError::structural(format!(
                    "{axis} range must be a two-element list"
                )));
            }
        };
        Ok(Self {
            range,
            equal: one("equal")?,
            lt: one("lt")?,
            lte: one("lte")?,
            gt: one("gt")?,
            gte: one("gte")?,
        })
    }

    /// Range ordering and operator consistency under `cmp`.
    fn check(&self, axis: &str, cmp: impl Fn(&T, &T) -> Ordering) -> ChartmarkResult<()> {
        if self.is_empty() {
            return Err(ChartmarkError::semantic(format!(
                "{axis} condition needs at least one of range/equal/lt/lte/gt/gte"
            )));
        }
        let fail = |rule: &str| Err(ChartmarkError::semantic(format!("{axis} condition: {rule}")));
        if let Some((lo, hi)) = &self.range
            && cmp(lo, hi) != Ordering::Less
        {
            return fail("range must be ascending [min, max]");
        }
        if let Some(eq) = &self.equal {
            if let Some(lt) = &self.lt
                && cmp(eq, lt) != Ordering::Less
            {
                return fail("equal must be less than lt");
            }
            if let Some(lte) = &self.lte
                && cmp(eq, lte) == Ordering::Greater
            {
                return fail("equal must be less than or equal to lte");
            }
            if let Some(gt) = &self.gt
                && cmp(eq, gt) != Ordering::Greater
            {
                return fail("equal must be greater than gt");
            }
            if let Some(gte) = &self.gte
                && cmp(eq, gte) == Ordering::Less
            {
                return fail("equal must be greater than or equal to gte");
            }
        }
        if let (Some(lt), Some(gt)) = (&self.lt, &self.gt)
            && cmp(lt, gt) != Ordering::Greater
        {
            return fail("lt must be greater than gt");
        }
        if let (Some(lte), Some(gte)) = (&self.lte, &self.gte)
            && cmp(lte, gte) == Ordering::Less
        {
            return fail("lte must be greater than or equal to gte");
        }
        Ok(())
    }

    fn write(&self, obj: &mut Map<String, Value>, to_json: impl Fn(&T) -> Value) {
        if let Some((lo, hi)) = &self.range {
            obj.insert("range".to_string(), Value::Array(vec![to_json(lo), to_json(hi)]));
        }
        for (key, v) in [
            ("equal", &self.equal),
            ("lt", &self.lt),
            ("lte", &self.lte),
            ("gt", &self.gt),
            ("gte", &self.gte),
        ] {
            if let Some(v) = v {
                obj.insert(key.to_string(), to_json(v));
            }
        }
    }
}

fn cmp_numbers(a: &Number, b: &Number) -> Ordering {
    let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Leaf condition of a filter expression.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterCondition {
    /// Category membership.
    Category {
        /// Accepted categories.
        one_of: Vec<String>,
    },
    /// Group membership.
    Group {
        /// Accepted groups.
        one_of: Vec<String>,
    },
    /// Numeric comparison on `quantity`, `x_quantity` or `y_quantity`.
    Quantity {
        /// Which quantitative axis.
        axis: AxisType,
        /// Operators.
        bounds: Bounds<Number>,
    },
    /// Date comparison on the temporal axis.
    Temporal {
        /// Operators.
        bounds: Bounds<DateValue>,
    },
}

impl FilterCondition {
    fn parse(obj: &Map<String, Value>) -> ChartmarkResult<Self> {
        let axis = obj
            .get("axisType")
            .and_then(Value::as_str)
            .ok_or_else(|| ChartmarkError::structural("filter condition requires 'axisType'"))?;
        let axis = AxisType::parse(axis)?;
        Ok(match axis {
            AxisType::Category => Self::Category {
                one_of: parse_one_of(obj, "category")?,
            },
            AxisType::Group => Self::Group {
                one_of: parse_one_of(obj, "group")?,
            },
            AxisType::Quantity | AxisType::XQuantity | AxisType::YQuantity => Self::Quantity {
                axis,
                bounds: Bounds::parse(obj, axis.as_str(), |v| match v {
                    Value::Number(n) => Ok(n.clone()),
                    other => Err(ChartmarkError::structural(format!(
                        "{} bound must be a number, got {other}",
                        axis.as_str()
                    ))),
                })?,
            },
            AxisType::Temporal => Self::Temporal {
                bounds: Bounds::parse(obj, "temporal", DateValue::from_json)?,
            },
        })
    }

    /// Axis role of this condition.
    pub fn axis(&self) -> AxisType {
        match self {
            Self::Category { .. } => AxisType::Category,
            Self::Group { .. } => AxisType::Group,
            Self::Quantity { axis, .. } => *axis,
            Self::Temporal { .. } => AxisType::Temporal,
        }
    }

    fn validate(&self, archetype: Archetype) -> ChartmarkResult<()> {
        let axis = self.axis();
        if !axis.is_legal_for(archetype) {
            return Err(ChartmarkError::semantic(format!(
                "{archetype} charts do not support the '{}' axis type",
                axis.as_str()
            )));
        }
        match self {
            Self::Category { one_of } | Self::Group { one_of } => {
                if one_of.is_empty() {
                    return Err(ChartmarkError::semantic(format!(
                        "{} condition oneOf must not be empty",
                        axis.as_str()
                    )));
                }
                Ok(())
            }
            Self::Quantity { bounds, .. } => bounds.check(axis.as_str(), cmp_numbers),
            Self::Temporal { bounds } => bounds.check("temporal", DateValue::cmp),
        }
    }

    fn compile(&self, info: &FieldInfo) -> ChartmarkResult<Value> {
        let axis = self.axis();
        let field = axis.resolve(info).ok_or_else(|| {
            ChartmarkError::lowering(format!(
                "axis type '{}' does not resolve to a field on a {} chart",
                axis.as_str(),
                info.archetype()
            ))
        })?;
        let mut obj = Map::new();
        obj.insert("field".to_string(), Value::String(field.to_string()));
        match self {
            Self::Category { one_of } | Self::Group { one_of } => {
                obj.insert(
                    "oneOf".to_string(),
                    Value::Array(one_of.iter().cloned().map(Value::String).collect()),
                );
            }
            Self::Quantity { bounds, .. } => bounds.write(&mut obj, |n| Value::Number(n.clone())),
            Self::Temporal { bounds } => bounds.write(&mut obj, DateValue::to_json),
        }
        Ok(Value::Object(obj))
    }
}

fn parse_one_of(obj: &Map<String, Value>, axis: &str) -> ChartmarkResult<Vec<String>> {
    match obj.get("oneOf") {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str().map(str::to_string).ok_or_else(|| {
                    ChartmarkError::structural(format!("{axis} oneOf must contain only strings"))
                })
            })
            .collect(),
        Some(_) => Err(ChartmarkError::structural(format!(
            "{axis} oneOf must be a list of strings"
        ))),
    }
}

/// Recursive boolean filter tree.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterNode {
    /// All operands hold.
    And(Vec<FilterNode>),
    /// Any operand holds.
    Or(Vec<FilterNode>),
    /// The operand does not hold.
    Not(Box<FilterNode>),
    /// Leaf condition.
    Condition(FilterCondition),
}

const LOGIC_KEYS: [&str; 3] = ["and", "or", "not"];

impl FilterNode {
    /// Parse `{and|or|not: operands}` or a bare condition object.
    pub fn parse(value: &Value) -> ChartmarkResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| ChartmarkError::structural("filter must be an object"))?;
        let ops: Vec<&str> = LOGIC_KEYS
            .into_iter()
            .filter(|k| obj.contains_key(*k))
            .collect();
        let op = match ops.as_slice() {
            [] => return FilterCondition::parse(obj).map(Self::Condition),
            [op] => *op,
            _ => {
                return Err(ChartmarkError::structural(
                    "filter may contain only one top-level logical operator",
                ));
            }
        };
        let operands = match &obj[op] {
            Value::Array(items) => items.iter().map(Self::parse).collect::<ChartmarkResult<Vec<_>>>()?,
            single @ Value::Object(_) if op == "not" => vec![Self::parse(single)?],
            _ => {
                return Err(ChartmarkError::structural(format!(
                    "'{op}' operands must be a list"
                )));
            }
        };
        Ok(match op {
            "and" => Self::And(operands),
            "or" => Self::Or(operands),
            _ => {
                let [child]: [FilterNode; 1] = operands.try_into().map_err(|v: Vec<FilterNode>| {
                    ChartmarkError::semantic(format!(
                        "'not' takes exactly one operand, got {}",
                        v.len()
                    ))
                })?;
                Self::Not(Box::new(child))
            }
        })
    }

    /// Parse and validate against `archetype`.
    pub fn parse_for(value: &Value, archetype: Archetype) -> ChartmarkResult<Self> {
        let node = Self::parse(value)?;
        node.validate(archetype)?;
        Ok(node)
    }

    /// Check operand arity, axis legality and per-condition consistency.
    pub fn validate(&self, archetype: Archetype) -> ChartmarkResult<()> {
        match self {
            Self::And(children) | Self::Or(children) => {
                if children.is_empty() {
                    let op = if matches!(self, Self::And(_)) { "and" } else { "or" };
                    return Err(ChartmarkError::semantic(format!(
                        "'{op}' needs at least one operand"
                    )));
                }
                children.iter().try_for_each(|c| c.validate(archetype))
            }
            Self::Not(child) => child.validate(archetype),
            Self::Condition(cond) => cond.validate(archetype),
        }
    }

    /// Compile to a Vega-Lite predicate using the chart's field names.
    pub fn compile(&self, info: &FieldInfo) -> ChartmarkResult<Value> {
        let many = |op: &str, children: &[FilterNode]| -> ChartmarkResult<Value> {
            let compiled = children
                .iter()
                .map(|c| c.compile(info))
                .collect::<ChartmarkResult<Vec<_>>>()?;
            let mut obj = Map::new();
            obj.insert(op.to_string(), Value::Array(compiled));
            Ok(Value::Object(obj))
        };
        match self {
            Self::And(children) => many("and", children),
            Self::Or(children) => many("or", children),
            Self::Not(child) => {
                let mut obj = Map::new();
                obj.insert("not".to_string(), child.compile(info)?);
                Ok(Value::Object(obj))
            }
            Self::Condition(cond) => cond.compile(info),
        }
    }
}

/// Compiled target predicate.
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    /// No restriction.
    Neutral,
    /// A Vega-Lite predicate.
    Test(Value),
}

impl Predicate {
    /// Compile an optional filter.
    pub fn compile(filter: Option<&FilterNode>, info: &FieldInfo) -> ChartmarkResult<Self> {
        match filter {
            None => Ok(Self::Neutral),
            Some(node) => node.compile(info).map(Self::Test),
        }
    }

    /// Value for a conditional `test`; the neutral predicate becomes the expression `"true"`.
    pub fn test(&self) -> Value {
        match self {
            Self::Neutral => Value::String("true".to_string()),
            Self::Test(v) => v.clone(),
        }
    }

    /// Predicate for a `filter` transform, absent when neutral.
    pub fn filter(&self) -> Option<Value> {
        match self {
            Self::Neutral => None,
            Self::Test(v) => Some(v.clone()),
        }
    }

    /// Whether this is the neutral predicate.
    pub fn is_neutral(&self) -> bool {
        matches!(self, Self::Neutral)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/annotation/filter.rs"]
mod tests;
