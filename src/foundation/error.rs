/// Convenience result type used across ChartMark.
pub type ChartmarkResult<T> = Result<T, ChartmarkError>;

/// Top-level error taxonomy used by parser and compiler APIs.
#[derive(thiserror::Error, Debug)]
pub enum ChartmarkError {
    /// A required field is missing or has the wrong shape.
    #[error("structural error: {0}")]
    Structural(String),

    /// A value is well-formed but violates a domain rule.
    #[error("semantic error: {0}")]
    Semantic(String),

    /// Unknown annotation kind, subtype, technique name, or chart archetype.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// A technique could not be applied to the current chart IR.
    #[error("lowering error: {0}")]
    Lowering(String),

    /// Errors when serializing or deserializing JSON documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChartmarkError {
    /// Build a [`ChartmarkError::Structural`] value.
    pub fn structural(msg: impl Into<String>) -> Self {
        Self::Structural(msg.into())
    }

    /// Build a [`ChartmarkError::Semantic`] value.
    pub fn semantic(msg: impl Into<String>) -> Self {
        Self::Semantic(msg.into())
    }

    /// Build a [`ChartmarkError::UnsupportedType`] value.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedType(msg.into())
    }

    /// Build a [`ChartmarkError::Lowering`] value.
    pub fn lowering(msg: impl Into<String>) -> Self {
        Self::Lowering(msg.into())
    }

    /// Build a [`ChartmarkError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Prefix the message with a JSON location, keeping the error category.
    ///
    /// A message that already starts with a `$` path is nested under `location`, so
    /// `$.target: ...` located at `$.annotations[0]` reads `$.annotations[0].target: ...`.
    /// [`ChartmarkError::Other`] is returned unchanged.
    pub fn at(self, location: &str) -> Self {
        match self {
            Self::Structural(m) => Self::Structural(nest(location, &m)),
            Self::Semantic(m) => Self::Semantic(nest(location, &m)),
            Self::UnsupportedType(m) => Self::UnsupportedType(nest(location, &m)),
            Self::Lowering(m) => Self::Lowering(nest(location, &m)),
            Self::Serde(m) => Self::Serde(nest(location, &m)),
            other @ Self::Other(_) => other,
        }
    }
}

fn nest(location: &str, message: &str) -> String {
    match message.strip_prefix('$') {
        Some(rest) if rest.starts_with('.') || rest.starts_with('[') => format!("{location}{rest}"),
        _ => format!("{location}: {message}"),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
