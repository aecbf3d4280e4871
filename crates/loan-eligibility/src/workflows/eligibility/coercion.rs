use super::domain::AnswerValue;
use super::fields::{FieldKind, ProfileField};
use serde::{Deserialize, Serialize};

/// Raised when a free-text answer cannot be read as the field's type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoercionError {
    #[error("'{raw}' is not a valid number for {field}")]
    NotANumber { field: &'static str, raw: String },
}

/// What to do with an answer that fails coercion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoercionPolicy {
    /// Store the field's zero value and keep going.
    #[default]
    DefaultOnError,
    /// Leave the field unanswered and ask the same question again.
    Reprompt,
}

impl CoercionPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "default_on_error" | "default-on-error" | "default" | "lenient" => {
                Some(Self::DefaultOnError)
            }
            "reprompt" | "strict" => Some(Self::Reprompt),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CoercionPolicy::DefaultOnError => "default_on_error",
            CoercionPolicy::Reprompt => "reprompt",
        }
    }

    /// Coerce `raw` for `field`, applying this policy to failures.
    pub fn apply(self, field: ProfileField, raw: &str) -> Result<AnswerValue, CoercionError> {
        match coerce_answer(field, raw) {
            Ok(value) => Ok(value),
            Err(err) => match self {
                CoercionPolicy::DefaultOnError => {
                    tracing::debug!(field = field.name(), error = %err, "answer defaulted");
                    Ok(default_value(field.kind()))
                }
                CoercionPolicy::Reprompt => Err(err),
            },
        }
    }
}

/// Strict coercion of a free-text answer. Flags never fail: anything other
/// than yes/true/1 reads as `false`.
pub fn coerce_answer(field: ProfileField, raw: &str) -> Result<AnswerValue, CoercionError> {
    match field.kind() {
        FieldKind::Flag => Ok(AnswerValue::Flag(parse_flag(raw))),
        FieldKind::Numeric => parse_number(raw)
            .map(numeric_value)
            .ok_or_else(|| CoercionError::NotANumber {
                field: field.name(),
                raw: raw.to_string(),
            }),
        FieldKind::Text => Ok(AnswerValue::Text(raw.to_string())),
    }
}

pub(crate) fn default_value(kind: FieldKind) -> AnswerValue {
    match kind {
        FieldKind::Flag => AnswerValue::Flag(false),
        FieldKind::Numeric => AnswerValue::Integer(0),
        FieldKind::Text => AnswerValue::Text(String::new()),
    }
}

pub(crate) fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "yes" | "true" | "1"
    )
}

/// Finite decimal parse; `inf`/`nan` spellings are rejected.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Whole numbers collapse to `Integer` so "3.0" and "3" store identically.
pub(crate) fn numeric_value(value: f64) -> AnswerValue {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        AnswerValue::Integer(value as i64)
    } else {
        AnswerValue::Number(value)
    }
}
