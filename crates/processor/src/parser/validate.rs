//! Declarative field constraints, evaluated fail-closed against an enriched event.

use thiserror::Error;
use super::model::{FieldValue, StructuredEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// ASCII letters and digits only.
    Alphanumeric,
    /// ASCII hex digits only.
    Hex,
}

impl Charset {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Charset::Alphanumeric => value.bytes().all(|b| b.is_ascii_alphanumeric()),
            Charset::Hex => value.bytes().all(|b| b.is_ascii_hexdigit()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Charset::Alphanumeric => "alphanumeric",
            Charset::Hex => "hex",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// The field must be present.
    Required,
    /// Numeric value in `[min, max)`.
    Range { min: i64, max: i64 },
    /// Exact length in characters.
    Length(usize),
    Charset(Charset),
}

/// One constraint on one field. Only `Required` fails on an absent value;
/// the others are checked when the field is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationRule {
    pub field: &'static str,
    pub constraint: Constraint,
}

impl ValidationRule {
    pub const fn required(field: &'static str) -> Self {
        Self { field, constraint: Constraint::Required }
    }

    pub const fn range(field: &'static str, min: i64, max: i64) -> Self {
        Self { field, constraint: Constraint::Range { min, max } }
    }

    pub const fn length(field: &'static str, len: usize) -> Self {
        Self { field, constraint: Constraint::Length(len) }
    }

    pub const fn charset(field: &'static str, charset: Charset) -> Self {
        Self { field, constraint: Constraint::Charset(charset) }
    }

    pub fn check(&self, event: &StructuredEvent) -> Result<(), ValidationError> {
        let field = self.field;
        let Some(value) = event.field(field) else {
            return match self.constraint {
                Constraint::Required => Err(ValidationError::Missing { field }),
                _ => Ok(()),
            };
        };

        match self.constraint {
            Constraint::Required => Ok(()),
            Constraint::Range { min, max } => match value {
                FieldValue::Int(v) if v >= min && v < max => Ok(()),
                FieldValue::Int(v) => Err(ValidationError::OutOfRange { field, value: v, min, max }),
                _ => Err(ValidationError::NotNumeric { field }),
            },
            Constraint::Length(expected) => {
                let actual = value.as_text().chars().count();
                if actual == expected {
                    Ok(())
                } else {
                    Err(ValidationError::Length { field, expected, actual })
                }
            }
            Constraint::Charset(charset) => {
                if charset.matches(&value.as_text()) {
                    Ok(())
                } else {
                    Err(ValidationError::Charset { field, charset: charset.as_str() })
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("required field {field} is missing")]
    Missing { field: &'static str },

    #[error("field {field} = {value} outside [{min}, {max})")]
    OutOfRange { field: &'static str, value: i64, min: i64, max: i64 },

    #[error("field {field} is not numeric")]
    NotNumeric { field: &'static str },

    #[error("field {field} has length {actual}, expected {expected}")]
    Length { field: &'static str, expected: usize, actual: usize },

    #[error("field {field} is not {charset}")]
    Charset { field: &'static str, charset: &'static str },
}

/// Check every rule in order and stop at the first violation.
pub fn validate(event: &StructuredEvent, rules: &[ValidationRule]) -> Result<(), ValidationError> {
    rules.iter().try_for_each(|rule| rule.check(event))
}
