//! Validator factories

use serde_json::Value;

use super::number::NumberRule;
use super::structure::StructShape;
use super::text::{normalize_date, StringRule};
use super::{format_value, Kind, NumberOptions, StringOptions, StructOptions, Validator};
use crate::error::{ConfigError, Result};

/// One accepted alternative of a [`literal`]
#[derive(Debug, Clone)]
pub enum Choice {
    /// Accepted when the value is equal to it
    Value(Value),
    /// Accepted when the value validates against it
    Type(Validator),
}

impl Choice {
    fn label(&self) -> String {
        match self {
            Choice::Value(value) => format_value(Some(value)),
            Choice::Type(validator) => validator.type_name(),
        }
    }

    pub(crate) fn admits(&self, value: &Value) -> bool {
        match self {
            Choice::Value(choice) => scalar_eq(choice, value),
            Choice::Type(validator) => validator.fail(value).is_none(),
        }
    }
}

impl From<Value> for Choice {
    fn from(value: Value) -> Self {
        Choice::Value(value)
    }
}

impl From<Validator> for Choice {
    fn from(validator: Validator) -> Self {
        Choice::Type(validator)
    }
}

impl From<&str> for Choice {
    fn from(value: &str) -> Self {
        Choice::Value(Value::from(value))
    }
}

impl From<i64> for Choice {
    fn from(value: i64) -> Self {
        Choice::Value(Value::from(value))
    }
}

impl From<bool> for Choice {
    fn from(value: bool) -> Self {
        Choice::Value(Value::from(value))
    }
}

// Numbers compare by value so that 1 and 1.0 are the same choice.
fn scalar_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Any JSON value except `null`
pub fn any() -> Validator {
    Validator::new("any", Kind::Any)
}

pub fn array(element: Validator) -> Validator {
    Validator::new(format!("array<{}>", element.type_name()), Kind::Array(element))
}

/// Key/value map whose values all satisfy `value_type`
pub fn object(value_type: Validator) -> Validator {
    Validator::new(format!("object<{}>", value_type.type_name()), Kind::Map(value_type))
}

/// Fixed-shape record
///
/// The default is the record of every property default.
///
/// # Panics
///
/// When that composed default does not satisfy the struct, which means one
/// of the property defaults violates its own validator. Use
/// [`try_structure`] to get the error instead.
pub fn structure(options: StructOptions) -> Validator {
    match try_structure(options) {
        Ok(validator) => validator,
        Err(err) => panic!("{err}"),
    }
}

pub fn try_structure(options: StructOptions) -> Result<Validator> {
    let shape = StructShape::from(options);
    let default = shape.composed_default();
    let validator = Validator::new("struct", Kind::Struct(shape));
    let Some(default) = default else {
        return Ok(validator);
    };
    if let Some(reason) = validator.fail(&default) {
        return Err(ConfigError::InvalidDefault {
            type_name: validator.type_name(),
            reason,
        });
    }
    Ok(validator.with_default(default))
}

/// Enumeration of scalar values and/or nested validators
pub fn literal<I, C>(choices: I) -> Validator
where
    I: IntoIterator<Item = C>,
    C: Into<Choice>,
{
    let choices: Vec<Choice> = choices.into_iter().map(Into::into).collect();
    let name = choices
        .iter()
        .map(Choice::label)
        .collect::<Vec<_>>()
        .join("|");
    Validator::new(name, Kind::Literal(choices))
}

pub fn boolean() -> Validator {
    Validator::new("boolean", Kind::Boolean)
}

pub fn string(options: StringOptions) -> Validator {
    Validator::new("string", Kind::String(StringRule::new(options)))
}

pub fn number(options: NumberOptions) -> Validator {
    Validator::new("number", Kind::Number(NumberRule::new(options, false)))
}

pub fn integer(options: NumberOptions) -> Validator {
    Validator::new("integer", Kind::Number(NumberRule::new(options, true)))
}

/// Date stored as a string; decoding canonicalises it to RFC 3339 UTC
pub fn date() -> Validator {
    Validator::new("date", Kind::Date).with_after_parse(normalize_date)
}
