//! Runtime type validators
//!
//! A [`Validator`] is an immutable description of the shape a decoded value
//! must have. Validators compose: arrays, maps and structs hold nested
//! validators, and every check walks the whole value so that the resulting
//! message lists every violation instead of stopping at the first one.
//!
//! ```
//! use serde_json::json;
//! use typed_config::types::{array, number, string, structure, NumberOptions, StringOptions, StructOptions};
//!
//! let server = structure(
//!     StructOptions::new()
//!         .property("host", string(StringOptions::default()))
//!         .property("port", number(NumberOptions::new().range(1.0, 65535.0)))
//!         .property("tags", array(string(StringOptions::default())).optional()),
//! );
//!
//! assert!(server.fail(&json!({"host": "localhost", "port": 8080})).is_none());
//! assert!(server.fail(&json!({"host": 1, "port": 0})).is_some());
//! ```

mod builders;
mod number;
mod structure;
mod text;

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::parser::{JsonParser, Parser};

pub use builders::{
    any, array, boolean, date, integer, literal, number, object, string, structure, try_structure,
    Choice,
};
pub use number::{format_number, NumberOptions, NumberPattern, MAX_SAFE_INTEGER};
pub use structure::{
    DynamicProperties, DynamicProperty, DynamicResolver, Resolved, StructOptions, StructShape,
};
pub use text::{parse_date, StringOptions, StringPattern};

use number::NumberRule;
use text::StringRule;

/// Transform applied to a freshly decoded value before it is checked
pub type AfterParse = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Second argument of [`Validator::check`]
///
/// `Compute` runs the validation; `Known` reuses the result of an earlier
/// [`Validator::fail`] call on the same value.
#[derive(Debug, Clone, Copy, Default)]
pub enum Precomputed<'a> {
    #[default]
    Compute,
    Known(Option<&'a str>),
}

/// Immutable type descriptor
#[derive(Clone)]
pub struct Validator {
    inner: Arc<Inner>,
}

#[derive(Clone)]
struct Inner {
    name: String,
    optional: bool,
    default: Option<Value>,
    parser: Arc<dyn Parser>,
    after_parse: Option<AfterParse>,
    kind: Kind,
}

#[derive(Clone)]
pub(crate) enum Kind {
    Any,
    Array(Validator),
    Map(Validator),
    Struct(StructShape),
    Literal(Vec<Choice>),
    Boolean,
    String(StringRule),
    Number(NumberRule),
    Date,
}

impl Validator {
    pub(crate) fn new(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                optional: false,
                default: None,
                parser: Arc::new(JsonParser),
                after_parse: None,
                kind,
            }),
        }
    }

    fn rebuild(self, f: impl FnOnce(&mut Inner)) -> Self {
        let mut inner = Arc::try_unwrap(self.inner).unwrap_or_else(|shared| (*shared).clone());
        f(&mut inner);
        Self {
            inner: Arc::new(inner),
        }
    }

    // =========================================================================
    // Modifiers (each returns a new validator)
    // =========================================================================

    /// Accept absence without running the type-specific check
    pub fn optional(self) -> Self {
        self.rebuild(|inner| inner.optional = true)
    }

    /// Value used when nothing explicit is stored
    pub fn with_default(self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.rebuild(|inner| inner.default = Some(value))
    }

    /// Replace the type label used in messages
    pub fn named(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.rebuild(|inner| inner.name = name)
    }

    pub fn with_parser(self, parser: impl Parser + 'static) -> Self {
        self.rebuild(|inner| inner.parser = Arc::new(parser))
    }

    pub fn with_after_parse(self, transform: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        self.rebuild(|inner| inner.after_parse = Some(Arc::new(transform)))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Human readable label, prefixed with `?` when optional
    pub fn type_name(&self) -> String {
        if self.inner.optional {
            format!("?{}", self.inner.name)
        } else {
            self.inner.name.clone()
        }
    }

    pub fn is_optional(&self) -> bool {
        self.inner.optional
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.inner.default.as_ref()
    }

    pub fn parser(&self) -> &dyn Parser {
        self.inner.parser.as_ref()
    }

    /// Struct description, when this validator is struct-shaped
    pub fn as_struct(&self) -> Option<&StructShape> {
        match &self.inner.kind {
            Kind::Struct(shape) => Some(shape),
            _ => None,
        }
    }

    /// Value validator, when this validator is map-shaped
    pub fn value_type(&self) -> Option<&Validator> {
        match &self.inner.kind {
            Kind::Map(value_type) => Some(value_type),
            _ => None,
        }
    }

    /// Element validator, when this validator is array-shaped
    pub fn element_type(&self) -> Option<&Validator> {
        match &self.inner.kind {
            Kind::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Struct- or map-shaped
    pub fn is_object_shaped(&self) -> bool {
        matches!(self.inner.kind, Kind::Struct(_) | Kind::Map(_))
    }

    /// Absent values are rejected and no default fills the gap
    pub(crate) fn requires_presence(&self) -> bool {
        !self.inner.optional && self.inner.default.is_none()
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Describe every violation in `value`, or `None` if it is valid
    pub fn fail(&self, value: &Value) -> Option<String> {
        self.fail_opt(Some(value))
    }

    /// Like [`fail`](Self::fail), with `None` standing for an absent value
    pub fn fail_opt(&self, value: Option<&Value>) -> Option<String> {
        match value {
            None if self.inner.optional => None,
            None => Some(mismatch(&self.type_name(), None)),
            Some(value) => self.fail_present(value),
        }
    }

    pub fn check(&self, value: &Value, precomputed: Precomputed<'_>) -> bool {
        match precomputed {
            Precomputed::Compute => self.fail(value).is_none(),
            Precomputed::Known(message) => message.is_none(),
        }
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        self.check(value, Precomputed::Compute)
    }

    fn fail_present(&self, value: &Value) -> Option<String> {
        let type_name = self.type_name();
        match &self.inner.kind {
            Kind::Any => fail_any(value),
            Kind::Array(element) => fail_array(&type_name, element, value),
            Kind::Map(value_type) => fail_map(&type_name, value_type, value),
            Kind::Struct(shape) => shape.fail(&type_name, value),
            Kind::Literal(choices) => {
                let matched = choices.iter().any(|choice| choice.admits(value));
                (!matched).then(|| mismatch(&type_name, Some(value)))
            }
            Kind::Boolean => (!value.is_boolean()).then(|| mismatch(&type_name, Some(value))),
            Kind::String(rule) => rule.fail(&type_name, value),
            Kind::Number(rule) => rule.fail(&type_name, value),
            Kind::Date => text::fail_date(&type_name, value),
        }
    }

    // =========================================================================
    // Codec
    // =========================================================================

    /// Decode with this validator's parser, transform, then validate
    pub fn parse(&self, text: &str) -> Result<Value> {
        self.parse_with(self.parser(), text)
    }

    pub fn parse_with(&self, parser: &dyn Parser, text: &str) -> Result<Value> {
        let mut value = parser.parse(text).map_err(ConfigError::Decode)?;
        if let Some(transform) = &self.inner.after_parse {
            value = transform(value);
        }
        match self.fail(&value) {
            Some(message) => Err(ConfigError::Invalid(message)),
            None => Ok(value),
        }
    }

    /// Validate, then encode with this validator's parser
    pub fn stringify(&self, value: &Value) -> Result<String> {
        self.stringify_with(self.parser(), value)
    }

    pub fn stringify_with(&self, parser: &dyn Parser, value: &Value) -> Result<String> {
        if let Some(message) = self.fail(value) {
            return Err(ConfigError::Invalid(message));
        }
        parser.stringify(value).map_err(ConfigError::Encode)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("type_name", &self.type_name())
            .field("default", &self.inner.default)
            .finish()
    }
}

// =============================================================================
// Container rules
// =============================================================================

fn any_delegates() -> &'static [Validator] {
    static DELEGATES: OnceLock<Vec<Validator>> = OnceLock::new();
    // Tried in order; the first delegate that accepts the value wins.
    DELEGATES.get_or_init(|| {
        vec![
            array(any()),
            object(any()),
            boolean(),
            string(StringOptions::default()),
            number(NumberOptions::default()),
        ]
    })
}

fn fail_any(value: &Value) -> Option<String> {
    if any_delegates().iter().any(|delegate| delegate.fail(value).is_none()) {
        return None;
    }
    let dump = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    Some(format!("Value cannot be represented as any:\n{dump}"))
}

fn fail_array(type_name: &str, element: &Validator, value: &Value) -> Option<String> {
    let Value::Array(items) = value else {
        return Some(mismatch(type_name, Some(value)));
    };
    let errors: Vec<String> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            element
                .fail(item)
                .map(|message| format!("Element {index}: {}", indent(&message)))
        })
        .collect();
    (!errors.is_empty()).then(|| errors.join("\n\n"))
}

fn fail_map(type_name: &str, value_type: &Validator, value: &Value) -> Option<String> {
    let Value::Object(map) = value else {
        return Some(mismatch(type_name, Some(value)));
    };
    let errors: Vec<String> = map
        .iter()
        .filter_map(|(key, item)| {
            value_type
                .fail(item)
                .map(|message| bad_value(key, &message))
        })
        .collect();
    (!errors.is_empty()).then(|| errors.join("\n\n"))
}

// =============================================================================
// Message helpers
// =============================================================================

/// Compact rendering of a value for messages, `undefined` when absent
pub fn format_value(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => n.to_string(),
        Some(Value::Number(n)) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        Some(value) => value.to_string(),
    }
}

pub(crate) fn mismatch(type_name: &str, value: Option<&Value>) -> String {
    format!("Expected {type_name}, got {}.", format_value(value))
}

pub(crate) fn bad_value(key: &str, message: &str) -> String {
    format!("Bad value for the key '{key}': {}", indent(message))
}

/// Indent continuation lines so nested messages stay readable
pub(crate) fn indent(message: &str) -> String {
    message
        .lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 || line.is_empty() {
                line.to_string()
            } else {
                format!("  {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
