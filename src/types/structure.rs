//! Fixed-shape records with optional catch-all keys
//!
//! A struct lists its known properties, each with its own validator. Keys
//! outside that list are governed by the dynamic properties: either one
//! static [`DynamicProperty`] or a resolver evaluated per key. A dynamic
//! property may also override the fixed rule for a key that has one.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::{bad_value, mismatch, Validator};

/// Rule for a key not covered by the fixed property list
#[derive(Debug, Clone, Default)]
pub struct DynamicProperty {
    pub validator: Option<Validator>,
    /// Prefer `validator` over the fixed property with the same key
    pub overrides: bool,
    /// Appended to the "Unexpected key" message
    pub info: Option<String>,
}

impl DynamicProperty {
    pub fn new(validator: Validator) -> Self {
        Self {
            validator: Some(validator),
            overrides: false,
            info: None,
        }
    }

    /// Reject the key, explaining why
    pub fn reject(info: impl Into<String>) -> Self {
        Self {
            validator: None,
            overrides: false,
            info: Some(info.into()),
        }
    }

    pub fn overriding(mut self) -> Self {
        self.overrides = true;
        self
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }
}

/// Per-key resolver: receives the whole object, the key and the fixed
/// validator registered for it (if any)
pub type DynamicResolver =
    Arc<dyn Fn(&Map<String, Value>, (&str, Option<&Validator>)) -> Option<DynamicProperty> + Send + Sync>;

#[derive(Clone)]
pub enum DynamicProperties {
    Static(DynamicProperty),
    Computed(DynamicResolver),
}

impl DynamicProperties {
    fn describe(
        &self,
        object: &Map<String, Value>,
        key: &str,
        fixed: Option<&Validator>,
    ) -> Option<DynamicProperty> {
        match self {
            Self::Static(property) => Some(property.clone()),
            Self::Computed(resolver) => resolver(object, (key, fixed)),
        }
    }
}

/// Options for [`structure`](super::structure)
#[derive(Clone, Default)]
pub struct StructOptions {
    properties: Vec<(String, Validator)>,
    dynamic: Option<DynamicProperties>,
}

impl StructOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fixed property; a repeated key replaces the earlier entry
    pub fn property(mut self, key: impl Into<String>, validator: Validator) -> Self {
        let key = key.into();
        match self.properties.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = validator,
            None => self.properties.push((key, validator)),
        }
        self
    }

    pub fn dynamic(mut self, property: DynamicProperty) -> Self {
        self.dynamic = Some(DynamicProperties::Static(property));
        self
    }

    pub fn dynamic_with(
        mut self,
        resolver: impl Fn(&Map<String, Value>, (&str, Option<&Validator>)) -> Option<DynamicProperty>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.dynamic = Some(DynamicProperties::Computed(Arc::new(resolver)));
        self
    }
}

/// Outcome of looking up the validator for one key
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    pub validator: Option<Validator>,
    pub info: Option<String>,
}

/// Struct description held by a struct-shaped [`Validator`]
#[derive(Clone)]
pub struct StructShape {
    properties: Vec<(String, Validator)>,
    dynamic: Option<DynamicProperties>,
}

impl From<StructOptions> for StructShape {
    fn from(options: StructOptions) -> Self {
        Self {
            properties: options.properties,
            dynamic: options.dynamic,
        }
    }
}

impl StructShape {
    /// Fixed properties in declaration order
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Validator)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn property(&self, key: &str) -> Option<&Validator> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Validator governing `key` inside `object`
    pub fn resolve(&self, object: &Map<String, Value>, key: &str) -> Resolved {
        let fixed = self.property(key);
        let dynamic = self
            .dynamic
            .as_ref()
            .and_then(|d| d.describe(object, key, fixed));

        match dynamic {
            Some(DynamicProperty {
                validator: Some(validator),
                overrides: true,
                info,
            }) => Resolved {
                validator: Some(validator),
                info,
            },
            Some(DynamicProperty {
                validator, info, ..
            }) => Resolved {
                validator: fixed.cloned().or(validator),
                info,
            },
            None => Resolved {
                validator: fixed.cloned(),
                info: None,
            },
        }
    }

    /// Record of every defined property default, or `None` when some
    /// property must be supplied explicitly
    pub(crate) fn composed_default(&self) -> Option<Value> {
        if self.properties.iter().any(|(_, v)| v.requires_presence()) {
            return None;
        }
        let defaults: Map<String, Value> = self
            .properties
            .iter()
            .filter_map(|(k, v)| v.default_value().map(|d| (k.clone(), d.clone())))
            .collect();
        Some(Value::Object(defaults))
    }

    pub(crate) fn fail(&self, type_name: &str, value: &Value) -> Option<String> {
        let Value::Object(object) = value else {
            return Some(mismatch(type_name, Some(value)));
        };

        let mut errors = Vec::new();
        for (key, item) in object {
            let resolved = self.resolve(object, key);
            match resolved.validator {
                None => errors.push(unexpected_key(key, resolved.info.as_deref())),
                Some(validator) => {
                    if let Some(message) = validator.fail(item) {
                        errors.push(bad_value(key, &message));
                    }
                }
            }
        }

        let missing: Vec<String> = self
            .properties
            .iter()
            .filter(|(k, v)| !object.contains_key(k) && v.requires_presence())
            .map(|(k, _)| format!("'{k}'"))
            .collect();
        if !missing.is_empty() {
            errors.push(format!("Missing keys: {}.", missing.join(", ")));
        }

        (!errors.is_empty()).then(|| format!("{type_name}:\n\n{}", errors.join("\n\n")))
    }
}

pub(crate) fn unexpected_key(key: &str, info: Option<&str>) -> String {
    match info {
        Some(info) => format!("Unexpected key '{key}'. {info}"),
        None => format!("Unexpected key '{key}'."),
    }
}

#[cfg(test)]
mod tests {
    use super::super::{number, string, structure, NumberOptions, StringOptions};
    use super::*;
    use serde_json::json;

    fn port() -> Validator {
        number(NumberOptions::new().range(1.0, 65535.0))
    }

    #[test]
    fn test_missing_and_unexpected_keys() {
        let v = structure(StructOptions::new().property("a", number(NumberOptions::new())));
        assert!(v.fail(&json!({"a": 1})).is_none());
        assert_eq!(v.fail(&json!({})).unwrap(), "struct:\n\nMissing keys: 'a'.");
        assert_eq!(
            v.fail(&json!({"a": 1, "b": 2})).unwrap(),
            "struct:\n\nUnexpected key 'b'."
        );
    }

    #[test]
    fn test_every_bad_key_is_reported() {
        let v = structure(
            StructOptions::new()
                .property("host", string(StringOptions::default()))
                .property("port", port())
                .property("name", string(StringOptions::default())),
        );
        let message = v
            .fail(&json!({"host": 1, "port": 0, "extra": true}))
            .unwrap();
        assert!(message.contains("Bad value for the key 'host'"));
        assert!(message.contains("Bad value for the key 'port'"));
        assert!(message.contains("Unexpected key 'extra'."));
        assert!(message.ends_with("Missing keys: 'name'."));
    }

    #[test]
    fn test_optional_and_defaulted_keys_may_be_absent() {
        let v = structure(
            StructOptions::new()
                .property("debug", number(NumberOptions::new()).optional())
                .property("port", port().with_default(8080)),
        );
        assert!(v.fail(&json!({})).is_none());
        assert_eq!(v.default_value(), Some(&json!({"port": 8080})));
    }

    #[test]
    fn test_static_dynamic_property_covers_unknown_keys() {
        let v = structure(
            StructOptions::new()
                .property("name", string(StringOptions::default()))
                .dynamic(DynamicProperty::new(port())),
        );
        assert!(v.fail(&json!({"name": "x", "http": 80})).is_none());
        let message = v.fail(&json!({"name": "x", "http": "80"})).unwrap();
        assert!(message.contains("Bad value for the key 'http'"));
        // The fixed rule still wins for its own key.
        assert!(v.fail(&json!({"name": 5})).is_some());
    }

    #[test]
    fn test_overriding_dynamic_property() {
        let v = structure(
            StructOptions::new()
                .property("level", string(StringOptions::default()))
                .dynamic(DynamicProperty::new(port()).overriding()),
        );
        assert!(v.fail(&json!({"level": 3})).is_none());
        assert!(v.fail(&json!({"level": "high"})).is_some());
    }

    #[test]
    fn test_rejecting_dynamic_property_adds_info() {
        let v = structure(
            StructOptions::new()
                .property("name", string(StringOptions::default()))
                .dynamic(DynamicProperty::reject("Only 'name' is supported.")),
        );
        assert_eq!(
            v.fail(&json!({"name": "x", "nick": "y"})).unwrap(),
            "struct:\n\nUnexpected key 'nick'. Only 'name' is supported."
        );
    }

    #[test]
    fn test_computed_dynamic_property_sees_siblings() {
        let v = structure(
            StructOptions::new()
                .property("kind", string(StringOptions::default()))
                .dynamic_with(|object, (key, fixed)| {
                    if fixed.is_some() {
                        return None;
                    }
                    match object.get("kind").and_then(Value::as_str) {
                        Some("server") if key == "port" => Some(DynamicProperty::new(port())),
                        _ => Some(DynamicProperty::reject(format!("'{key}' needs kind=server."))),
                    }
                }),
        );
        assert!(v.fail(&json!({"kind": "server", "port": 80})).is_none());
        let message = v.fail(&json!({"kind": "client", "port": 80})).unwrap();
        assert!(message.contains("Unexpected key 'port'. 'port' needs kind=server."));
    }

    #[test]
    fn test_resolve_reports_fixed_and_dynamic() {
        let shape: StructShape = StructOptions::new()
            .property("a", port())
            .dynamic(DynamicProperty::new(string(StringOptions::default())))
            .into();
        let object = Map::new();
        assert_eq!(
            shape.resolve(&object, "a").validator.unwrap().type_name(),
            "number"
        );
        assert_eq!(
            shape.resolve(&object, "zzz").validator.unwrap().type_name(),
            "string"
        );
    }
}
