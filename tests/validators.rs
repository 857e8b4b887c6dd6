//! Validator behaviour through the public factories

use regex::Regex;
use rstest::rstest;
use serde_json::{json, Value};

use typed_config::types::{
    any, array, boolean, date, integer, literal, number, object, string, structure, DynamicProperty,
    NumberOptions, NumberPattern, StringOptions, StructOptions,
};
use typed_config::{Precomputed, Validator};

fn plain_string() -> Validator {
    string(StringOptions::default())
}

fn key_mentions(message: &str) -> usize {
    message.matches("key '").count()
}

// =============================================================================
// Leaves
// =============================================================================

#[rstest]
#[case(100.0, true)]
#[case(101.0, false)]
#[case(-1e12, true)]
fn test_number_max(#[case] n: f64, #[case] expected: bool) {
    let v = number(NumberOptions::new().max(100.0));
    assert_eq!(v.check(&json!(n), Precomputed::Compute), expected);
}

#[rstest]
#[case(json!(1), true)]
#[case(json!(1.5), false)]
#[case(json!(-40), true)]
#[case(json!("1"), false)]
fn test_integer(#[case] value: Value, #[case] expected: bool) {
    assert_eq!(integer(NumberOptions::new()).check(&value, Precomputed::Compute), expected);
}

#[test]
fn test_number_message_shows_clamped_bounds() {
    let v = number(NumberOptions::new().max(100.0));
    assert_eq!(
        v.fail(&json!(101)).unwrap(),
        "Expected number between -9007199254740991 and 100, got 101."
    );
}

#[test]
fn test_number_regex_pattern() {
    let v = integer(NumberOptions::new().pattern(NumberPattern::Regex(Regex::new(r"^\d{4}$").unwrap())));
    assert!(v.fail(&json!(8080)).is_none());
    let message = v.fail(&json!(80)).unwrap();
    assert!(message.contains(r"matching /^\d{4}$/"));
    assert!(message.ends_with("got 80."));
}

#[test]
fn test_number_check_pattern_appends_fragment() {
    let even = NumberPattern::check(|n, _| (n % 2.0 != 0.0).then(|| "Must be even.".to_string()));
    let v = number(NumberOptions::new().pattern(even));
    assert!(v.fail(&json!(4)).is_none());
    assert!(v.fail(&json!(3)).unwrap().ends_with("got 3. Must be even."));
}

#[test]
fn test_string_patterns() {
    let v = string(StringOptions::regex(Regex::new("^[a-z]+$").unwrap()));
    assert!(v.fail(&json!("abc")).is_none());
    assert_eq!(
        v.fail(&json!("ABC")).unwrap(),
        "Expected string matching /^[a-z]+$/, got \"ABC\"."
    );

    let v = string(StringOptions::check(|s| s.is_empty().then(|| "Empty.".to_string())));
    assert_eq!(v.fail(&json!("")).unwrap(), "Expected string, got \"\". Empty.");
}

#[rstest]
#[case(json!(true), true)]
#[case(json!(false), true)]
#[case(json!(0), false)]
#[case(json!("true"), false)]
#[case(Value::Null, false)]
fn test_boolean(#[case] value: Value, #[case] expected: bool) {
    assert_eq!(boolean().is_valid(&value), expected);
}

#[test]
fn test_literal_choices() {
    let v = literal(["debug", "info", "warn"]);
    assert!(v.is_valid(&json!("info")));
    assert_eq!(
        v.fail(&json!("trace")).unwrap(),
        "Expected \"debug\"|\"info\"|\"warn\", got \"trace\"."
    );
}

#[test]
fn test_date_accepts_strings_only() {
    let v = date();
    assert!(v.is_valid(&json!("2024-02-29")));
    assert!(!v.is_valid(&json!("2023-02-29")));
    assert!(!v.is_valid(&json!(1_700_000_000)));
}

// =============================================================================
// Containers
// =============================================================================

#[test]
fn test_array_of_strings() {
    let v = array(plain_string());
    assert!(v.fail(&json!(["", ""])).is_none());
    let message = v.fail(&json!(["", 5])).unwrap();
    assert!(message.contains("Element 1"));
    assert!(!message.contains("Element 0"));
}

#[test]
fn test_nested_messages_are_indented() {
    let v = object(array(integer(NumberOptions::new())));
    let message = v.fail(&json!({"ports": [1, "two", 3.5]})).unwrap();
    assert!(message.starts_with("Bad value for the key 'ports': Element 1: Expected integer"));
    assert!(message.contains("\n\n  Element 2: Expected integer"));
}

#[test]
fn test_any_rejects_nested_null() {
    assert!(any().is_valid(&json!({"a": [1, 2.5, "x", false, {}]})));
    assert!(!any().is_valid(&json!({"a": null})));
}

// =============================================================================
// Structs
// =============================================================================

#[test]
fn test_struct_missing_unexpected_and_valid() {
    let v = structure(StructOptions::new().property("a", number(NumberOptions::new())));
    let missing = v.fail(&json!({})).unwrap();
    assert!(missing.contains("Missing keys: 'a'."));
    let unexpected = v.fail(&json!({"a": 1, "b": 2})).unwrap();
    assert!(unexpected.contains("Unexpected key 'b'."));
    assert!(v.fail(&json!({"a": 1})).is_none());
}

#[test]
fn test_struct_reports_every_bad_key() {
    let v = structure(
        StructOptions::new()
            .property("host", plain_string())
            .property("port", integer(NumberOptions::new().range(1.0, 65535.0)))
            .property("debug", boolean())
            .property("tags", array(plain_string())),
    );
    let message = v
        .fail(&json!({"host": 1, "port": 0, "debug": "yes", "tags": []}))
        .unwrap();
    assert_eq!(key_mentions(&message), 3);
    assert!(message.starts_with("struct:\n\n"));
    for key in ["host", "port", "debug"] {
        assert!(message.contains(&format!("Bad value for the key '{key}'")));
    }
}

#[test]
fn test_struct_static_dynamic_property() {
    let v = structure(
        StructOptions::new()
            .property("name", plain_string())
            .dynamic(DynamicProperty::new(number(NumberOptions::new()))),
    );
    assert!(v.fail(&json!({"name": "x", "extra": 4})).is_none());
    assert!(v.fail(&json!({"name": "x", "extra": "4"})).is_some());
    // Fixed properties keep their own validator.
    assert!(v.fail(&json!({"name": 3})).is_some());
}

#[test]
fn test_struct_overriding_dynamic_property() {
    let v = structure(
        StructOptions::new()
            .property("level", plain_string())
            .dynamic(DynamicProperty::new(number(NumberOptions::new())).overriding()),
    );
    assert!(v.fail(&json!({"level": 3})).is_none());
    assert!(v.fail(&json!({"level": "high"})).is_some());
}

#[test]
fn test_struct_rejecting_dynamic_property_info() {
    let v = structure(
        StructOptions::new()
            .property("a", boolean())
            .dynamic(DynamicProperty::reject("Only 'a' is supported.")),
    );
    assert_eq!(
        v.fail(&json!({"a": true, "b": 1})).unwrap(),
        "struct:\n\nUnexpected key 'b'. Only 'a' is supported."
    );
}

#[test]
fn test_struct_computed_dynamic_properties_see_siblings() {
    // Keys prefixed "x-" are allowed only when "extensions" is true.
    let v = structure(
        StructOptions::new()
            .property("extensions", boolean())
            .dynamic_with(|object, (key, fixed)| {
                if fixed.is_some() || !key.starts_with("x-") {
                    return None;
                }
                match object.get("extensions") {
                    Some(Value::Bool(true)) => Some(DynamicProperty::new(any())),
                    _ => Some(DynamicProperty::reject("Enable extensions first.")),
                }
            }),
    );
    assert!(v.fail(&json!({"extensions": true, "x-a": [1]})).is_none());
    let message = v.fail(&json!({"extensions": false, "x-a": [1]})).unwrap();
    assert!(message.contains("Unexpected key 'x-a'. Enable extensions first."));
    assert!(v.fail(&json!({"extensions": true, "other": 1})).is_some());
}

#[test]
fn test_struct_default_is_composed_from_properties() {
    let v = structure(
        StructOptions::new()
            .property("host", plain_string().with_default("localhost"))
            .property("port", integer(NumberOptions::new()).with_default(8080))
            .property("name", plain_string().optional()),
    );
    assert_eq!(v.default_value(), Some(&json!({"host": "localhost", "port": 8080})));
    assert!(v.fail(&json!({})).is_none());
}

#[test]
fn test_named_struct_prefixes_messages() {
    let v = structure(StructOptions::new().property("a", boolean())).named("server");
    assert_eq!(v.fail(&json!(5)).unwrap(), "Expected server, got 5.");
    assert!(v.fail(&json!({})).unwrap().starts_with("server:\n\n"));
}

// =============================================================================
// Codec
// =============================================================================

#[test]
fn test_stringify_then_parse_preserves_validity() {
    let v = structure(
        StructOptions::new()
            .property("when", date())
            .property("ratio", number(NumberOptions::new().range(0.0, 1.0))),
    );
    let value = json!({"when": "2024-01-02T03:04:05.000Z", "ratio": 0.25});
    let text = v.stringify(&value).unwrap();
    let back = v.parse(&text).unwrap();
    assert!(v.check(&back, Precomputed::Compute));
    assert_eq!(back, value);
}
