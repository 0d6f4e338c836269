//! Payload validation against a [`Schema`].
//!
//! [`validate`] is a pure function: it checks every declared field of an
//! untyped JSON payload and returns either a [`Validated`] value with each
//! field coerced to its declared type, or the [`FieldErrors`] that explain
//! what is wrong, one message per failing field.
//!
//! Extra keys the schema does not declare are ignored.
//!
//! ```rust
//! use serde_json::json;
//! use vetted::schema::{FieldType, Schema};
//! use vetted::validate::validate;
//!
//! let schema = Schema::new("User")
//!     .field("name", FieldType::String)
//!     .field("age", FieldType::Integer);
//!
//! let ok = validate(&json!({"name": "Ann", "age": "30", "extra": true}), &schema).unwrap();
//! assert_eq!(ok.int("age"), Some(30));
//!
//! let err = validate(&json!({"name": "Ann"}), &schema).unwrap_err();
//! assert_eq!(err.get("age"), Some("field required"));
//! ```

use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::schema::{FieldType, Schema};

/// Key used when the payload as a whole is unusable.
pub const ROOT: &str = "__root__";

pub const FIELD_REQUIRED: &str = "field required";
pub const NONE_NOT_ALLOWED: &str = "none is not an allowed value";
pub const NOT_A_DICT: &str = "value is not a valid dict";
const STR_EXPECTED: &str = "str type expected";
const NOT_AN_INTEGER: &str = "value is not a valid integer";
const NOT_A_FLOAT: &str = "value is not a valid float";
const NOT_A_BOOLEAN: &str = "value could not be parsed to a boolean";
const BAD_DATETIME: &str = "invalid datetime format";

/// How coerced timestamps are stored in a [`Validated`] payload.
const CANONICAL_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%S%.f";

// ── FieldErrors ───────────────────────────────────────────────────────────────

/// Field name → human-readable message, in the order fields failed.
///
/// Serialises as a JSON object, which is what goes into a 422 body.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldErrors(Vec<(String, String)>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` for `field`. A second message for the same field
    /// overwrites the first and keeps its position.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        let message = message.into();
        match self.0.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = message,
            None => self.0.push((field, message)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.iter().find(|(f, _)| f == field).map(|(_, m)| m.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, message) in &self.0 {
            map.serialize_entry(field, message)?;
        }
        map.end()
    }
}

/// `age: field required; email: field required`
impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

// ── Validated ─────────────────────────────────────────────────────────────────

/// A payload that passed validation.
///
/// Holds only the declared fields that were present, each already coerced to
/// its declared type (`"30"` for an integer field is stored as `30`, an epoch
/// timestamp as an ISO 8601 string).
#[derive(Clone, Debug, PartialEq)]
pub struct Validated {
    schema: String,
    values: Map<String, Value>,
}

impl Validated {
    /// Name of the schema this payload was validated against.
    pub fn schema(&self) -> &str { &self.schema }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn str(&self, field: &str) -> Option<&str> {
        self.get(field)?.as_str()
    }

    pub fn int(&self, field: &str) -> Option<i64> {
        self.get(field)?.as_i64()
    }

    pub fn float(&self, field: &str) -> Option<f64> {
        self.get(field)?.as_f64()
    }

    pub fn bool(&self, field: &str) -> Option<bool> {
        self.get(field)?.as_bool()
    }

    pub fn timestamp(&self, field: &str) -> Option<NaiveDateTime> {
        parse_timestamp(self.str(field)?)
    }

    /// Decodes the coerced fields into a caller-defined type.
    pub fn decode<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(Value::Object(self.values.clone()))
    }
}

// ── validate ──────────────────────────────────────────────────────────────────

/// Validates `payload` against `schema`.
///
/// A payload that is not a JSON object fails with a single [`ROOT`] entry.
pub fn validate(payload: &Value, schema: &Schema) -> Result<Validated, FieldErrors> {
    let mut errors = FieldErrors::new();

    let Some(object) = payload.as_object() else {
        errors.insert(ROOT, NOT_A_DICT);
        return Err(errors);
    };

    let mut values = Map::new();
    for field in schema.fields() {
        match object.get(&field.name) {
            None | Some(Value::Null) if !field.required => {}
            None => errors.insert(&field.name, FIELD_REQUIRED),
            Some(Value::Null) => errors.insert(&field.name, NONE_NOT_ALLOWED),
            Some(value) => match coerce(value, field.ty) {
                Ok(v) => {
                    values.insert(field.name.clone(), v);
                }
                Err(message) => errors.insert(&field.name, message),
            },
        }
    }

    if errors.is_empty() {
        Ok(Validated { schema: schema.name().to_owned(), values })
    } else {
        Err(errors)
    }
}

fn coerce(value: &Value, ty: FieldType) -> Result<Value, &'static str> {
    match ty {
        FieldType::String => as_string(value).map(Value::String).ok_or(STR_EXPECTED),
        FieldType::Integer => as_integer(value).map(Value::from).ok_or(NOT_AN_INTEGER),
        FieldType::Float => as_float(value).map(Value::from).ok_or(NOT_A_FLOAT),
        FieldType::Boolean => as_boolean(value).map(Value::Bool).ok_or(NOT_A_BOOLEAN),
        FieldType::Timestamp => timestamp_value(value)
            .map(|dt| Value::String(dt.format(CANONICAL_TIMESTAMP).to_string()))
            .ok_or(BAD_DATETIME),
    }
}

/// Numbers are stringified; booleans render as `True` / `False`.
fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "True" } else { "False" }.to_owned()),
        _ => None,
    }
}

/// Floats truncate toward zero; booleans are 0 / 1.
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            let f = n.as_f64()?.trunc();
            // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
            (f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
        }),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn as_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => {
            let f = n.as_f64()?;
            if f == 0.0 {
                Some(false)
            } else if f == 1.0 {
                Some(true)
            } else {
                None
            }
        }
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "1" | "on" | "t" | "true" | "y" | "yes" => Some(true),
            "0" | "off" | "f" | "false" | "n" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Larger epoch values than this are read as milliseconds.
const EPOCH_MS_THRESHOLD: f64 = 2e10;

fn timestamp_value(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Number(n) => from_epoch(n.as_f64()?),
        Value::String(s) => parse_timestamp(s),
        _ => None,
    }
}

fn from_epoch(mut secs: f64) -> Option<NaiveDateTime> {
    if !secs.is_finite() {
        return None;
    }
    if secs.abs() > EPOCH_MS_THRESHOLD {
        secs /= 1000.0;
    }
    let whole = secs.floor();
    let nanos = (((secs - whole) * 1e9).round() as u32).min(999_999_999);
    DateTime::from_timestamp(whole as i64, nanos).map(|dt| dt.naive_utc())
}

/// Accepts date-time strings with a space or `T` separator, with or without
/// seconds and fractional seconds, RFC 3339 with an offset, and numeric
/// strings holding epoch seconds. Offsets are normalised to UTC.
pub(crate) fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Some(dt) = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt);
    }
    from_epoch(s.trim().parse().ok()?)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    fn user() -> Schema {
        Schema::new("User")
            .field("name", FieldType::String)
            .field("age", FieldType::Integer)
            .field("email", FieldType::String)
    }

    #[test]
    fn every_missing_field_is_reported() {
        let err = validate(&json!({"name": "Ann"}), &user()).unwrap_err();

        assert_eq!(err.len(), 2);
        assert_eq!(err.get("age"), Some(FIELD_REQUIRED));
        assert_eq!(err.get("email"), Some(FIELD_REQUIRED));
        assert!(!err.contains("name"));
    }

    #[test]
    fn extra_fields_are_ignored() {
        let ok = validate(
            &json!({"name": "Ann", "age": 30, "email": "a@b.com", "admin": true}),
            &user(),
        )
        .unwrap();

        assert_eq!(ok.str("name"), Some("Ann"));
        assert!(ok.get("admin").is_none());
        assert_eq!(ok.schema(), "User");
    }

    #[test]
    fn wrong_types_get_type_messages() {
        let err = validate(&json!({"name": ["Ann"], "age": "thirty", "email": null}), &user()).unwrap_err();

        assert_eq!(err.get("name"), Some("str type expected"));
        assert_eq!(err.get("age"), Some("value is not a valid integer"));
        assert_eq!(err.get("email"), Some(NONE_NOT_ALLOWED));
    }

    #[test]
    fn non_object_payload_is_a_root_error() {
        for payload in [json!([1, 2]), json!("Ann"), json!(null), json!(3)] {
            let err = validate(&payload, &user()).unwrap_err();
            assert_eq!(err.get(ROOT), Some(NOT_A_DICT));
            assert_eq!(err.len(), 1);
        }
    }

    #[test]
    fn strings_accept_numbers_and_booleans() {
        let s = Schema::new("S").field("name", FieldType::String);

        assert_eq!(validate(&json!({"name": 7}), &s).unwrap().str("name"), Some("7"));
        assert_eq!(validate(&json!({"name": 2.5}), &s).unwrap().str("name"), Some("2.5"));
        assert_eq!(validate(&json!({"name": true}), &s).unwrap().str("name"), Some("True"));
        assert!(validate(&json!({"name": {"first": "Ann"}}), &s).is_err());
    }

    #[test]
    fn integers_truncate_floats_and_accept_booleans() {
        let s = Schema::new("N").field("n", FieldType::Integer);
        let int = |v: Value| validate(&json!({ "n": v }), &s).map(|ok| ok.int("n"));

        assert_eq!(int(json!("42")), Ok(Some(42)));
        assert_eq!(int(json!(42.0)), Ok(Some(42)));
        assert_eq!(int(json!(30.5)), Ok(Some(30)));
        assert_eq!(int(json!(-30.9)), Ok(Some(-30)));
        assert_eq!(int(json!(true)), Ok(Some(1)));
        assert_eq!(int(json!(false)), Ok(Some(0)));
        assert!(int(json!("30.5")).is_err());
        assert!(int(json!(1e300)).is_err());
    }

    #[test]
    fn boolean_single_letter_forms() {
        let s = Schema::new("B").field("b", FieldType::Boolean);
        let b = |v: &str| validate(&json!({ "b": v }), &s).ok().and_then(|ok| ok.bool("b"));

        for yes in ["y", "t", "Y", "T", "on", "1"] {
            assert_eq!(b(yes), Some(true), "{yes}");
        }
        for no in ["n", "f", "N", "F", "off", "0"] {
            assert_eq!(b(no), Some(false), "{no}");
        }
        assert_eq!(b("maybe"), None);
        assert_eq!(b(" yes"), None);
    }

    #[test]
    fn floats_and_booleans_coerce() {
        let s = Schema::new("F")
            .field("ratio", FieldType::Float)
            .field("active", FieldType::Boolean);

        let ok = validate(&json!({"ratio": "0.5", "active": "Yes"}), &s).unwrap();
        assert_eq!(ok.float("ratio"), Some(0.5));
        assert_eq!(ok.bool("active"), Some(true));

        let err = validate(&json!({"ratio": "NaN", "active": 2}), &s).unwrap_err();
        assert_eq!(err.get("ratio"), Some("value is not a valid float"));
        assert_eq!(err.get("active"), Some("value could not be parsed to a boolean"));
    }

    #[test]
    fn timestamps_accept_common_layouts() {
        let s = Schema::new("T").field("at", FieldType::Timestamp);

        for at in ["2024-05-01 12:30:00", "2024-05-01T12:30:00.250", "2024-05-01T14:30:00+02:00"] {
            let ok = validate(&json!({ "at": at }), &s).unwrap();
            assert_eq!(ok.timestamp("at").unwrap().format("%H:%M").to_string(), "12:30");
        }
        let err = validate(&json!({"at": "yesterday"}), &s).unwrap_err();
        assert_eq!(err.get("at"), Some("invalid datetime format"));
    }

    #[test]
    fn timestamps_accept_epochs_and_minute_precision() {
        let s = Schema::new("T").field("at", FieldType::Timestamp);
        let at = |v: Value| {
            validate(&json!({ "at": v }), &s)
                .ok()
                .and_then(|ok| ok.timestamp("at"))
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        };

        // 2024-05-01 12:30:00 UTC
        assert_eq!(at(json!(1714566600)).as_deref(), Some("2024-05-01 12:30:00"));
        assert_eq!(at(json!(1714566600.5)).as_deref(), Some("2024-05-01 12:30:00"));
        assert_eq!(at(json!(1714566600000_i64)).as_deref(), Some("2024-05-01 12:30:00"));
        assert_eq!(at(json!("1714566600")).as_deref(), Some("2024-05-01 12:30:00"));
        assert_eq!(at(json!("2024-05-01 12:30")).as_deref(), Some("2024-05-01 12:30:00"));
        assert_eq!(at(json!("2024-05-01T12:30")).as_deref(), Some("2024-05-01 12:30:00"));
        assert_eq!(at(json!(true)), None);
    }

    #[test]
    fn optional_fields_may_be_absent_or_null() {
        let s = Schema::new("P")
            .field("name", FieldType::String)
            .optional("nickname", FieldType::String);

        assert!(validate(&json!({"name": "Ann"}), &s).is_ok());
        assert!(validate(&json!({"name": "Ann", "nickname": null}), &s).is_ok());
        assert!(validate(&json!({"name": "Ann", "nickname": [1]}), &s).is_err());
    }

    #[test]
    fn later_message_for_same_field_overwrites() {
        let mut errors = FieldErrors::new();
        errors.insert("age", "first");
        errors.insert("email", "x");
        errors.insert("age", "second");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("age"), Some("second"));
        assert_eq!(serde_json::to_string(&errors).unwrap(), r#"{"age":"second","email":"x"}"#);
        assert_eq!(errors.to_string(), "age: second; email: x");
    }

    #[test]
    fn decode_uses_coerced_values() {
        #[derive(Deserialize)]
        struct User {
            name: String,
            age: u32,
        }

        let ok = validate(&json!({"name": "Ann", "age": "30", "email": "a@b.com"}), &user()).unwrap();
        let u: User = ok.decode().unwrap();
        assert_eq!((u.name.as_str(), u.age), ("Ann", 30));
    }
}
