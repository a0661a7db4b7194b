//! Field encoders.
//!
//! A [`FieldEncoder`] turns the fields accumulated by a
//! [`RequestBuilder`](crate::RequestBuilder) into a body and the headers that
//! describe it. Three encoders ship with the crate:
//!
//! - [`JsonEncoder`] - `application/json` (default)
//! - [`UrlFormEncoder`] - `application/x-www-form-urlencoded`
//! - [`MultipartEncoder`](crate::MultipartEncoder) - `multipart/form-data`
//!
//! Only the multipart encoder accepts [`Part`] fields; the others fail with
//! [`Error::Encoding`].

use std::fmt;

use bytes::Bytes;
use serde_json::{Map, Value};

use crate::{Error, Headers, Part, Result};

/// Value of a single request field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Any serializable value, captured as JSON.
    Value(Value),
    /// A binary multipart attachment.
    Part(Part),
}

impl FieldValue {
    /// Returns `true` for a JSON `null` value.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Value(Value::Null))
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Part> for FieldValue {
    fn from(part: Part) -> Self {
        Self::Part(part)
    }
}

/// Strategy converting request fields into a body plus headers.
pub trait FieldEncoder: fmt::Debug + Send + Sync {
    /// Value of the `Content-Type` header this encoder produces.
    fn content_type(&self) -> String;

    /// Encode an ordered list of fields.
    fn encode_fields(&self, fields: &[(String, FieldValue)]) -> Result<Bytes>;

    /// Encode a complete body value.
    fn encode_value(&self, value: &Value) -> Result<Bytes>;

    /// Returns `true` if `null` fields are left out of the body.
    fn skips_null_fields(&self) -> bool {
        true
    }

    /// Encode fields into an optional body and its `Content-Type` and
    /// `Content-Length` headers.
    ///
    /// No fields means no body, with a `Content-Length` of `0`. So do fields
    /// that are all `null` when the encoder skips them.
    fn encode(&self, fields: &[(String, FieldValue)]) -> Result<(Option<Bytes>, Headers)> {
        let dropped =
            |(_, value): &(String, FieldValue)| self.skips_null_fields() && value.is_null();
        let body = if fields.iter().all(dropped) {
            None
        } else {
            Some(self.encode_fields(fields)?)
        };
        let headers = self.headers(body.as_ref());
        Ok((body, headers))
    }

    /// Headers describing a body produced by this encoder.
    fn headers(&self, body: Option<&Bytes>) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type", self.content_type());
        headers.insert(
            "Content-Length",
            body.map_or(0, Bytes::len).to_string(),
        );
        headers
    }
}

// ============================================================================
// Key mapping
// ============================================================================

/// Mapping between field names in code and keys on the wire.
///
/// Field names in code follow Rust's `snake_case` convention, so only
/// [`Custom`](Self::Custom) rewrites keys read from a response.
#[derive(Debug, Clone, Copy, Default)]
pub enum KeyMapping {
    /// Keys are sent and read unchanged.
    #[default]
    UseDefaultKeys,
    /// Keys are sent as `snake_case` (`userName` becomes `user_name`) and
    /// read unchanged.
    SnakeCase,
    /// Custom conversion, applied in both directions.
    Custom(fn(&str) -> String),
}

impl KeyMapping {
    /// Convert a field name into its wire key.
    #[must_use]
    pub fn encode_key(&self, key: &str) -> String {
        match self {
            Self::UseDefaultKeys => key.to_string(),
            Self::SnakeCase => to_snake_case(key),
            Self::Custom(convert) => convert(key),
        }
    }

    /// Convert a wire key back into a field name.
    #[must_use]
    pub fn decode_key(&self, key: &str) -> String {
        match self {
            Self::UseDefaultKeys | Self::SnakeCase => key.to_string(),
            Self::Custom(convert) => convert(key),
        }
    }

    /// Returns `true` if keys are left unchanged.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        matches!(self, Self::UseDefaultKeys)
    }

    /// Returns `true` if keys read from a response are rewritten.
    #[must_use]
    pub const fn rewrites_decoded_keys(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    /// Rewrite every object key in `value`, recursively.
    pub(crate) fn map_keys(value: Value, convert: &dyn Fn(&str) -> String) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (convert(&key), Self::map_keys(value, convert)))
                    .collect(),
            ),
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|value| Self::map_keys(value, convert))
                    .collect(),
            ),
            other => other,
        }
    }
}

fn to_snake_case(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);
    for (index, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() && index > 0 {
            let prev = chars.get(index - 1).copied().unwrap_or('_');
            let next_is_lower = chars.get(index + 1).is_some_and(|c| c.is_lowercase());
            let starts_word = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if starts_word && prev != '_' {
                out.push('_');
            }
        }
        out.extend(ch.to_lowercase());
    }
    out
}

// ============================================================================
// JSON
// ============================================================================

/// Encoder producing `application/json` bodies.
///
/// Fields become the keys of a JSON object, in insertion order unless
/// [`sorted_keys`](Self::sorted_keys) is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder {
    key_mapping: KeyMapping,
    sorted_keys: bool,
    pretty: bool,
}

impl JsonEncoder {
    /// Create an encoder with default keys and compact output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key mapping.
    #[must_use]
    pub const fn with_key_mapping(mut self, key_mapping: KeyMapping) -> Self {
        self.key_mapping = key_mapping;
        self
    }

    /// Sort object keys.
    #[must_use]
    pub const fn sorted_keys(mut self, sorted: bool) -> Self {
        self.sorted_keys = sorted;
        self
    }

    /// Pretty-print with two-space indentation.
    #[must_use]
    pub const fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Configured key mapping.
    #[must_use]
    pub const fn key_mapping(&self) -> KeyMapping {
        self.key_mapping
    }

    fn prepare(&self, value: Value) -> Value {
        let value = if self.key_mapping.is_default() {
            value
        } else {
            KeyMapping::map_keys(value, &|key: &str| self.key_mapping.encode_key(key))
        };
        if self.sorted_keys {
            sort_keys(value)
        } else {
            value
        }
    }

    fn write(&self, value: &Value) -> Result<Bytes> {
        let written = if self.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        };
        written
            .map(Bytes::from)
            .map_err(|e| Error::encoding(format!("JSON serialization failed: {e}")))
    }
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

impl FieldEncoder for JsonEncoder {
    fn content_type(&self) -> String {
        "application/json".to_string()
    }

    fn skips_null_fields(&self) -> bool {
        false
    }

    fn encode_fields(&self, fields: &[(String, FieldValue)]) -> Result<Bytes> {
        let mut object = Map::with_capacity(fields.len());
        for (name, value) in fields {
            let FieldValue::Value(value) = value else {
                return Err(part_not_supported(name, "JSON"));
            };
            object.insert(name.clone(), value.clone());
        }
        self.write(&self.prepare(Value::Object(object)))
    }

    fn encode_value(&self, value: &Value) -> Result<Bytes> {
        self.write(&self.prepare(value.clone()))
    }
}

fn part_not_supported(name: &str, encoding: &str) -> Error {
    Error::encoding(format!(
        "field `{name}` is a multipart part and cannot be {encoding}-encoded"
    ))
}

// ============================================================================
// URL-encoded form
// ============================================================================

/// Encoder producing `application/x-www-form-urlencoded` bodies.
///
/// Fields are written as `key=value` pairs in insertion order. Arrays repeat
/// their key, `null` values are omitted and nested objects are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlFormEncoder {
    key_mapping: KeyMapping,
}

impl UrlFormEncoder {
    /// Create an encoder with default keys.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key mapping.
    #[must_use]
    pub const fn with_key_mapping(mut self, key_mapping: KeyMapping) -> Self {
        self.key_mapping = key_mapping;
        self
    }

    fn write(pairs: &[(String, String)]) -> Result<Bytes> {
        serde_urlencoded::to_string(pairs)
            .map(|s| Bytes::from(s.into_bytes()))
            .map_err(|e| Error::encoding(format!("form serialization failed: {e}")))
    }
}

impl FieldEncoder for UrlFormEncoder {
    fn content_type(&self) -> String {
        "application/x-www-form-urlencoded".to_string()
    }

    fn encode_fields(&self, fields: &[(String, FieldValue)]) -> Result<Bytes> {
        let mut pairs = Vec::with_capacity(fields.len());
        for (name, value) in fields {
            let FieldValue::Value(value) = value else {
                return Err(part_not_supported(name, "form"));
            };
            form_pairs(&self.key_mapping.encode_key(name), value, &mut pairs)?;
        }
        Self::write(&pairs)
    }

    fn encode_value(&self, value: &Value) -> Result<Bytes> {
        let Value::Object(object) = value else {
            return Err(Error::encoding(
                "only objects can be sent as a form-encoded body",
            ));
        };
        let mut pairs = Vec::with_capacity(object.len());
        for (name, value) in object {
            form_pairs(&self.key_mapping.encode_key(name), value, &mut pairs)?;
        }
        Self::write(&pairs)
    }
}

/// Flatten a value into form `(key, value)` pairs.
///
/// Scalars produce one pair, arrays one pair per element, `null` nothing.
pub(crate) fn form_pairs(name: &str, value: &Value, pairs: &mut Vec<(String, String)>) -> Result<()> {
    match value {
        Value::Null => {}
        Value::String(text) => pairs.push((name.to_string(), text.clone())),
        Value::Bool(_) | Value::Number(_) => pairs.push((name.to_string(), value.to_string())),
        Value::Array(items) => {
            for item in items {
                if item.is_array() {
                    return Err(Error::encoding(format!(
                        "field `{name}` holds nested arrays and cannot be form-encoded"
                    )));
                }
                form_pairs(name, item, pairs)?;
            }
        }
        Value::Object(_) => {
            return Err(Error::encoding(format!(
                "field `{name}` is an object and cannot be form-encoded"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(values: &[(&str, Value)]) -> Vec<(String, FieldValue)> {
        values
            .iter()
            .map(|(name, value)| ((*name).to_string(), FieldValue::Value(value.clone())))
            .collect()
    }

    fn utf8(bytes: &Bytes) -> &str {
        std::str::from_utf8(bytes).expect("utf8")
    }

    #[test]
    fn snake_case_conversion() {
        assert_eq!(to_snake_case("userName"), "user_name");
        assert_eq!(to_snake_case("myURLProperty"), "my_url_property");
        assert_eq!(to_snake_case("id"), "id");
        assert_eq!(to_snake_case("page2Size"), "page2_size");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn snake_case_reads_keys_unchanged() {
        let mapping = KeyMapping::SnakeCase;
        assert_eq!(mapping.encode_key("userName"), "user_name");
        assert_eq!(mapping.decode_key("user_name"), "user_name");
        assert!(!mapping.rewrites_decoded_keys());
    }

    #[test]
    fn custom_key_mapping() {
        let mapping = KeyMapping::Custom(|key| key.to_uppercase());
        assert_eq!(mapping.encode_key("name"), "NAME");
        assert_eq!(mapping.decode_key("name"), "NAME");
    }

    #[test]
    fn json_keeps_insertion_order() {
        let encoder = JsonEncoder::new();
        let body = encoder
            .encode_fields(&fields(&[("b", json!("two")), ("a", json!("one"))]))
            .expect("encode");
        assert_eq!(utf8(&body), r#"{"b":"two","a":"one"}"#);
    }

    #[test]
    fn json_sorted_and_pretty() {
        let encoder = JsonEncoder::new().sorted_keys(true).pretty(true);
        let (body, headers) = encoder
            .encode(&fields(&[("b", json!("two")), ("a", json!("one"))]))
            .expect("encode");
        let body = body.expect("body");

        assert_eq!(utf8(&body), "{\n  \"a\": \"one\",\n  \"b\": \"two\"\n}");
        assert_eq!(headers.get("Content-Type"), Some("application/json"));
        assert_eq!(headers.get("Content-Length"), Some("30"));
    }

    #[test]
    fn json_sorts_nested_objects() {
        let encoder = JsonEncoder::new().sorted_keys(true);
        let body = encoder
            .encode_value(&json!({"z": {"b": 1, "a": 2}, "y": [{"d": 0, "c": 1}]}))
            .expect("encode");
        assert_eq!(utf8(&body), r#"{"y":[{"c":1,"d":0}],"z":{"a":2,"b":1}}"#);
    }

    #[test]
    fn json_applies_key_mapping() {
        let encoder = JsonEncoder::new().with_key_mapping(KeyMapping::SnakeCase);
        let body = encoder
            .encode_fields(&fields(&[("userName", json!({"firstName": "Ada"}))]))
            .expect("encode");
        assert_eq!(utf8(&body), r#"{"user_name":{"first_name":"Ada"}}"#);
    }

    #[test]
    fn json_rejects_parts() {
        let encoder = JsonEncoder::new();
        let err = encoder
            .encode_fields(&[("file".to_string(), FieldValue::Part(Part::text("x")))])
            .expect_err("part under JSON");
        assert!(err.is_encoding());
        assert!(err.to_string().contains("`file`"));
    }

    #[test]
    fn empty_fields_have_no_body() {
        let (body, headers) = JsonEncoder::new().encode(&[]).expect("encode");
        assert!(body.is_none());
        assert_eq!(headers.get("Content-Length"), Some("0"));
        assert_eq!(headers.get("Content-Type"), Some("application/json"));
    }

    #[test]
    fn null_only_fields() {
        let nulls = fields(&[("a", Value::Null), ("b", Value::Null)]);

        let (body, headers) = UrlFormEncoder::new().encode(&nulls).expect("encode");
        assert!(body.is_none());
        assert_eq!(headers.get("Content-Length"), Some("0"));

        let (body, headers) = JsonEncoder::new().encode(&nulls).expect("encode");
        assert_eq!(body.as_deref(), Some(&br#"{"a":null,"b":null}"#[..]));
        assert_eq!(headers.get("Content-Length"), Some("19"));
    }

    #[test]
    fn form_pairs_in_insertion_order() {
        let encoder = UrlFormEncoder::new();
        let (body, headers) = encoder
            .encode(&fields(&[("a", json!("one")), ("b", json!("two"))]))
            .expect("encode");

        assert_eq!(body.as_deref(), Some(&b"a=one&b=two"[..]));
        assert_eq!(
            headers.get("Content-Type"),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(headers.get("Content-Length"), Some("11"));
    }

    #[test]
    fn form_percent_encodes_and_flattens() {
        let encoder = UrlFormEncoder::new().with_key_mapping(KeyMapping::SnakeCase);
        let body = encoder
            .encode_fields(&fields(&[
                ("fullName", json!("Ada Lovelace & co")),
                ("tags", json!(["x", 1, true])),
                ("missing", Value::Null),
            ]))
            .expect("encode");
        assert_eq!(
            utf8(&body),
            "full_name=Ada+Lovelace+%26+co&tags=x&tags=1&tags=true"
        );
    }

    #[test]
    fn form_rejects_objects_and_parts() {
        let encoder = UrlFormEncoder::new();
        assert!(
            encoder
                .encode_fields(&fields(&[("user", json!({"name": "x"}))]))
                .is_err()
        );
        assert!(
            encoder
                .encode_fields(&[("file".to_string(), Part::text("x").into())])
                .is_err()
        );
        assert!(encoder.encode_value(&json!([1, 2])).is_err());
    }

    #[test]
    fn form_body_value() {
        let body = UrlFormEncoder::new()
            .encode_value(&json!({"username": "alice", "password": "secret"}))
            .expect("encode");
        assert_eq!(utf8(&body), "username=alice&password=secret");
    }
}
