//! Multipart form data encoding.
//!
//! [`MultipartEncoder`] frames named [`Part`]s into a `multipart/form-data`
//! payload. For a fixed boundary and part order the output is byte-exact:
//!
//! ```text
//! --{boundary}\r\n
//! Content-Disposition: form-data; name="{name}"[; filename="{file_name}"]\r\n
//! [Content-Type: {mime_type}\r\n]
//! \r\n
//! {data}\r\n
//! ...
//! --{boundary}--\r\n
//! ```
//!
//! # Example
//!
//! ```
//! use papyrus_core::{MultipartEncoder, Part};
//!
//! let encoder = MultipartEncoder::with_boundary("test");
//! let body = encoder.encode(&[("field1".to_string(), Part::text("value1"))]);
//! assert_eq!(
//!     body.as_ref(),
//!     b"--test\r\nContent-Disposition: form-data; name=\"field1\"\r\n\r\nvalue1\r\n--test--\r\n"
//! );
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use serde_json::Value;

use crate::encoder::{FieldEncoder, FieldValue};
use crate::{Error, Result};

/// A single part of a multipart form.
///
/// When no name is declared, the part takes the name of the field it is
/// added under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    data: Bytes,
    name: Option<String>,
    file_name: Option<String>,
    mime_type: Option<String>,
}

impl Part {
    /// Create a part holding raw data.
    #[must_use]
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            name: None,
            file_name: None,
            mime_type: None,
        }
    }

    /// Create a part holding UTF-8 text, without a content type.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(value.into())
    }

    /// Create a file part.
    ///
    /// The MIME type is guessed from the file extension, falling back to
    /// `application/octet-stream`.
    #[must_use]
    pub fn file(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let mime_type = guess_mime_type(&file_name);
        Self {
            data: data.into(),
            name: None,
            file_name: Some(file_name),
            mime_type: Some(mime_type.to_string()),
        }
    }

    /// Set the declared field name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the file name.
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Set the MIME type.
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Part data.
    #[must_use]
    pub const fn data(&self) -> &Bytes {
        &self.data
    }

    /// Declared name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// File name, if any.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// MIME type, if any.
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }
}

fn guess_mime_type(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "csv" => "text/csv",
        "md" => "text/markdown",
        "json" => "application/json",
        "xml" => "application/xml",
        "zip" => "application/zip",
        "gz" | "gzip" => "application/gzip",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
}

/// Encoder producing `multipart/form-data` payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartEncoder {
    boundary: String,
}

impl Default for MultipartEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartEncoder {
    /// Create an encoder with a random UUID boundary.
    #[must_use]
    pub fn new() -> Self {
        Self {
            boundary: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a fixed boundary.
    ///
    /// The boundary must not appear in any part data.
    #[must_use]
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
        }
    }

    /// The boundary string.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Encode parts in the given order.
    ///
    /// Each part is named after its declared name, or the key it is paired
    /// with when it has none.
    #[must_use]
    pub fn encode(&self, parts: &[(String, Part)]) -> Bytes {
        let mut buf = BytesMut::new();
        for (key, part) in parts {
            self.put_part(&mut buf, part.name().unwrap_or(key), part);
        }
        self.put_terminator(&mut buf);
        buf.freeze()
    }

    fn put_part(&self, buf: &mut BytesMut, name: &str, part: &Part) {
        buf.put_slice(b"--");
        buf.put_slice(self.boundary.as_bytes());
        buf.put_slice(b"\r\n");

        buf.put_slice(b"Content-Disposition: form-data; name=\"");
        buf.put_slice(name.as_bytes());
        buf.put_slice(b"\"");
        if let Some(file_name) = &part.file_name {
            buf.put_slice(b"; filename=\"");
            buf.put_slice(file_name.as_bytes());
            buf.put_slice(b"\"");
        }
        buf.put_slice(b"\r\n");

        if let Some(mime_type) = &part.mime_type {
            buf.put_slice(b"Content-Type: ");
            buf.put_slice(mime_type.as_bytes());
            buf.put_slice(b"\r\n");
        }

        buf.put_slice(b"\r\n");
        buf.put_slice(&part.data);
        buf.put_slice(b"\r\n");
    }

    fn put_terminator(&self, buf: &mut BytesMut) {
        buf.put_slice(b"--");
        buf.put_slice(self.boundary.as_bytes());
        buf.put_slice(b"--\r\n");
    }
}

impl FieldEncoder for MultipartEncoder {
    fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    fn encode_fields(&self, fields: &[(String, FieldValue)]) -> Result<Bytes> {
        let mut parts = Vec::with_capacity(fields.len());
        for (name, value) in fields {
            match value {
                FieldValue::Part(part) => parts.push((name.clone(), part.clone())),
                FieldValue::Value(Value::Null) => {}
                FieldValue::Value(Value::String(text)) => {
                    parts.push((name.clone(), Part::text(text.as_str())));
                }
                FieldValue::Value(scalar @ (Value::Bool(_) | Value::Number(_))) => {
                    parts.push((name.clone(), Part::text(scalar.to_string())));
                }
                FieldValue::Value(Value::Array(_) | Value::Object(_)) => {
                    return Err(Error::encoding(format!(
                        "field `{name}` is not a scalar and cannot be sent as a multipart part"
                    )));
                }
            }
        }
        Ok(self.encode(&parts))
    }

    fn encode_value(&self, _value: &Value) -> Result<Bytes> {
        Err(Error::encoding(
            "multipart requests are built from fields, not from a single body value",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf8(bytes: &Bytes) -> &str {
        std::str::from_utf8(bytes).expect("utf8")
    }

    #[test]
    fn part_builders() {
        let part = Part::new("data")
            .with_name("upload")
            .with_file_name("custom.bin")
            .with_mime_type("application/custom");
        assert_eq!(part.data().as_ref(), b"data");
        assert_eq!(part.name(), Some("upload"));
        assert_eq!(part.file_name(), Some("custom.bin"));
        assert_eq!(part.mime_type(), Some("application/custom"));
    }

    #[test]
    fn part_file_guesses_mime_type() {
        assert_eq!(Part::file("photo.JPG", vec![0xFF_u8]).mime_type(), Some("image/jpeg"));
        assert_eq!(Part::file("notes.txt", "x").mime_type(), Some("text/plain"));
        assert_eq!(
            Part::file("blob", "x").mime_type(),
            Some("application/octet-stream")
        );
        assert!(Part::text("x").mime_type().is_none());
    }

    #[test]
    fn basic_fields() {
        let encoder = MultipartEncoder::with_boundary("test");
        let body = encoder.encode(&[
            ("field1".to_string(), Part::text("value1").with_name("field1")),
            ("field2".to_string(), Part::text("value2").with_name("field2")),
        ]);

        assert_eq!(
            utf8(&body),
            "--test\r\nContent-Disposition: form-data; name=\"field1\"\r\n\r\nvalue1\r\n--test\r\nContent-Disposition: form-data; name=\"field2\"\r\n\r\nvalue2\r\n--test--\r\n"
        );
    }

    #[test]
    fn file_attachment_uses_declared_name() {
        let encoder = MultipartEncoder::with_boundary("test");
        let part = Part::new("file content")
            .with_name("upload")
            .with_file_name("test.txt")
            .with_mime_type("text/plain");
        let body = encoder.encode(&[("file".to_string(), part)]);

        assert_eq!(
            utf8(&body),
            "--test\r\nContent-Disposition: form-data; name=\"upload\"; filename=\"test.txt\"\r\nContent-Type: text/plain\r\n\r\nfile content\r\n--test--\r\n"
        );
    }

    #[test]
    fn boundary_text_inside_data_is_untouched() {
        let encoder = MultipartEncoder::with_boundary("boundary123");
        let body = encoder.encode(&[("field".to_string(), Part::text("boundary123"))]);

        assert_eq!(
            utf8(&body),
            "--boundary123\r\nContent-Disposition: form-data; name=\"field\"\r\n\r\nboundary123\r\n--boundary123--\r\n"
        );
    }

    #[test]
    fn random_boundary_delimits_twice() {
        let encoder = MultipartEncoder::new();
        assert_eq!(encoder.boundary().len(), 36);

        let body = encoder.encode(&[("field".to_string(), Part::text("testRandomBoundaryData"))]);
        assert_eq!(utf8(&body).matches(encoder.boundary()).count(), 2);
    }

    #[test]
    fn random_boundaries_differ() {
        assert_ne!(
            MultipartEncoder::new().boundary(),
            MultipartEncoder::new().boundary()
        );
    }

    #[test]
    fn order_is_preserved_and_deterministic() {
        let encoder = MultipartEncoder::with_boundary("test");
        let parts = vec![
            ("b".to_string(), Part::text("Second")),
            ("a".to_string(), Part::text("First")),
        ];

        let first = encoder.encode(&parts);
        let second = encoder.encode(&parts);
        assert_eq!(first, second);

        let text = utf8(&first);
        let b = text.find("name=\"b\"").expect("b present");
        let a = text.find("name=\"a\"").expect("a present");
        assert!(b < a);
    }

    #[test]
    fn empty_form_is_only_terminator() {
        let encoder = MultipartEncoder::with_boundary("x");
        assert_eq!(encoder.encode(&[]).as_ref(), b"--x--\r\n");
    }

    #[test]
    fn scalar_fields_become_text_parts() {
        let encoder = MultipartEncoder::with_boundary("b");
        let fields = vec![
            ("count".to_string(), FieldValue::Value(serde_json::json!(3))),
            ("skipped".to_string(), FieldValue::Value(Value::Null)),
            ("flag".to_string(), FieldValue::Value(serde_json::json!(true))),
        ];

        let body = encoder.encode_fields(&fields).expect("encode");
        assert_eq!(
            utf8(&body),
            "--b\r\nContent-Disposition: form-data; name=\"count\"\r\n\r\n3\r\n--b\r\nContent-Disposition: form-data; name=\"flag\"\r\n\r\ntrue\r\n--b--\r\n"
        );
    }

    #[test]
    fn null_only_fields_have_no_body() {
        let encoder = MultipartEncoder::with_boundary("b");
        let fields = vec![("skipped".to_string(), FieldValue::Value(Value::Null))];

        let (body, headers) = FieldEncoder::encode(&encoder, &fields).expect("encode");
        assert!(body.is_none());
        assert_eq!(headers.get("Content-Length"), Some("0"));
    }

    #[test]
    fn nested_fields_are_rejected() {
        let encoder = MultipartEncoder::with_boundary("b");
        let fields = vec![(
            "tags".to_string(),
            FieldValue::Value(serde_json::json!(["a", "b"])),
        )];
        let err = encoder.encode_fields(&fields).expect_err("nested value");
        assert!(err.is_encoding());
    }

    #[test]
    fn content_type_names_boundary() {
        assert_eq!(
            MultipartEncoder::with_boundary("test-boundary").content_type(),
            "multipart/form-data; boundary=test-boundary"
        );
    }
}
