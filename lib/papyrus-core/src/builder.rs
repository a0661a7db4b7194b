//! Request building.
//!
//! A [`RequestBuilder`] accumulates everything an endpoint call needs (method,
//! path, path parameters, query parameters, headers, fields or body) and the
//! [`FieldEncoder`] used to turn the fields into a body. Building is a pure
//! read: the same builder can produce any number of identical requests.
//!
//! # Example
//!
//! ```
//! use papyrus_core::{Method, RequestBuilder, UrlFormEncoder};
//!
//! let request = RequestBuilder::new("https://api.example.com/", Method::POST, "/users/{id}")
//!     .parameter("id", 42)
//!     .query("notify", true)
//!     .header("Accept", "application/json")
//!     .encoder(UrlFormEncoder::new())
//!     .field("name", "Ada")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(request.url().as_str(), "https://api.example.com/users/42?notify=true");
//! assert_eq!(request.body().unwrap().as_ref(), b"name=Ada");
//! ```

use std::fmt::Display;
use std::sync::Arc;

use base64::Engine as _;
use bytes::Bytes;
use http::Method;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::encoder::{FieldEncoder, FieldValue, JsonEncoder, form_pairs};
use crate::{Error, Headers, Part, Request, Result};

/// Characters escaped when a path parameter is substituted into a segment.
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\')
    .add(b'%');

/// Join a base URL and a path with exactly one `/` between them.
///
/// One trailing slash is trimmed from `base` and one leading slash from
/// `path` before joining.
///
/// ```
/// use papyrus_core::join_path;
///
/// assert_eq!(join_path("foo/", "baz"), "foo/baz");
/// assert_eq!(join_path("foo", "/baz"), "foo/baz");
/// assert_eq!(join_path("foo/", "/baz"), "foo/baz");
/// ```
#[must_use]
pub fn join_path(base: &str, path: &str) -> String {
    let base = base.strip_suffix('/').unwrap_or(base);
    let path = path.strip_prefix('/').unwrap_or(path);
    format!("{base}/{path}")
}

/// Mutable accumulator producing [`Request`]s.
///
/// Methods consume and return the builder so calls can be chained. Values
/// that fail to serialize are remembered and reported by
/// [`full_url`](Self::full_url), [`body_and_headers`](Self::body_and_headers)
/// and [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
    method: Method,
    path: String,
    parameters: Vec<(String, String)>,
    queries: Vec<(String, String)>,
    headers: Headers,
    fields: Vec<(String, FieldValue)>,
    body: Option<Value>,
    encoder: Arc<dyn FieldEncoder>,
    error: Option<Error>,
}

impl RequestBuilder {
    /// Creates a builder using the JSON encoder.
    #[must_use]
    pub fn new(base_url: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            method,
            path: path.into(),
            parameters: Vec::new(),
            queries: Vec::new(),
            headers: Headers::new(),
            fields: Vec::new(),
            body: None,
            encoder: Arc::new(JsonEncoder::new()),
            error: None,
        }
    }

    /// Base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Path, before parameter substitution.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Headers added so far, excluding encoder headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Fields added so far, in insertion order.
    #[must_use]
    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    /// Active field encoder.
    #[must_use]
    pub fn field_encoder(&self) -> &dyn FieldEncoder {
        self.encoder.as_ref()
    }

    /// Adds a header line. Repeated names produce repeated lines.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Adds several header lines.
    #[must_use]
    pub fn headers_from(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Sets `Authorization: Bearer <token>`.
    #[must_use]
    pub fn bearer_auth(mut self, token: impl Display) -> Self {
        self.headers.insert("Authorization", format!("Bearer {token}"));
        self
    }

    /// Sets `Authorization: Basic <base64(username:password)>`.
    #[must_use]
    pub fn basic_auth(mut self, username: impl Display, password: impl Display) -> Self {
        let credentials =
            base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
        self.headers
            .insert("Authorization", format!("Basic {credentials}"));
        self
    }

    /// Substitutes a path parameter.
    ///
    /// Both `{name}` placeholders and `:name` segments are replaced by the
    /// percent-encoded value.
    #[must_use]
    pub fn parameter(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.parameters.push((name.into(), value.to_string()));
        self
    }

    /// Adds a query parameter.
    ///
    /// Arrays repeat the key once per element and `null` adds nothing.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Serialize) -> Self {
        let name = name.into();
        let pairs = serde_json::to_value(value)
            .map_err(|e| Error::encoding(format!("query `{name}`: {e}")))
            .and_then(|value| {
                let mut pairs = Vec::new();
                form_pairs(&name, &value, &mut pairs)?;
                Ok(pairs)
            });
        match pairs {
            Ok(pairs) => self.queries.extend(pairs),
            Err(err) => self.defer(err),
        }
        self
    }

    /// Adds every field of a serializable struct as query parameters.
    #[must_use]
    pub fn queries<T: Serialize>(mut self, value: &T) -> Self {
        match serde_html_form::to_string(value) {
            Ok(query) => self.queries.extend(
                url::form_urlencoded::parse(query.as_bytes())
                    .map(|(name, value)| (name.into_owned(), value.into_owned())),
            ),
            Err(e) => self.defer(Error::encoding(format!("query serialization failed: {e}"))),
        }
        self
    }

    /// Adds a field, encoded by the active encoder.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Serialize) -> Self {
        let name = name.into();
        match serde_json::to_value(value) {
            Ok(value) => self.fields.push((name, FieldValue::Value(value))),
            Err(e) => self.defer(Error::encoding(format!("field `{name}`: {e}"))),
        }
        self
    }

    /// Adds a multipart attachment. Requires the multipart encoder.
    #[must_use]
    pub fn part(mut self, name: impl Into<String>, part: Part) -> Self {
        self.fields.push((name.into(), FieldValue::Part(part)));
        self
    }

    /// Sets the whole body, encoded by the active encoder.
    ///
    /// A body and fields cannot be combined.
    #[must_use]
    pub fn body(mut self, value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => self.body = Some(value),
            Err(e) => self.defer(Error::encoding(format!("body: {e}"))),
        }
        self
    }

    /// Selects the field encoder.
    #[must_use]
    pub fn encoder(mut self, encoder: impl FieldEncoder + 'static) -> Self {
        self.encoder = Arc::new(encoder);
        self
    }

    /// Selects a shared field encoder.
    #[must_use]
    pub fn shared_encoder(mut self, encoder: Arc<dyn FieldEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    fn defer(&mut self, error: Error) {
        self.error.get_or_insert(error);
    }

    fn check(&self) -> Result<()> {
        self.error.clone().map_or(Ok(()), Err)
    }

    fn resolved_path(&self) -> String {
        if self.parameters.is_empty() {
            return self.path.clone();
        }
        self.path
            .split('/')
            .map(|segment| self.resolve_segment(segment))
            .collect::<Vec<_>>()
            .join("/")
    }

    fn parameter_value(&self, name: &str) -> Option<String> {
        self.parameters
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, value)| utf8_percent_encode(value, PATH_SEGMENT_ENCODE_SET).to_string())
    }

    /// Substitutes parameters in one pass over the template segment, so a
    /// substituted value is never matched again.
    fn resolve_segment(&self, segment: &str) -> String {
        if let Some(value) = segment
            .strip_prefix(':')
            .and_then(|name| self.parameter_value(name))
        {
            return value;
        }

        let mut resolved = String::with_capacity(segment.len());
        let mut rest = segment;
        while let Some(start) = rest.find('{') {
            let (literal, placeholder) = rest.split_at(start);
            resolved.push_str(literal);
            let Some(end) = placeholder.find('}') else {
                rest = placeholder;
                break;
            };
            let name = placeholder.get(1..end).unwrap_or_default();
            match self.parameter_value(name) {
                Some(value) => resolved.push_str(&value),
                None => resolved.push_str(placeholder.get(..=end).unwrap_or_default()),
            }
            rest = placeholder.get(end + 1..).unwrap_or_default();
        }
        resolved.push_str(rest);
        resolved
    }

    /// Resolves the absolute URL: base and path joined by a single `/`,
    /// followed by the query parameters in insertion order.
    pub fn full_url(&self) -> Result<Url> {
        self.check()?;
        let joined = join_path(&self.base_url, &self.resolved_path());
        let mut url = Url::parse(&joined).map_err(|source| Error::InvalidUrl {
            url: joined.clone(),
            source,
        })?;

        if !self.queries.is_empty() {
            let mut query = url.query_pairs_mut();
            for (name, value) in &self.queries {
                query.append_pair(name, value);
            }
        }
        Ok(url)
    }

    /// Encodes the body and merges encoder headers over the added headers.
    ///
    /// `Content-Type` and `Content-Length` always come from the encoder.
    pub fn body_and_headers(&self) -> Result<(Option<Bytes>, Headers)> {
        self.check()?;
        let (body, encoder_headers) = match &self.body {
            Some(_) if !self.fields.is_empty() => {
                return Err(Error::encoding(
                    "a request cannot have both a body and fields",
                ));
            }
            Some(value) => {
                let body = self.encoder.encode_value(value)?;
                let headers = self.encoder.headers(Some(&body));
                (Some(body), headers)
            }
            None => self.encoder.encode(&self.fields)?,
        };

        let mut headers = self.headers.clone();
        for (name, value) in encoder_headers {
            headers.insert(name, value);
        }
        Ok((body, headers))
    }

    /// Builds the [`Request`].
    pub fn build(&self) -> Result<Request> {
        let url = self.full_url()?;
        let (body, headers) = self.body_and_headers()?;
        tracing::trace!(method = %self.method, %url, "request built");
        Ok(Request::from_parts(self.method.clone(), url, headers, body))
    }
}
