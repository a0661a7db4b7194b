//! HTTP response handling.
//!
//! Every field of a [`Response`] is optional: a transport may synthesize a
//! response from a failure alone ([`Response::from_error`]).
//!
//! Decoding has two entry points that differ only for absent or empty bodies:
//!
//! - [`Response::decode`] fails with [`Error::Decode`]
//! - [`Response::decode_optional`] returns `Ok(None)`
//!
//! # Example
//!
//! ```
//! use papyrus_core::{JsonDecoder, Response};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Person { name: String }
//!
//! let empty = Response::new().with_status(204);
//! assert!(empty.decode::<Person, _>(&JsonDecoder::new()).is_err());
//! assert!(empty.decode_optional::<Person, _>(&JsonDecoder::new()).unwrap().is_none());
//! ```

use std::any::type_name;
use std::fmt;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::{Error, Headers, JsonDecoder, Request, ResponseDecoder, Result};

/// HTTP response with optional request, status, headers, body and error.
#[derive(Debug, Clone, Default)]
pub struct Response {
    request: Option<Request>,
    status: Option<u16>,
    headers: Option<Headers>,
    body: Option<Bytes>,
    error: Option<Error>,
}

impl Response {
    /// Creates an empty response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a response carrying only a transport error.
    #[must_use]
    pub fn from_error(error: Error) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    /// Sets the originating request.
    #[must_use]
    pub fn with_request(mut self, request: Request) -> Self {
        self.request = Some(request);
        self
    }

    /// Sets the status code.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the headers.
    #[must_use]
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the transport error.
    #[must_use]
    pub fn with_error(mut self, error: Error) -> Self {
        self.error = Some(error);
        self
    }

    /// Originating request, if known.
    #[must_use]
    pub const fn request(&self) -> Option<&Request> {
        self.request.as_ref()
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub const fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }

    /// Single header value by name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref().and_then(|headers| headers.get(name))
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Transport error.
    #[must_use]
    pub const fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Consume into body.
    #[must_use]
    pub fn into_body(self) -> Option<Bytes> {
        self.body
    }

    /// Status is present and 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_some_and(|status| (200..300).contains(&status))
    }

    /// Check the response for failure.
    ///
    /// A transport error is returned as-is, before any status check. A status
    /// outside `200..=299` yields [`Error::Validation`]. Otherwise the response
    /// is returned unchanged.
    pub fn validate(mut self) -> Result<Self> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        match self.status {
            Some(status) if !(200..300).contains(&status) => {
                tracing::debug!(status, "unsuccessful status code");
                Err(Error::Validation {
                    status,
                    response: Box::new(self),
                })
            }
            _ => Ok(self),
        }
    }

    /// Decode the body into `T`.
    ///
    /// Fails when the response carries an error, when the body is absent or
    /// empty, or when the payload does not match `T`.
    pub fn decode<T, D>(&self, decoder: &D) -> Result<T>
    where
        T: DeserializeOwned,
        D: ResponseDecoder,
    {
        match self.payload::<T>()? {
            Some(bytes) => self.decode_bytes(bytes, decoder),
            None => {
                tracing::debug!(target_type = type_name::<T>(), "empty body for a required value");
                Err(Error::decode(
                    format!(
                        "unable to decode `{}` from a response: body was empty",
                        type_name::<T>()
                    ),
                    self,
                ))
            }
        }
    }

    /// Decode the body into `T`, treating an absent or empty body as `None`.
    ///
    /// The payload itself is decoded as `Option<T>`, so a JSON `null` is
    /// also `None`.
    pub fn decode_optional<T, D>(&self, decoder: &D) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        D: ResponseDecoder,
    {
        let decoded = self
            .payload::<T>()?
            .map(|bytes| self.decode_bytes::<Option<T>, D>(bytes, decoder))
            .transpose()?;
        Ok(decoded.flatten())
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        self.decode(&JsonDecoder::new())
    }

    /// Body as UTF-8 text, if present and valid.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|body| std::str::from_utf8(body).ok())
    }

    fn payload<T>(&self) -> Result<Option<&Bytes>> {
        if let Some(error) = &self.error {
            return Err(Error::decode(
                format!(
                    "unable to decode `{}` from a response carrying an error: {error}",
                    type_name::<T>()
                ),
                self,
            ));
        }
        Ok(self.body.as_ref().filter(|body| !body.is_empty()))
    }

    fn decode_bytes<T, D>(&self, bytes: &[u8], decoder: &D) -> Result<T>
    where
        T: DeserializeOwned,
        D: ResponseDecoder,
    {
        decoder.decode(bytes).map_err(|err| {
            tracing::debug!(error = %err, "response body could not be decoded");
            err.with_response(self)
        })
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Response")?;
        match &self.request {
            Some(request) => writeln!(f, "request: {} {}", request.method(), request.url())?,
            None => writeln!(f, "request: none")?,
        }
        match self.status {
            Some(status) => writeln!(f, "status: {status}")?,
            None => writeln!(f, "status: none")?,
        }
        match &self.headers {
            Some(headers) => {
                write!(f, "headers: ")?;
                f.debug_map().entries(headers.iter()).finish()?;
                writeln!(f)?;
            }
            None => writeln!(f, "headers: none")?,
        }
        match &self.body {
            Some(body) => writeln!(f, "body: {}", String::from_utf8_lossy(body))?,
            None => writeln!(f, "body: none")?,
        }
        match &self.error {
            Some(error) => write!(f, "error: {error}"),
            None => write!(f, "error: none"),
        }
    }
}
