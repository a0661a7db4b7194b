//! Error types for papyrus.

use derive_more::{Display, Error};

use crate::{Request, Response};

/// Main error type for papyrus operations.
///
/// Every error is terminal for the current call: nothing in this crate retries.
/// Errors keep the originating [`Request`] or [`Response`] when one is known,
/// see [`Error::request`] and [`Error::response`].
#[derive(Debug, Clone, Display, Error)]
pub enum Error {
    /// The base URL and path did not form a valid absolute URL.
    #[display("invalid URL '{url}': {source}")]
    InvalidUrl {
        /// The URL string that failed to parse.
        url: String,
        /// Parser error.
        source: url::ParseError,
    },

    /// The request fields or body could not be encoded.
    #[display("encoding error: {_0}")]
    Encoding(#[error(not(source))] String),

    /// The response body could not be decoded into the requested type.
    #[display("{message}")]
    Decode {
        /// Error message.
        message: String,
        /// Location of the failure inside the payload (e.g. `user.address.city`).
        path: Option<String>,
        /// The response being decoded.
        response: Option<Box<Response>>,
    },

    /// The response carried a status code outside `200..=299`.
    #[display("Unsuccessful status code: {status}.")]
    Validation {
        /// HTTP status code.
        status: u16,
        /// The rejected response.
        response: Box<Response>,
    },

    /// The transport failed to produce a response.
    #[display("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// The request being sent, if known.
        request: Option<Box<Request>>,
    },
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an encoding error.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding(message.into())
    }

    /// Create a decode error attached to a response.
    #[must_use]
    pub fn decode(message: impl Into<String>, response: &Response) -> Self {
        Self::Decode {
            message: message.into(),
            path: None,
            response: Some(Box::new(response.clone())),
        }
    }

    /// Create a decode error for a payload that failed at the given path.
    #[must_use]
    pub fn decode_at(path: impl Into<String>, message: impl Into<String>) -> Self {
        let path = path.into();
        let message = message.into();
        Self::Decode {
            message: if path.is_empty() || path == "." {
                message
            } else {
                format!("{message} at '{path}'")
            },
            path: Some(path),
            response: None,
        }
    }

    /// Create a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            request: None,
        }
    }

    /// Attach the originating request to a transport error.
    ///
    /// Other variants are returned unchanged.
    #[must_use]
    pub fn with_request(self, request: &Request) -> Self {
        match self {
            Self::Transport { message, .. } => Self::Transport {
                message,
                request: Some(Box::new(request.clone())),
            },
            other => other,
        }
    }

    /// Attach the response a decode error was raised for.
    ///
    /// Other variants are returned unchanged.
    #[must_use]
    pub fn with_response(self, response: &Response) -> Self {
        match self {
            Self::Decode { message, path, .. } => Self::Decode {
                message,
                path,
                response: Some(Box::new(response.clone())),
            },
            other => other,
        }
    }

    /// The request this error originated from, if known.
    #[must_use]
    pub fn request(&self) -> Option<&Request> {
        match self {
            Self::Transport { request, .. } => request.as_deref(),
            Self::Decode { response, .. } => response.as_deref().and_then(Response::request),
            Self::Validation { response, .. } => response.request(),
            Self::InvalidUrl { .. } | Self::Encoding(_) => None,
        }
    }

    /// The response this error originated from, if known.
    #[must_use]
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Decode { response, .. } => response.as_deref(),
            Self::Validation { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Returns the HTTP status code if this is a validation error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Validation { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this is a decode error.
    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// Returns `true` if this is an encoding error.
    #[must_use]
    pub const fn is_encoding(&self) -> bool {
        matches!(self, Self::Encoding(_))
    }

    /// Returns `true` if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns `true` if this is a transport error.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::*;

    #[test]
    fn error_display() {
        let err = Error::encoding("parts need a multipart encoder");
        assert_eq!(
            err.to_string(),
            "encoding error: parts need a multipart encoder"
        );

        let err = Error::transport("connection reset");
        assert_eq!(err.to_string(), "transport error: connection reset");

        let err = Error::Validation {
            status: 404,
            response: Box::new(Response::new().with_status(404)),
        };
        assert_eq!(err.to_string(), "Unsuccessful status code: 404.");
    }

    #[test]
    fn decode_at_formats_path() {
        let err = Error::decode_at("user.address", "missing field `city`");
        assert_eq!(
            err.to_string(),
            "missing field `city` at 'user.address'"
        );

        let err = Error::decode_at(".", "expected value");
        assert_eq!(err.to_string(), "expected value");
    }

    #[test]
    fn invalid_url_keeps_source() {
        let source = url::Url::parse("no scheme").expect_err("relative URL");
        let err = Error::InvalidUrl {
            url: "no scheme".to_string(),
            source,
        };
        check!(std::error::Error::source(&err).is_some());
        check!(err.to_string().starts_with("invalid URL 'no scheme'"));
    }

    #[test]
    fn context_accessors() {
        let response = Response::new().with_status(500);
        let err = Error::decode("body was empty", &response);
        check!(err.is_decode());
        check!(err.response().and_then(Response::status) == Some(500));
        check!(err.request().is_none());

        let err = Error::Validation {
            status: 500,
            response: Box::new(response),
        };
        check!(err.status() == Some(500));
        check!(err.is_validation());
    }

    #[test]
    fn with_response_only_touches_decode_errors() {
        let response = Response::new().with_status(200);

        let err = Error::decode_at("name", "invalid type").with_response(&response);
        let_assert!(Error::Decode { path, response: Some(attached), .. } = err);
        check!(path.as_deref() == Some("name"));
        check!(attached.status() == Some(200));

        let err = Error::encoding("nope").with_response(&response);
        check!(err.response().is_none());
    }
}
