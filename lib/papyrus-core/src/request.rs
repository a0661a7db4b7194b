//! HTTP request type.
//!
//! A [`Request`] is the immutable snapshot produced by
//! [`RequestBuilder::build`](crate::RequestBuilder::build) and handed to a transport.

use bytes::Bytes;
use http::Method;
use url::Url;

use crate::Headers;

/// An HTTP request with method, URL, headers, and optional body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    url: Url,
    headers: Headers,
    body: Option<Bytes>,
}

impl Request {
    /// Creates a request from its parts.
    #[must_use]
    pub const fn from_parts(
        method: Method,
        url: Url,
        headers: Headers,
        body: Option<Bytes>,
    ) -> Self {
        Self {
            method,
            url,
            headers,
            body,
        }
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Request URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Request headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Single header value by name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Consume into (method, url, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (Method, Url, Headers, Option<Bytes>) {
        (self.method, self.url, self.headers, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_parts() {
        let url = Url::parse("https://api.example.com/users").expect("valid URL");
        let headers: Headers = [("Accept", "application/json")].into_iter().collect();
        let body = Bytes::from(r#"{"name":"test"}"#);

        let request = Request::from_parts(Method::POST, url, headers, Some(body.clone()));

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.url().as_str(), "https://api.example.com/users");
        assert_eq!(request.header("accept"), Some("application/json"));
        assert_eq!(request.body(), Some(&body));

        let (method, _, headers, body) = request.into_parts();
        assert_eq!(method, Method::POST);
        assert_eq!(headers.len(), 1);
        assert!(body.is_some());
    }
}
