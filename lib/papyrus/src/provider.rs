//! API provider.
//!
//! A [`Provider`] pairs a base URL with a transport and is what endpoint code
//! calls into: it hands out [`RequestBuilder`]s, sends the built requests and
//! validates and decodes the responses.

use serde::de::DeserializeOwned;
use tower::{Layer, Service, ServiceExt};

use crate::middleware::CurlLoggerLayer;
use crate::{Error, Method, ProviderConfig, Request, RequestBuilder, Response, Result};

/// Base URL, transport and shared request configuration.
///
/// The transport is any `tower::Service<Request, Response = Response, Error = Error>`.
///
/// # Example
///
/// ```ignore
/// use papyrus::{Method, Provider};
///
/// let provider = Provider::new("https://api.example.com", transport);
///
/// let builder = provider
///     .new_builder(Method::GET, "/people/{id}")
///     .parameter("id", 7);
/// let person: Option<Person> = provider.fetch_optional(builder).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Provider<S> {
    base_url: String,
    service: S,
    config: ProviderConfig,
}

impl<S> Provider<S> {
    /// Create a provider with the default configuration.
    #[must_use]
    pub fn new(base_url: impl Into<String>, service: S) -> Self {
        Self::with_config(base_url, service, ProviderConfig::default())
    }

    /// Create a provider with a custom configuration.
    #[must_use]
    pub fn with_config(base_url: impl Into<String>, service: S, config: ProviderConfig) -> Self {
        Self {
            base_url: base_url.into(),
            service,
            config,
        }
    }

    /// Base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Configuration.
    #[must_use]
    pub const fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Start a request, with the default headers and encoder applied.
    #[must_use]
    pub fn new_builder(&self, method: Method, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(self.base_url.clone(), method, path)
            .shared_encoder(self.config.field_encoder())
            .headers_from(self.config.default_headers.clone())
    }
}

impl<S> Provider<S>
where
    S: Service<Request, Response = Response, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    /// Build and send a request, then validate the response.
    pub async fn request(&self, builder: RequestBuilder) -> Result<Response> {
        let request = builder.build()?;
        let response = match &self.config.curl_logger {
            Some(logger) => {
                CurlLoggerLayer::from_logger(logger.clone())
                    .layer(self.service.clone())
                    .oneshot(request)
                    .await?
            }
            None => self.service.clone().oneshot(request).await?,
        };
        response.validate()
    }

    /// Send a request and decode the response body, which must be present.
    pub async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        self.request(builder).await?.decode(&self.config.decoder())
    }

    /// Send a request and decode the response body, if any.
    pub async fn fetch_optional<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<Option<T>> {
        self.request(builder)
            .await?
            .decode_optional(&self.config.decoder())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KeyMapping, UrlFormEncoder};

    #[test]
    fn new_builder_applies_config() {
        let config = ProviderConfig::builder()
            .default_header("User-Agent", "papyrus")
            .encoder(UrlFormEncoder::new())
            .build();
        let provider = Provider::with_config("https://api.example.com", (), config);

        let builder = provider.new_builder(Method::POST, "/people");
        assert_eq!(builder.base_url(), "https://api.example.com");
        assert_eq!(builder.headers().get("User-Agent"), Some("papyrus"));
        assert_eq!(
            builder.field_encoder().content_type(),
            "application/x-www-form-urlencoded"
        );
    }

    #[test]
    fn default_builder_is_json() {
        let config = ProviderConfig::builder()
            .key_mapping(KeyMapping::SnakeCase)
            .build();
        let provider = Provider::with_config("https://api.example.com", (), config);

        let request = provider
            .new_builder(Method::POST, "/people")
            .field("firstName", "Ada")
            .build()
            .expect("build");
        assert_eq!(
            request.body().map(|body| body.as_ref()),
            Some(&br#"{"first_name":"Ada"}"#[..])
        );
    }
}
