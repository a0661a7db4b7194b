//! Provider configuration types.

use std::sync::Arc;

use papyrus_core::{FieldEncoder, Headers, JsonDecoder, JsonEncoder, KeyMapping};

use crate::middleware::CurlLogger;

/// Configuration shared by every request a [`Provider`](crate::Provider) sends.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    /// Headers added to every request.
    pub default_headers: Headers,
    /// Field encoder for new builders. `None` selects JSON with
    /// [`key_mapping`](Self::key_mapping).
    pub encoder: Option<Arc<dyn FieldEncoder>>,
    /// Key mapping for the default JSON encoder and the response decoder.
    pub key_mapping: KeyMapping,
    /// Curl logger wrapped around the transport, if any.
    pub curl_logger: Option<CurlLogger>,
}

impl ProviderConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> ProviderConfigBuilder {
        ProviderConfigBuilder::default()
    }

    /// Field encoder for new builders.
    #[must_use]
    pub fn field_encoder(&self) -> Arc<dyn FieldEncoder> {
        self.encoder.clone().unwrap_or_else(|| {
            Arc::new(JsonEncoder::new().with_key_mapping(self.key_mapping))
        })
    }

    /// Decoder for response bodies.
    #[must_use]
    pub fn decoder(&self) -> JsonDecoder {
        JsonDecoder::new().with_key_mapping(self.key_mapping)
    }
}

/// Builder for [`ProviderConfig`].
#[derive(Debug, Clone, Default)]
pub struct ProviderConfigBuilder {
    default_headers: Headers,
    encoder: Option<Arc<dyn FieldEncoder>>,
    key_mapping: Option<KeyMapping>,
    curl_logger: Option<CurlLogger>,
}

impl ProviderConfigBuilder {
    /// Add a header sent with every request.
    #[must_use]
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.append(name, value);
        self
    }

    /// Set the field encoder for new builders.
    #[must_use]
    pub fn encoder(mut self, encoder: impl FieldEncoder + 'static) -> Self {
        self.encoder = Some(Arc::new(encoder));
        self
    }

    /// Set the key mapping.
    #[must_use]
    pub const fn key_mapping(mut self, key_mapping: KeyMapping) -> Self {
        self.key_mapping = Some(key_mapping);
        self
    }

    /// Log every request, or failed requests only, as curl commands.
    #[must_use]
    pub fn curl_logger(mut self, logger: CurlLogger) -> Self {
        self.curl_logger = Some(logger);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ProviderConfig {
        let defaults = ProviderConfig::default();
        ProviderConfig {
            default_headers: self.default_headers,
            encoder: self.encoder.or(defaults.encoder),
            key_mapping: self.key_mapping.unwrap_or(defaults.key_mapping),
            curl_logger: self.curl_logger.or(defaults.curl_logger),
        }
    }
}
