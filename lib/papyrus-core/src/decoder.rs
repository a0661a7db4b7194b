//! Response body decoders.
//!
//! A [`ResponseDecoder`] turns raw body bytes into a typed value. Decoders
//! only see non-empty bodies; the absent/empty body rules live in
//! [`Response::decode`](crate::Response::decode) and
//! [`Response::decode_optional`](crate::Response::decode_optional).

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Error, KeyMapping, Result};

/// Strategy decoding response bodies.
pub trait ResponseDecoder {
    /// Decode body bytes into `T`.
    ///
    /// Unknown fields in the payload are ignored.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

/// JSON decoder with path-aware error messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder {
    key_mapping: KeyMapping,
}

impl JsonDecoder {
    /// Create a decoder reading keys unchanged.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this decoder using the given key mapping.
    ///
    /// The original decoder is left unchanged.
    #[must_use]
    pub const fn with_key_mapping(&self, key_mapping: KeyMapping) -> Self {
        Self { key_mapping }
    }

    /// Configured key mapping.
    #[must_use]
    pub const fn key_mapping(&self) -> KeyMapping {
        self.key_mapping
    }
}

fn path_error<E: std::fmt::Display>(err: &serde_path_to_error::Error<E>) -> Error {
    Error::decode_at(err.path().to_string(), err.inner().to_string())
}

impl ResponseDecoder for JsonDecoder {
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        if !self.key_mapping.rewrites_decoded_keys() {
            let mut deserializer = serde_json::Deserializer::from_slice(bytes);
            let value = serde_path_to_error::deserialize(&mut deserializer)
                .map_err(|e| path_error(&e))?;
            deserializer
                .end()
                .map_err(|e| Error::decode_at(".", e.to_string()))?;
            return Ok(value);
        }

        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| Error::decode_at(".", e.to_string()))?;
        let value = KeyMapping::map_keys(value, &|key: &str| self.key_mapping.decode_key(key));
        serde_path_to_error::deserialize(value).map_err(|e| path_error(&e))
    }
}

/// Decoder for `application/x-www-form-urlencoded` bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlFormDecoder;

impl ResponseDecoder for UrlFormDecoder {
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        serde_html_form::from_bytes(bytes).map_err(|e| Error::decode_at(".", e.to_string()))
    }
}
