//! Declarative HTTP client core.
//!
//! Endpoint code builds a request with a [`RequestBuilder`], sends it through
//! a [`Provider`] and gets back a validated, decoded value. The transport is
//! any Tower service; papyrus does no network I/O itself.
//!
//! # Example
//!
//! ```ignore
//! use papyrus::prelude::*;
//!
//! #[derive(Debug, Deserialize)]
//! pub struct Person {
//!     name: String,
//! }
//!
//! let provider = Provider::with_config(
//!     "https://api.example.com",
//!     transport,
//!     ProviderConfig::builder()
//!         .curl_logger(CurlLogger::new(LogTrigger::OnError))
//!         .build(),
//! );
//!
//! let person: Person = provider
//!     .fetch(provider.new_builder(Method::GET, "/people/{id}").parameter("id", 1))
//!     .await?;
//! ```

mod config;
pub mod middleware;
pub mod prelude;
mod provider;

pub use config::{ProviderConfig, ProviderConfigBuilder};
pub use provider::Provider;

// Re-export core types
pub use papyrus_core::{
    Error, FieldEncoder, FieldValue, Headers, JsonDecoder, JsonEncoder, KeyMapping, Method,
    MultipartEncoder, Part, Request, RequestBuilder, Response, ResponseDecoder, Result,
    StatusCode, UrlFormDecoder, UrlFormEncoder, join_path,
};

// Re-export tower for transport composition
pub use tower;
