//! Core types for the papyrus declarative HTTP client.
//!
//! This crate turns endpoint calls into requests and responses into values,
//! without doing any I/O:
//! - [`RequestBuilder`] - accumulates method, path, queries, headers and fields
//! - [`FieldEncoder`] - [`JsonEncoder`], [`UrlFormEncoder`] and [`MultipartEncoder`]
//! - [`Request`] - immutable built request, renderable with [`Request::curl`]
//! - [`Response`] - optional status, headers, body and error, with
//!   [`Response::validate`], [`Response::decode`] and [`Response::decode_optional`]
//! - [`ResponseDecoder`] - [`JsonDecoder`] and [`UrlFormDecoder`]
//! - [`Error`] and [`Result`] - error handling
//! - [`Method`] and [`StatusCode`] - re-exported from the `http` crate

mod builder;
mod curl;
mod decoder;
mod encoder;
mod error;
mod headers;
mod multipart;
pub mod prelude;
mod request;
mod response;

pub use builder::{RequestBuilder, join_path};
pub use decoder::{JsonDecoder, ResponseDecoder, UrlFormDecoder};
pub use encoder::{FieldEncoder, FieldValue, JsonEncoder, KeyMapping, UrlFormEncoder};
pub use error::{Error, Result};
pub use headers::Headers;
pub use multipart::{MultipartEncoder, Part};
pub use request::Request;
pub use response::Response;

// Re-export http crate types for methods and status codes
pub use http::{Method, StatusCode};
