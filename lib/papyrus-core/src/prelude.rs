//! Prelude module for convenient imports.
//!
//! ```ignore
//! use papyrus_core::prelude::*;
//! ```

pub use crate::{
    Error, FieldEncoder, Headers, JsonDecoder, JsonEncoder, KeyMapping, Method, MultipartEncoder,
    Part, Request, RequestBuilder, Response, ResponseDecoder, Result, UrlFormDecoder,
    UrlFormEncoder,
};
