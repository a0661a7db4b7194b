//! Prelude module for convenient imports.
//!
//! ```ignore
//! use papyrus::prelude::*;
//! ```

pub use crate::middleware::{CurlLogger, CurlLoggerLayer, LogTrigger};
pub use crate::{
    Error, JsonDecoder, JsonEncoder, KeyMapping, Method, MultipartEncoder, Part, Provider,
    ProviderConfig, Request, RequestBuilder, Response, Result, UrlFormEncoder,
};

pub use serde::{Deserialize, Serialize};
