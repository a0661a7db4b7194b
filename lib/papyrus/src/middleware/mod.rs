//! Tower middleware for papyrus transports.
//!
//! A transport is any `tower::Service<Request, Response = Response, Error = Error>`.
//! Middleware layers wrap it using Tower's `Layer` trait.
//!
//! # Available Layers
//!
//! - [`CurlLoggerLayer`] - emits a curl reproduction of each request, for
//!   every call ([`LogTrigger::Always`]) or failed calls only
//!   ([`LogTrigger::OnError`])
//!
//! The same behavior is available without Tower through
//! [`CurlLogger::intercept`].
//!
//! # Example
//!
//! ```ignore
//! use papyrus::middleware::{CurlLoggerLayer, LogTrigger, ServiceBuilder};
//!
//! let transport = ServiceBuilder::new()
//!     .layer(CurlLoggerLayer::new(LogTrigger::Always))
//!     .service(my_transport);
//! ```

mod curl;

pub use curl::{CurlLogger, CurlLoggerLayer, CurlLogging, LogTrigger};

// Re-export tower types for convenience
pub use tower::{Layer, ServiceBuilder};
