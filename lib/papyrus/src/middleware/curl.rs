//! Curl logging middleware.
//!
//! Renders each request as a curl command (see [`Request::curl`]) and emits it
//! either for every call or only for calls that fail.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tower::{Layer, Service};

use crate::{Error, Request, Response, Result};

/// When the curl command is emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogTrigger {
    /// Emit once for every call, whatever its outcome.
    #[default]
    Always,
    /// Emit only when the wrapped call returns an error.
    OnError,
}

type Sink = Arc<dyn Fn(&str) + Send + Sync>;

/// Interceptor emitting curl reproductions of requests.
///
/// # Example
///
/// ```ignore
/// use papyrus::middleware::{CurlLogger, LogTrigger};
///
/// let logger = CurlLogger::with_sink(LogTrigger::OnError, |curl| eprintln!("{curl}"));
/// let response = logger.intercept(request, |req| transport.call(req)).await?;
/// ```
#[derive(Clone)]
pub struct CurlLogger {
    trigger: LogTrigger,
    sink: Sink,
}

impl fmt::Debug for CurlLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurlLogger")
            .field("trigger", &self.trigger)
            .finish_non_exhaustive()
    }
}

impl Default for CurlLogger {
    fn default() -> Self {
        Self::new(LogTrigger::default())
    }
}

impl CurlLogger {
    /// Create a logger emitting through `tracing` at info level, on the
    /// `papyrus::curl` target.
    #[must_use]
    pub fn new(trigger: LogTrigger) -> Self {
        Self::with_sink(trigger, |curl| {
            tracing::info!(target: "papyrus::curl", "{curl}");
        })
    }

    /// Create a logger emitting through a custom sink.
    #[must_use]
    pub fn with_sink(trigger: LogTrigger, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self {
            trigger,
            sink: Arc::new(sink),
        }
    }

    /// Configured trigger.
    #[must_use]
    pub const fn trigger(&self) -> LogTrigger {
        self.trigger
    }

    /// Run `next` with the request, emitting the curl command per the trigger.
    ///
    /// The result of `next` is returned unchanged, errors included.
    pub async fn intercept<F, Fut>(&self, request: Request, next: F) -> Result<Response>
    where
        F: FnOnce(Request) -> Fut,
        Fut: Future<Output = Result<Response>>,
    {
        let failed_request = match self.trigger {
            LogTrigger::Always => {
                (self.sink)(&request.curl(true));
                None
            }
            LogTrigger::OnError => Some(request.clone()),
        };

        let result = next(request).await;

        if let (Err(err), Some(request)) = (&result, failed_request) {
            tracing::debug!(error = %err, "request failed, emitting curl command");
            (self.sink)(&request.curl(true));
        }
        result
    }
}

/// Layer wrapping a transport with a [`CurlLogger`].
///
/// # Example
///
/// ```ignore
/// use papyrus::middleware::{CurlLoggerLayer, LogTrigger};
/// use tower::ServiceBuilder;
///
/// let service = ServiceBuilder::new()
///     .layer(CurlLoggerLayer::new(LogTrigger::OnError))
///     .service(transport);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CurlLoggerLayer {
    logger: CurlLogger,
}

impl CurlLoggerLayer {
    /// Create a layer emitting through `tracing`.
    #[must_use]
    pub fn new(trigger: LogTrigger) -> Self {
        Self {
            logger: CurlLogger::new(trigger),
        }
    }

    /// Create a layer from a configured logger.
    #[must_use]
    pub const fn from_logger(logger: CurlLogger) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for CurlLoggerLayer {
    type Service = CurlLogging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CurlLogging {
            inner,
            logger: self.logger.clone(),
        }
    }
}

/// Service emitting curl commands around an inner transport.
#[derive(Debug, Clone)]
pub struct CurlLogging<S> {
    inner: S,
    logger: CurlLogger,
}

impl<S> Service<Request> for CurlLogging<S>
where
    S: Service<Request, Response = Response, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let mut inner = self.inner.clone();
        let logger = self.logger.clone();

        Box::pin(async move { logger.intercept(request, |req| inner.call(req)).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_trigger_is_always() {
        assert_eq!(CurlLogger::default().trigger(), LogTrigger::Always);
    }

    #[test]
    fn layer_keeps_logger() {
        let layer = CurlLoggerLayer::new(LogTrigger::OnError);
        assert_eq!(layer.logger.trigger(), LogTrigger::OnError);
    }

    #[test]
    fn debug_hides_sink() {
        let logger = CurlLogger::with_sink(LogTrigger::Always, |_| {});
        assert_eq!(
            format!("{logger:?}"),
            "CurlLogger { trigger: Always, .. }"
        );
    }
}
