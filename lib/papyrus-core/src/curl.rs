//! Curl command rendering.
//!
//! Renders a [`Request`] as a shell command reproducing it:
//!
//! ```text
//! curl '{url}' \
//! -X {method} \
//! -H '{name}: {value}' \
//! -d '{body}'
//! ```
//!
//! Values are wrapped in single quotes as-is. This is a debugging aid, not a
//! shell-safe serializer.

use crate::Request;

impl Request {
    /// Render this request as a curl command.
    ///
    /// With `sorted_headers`, header lines are sorted by name; otherwise they
    /// keep insertion order. The body, when present, is rendered as lossy
    /// UTF-8 text.
    #[must_use]
    pub fn curl(&self, sorted_headers: bool) -> String {
        let headers = if sorted_headers {
            self.headers().sorted()
        } else {
            self.headers().iter().collect()
        };

        let mut lines = Vec::with_capacity(headers.len() + 3);
        lines.push(format!("curl '{}'", self.url()));
        lines.push(format!("-X {}", self.method()));
        lines.extend(
            headers
                .into_iter()
                .map(|(name, value)| format!("-H '{name}: {value}'")),
        );
        if let Some(body) = self.body() {
            lines.push(format!("-d '{}'", String::from_utf8_lossy(body)));
        }
        lines.join(" \\\n")
    }
}
