//! Captured HTTP response — read-only to everything downstream

use std::cell::OnceCell;

use serde_json::Value;

use crate::headers::HeaderSet;

/// One fully captured response: status, headers, raw body, and a lazily
/// parsed JSON document. Verifiers need random-access queries over the
/// body, so it is captured whole, never streamed.
#[derive(Debug)]
pub struct RawResponse {
    status_code: u16,
    headers: HeaderSet,
    body: String,
    parsed: OnceCell<Value>,
}

impl RawResponse {
    #[must_use]
    pub fn new(status_code: u16, headers: HeaderSet, body: impl Into<String>) -> Self {
        Self {
            status_code,
            headers,
            body: body.into(),
            parsed: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    /// Raw body text, exactly as received.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Body parsed as JSON. Parsed at most once; subsequent calls return
    /// the cached document.
    ///
    /// # Errors
    ///
    /// Returns the parse error if the body is not valid JSON.
    pub fn json(&self) -> Result<&Value, serde_json::Error> {
        if let Some(v) = self.parsed.get() {
            return Ok(v);
        }
        let v: Value = serde_json::from_str(&self.body)?;
        Ok(self.parsed.get_or_init(|| v))
    }
}
