//! Blocking HTTP dispatch of one request descriptor
//!
//! One call per scenario, no retries. Headers are appended entry by entry
//! so deliberate duplicates reach the wire instead of collapsing in a map.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use apicheck_core::headers::HeaderSet;
use apicheck_core::request::{Method, RequestDescriptor};
use apicheck_core::response::RawResponse;

/// Executes descriptors over a shared blocking client.
pub struct Executor {
    client: reqwest::blocking::Client,
}

impl Executor {
    /// # Errors
    ///
    /// `ExecuteError::Client` if the underlying client cannot be built.
    pub fn new() -> Result<Self, ExecuteError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| ExecuteError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    /// Dispatch exactly one synchronous call and capture the full response.
    ///
    /// # Errors
    ///
    /// `ExecuteError::Transport` with the target URL on any connection or
    /// read failure. Fatal to the scenario; never retried.
    pub fn execute(&self, descriptor: &RequestDescriptor) -> Result<RawResponse, ExecuteError> {
        let mut req = self
            .client
            .request(reqwest_method(descriptor.method), &descriptor.target_url)
            .headers(to_header_map(&descriptor.headers));

        for (name, value) in &descriptor.query_params {
            req = req.query(&[(name, value)]);
        }
        if let Some(token) = &descriptor.auth_token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = &descriptor.body {
            req = req.body(body.clone());
        }

        let resp = req.send().map_err(|e| ExecuteError::Transport {
            url: descriptor.target_url.clone(),
            detail: e.to_string(),
        })?;

        let status = resp.status().as_u16();
        let headers = from_header_map(resp.headers());

        // Full capture: verifiers need random-access queries over the body.
        let body = resp.text().map_err(|e| ExecuteError::Transport {
            url: descriptor.target_url.clone(),
            detail: e.to_string(),
        })?;

        Ok(RawResponse::new(status, headers, body))
    }
}

const fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Options => reqwest::Method::OPTIONS,
        Method::Trace => reqwest::Method::TRACE,
    }
}

/// Append-convert a header set. Null-valued entries are skipped (a null
/// header cannot be sent); names or values invalid in HTTP are skipped the
/// same way — they would never reach the server anyway.
fn to_header_map(headers: &HeaderSet) -> HeaderMap {
    let mut map = HeaderMap::new();
    for entry in headers {
        let Some(value) = &entry.value else {
            continue;
        };
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(entry.name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            map.append(name, value);
        }
    }
    map
}

fn from_header_map(map: &HeaderMap) -> HeaderSet {
    let mut set = HeaderSet::new();
    for (name, value) in map {
        set.push(
            name.as_str().to_string(),
            value.to_str().ok().map(str::to_string),
        );
    }
    set
}

#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    #[error("HTTP client error: {0}")]
    Client(String),
    #[error("transport failure for {url}: {detail}")]
    Transport { url: String, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_entries_survive_conversion() {
        let mut set = HeaderSet::new();
        set.push("Source-System", Some("CFT".to_string()));
        set.push("Source-System", Some("X".to_string()));
        let map = to_header_map(&set);
        let values: Vec<_> = map.get_all("Source-System").iter().collect();
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn null_entries_are_skipped() {
        let mut set = HeaderSet::new();
        set.push("Source-System", None);
        set.push("Accept", Some("application/json".to_string()));
        let map = to_header_map(&set);
        assert!(map.get("Source-System").is_none());
        assert!(map.get("Accept").is_some());
    }

    #[test]
    fn blank_entries_are_sent() {
        let mut set = HeaderSet::new();
        set.push("Source-System", Some(String::new()));
        let map = to_header_map(&set);
        assert_eq!(map.get("Source-System").map(|v| v.len()), Some(0));
    }

    #[test]
    fn truncated_key_is_a_valid_header_name() {
        let mut set = HeaderSet::new();
        set.push("Accep", Some("application/json".to_string()));
        let map = to_header_map(&set);
        assert!(map.get("Accep").is_some());
    }

    #[test]
    fn all_six_methods_map() {
        assert_eq!(reqwest_method(Method::Get), reqwest::Method::GET);
        assert_eq!(reqwest_method(Method::Post), reqwest::Method::POST);
        assert_eq!(reqwest_method(Method::Put), reqwest::Method::PUT);
        assert_eq!(reqwest_method(Method::Delete), reqwest::Method::DELETE);
        assert_eq!(reqwest_method(Method::Options), reqwest::Method::OPTIONS);
        assert_eq!(reqwest_method(Method::Trace), reqwest::Method::TRACE);
    }

    #[test]
    fn response_headers_round_trip_into_header_set() {
        let mut map = HeaderMap::new();
        map.append("content-type", HeaderValue::from_static("application/json"));
        let set = from_header_map(&map);
        assert_eq!(set.get("Content-Type"), Some("application/json"));
    }
}
