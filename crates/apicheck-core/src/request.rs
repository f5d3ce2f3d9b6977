//! Request descriptor — one immutable value per scenario dispatch

use serde::{Deserialize, Serialize};

use crate::headers::HeaderSet;

/// HTTP method under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Options,
    Trace,
}

impl Method {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
        }
    }

    /// Resolve the method class once; verifier selection and body rules
    /// key off this instead of re-matching the method everywhere.
    #[must_use]
    pub const fn class(self) -> MethodClass {
        match self {
            Self::Post | Self::Put | Self::Delete => MethodClass::Mutating,
            Self::Get => MethodClass::Idempotent,
            // TRACE carries no body and no semantic response contract;
            // routes are expected to reject it at the transport level.
            Self::Options | Self::Trace => MethodClass::Preflight,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dispatch class of a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodClass {
    /// POST / PUT / DELETE — carries a body.
    Mutating,
    /// GET — no body, semantic response.
    Idempotent,
    /// OPTIONS / TRACE — no body, route-level response only.
    Preflight,
}

/// Immutable description of one HTTP call: everything the executor needs,
/// plus the status the scenario expects back.
///
/// Built per scenario row, owned by that row, discarded after the call.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub target_url: String,
    pub headers: HeaderSet,
    pub body: Option<String>,
    pub query_params: Vec<(String, String)>,
    pub auth_token: Option<String>,
    pub expected_status: u16,
}

impl RequestDescriptor {
    #[must_use]
    pub fn builder(method: Method, target_url: impl Into<String>) -> RequestDescriptorBuilder {
        RequestDescriptorBuilder {
            method,
            target_url: target_url.into(),
            headers: HeaderSet::new(),
            body: None,
            query_params: Vec::new(),
            auth_token: None,
            expected_status: None,
        }
    }
}

/// Builder enforcing the descriptor invariants at `build` time.
#[derive(Debug)]
pub struct RequestDescriptorBuilder {
    method: Method,
    target_url: String,
    headers: HeaderSet,
    body: Option<String>,
    query_params: Vec<(String, String)>,
    auth_token: Option<String>,
    expected_status: Option<u16>,
}

impl RequestDescriptorBuilder {
    #[must_use]
    pub fn headers(mut self, headers: HeaderSet) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn expected_status(mut self, status: u16) -> Self {
        self.expected_status = Some(status);
        self
    }

    /// # Errors
    ///
    /// `DescriptorError::MissingExpectedStatus` if no expected status was
    /// set; `DescriptorError::MissingBody` if a mutating method has no body.
    pub fn build(self) -> Result<RequestDescriptor, DescriptorError> {
        let expected_status = self
            .expected_status
            .ok_or(DescriptorError::MissingExpectedStatus)?;

        if self.body.is_none() && self.method.class() == MethodClass::Mutating {
            return Err(DescriptorError::MissingBody {
                method: self.method,
            });
        }

        Ok(RequestDescriptor {
            method: self.method,
            target_url: self.target_url,
            headers: self.headers,
            body: self.body,
            query_params: self.query_params,
            auth_token: self.auth_token,
            expected_status,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("expected status must be set before dispatch")]
    MissingExpectedStatus,
    #[error("{method} requires a body")]
    MissingBody { method: Method },
}
