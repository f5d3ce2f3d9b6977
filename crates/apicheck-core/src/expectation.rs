//! Expected-outcome model — one tagged expectation per scenario

use serde::{Deserialize, Serialize};

/// What a scenario expects back. Exactly one tag is active; the runner
/// selects the verifier family from the tag, so an error-status row can
/// never be wired to the semantic verifier by accident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VerificationExpectation {
    Success(SuccessExpectation),
    Error(ErrorExpectation),
}

impl VerificationExpectation {
    /// Expected HTTP status for this outcome.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Success(s) => s.http_status,
            Self::Error(e) => e.http_status,
        }
    }
}

/// Structural error expectation: the fixed error-envelope contract.
///
/// `error_code` / `error_description` left unset means a coarse
/// status-plus-shape check without value comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorExpectation {
    pub http_status: u16,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error_link_id: Option<String>,
}

impl ErrorExpectation {
    /// Status-only check; envelope values are not compared.
    #[must_use]
    pub fn status_only(http_status: u16) -> Self {
        Self {
            http_status,
            error_code: None,
            error_description: None,
            error_link_id: None,
        }
    }

    #[must_use]
    pub fn with_envelope(
        http_status: u16,
        code: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            http_status,
            error_code: Some(code.into()),
            error_description: Some(description.into()),
            error_link_id: None,
        }
    }
}

/// Semantic success expectation: zero or more query-derived predicates
/// over the session listing echoed by the response.
///
/// Date-times are RFC 3339 (`yyyy-MM-ddTHH:mm:ssZ`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuccessExpectation {
    #[serde(default = "default_success_status")]
    pub http_status: u16,
    #[serde(default)]
    pub session_type: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub judge_type: Option<String>,
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

fn default_success_status() -> u16 {
    200
}

impl SuccessExpectation {
    /// Status-only success; no semantic predicates.
    #[must_use]
    pub fn status_only(http_status: u16) -> Self {
        Self {
            http_status,
            ..Self::default()
        }
    }
}

/// The exact predicate subset active for a success scenario.
///
/// Classified eagerly from which optional fields are set. Subsets outside
/// this enumeration are rejected up front instead of verifying nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateCombination {
    TypeOnly,
    TypeDuration,
    TypeJudge,
    TypeLocation,
    TypeStart,
    TypeEnd,
    TypeStartEnd,
    TypeJudgeLocation,
    TypeStartEndDuration,
}

impl PredicateCombination {
    /// Classify the active predicate subset.
    ///
    /// `Ok(None)` means no predicates are set (status-class check only).
    ///
    /// # Errors
    ///
    /// `UnsupportedCombination` listing the set fields when the subset is
    /// not one of the supported nine.
    pub fn classify(
        exp: &SuccessExpectation,
    ) -> Result<Option<Self>, UnsupportedCombination> {
        let t = exp.session_type.is_some();
        let d = exp.duration.is_some();
        let j = exp.judge_type.is_some();
        let l = exp.location_id.is_some();
        let s = exp.start_date.is_some();
        let e = exp.end_date.is_some();

        match (t, d, j, l, s, e) {
            (false, false, false, false, false, false) => Ok(None),
            (true, false, false, false, false, false) => Ok(Some(Self::TypeOnly)),
            (true, true, false, false, false, false) => Ok(Some(Self::TypeDuration)),
            (true, false, true, false, false, false) => Ok(Some(Self::TypeJudge)),
            (true, false, false, true, false, false) => Ok(Some(Self::TypeLocation)),
            (true, false, false, false, true, false) => Ok(Some(Self::TypeStart)),
            (true, false, false, false, false, true) => Ok(Some(Self::TypeEnd)),
            (true, false, false, false, true, true) => Ok(Some(Self::TypeStartEnd)),
            (true, false, true, true, false, false) => Ok(Some(Self::TypeJudgeLocation)),
            (true, true, false, false, true, true) => Ok(Some(Self::TypeStartEndDuration)),
            _ => Err(UnsupportedCombination {
                fields: set_fields(t, d, j, l, s, e),
            }),
        }
    }
}

fn set_fields(t: bool, d: bool, j: bool, l: bool, s: bool, e: bool) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if t {
        fields.push("session_type");
    }
    if d {
        fields.push("duration");
    }
    if j {
        fields.push("judge_type");
    }
    if l {
        fields.push("location_id");
    }
    if s {
        fields.push("start_date");
    }
    if e {
        fields.push("end_date");
    }
    fields
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported predicate combination: {fields:?}")]
pub struct UnsupportedCombination {
    pub fields: Vec<&'static str>,
}
