//! Verification strategies — pluggable response judgment
//!
//! Two families share one capability: structural verification of the fixed
//! error envelope, and semantic verification of business fields. A failed
//! assertion carries the full raw body for triage and halts only the
//! current scenario.

mod error;
mod success;

pub use error::ErrorVerifier;
pub use success::SuccessVerifier;

use crate::expectation::{UnsupportedCombination, VerificationExpectation};
use crate::response::RawResponse;

/// The verification capability. Implementations are pure over the captured
/// response; no I/O, no retries.
pub trait Verifier {
    /// # Errors
    ///
    /// A `VerifyError` describing the first assertion that did not hold.
    fn verify(
        &self,
        expectation: &VerificationExpectation,
        response: &RawResponse,
    ) -> Result<(), VerifyError>;
}

/// Select the verifier family from the expectation tag.
///
/// The tag is the single source of truth: an error-status expectation can
/// only ever reach the structural verifier.
#[must_use]
pub fn verifier_for(expectation: &VerificationExpectation) -> &'static dyn Verifier {
    match expectation {
        VerificationExpectation::Success(_) => &SuccessVerifier,
        VerificationExpectation::Error(_) => &ErrorVerifier,
    }
}

/// Verify a response against an expectation with the matching strategy.
///
/// # Errors
///
/// Propagates the strategy's `VerifyError`.
pub fn verify(
    expectation: &VerificationExpectation,
    response: &RawResponse,
) -> Result<(), VerifyError> {
    verifier_for(expectation).verify(expectation, response)
}

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("status mismatch: expected {expected}, got {actual}; body: {body}")]
    StatusMismatch {
        expected: u16,
        actual: u16,
        body: String,
    },

    #[error("response body is not valid JSON: {detail}; body: {body}")]
    InvalidJson { detail: String, body: String },

    #[error("error envelope shape violation: {detail}; body: {body}")]
    EnvelopeShape { detail: String, body: String },

    #[error("{field}: expected {expected:?}, got {actual}; body: {body}")]
    ValueMismatch {
        field: String,
        expected: String,
        actual: String,
        body: String,
    },

    #[error("nothing extracted at {path}; body: {body}")]
    EmptyExtraction { path: String, body: String },

    #[error("extraction failed at {path}: {detail}")]
    Extraction { path: String, detail: String },

    #[error("predicate failed at {path}: {detail}; body: {body}")]
    PredicateFailed {
        path: String,
        detail: String,
        body: String,
    },

    #[error("unparsable date in {field}: {value:?}: {detail}")]
    BadDate {
        field: String,
        value: String,
        detail: String,
    },

    #[error(transparent)]
    UnsupportedPredicateCombination(#[from] UnsupportedCombination),

    #[error("{verifier} cannot verify a {got} expectation")]
    WrongExpectationKind {
        verifier: &'static str,
        got: &'static str,
    },
}
