//! Semantic verification of the session-listing echo
//!
//! A success scenario with query predicates asserts that **every** element
//! of the response's session array satisfies each active predicate. The
//! active subset is classified eagerly; an unlisted subset fails loudly
//! instead of verifying nothing.

use jsonpath_lib::select;
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::expectation::{PredicateCombination, SuccessExpectation, VerificationExpectation};
use crate::response::RawResponse;

use super::{Verifier, VerifyError};

const TYPE_PATH: &str = "$.sessions[*].sessionType";
const DURATION_PATH: &str = "$.sessions[*].sessionDuration";
const JUDGE_PATH: &str = "$.sessions[*].judgeType";
const LOCATION_PATH: &str = "$.sessions[*].locationId";
const START_TIME_PATH: &str = "$.sessions[*].sessionStartTime";

/// Verifies status plus the query-parameter echo over the session array.
pub struct SuccessVerifier;

impl Verifier for SuccessVerifier {
    fn verify(
        &self,
        expectation: &VerificationExpectation,
        response: &RawResponse,
    ) -> Result<(), VerifyError> {
        let VerificationExpectation::Success(exp) = expectation else {
            return Err(VerifyError::WrongExpectationKind {
                verifier: "SuccessVerifier",
                got: "error",
            });
        };

        if response.status_code() != exp.http_status {
            return Err(VerifyError::StatusMismatch {
                expected: exp.http_status,
                actual: response.status_code(),
                body: response.body().to_string(),
            });
        }

        // Rejects unsupported subsets before any extraction happens.
        let Some(_combination) = PredicateCombination::classify(exp)? else {
            return Ok(());
        };

        let doc = response.json().map_err(|e| VerifyError::InvalidJson {
            detail: e.to_string(),
            body: response.body().to_string(),
        })?;

        check_predicates(exp, doc, response.body())
    }
}

fn check_predicates(exp: &SuccessExpectation, doc: &Value, body: &str) -> Result<(), VerifyError> {
    if let Some(session_type) = &exp.session_type {
        all_equal_str(doc, TYPE_PATH, session_type, body)?;
    }
    if let Some(duration) = exp.duration {
        all_equal_i64(doc, DURATION_PATH, duration, body)?;
    }
    if let Some(judge_type) = &exp.judge_type {
        all_equal_str(doc, JUDGE_PATH, judge_type, body)?;
    }
    if let Some(location_id) = &exp.location_id {
        all_equal_str(doc, LOCATION_PATH, location_id, body)?;
    }
    if let Some(start) = &exp.start_date {
        let bound = parse_date("start_date", start)?;
        all_dates(doc, START_TIME_PATH, body, |t| t >= bound, "on or after", start)?;
    }
    if let Some(end) = &exp.end_date {
        let bound = parse_date("end_date", end)?;
        all_dates(doc, START_TIME_PATH, body, |t| t <= bound, "on or before", end)?;
    }
    Ok(())
}

fn extract<'a>(doc: &'a Value, path: &str, body: &str) -> Result<Vec<&'a Value>, VerifyError> {
    let values = select(doc, path).map_err(|e| VerifyError::Extraction {
        path: path.to_string(),
        detail: e.to_string(),
    })?;
    if values.is_empty() {
        return Err(VerifyError::EmptyExtraction {
            path: path.to_string(),
            body: body.to_string(),
        });
    }
    Ok(values)
}

fn all_equal_str(doc: &Value, path: &str, expected: &str, body: &str) -> Result<(), VerifyError> {
    for value in extract(doc, path, body)? {
        if value.as_str() != Some(expected) {
            return Err(VerifyError::ValueMismatch {
                field: path.to_string(),
                expected: expected.to_string(),
                actual: value.to_string(),
                body: body.to_string(),
            });
        }
    }
    Ok(())
}

fn all_equal_i64(doc: &Value, path: &str, expected: i64, body: &str) -> Result<(), VerifyError> {
    for value in extract(doc, path, body)? {
        if value.as_i64() != Some(expected) {
            return Err(VerifyError::ValueMismatch {
                field: path.to_string(),
                expected: expected.to_string(),
                actual: value.to_string(),
                body: body.to_string(),
            });
        }
    }
    Ok(())
}

fn all_dates(
    doc: &Value,
    path: &str,
    body: &str,
    holds: impl Fn(OffsetDateTime) -> bool,
    relation: &str,
    bound_text: &str,
) -> Result<(), VerifyError> {
    for value in extract(doc, path, body)? {
        let text = value.as_str().ok_or_else(|| VerifyError::PredicateFailed {
            path: path.to_string(),
            detail: format!("non-string date-time: {value}"),
            body: body.to_string(),
        })?;
        let t = parse_date(path, text)?;
        if !holds(t) {
            return Err(VerifyError::PredicateFailed {
                path: path.to_string(),
                detail: format!("{text} is not {relation} {bound_text}"),
                body: body.to_string(),
            });
        }
    }
    Ok(())
}

fn parse_date(field: &str, value: &str) -> Result<OffsetDateTime, VerifyError> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|e| VerifyError::BadDate {
        field: field.to_string(),
        value: value.to_string(),
        detail: e.to_string(),
    })
}
