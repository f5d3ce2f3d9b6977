//! Structural verification of the fixed error envelope
//!
//! Every error response, regardless of endpoint, must be a flat JSON object
//! with exactly the three envelope keys. Any deviation is a failure, not a
//! warning.

use std::sync::OnceLock;

use serde_json::Value;

use crate::expectation::{ErrorExpectation, VerificationExpectation};
use crate::response::RawResponse;

use super::{Verifier, VerifyError};

const ERR_CODE: &str = "errCode";
const ERROR_DESC: &str = "errorDesc";
const ERROR_LINK_ID: &str = "errorLinkId";

/// Verifies status plus the fixed three-key error envelope.
pub struct ErrorVerifier;

impl Verifier for ErrorVerifier {
    fn verify(
        &self,
        expectation: &VerificationExpectation,
        response: &RawResponse,
    ) -> Result<(), VerifyError> {
        let VerificationExpectation::Error(exp) = expectation else {
            return Err(VerifyError::WrongExpectationKind {
                verifier: "ErrorVerifier",
                got: "success",
            });
        };

        if response.status_code() != exp.http_status {
            return Err(VerifyError::StatusMismatch {
                expected: exp.http_status,
                actual: response.status_code(),
                body: response.body().to_string(),
            });
        }

        // Coarse-grained check: no envelope values to compare, status was
        // the whole assertion (e.g. gateway 401s with foreign bodies).
        if exp.error_code.is_none() && exp.error_description.is_none() {
            return Ok(());
        }

        let doc = response.json().map_err(|e| VerifyError::InvalidJson {
            detail: e.to_string(),
            body: response.body().to_string(),
        })?;

        check_envelope_shape(doc, response.body())?;
        check_values(exp, doc, response.body())
    }
}

/// Exactly three keys, flat object, nothing extra or missing.
fn check_envelope_shape(doc: &Value, body: &str) -> Result<(), VerifyError> {
    let validator = envelope_validator();
    let errors: Vec<String> = validator.iter_errors(doc).map(|e| e.to_string()).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(VerifyError::EnvelopeShape {
            detail: errors.join("; "),
            body: body.to_string(),
        })
    }
}

fn check_values(exp: &ErrorExpectation, doc: &Value, body: &str) -> Result<(), VerifyError> {
    if let Some(expected) = &exp.error_code {
        check_field(doc, ERR_CODE, expected, body)?;
    }
    if let Some(expected) = &exp.error_description {
        check_field(doc, ERROR_DESC, expected, body)?;
    }
    if let Some(expected) = &exp.error_link_id {
        check_field(doc, ERROR_LINK_ID, expected, body)?;
    }
    Ok(())
}

fn check_field(doc: &Value, field: &str, expected: &str, body: &str) -> Result<(), VerifyError> {
    let actual = doc.get(field).unwrap_or(&Value::Null);
    if actual.as_str() == Some(expected) {
        Ok(())
    } else {
        Err(VerifyError::ValueMismatch {
            field: field.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
            body: body.to_string(),
        })
    }
}

fn envelope_validator() -> &'static jsonschema::Validator {
    static VALIDATOR: OnceLock<jsonschema::Validator> = OnceLock::new();
    VALIDATOR.get_or_init(|| {
        let schema = serde_json::json!({
            "type": "object",
            "required": [ERR_CODE, ERROR_DESC, ERROR_LINK_ID],
            "additionalProperties": false,
            "properties": {
                ERR_CODE: {},
                ERROR_DESC: {},
                ERROR_LINK_ID: {},
            },
        });
        // The schema is a compile-time constant; an invalid one is a bug.
        match jsonschema::validator_for(&schema) {
            Ok(v) => v,
            Err(e) => unreachable!("envelope schema must compile: {e}"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::HeaderSet;

    fn response(status: u16, body: &str) -> RawResponse {
        RawResponse::new(status, HeaderSet::new(), body)
    }

    fn envelope_exp() -> VerificationExpectation {
        VerificationExpectation::Error(ErrorExpectation::with_envelope(
            406,
            "9999",
            "Expected header 'Accept=application/json; version=1.2'",
        ))
    }

    const GOOD_BODY: &str = r#"{"errCode": "9999", "errorDesc": "Expected header 'Accept=application/json; version=1.2'", "errorLinkId": null}"#;

    #[test]
    fn full_envelope_match_passes() {
        let r = response(406, GOOD_BODY);
        assert!(ErrorVerifier.verify(&envelope_exp(), &r).is_ok());
    }

    #[test]
    fn status_mismatch_reported_with_body() {
        let r = response(400, GOOD_BODY);
        let err = ErrorVerifier.verify(&envelope_exp(), &r).unwrap_err();
        match err {
            VerifyError::StatusMismatch {
                expected,
                actual,
                body,
            } => {
                assert_eq!(expected, 406);
                assert_eq!(actual, 400);
                assert!(body.contains("errCode"));
            }
            other => panic!("expected StatusMismatch, got {other}"),
        }
    }

    #[test]
    fn extra_key_fails_even_with_matching_status_and_values() {
        let body = r#"{"errCode": "9999", "errorDesc": "Expected header 'Accept=application/json; version=1.2'", "errorLinkId": null, "extra": 1}"#;
        let r = response(406, body);
        let err = ErrorVerifier.verify(&envelope_exp(), &r).unwrap_err();
        assert!(matches!(err, VerifyError::EnvelopeShape { .. }));
    }

    #[test]
    fn missing_key_fails_shape_check() {
        let body = r#"{"errCode": "9999", "errorDesc": "whatever"}"#;
        let r = response(406, body);
        let err = ErrorVerifier.verify(&envelope_exp(), &r).unwrap_err();
        assert!(matches!(err, VerifyError::EnvelopeShape { .. }));
    }

    #[test]
    fn wrong_code_fails_value_check() {
        let body = r#"{"errCode": "1000", "errorDesc": "Expected header 'Accept=application/json; version=1.2'", "errorLinkId": null}"#;
        let r = response(406, body);
        let err = ErrorVerifier.verify(&envelope_exp(), &r).unwrap_err();
        match err {
            VerifyError::ValueMismatch {
                field, expected, ..
            } => {
                assert_eq!(field, "errCode");
                assert_eq!(expected, "9999");
            }
            other => panic!("expected ValueMismatch, got {other}"),
        }
    }

    #[test]
    fn status_only_check_ignores_foreign_body() {
        let exp = VerificationExpectation::Error(ErrorExpectation::status_only(401));
        let r = response(401, r#"{"message": "Access denied", "statusCode": 401}"#);
        assert!(ErrorVerifier.verify(&exp, &r).is_ok());
    }

    #[test]
    fn status_only_check_still_requires_status() {
        let exp = VerificationExpectation::Error(ErrorExpectation::status_only(401));
        let r = response(200, "{}");
        assert!(matches!(
            ErrorVerifier.verify(&exp, &r),
            Err(VerifyError::StatusMismatch { .. })
        ));
    }

    #[test]
    fn non_json_body_fails_when_envelope_expected() {
        let r = response(406, "<html>oops</html>");
        let err = ErrorVerifier.verify(&envelope_exp(), &r).unwrap_err();
        assert!(matches!(err, VerifyError::InvalidJson { .. }));
    }

    #[test]
    fn success_expectation_is_rejected() {
        let exp = VerificationExpectation::Success(
            crate::expectation::SuccessExpectation::status_only(200),
        );
        let r = response(200, "{}");
        assert!(matches!(
            ErrorVerifier.verify(&exp, &r),
            Err(VerifyError::WrongExpectationKind { .. })
        ));
    }
}
