//! apicheck-core: Types and verification logic for API contract checking
//!
//! This crate provides the template-mutation-execute-verify pipeline's pure
//! half: the header and payload mutation models, request descriptors,
//! expectations, and the verification strategies that judge captured
//! responses.

pub mod config;
pub mod expectation;
pub mod headers;
pub mod report;
pub mod request;
pub mod response;
pub mod suite;
pub mod template;
pub mod verify;

pub use config::{Config, ConfigError, OauthConfig};
pub use expectation::{
    ErrorExpectation, PredicateCombination, SuccessExpectation, UnsupportedCombination,
    VerificationExpectation,
};
pub use headers::{HeaderMode, HeaderSet, HeaderSlots, build_headers};
pub use report::{FailureKind, Outcome, ScenarioRecord, SuiteReport, Verdict, VerdictStatus};
pub use request::{DescriptorError, Method, MethodClass, RequestDescriptor};
pub use response::RawResponse;
pub use suite::{HeaderScenario, PayloadScenario, Suite, SuiteError, TemplateRef, parse_substitutions};
pub use template::{Substitution, TemplateError, TemplatePath, TemplateStore};
pub use verify::{ErrorVerifier, SuccessVerifier, Verifier, VerifyError, verifier_for};
