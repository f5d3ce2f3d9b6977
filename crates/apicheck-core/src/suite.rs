//! Scenario suites — validation matrices as TOML data
//!
//! A suite is the wire format for one resource's contract matrix: a target
//! resource, a base template, and two row shapes (header-driven and
//! payload-driven) that share the same downstream pipeline. In substitution
//! lists the literal `NIL` means "substitute null", distinct from `""`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::expectation::VerificationExpectation;
use crate::headers::HeaderMode;
use crate::request::Method;
use crate::template::{Substitution, TemplatePath};

/// One resource's scenario table file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suite {
    /// Suite name, used in reports.
    pub name: String,

    /// Resource key resolved against the config's resource roots.
    pub resource: String,

    /// Id substituted into the resource root's `%s` placeholder, for
    /// id-addressed rows (PUT/DELETE of one entity).
    #[serde(default)]
    pub resource_id: Option<String>,

    /// HTTP method every row dispatches with.
    pub method: Method,

    /// Base body template; payload rows may override it.
    #[serde(default)]
    pub template: Option<TemplateRef>,

    /// Header-mutation rows.
    #[serde(default)]
    pub header_scenarios: Vec<HeaderScenario>,

    /// Payload-mutation rows.
    #[serde(default)]
    pub payload_scenarios: Vec<PayloadScenario>,
}

/// Serde-friendly template address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateRef {
    pub area: String,
    #[serde(default)]
    pub flavor: Option<String>,
    pub file: String,
}

impl TemplateRef {
    #[must_use]
    pub fn to_path(&self) -> TemplatePath {
        let path = TemplatePath::new(&self.area, &self.file);
        match &self.flavor {
            Some(flavor) => path.with_flavor(flavor),
            None => path,
        }
    }
}

/// Header-driven row: mutate the header set, keep the payload well-formed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderScenario {
    pub label: String,
    pub mode: HeaderMode,
    /// Substitutions for the suite's base template.
    #[serde(default)]
    pub substitutions: Vec<String>,
    pub expect: VerificationExpectation,
}

/// Payload-driven row: well-formed headers, mutated body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadScenario {
    pub label: String,
    /// Overrides the suite's base template when set.
    #[serde(default)]
    pub template: Option<TemplateRef>,
    #[serde(default)]
    pub substitutions: Vec<String>,
    pub expect: VerificationExpectation,
}

impl Suite {
    /// Parse a suite from TOML text.
    ///
    /// # Errors
    ///
    /// `SuiteError::Parse` on malformed TOML.
    pub fn from_toml(text: &str) -> Result<Self, SuiteError> {
        toml::from_str(text).map_err(|e| SuiteError::Parse(e.to_string()))
    }

    /// Load a suite file.
    ///
    /// # Errors
    ///
    /// `SuiteError::Io` if the file cannot be read, `SuiteError::Parse` if
    /// it is malformed.
    pub fn load(path: &Path) -> Result<Self, SuiteError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SuiteError::Io(path.display().to_string(), e.to_string()))?;
        Self::from_toml(&content)
    }

    #[must_use]
    pub fn scenario_count(&self) -> usize {
        self.header_scenarios.len() + self.payload_scenarios.len()
    }
}

/// Map raw suite tokens to substitutions (`NIL` → null).
#[must_use]
pub fn parse_substitutions(tokens: &[String]) -> Vec<Substitution> {
    tokens.iter().map(|t| Substitution::from_token(t)).collect()
}

#[derive(Debug, thiserror::Error)]
pub enum SuiteError {
    #[error("cannot read {0}: {1}")]
    Io(String, String),
    #[error("suite parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::Substitution;

    const SUITE: &str = r#"
name = "hearing-request-headers"
resource = "hearings"
method = "POST"

[template]
area = "hearings"
file = "standard-hearing-request.json"

[[header_scenarios]]
label = "complete headers accepted"
mode = "complete"
substitutions = ["CASE-1"]

[header_scenarios.expect]
kind = "success"
http_status = 202

[[header_scenarios]]
label = "blank headers rejected"
mode = "all_blank"
substitutions = ["CASE-1"]

[header_scenarios.expect]
kind = "error"
http_status = 401

[[header_scenarios]]
label = "truncated accept key rejected"
mode = { truncated_keys = ["Accept"] }
substitutions = ["CASE-1"]

[header_scenarios.expect]
kind = "error"
http_status = 406
error_code = "9999"
error_description = "Expected header 'Accept=application/json; version=1.2'"

[[payload_scenarios]]
label = "null case id rejected"
substitutions = ["NIL"]

[payload_scenarios.expect]
kind = "error"
http_status = 400
error_code = "1004"
error_description = "Invalid case id"
"#;

    #[test]
    fn suite_parses_both_row_shapes() {
        let suite = Suite::from_toml(SUITE).unwrap();
        assert_eq!(suite.name, "hearing-request-headers");
        assert_eq!(suite.method, Method::Post);
        assert_eq!(suite.header_scenarios.len(), 3);
        assert_eq!(suite.payload_scenarios.len(), 1);
        assert_eq!(suite.scenario_count(), 4);
    }

    #[test]
    fn unit_and_parameterized_modes_deserialize() {
        let suite = Suite::from_toml(SUITE).unwrap();
        assert_eq!(suite.header_scenarios[0].mode, HeaderMode::Complete);
        assert_eq!(suite.header_scenarios[1].mode, HeaderMode::AllBlank);
        assert_eq!(
            suite.header_scenarios[2].mode,
            HeaderMode::TruncatedKeys(vec!["Accept".to_string()])
        );
    }

    #[test]
    fn expectation_tags_deserialize_per_row() {
        let suite = Suite::from_toml(SUITE).unwrap();
        assert!(matches!(
            suite.header_scenarios[0].expect,
            VerificationExpectation::Success(_)
        ));
        assert_eq!(suite.header_scenarios[1].expect.http_status(), 401);
        assert_eq!(suite.header_scenarios[2].expect.http_status(), 406);
    }

    #[test]
    fn nil_token_becomes_null_substitution() {
        let suite = Suite::from_toml(SUITE).unwrap();
        let subs = parse_substitutions(&suite.payload_scenarios[0].substitutions);
        assert_eq!(subs, vec![Substitution::Nil]);
    }

    #[test]
    fn resource_id_is_optional_and_deserializes() {
        let suite = Suite::from_toml(SUITE).unwrap();
        assert!(suite.resource_id.is_none());

        let by_id = Suite::from_toml(
            r#"
name = "delete-session"
resource = "sessions"
resource_id = "S-42"
method = "DELETE"
"#,
        )
        .unwrap();
        assert_eq!(by_id.resource_id.as_deref(), Some("S-42"));
    }

    #[test]
    fn template_ref_maps_to_template_path() {
        let r = TemplateRef {
            area: "sessions".into(),
            flavor: Some("put".into()),
            file: "request.json".into(),
        };
        assert_eq!(r.to_path().to_string(), "sessions/put/request.json");
    }

    #[test]
    fn malformed_suite_is_a_parse_error() {
        let err = Suite::from_toml("name = ").unwrap_err();
        assert!(matches!(err, SuiteError::Parse(_)));
    }
}
