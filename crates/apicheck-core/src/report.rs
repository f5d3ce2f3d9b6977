//! Per-scenario outcomes and the suite verdict

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Why a scenario failed. Verification failures are the expected outcome
/// of broken contracts; the other kinds are harness/tooling trouble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Response did not match the expectation.
    Verification,
    /// Template missing or substitution arity wrong.
    Fixture,
    /// Connection/TLS/timeout trouble reaching the endpoint.
    Transport,
    /// Descriptor invariant violated before dispatch.
    Descriptor,
}

/// Result of one scenario: atomic, one request, one verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Fail {
        kind: FailureKind,
        diagnostic: String,
    },
}

impl Outcome {
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    #[must_use]
    pub fn fail(kind: FailureKind, diagnostic: impl Into<String>) -> Self {
        Self::Fail {
            kind,
            diagnostic: diagnostic.into(),
        }
    }
}

/// One executed scenario row, as persisted in run reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScenarioRecord {
    pub label: String,
    pub method: String,
    pub url: String,
    pub expected_status: u16,
    /// Unset when the request never reached the wire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_status: Option<u16>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Aggregated results for one suite run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SuiteReport {
    pub suite: String,
    pub records: Vec<ScenarioRecord>,
}

impl SuiteReport {
    #[must_use]
    pub fn new(suite: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: ScenarioRecord) {
        self.records.push(record);
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn passed(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_pass()).count()
    }

    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioRecord> {
        self.records
            .iter()
            .filter(|r| !r.outcome.is_pass())
            .collect()
    }

    fn count_kind(&self, kind: FailureKind) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Fail { kind: k, .. } if k == kind))
            .count()
    }

    /// Final verdict. Pass requires every scenario to pass; exit code 1 for
    /// verification failures, 3 for harness trouble (fixture, transport,
    /// descriptor), 0 otherwise.
    #[must_use]
    pub fn verdict(&self) -> Verdict {
        let total = self.total();
        let passed = self.passed();

        let verification = self.count_kind(FailureKind::Verification);
        let tool = self.count_kind(FailureKind::Fixture)
            + self.count_kind(FailureKind::Transport)
            + self.count_kind(FailureKind::Descriptor);

        let status = if passed == total && total > 0 {
            VerdictStatus::Pass
        } else {
            VerdictStatus::Fail
        };

        let exit_code = if verification > 0 {
            1
        } else if tool > 0 || total == 0 {
            3
        } else {
            0
        };

        let reason = if status == VerdictStatus::Pass {
            "All scenarios passed".to_string()
        } else if total == 0 {
            "No scenarios were run".to_string()
        } else {
            let mut parts = Vec::new();
            if verification > 0 {
                parts.push(format!("{verification} verification failures"));
            }
            if tool > 0 {
                parts.push(format!("{tool} harness errors"));
            }
            parts.join("; ")
        };

        Verdict {
            status,
            exit_code,
            reason,
        }
    }
}

/// Final pass/fail judgment for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Verdict {
    pub status: VerdictStatus,
    pub exit_code: i32,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerdictStatus {
    Pass,
    Fail,
}

impl std::fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(label: &str, outcome: Outcome) -> ScenarioRecord {
        ScenarioRecord {
            label: label.to_string(),
            method: "POST".to_string(),
            url: "http://localhost:8080/hearings".to_string(),
            expected_status: 202,
            observed_status: Some(202),
            outcome,
        }
    }

    #[test]
    fn all_pass_verdict() {
        let mut report = SuiteReport::new("s");
        report.push(record("a", Outcome::Pass));
        report.push(record("b", Outcome::Pass));
        let v = report.verdict();
        assert_eq!(v.status, VerdictStatus::Pass);
        assert_eq!(v.exit_code, 0);
        assert_eq!(v.reason, "All scenarios passed");
    }

    #[test]
    fn empty_report_fails_with_tool_exit() {
        let report = SuiteReport::new("s");
        let v = report.verdict();
        assert_eq!(v.status, VerdictStatus::Fail);
        assert_eq!(v.exit_code, 3);
        assert!(v.reason.contains("No scenarios"));
    }

    #[test]
    fn verification_failure_exit_one() {
        let mut report = SuiteReport::new("s");
        report.push(record("a", Outcome::Pass));
        report.push(record(
            "b",
            Outcome::fail(FailureKind::Verification, "status mismatch"),
        ));
        let v = report.verdict();
        assert_eq!(v.status, VerdictStatus::Fail);
        assert_eq!(v.exit_code, 1);
        assert!(v.reason.contains("1 verification failures"));
    }

    #[test]
    fn transport_failure_exit_three() {
        let mut report = SuiteReport::new("s");
        report.push(record(
            "a",
            Outcome::fail(FailureKind::Transport, "connection refused"),
        ));
        let v = report.verdict();
        assert_eq!(v.exit_code, 3);
        assert!(v.reason.contains("1 harness errors"));
    }

    #[test]
    fn verification_failures_take_precedence_for_exit_code() {
        let mut report = SuiteReport::new("s");
        report.push(record(
            "a",
            Outcome::fail(FailureKind::Verification, "mismatch"),
        ));
        report.push(record(
            "b",
            Outcome::fail(FailureKind::Fixture, "template missing"),
        ));
        assert_eq!(report.verdict().exit_code, 1);
    }

    #[test]
    fn record_serialization_flattens_outcome() {
        let r = record("a", Outcome::fail(FailureKind::Fixture, "missing"));
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["result"], "fail");
        assert_eq!(json["kind"], "fixture");
        let back: ScenarioRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);
    }
}
