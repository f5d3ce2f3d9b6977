//! Scenario runner — one table row at a time, atomically
//!
//! Each row builds its own descriptor from the suite's header mode and
//! template, dispatches once, and hands the captured response to the
//! verifier selected by the expectation tag. Scenarios are sequential;
//! nothing mutable is shared across rows.

use apicheck_core::config::{Config, ConfigError};
use apicheck_core::expectation::{SuccessExpectation, VerificationExpectation};
use apicheck_core::headers::{HeaderMode, HeaderSet, HeaderSlots, build_headers};
use apicheck_core::report::{FailureKind, Outcome, ScenarioRecord, SuiteReport};
use apicheck_core::request::{Method, RequestDescriptor};
use apicheck_core::suite::{Suite, TemplateRef, parse_substitutions};
use apicheck_core::template::{TemplateError, TemplateStore};
use apicheck_core::verify;

use crate::executor::{ExecuteError, Executor};

/// Read-only context shared by every scenario in a run.
///
/// Constructed once; rows receive it by reference and never mutate it.
pub struct ScenarioContext {
    pub config: Config,
    pub templates: TemplateStore,
    /// Bearer token from the one-time setup step, when configured.
    pub token: Option<String>,
}

impl ScenarioContext {
    #[must_use]
    pub fn new(config: Config, token: Option<String>) -> Self {
        let templates = TemplateStore::new(config.template_root.clone());
        Self {
            config,
            templates,
            token,
        }
    }
}

/// Runs suites row by row against the live endpoint.
pub struct ScenarioRunner {
    ctx: ScenarioContext,
    executor: Executor,
    /// Stop a suite at its first failing row.
    stop_on_failure: bool,
}

impl ScenarioRunner {
    /// # Errors
    ///
    /// `RunnerError::Client` if the HTTP client cannot be built.
    pub fn new(ctx: ScenarioContext) -> Result<Self, RunnerError> {
        let executor = Executor::new().map_err(|e| RunnerError::Client(e.to_string()))?;
        Ok(Self {
            ctx,
            executor,
            stop_on_failure: false,
        })
    }

    #[must_use]
    pub fn with_stop_on_failure(mut self, stop: bool) -> Self {
        self.stop_on_failure = stop;
        self
    }

    /// Run every row of a suite.
    ///
    /// # Errors
    ///
    /// `RunnerError::Config` when the suite's resource is not configured —
    /// fatal to the run, unlike per-row failures which land in the report.
    pub fn run_suite(&self, suite: &Suite) -> Result<SuiteReport, RunnerError> {
        let url = self
            .ctx
            .config
            .resource_url(&suite.resource, suite.resource_id.as_deref())?;
        let mut report = SuiteReport::new(&suite.name);

        eprintln!(
            "Running {}: {} scenarios against {url}...",
            suite.name,
            suite.scenario_count()
        );

        let slots = HeaderSlots::standard(&self.ctx.config.subscription_key);

        for row in &suite.header_scenarios {
            let headers = build_headers(&row.mode, &slots);
            let record = self.run_row(
                &row.label,
                suite.method,
                &url,
                headers,
                suite.template.as_ref(),
                &row.substitutions,
                &row.expect,
            );
            let failed = !record.outcome.is_pass();
            report.push(record);
            if failed && self.stop_on_failure {
                return Ok(finish(report));
            }
        }

        for row in &suite.payload_scenarios {
            let headers = build_headers(&HeaderMode::Complete, &slots);
            let template = row.template.as_ref().or(suite.template.as_ref());
            let record = self.run_row(
                &row.label,
                suite.method,
                &url,
                headers,
                template,
                &row.substitutions,
                &row.expect,
            );
            let failed = !record.outcome.is_pass();
            report.push(record);
            if failed && self.stop_on_failure {
                return Ok(finish(report));
            }
        }

        Ok(finish(report))
    }

    #[allow(clippy::too_many_arguments)]
    fn run_row(
        &self,
        label: &str,
        method: Method,
        url: &str,
        headers: HeaderSet,
        template: Option<&TemplateRef>,
        substitutions: &[String],
        expect: &VerificationExpectation,
    ) -> ScenarioRecord {
        let base = |outcome: Outcome, observed: Option<u16>| ScenarioRecord {
            label: label.to_string(),
            method: method.to_string(),
            url: url.to_string(),
            expected_status: expect.http_status(),
            observed_status: observed,
            outcome,
        };

        let body = match self.resolve_body(template, substitutions) {
            Ok(body) => body,
            Err(e) => return base(Outcome::fail(FailureKind::Fixture, e.to_string()), None),
        };

        let mut builder = RequestDescriptor::builder(method, url)
            .headers(headers)
            .expected_status(expect.http_status());
        if let Some(body) = body {
            builder = builder.body(body);
        }
        if let Some(token) = &self.ctx.token {
            builder = builder.auth_token(token);
        }
        if let VerificationExpectation::Success(exp) = expect {
            for (name, value) in query_params_for(exp) {
                builder = builder.query(name, value);
            }
        }

        let descriptor = match builder.build() {
            Ok(d) => d,
            Err(e) => return base(Outcome::fail(FailureKind::Descriptor, e.to_string()), None),
        };

        let response = match self.executor.execute(&descriptor) {
            Ok(r) => r,
            Err(e) => return base(Outcome::fail(FailureKind::Transport, e.to_string()), None),
        };

        let observed = Some(response.status_code());
        match verify::verify(expect, &response) {
            Ok(()) => base(Outcome::Pass, observed),
            Err(e) => base(
                Outcome::fail(FailureKind::Verification, e.to_string()),
                observed,
            ),
        }
    }

    fn resolve_body(
        &self,
        template: Option<&TemplateRef>,
        substitutions: &[String],
    ) -> Result<Option<String>, TemplateError> {
        match template {
            Some(template) => {
                let path = template.to_path();
                let subs = parse_substitutions(substitutions);
                self.ctx.templates.resolve(&path, &subs).map(Some)
            }
            None => Ok(None),
        }
    }
}

/// Query parameters echoed by the session-listing endpoint; the semantic
/// verifier asserts the response against the same predicate fields.
#[must_use]
pub fn query_params_for(exp: &SuccessExpectation) -> Vec<(String, String)> {
    let mut params = Vec::new();
    if let Some(v) = &exp.session_type {
        params.push(("requestSessionType".to_string(), v.clone()));
    }
    if let Some(v) = exp.duration {
        params.push(("requestDuration".to_string(), v.to_string()));
    }
    if let Some(v) = &exp.judge_type {
        params.push(("requestJudgeType".to_string(), v.clone()));
    }
    if let Some(v) = &exp.location_id {
        params.push(("requestLocationId".to_string(), v.clone()));
    }
    if let Some(v) = &exp.start_date {
        params.push(("requestStartDate".to_string(), v.clone()));
    }
    if let Some(v) = &exp.end_date {
        params.push(("requestEndDate".to_string(), v.clone()));
    }
    params
}

fn finish(report: SuiteReport) -> SuiteReport {
    let failed = report.total() - report.passed();
    if failed > 0 {
        eprintln!(
            "  {}: {failed} failures ({}/{} passed)",
            report.suite,
            report.passed(),
            report.total()
        );
    } else {
        eprintln!("  {}: OK ({} scenarios)", report.suite, report.total());
    }
    report
}

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("HTTP client error: {0}")]
    Client(String),
}
