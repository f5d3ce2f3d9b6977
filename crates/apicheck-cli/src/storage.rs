//! Persistent report storage — `~/.apicheck/reports/`
//!
//! Every `apicheck run` is automatically saved regardless of `--output` mode.
//! Directory layout: `{host_port}_{timestamp}/`

use std::path::PathBuf;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use apicheck_core::{Config, ScenarioRecord, SuiteReport, Verdict};

/// Everything needed to persist one run.
pub struct ReportData<'a> {
    pub config: &'a Config,
    pub reports: &'a [SuiteReport],
    pub verdict: &'a Verdict,
    pub duration_secs: f64,
}

/// Save a run report to `~/.apicheck/reports/{host_port}_{timestamp}/`.
///
/// Returns the report directory path on success.
pub fn save_report(data: &ReportData) -> Result<PathBuf, std::io::Error> {
    let base = report_base_dir()?;
    let dir_name = build_dir_name(&data.config.base_url);
    let report_dir = base.join(&dir_name);
    std::fs::create_dir_all(&report_dir)?;

    // config.toml — snapshot of the config used
    let config_toml =
        toml::to_string_pretty(data.config).map_err(|e| std::io::Error::other(e.to_string()))?;
    std::fs::write(report_dir.join("config.toml"), config_toml)?;

    let total: usize = data.reports.iter().map(SuiteReport::total).sum();
    let passed: usize = data.reports.iter().map(SuiteReport::passed).sum();

    // summary.json — verdict + stats + metadata
    let summary = serde_json::json!({
        "verdict": {
            "status": format!("{}", data.verdict.status),
            "exit_code": data.verdict.exit_code,
            "reason": data.verdict.reason,
        },
        "stats": {
            "suites": data.reports.len(),
            "total": total,
            "passed": passed,
            "failed": total.saturating_sub(passed),
        },
        "meta": {
            "timestamp": timestamp_iso(),
            "duration_secs": data.duration_secs,
            "base_url": data.config.base_url,
        },
    });
    std::fs::write(
        report_dir.join("summary.json"),
        serde_json::to_string_pretty(&summary).unwrap_or_default(),
    )?;

    // failures.json — failing records across all suites (only if present)
    let failures: Vec<&ScenarioRecord> = data
        .reports
        .iter()
        .flat_map(|r| r.failures())
        .collect();
    if !failures.is_empty() {
        std::fs::write(
            report_dir.join("failures.json"),
            serde_json::to_string_pretty(&failures).unwrap_or_default(),
        )?;
    }

    Ok(report_dir)
}

fn report_base_dir() -> Result<PathBuf, std::io::Error> {
    let home = std::env::var("HOME")
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::NotFound, "HOME not set"))?;
    Ok(PathBuf::from(home).join(".apicheck").join("reports"))
}

/// `{host_port}_{timestamp}` e.g. `localhost_8080_20260827T193000Z`
fn build_dir_name(base_url: &str) -> String {
    let host_port = extract_host_port(base_url);
    let ts = timestamp_compact();
    format!("{host_port}_{ts}")
}

/// `"http://localhost:8080/path"` → `"localhost_8080"`
fn extract_host_port(url: &str) -> String {
    url.split("://")
        .nth(1)
        .unwrap_or(url)
        .split('/')
        .next()
        .unwrap_or("unknown")
        .replace(':', "_")
}

fn now_utc_whole_seconds() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(0).unwrap_or(now)
}

/// `"2026-08-27T19:30:00Z"` — ISO 8601 for JSON.
fn timestamp_iso() -> String {
    now_utc_whole_seconds()
        .format(&Rfc3339)
        .unwrap_or_default()
}

/// `"20260827T193000Z"` — filesystem-safe compact timestamp.
fn timestamp_compact() -> String {
    timestamp_iso()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}
