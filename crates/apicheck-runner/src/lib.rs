//! apicheck-runner: Live execution of scenario suites
//!
//! The impure half of the harness: a blocking HTTP executor, one-time
//! token retrieval, and the runner that walks suite rows and collects
//! per-scenario outcomes into a report.

pub mod auth;
pub mod executor;
pub mod scenario;

pub use auth::{AuthError, fetch_access_token};
pub use executor::{ExecuteError, Executor};
pub use scenario::{RunnerError, ScenarioContext, ScenarioRunner, query_params_for};
