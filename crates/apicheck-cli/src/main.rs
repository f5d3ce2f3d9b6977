//! apicheck CLI - Declarative contract verification for HTTP JSON APIs

mod storage;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use apicheck_core::{Config, Outcome, Suite, SuiteReport, VerdictStatus};
use apicheck_runner::{ScenarioContext, ScenarioRunner, fetch_access_token};

#[derive(Parser)]
#[command(name = "apicheck")]
#[command(about = "Declarative contract verification for HTTP JSON APIs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "terminal")]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run scenario suites against the configured endpoint
    Run {
        /// Suite files (TOML scenario tables)
        #[arg(required = true)]
        suites: Vec<PathBuf>,

        /// Config file (default: .apicheck.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Stop a suite at its first failing scenario (fast-fail for CI)
        #[arg(long)]
        stop_on_failure: bool,

        /// Skip persisting the report under ~/.apicheck/reports/
        #[arg(long)]
        no_report: bool,
    },

    /// Initialize config file
    Init,

    /// Check config, template root, and endpoint reachability prerequisites
    Doctor,

    /// Export JSON Schema for the report format
    Schema,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
    Silent,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(3)
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Run {
            suites,
            config,
            stop_on_failure,
            no_report,
        } => {
            let cfg = if let Some(path) = config {
                Config::load(&path)?
            } else {
                Config::load_default()?
            };

            if cli.output != OutputFormat::Silent {
                eprintln!("Config:");
                eprintln!("  base_url:      {}", cfg.base_url);
                eprintln!("  template_root: {}", cfg.template_root.display());
                eprintln!("  resources:     {} configured", cfg.resources.len());
                eprintln!();
            }

            // Token retrieval happens once; a failure here is fatal to the
            // whole run, not to one scenario.
            let token = match &cfg.oauth {
                Some(oauth) => Some(
                    fetch_access_token(oauth)
                        .with_context(|| format!("token retrieval from {}", oauth.token_url))?,
                ),
                None => None,
            };

            let runner = ScenarioRunner::new(ScenarioContext::new(cfg.clone(), token))?
                .with_stop_on_failure(stop_on_failure);

            let run_start = Instant::now();
            let mut reports = Vec::new();
            for path in &suites {
                let suite = Suite::load(path)
                    .with_context(|| format!("loading suite {}", path.display()))?;
                reports.push(runner.run_suite(&suite)?);
            }
            let duration_secs = run_start.elapsed().as_secs_f64();

            // One verdict across every suite: exit 1 for verification
            // failures, 3 for harness trouble or an empty run.
            let mut combined = SuiteReport::new("run");
            for report in &reports {
                for record in &report.records {
                    combined.push(record.clone());
                }
            }
            let verdict = combined.verdict();

            match cli.output {
                OutputFormat::Terminal => {
                    for report in &reports {
                        println!(
                            "{}: {}/{} passed",
                            report.suite,
                            report.passed(),
                            report.total()
                        );
                        for record in report.failures() {
                            if let Outcome::Fail { kind, diagnostic } = &record.outcome {
                                println!(
                                    "  [{kind:?}] {} {} {} -> {}",
                                    record.label,
                                    record.method,
                                    record.url,
                                    record
                                        .observed_status
                                        .map_or_else(|| "no response".to_string(), |s| s
                                            .to_string()),
                                );
                                println!("         {diagnostic}");
                            }
                        }
                    }

                    let icon = if verdict.status == VerdictStatus::Pass {
                        "PASS"
                    } else {
                        "FAIL"
                    };
                    println!("\n{icon}: {}", verdict.reason);
                    println!(
                        "  Scenarios: {} total, {} passed, {} failed",
                        combined.total(),
                        combined.passed(),
                        combined.total() - combined.passed()
                    );
                    println!("  Exit code: {}", verdict.exit_code);
                }
                OutputFormat::Json => {
                    let json_output = serde_json::json!({
                        "verdict": verdict,
                        "suites": reports,
                    });
                    println!("{}", serde_json::to_string_pretty(&json_output)?);
                }
                OutputFormat::Silent => {}
            }

            if !no_report {
                let report_data = storage::ReportData {
                    config: &cfg,
                    reports: &reports,
                    verdict: &verdict,
                    duration_secs,
                };
                match storage::save_report(&report_data) {
                    Ok(path) => {
                        if cli.output != OutputFormat::Silent {
                            eprintln!("Report saved: {}", path.display());
                        }
                    }
                    Err(e) => eprintln!("Warning: failed to save report: {e}"),
                }
            }

            Ok(verdict.exit_code)
        }

        Commands::Init => {
            let config_path = ".apicheck.toml";
            if std::path::Path::new(config_path).exists() {
                eprintln!("{config_path} already exists");
                return Ok(1);
            }

            std::fs::write(config_path, Config::example())?;
            println!("Created {config_path}");
            println!("\nEdit the file to configure:");
            println!("  - base_url: API under test");
            println!("  - subscription_key: sent with every request");
            println!("  - template_root: body template directory");
            println!("  - resources: named resource roots");
            Ok(0)
        }

        Commands::Doctor => {
            println!("apicheck doctor");
            println!("===============\n");

            let config_ok = std::path::Path::new(".apicheck.toml").exists();
            println!(
                "[{}] Config file (.apicheck.toml)",
                if config_ok { "OK" } else { "--" }
            );

            if let Ok(cfg) = Config::load_default() {
                let templates_ok = cfg.template_root.is_dir();
                println!(
                    "[{}] Template root ({})",
                    if templates_ok { "OK" } else { "NG" },
                    cfg.template_root.display()
                );
                println!(
                    "[{}] Resources ({} configured)",
                    if cfg.resources.is_empty() { "NG" } else { "OK" },
                    cfg.resources.len()
                );
                println!(
                    "[{}] OAuth ({})",
                    if cfg.oauth.is_some() { "OK" } else { "--" },
                    if cfg.oauth.is_some() {
                        "token fetched once before the first scenario"
                    } else {
                        "not configured; requests go out unauthenticated"
                    }
                );
            }

            if !config_ok {
                println!("\nCreate config file:");
                println!("  apicheck init");
            }

            Ok(0)
        }

        Commands::Schema => {
            let schema = schemars::schema_for!(SuiteReport);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(0)
        }
    }
}
