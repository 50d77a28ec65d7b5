//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `domain_audit` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use domain_audit::initialization::init_logger_with;
use domain_audit::{run_audit, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Target and nameserver options read DOMAIN_AUDIT_* variables, which may come from .env
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run_audit(config).await {
        Ok(report) => {
            println!(
                "Audited {} domain{} ({} matched, {} broken, {} skipped) in {:.1}s",
                report.probed,
                if report.probed == 1 { "" } else { "s" },
                report.matched,
                report.broken,
                report.skipped,
                report.elapsed_seconds
            );
            if report.retried > 0 {
                println!("Retried {} broken domain(s)", report.retried);
            }
            if report.unscheduled > 0 {
                println!(
                    "{} domain(s) not started; rerun with --resume to finish",
                    report.unscheduled
                );
            }
            println!("Results appended to {}", report.output.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("domain_audit error: {:#}", e);
            process::exit(1);
        }
    }
}
