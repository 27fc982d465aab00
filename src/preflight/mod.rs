//! Preflight checks for mix builds.
//!
//! Validates host programs and the mix workspace before a build starts.
//! Run with `mixer preflight` to check everything is ready.

mod environment;
mod host_tools;
pub mod types;

use anyhow::{bail, Result};

use crate::config::Config;

pub use host_tools::REQUIRED_PROGRAMS;
pub use types::PreflightReport;

/// Run all preflight checks. Workspace checks need a loaded config.
pub fn run_preflight(config: Option<&Config>) -> PreflightReport {
    let mut checks = Vec::new();

    println!("Running preflight checks...\n");

    println!("Checking host programs...");
    checks.extend(host_tools::check_host_tools());

    if let Some(config) = config {
        println!("Checking mix workspace...");
        checks.extend(environment::check_workspace(config));
    }

    println!();

    PreflightReport { checks }
}

/// Fail fast if any required host program is missing.
pub fn require_host_tools() -> Result<()> {
    let report = PreflightReport {
        checks: host_tools::check_host_tools(),
    };
    if let Some(missing) = report.first_failure() {
        bail!(
            "failed to find program {:?}: {}",
            missing.name,
            missing.details.as_deref().unwrap_or("not in PATH")
        );
    }
    Ok(())
}
