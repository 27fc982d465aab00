//! Preflight command - runs preflight checks.

use anyhow::{bail, Result};

use crate::config::Config;
use crate::preflight;

/// Execute the preflight command.
pub fn cmd_preflight(config: Option<&Config>, strict: bool) -> Result<()> {
    let report = preflight::run_preflight(config);
    report.print();

    if report.all_passed() {
        println!("All preflight checks passed!\n");
    } else if strict {
        bail!(
            "Preflight failed: {} check(s) failed. Fix the issues above before building.",
            report.fail_count()
        );
    } else {
        println!("Some checks failed. Use --strict to fail the build.");
    }
    Ok(())
}
