//! Mix workspace checks (heuristics directory, bundles, trust state).

use std::fs;

use crate::config::Config;
use crate::swupd::heuristics::PRECEDENCE;
use crate::swupd::HeuristicStore;

use super::types::CheckResult;

/// Check the workspace described by `config`.
pub fn check_workspace(config: &Config) -> Vec<CheckResult> {
    let mut results = Vec::new();

    // Heuristic lists are created on demand, so the directory must be writable
    let dir = &config.heuristics_dir;
    if dir.is_dir() {
        let scratch = dir.join(".preflight-test");
        match fs::write(&scratch, "test") {
            Ok(_) => {
                let _ = fs::remove_file(&scratch);
                results.push(CheckResult::pass("heuristics dir writable"));
            }
            Err(e) => results.push(CheckResult::fail(
                "heuristics dir writable",
                &format!("Cannot write to {}: {}", dir.display(), e),
            )),
        }
    } else {
        results.push(CheckResult::fail(
            "heuristics dir writable",
            &format!("{} does not exist", dir.display()),
        ));
    }

    let store = HeuristicStore::new(dir);
    for rule in &PRECEDENCE {
        let path = store.path_for(rule);
        let name = format!("{} list", rule.kind);
        if path.exists() {
            results.push(CheckResult::pass_with(&name, &path.display().to_string()));
        } else {
            results.push(CheckResult::warn(
                &name,
                "Not found - created with defaults on first classification",
            ));
        }
    }

    if config.bundle_dir.is_dir() {
        results.push(CheckResult::pass_with(
            "bundle dir",
            &config.bundle_dir.display().to_string(),
        ));
    } else {
        results.push(CheckResult::warn(
            "bundle dir",
            &format!("{} not found", config.bundle_dir.display()),
        ));
    }

    if config.cert.exists() {
        results.push(CheckResult::pass_with("certificate", "present - will be reused"));
    } else {
        results.push(CheckResult::warn(
            "certificate",
            "Not found - generated on first chroot build",
        ));
    }

    results
}
