//! Host program availability checks.

use crate::process;

use super::types::CheckResult;

/// Programs the chroot and update builders shell out to.
pub const REQUIRED_PROGRAMS: [(&str, &str); 8] = [
    ("createrepo_c", "Required to build the local RPM repository"),
    ("git", "Required to track bundle definitions"),
    ("hardlink", "Required to deduplicate chroot content"),
    ("m4", "Required to expand bundle templates"),
    ("openssl", "Required to sign Manifest.MoM"),
    ("parallel", "Required for parallel chroot population"),
    ("rpm", "Required to query package contents"),
    ("yum", "Required to install packages into chroots"),
];

/// Check every required program is in PATH.
pub fn check_host_tools() -> Vec<CheckResult> {
    REQUIRED_PROGRAMS
        .iter()
        .map(|(tool, purpose)| check_tool_exists(tool, purpose))
        .collect()
}

fn check_tool_exists(tool: &str, purpose: &str) -> CheckResult {
    match process::which(tool) {
        Some(path) => CheckResult::pass_with(tool, &path.display().to_string()),
        None => CheckResult::fail(tool, &format!("failed to find program. {}", purpose)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preflight::types::CheckStatus;

    #[test]
    fn test_missing_tool_fails() {
        let result = check_tool_exists("nonexistent_program_12345", "Required for tests");
        assert_eq!(result.status, CheckStatus::Fail);
        assert!(result.details.unwrap().contains("Required for tests"));
    }

    #[test]
    fn test_present_tool_passes() {
        let result = check_tool_exists("sh", "shell");
        assert_eq!(result.status, CheckStatus::Pass);
    }
}
