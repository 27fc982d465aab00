//! External program execution with consistent error reporting.
//!
//! Chroot construction is a separate program; everything mixer launches goes
//! through [`Cmd`] so failures carry the program name and exit code.

use anyhow::{bail, Context, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// Builder for one external program invocation.
#[derive(Debug, Clone)]
pub struct Cmd {
    program: String,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
    error_prefix: Option<String>,
}

impl Cmd {
    pub fn new(program: impl AsRef<str>) -> Self {
        Self {
            program: program.as_ref().to_string(),
            args: Vec::new(),
            current_dir: None,
            error_prefix: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
        self.args.push(arg.as_ref().into());
        self
    }

    /// Add a path argument without lossy conversion.
    pub fn arg_path(mut self, path: &Path) -> Self {
        self.args.push(path.as_os_str().to_os_string());
        self
    }

    pub fn dir(mut self, dir: &Path) -> Self {
        self.current_dir = Some(dir.to_path_buf());
        self
    }

    /// Set a custom error message prefix.
    pub fn error_msg(mut self, msg: impl AsRef<str>) -> Self {
        self.error_prefix = Some(msg.as_ref().to_string());
        self
    }

    /// Rendered command line, for logs.
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    /// Run with inherited stdio so long builds show progress.
    pub fn run_interactive(self) -> Result<ExitStatus> {
        tracing::debug!(command = %self.display(), "run");
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }

        let status = cmd
            .status()
            .with_context(|| format!("Failed to execute '{}'. Is it installed?", self.program))?;

        if !status.success() {
            let prefix = self
                .error_prefix
                .unwrap_or_else(|| format!("'{}' failed", self.program));
            bail!("{} (exit code {})", prefix, status.code().unwrap_or(-1));
        }

        Ok(status)
    }
}

/// Locate a program in PATH.
pub fn which(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_success() {
        let status = Cmd::new("true").arg("--ignored").run_interactive().unwrap();
        assert!(status.success());
    }

    #[test]
    fn test_custom_error_message() {
        let err = Cmd::new("false")
            .error_msg("Chroot builder failed")
            .run_interactive()
            .unwrap_err();
        assert_eq!(err.to_string(), "Chroot builder failed (exit code 1)");
    }

    #[test]
    fn test_default_error_message() {
        let err = Cmd::new("false").run_interactive().unwrap_err();
        assert!(err.to_string().starts_with("'false' failed"));
    }

    #[test]
    fn test_runs_in_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("marker"), "").unwrap();
        Cmd::new("test")
            .arg("-f")
            .arg("marker")
            .dir(temp.path())
            .run_interactive()
            .unwrap();
    }

    #[test]
    fn test_missing_program() {
        let err = Cmd::new("nonexistent_program_12345")
            .run_interactive()
            .unwrap_err();
        assert!(err.to_string().contains("Is it installed?"));
        assert!(which("nonexistent_program_12345").is_none());
        assert!(which("sh").is_some());
    }

    #[test]
    fn test_display() {
        let cmd = Cmd::new("mixer-build-chroots")
            .arg("--config")
            .arg_path(Path::new("/mix/builder.conf"));
        assert_eq!(cmd.display(), "mixer-build-chroots --config /mix/builder.conf");
    }
}
