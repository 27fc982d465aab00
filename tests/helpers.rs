//! Shared test utilities for mixer tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use mixer::swupd::heuristics::rule_for;
use mixer::swupd::{HeuristicStore, Modifier};

/// Temporary mix workspace.
pub struct TestEnv {
    /// Kept alive for the lifetime of the env
    pub _temp_dir: TempDir,
    /// Workspace root (holds builder.conf and heuristic lists)
    pub workspace: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let workspace = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            workspace,
        }
    }

    pub fn store(&self) -> HeuristicStore {
        HeuristicStore::new(&self.workspace)
    }

    /// Write the list for `kind` as one line.
    pub fn write_list(&self, kind: Modifier, prefixes: &[&str]) {
        let rule = rule_for(kind).expect("no rule for kind");
        fs::write(self.store().path_for(rule), format!("{}\n", prefixes.join(" ")))
            .expect("Failed to write heuristic list");
    }

    /// Config/state/boot lists used by the manifest scenarios.
    pub fn write_scenario_lists(&self) {
        self.write_list(Modifier::Config, &["/etc"]);
        self.write_list(Modifier::State, &["/var/lib"]);
        self.write_list(Modifier::Boot, &["/boot"]);
    }

    /// Write builder.conf with extra `KEY=value` lines.
    pub fn write_config(&self, extra: &[(&str, &str)]) -> PathBuf {
        let mut content = String::from("[Builder]\nBUNDLE_DIR=mix-bundles\n");
        for (k, v) in extra {
            content.push_str(&format!("{}={}\n", k, v));
        }
        content.push_str("\n[swupd]\nBUNDLE=os-core-update\n");
        let path = self.workspace.join("builder.conf");
        fs::write(&path, content).expect("Failed to write builder.conf");
        path
    }
}

/// Create a file (and parents) inside a chroot.
pub fn create_chroot_file(chroot: &Path, rel: &str, content: &str) {
    let path = chroot.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent");
    }
    fs::write(path, content).expect("Failed to write chroot file");
}
