//! Configuration management for mixer.
//!
//! Reads the mix workspace description from `builder.conf` and lets
//! `MIXER_<KEY>` environment variables override individual keys.
//! Environment variables take precedence over the file.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::trust::SigningPolicy;

/// Name of the workspace configuration file.
pub const CONFIG_FILE_NAME: &str = "builder.conf";

/// Program run to materialize chroots when none is configured.
pub const DEFAULT_CHROOT_BUILDER: &str = "mixer-build-chroots";

/// Prefix for environment overrides, e.g. `MIXER_CERT`.
pub const ENV_PREFIX: &str = "MIXER_";

/// Mixer configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// The builder.conf this was loaded from
    pub config_path: PathBuf,
    /// Directory holding builder.conf; relative paths resolve against it
    pub workspace: PathBuf,
    /// Where update content is produced
    pub server_state_dir: PathBuf,
    /// Bundle definitions for the mix
    pub bundle_dir: PathBuf,
    pub yum_conf: PathBuf,
    /// Certificate whose existence gates trust bootstrap
    pub cert: PathBuf,
    /// Private key persisted alongside the certificate
    pub private_key: PathBuf,
    pub versions_path: PathBuf,
    /// Directory of the per-modifier heuristic lists
    pub heuristics_dir: PathBuf,
    /// External program that materializes chroots
    pub chroot_builder: String,
    pub signing_policy: SigningPolicy,
    pub format: String,
    pub bundle: String,
    pub content_url: String,
    pub version_url: String,
}

impl Config {
    /// Locate builder.conf.
    ///
    /// Checks in order:
    /// 1. The explicit path, if given
    /// 2. `$MIXER_CONFIG`
    /// 3. `./builder.conf`
    /// 4. `<user config dir>/mixer/builder.conf`
    pub fn locate(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        if let Ok(path) = std::env::var("MIXER_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Ok(local);
        }
        if let Some(user) = dirs::config_dir().map(|d| d.join("mixer").join(CONFIG_FILE_NAME)) {
            if user.exists() {
                return Ok(user);
            }
        }
        bail!(
            "No {} found. Pass --config, set MIXER_CONFIG, or run from the mix workspace.",
            CONFIG_FILE_NAME
        )
    }

    /// Load configuration from builder.conf and the environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = Self::locate(explicit)?;
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;

        let mut values = parse_ini(&content);

        // Environment variables override builder.conf
        for (key, value) in std::env::vars() {
            if let Some(key) = key.strip_prefix(ENV_PREFIX) {
                if key != "CONFIG" {
                    values.insert(key.to_string(), value);
                }
            }
        }

        let workspace = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Self::from_values(path, workspace, &values)
    }

    /// Build a config from already-merged key/value pairs.
    pub fn from_values(
        config_path: PathBuf,
        workspace: PathBuf,
        values: &HashMap<String, String>,
    ) -> Result<Self> {
        let resolve = |key: &str, default: &str| -> PathBuf {
            let raw = values.get(key).map(String::as_str).unwrap_or(default);
            let path = PathBuf::from(raw);
            if raw == "." {
                workspace.clone()
            } else if path.is_absolute() {
                path
            } else {
                workspace.join(path)
            }
        };
        let string = |key: &str, default: &str| -> String {
            values
                .get(key)
                .cloned()
                .unwrap_or_else(|| default.to_string())
        };

        let cert = resolve("CERT", "Swupd_Root.pem");
        let private_key = match values.get("PRIVATE_KEY") {
            Some(_) => resolve("PRIVATE_KEY", ""),
            None => cert
                .parent()
                .map(|p| p.join("private.pem"))
                .unwrap_or_else(|| workspace.join("private.pem")),
        };

        let signing_policy = match values.get("SIGNING_POLICY") {
            Some(raw) => SigningPolicy::parse(raw)
                .with_context(|| format!("Unknown SIGNING_POLICY '{}'", raw))?,
            None => SigningPolicy::default(),
        };

        Ok(Self {
            server_state_dir: resolve("SERVER_STATE_DIR", "update"),
            bundle_dir: resolve("BUNDLE_DIR", "mix-bundles"),
            yum_conf: resolve("YUM_CONF", ".yum-mix.conf"),
            cert,
            private_key,
            versions_path: resolve("VERSIONS_PATH", "."),
            heuristics_dir: resolve("HEURISTICS_DIR", "."),
            chroot_builder: string("CHROOT_BUILDER", DEFAULT_CHROOT_BUILDER),
            signing_policy,
            format: string("FORMAT", "1"),
            bundle: string("BUNDLE", "os-core-update"),
            content_url: string("CONTENTURL", ""),
            version_url: string("VERSIONURL", ""),
            config_path,
            workspace: workspace.clone(),
        })
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration ({}):", self.config_path.display());
        println!("  SERVER_STATE_DIR: {}", self.server_state_dir.display());
        println!("  BUNDLE_DIR: {}", self.bundle_dir.display());
        println!("  YUM_CONF: {}", self.yum_conf.display());
        println!("  CERT: {}", self.cert.display());
        println!("  PRIVATE_KEY: {}", self.private_key.display());
        println!("  VERSIONS_PATH: {}", self.versions_path.display());
        println!("  HEURISTICS_DIR: {}", self.heuristics_dir.display());
        println!("  CHROOT_BUILDER: {}", self.chroot_builder);
        println!("  SIGNING_POLICY: {}", self.signing_policy.as_str());
        println!("  FORMAT: {}", self.format);
        println!("  BUNDLE: {}", self.bundle);
        println!("  CONTENTURL: {}", self.content_url);
        println!("  VERSIONURL: {}", self.version_url);
        if self.cert.exists() {
            println!("  Certificate: FOUND");
        } else {
            println!("  Certificate: NOT FOUND (generated on first 'mixer build chroots')");
        }
    }
}

/// Parse `KEY=value` lines, ignoring `[section]` headers and comments.
///
/// Keys are unique across sections in builder.conf, so sections are dropped.
pub fn parse_ini(content: &str) -> HashMap<String, String> {
    let mut values = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        // Skip comments, section headers and empty lines
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') || line.starts_with('[')
        {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim();
            // Remove quotes if present
            let value = value.trim_matches('"').trim_matches('\'');
            values.insert(key.to_string(), value.to_string());
        }
    }
    values
}
