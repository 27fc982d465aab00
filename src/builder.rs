//! Workspace chroot builder.
//!
//! On a first signed build this persists the trust material handed over by the
//! bootstrap: the self-signed certificate at `CERT` and the private key at
//! `PRIVATE_KEY`. Chroot materialization itself is delegated to the
//! program named by `CHROOT_BUILDER`.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use crate::config::Config;
use crate::error::MixError;
use crate::process::Cmd;
use crate::trust::{ChrootBuilder, TrustMaterial};

/// [`ChrootBuilder`] driven by a mix workspace configuration.
pub struct WorkspaceBuilder<'a> {
    config: &'a Config,
}

impl<'a> WorkspaceBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Self-sign the template and write certificate and key PEM files.
    pub fn persist_trust_material(&self, material: &TrustMaterial) -> Result<()> {
        let cert = material
            .template
            .clone()
            .self_signed(&material.key_pair)
            .map_err(|e| MixError::CertificateSign(e.to_string()))?;

        write_pem(&self.config.private_key, &material.key_pair.serialize_pem(), 0o600)?;
        write_pem(&self.config.cert, &cert.pem(), 0o644)?;

        println!("  Certificate written to {}", self.config.cert.display());
        Ok(())
    }

    /// Command line for the external chroot builder.
    pub fn chroot_command(&self, sign: bool) -> Cmd {
        let mut cmd = Cmd::new(&self.config.chroot_builder)
            .arg("--config")
            .arg_path(&self.config.config_path)
            .arg("--bundles")
            .arg_path(&self.config.bundle_dir)
            .arg("--yum-conf")
            .arg_path(&self.config.yum_conf)
            .arg("--state-dir")
            .arg_path(&self.config.server_state_dir)
            .arg("--versions-path")
            .arg_path(&self.config.versions_path)
            .arg("--format")
            .arg(&self.config.format)
            .arg("--bundle")
            .arg(&self.config.bundle);
        if !self.config.content_url.is_empty() {
            cmd = cmd.arg("--content-url").arg(&self.config.content_url);
        }
        if !self.config.version_url.is_empty() {
            cmd = cmd.arg("--version-url").arg(&self.config.version_url);
        }
        if sign {
            cmd = cmd
                .arg("--cert")
                .arg_path(&self.config.cert)
                .arg("--key")
                .arg_path(&self.config.private_key);
        } else {
            cmd = cmd.arg("--no-signing");
        }
        cmd.dir(&self.config.workspace)
            .error_msg(format!("Chroot builder '{}' failed", self.config.chroot_builder))
    }
}

impl ChrootBuilder for WorkspaceBuilder<'_> {
    fn build_chroots(&mut self, material: Option<&TrustMaterial>, sign: bool) -> Result<()> {
        // Unsigned builds leave no certificate behind, so the next
        // build still bootstraps
        match material {
            Some(material) if sign => self.persist_trust_material(material)?,
            Some(_) => println!("  [SKIP] Signing disabled; certificate not written"),
            None => {}
        }
        self.chroot_command(sign).run_interactive()?;
        Ok(())
    }
}

fn write_pem(path: &Path, pem: &str, mode: u32) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(pem.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
