//! Build command - builds the mix chroots.

use anyhow::Result;

use crate::builder::WorkspaceBuilder;
use crate::config::Config;
use crate::timing::Timer;
use crate::trust::{TrustBootstrap, TrustState};

/// Execute `mixer build chroots`.
///
/// Errors from trust generation or the chroot builder are fatal
/// [`MixError`](crate::error::MixError)s; `main` exits non-zero on them.
pub fn cmd_build_chroots(config: &Config, no_signing: bool) -> Result<()> {
    println!("=== Build Chroots ===\n");

    let bootstrap = TrustBootstrap::new(&config.cert).with_policy(config.signing_policy);
    let mut builder = WorkspaceBuilder::new(config);

    let t = Timer::start("Chroots");
    let state = bootstrap.ensure_chroots_built(&mut builder, !no_signing)?;
    t.finish();

    match state {
        TrustState::NoTrustMaterial if no_signing => {
            println!("\nChroots built unsigned; no certificate written")
        }
        TrustState::NoTrustMaterial => {
            println!("\nChroots built; new certificate at {}", config.cert.display())
        }
        TrustState::TrustMaterialPresent => {
            if no_signing {
                println!(
                    "\n[WARN] Existing certificate reused; --no-signing ignored (SIGNING_POLICY={})",
                    config.signing_policy.as_str()
                );
            }
            println!("\nChroots built with existing certificate");
        }
    }
    Ok(())
}
