//! Classify command - turns a chroot into a classified manifest.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::Config;
use crate::swupd::scan::{mark_deleted, scan_chroot};
use crate::swupd::{apply_heuristics, HeuristicStore, Manifest, Modifier, Status};
use crate::timing::Timer;

/// Arguments for the classify command.
pub struct ClassifyArgs {
    pub chroot: PathBuf,
    /// Manifest of the previous build, used to detect deletions
    pub previous: Option<PathBuf>,
    /// Write JSON here instead of printing a listing
    pub output: Option<PathBuf>,
    pub name: Option<String>,
    pub version: u32,
}

/// Execute `mixer classify`.
pub fn cmd_classify(config: &Config, args: ClassifyArgs) -> Result<Manifest> {
    let name = match args.name {
        Some(name) => name,
        None => args
            .chroot
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "full".to_string()),
    };

    let t = Timer::start("Scan");
    let mut manifest = scan_chroot(&args.chroot, &name, args.version)?;
    t.finish();

    if let Some(previous) = &args.previous {
        let previous = Manifest::load(previous)?;
        let deleted = mark_deleted(&mut manifest, &previous);
        if deleted > 0 {
            println!("  {} file(s) removed since version {}", deleted, previous.version);
        }
    }

    let store = HeuristicStore::new(&config.heuristics_dir);
    apply_heuristics(&store, &mut manifest)
        .context("Manifest classification incomplete; manifest not written")?;

    print_summary(&manifest);

    match &args.output {
        Some(path) => {
            manifest.save(path)?;
            println!("Manifest written to {}", path.display());
        }
        None => manifest.print(),
    }

    Ok(manifest)
}

fn print_summary(manifest: &Manifest) {
    let count = |m: Modifier| manifest.files.iter().filter(|f| f.modifier == m).count();
    let ghosted = manifest
        .files
        .iter()
        .filter(|f| f.status == Status::Ghosted)
        .count();
    println!(
        "  {} files: {} config, {} state, {} boot, {} ghosted",
        manifest.files.len(),
        count(Modifier::Config),
        count(Modifier::State),
        count(Modifier::Boot),
        ghosted
    );
}
