//! Build a manifest from a materialized chroot.
//!
//! Paths are recorded relative to the chroot and rooted at `/`. Given the
//! previous manifest for the same bundle, entries that disappeared are carried
//! forward as `Deleted` so the heuristic pass can ghost them.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::{File, FileType, Manifest, Status};

/// Walk `chroot` and list every entry below it, sorted by path.
pub fn scan_chroot(chroot: &Path, name: &str, version: u32) -> Result<Manifest> {
    if !chroot.is_dir() {
        anyhow::bail!("Chroot not found: {}", chroot.display());
    }

    let mut manifest = Manifest::new(name, version);

    for entry in WalkDir::new(chroot)
        .follow_links(false)
        .sort_by_file_name()
        .min_depth(1)
    {
        let entry = entry.with_context(|| format!("Failed to walk {}", chroot.display()))?;
        let rel = entry
            .path()
            .strip_prefix(chroot)
            .with_context(|| format!("{} escapes chroot", entry.path().display()))?;
        let name = format!("/{}", rel.to_string_lossy());

        let ft = entry.file_type();
        let (file_type, hash) = if ft.is_symlink() {
            let target = fs::read_link(entry.path())
                .with_context(|| format!("Failed to read link {}", entry.path().display()))?;
            (
                FileType::Link,
                hash_bytes(target.to_string_lossy().as_bytes()),
            )
        } else if ft.is_dir() {
            (FileType::Directory, String::new())
        } else {
            let content = fs::read(entry.path())
                .with_context(|| format!("Failed to read {}", entry.path().display()))?;
            (FileType::Regular, hash_bytes(&content))
        };

        manifest.files.push(File {
            name,
            hash,
            file_type,
            ..File::default()
        });
    }

    manifest.files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(manifest)
}

/// Append files present in `previous` but missing from `current` as `Deleted`.
///
/// Entries already removed in `previous` are not carried again. Returns the
/// number of entries appended.
pub fn mark_deleted(current: &mut Manifest, previous: &Manifest) -> usize {
    let present: HashSet<String> = current.files.iter().map(|f| f.name.clone()).collect();
    let mut added = 0;

    for old in &previous.files {
        if old.status.is_removed() || present.contains(&old.name) {
            continue;
        }
        current.files.push(File {
            status: Status::Deleted,
            ..old.clone()
        });
        added += 1;
    }

    if added > 0 {
        current.files.sort_by(|a, b| a.name.cmp(&b.name));
    }
    added
}

fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
