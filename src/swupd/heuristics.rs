//! Path-prefix heuristics that tag manifest files with a [`Modifier`].
//!
//! Each modifier kind owns an operator-editable list of path prefixes stored
//! in the heuristics directory of the mix workspace. A list that does not exist
//! yet is written with built-in defaults the first time it is requested, so
//! later passes and manual edits are stable.
//!
//! Kinds are evaluated in ascending priority and a later match overwrites an
//! earlier one, so when a path qualifies for several kinds the result is
//! Boot over State over Config.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{MixError, MixResult};

use super::{File, Manifest, Modifier, Status};

/// A modifier kind bound to its persisted prefix list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeuristicRule {
    pub kind: Modifier,
    /// Higher priority is applied later and wins.
    pub priority: u8,
    /// File name of the list inside the heuristics directory.
    pub file_name: &'static str,
    pub default_prefixes: &'static [&'static str],
}

/// Built-in rules, lowest priority first.
pub const PRECEDENCE: [HeuristicRule; 3] = [
    HeuristicRule {
        kind: Modifier::Config,
        priority: 10,
        file_name: "configdirs",
        default_prefixes: &["/etc/"],
    },
    HeuristicRule {
        kind: Modifier::State,
        priority: 20,
        file_name: "statedirs",
        default_prefixes: &[
            "/usr/src/debug",
            "/dev",
            "/home",
            "/proc",
            "/root",
            "/run",
            "/sys",
            "/tmp",
            "/var",
        ],
    },
    HeuristicRule {
        kind: Modifier::Boot,
        priority: 30,
        file_name: "bootdirs",
        default_prefixes: &[
            "/boot",
            "/usr/lib/modules",
            "/usr/lib/kernel",
            "/usr/bin/bootctl",
            "/usr/lib/gummiboot",
            "/usr/lib/systemd/boot",
        ],
    },
];

/// Look up the built-in rule for a modifier kind.
pub fn rule_for(kind: Modifier) -> Option<&'static HeuristicRule> {
    PRECEDENCE.iter().find(|r| r.kind == kind)
}

/// Where a classifier gets the prefix list for a rule.
pub trait PrefixSource {
    fn load_or_init(&self, rule: &HeuristicRule) -> MixResult<Vec<String>>;
}

/// Persistent prefix lists, one file per modifier kind.
///
/// Nothing is cached: every load re-reads the file so operator edits made
/// between builds take effect.
#[derive(Debug, Clone)]
pub struct HeuristicStore {
    dir: PathBuf,
}

impl HeuristicStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, rule: &HeuristicRule) -> PathBuf {
        self.dir.join(rule.file_name)
    }

    /// Read the prefix list for `rule`, creating it with defaults if absent.
    pub fn load_or_init(&self, rule: &HeuristicRule) -> MixResult<Vec<String>> {
        let path = self.path_for(rule);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(parse_prefixes(&content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                write_defaults(&path, rule.default_prefixes)
                    .map_err(|source| MixError::HeuristicInit {
                        path: path.clone(),
                        source,
                    })?;
                tracing::info!(path = %path.display(), kind = %rule.kind, "created default heuristic list");
                Ok(rule.default_prefixes.iter().map(|p| p.to_string()).collect())
            }
            Err(source) => Err(MixError::HeuristicRead { path, source }),
        }
    }
}

impl PrefixSource for HeuristicStore {
    fn load_or_init(&self, rule: &HeuristicRule) -> MixResult<Vec<String>> {
        HeuristicStore::load_or_init(self, rule)
    }
}

/// Defaults are persisted as one space-separated line.
fn write_defaults(path: &Path, prefixes: &[&str]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    writeln!(file, "{}", prefixes.join(" "))?;
    file.sync_all()
}

/// Split a list file into prefixes.
///
/// Entries may be separated by any whitespace, including newlines. A line
/// wrapped in `[...]` is accepted as well.
pub fn parse_prefixes(content: &str) -> Vec<String> {
    let mut prefixes = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        let line = line.strip_prefix('[').unwrap_or(line);
        let line = line.strip_suffix(']').unwrap_or(line);
        prefixes.extend(line.split_whitespace().map(str::to_string));
    }
    prefixes
}

fn matches_any(name: &str, prefixes: &[String]) -> bool {
    prefixes
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .any(|p| name.starts_with(p))
}

/// Applies an ordered rule set to manifest files.
#[derive(Clone)]
pub struct Classifier<'a> {
    store: &'a dyn PrefixSource,
    rules: Vec<HeuristicRule>,
}

impl<'a> Classifier<'a> {
    /// Classifier using the built-in [`PRECEDENCE`] table.
    pub fn new(store: &'a dyn PrefixSource) -> Self {
        Self::with_rules(store, PRECEDENCE.to_vec())
    }

    /// Classifier with a custom rule set; rules are sorted by priority.
    pub fn with_rules(store: &'a dyn PrefixSource, mut rules: Vec<HeuristicRule>) -> Self {
        rules.sort_by_key(|r| r.priority);
        Self { store, rules }
    }

    pub fn rules(&self) -> &[HeuristicRule] {
        &self.rules
    }

    /// Compute the classified form of `file`.
    ///
    /// The input is left untouched; on error no partial result escapes.
    pub fn classify(&self, file: &File) -> MixResult<File> {
        let mut modifier = file.modifier;
        for rule in &self.rules {
            let prefixes = self.store.load_or_init(rule)?;
            if matches_any(&file.name, &prefixes) {
                modifier = rule.kind;
            }
        }

        let status = match file.status {
            Status::Deleted => Status::Ghosted,
            other => other,
        };

        Ok(File {
            modifier,
            status,
            ..file.clone()
        })
    }

    /// Classify every file of `manifest` in order, stopping at the first error.
    ///
    /// Files before the failing one are committed; the failing file and all
    /// after it are left unchanged.
    pub fn apply(&self, manifest: &mut Manifest) -> MixResult<()> {
        for file in manifest.files.iter_mut() {
            let classified = self.classify(file)?;
            if classified.modifier != file.modifier {
                tracing::debug!(file = %file.name, modifier = %classified.modifier, "classified");
            }
            *file = classified;
        }
        Ok(())
    }
}

/// Classify a single file with the built-in rule set.
pub fn classify(store: &HeuristicStore, file: &File) -> MixResult<File> {
    Classifier::new(store).classify(file)
}

/// Run the heuristic pass over a whole manifest with the built-in rule set.
pub fn apply_heuristics(store: &HeuristicStore, manifest: &mut Manifest) -> MixResult<()> {
    Classifier::new(store).apply(manifest)
}
