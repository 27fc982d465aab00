//! Update manifest data model.
//!
//! A [`Manifest`] is the ordered list of files produced by one build of a mix.
//! Each [`File`] carries a lifecycle [`Status`] and a behavioral [`Modifier`]
//! that update clients use to decide how to treat the path across upgrades.
//!
//! The JSON form written by [`Manifest::save`] is an inspection format, not
//! the published update manifest.

pub mod heuristics;
pub mod scan;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub use heuristics::{
    apply_heuristics, classify, Classifier, HeuristicRule, HeuristicStore, PrefixSource,
    PRECEDENCE,
};

/// Lifecycle status of a file in a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Unchanged,
    Deleted,
    /// Terminal: the file existed previously and is gone now.
    Ghosted,
}

impl Status {
    /// Single-character flag used in manifest listings.
    pub fn flag(self) -> char {
        match self {
            Status::Unchanged => '.',
            Status::Deleted => 'd',
            Status::Ghosted => 'g',
        }
    }

    pub fn is_removed(self) -> bool {
        matches!(self, Status::Deleted | Status::Ghosted)
    }
}

/// Behavioral class of a file. At most one is set per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    #[default]
    None,
    Config,
    State,
    Boot,
}

impl Modifier {
    pub fn flag(self) -> char {
        match self {
            Modifier::None => '.',
            Modifier::Config => 'c',
            Modifier::State => 's',
            Modifier::Boot => 'b',
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Modifier::None => "none",
            Modifier::Config => "config",
            Modifier::State => "state",
            Modifier::Boot => "boot",
        };
        f.write_str(name)
    }
}

/// Kind of filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    #[default]
    Regular,
    Directory,
    Link,
}

impl FileType {
    pub fn flag(self) -> char {
        match self {
            FileType::Regular => 'F',
            FileType::Directory => 'D',
            FileType::Link => 'L',
        }
    }
}

/// One filesystem entry tracked by a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct File {
    /// Absolute path, unique within the manifest.
    pub name: String,
    /// SHA-256 of the content (or link target); empty for directories.
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub modifier: Modifier,
    #[serde(default)]
    pub file_type: FileType,
}

impl File {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifier = modifier;
        self
    }

    /// Four-column flag string, e.g. `F.c.` or `F..g`.
    pub fn flags(&self) -> String {
        let mut flags = String::with_capacity(4);
        flags.push(self.file_type.flag());
        flags.push(self.status.flag());
        flags.push(self.modifier.flag());
        flags.push('.');
        flags
    }
}

/// Ordered collection of files for one build of a mix.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub version: u32,
    pub files: Vec<File>,
}

impl Manifest {
    pub fn new(name: impl Into<String>, version: u32) -> Self {
        Self {
            name: name.into(),
            version,
            files: Vec::new(),
        }
    }

    pub fn find(&self, name: &str) -> Option<&File> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Save manifest to JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write manifest {}", path.display()))?;
        Ok(())
    }

    /// Load manifest from JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        let manifest: Self = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse manifest {}", path.display()))?;
        Ok(manifest)
    }

    /// Print a listing with one `flags hash name` line per file.
    pub fn print(&self) {
        println!("MANIFEST\t{}", self.name);
        println!("version:\t{}", self.version);
        println!("filecount:\t{}", self.files.len());
        println!();
        for file in &self.files {
            let hash = if file.hash.is_empty() {
                "-"
            } else {
                file.hash.as_str()
            };
            println!("{}\t{}\t{}", file.flags(), hash, file.name);
        }
    }
}
