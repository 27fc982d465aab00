//! CLI command handlers.
//!
//! Each submodule handles a specific CLI command:
//! - `build` - Build mix chroots (bootstraps trust material)
//! - `classify` - Scan a chroot into a manifest and apply heuristics
//! - `heuristics` - Create or show the heuristic lists
//! - `preflight` - Run preflight checks
//! - `show` - Display information

pub mod build;
pub mod classify;
pub mod heuristics;
mod preflight;
mod show;

pub use build::cmd_build_chroots;
pub use classify::{cmd_classify, ClassifyArgs};
pub use heuristics::{cmd_heuristics, HeuristicsAction};
pub use preflight::cmd_preflight;
pub use show::cmd_show_config;
