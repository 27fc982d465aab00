//! Mixer library exports.
//!
//! The binary in `main.rs` is a thin clap front end over these modules;
//! integration tests under `tests/` use them directly.

pub mod builder;
pub mod commands;
pub mod config;
pub mod error;
pub mod preflight;
pub mod process;
pub mod swupd;
pub mod timing;
pub mod trust;

pub use error::{MixError, MixResult};
