//! Show command - displays information.

use anyhow::Result;

use crate::config::Config;

/// Execute `mixer show config`.
pub fn cmd_show_config(config: &Config) -> Result<()> {
    config.print();
    Ok(())
}
