//! Heuristics command - manages the per-modifier prefix lists.

use anyhow::Result;

use crate::config::Config;
use crate::swupd::heuristics::PRECEDENCE;
use crate::swupd::HeuristicStore;

pub enum HeuristicsAction {
    /// Create missing lists with defaults
    Init,
    /// Print every list in precedence order
    Show,
}

/// Execute `mixer heuristics`.
pub fn cmd_heuristics(config: &Config, action: HeuristicsAction) -> Result<()> {
    let store = HeuristicStore::new(&config.heuristics_dir);
    for rule in &PRECEDENCE {
        let existed = store.path_for(rule).exists();
        let prefixes = store.load_or_init(rule)?;
        match action {
            HeuristicsAction::Init => {
                let verb = if existed { "[SKIP]" } else { "[NEW] " };
                println!("{} {}", verb, store.path_for(rule).display());
            }
            HeuristicsAction::Show => {
                println!("{} (priority {}):", rule.kind, rule.priority);
                for prefix in prefixes {
                    println!("  {}", prefix);
                }
            }
        }
    }
    Ok(())
}
