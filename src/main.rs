//! Mixer - mix content builder.
//!
//! Builds the chroots for an OS update mix, bootstrapping the signing
//! certificate on the first build, and classifies manifest files into
//! config, state and boot content.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use mixer::commands;
use mixer::config::Config;
use mixer::preflight;
use mixer::MixError;

#[derive(Parser)]
#[command(name = "mixer")]
#[command(about = "Mix content builder")]
#[command(
    after_help = "QUICK START:\n  mixer preflight          Check host programs and workspace\n  mixer heuristics init    Create default heuristic lists\n  mixer build chroots      Build chroots (creates certificate on first run)\n  mixer classify <chroot>  Classify a chroot into a manifest"
)]
struct Cli {
    /// Supply a specific builder.conf to use for mixing
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug diagnostics (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Skip the host program check
    #[arg(long, global = true)]
    skip_preflight: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build mix content
    Build {
        #[command(subcommand)]
        target: BuildTarget,
    },

    /// Scan a chroot into a manifest and apply the file heuristics
    Classify {
        /// Chroot directory to scan
        chroot: PathBuf,
        /// Manifest JSON of the previous build (enables deletion tracking)
        #[arg(long)]
        previous: Option<PathBuf>,
        /// Write the manifest JSON here instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Manifest name (default: chroot directory name)
        #[arg(long)]
        name: Option<String>,
        /// Mix version recorded in the manifest
        #[arg(long, default_value = "0")]
        version: u32,
    },

    /// Manage the config/state/boot heuristic lists
    Heuristics {
        #[command(subcommand)]
        action: HeuristicsAction,
    },

    /// Run preflight checks
    Preflight {
        /// Fail if any checks fail (exit code 1)
        #[arg(long)]
        strict: bool,
    },

    /// Show information
    Show {
        #[command(subcommand)]
        what: ShowTarget,
    },
}

#[derive(Subcommand)]
enum BuildTarget {
    /// Build chroots for the mix
    Chroots {
        /// Do not generate a certificate to sign the Manifest.MoM
        #[arg(long)]
        no_signing: bool,
    },
}

#[derive(Subcommand)]
enum HeuristicsAction {
    /// Create missing lists with built-in defaults
    Init,
    /// Print the lists in precedence order
    Show,
}

#[derive(Subcommand)]
enum ShowTarget {
    /// Show current configuration
    Config,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Build { target } => {
            if !cli.skip_preflight {
                preflight::require_host_tools()?;
            }
            let config = Config::load(config_path)?;
            match target {
                BuildTarget::Chroots { no_signing } => {
                    commands::cmd_build_chroots(&config, no_signing)?;
                }
            }
        }

        Commands::Classify {
            chroot,
            previous,
            output,
            name,
            version,
        } => {
            let config = Config::load(config_path)?;
            commands::cmd_classify(
                &config,
                commands::ClassifyArgs {
                    chroot,
                    previous,
                    output,
                    name,
                    version,
                },
            )?;
        }

        Commands::Heuristics { action } => {
            let config = Config::load(config_path)?;
            let action = match action {
                HeuristicsAction::Init => commands::HeuristicsAction::Init,
                HeuristicsAction::Show => commands::HeuristicsAction::Show,
            };
            commands::cmd_heuristics(&config, action)?;
        }

        Commands::Preflight { strict } => {
            // Host checks still run without a workspace
            let config = match Config::load(config_path) {
                Ok(config) => Some(config),
                Err(e) => {
                    eprintln!("[WARN] Workspace checks skipped: {:#}", e);
                    None
                }
            };
            commands::cmd_preflight(config.as_ref(), strict)?;
        }

        Commands::Show { what } => match what {
            ShowTarget::Config => {
                let config = Config::load(config_path)?;
                commands::cmd_show_config(&config)?;
            }
        },
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load .env if present
    dotenvy::dotenv().ok();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let fatal = e
                .chain()
                .any(|cause| cause.downcast_ref::<MixError>().is_some_and(MixError::is_fatal));
            if fatal {
                eprintln!("FATAL: {:#}", e);
            } else {
                eprintln!("ERROR: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}
