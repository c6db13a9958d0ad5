use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{Level, info, warn};

use boxwm::bindings;
use boxwm::commands::CommandRegistry;

/// Front end for the manager core: loads and lints the keys file with the
/// same parser and fallback policy the running manager uses. Startup
/// never fails on a bad keys file; the hardcoded defaults take over.
#[derive(Parser, Debug)]
#[command(name = "boxwm", version, about = "Stacking window manager core")]
struct Cli {
    /// Keys file to load; the hardcoded defaults are used when omitted,
    /// missing, or unreadable.
    #[arg(long)]
    keys: Option<PathBuf>,

    /// Parse the keys file, report every problem, and exit non-zero if
    /// any line was skipped.
    #[arg(long)]
    check: bool,

    /// Log level: error, warn, info, debug or trace.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// List the resolved keymodes and binding count after loading.
    #[arg(long)]
    summary: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    boxwm::tracing_sub::init(cli.log_level.parse().unwrap_or(Level::INFO));

    let registry = CommandRegistry::logging();
    let (tree, diagnostics) = bindings::load_or_default(cli.keys.as_deref(), &registry);
    for diagnostic in &diagnostics {
        warn!(%diagnostic, "keys file");
    }
    info!(bindings = tree.len(), "binding tree loaded");

    if cli.summary {
        for name in tree.keymode_names() {
            info!(keymode = name);
        }
    }

    if cli.check && !diagnostics.is_empty() {
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
