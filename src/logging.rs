//! Logging init: structured events to stderr, level picked by verbosity.

use tracing_subscriber::EnvFilter;

/// Default directive for a verbosity count; `quiet` wins over any count
pub fn default_directive(verbosity: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the verbosity flags.
/// Calling this twice keeps the first subscriber.
pub fn init_logging(verbosity: u8, quiet: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity, quiet)));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(verbosity, quiet, "logging initialized");
    }
}
