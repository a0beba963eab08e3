//! Tracing initialization
//!
//! Logs always go to stderr so stdout stays clean for results and JSON.
//! Set `LOG_FORMAT=json` for structured JSON output. `RUST_LOG` overrides
//! the level chosen from the command line.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive for a `-v` count and the `--debug` flag
///
/// Default is warn; -v info, -vv debug, -vvv trace. `--debug` raises the sx
/// crates to at least debug without touching dependencies.
pub fn default_directive(verbosity: u8, debug: bool) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    if debug && verbosity < 2 {
        format!("{},sx=debug,sx_search=debug", level)
    } else {
        level.to_string()
    }
}

/// Initialize tracing/logging for the command-line tool
pub fn init_tracing(verbosity: u8, debug: bool) -> anyhow::Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives)?,
        _ => EnvFilter::try_new(default_directive(verbosity, debug))?,
    };

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .try_init()?;
    }

    Ok(())
}
