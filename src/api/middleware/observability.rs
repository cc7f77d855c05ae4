//! Observability setup.
//!
//! Installs the tracing subscriber. RUST_LOG controls the level (default
//! info); LOG_FORMAT=json switches to structured JSON lines.

use std::env;
use tracing_subscriber::EnvFilter;

/// Initialize tracing. Output goes to stderr without ANSI colours so it can
/// be captured by log collectors.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false);

    // try_init: tests may install a subscriber more than once.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
