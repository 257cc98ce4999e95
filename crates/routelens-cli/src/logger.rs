//! Logging setup for the routelens CLI.
//!
//! Logs go to stderr so JSON written to stdout stays parseable.
//!
//! Level selection, first match wins:
//! 1. `--verbose`: debug for routelens crates
//! 2. `--quiet`: errors only
//! 3. `RUST_LOG`
//! 4. info for routelens crates

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Install the global subscriber with an explicit filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("routelens=debug,routelens_cli=debug")
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("routelens=info,routelens_cli=info"))
    }
}

/// Whether log output should be coloured.
///
/// `NO_COLOR` disables colours, `FORCE_COLOR` forces them, otherwise stderr
/// must be a terminal that supports them.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::Term::stderr().features().colors_supported()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_build() {
        // EnvFilter's rendering is not stable; construction must not panic.
        let _verbose = filter_for(true, false);
        let _quiet = filter_for(false, true);
        let _default = filter_for(false, false);
    }
}
