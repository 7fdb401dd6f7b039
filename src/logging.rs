//! Diagnostic logging: a `tracing` fmt subscriber on stderr.
//!
//! Filter precedence: `DOCKHAND_LOG`, then `RUST_LOG`, then `warn` (`debug` with `--verbose`).
//! User-facing progress lines do not go through here; see the `log_*_stderr` helpers.
use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;

static INIT: OnceCell<()> = OnceCell::new();

pub fn filter_directive<F>(verbose: bool, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup("DOCKHAND_LOG")
        .or_else(|| lookup("RUST_LOG"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| if verbose { "debug" } else { "warn" }.to_string())
}

/// Install the global subscriber once; later calls are no-ops.
pub fn logging_init(verbose: bool) {
    if INIT.get().is_some() {
        return;
    }
    let directive = filter_directive(verbose, |k| std::env::var(k).ok());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&directive)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(crate::color_enabled_stderr());
    if tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("dockhand: logging init skipped (global subscriber already set)");
        return;
    }
    let _ = INIT.set(());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dockhand_log_beats_rust_log() {
        let env = |k: &str| match k {
            "DOCKHAND_LOG" => Some("dockhand=trace".to_string()),
            "RUST_LOG" => Some("info".to_string()),
            _ => None,
        };
        assert_eq!(filter_directive(false, env), "dockhand=trace");
    }

    #[test]
    fn verbose_only_changes_the_default() {
        assert_eq!(filter_directive(true, |_| None), "debug");
        assert_eq!(filter_directive(false, |_| None), "warn");
        let env = |k: &str| (k == "RUST_LOG").then(|| "error".to_string());
        assert_eq!(filter_directive(true, env), "error");
    }
}
