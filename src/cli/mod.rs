pub mod run;

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Log to stderr, filtered by `RUST_LOG` and defaulting to `info`. Colour
/// only when stderr is a terminal.
///
/// Uses `try_init` so a second call (e.g. from tests) is a no-op.
pub(crate) fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}
