use std::sync::OnceLock;

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "info,reqwest=warn";

static LOGGING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install a stderr tracing subscriber. `RUST_LOG` takes precedence over
/// the default filter; `verbose` lowers the default to debug.
pub fn init_logging(verbose: bool) {
    LOGGING_INITIALIZED.get_or_init(|| {
        let default = if verbose { "debug,reqwest=warn" } else { DEFAULT_LOG_FILTER };
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

        let _ = fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
