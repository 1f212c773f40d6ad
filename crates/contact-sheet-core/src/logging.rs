//! Subscriber initialisation

use crate::config::SheetConfig;
use tracing_subscriber::EnvFilter;

/// Install the process-wide fmt subscriber.
///
/// With `verbose_logging` the default level is `debug` and `RUST_LOG` may
/// override it; otherwise the level is pinned to `info`. Calling this more
/// than once is harmless.
pub fn init(config: &SheetConfig) {
    let filter = if config.verbose_logging {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let config = SheetConfig::new().with_verbose_logging(true);
        init(&config);
        init(&config);
        tracing::debug!("still alive");
    }
}
