use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "mdex=info,warn";
pub const VERBOSE_FILTER: &str = "mdex=debug,info";

pub fn init_logging() {
    init_logging_with(DEFAULT_FILTER);
}

/// `RUST_LOG` always wins over `default_filter`.
pub fn init_logging_with(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = fmt().with_env_filter(env_filter).with_target(false).try_init();
}
