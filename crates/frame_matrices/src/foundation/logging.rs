//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system
///
/// Reads the filter from `RUST_LOG`, falling back to `default_filter`
/// (for example `"info"`). Call once from a binary's `main`.
pub fn init(default_filter: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

/// Initialize logging for unit and integration tests
///
/// Safe to call from every test; only the first call installs the logger.
pub fn try_init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
