//! Integration tests for logging initialisation
//!
//! The global subscriber can only be installed once per process, so the whole
//! lifecycle is exercised inside a single test.

use core_runtime::logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
use core_runtime::Error;

#[test]
fn test_logging_initializes_once() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug)
        .with_spans(false);

    init_logging(config.clone()).expect("first initialization should succeed");
    tracing::info!(target: "core_catalog", track_count = 3, "logging ready");

    let second = init_logging(config);
    assert!(matches!(second, Err(Error::Config(_))));
}

#[test]
fn test_invalid_custom_filter_is_rejected_before_install() {
    let config = LoggingConfig::default().with_filter("core_catalog=loudest");
    assert!(matches!(init_logging(config), Err(Error::Config(_))));
}
