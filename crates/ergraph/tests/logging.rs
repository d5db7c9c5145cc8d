//! Tests for logging initialization
//!
//! Only one global subscriber can be installed per process, so these tests
//! check that initialization never panics rather than inspecting output.

use ergraph::core::logging::{init_logging, LogFormat};
use std::str::FromStr;

#[test]
fn test_log_format_parsing() {
    assert_eq!(LogFormat::from_str("compact").unwrap(), LogFormat::Compact);
    assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
    assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
    assert!(LogFormat::from_str("xml").is_err());
}

#[test]
fn test_log_format_variants() {
    assert_eq!(LogFormat::variants(), &["compact", "pretty", "json"]);
}

#[test]
fn test_init_logging_levels_and_formats() {
    for level in ["trace", "debug", "info", "warn", "error", "off"] {
        let _ = init_logging(Some(level), Some("compact"));
    }
    let _ = init_logging(Some("info"), Some("pretty"));
    let _ = init_logging(Some("info"), Some("json"));
    let _ = init_logging(None, None);
}

#[test]
fn test_init_logging_invalid_format() {
    assert!(init_logging(Some("info"), Some("invalid_format")).is_err());
}
