//! Tests for the domain error taxonomy

use std::error::Error as _;
use wasabi_domain::error::Error;

#[test]
fn test_disabled_error_names_component() {
    let err = Error::disabled("redis");
    assert!(err.is_disabled());
    assert_eq!(err.to_string(), "redis is disabled");
}

#[test]
fn test_configuration_error_keeps_source() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err = Error::Configuration {
        message: "cannot read file".to_string(),
        source: Some(Box::new(io)),
    };

    assert_eq!(err.to_string(), "Configuration error: cannot read file");
    assert!(err.source().is_some());
    assert!(!err.is_disabled());
}

#[test]
fn test_io_error_converts() {
    fn fails() -> wasabi_domain::Result<()> {
        Err(std::io::Error::other("boom"))?;
        Ok(())
    }

    let err = fails().expect_err("io error should propagate");
    assert!(matches!(err, Error::Io { .. }));
}
