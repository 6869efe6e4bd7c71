use std::io;
use std::path::PathBuf;

use kiln::error::{describe, CatalogKind, Error};

#[test]
fn test_error_conversion() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let kiln_err: Error = io_err.into();

    match kiln_err {
        Error::IoError(_) => (),
        _ => panic!("Expected IoError variant"),
    }
}

#[test]
fn test_error_display() {
    let err = Error::ConfigError("invalid answers".to_string());
    assert_eq!(err.to_string(), "Configuration error: invalid answers.");

    let err = Error::UnknownCatalogKey {
        kind: CatalogKind::Feature,
        key: "doesNotExist".to_string(),
        valid: vec!["auth".to_string(), "mailer".to_string()],
    };
    assert_eq!(err.to_string(), "Unknown feature 'doesNotExist'. Valid values: auth, mailer.");

    let err = Error::ProjectionFailure { file: "src/app.ts".to_string(), line: 4, reason: "enum".to_string() };
    assert_eq!(err.to_string(), "Failed to project 'src/app.ts' to JavaScript at line 4: enum.");
}

#[test]
fn test_recoverable_errors() {
    assert!(Error::DestinationNotEmpty { path: PathBuf::from("/tmp/api") }.is_recoverable());
    assert!(Error::ValidationError("blank name".to_string()).is_recoverable());
    assert!(!Error::CyclicFeatureDependency { cycle: vec!["a".to_string(), "a".to_string()] }.is_recoverable());
    assert!(!Error::TemplateError("broken".to_string()).is_recoverable());
}

#[test]
fn test_printed_message_depends_on_recoverability() {
    let input = describe(&Error::ValidationError("blank name".to_string()));
    assert!(input.ends_with("Nothing was generated. Adjust the input and run kiln again."));

    let defect = describe(&Error::TemplateError("broken".to_string()));
    assert!(defect.starts_with("Generation failed: "));
    assert!(!defect.contains("Nothing was generated"));
}
