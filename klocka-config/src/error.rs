//! Failures while assembling a [`KlockaConfig`](crate::KlockaConfig).

use std::path::PathBuf;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

#[derive(Debug, Error)]
pub enum ConfigError {
    /// `load_from_path` was pointed at a file that does not exist.
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// Values parsed but broke a rule, e.g. an unknown `telemetry.log_level`
    /// or a `scenario.await_timeout_ms` of zero. Lists every offending field.
    #[error("Invalid configuration:\n{}", format_validation_errors(.0))]
    Validation(#[from] ValidationErrors),

    /// A layer could not be read or did not fit the schema, such as a
    /// `clock.start` that is not RFC 3339.
    #[error("Configuration parsing error: {0}")]
    Parsing(#[from] figment::Error),
}

fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut output = String::new();
    write_validation_errors(&mut output, "", errors);
    output
}

fn write_validation_errors(output: &mut String, prefix: &str, errors: &ValidationErrors) {
    use std::fmt::Write;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(errors) => {
                let _ = writeln!(output, "Field '{}':", path);
                for error in errors {
                    let message = match &error.message {
                        Some(msg) => msg.to_string(),
                        None => error.code.to_string(),
                    };
                    let _ = writeln!(output, "  - {}", message);
                }
            }
            ValidationErrorsKind::Struct(nested) => write_validation_errors(output, &path, nested),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    write_validation_errors(output, &format!("{path}[{index}]"), nested);
                }
            }
        }
    }
}
