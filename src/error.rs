//! # Error Handling
//!
//! This module defines the centralized error type for `pkgmirror`. It uses
//! the `thiserror` library to describe every failure mode the library can
//! report, with enough context to tell which mirror or program was involved.
//!
//! Only one condition is ever recovered from: an external program that does
//! not exist (`Error::ProgramNotFound`). The runner logs it and moves on to
//! the next mirror. Every other variant propagates to the binary and ends the
//! run.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for pkgmirror operations
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration file is structurally valid YAML but does not
    /// describe a usable setup.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A mirror definition could not be decoded.
    #[error("Invalid {transport} mirror '{name}': {message}")]
    MirrorDefinition {
        transport: String,
        name: String,
        message: String,
    },

    /// An external program could not be found at the configured path.
    #[error("Program not found: {}", program.display())]
    ProgramNotFound { program: PathBuf },

    /// An external program could not be started or waited on, or exited
    /// unsuccessfully where its output was required.
    #[error("Command failed: {command} - {message}")]
    Command { command: String, message: String },

    /// A worker pool could not be built.
    #[error("Worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config_parse() {
        let error = Error::ConfigParse {
            message: "Missing basedir".to_string(),
            hint: None,
        };
        let display = format!("{}", error);
        assert!(display.contains("Configuration parsing error"));
        assert!(display.contains("Missing basedir"));
        assert!(!display.contains("hint:"));
    }

    #[test]
    fn test_error_display_config_parse_with_hint() {
        let error = Error::ConfigParse {
            message: "Unknown log level 'LOUD'".to_string(),
            hint: Some("Use one of DEBUG, INFO, WARNING, ERROR".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("Unknown log level"));
        assert!(display.contains("hint:"));
        assert!(display.contains("WARNING"));
    }

    #[test]
    fn test_error_display_mirror_definition() {
        let error = Error::MirrorDefinition {
            transport: "debmirror".to_string(),
            name: "debian".to_string(),
            message: "missing field `dists`".to_string(),
        };
        let display = format!("{}", error);
        assert_eq!(
            display,
            "Invalid debmirror mirror 'debian': missing field `dists`"
        );
    }

    #[test]
    fn test_error_display_program_not_found() {
        let error = Error::ProgramNotFound {
            program: PathBuf::from("/usr/bin/aptly"),
        };
        assert_eq!(format!("{}", error), "Program not found: /usr/bin/aptly");
    }

    #[test]
    fn test_error_display_command() {
        let error = Error::Command {
            command: "/usr/bin/aptly mirror list -raw".to_string(),
            message: "exit status: 1".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Command failed"));
        assert!(display.contains("mirror list -raw"));
        assert!(display.contains("exit status: 1"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("denied"));
    }

    #[test]
    fn test_error_from_yaml_error() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("a: [unclosed").unwrap_err();
        let error: Error = yaml_error.into();
        assert!(format!("{}", error).contains("YAML parsing error"));
    }
}
