//! Logging setup.
//!
//! pkgmirror logs through the `log` facade with `env_logger` as the backend.
//! Records go to stderr as `<timestamp> - [<LEVEL>] - <message>`.
//!
//! The logger is installed before the configuration is read, at INFO, so the
//! configuration load itself can be reported. Once the file is parsed its
//! `loglevel` is applied with [`set_level`].

use std::io::Write;

use log::LevelFilter;

use crate::error::{Error, Result};

/// Install the global logger at the given level.
///
/// Calling this more than once is harmless; later calls only adjust the
/// level.
pub fn init(level: LevelFilter) {
    if builder().try_init().is_err() {
        log::debug!("Logger already installed");
    }
    set_level(level);
}

/// Only records from this crate pass the logger's own filter; the runtime
/// level is then governed by [`set_level`].
fn builder() -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_module("pkgmirror", LevelFilter::Trace)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - [{}] - {}",
                buf.timestamp(),
                record.level(),
                record.args()
            )
        });
    builder
}

/// Change the maximum level of the installed logger.
pub fn set_level(level: LevelFilter) {
    log::set_max_level(level);
}

/// Parse a level name from the configuration file.
///
/// Accepts the `log` crate names (`trace`, `debug`, `info`, `warn`, `error`,
/// `off`) in any case, plus `WARNING` and `CRITICAL`, which older
/// configuration files use.
pub fn parse_level(name: &str) -> Result<LevelFilter> {
    let normalized = name.trim().to_ascii_lowercase();
    let level = match normalized.as_str() {
        "warning" => LevelFilter::Warn,
        "critical" | "fatal" => LevelFilter::Error,
        other => other.parse().map_err(|_| Error::ConfigParse {
            message: format!("Unknown log level '{}'", name),
            hint: Some("Use one of DEBUG, INFO, WARNING, ERROR, CRITICAL".to_string()),
        })?,
    };
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_filters_other_crates() {
        use log::{Level, Log, Metadata};

        let logger = builder().build();
        let enabled = |target: &str, level: Level| {
            logger.enabled(&Metadata::builder().target(target).level(level).build())
        };

        assert!(enabled("pkgmirror::runner", Level::Trace));
        assert!(enabled("pkgmirror", Level::Info));
        assert!(!enabled("rayon_core::registry", Level::Error));
        assert!(!enabled("serde_yaml", Level::Debug));
    }

    #[test]
    fn test_parse_level_rust_names() {
        assert_eq!(parse_level("debug").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_level("INFO").unwrap(), LevelFilter::Info);
        assert_eq!(parse_level("Warn").unwrap(), LevelFilter::Warn);
        assert_eq!(parse_level("trace").unwrap(), LevelFilter::Trace);
        assert_eq!(parse_level("off").unwrap(), LevelFilter::Off);
    }

    #[test]
    fn test_parse_level_legacy_names() {
        assert_eq!(parse_level("WARNING").unwrap(), LevelFilter::Warn);
        assert_eq!(parse_level("CRITICAL").unwrap(), LevelFilter::Error);
        assert_eq!(parse_level(" ERROR ").unwrap(), LevelFilter::Error);
    }

    #[test]
    fn test_parse_level_unknown() {
        let err = parse_level("verbose").unwrap_err();
        let display = err.to_string();
        assert!(display.contains("Unknown log level 'verbose'"));
        assert!(display.contains("hint:"));
    }
}
