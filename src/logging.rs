//! Logger setup for Rust and Python callers.

use std::io::Write;

use chrono::Local;
use env_logger::Builder;
use log::LevelFilter;
#[cfg(feature = "python")]
use pyo3::prelude::*;

use crate::error::{Result, SunshadeError};

fn resolve_level(level: &str) -> Result<LevelFilter> {
    level
        .parse::<LevelFilter>()
        .map_err(|_| SunshadeError::InvalidLogLevel(level.to_string()))
}

/// Apply the explicit level, else the `RUST_LOG` directives, else `info`.
fn apply_filters(builder: &mut Builder, level: Option<&str>, env: Option<&str>) -> Result<()> {
    match (level, env) {
        (Some(l), _) => {
            builder.filter_level(resolve_level(l)?);
        }
        (None, Some(directives)) if !directives.trim().is_empty() => {
            builder.parse_filters(directives);
        }
        _ => {
            builder.filter_level(LevelFilter::Info);
        }
    }
    Ok(())
}

/// Install an env_logger backend writing `[HH:MM:SS LEVEL] message` lines.
///
/// The level comes from `level`, then `RUST_LOG` (module directives such as
/// `sunshade::shadowing=debug` are honoured), then defaults to `info`.
/// Calling this again after a logger is installed does nothing.
pub fn init_logging_pure(level: Option<&str>) -> Result<()> {
    let env = std::env::var("RUST_LOG").ok();
    let mut builder = Builder::new();
    apply_filters(&mut builder, level, env.as_deref())?;
    let installed = builder
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {:5}] {}",
                Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .try_init()
        .is_ok();
    if installed {
        log::debug!("Logger initialized (max level: {})", log::max_level());
    }
    Ok(())
}

/// Route the extension's log output to stderr (PyO3 wrapper).
#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(signature = (level=None))]
pub fn init_logging(level: Option<&str>) -> PyResult<()> {
    Ok(init_logging_pure(level)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, Log, Metadata};

    fn build(level: Option<&str>, env: Option<&str>) -> env_logger::Logger {
        let mut builder = Builder::new();
        apply_filters(&mut builder, level, env).unwrap();
        builder.build()
    }

    fn enabled(logger: &env_logger::Logger, target: &str, level: Level) -> bool {
        logger.enabled(&Metadata::builder().target(target).level(level).build())
    }

    #[test]
    fn test_explicit_level_wins() {
        assert_eq!(resolve_level("warn").unwrap(), LevelFilter::Warn);
        assert_eq!(resolve_level("DEBUG").unwrap(), LevelFilter::Debug);
        assert_eq!(build(Some("warn"), Some("trace")).filter(), LevelFilter::Warn);
    }

    #[test]
    fn test_bad_level_is_rejected() {
        assert_eq!(
            resolve_level("loud"),
            Err(SunshadeError::InvalidLogLevel("loud".into()))
        );
        let mut builder = Builder::new();
        assert!(apply_filters(&mut builder, Some("loud"), None).is_err());
    }

    #[test]
    fn test_env_module_directives_are_honoured() {
        let logger = build(None, Some("sunshade=debug"));
        assert_eq!(logger.filter(), LevelFilter::Debug);
        assert!(enabled(&logger, "sunshade::shadowing", Level::Debug));
        assert!(!enabled(&logger, "rayon_core", Level::Debug));

        let logger = build(None, Some("warn,sunshade::pipeline=trace"));
        assert!(enabled(&logger, "sunshade::pipeline", Level::Trace));
        assert!(!enabled(&logger, "sunshade::shadowing", Level::Info));
        assert!(enabled(&logger, "sunshade::shadowing", Level::Warn));
    }

    #[test]
    fn test_defaults_to_info() {
        assert_eq!(build(None, None).filter(), LevelFilter::Info);
        assert_eq!(build(None, Some("  ")).filter(), LevelFilter::Info);
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging_pure(Some("error")).unwrap();
        init_logging_pure(Some("error")).unwrap();
    }
}
