//! Logger setup
//!
//! Every executable logs to stdout and to the session's log file. Lines are prefixed with the
//! seconds elapsed since the session started and a three letter level tag, which is coloured on
//! stdout only.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::Colorize;
use log::{self, info, Level};
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level of `INFO` or more verbose, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// `min_level` must be `Info` or more verbose, so that the session header always makes it into
/// the log file. Must only be called once per process.
pub fn logger_init(
    min_level: LevelFilter,
    session: &session::Session
) -> Result<(), LoggerInitError> {
    if min_level < Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level))
    }

    let log_file = fern::log_file(&session.log_file_path)
        .map_err(LoggerInitError::LogFileInitError)?;

    let stdout = fern::Dispatch::new()
        .format(|out, message, record| out.finish(format_args!(
            "{}",
            format_line(record.level(), record.target(), message, true)
        )))
        .chain(std::io::stdout());

    let file = fern::Dispatch::new()
        .format(|out, message, record| out.finish(format_args!(
            "{}",
            format_line(record.level(), record.target(), message, false)
        )))
        .chain(log_file);

    fern::Dispatch::new()
        .level(min_level)
        .chain(stdout)
        .chain(file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    if let Some(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Log level: {:?}", min_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

/// Parse a log level name (`info`, `debug` or `trace`) given on the command line.
pub fn parse_level(level: &str) -> Result<LevelFilter, LoggerInitError> {
    let filter: LevelFilter = level.parse()
        .unwrap_or(LevelFilter::Off);

    if filter < Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(filter))
    }

    Ok(filter)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Format one log line. Debug and trace lines include the target.
fn format_line(
    level: Level,
    target: &str,
    message: &std::fmt::Arguments,
    coloured: bool
) -> String {
    let tag = if coloured {
        level_tag_coloured(level)
    }
    else {
        level_tag(level).to_string()
    };

    if level > Level::Info {
        format!(
            "[{:10.6} {}] {}: {}",
            session::get_elapsed_seconds(),
            tag,
            target,
            message
        )
    }
    else {
        format!("[{:10.6} {}] {}", session::get_elapsed_seconds(), tag, message)
    }
}

/// Three letter tag for a log level
fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Trace => "TRC",
        Level::Debug => "DBG",
        Level::Info  => "INF",
        Level::Warn  => "WRN",
        Level::Error => "ERR"
    }
}

fn level_tag_coloured(level: Level) -> String {
    let tag = level_tag(level);

    match level {
        Level::Trace => tag.dimmed().italic(),
        Level::Debug => tag.dimmed(),
        Level::Info  => tag.normal(),
        Level::Warn  => tag.yellow(),
        Level::Error => tag.red().bold()
    }.to_string()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("info").unwrap(), LevelFilter::Info);
        assert_eq!(parse_level("DEBUG").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_level("trace").unwrap(), LevelFilter::Trace);
        assert!(parse_level("warn").is_err());
        assert!(parse_level("loud").is_err());
    }

    #[test]
    fn test_format_line() {
        let info = format_line(Level::Info, "long_lib::long_ctrl", &format_args!("hello"), false);
        assert!(info.starts_with('['));
        assert!(info.ends_with("INF] hello"));

        // Verbose levels name the target
        let debug = format_line(Level::Debug, "long_lib::long_ctrl", &format_args!("x = {}", 1), false);
        assert!(debug.ends_with("DBG] long_lib::long_ctrl: x = 1"));
    }
}
