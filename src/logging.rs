use anyhow::Result;
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use log::{debug, info, LevelFilter};
use std::io;

use crate::config::Config;

pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn setup_logging(verbosity: u8, log_file: Option<&str>) -> Result<()> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    // The dispatch passes everything; `set_verbosity` owns the effective level
    // so it can still change once the configuration file has been read.
    let mut base_config = fern::Dispatch::new().level(LevelFilter::Trace);

    // Separate file config so we can include year, month and day in file logs
    let file_config = fern::Dispatch::new().format(|out, message, record| {
        out.finish(format_args!(
            "{}[{}][{}] {}",
            Local::now().format("[%Y-%m-%d][%H:%M:%S%.3f]"),
            record.target(),
            record.level(),
            message
        ))
    });

    let stdout_config = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                Local::now().format("[%H:%M:%S%.3f]"),
                record.target(),
                colors.color(record.level()),
                message
            ))
        })
        .chain(io::stdout());

    base_config = base_config.chain(stdout_config);

    if let Some(log_file) = log_file {
        base_config = base_config.chain(file_config.chain(fern::log_file(log_file)?));
    }

    base_config.apply()?;
    set_verbosity(verbosity);

    debug!("Logging initialized at {}", level_for(verbosity));

    Ok(())
}

pub fn set_verbosity(verbosity: u8) {
    log::set_max_level(level_for(verbosity));
}

pub fn log_app_start(version: &str) {
    info!("Starting SIRA link v{}", version);
}

pub fn log_app_config(config: &Config) {
    let connection = &config.connection;
    info!("Application configured with:");
    info!("  Connection:");
    info!("    Address: {}:{}", connection.host, connection.port);
    info!("    Connect timeout: {} ms", connection.connect_timeout_ms);
    info!("    Read timeout: {} ms", connection.read_timeout_ms);
    match connection.send_timeout() {
        Some(timeout) => info!("    Send timeout: {} ms", timeout.as_millis()),
        None => info!("    Send timeout: none"),
    }
    info!("    Max payload: {} bytes", connection.max_payload_len);
    info!("  Logging:");
    info!("    Verbosity: {}", config.logging.verbosity);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for(0), LevelFilter::Info);
        assert_eq!(level_for(1), LevelFilter::Debug);
        assert_eq!(level_for(2), LevelFilter::Trace);
        assert_eq!(level_for(9), LevelFilter::Trace);
    }

    #[test]
    fn test_set_verbosity_adjusts_max_level() {
        let previous = log::max_level();

        set_verbosity(1);
        assert_eq!(log::max_level(), LevelFilter::Debug);
        set_verbosity(0);
        assert_eq!(log::max_level(), LevelFilter::Info);

        log::set_max_level(previous);
    }
}
