//! Client for the SIRA controller streaming protocol.
//!
//! This library provides functionality for:
//! - Holding one TCP connection to a SIRA controller board
//! - Demultiplexing camera frames and JSON telemetry from a single socket
//! - Sending JSON commands back to the controller
//! - Configuration, logging and a bounded telemetry log for front-ends

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod frame;
pub mod logging;
pub mod protocol;
pub mod telemetry;

pub use client::{commands, ClientEvent, StreamingClient};
pub use config::{Config, ConnectionConfig};
pub use error::{AppError, ConnectionError, Result};
pub use frame::{Frame, FrameDecoder};
pub use protocol::{Message, MessageType};
pub use telemetry::{Telemetry, TelemetryLog};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
///
/// Sets up logging for applications that do not bring their own logger.
///
/// # Arguments
///
/// * `verbosity` - 0 for info, 1 for debug, 2 or more for trace
/// * `log_file` - Optional path to a log file. If None, logs will only be output to stdout.
pub fn initialize(verbosity: u8, log_file: Option<&str>) -> anyhow::Result<()> {
    logging::setup_logging(verbosity, log_file)?;
    logging::log_app_start(VERSION);
    Ok(())
}

/// Creates a client for the configured controller without connecting it.
pub fn new_client(config: &Config) -> StreamingClient {
    StreamingClient::new(config.connection.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty(), "Version should not be empty");
    }

    #[test]
    fn test_new_client_is_disconnected() {
        let client = new_client(&Config::default());
        assert!(!client.is_connected());
        assert_eq!(client.config().port, 8080);
    }
}
