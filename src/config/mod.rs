mod connection;
mod loader;

pub use connection::ConnectionConfig;
pub use loader::{Config, LoggingConfig, DEFAULT_CONFIG_PATH};
