mod history;
mod types;

pub use history::{LogLevel, TelemetryEntry, TelemetryLog, DEFAULT_MAX_ENTRIES};
pub use types::Telemetry;
