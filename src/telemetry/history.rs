use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::fmt;

pub const DEFAULT_MAX_ENTRIES: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

impl TelemetryEntry {
    pub fn format_timestamp(&self) -> String {
        self.timestamp.format("%H:%M:%S%.3f").to_string()
    }
}

impl fmt::Display for TelemetryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.format_timestamp(), self.level, self.message)
    }
}

/// Bounded history of connection and telemetry events, oldest first.
pub struct TelemetryLog {
    entries: VecDeque<TelemetryEntry>,
    max_entries: usize,
}

impl Default for TelemetryLog {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl TelemetryLog {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_entries.min(DEFAULT_MAX_ENTRIES)),
            max_entries,
        }
    }

    pub fn add_entry(&mut self, level: LogLevel, message: impl Into<String>) {
        self.entries.push_back(TelemetryEntry {
            timestamp: Local::now(),
            level,
            message: message.into(),
        });
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.add_entry(LogLevel::Info, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.add_entry(LogLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.add_entry(LogLevel::Error, message);
    }

    pub fn entries(&self) -> impl Iterator<Item = &TelemetryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Case-insensitive substring match on the message text.
    pub fn search(&self, query: &str) -> Vec<&TelemetryEntry> {
        let query = query.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| entry.message.to_lowercase().contains(&query))
            .collect()
    }
}
