use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("Not connected")]
    NotConnected,

    #[error("Send failed: {0}")]
    Send(String),

    #[error("Receive error: {0}")]
    Receive(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Frame decode error: {0}")]
    FrameDecode(String),

    #[error("Telemetry decode error: {0}")]
    TelemetryDecode(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Reasons a `connect` attempt can fail. The `Display` text is what
/// subscribers see on the error channel.
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Connection timeout")]
    Timeout,

    #[error("Connection refused - is the server running?")]
    Refused,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Connection failed: {0}")]
    Failed(String),
}

impl From<image::ImageError> for AppError {
    fn from(error: image::ImageError) -> Self {
        AppError::FrameDecode(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

// Helper functions for creating errors
impl AppError {
    pub fn send(msg: impl Into<String>) -> Self {
        AppError::Send(msg.into())
    }

    pub fn receive(msg: impl Into<String>) -> Self {
        AppError::Receive(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        AppError::Protocol(msg.into())
    }

    pub fn frame_decode(msg: impl Into<String>) -> Self {
        AppError::FrameDecode(msg.into())
    }

    pub fn telemetry_decode(msg: impl Into<String>) -> Self {
        AppError::TelemetryDecode(msg.into())
    }

    pub fn invalid_command(msg: impl Into<String>) -> Self {
        AppError::InvalidCommand(msg.into())
    }
}

impl ConnectionError {
    pub fn invalid_address(msg: impl Into<String>) -> Self {
        ConnectionError::InvalidAddress(msg.into())
    }

    pub fn failed(msg: impl Into<String>) -> Self {
        ConnectionError::Failed(msg.into())
    }

    /// Classifies a socket-level failure from `TcpStream::connect_timeout`.
    pub fn from_io(error: &std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => {
                ConnectionError::Timeout
            }
            std::io::ErrorKind::ConnectionRefused => ConnectionError::Refused,
            _ => ConnectionError::Failed(error.to_string()),
        }
    }
}
