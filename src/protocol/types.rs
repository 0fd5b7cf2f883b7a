use std::fmt;

/// Message type tag, the first byte of every message on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Compressed camera frame (JPEG)
    Frame,
    /// Telemetry snapshot (JSON object)
    Telemetry,
    /// Detection event, reserved
    Detection,
    /// Servo states, reserved
    ServoState,
    /// Command to the controller (JSON object)
    Command,
    /// Any tag this client does not know about
    Unknown(u8),
}

impl MessageType {
    pub const FRAME: u8 = 0x01;
    pub const TELEMETRY: u8 = 0x02;
    pub const DETECTION: u8 = 0x03;
    pub const SERVO_STATE: u8 = 0x04;
    pub const COMMAND: u8 = 0xFF;

    pub fn from_u8(tag: u8) -> Self {
        match tag {
            Self::FRAME => MessageType::Frame,
            Self::TELEMETRY => MessageType::Telemetry,
            Self::DETECTION => MessageType::Detection,
            Self::SERVO_STATE => MessageType::ServoState,
            Self::COMMAND => MessageType::Command,
            other => MessageType::Unknown(other),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            MessageType::Frame => Self::FRAME,
            MessageType::Telemetry => Self::TELEMETRY,
            MessageType::Detection => Self::DETECTION,
            MessageType::ServoState => Self::SERVO_STATE,
            MessageType::Command => Self::COMMAND,
            MessageType::Unknown(tag) => tag,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::Frame => write!(f, "FRAME"),
            MessageType::Telemetry => write!(f, "TELEMETRY"),
            MessageType::Detection => write!(f, "DETECTION"),
            MessageType::ServoState => write!(f, "SERVO_STATE"),
            MessageType::Command => write!(f, "COMMAND"),
            MessageType::Unknown(tag) => write!(f, "UNKNOWN({:#04x})", tag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags() {
        assert_eq!(MessageType::from_u8(0x01), MessageType::Frame);
        assert_eq!(MessageType::from_u8(0x02), MessageType::Telemetry);
        assert_eq!(MessageType::from_u8(0x03), MessageType::Detection);
        assert_eq!(MessageType::from_u8(0x04), MessageType::ServoState);
        assert_eq!(MessageType::from_u8(0xFF), MessageType::Command);
    }

    #[test]
    fn test_unknown_tag_keeps_value() {
        let kind = MessageType::from_u8(0x7E);
        assert_eq!(kind, MessageType::Unknown(0x7E));
        assert_eq!(kind.as_u8(), 0x7E);
        assert_eq!(kind.to_string(), "UNKNOWN(0x7e)");
    }
}
