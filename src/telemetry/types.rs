use crate::error::{AppError, Result};
use chrono::{DateTime, Local};
use serde_json::{Map, Value};

/// One telemetry snapshot as sent by the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct Telemetry {
    pub values: Map<String, Value>,
    pub received_at: DateTime<Local>,
}

impl Telemetry {
    pub fn new(values: Map<String, Value>) -> Self {
        Self {
            values,
            received_at: Local::now(),
        }
    }

    /// Parses a UTF-8 JSON object. Arrays, scalars and invalid JSON are rejected.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(payload)
            .map_err(|e| AppError::telemetry_decode(format!("invalid UTF-8: {}", e)))?;

        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(values)) => Ok(Self::new(values)),
            Ok(other) => Err(AppError::telemetry_decode(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
            Err(e) => Err(AppError::telemetry_decode(e.to_string())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::as_bool)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_heterogeneous_values() {
        let payload = br#"{"battery": 11.7, "walking": false, "mode": "idle", "servo_count": 18}"#;
        let telemetry = Telemetry::decode(payload).unwrap();

        assert_eq!(telemetry.len(), 4);
        assert_eq!(telemetry.get_f64("battery"), Some(11.7));
        assert_eq!(telemetry.get_bool("walking"), Some(false));
        assert_eq!(telemetry.get_str("mode"), Some("idle"));
        assert_eq!(telemetry.get_f64("servo_count"), Some(18.0));
        assert!(telemetry.get("missing").is_none());
    }

    #[test]
    fn test_decode_rejects_non_objects() {
        assert!(Telemetry::decode(b"[1, 2, 3]").is_err());
        assert!(Telemetry::decode(b"42").is_err());
        assert!(Telemetry::decode(b"{\"open\": ").is_err());
        assert!(Telemetry::decode(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_decode_empty_object() {
        let telemetry = Telemetry::decode(b"{}").unwrap();
        assert!(telemetry.is_empty());
    }
}
