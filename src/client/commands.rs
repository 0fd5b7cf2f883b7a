//! Builders for the commands the console sends to the controller.

use crate::error::{AppError, Result};
use serde_json::{json, Map, Value};

/// `true` for `WIDTHxHEIGHT` with two positive integers, `x` in either case.
pub fn validate_resolution(resolution: &str) -> bool {
    let lowered = resolution.to_lowercase();
    let mut parts = lowered.split('x');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(width), Some(height), None) => {
            matches!(
                (width.trim().parse::<u32>(), height.trim().parse::<u32>()),
                (Ok(w), Ok(h)) if w > 0 && h > 0
            )
        }
        _ => false,
    }
}

pub fn set_resolution(resolution: &str) -> Result<Value> {
    if !validate_resolution(resolution) {
        return Err(AppError::invalid_command(format!(
            "resolution must look like 1280x720, got {:?}",
            resolution
        )));
    }
    Ok(json!({"type": "set_resolution", "resolution": resolution.to_lowercase()}))
}

pub fn set_fps(fps: u32) -> Result<Value> {
    if fps == 0 {
        return Err(AppError::invalid_command("fps must be greater than 0"));
    }
    Ok(json!({"type": "set_fps", "fps": fps}))
}

/// Parses a raw command given as JSON text; only objects are accepted.
pub fn parse_command(text: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::invalid_command("command must be a JSON object")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_resolution() {
        assert!(validate_resolution("1280x720"));
        assert!(validate_resolution("640X480"));
        assert!(!validate_resolution("1280"));
        assert!(!validate_resolution("0x720"));
        assert!(!validate_resolution("1280x720x3"));
        assert!(!validate_resolution("widexhigh"));
        assert!(!validate_resolution("-1x720"));
    }

    #[test]
    fn test_set_resolution_payload() {
        let command = set_resolution("1280x720").unwrap();
        assert_eq!(command, json!({"type": "set_resolution", "resolution": "1280x720"}));
        assert!(set_resolution("big").is_err());
    }

    #[test]
    fn test_set_fps() {
        assert_eq!(set_fps(30).unwrap()["fps"], 30);
        assert!(set_fps(0).is_err());
    }

    #[test]
    fn test_parse_command() {
        let map = parse_command(r#"{"type": "stand", "speed": 0.5}"#).unwrap();
        assert_eq!(map["type"], "stand");
        assert!(parse_command("[1, 2]").is_err());
        assert!(parse_command("not json").is_err());
    }
}
