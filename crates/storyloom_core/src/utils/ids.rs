//! Identifier and timestamp generation.
//!
//! Chapters and scenes are created client-side before the backend has seen
//! them, so they carry a locally generated identifier of the form
//! `{prefix}-{unix millis}-{random suffix}` until a backend-assigned id
//! replaces it.

use chrono::{SecondsFormat, Utc};

/// Length of the random suffix appended to local ids.
const SUFFIX_LEN: usize = 8;

/// Generate a unique local identifier, e.g. `scene-1718035200000-3f9a1c2e`.
pub fn generate_local_id(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", prefix, millis, &random[..SUFFIX_LEN])
}

/// Current time as an RFC 3339 string with millisecond precision.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_local_id_format() {
        let id = generate_local_id("scene");
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "scene");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), SUFFIX_LEN);
    }

    #[test]
    fn test_generate_local_id_unique() {
        let a = generate_local_id("scene");
        let b = generate_local_id("scene");
        assert_ne!(a, b);
    }

    #[test]
    fn test_now_timestamp_parses() {
        let ts = now_timestamp();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
