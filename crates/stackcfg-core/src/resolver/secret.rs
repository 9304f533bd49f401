//! Secret payload decoding

use serde_json::Value;

use crate::error::{StackcfgError, StackcfgResult};

/// Pull one field out of a JSON secret payload
///
/// Error messages never include the payload itself.
pub(crate) fn extract_field(location: &str, payload: &str, field: &str) -> StackcfgResult<String> {
    let parsed: Value = serde_json::from_str(payload)
        .map_err(|_| StackcfgError::secret_unavailable(location, "secret is not a JSON object"))?;

    match parsed.get(field) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(Value::Null) | None => Err(StackcfgError::secret_unavailable(
            location,
            format!("secret has no \"{}\" field", field),
        )),
        Some(other) => Ok(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_string_field() {
        let value = extract_field("loc", r#"{"username":"admin","password":"pw"}"#, "password").unwrap();
        assert_eq!(value, "pw");
    }

    #[test]
    fn test_extract_non_string_field() {
        assert_eq!(extract_field("loc", r#"{"port":3306}"#, "port").unwrap(), "3306");
    }

    #[test]
    fn test_missing_field() {
        let err = extract_field("loc", r#"{"password":null}"#, "password").unwrap_err();
        assert!(matches!(err, StackcfgError::SecretUnavailable { .. }));
        assert!(err.to_string().contains("password"));
    }

    #[test]
    fn test_not_json_does_not_leak_payload() {
        let err = extract_field("loc", "plain-secret-text", "password").unwrap_err();
        assert!(matches!(err, StackcfgError::SecretUnavailable { .. }));
        assert!(!err.to_string().contains("plain-secret-text"));

        // A JSON string is valid JSON but has no fields
        assert!(extract_field("loc", r#""pw""#, "password").is_err());
    }
}
