//! Build identity record.

use serde::{Deserialize, Serialize};

/// The build identity triple: id, version and timestamp.
///
/// Every field is optional. Absent fields are left out of serialized output
/// rather than written as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_field_names)] // field names are the JSON keys
pub struct BuildInfo {
    /// VCS-derived identifier, e.g. `20240102-030405/main@1a2b3c4d+`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_id: Option<String>,
    /// ISO-8601 UTC timestamp of the build.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_timestamp: Option<String>,
    /// Release version string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_are_omitted() {
        let bi = BuildInfo {
            build_version: Some("1.0".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&bi).unwrap();
        assert_eq!(json, r#"{"build_version":"1.0"}"#);
    }

    #[test]
    fn missing_fields_deserialize_as_none() {
        let bi: BuildInfo = serde_json::from_str(r#"{"build_id":"x"}"#).unwrap();
        assert_eq!(bi.build_id.as_deref(), Some("x"));
        assert!(bi.build_version.is_none());
        assert!(bi.build_timestamp.is_none());
    }
}
