//! ARM Wire Models
//!
//! Azure Resource Manager のリソースエンベロープとエラーレスポンス

use serde::{Deserialize, Serialize};

/// `{"id", "name", "type", "etag", "properties"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmEnvelope<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    pub properties: T,
}

impl<T> ArmEnvelope<T> {
    /// PUT リクエストの本文（`properties` のみ）
    pub fn request(properties: T) -> Self {
        Self {
            id: None,
            name: None,
            resource_type: None,
            etag: None,
            properties,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArmErrorResponse {
    pub error: ArmErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArmErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_envelope_deserialization() {
        let envelope: ArmEnvelope<Value> = serde_json::from_value(json!({
            "id": "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.DataFactory/factories/f/pipelines/p",
            "name": "p",
            "type": "Microsoft.DataFactory/factories/pipelines",
            "etag": "\"0a00\"",
            "properties": {"activities": []}
        }))
        .unwrap();

        assert_eq!(envelope.name.as_deref(), Some("p"));
        assert_eq!(envelope.properties, json!({"activities": []}));
    }

    #[test]
    fn test_request_only_carries_properties() {
        let body = serde_json::to_value(ArmEnvelope::request(json!({"type": "Wait"}))).unwrap();
        assert_eq!(body, json!({"properties": {"type": "Wait"}}));
    }

    #[test]
    fn test_error_response() {
        let error: ArmErrorResponse = serde_json::from_str(
            r#"{"error": {"code": "ResourceNotFound", "message": "not here"}}"#,
        )
        .unwrap();
        assert_eq!(error.error.code, "ResourceNotFound");
    }
}
