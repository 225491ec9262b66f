//! # Credential Entity
//!
//! Data Factory Credential の API モデル

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::common::SecretBase;
use super::dynamic_value::DynamicValue;

/// Credential の `properties`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCredential", into = "RawCredential")]
pub struct Credential {
    pub description: Option<String>,
    pub annotations: Option<Vec<Value>>,
    pub kind: CredentialKind,
}

impl Credential {
    pub fn new(kind: CredentialKind) -> Self {
        Self {
            description: None,
            annotations: None,
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CredentialKind {
    /// ユーザー割り当てマネージドID
    ManagedIdentity(ManagedIdentityTypeProperties),
    ServicePrincipal(ServicePrincipalTypeProperties),
    Other {
        type_name: String,
        type_properties: Option<Value>,
    },
}

impl CredentialKind {
    pub fn type_name(&self) -> &str {
        match self {
            CredentialKind::ManagedIdentity(_) => "ManagedIdentity",
            CredentialKind::ServicePrincipal(_) => "ServicePrincipal",
            CredentialKind::Other { type_name, .. } => type_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedIdentityTypeProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePrincipalTypeProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_principal_id: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_principal_key: Option<SecretBase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCredential {
    #[serde(rename = "type")]
    credential_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotations: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    type_properties: Option<Value>,
}

impl TryFrom<RawCredential> for Credential {
    type Error = serde_json::Error;

    fn try_from(raw: RawCredential) -> Result<Self, Self::Error> {
        let props = raw
            .type_properties
            .clone()
            .unwrap_or_else(|| Value::Object(Map::new()));
        let kind = match raw.credential_type.as_str() {
            "ManagedIdentity" => CredentialKind::ManagedIdentity(serde_json::from_value(props)?),
            "ServicePrincipal" => CredentialKind::ServicePrincipal(serde_json::from_value(props)?),
            _ => CredentialKind::Other {
                type_name: raw.credential_type,
                type_properties: raw.type_properties,
            },
        };

        Ok(Self {
            description: raw.description,
            annotations: raw.annotations,
            kind,
        })
    }
}

impl From<Credential> for RawCredential {
    fn from(credential: Credential) -> Self {
        let credential_type = credential.kind.type_name().to_string();
        let type_properties = match credential.kind {
            CredentialKind::ManagedIdentity(p) => serde_json::to_value(p).ok(),
            CredentialKind::ServicePrincipal(p) => serde_json::to_value(p).ok(),
            CredentialKind::Other {
                type_properties, ..
            } => type_properties,
        };

        Self {
            credential_type,
            description: credential.description,
            annotations: credential.annotations,
            type_properties,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_managed_identity_serialization() {
        let credential = Credential::new(CredentialKind::ManagedIdentity(
            ManagedIdentityTypeProperties {
                resource_id: Some("/subscriptions/sub/resourceGroups/rg/providers/Microsoft.ManagedIdentity/userAssignedIdentities/id1".to_string()),
            },
        ));

        let value = serde_json::to_value(&credential).unwrap();
        assert_eq!(value["type"], "ManagedIdentity");
        assert!(value["typeProperties"]["resourceId"]
            .as_str()
            .unwrap()
            .ends_with("/id1"));
    }

    #[test]
    fn test_service_principal_deserialization() {
        let credential: Credential = serde_json::from_value(json!({
            "type": "ServicePrincipal",
            "description": "sp",
            "typeProperties": {
                "servicePrincipalId": "00000000-0000-0000-0000-000000000001",
                "tenant": "00000000-0000-0000-0000-000000000002",
                "servicePrincipalKey": {
                    "type": "AzureKeyVaultSecret",
                    "store": {"referenceName": "kv", "type": "LinkedServiceReference"},
                    "secretName": "sp-secret",
                    "secretVersion": "v1"
                }
            }
        }))
        .unwrap();

        let CredentialKind::ServicePrincipal(props) = &credential.kind else {
            panic!("expected service principal");
        };
        assert_eq!(
            props.service_principal_key,
            Some(SecretBase::key_vault("kv", "sp-secret", Some("v1".to_string())))
        );
        assert_eq!(credential.description.as_deref(), Some("sp"));
    }
}
