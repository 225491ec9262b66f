//! # Linked Service Entity
//!
//! Data Factory Linked Service の API モデル

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::common::{IntegrationRuntimeReference, ParameterDefinitions, SecretBase};
use super::dynamic_value::DynamicValue;

/// Linked Service の `properties`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLinkedService", into = "RawLinkedService")]
pub struct LinkedService {
    pub description: Option<String>,
    pub connect_via: Option<IntegrationRuntimeReference>,
    pub parameters: Option<ParameterDefinitions>,
    pub annotations: Option<Vec<Value>>,
    pub additional_properties: Map<String, Value>,
    pub kind: LinkedServiceKind,
}

impl LinkedService {
    pub fn new(kind: LinkedServiceKind) -> Self {
        Self {
            description: None,
            connect_via: None,
            parameters: None,
            annotations: None,
            additional_properties: Map::new(),
            kind,
        }
    }
}

/// シークレットまたはリテラル値
///
/// 接続文字列は平文・`SecureString`・Key Vault 参照のいずれでも送信できる
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SecretOrLiteral {
    Secret(SecretBase),
    Literal(DynamicValue),
}

impl SecretOrLiteral {
    pub fn literal(value: impl Into<String>) -> Self {
        SecretOrLiteral::Literal(DynamicValue::String(value.into()))
    }
}

/// Linked Service 種別ごとの `typeProperties`
#[derive(Debug, Clone, PartialEq)]
pub enum LinkedServiceKind {
    AzureSqlDatabase(AzureSqlDatabaseTypeProperties),
    SqlServer(SqlServerTypeProperties),
    AzureBlobStorage(AzureBlobStorageTypeProperties),
    Sftp(SftpTypeProperties),
    Web(WebTypeProperties),
    Other {
        type_name: String,
        type_properties: Option<Value>,
    },
}

impl LinkedServiceKind {
    pub fn type_name(&self) -> &str {
        match self {
            LinkedServiceKind::AzureSqlDatabase(_) => "AzureSqlDatabase",
            LinkedServiceKind::SqlServer(_) => "SqlServer",
            LinkedServiceKind::AzureBlobStorage(_) => "AzureBlobStorage",
            LinkedServiceKind::Sftp(_) => "Sftp",
            LinkedServiceKind::Web(_) => "Web",
            LinkedServiceKind::Other { type_name, .. } => type_name,
        }
    }

    fn from_raw(type_name: String, type_properties: Option<Value>) -> Result<Self, serde_json::Error> {
        let props = type_properties.clone().unwrap_or_else(|| Value::Object(Map::new()));
        let kind = match type_name.as_str() {
            "AzureSqlDatabase" => LinkedServiceKind::AzureSqlDatabase(serde_json::from_value(props)?),
            "SqlServer" => LinkedServiceKind::SqlServer(serde_json::from_value(props)?),
            "AzureBlobStorage" => LinkedServiceKind::AzureBlobStorage(serde_json::from_value(props)?),
            "Sftp" => LinkedServiceKind::Sftp(serde_json::from_value(props)?),
            "Web" => LinkedServiceKind::Web(serde_json::from_value(props)?),
            _ => LinkedServiceKind::Other {
                type_name,
                type_properties,
            },
        };
        Ok(kind)
    }

    fn to_raw(&self) -> (String, Option<Value>) {
        let props = match self {
            LinkedServiceKind::AzureSqlDatabase(p) => serde_json::to_value(p),
            LinkedServiceKind::SqlServer(p) => serde_json::to_value(p),
            LinkedServiceKind::AzureBlobStorage(p) => serde_json::to_value(p),
            LinkedServiceKind::Sftp(p) => serde_json::to_value(p),
            LinkedServiceKind::Web(p) => serde_json::to_value(p),
            LinkedServiceKind::Other {
                type_name,
                type_properties,
            } => return (type_name.clone(), type_properties.clone()),
        };
        (self.type_name().to_string(), props.ok())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureSqlDatabaseTypeProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<SecretOrLiteral>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<SecretBase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_principal_id: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_principal_key: Option<SecretBase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<DynamicValue>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlServerTypeProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<SecretOrLiteral>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<SecretBase>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureBlobStorageTypeProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<SecretOrLiteral>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sas_uri: Option<SecretOrLiteral>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_endpoint: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_kind: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_principal_id: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_principal_key: Option<SecretBase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SftpTypeProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<DynamicValue>,
    /// 数値または式
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<SecretBase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_host_key_validation: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_key_fingerprint: Option<DynamicValue>,
    /// Base64 の秘密鍵（`SshPublicKey` 認証）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_content: Option<SecretBase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_path: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_phrase: Option<SecretBase>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebTypeProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<SecretBase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLinkedService {
    #[serde(rename = "type")]
    linked_service_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    connect_via: Option<IntegrationRuntimeReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parameters: Option<ParameterDefinitions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotations: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    type_properties: Option<Value>,
    #[serde(flatten)]
    additional_properties: Map<String, Value>,
}

impl TryFrom<RawLinkedService> for LinkedService {
    type Error = serde_json::Error;

    fn try_from(raw: RawLinkedService) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: LinkedServiceKind::from_raw(raw.linked_service_type, raw.type_properties)?,
            description: raw.description,
            connect_via: raw.connect_via,
            parameters: raw.parameters,
            annotations: raw.annotations,
            additional_properties: raw.additional_properties,
        })
    }
}

impl From<LinkedService> for RawLinkedService {
    fn from(service: LinkedService) -> Self {
        let (linked_service_type, type_properties) = service.kind.to_raw();
        Self {
            linked_service_type,
            description: service.description,
            connect_via: service.connect_via,
            parameters: service.parameters,
            annotations: service.annotations,
            type_properties,
            additional_properties: service.additional_properties,
        }
    }
}
