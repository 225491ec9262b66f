//! # Linked Service Configuration DTO
//!
//! Linked Service リソースの平坦な設定表現

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// すべての Linked Service に共通する設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkedServiceCommonConfig {
    pub name: String,
    pub data_factory_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `connectVia` に使う Integration Runtime
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_runtime_name: Option<String>,
    #[serde(default)]
    pub annotations: Vec<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    #[serde(default)]
    pub additional_properties: BTreeMap<String, String>,
}

/// Key Vault に格納されたシークレットへの参照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyVaultSecretConfig {
    /// Key Vault の Linked Service 名
    pub linked_service_name: String,
    pub secret_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AzureSqlDatabaseLinkedServiceConfig {
    #[serde(flatten)]
    pub common: LinkedServiceCommonConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_vault_connection_string: Option<KeyVaultSecretConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_vault_password: Option<KeyVaultSecretConfig>,
    #[serde(default)]
    pub use_managed_identity: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_principal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_principal_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SqlServerLinkedServiceConfig {
    #[serde(flatten)]
    pub common: LinkedServiceCommonConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_vault_connection_string: Option<KeyVaultSecretConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_vault_password: Option<KeyVaultSecretConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AzureBlobStorageLinkedServiceConfig {
    #[serde(flatten)]
    pub common: LinkedServiceCommonConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sas_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_endpoint: Option<String>,
    #[serde(default)]
    pub use_managed_identity: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_principal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_principal_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SftpLinkedServiceConfig {
    #[serde(flatten)]
    pub common: LinkedServiceCommonConfig,
    pub authentication_type: String,
    pub host: String,
    pub port: i64,
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub skip_host_key_validation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_key_fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_content_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_passphrase: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebLinkedServiceConfig {
    #[serde(flatten)]
    pub common: LinkedServiceCommonConfig,
    pub authentication_type: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}
