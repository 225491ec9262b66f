//! # Credential Configuration DTO

use serde::{Deserialize, Serialize};

use super::linked_service::KeyVaultSecretConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialCommonConfig {
    pub name: String,
    pub data_factory_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub annotations: Vec<String>,
}

/// ユーザー割り当てマネージドIDの Credential
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserManagedIdentityCredentialConfig {
    #[serde(flatten)]
    pub common: CredentialCommonConfig,
    /// マネージドIDのリソースID
    pub identity_id: String,
}

/// サービスプリンシパルの Credential
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServicePrincipalCredentialConfig {
    #[serde(flatten)]
    pub common: CredentialCommonConfig,
    pub tenant_id: String,
    pub service_principal_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_principal_key: Option<KeyVaultSecretConfig>,
}
