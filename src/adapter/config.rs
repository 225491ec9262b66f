//! Provider Configuration
//!
//! 接続先の Azure 環境と認証情報の設定ファイル

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;

pub const DEFAULT_RESOURCE_MANAGER_ENDPOINT: &str = "https://management.azure.com";
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
pub const DEFAULT_API_VERSION: &str = "2018-06-01";

/// クライアントシークレットを上書きする環境変数
pub const CLIENT_SECRET_ENV: &str = "ARM_CLIENT_SECRET";
/// 取得済みのアクセストークンを指定する環境変数
pub const ACCESS_TOKEN_ENV: &str = "ARM_ACCESS_TOKEN";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub subscription_id: String,
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// 設定されていればクライアント認証を行わずにこのトークンを使う
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default = "default_resource_manager_endpoint")]
    pub resource_manager_endpoint: String,
    #[serde(default = "default_authority_host")]
    pub authority_host: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_resource_manager_endpoint() -> String {
    DEFAULT_RESOURCE_MANAGER_ENDPOINT.to_string()
}

fn default_authority_host() -> String {
    DEFAULT_AUTHORITY_HOST.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

/// `~` を含むパスを展開する
pub fn expand_path(path: &str) -> String {
    shellexpand::tilde(path).to_string()
}

impl ProviderConfig {
    /// 設定ファイルを読み込み、環境変数の上書きを適用する
    pub fn load(path: &str) -> Result<Self> {
        let path = expand_path(path);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read provider config: {}", path))?;
        let mut config: ProviderConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse provider config: {}", path))?;

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// 環境変数で認証情報を上書きする
    ///
    /// # Arguments
    ///
    /// * `lookup` - 環境変数の取得関数（テストでは差し替える）
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(secret) = lookup(CLIENT_SECRET_ENV).filter(|s| !s.is_empty()) {
            debug!("Using client secret from {}", CLIENT_SECRET_ENV);
            self.client_secret = Some(secret);
        }
        if let Some(token) = lookup(ACCESS_TOKEN_ENV).filter(|s| !s.is_empty()) {
            debug!("Using access token from {}", ACCESS_TOKEN_ENV);
            self.access_token = Some(token);
        }
    }
}
