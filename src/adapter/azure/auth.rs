//! Azure AD Token Credentials
//!
//! Azure Resource Manager 呼び出し用のアクセストークン取得

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::Deserialize;
use tokio::sync::RwLock;

#[cfg(test)]
use mockall::automock;

use crate::adapter::config::ProviderConfig;
use crate::domain::errors::DataFactoryError;

/// Source of bearer tokens for ARM requests
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TokenCredential: Send + Sync {
    async fn token(&self) -> Result<String>;
}

/// A pre-acquired token (`ARM_ACCESS_TOKEN`)
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_expired(&self, grace_period: Duration) -> bool {
        Utc::now() + grace_period >= self.expires_at
    }
}

/// Client credentials flow against the Azure AD v2 token endpoint
pub struct ClientSecretCredential {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
    cached: RwLock<Option<CachedToken>>,
    grace_period: Duration,
}

impl ClientSecretCredential {
    /// # Arguments
    ///
    /// * `authority_host` - `https://login.microsoftonline.com` など
    /// * `resource` - トークンの対象（ARM エンドポイント）
    pub fn new(
        authority_host: &str,
        tenant_id: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        resource: &str,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            token_url: format!(
                "{}/{}/oauth2/v2.0/token",
                authority_host.trim_end_matches('/'),
                tenant_id
            ),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: format!("{}/.default", resource.trim_end_matches('/')),
            cached: RwLock::new(None),
            grace_period: Duration::minutes(5),
        }
    }

    async fn acquire(&self) -> Result<CachedToken, DataFactoryError> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", self.scope.as_str()),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| DataFactoryError::Authentication(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataFactoryError::Authentication(format!(
                "token request failed with status {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            DataFactoryError::Authentication(format!("parsing token response: {}", e))
        })?;

        let expires_at = Utc::now() + Duration::seconds(token.expires_in);
        debug!("Acquired access token, expires at {}", expires_at.to_rfc3339());

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at,
        })
    }
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    async fn token(&self) -> Result<String> {
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref().filter(|t| !t.is_expired(self.grace_period)) {
                return Ok(token.access_token.clone());
            }
        }

        let token = self.acquire().await?;
        let access_token = token.access_token.clone();
        *self.cached.write().await = Some(token);

        Ok(access_token)
    }
}

/// 設定から認証方式を選ぶ
///
/// アクセストークンがあればそれを使い、なければクライアントシークレットで認証する
///
/// # Errors
///
/// どちらも設定されていない場合に `DataFactoryError::Authentication`
pub fn credential_from_config(config: &ProviderConfig) -> Result<Box<dyn TokenCredential>> {
    if let Some(token) = config.access_token.as_ref().filter(|t| !t.is_empty()) {
        return Ok(Box::new(StaticTokenCredential::new(token.clone())));
    }

    match config.client_secret.as_ref().filter(|s| !s.is_empty()) {
        Some(secret) if !config.tenant_id.is_empty() && !config.client_id.is_empty() => {
            Ok(Box::new(ClientSecretCredential::new(
                &config.authority_host,
                &config.tenant_id,
                config.client_id.clone(),
                secret.clone(),
                &config.resource_manager_endpoint,
            )))
        }
        _ => Err(DataFactoryError::Authentication(
            "either an access token or tenant_id, client_id and client_secret must be configured"
                .to_string(),
        )
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProviderConfig {
        serde_json::from_str(r#"{"subscription_id": "sub", "tenant_id": "tenant", "client_id": "app"}"#)
            .unwrap()
    }

    #[test]
    fn test_cached_token_expiry() {
        let token = CachedToken {
            access_token: "t".to_string(),
            expires_at: Utc::now() + Duration::minutes(10),
        };

        assert!(!token.is_expired(Duration::minutes(5)));
        assert!(token.is_expired(Duration::minutes(15)));
    }

    #[tokio::test]
    async fn test_static_token() {
        let credential = StaticTokenCredential::new("abc");
        assert_eq!(credential.token().await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_client_secret_token_is_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/tenant/oauth2/v2.0/token")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("grant_type".into(), "client_credentials".into()),
                mockito::Matcher::UrlEncoded("client_id".into(), "app".into()),
                mockito::Matcher::UrlEncoded(
                    "scope".into(),
                    "https://management.azure.com/.default".into(),
                ),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "token-1", "expires_in": 3600, "token_type": "Bearer"}"#)
            .expect(1)
            .create_async()
            .await;

        let credential = ClientSecretCredential::new(
            &server.url(),
            "tenant",
            "app",
            "secret",
            "https://management.azure.com/",
        );

        assert_eq!(credential.token().await.unwrap(), "token-1");
        assert_eq!(credential.token().await.unwrap(), "token-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_client_secret_token_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/tenant/oauth2/v2.0/token")
            .with_status(401)
            .with_body(r#"{"error": "invalid_client"}"#)
            .create_async()
            .await;

        let credential = ClientSecretCredential::new(&server.url(), "tenant", "app", "bad", "https://management.azure.com");
        let error = credential.token().await.unwrap_err();

        assert!(matches!(
            error.downcast_ref::<DataFactoryError>(),
            Some(DataFactoryError::Authentication(_))
        ));
    }

    #[test]
    fn test_credential_from_config() {
        let mut config = config();
        assert!(credential_from_config(&config).is_err());

        config.client_secret = Some("secret".to_string());
        assert!(credential_from_config(&config).is_ok());

        config.client_secret = None;
        config.access_token = Some("token".to_string());
        assert!(credential_from_config(&config).is_ok());
    }
}
