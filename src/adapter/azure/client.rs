//! ARM Client
//!
//! Azure Resource Manager への HTTP 呼び出し

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::{Method, Response};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

use super::auth::TokenCredential;
use super::models::ArmErrorResponse;
use crate::domain::errors::DataFactoryError;

/// Trait for ARM resource calls
/// This enables mocking in tests while using reqwest in production
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ArmClient: Send + Sync {
    /// GET a resource by its ARM ID
    ///
    /// Not found is returned as `DataFactoryError::Api` with status 404
    async fn get(&self, resource_id: &str) -> Result<Value>;

    /// PUT a resource and return the response body
    async fn put(&self, resource_id: &str, body: &Value) -> Result<Value>;

    async fn delete(&self, resource_id: &str) -> Result<()>;
}

/// reqwest-backed ARM client
pub struct HttpArmClient {
    http: reqwest::Client,
    endpoint: String,
    api_version: String,
    credential: Arc<dyn TokenCredential>,
}

impl HttpArmClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_version: impl Into<String>,
        credential: Arc<dyn TokenCredential>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_version: api_version.into(),
            credential,
        }
    }

    async fn send(&self, method: Method, resource_id: &str, body: Option<&Value>) -> Result<Response> {
        let token = self.credential.token().await?;
        let request_id = Uuid::new_v4().to_string();
        let url = format!("{}{}", self.endpoint, resource_id);
        debug!("{} {} (request id {})", method, url, request_id);

        let mut request = self
            .http
            .request(method.clone(), &url)
            .query(&[("api-version", self.api_version.as_str())])
            .bearer_auth(token)
            .header("x-ms-client-request-id", &request_id);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("{} {} failed", method, url))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(api_error(response).await.into())
        }
    }
}

/// ARM のエラーレスポンスを `DataFactoryError::Api` に変換する
async fn api_error(response: Response) -> DataFactoryError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ArmErrorResponse>(&body) {
        Ok(parsed) => DataFactoryError::Api {
            status: status.as_u16(),
            code: parsed.error.code,
            message: parsed.error.message,
        },
        Err(_) => DataFactoryError::Api {
            status: status.as_u16(),
            code: status.canonical_reason().unwrap_or("Unknown").to_string(),
            message: body,
        },
    }
}

/// Client for commands that never reach the API (`schema`, `validate`, `plan`)
pub struct OfflineArmClient;

fn offline(resource_id: &str) -> anyhow::Error {
    anyhow::anyhow!("{} cannot be reached: no Azure credentials are configured for this command", resource_id)
}

#[async_trait]
impl ArmClient for OfflineArmClient {
    async fn get(&self, resource_id: &str) -> Result<Value> {
        Err(offline(resource_id))
    }

    async fn put(&self, resource_id: &str, _body: &Value) -> Result<Value> {
        Err(offline(resource_id))
    }

    async fn delete(&self, resource_id: &str) -> Result<()> {
        Err(offline(resource_id))
    }
}

async fn json_body(response: Response) -> Result<Value> {
    let text = response.text().await.context("Failed to read ARM response body")?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).context("Failed to parse ARM response body")
}

#[async_trait]
impl ArmClient for HttpArmClient {
    async fn get(&self, resource_id: &str) -> Result<Value> {
        let response = self.send(Method::GET, resource_id, None).await?;
        json_body(response).await
    }

    async fn put(&self, resource_id: &str, body: &Value) -> Result<Value> {
        let response = self.send(Method::PUT, resource_id, Some(body)).await?;
        json_body(response).await
    }

    async fn delete(&self, resource_id: &str) -> Result<()> {
        self.send(Method::DELETE, resource_id, None).await?;
        Ok(())
    }
}
