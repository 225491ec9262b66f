//! ARM Resource Repository Implementation
//!
//! ResourceRepositoryの ARM 実装（`properties` をエンベロープで包んで送受信）

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::adapter::azure::client::ArmClient;
use crate::adapter::azure::models::ArmEnvelope;
use crate::domain::entities::resource_id::ChildResourceId;
use crate::domain::errors::response_was_not_found;
use crate::domain::repositories::resource_repository::ResourceRepository;

/// ARM ベースのリソースリポジトリ
#[derive(Clone)]
pub struct ArmResourceRepository {
    client: Arc<dyn ArmClient>,
}

impl ArmResourceRepository {
    pub fn new(client: Arc<dyn ArmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<T> ResourceRepository<T> for ArmResourceRepository
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, id: &ChildResourceId) -> Result<Option<T>> {
        let value = match self.client.get(&id.to_string()).await {
            Ok(value) => value,
            Err(e) if response_was_not_found(&e) => {
                debug!("{} was not found", id);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let envelope: ArmEnvelope<T> = serde_json::from_value(value)
            .with_context(|| format!("Failed to decode {} {:?}", id.kind.display_name(), id.name))?;
        Ok(Some(envelope.properties))
    }

    async fn create_or_update(&self, id: &ChildResourceId, properties: &T) -> Result<T> {
        let body = serde_json::to_value(ArmEnvelope::request(properties))
            .context("Failed to encode request body")?;

        let value = self.client.put(&id.to_string(), &body).await?;
        let envelope: ArmEnvelope<T> = serde_json::from_value(value)
            .with_context(|| format!("Failed to decode {} {:?}", id.kind.display_name(), id.name))?;
        Ok(envelope.properties)
    }

    async fn delete(&self, id: &ChildResourceId) -> Result<()> {
        match self.client.delete(&id.to_string()).await {
            Err(e) if response_was_not_found(&e) => {
                debug!("{} was already deleted", id);
                Ok(())
            }
            other => other,
        }
    }
}
