//! # Resource Lifecycle Use Case
//!
//! 1つのリソース種別について Create / Read / Update / Delete を実行する
//!
//! マッピング（`ResourceMapping`）とリポジトリ（`ResourceRepository`）を組み合わせ、
//! 種別に依存しない手順で API を呼び出す。

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::application::dto::timeouts::Timeouts;
use crate::application::mappings::ResourceMapping;
use crate::domain::entities::resource_data::ResourceData;
use crate::domain::entities::resource_id::{ChildResourceId, FactoryId};
use crate::domain::errors::DataFactoryError;
use crate::domain::repositories::resource_repository::ResourceRepository;
use crate::domain::schema::{Plan, Schema};

/// リソースのライフサイクル
///
/// 種別ごとの型を隠蔽し、レジストリから `Box<dyn Resource>` として扱う
#[async_trait]
pub trait Resource: Send + Sync {
    /// リソース種別名
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    fn timeouts(&self) -> Timeouts;

    /// API を呼び出さずに設定を検証する
    ///
    /// # Errors
    ///
    /// スキーマ違反、設定の形の不一致、マッピング固有の検証エラー
    fn validate(&self, config: &Map<String, Value>) -> Result<()>;

    /// 記録済みの状態と設定の差分を計算する
    fn plan(&self, prior: Option<&Map<String, Value>>, config: &Map<String, Value>) -> Plan {
        let schema = self.schema();
        let mut config = config.clone();
        schema.apply_defaults(&mut config);
        schema.plan(prior, &config)
    }

    async fn create(&self, data: &mut ResourceData) -> Result<()>;

    /// リモートが存在しない場合はIDを消去して成功とする
    async fn read(&self, data: &mut ResourceData) -> Result<()>;

    async fn update(&self, data: &mut ResourceData) -> Result<()>;

    /// リモートが存在しない場合も成功とする
    async fn delete(&self, data: &mut ResourceData) -> Result<()>;
}

/// リソースライフサイクルユースケース
pub struct ResourceUseCase<R, M>
where
    M: ResourceMapping,
    R: ResourceRepository<M::Model>,
{
    repository: Arc<R>,
    mapping: M,
    timeouts: Timeouts,
}

impl<R, M> ResourceUseCase<R, M>
where
    M: ResourceMapping,
    R: ResourceRepository<M::Model>,
{
    /// 新しいユースケースを作成
    ///
    /// # Arguments
    ///
    /// * `repository` - 種別のモデルを読み書きするリポジトリ
    /// * `mapping` - 設定とモデルの変換
    pub fn new(repository: Arc<R>, mapping: M) -> Self {
        let timeouts = mapping.timeouts();
        Self {
            repository,
            mapping,
            timeouts,
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// 設定を検証し、型付きの設定と作成先のIDを返す
    fn prepare(&self, config: &Map<String, Value>) -> Result<(M::Config, ChildResourceId)> {
        self.mapping.schema().validate(config)?;

        let typed: M::Config = serde_json::from_value(Value::Object(config.clone()))
            .with_context(|| format!("Failed to decode configuration of {}", self.mapping.type_name()))?;
        let id = self.target_id(config)?;
        self.mapping.validate(&typed, &id.factory)?;

        Ok((typed, id))
    }

    /// 設定の `data_factory_id` と `name` から子リソースIDを組み立てる
    fn target_id(&self, config: &Map<String, Value>) -> Result<ChildResourceId> {
        let factory_id = config
            .get("data_factory_id")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("\"data_factory_id\" is required"))?;
        let name = config
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("\"name\" is required"))?;

        Ok(FactoryId::parse(factory_id)?.child(self.mapping.kind(), name))
    }

    fn recorded_id(&self, data: &ResourceData) -> Result<ChildResourceId> {
        let id = data
            .id()
            .ok_or_else(|| anyhow!("{} has no recorded ID", self.mapping.type_name()))?;
        Ok(ChildResourceId::parse(id, self.mapping.kind())?)
    }

    async fn create_resource(&self, data: &mut ResourceData) -> Result<()> {
        self.mapping.schema().apply_defaults(data.config_mut());
        let (config, id) = self.prepare(data.config())?;

        let existing = self
            .repository
            .get(&id)
            .await
            .with_context(|| format!("checking for presence of existing {}", id))?;
        if existing.is_some() {
            return Err(DataFactoryError::AlreadyExists {
                resource_type: self.mapping.type_name().to_string(),
                id: id.to_string(),
            }
            .into());
        }

        let model = self.mapping.expand(&config, &id.factory)?;
        self.repository
            .create_or_update(&id, &model)
            .await
            .with_context(|| format!("creating {} {:?}", id.kind.display_name(), id.name))?;

        data.set_id(id.to_string());
        info!("Created {}", id);

        self.read_resource(data).await
    }

    async fn read_resource(&self, data: &mut ResourceData) -> Result<()> {
        let id = self.recorded_id(data)?;

        let model = self
            .repository
            .get(&id)
            .await
            .with_context(|| format!("retrieving {} {:?}", id.kind.display_name(), id.name))?;
        let Some(model) = model else {
            warn!(
                "{} {:?} was not found - removing from state",
                id.kind.display_name(),
                id.name
            );
            data.clear_id();
            return Ok(());
        };

        let prior: Option<M::Config> = data.config_as().ok().or_else(|| data.state_as().ok());
        if prior.is_none() {
            debug!("No prior configuration for {}", id);
        }

        let flattened = self.mapping.flatten(&id, &model, prior.as_ref())?;
        data.set_state_from(&flattened)
    }

    async fn update_resource(&self, data: &mut ResourceData) -> Result<()> {
        let id = self.recorded_id(data)?;

        self.mapping.schema().apply_defaults(data.config_mut());
        let (config, _) = self.prepare(data.config())?;

        let model = self.mapping.expand(&config, &id.factory)?;
        self.repository
            .create_or_update(&id, &model)
            .await
            .with_context(|| format!("updating {} {:?}", id.kind.display_name(), id.name))?;
        info!("Updated {}", id);

        self.read_resource(data).await
    }

    async fn delete_resource(&self, data: &mut ResourceData) -> Result<()> {
        let id = self.recorded_id(data)?;

        self.repository
            .delete(&id)
            .await
            .with_context(|| format!("deleting {} {:?}", id.kind.display_name(), id.name))?;

        data.clear_id();
        info!("Deleted {}", id);
        Ok(())
    }
}

/// 操作をタイムアウト付きで実行する
async fn with_timeout<T>(
    operation: &str,
    after: Duration,
    future: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(after, future).await {
        Ok(result) => result,
        Err(_) => Err(DataFactoryError::Timeout {
            operation: operation.to_string(),
            after,
        }
        .into()),
    }
}

#[async_trait]
impl<R, M> Resource for ResourceUseCase<R, M>
where
    M: ResourceMapping,
    R: ResourceRepository<M::Model> + 'static,
{
    fn type_name(&self) -> &'static str {
        self.mapping.type_name()
    }

    fn schema(&self) -> Schema {
        self.mapping.schema()
    }

    fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    fn validate(&self, config: &Map<String, Value>) -> Result<()> {
        let mut config = config.clone();
        self.mapping.schema().apply_defaults(&mut config);
        self.prepare(&config).map(|_| ())
    }

    async fn create(&self, data: &mut ResourceData) -> Result<()> {
        let operation = format!("creating {}", self.type_name());
        with_timeout(&operation, self.timeouts.create, self.create_resource(data)).await
    }

    async fn read(&self, data: &mut ResourceData) -> Result<()> {
        let operation = format!("reading {}", self.type_name());
        with_timeout(&operation, self.timeouts.read, self.read_resource(data)).await
    }

    async fn update(&self, data: &mut ResourceData) -> Result<()> {
        let operation = format!("updating {}", self.type_name());
        with_timeout(&operation, self.timeouts.update, self.update_resource(data)).await
    }

    async fn delete(&self, data: &mut ResourceData) -> Result<()> {
        let operation = format!("deleting {}", self.type_name());
        with_timeout(&operation, self.timeouts.delete, self.delete_resource(data)).await
    }
}
