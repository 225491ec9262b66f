//! # Resource Repository Trait
//!
//! Data Factory 子リソースの取得・作成更新・削除を抽象化

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::entities::resource_id::ChildResourceId;

/// リソースリポジトリ
///
/// `T` は `properties` の型（`Dataset`, `LinkedService` など）
#[async_trait]
pub trait ResourceRepository<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// リソースを取得する
    ///
    /// # Arguments
    ///
    /// * `id` - 取得するリソースのID
    ///
    /// # Returns
    ///
    /// リソースの `properties`。存在しない場合は `None`
    ///
    /// # Errors
    ///
    /// 404 以外の API エラー
    async fn get(&self, id: &ChildResourceId) -> Result<Option<T>>;

    /// リソースを作成または更新する
    ///
    /// # Returns
    ///
    /// API が返した `properties`
    async fn create_or_update(&self, id: &ChildResourceId, properties: &T) -> Result<T>;

    /// リソースを削除する
    ///
    /// 既に存在しない場合も成功とする
    async fn delete(&self, id: &ChildResourceId) -> Result<()>;
}
