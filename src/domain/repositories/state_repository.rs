//! # State Repository Trait
//!
//! 管理対象リソースの状態の永続化を抽象化

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// 状態ファイルのフォーマットバージョン
pub const STATE_VERSION: u32 = 1;

/// 1リソース分の記録
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ResourceState {
    /// リソース種別（`azurerm_data_factory_dataset_binary` など）
    pub resource_type: String,
    /// マニフェスト上の名前
    pub name: String,
    /// ARM リソースID
    pub id: String,
    /// flatten された属性
    pub attributes: Map<String, Value>,
}

/// プロバイダーの状態
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProviderState {
    pub version: u32,
    /// 最後に保存した時刻
    pub updated_at: Option<String>,
    /// アドレス（`種別.名前`）ごとのリソース
    pub resources: BTreeMap<String, ResourceState>,
}

impl ProviderState {
    /// 空の状態を作成
    pub fn new() -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: None,
            resources: BTreeMap::new(),
        }
    }

    /// リソースのアドレス
    pub fn address(resource_type: &str, name: &str) -> String {
        format!("{}.{}", resource_type, name)
    }

    pub fn get(&self, resource_type: &str, name: &str) -> Option<&ResourceState> {
        self.resources.get(&Self::address(resource_type, name))
    }

    /// リソースの記録を追加または置き換える
    pub fn upsert(&mut self, resource: ResourceState) {
        let address = Self::address(&resource.resource_type, &resource.name);
        self.resources.insert(address, resource);
    }

    /// リソースの記録を削除する
    pub fn remove(&mut self, resource_type: &str, name: &str) -> Option<ResourceState> {
        self.resources.remove(&Self::address(resource_type, name))
    }
}

impl Default for ProviderState {
    fn default() -> Self {
        Self::new()
    }
}

/// 状態リポジトリ
///
/// プロバイダー状態の永続化を担当するリポジトリ
#[async_trait]
pub trait StateRepository: Send + Sync {
    /// 状態を読み込む
    ///
    /// # Arguments
    ///
    /// * `path` - 状態ファイルのパス
    ///
    /// # Returns
    ///
    /// プロバイダー状態（ファイルがなければ空の状態）
    ///
    /// # Errors
    ///
    /// ファイルの読み込みに失敗した場合にエラーを返す
    async fn load(&self, path: &str) -> Result<ProviderState>;

    /// 状態を保存する
    ///
    /// # Arguments
    ///
    /// * `path` - 状態ファイルのパス
    /// * `state` - 保存するプロバイダー状態
    ///
    /// # Errors
    ///
    /// ファイルの書き込みに失敗した場合にエラーを返す
    async fn save(&self, path: &str, state: &ProviderState) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(name: &str) -> ResourceState {
        ResourceState {
            resource_type: "azurerm_data_factory_dataset_binary".to_string(),
            name: name.to_string(),
            id: format!("/subscriptions/sub/resourceGroups/rg/providers/Microsoft.DataFactory/factories/f/datasets/{}", name),
            attributes: Map::new(),
        }
    }

    #[test]
    fn test_new_state() {
        let state = ProviderState::new();

        assert_eq!(state.version, STATE_VERSION);
        assert!(state.updated_at.is_none());
        assert!(state.resources.is_empty());
    }

    #[test]
    fn test_upsert_and_get() {
        let mut state = ProviderState::new();
        state.upsert(resource("ds1"));
        state.upsert(resource("ds1"));
        state.upsert(resource("ds2"));

        assert_eq!(state.resources.len(), 2);
        assert!(state
            .resources
            .contains_key("azurerm_data_factory_dataset_binary.ds1"));
        assert_eq!(
            state.get("azurerm_data_factory_dataset_binary", "ds2").map(|r| r.name.as_str()),
            Some("ds2")
        );
    }

    #[test]
    fn test_remove() {
        let mut state = ProviderState::default();
        state.upsert(resource("ds1"));

        assert!(state.remove("azurerm_data_factory_dataset_binary", "ds1").is_some());
        assert!(state.remove("azurerm_data_factory_dataset_binary", "ds1").is_none());
    }
}
