//! # Manifest Repository Trait
//!
//! リソース定義（マニフェスト）ファイルの発見と読み込みを抽象化

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// 1リソース分の定義
///
/// ```json
/// {"type": "azurerm_data_factory_dataset_binary", "name": "raw", "config": {...}}
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ResourceManifest {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    #[serde(default)]
    pub config: Map<String, Value>,
}

/// マニフェストリポジトリ
#[async_trait]
pub trait ManifestRepository: Send + Sync {
    /// マニフェストファイルを発見する
    ///
    /// # Arguments
    ///
    /// * `dir` - 探索するディレクトリ
    ///
    /// # Returns
    ///
    /// `*.json` ファイルのパスのリスト（パス順）
    async fn discover_manifests(&self, dir: &str) -> Result<Vec<PathBuf>>;

    /// マニフェストファイルを読み込む
    ///
    /// ファイルは単一のオブジェクト、またはオブジェクトの配列を含む
    async fn load_manifest(&self, path: &Path) -> Result<Vec<ResourceManifest>>;
}
