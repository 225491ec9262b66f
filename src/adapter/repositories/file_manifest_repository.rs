//! File Manifest Repository Implementation
//!
//! ManifestRepositoryのファイルシステム実装

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{info, warn};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::adapter::config::expand_path;
use crate::domain::repositories::manifest_repository::{ManifestRepository, ResourceManifest};

/// ファイルシステムベースのマニフェストリポジトリ
pub struct FileManifestRepository;

impl FileManifestRepository {
    /// 新しいリポジトリを作成
    pub fn new() -> Self {
        Self
    }

    fn discover_manifests_internal(dir: &str) -> Result<Vec<PathBuf>> {
        let dir = PathBuf::from(expand_path(dir));

        if !dir.exists() {
            warn!("Manifest directory does not exist: {}", dir.display());
            return Ok(Vec::new());
        }

        let mut manifests: Vec<PathBuf> = WalkDir::new(&dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|entry| entry.into_path())
            .filter(|path| path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json"))
            .collect();
        manifests.sort();

        info!("Found {} manifest files in {}", manifests.len(), dir.display());
        Ok(manifests)
    }

    fn load_manifest_internal(path: &Path) -> Result<Vec<ResourceManifest>> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))?;

        let manifests = match value {
            Value::Array(_) => serde_json::from_value(value),
            other => serde_json::from_value(other).map(|manifest| vec![manifest]),
        };
        manifests.with_context(|| format!("Invalid resource definition in {}", path.display()))
    }
}

#[async_trait]
impl ManifestRepository for FileManifestRepository {
    async fn discover_manifests(&self, dir: &str) -> Result<Vec<PathBuf>> {
        let dir = dir.to_string();
        tokio::task::spawn_blocking(move || Self::discover_manifests_internal(&dir))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to spawn blocking task: {}", e))?
    }

    async fn load_manifest(&self, path: &Path) -> Result<Vec<ResourceManifest>> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::load_manifest_internal(&path))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to spawn blocking task: {}", e))?
    }
}

impl Default for FileManifestRepository {
    fn default() -> Self {
        Self::new()
    }
}
