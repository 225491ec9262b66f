//! JSON State Repository Implementation
//!
//! StateRepositoryのJSON実装（管理対象リソースの状態をJSONファイルで永続化）

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use log::info;
use std::fs;
use std::path::Path;

use crate::adapter::config::expand_path;
use crate::domain::repositories::state_repository::{ProviderState, StateRepository, STATE_VERSION};

/// JSONファイルベースの状態リポジトリ
pub struct JsonStateRepository;

impl JsonStateRepository {
    /// 新しいリポジトリを作成
    pub fn new() -> Self {
        Self
    }

    /// ファイルから状態を読み込む（同期処理）
    fn load_sync(path: &str) -> Result<ProviderState> {
        let path = expand_path(path);
        let path = Path::new(&path);

        if !path.exists() {
            info!("No existing state found, starting with an empty state");
            return Ok(ProviderState::new());
        }

        let content = fs::read_to_string(path).context("Failed to read state file")?;
        let state: ProviderState =
            serde_json::from_str(&content).context("Failed to parse state JSON")?;

        if state.version != STATE_VERSION {
            anyhow::bail!(
                "unsupported state version {} (expected {})",
                state.version,
                STATE_VERSION
            );
        }

        info!("Loaded state: {} resources", state.resources.len());
        Ok(state)
    }

    /// ファイルに状態を保存する（同期処理）
    fn save_sync(path: &str, state: &ProviderState) -> Result<()> {
        let path = expand_path(path);
        let path = Path::new(&path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create state directory")?;
        }

        let mut state = state.clone();
        state.updated_at = Some(Utc::now().to_rfc3339());

        let json = serde_json::to_string_pretty(&state).context("Failed to serialize state")?;
        fs::write(path, json).context("Failed to write state file")?;

        info!("Saved state: {} resources", state.resources.len());
        Ok(())
    }
}

#[async_trait]
impl StateRepository for JsonStateRepository {
    async fn load(&self, path: &str) -> Result<ProviderState> {
        let path = path.to_string();
        tokio::task::spawn_blocking(move || Self::load_sync(&path))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to spawn blocking task: {}", e))?
    }

    async fn save(&self, path: &str, state: &ProviderState) -> Result<()> {
        let path = path.to_string();
        let state = state.clone();
        tokio::task::spawn_blocking(move || Self::save_sync(&path, &state))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to spawn blocking task: {}", e))?
    }
}

impl Default for JsonStateRepository {
    fn default() -> Self {
        Self::new()
    }
}
