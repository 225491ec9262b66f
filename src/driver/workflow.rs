//! Workflow Orchestration
//!
//! マニフェスト・状態ファイル・リソース実装を組み合わせて各コマンドを実行する

use anyhow::{bail, Context, Result};
use log::{debug, info};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::adapter::azure::auth::credential_from_config;
use crate::adapter::azure::client::{ArmClient, HttpArmClient, OfflineArmClient};
use crate::adapter::config::ProviderConfig;
use crate::adapter::repositories::file_manifest_repository::FileManifestRepository;
use crate::adapter::repositories::json_state_repository::JsonStateRepository;
use crate::application::use_cases::resource_lifecycle::Resource;
use crate::domain::entities::resource_data::ResourceData;
use crate::domain::repositories::manifest_repository::{ManifestRepository, ResourceManifest};
use crate::domain::repositories::state_repository::{
    ProviderState, ResourceState, StateRepository,
};
use crate::domain::schema::{AttributeChange, PlanAction};

use super::cli::{Args, Command};
use super::registry::{apply_rank, ResourceRegistry};

/// リソース1つに対する操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Create,
    Update,
    Replace,
    Delete,
    NoOp,
}

impl ChangeAction {
    fn symbol(&self) -> &'static str {
        match self {
            ChangeAction::Create => "+",
            ChangeAction::Update => "~",
            ChangeAction::Replace => "-/+",
            ChangeAction::Delete => "-",
            ChangeAction::NoOp => " ",
        }
    }
}

impl From<PlanAction> for ChangeAction {
    fn from(action: PlanAction) -> Self {
        match action {
            PlanAction::Create => ChangeAction::Create,
            PlanAction::Update => ChangeAction::Update,
            PlanAction::Replace => ChangeAction::Replace,
            PlanAction::NoOp => ChangeAction::NoOp,
        }
    }
}

/// 計画された変更
#[derive(Debug, Clone)]
pub struct PlannedChange {
    pub resource_type: String,
    pub name: String,
    pub action: ChangeAction,
    pub changes: Vec<AttributeChange>,
    config: Map<String, Value>,
}

impl PlannedChange {
    pub fn address(&self) -> String {
        ProviderState::address(&self.resource_type, &self.name)
    }
}

/// apply の結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub created: usize,
    pub updated: usize,
    pub replaced: usize,
    pub deleted: usize,
    pub unchanged: usize,
}

/// Provider Workflow
pub struct ProviderWorkflow {
    registry: ResourceRegistry,
    manifest_repository: Arc<FileManifestRepository>,
    state_repository: Arc<JsonStateRepository>,
}

impl ProviderWorkflow {
    /// Create a new workflow instance with dependency injection
    pub fn new(client: Arc<dyn ArmClient>) -> Self {
        Self {
            registry: ResourceRegistry::new(client),
            manifest_repository: Arc::new(FileManifestRepository::new()),
            state_repository: Arc::new(JsonStateRepository::new()),
        }
    }

    /// API を呼ばないコマンド用
    pub fn offline() -> Self {
        Self::new(Arc::new(OfflineArmClient))
    }

    /// コマンドに応じてクライアントを組み立てる
    ///
    /// 設定ファイルと認証情報は API を呼ぶコマンドでのみ読み込む
    pub fn from_args(args: &Args) -> Result<Self> {
        if !args.command.requires_api() {
            return Ok(Self::offline());
        }

        let config = ProviderConfig::load(&args.config)?;
        let credential = credential_from_config(&config)?;
        let client = HttpArmClient::new(
            config.resource_manager_endpoint.clone(),
            config.api_version.clone(),
            Arc::from(credential),
        );
        info!("Using subscription {}", config.subscription_id);

        Ok(Self::new(Arc::new(client)))
    }

    /// Execute the command
    pub async fn execute(&self, args: Args) -> Result<()> {
        match args.command {
            Command::Schema { resource } => {
                let schema = self.schema(resource.as_deref())?;
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            Command::Validate { dir } => {
                let count = self.validate(&dir).await?;
                println!("✓ {} resources are valid", count);
            }
            Command::Plan { dir } => {
                let plan = self.plan(&dir, &args.state).await?;
                print_plan(&plan);
            }
            Command::Apply { dir, dry_run } => {
                let summary = self.apply(&dir, &args.state, dry_run).await?;
                if !dry_run {
                    println!(
                        "✓ Apply complete! {} created, {} updated, {} replaced, {} deleted, {} unchanged",
                        summary.created, summary.updated, summary.replaced, summary.deleted, summary.unchanged
                    );
                }
            }
            Command::Refresh => {
                let count = self.refresh(&args.state).await?;
                println!("✓ Refreshed {} resources", count);
            }
            Command::Destroy { dry_run } => {
                let count = self.destroy(&args.state, dry_run).await?;
                if dry_run {
                    println!("Dry-run mode: {} resources would be destroyed", count);
                } else {
                    println!("✓ Destroyed {} resources", count);
                }
            }
        }
        Ok(())
    }

    fn resource(&self, resource_type: &str) -> Result<&dyn Resource> {
        match self.registry.get(resource_type) {
            Some(resource) => Ok(resource),
            None => bail!("unsupported resource type {:?}", resource_type),
        }
    }

    /// スキーマを JSON で返す（`resource` 未指定なら全種別）
    pub fn schema(&self, resource: Option<&str>) -> Result<Value> {
        if let Some(resource_type) = resource {
            return Ok(self.resource(resource_type)?.schema().describe());
        }

        let schemas = self
            .registry
            .types()
            .filter_map(|t| self.registry.get(t).map(|r| (t.to_string(), r.schema().describe())))
            .collect();
        Ok(Value::Object(schemas))
    }

    /// マニフェストを読み込み、適用順に並べる
    async fn load_manifests(&self, dir: &str) -> Result<Vec<ResourceManifest>> {
        let mut manifests = Vec::new();
        let mut addresses = BTreeSet::new();

        for path in self.manifest_repository.discover_manifests(dir).await? {
            for manifest in self.manifest_repository.load_manifest(&path).await? {
                self.resource(&manifest.resource_type)
                    .with_context(|| format!("in {}", path.display()))?;

                let address = ProviderState::address(&manifest.resource_type, &manifest.name);
                if !addresses.insert(address.clone()) {
                    bail!("{} is declared more than once ({})", address, path.display());
                }
                manifests.push(manifest);
            }
        }

        manifests.sort_by_key(|m| apply_rank(&m.resource_type));
        Ok(manifests)
    }

    /// すべてのマニフェストを検証する
    ///
    /// # Returns
    ///
    /// 検証したリソースの数
    ///
    /// # Errors
    ///
    /// 1つでも検証に失敗した場合（すべての失敗を表示してから返す）
    pub async fn validate(&self, dir: &str) -> Result<usize> {
        let manifests = self.load_manifests(dir).await?;

        let mut failures = 0;
        for manifest in &manifests {
            let address = ProviderState::address(&manifest.resource_type, &manifest.name);
            match self.resource(&manifest.resource_type)?.validate(&manifest.config) {
                Ok(()) => println!("✓ {}", address),
                Err(e) => {
                    failures += 1;
                    println!("✗ {}: {:#}", address, e);
                }
            }
        }

        if failures > 0 {
            bail!("{} of {} resources failed validation", failures, manifests.len());
        }
        Ok(manifests.len())
    }

    /// マニフェストと状態の差分を計算する
    ///
    /// 状態にだけ存在するリソースは削除として計画する
    pub async fn plan(&self, dir: &str, state_path: &str) -> Result<Vec<PlannedChange>> {
        let manifests = self.load_manifests(dir).await?;
        let state = self.state_repository.load(state_path).await?;

        let mut planned = Vec::new();
        let mut declared = BTreeSet::new();

        for manifest in manifests {
            let resource = self.resource(&manifest.resource_type)?;
            let address = ProviderState::address(&manifest.resource_type, &manifest.name);
            resource
                .validate(&manifest.config)
                .with_context(|| format!("validating {}", address))?;
            debug!(
                "{} config: {}",
                address,
                Value::Object(resource.schema().redact(&manifest.config))
            );

            let prior = state.get(&manifest.resource_type, &manifest.name);
            let plan = resource.plan(prior.map(|p| &p.attributes), &manifest.config);
            declared.insert(address);

            planned.push(PlannedChange {
                resource_type: manifest.resource_type,
                name: manifest.name,
                action: plan.action.into(),
                changes: plan.changes,
                config: manifest.config,
            });
        }

        let mut orphans: Vec<&ResourceState> = state
            .resources
            .iter()
            .filter(|(address, _)| !declared.contains(*address))
            .map(|(_, resource)| resource)
            .collect();
        orphans.sort_by_key(|r| std::cmp::Reverse(apply_rank(&r.resource_type)));

        planned.extend(orphans.into_iter().map(|r| PlannedChange {
            resource_type: r.resource_type.clone(),
            name: r.name.clone(),
            action: ChangeAction::Delete,
            changes: Vec::new(),
            config: Map::new(),
        }));

        Ok(planned)
    }

    /// 計画を実行する
    ///
    /// 変更ごとに状態ファイルを保存するため、途中で失敗しても完了した変更は記録される
    pub async fn apply(&self, dir: &str, state_path: &str, dry_run: bool) -> Result<ApplySummary> {
        let planned = self.plan(dir, state_path).await?;
        print_plan(&planned);

        let mut summary = ApplySummary::default();
        if dry_run {
            println!("✓ Dry-run mode (not applying changes)");
            return Ok(summary);
        }

        let mut state = self.state_repository.load(state_path).await?;

        for change in planned {
            let resource = self.resource(&change.resource_type)?;
            let address = change.address();

            match change.action {
                ChangeAction::NoOp => {
                    summary.unchanged += 1;
                    continue;
                }
                ChangeAction::Create => {
                    self.create(resource, &change, &mut state).await?;
                    summary.created += 1;
                }
                ChangeAction::Update => {
                    let recorded = recorded(&state, &change)?;
                    let mut data =
                        ResourceData::existing(recorded.id, change.config.clone(), recorded.attributes);
                    resource
                        .update(&mut data)
                        .await
                        .with_context(|| format!("updating {}", address))?;
                    record(&mut state, &change, &data);
                    summary.updated += 1;
                }
                ChangeAction::Replace => {
                    self.delete(resource, &change, &mut state).await?;
                    self.create(resource, &change, &mut state).await?;
                    summary.replaced += 1;
                }
                ChangeAction::Delete => {
                    self.delete(resource, &change, &mut state).await?;
                    summary.deleted += 1;
                }
            }

            println!("✓ {} {}", change.action.symbol(), address);
            self.state_repository.save(state_path, &state).await?;
        }

        Ok(summary)
    }

    async fn create(&self, resource: &dyn Resource, change: &PlannedChange, state: &mut ProviderState) -> Result<()> {
        let mut data = ResourceData::new(change.config.clone());
        resource
            .create(&mut data)
            .await
            .with_context(|| format!("creating {}", change.address()))?;
        record(state, change, &data);
        Ok(())
    }

    async fn delete(&self, resource: &dyn Resource, change: &PlannedChange, state: &mut ProviderState) -> Result<()> {
        let recorded = recorded(state, change)?;
        let mut data = ResourceData::existing(recorded.id, Map::new(), recorded.attributes);
        resource
            .delete(&mut data)
            .await
            .with_context(|| format!("deleting {}", change.address()))?;
        state.remove(&change.resource_type, &change.name);
        Ok(())
    }

    /// 記録済みのリソースをすべて読み直す
    ///
    /// リモートで削除されたリソースは状態から取り除く
    pub async fn refresh(&self, state_path: &str) -> Result<usize> {
        let mut state = self.state_repository.load(state_path).await?;
        let recorded: Vec<ResourceState> = state.resources.values().cloned().collect();

        for entry in &recorded {
            let resource = self.resource(&entry.resource_type)?;
            let address = ProviderState::address(&entry.resource_type, &entry.name);

            let mut data = ResourceData::existing(entry.id.clone(), Map::new(), entry.attributes.clone());
            resource
                .read(&mut data)
                .await
                .with_context(|| format!("refreshing {}", address))?;

            match data.id() {
                Some(id) => {
                    debug!("Refreshed {}", address);
                    state.upsert(ResourceState {
                        resource_type: entry.resource_type.clone(),
                        name: entry.name.clone(),
                        id: id.to_string(),
                        attributes: data.state().clone(),
                    });
                }
                None => {
                    println!("⚠ {} no longer exists, removing it from state", address);
                    state.remove(&entry.resource_type, &entry.name);
                }
            }
        }

        self.state_repository.save(state_path, &state).await?;
        Ok(recorded.len())
    }

    /// 記録済みのリソースをすべて削除する（適用順の逆）
    pub async fn destroy(&self, state_path: &str, dry_run: bool) -> Result<usize> {
        let mut state = self.state_repository.load(state_path).await?;
        let mut recorded: Vec<ResourceState> = state.resources.values().cloned().collect();
        recorded.sort_by_key(|r| std::cmp::Reverse(apply_rank(&r.resource_type)));

        for entry in &recorded {
            let address = ProviderState::address(&entry.resource_type, &entry.name);
            if dry_run {
                println!("  - {}", address);
                continue;
            }

            let resource = self.resource(&entry.resource_type)?;
            let mut data = ResourceData::existing(entry.id.clone(), Map::new(), entry.attributes.clone());
            resource
                .delete(&mut data)
                .await
                .with_context(|| format!("destroying {}", address))?;

            state.remove(&entry.resource_type, &entry.name);
            self.state_repository.save(state_path, &state).await?;
            println!("✓ - {}", address);
        }

        Ok(recorded.len())
    }
}

fn recorded(state: &ProviderState, change: &PlannedChange) -> Result<ResourceState> {
    state
        .get(&change.resource_type, &change.name)
        .cloned()
        .with_context(|| format!("{} is not recorded in state", change.address()))
}

/// 操作後の ResourceData を状態に反映する
fn record(state: &mut ProviderState, change: &PlannedChange, data: &ResourceData) {
    match data.id() {
        Some(id) => state.upsert(ResourceState {
            resource_type: change.resource_type.clone(),
            name: change.name.clone(),
            id: id.to_string(),
            attributes: data.state().clone(),
        }),
        None => {
            state.remove(&change.resource_type, &change.name);
        }
    }
}

fn print_plan(planned: &[PlannedChange]) {
    let pending: Vec<&PlannedChange> = planned
        .iter()
        .filter(|c| c.action != ChangeAction::NoOp)
        .collect();

    if pending.is_empty() {
        println!("No changes. {} resources are up to date.", planned.len());
        return;
    }

    println!("Planned changes:");
    for change in &pending {
        println!("  {} {}", change.action.symbol(), change.address());
        for attribute in &change.changes {
            println!("      {}", format_change(attribute));
        }
    }
    println!("{} to change, {} unchanged", pending.len(), planned.len() - pending.len());
}

fn format_change(change: &AttributeChange) -> String {
    let render = |value: &Option<Value>| match value {
        None => "(unset)".to_string(),
        Some(_) if change.sensitive => "(sensitive value)".to_string(),
        Some(value) => value.to_string(),
    };

    let suffix = if change.requires_replace {
        " (forces replacement)"
    } else {
        ""
    };
    format!("{}: {} -> {}{}", change.name, render(&change.old), render(&change.new), suffix)
}
