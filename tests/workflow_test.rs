//! apply / refresh / destroy をメモリ上の ARM で通しで実行するテスト

use adf_provider::adapter::azure::ArmClient;
use adf_provider::domain::errors::DataFactoryError;
use adf_provider::driver::workflow::ChangeAction;
use adf_provider::driver::ProviderWorkflow;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const FACTORY_ID: &str = "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/example-rg/providers/Microsoft.DataFactory/factories/example-adf";

/// リソースを保持するだけの ARM
#[derive(Default)]
struct InMemoryArm {
    resources: Mutex<BTreeMap<String, Value>>,
    calls: Mutex<Vec<String>>,
}

impl InMemoryArm {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn stored(&self, resource_id: &str) -> Option<Value> {
        self.resources.lock().unwrap().get(resource_id).cloned()
    }

    fn remove(&self, resource_id: &str) {
        self.resources.lock().unwrap().remove(resource_id);
    }

    fn log(&self, method: &str, resource_id: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {}", method, resource_id));
    }
}

fn not_found(resource_id: &str) -> anyhow::Error {
    DataFactoryError::Api {
        status: 404,
        code: "NotFound".to_string(),
        message: format!("{} not found", resource_id),
    }
    .into()
}

#[async_trait]
impl ArmClient for InMemoryArm {
    async fn get(&self, resource_id: &str) -> Result<Value> {
        self.log("GET", resource_id);
        self.stored(resource_id).ok_or_else(|| not_found(resource_id))
    }

    async fn put(&self, resource_id: &str, body: &Value) -> Result<Value> {
        self.log("PUT", resource_id);
        let name = resource_id.rsplit('/').next().unwrap_or_default();
        let stored = json!({
            "id": resource_id,
            "name": name,
            "properties": body["properties"].clone(),
        });
        self.resources
            .lock()
            .unwrap()
            .insert(resource_id.to_string(), stored.clone());
        Ok(stored)
    }

    async fn delete(&self, resource_id: &str) -> Result<()> {
        self.log("DELETE", resource_id);
        match self.resources.lock().unwrap().remove(resource_id) {
            Some(_) => Ok(()),
            None => Err(not_found(resource_id)),
        }
    }
}

struct Fixture {
    _temp_dir: TempDir,
    manifests: PathBuf,
    state: String,
    arm: Arc<InMemoryArm>,
    workflow: ProviderWorkflow,
}

fn setup() -> Fixture {
    let temp_dir = TempDir::new().unwrap();
    let manifests = temp_dir.path().join("manifests");
    fs::create_dir_all(&manifests).unwrap();

    let source: PathBuf = [env!("CARGO_MANIFEST_DIR"), "tests", "fixtures", "manifests"]
        .iter()
        .collect();
    for entry in fs::read_dir(source).unwrap() {
        let path = entry.unwrap().path();
        fs::copy(&path, manifests.join(path.file_name().unwrap())).unwrap();
    }

    let state = temp_dir
        .path()
        .join("state.json")
        .to_string_lossy()
        .to_string();
    let arm = Arc::new(InMemoryArm::default());
    let workflow = ProviderWorkflow::new(arm.clone());

    Fixture {
        _temp_dir: temp_dir,
        manifests,
        state,
        arm,
        workflow,
    }
}

impl Fixture {
    fn dir(&self) -> &str {
        self.manifests.to_str().unwrap()
    }

    fn state_json(&self) -> Value {
        serde_json::from_str(&fs::read_to_string(&self.state).unwrap()).unwrap()
    }
}

fn child_id(segment: &str, name: &str) -> String {
    format!("{}/{}/{}", FACTORY_ID, segment, name)
}

fn write_manifest(path: &Path, value: Value) {
    fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

#[tokio::test]
async fn test_apply_creates_resources_in_dependency_order() {
    let fixture = setup();

    let summary = fixture
        .workflow
        .apply(fixture.dir(), &fixture.state, false)
        .await
        .unwrap();
    assert_eq!(summary.created, 4);

    let puts: Vec<String> = fixture
        .arm
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("PUT "))
        .collect();
    assert_eq!(
        puts,
        vec![
            format!("PUT {}", child_id("credentials", "loader")),
            format!("PUT {}", child_id("linkedservices", "sql")),
            format!("PUT {}", child_id("datasets", "orders")),
            format!("PUT {}", child_id("pipelines", "nightly")),
        ]
    );

    let state = fixture.state_json();
    let resources = state["resources"].as_object().unwrap();
    assert_eq!(resources.len(), 4);
    assert_eq!(
        resources["azurerm_data_factory_pipeline.nightly"]["id"],
        child_id("pipelines", "nightly")
    );

    let stored = fixture.arm.stored(&child_id("datasets", "orders")).unwrap();
    assert_eq!(stored["properties"]["type"], "AzureSqlTable");
    assert_eq!(
        stored["properties"]["linkedServiceName"]["referenceName"],
        "sql"
    );
}

#[tokio::test]
async fn test_second_plan_has_no_changes() {
    let fixture = setup();
    fixture
        .workflow
        .apply(fixture.dir(), &fixture.state, false)
        .await
        .unwrap();

    let plan = fixture
        .workflow
        .plan(fixture.dir(), &fixture.state)
        .await
        .unwrap();

    for change in &plan {
        assert_eq!(
            change.action,
            ChangeAction::NoOp,
            "{} changes: {:?}",
            change.address(),
            change.changes
        );
    }
}

#[tokio::test]
async fn test_changed_description_updates_in_place() {
    let fixture = setup();
    fixture
        .workflow
        .apply(fixture.dir(), &fixture.state, false)
        .await
        .unwrap();

    write_manifest(
        &fixture.manifests.join("pipelines.json"),
        json!({
            "type": "azurerm_data_factory_pipeline",
            "name": "nightly",
            "config": {
                "name": "nightly",
                "data_factory_id": FACTORY_ID,
                "description": "runs every night",
                "variables": {"bob": "item1"},
                "activities_json": "[{\"name\": \"Append variable1\", \"type\": \"AppendVariable\", \"dependsOn\": [], \"userProperties\": [], \"typeProperties\": {\"variableName\": \"bob\", \"value\": \"something\"}}]"
            }
        }),
    );

    let summary = fixture
        .workflow
        .apply(fixture.dir(), &fixture.state, false)
        .await
        .unwrap();

    assert_eq!(summary.updated, 1);
    assert_eq!(summary.unchanged, 3);
    let stored = fixture.arm.stored(&child_id("pipelines", "nightly")).unwrap();
    assert_eq!(stored["properties"]["description"], "runs every night");
}

#[tokio::test]
async fn test_renamed_resource_is_replaced() {
    let fixture = setup();
    fixture
        .workflow
        .apply(fixture.dir(), &fixture.state, false)
        .await
        .unwrap();

    // name は変更できないため、別アドレスの新規作成と旧アドレスの削除になる
    write_manifest(
        &fixture.manifests.join("pipelines.json"),
        json!({
            "type": "azurerm_data_factory_pipeline",
            "name": "hourly",
            "config": {"name": "hourly", "data_factory_id": FACTORY_ID}
        }),
    );

    let summary = fixture
        .workflow
        .apply(fixture.dir(), &fixture.state, false)
        .await
        .unwrap();

    assert_eq!(summary.created, 1);
    assert_eq!(summary.deleted, 1);
    assert!(fixture.arm.stored(&child_id("pipelines", "nightly")).is_none());
    assert!(fixture.arm.stored(&child_id("pipelines", "hourly")).is_some());
}

#[tokio::test]
async fn test_removed_manifest_deletes_resource() {
    let fixture = setup();
    fixture
        .workflow
        .apply(fixture.dir(), &fixture.state, false)
        .await
        .unwrap();

    fs::remove_file(fixture.manifests.join("pipelines.json")).unwrap();
    fs::remove_file(fixture.manifests.join("datasets.json")).unwrap();

    let plan = fixture
        .workflow
        .plan(fixture.dir(), &fixture.state)
        .await
        .unwrap();
    let deletes: Vec<String> = plan
        .iter()
        .filter(|c| c.action == ChangeAction::Delete)
        .map(|c| c.address())
        .collect();
    assert_eq!(
        deletes,
        vec![
            "azurerm_data_factory_pipeline.nightly",
            "azurerm_data_factory_dataset_azure_sql_table.orders",
        ]
    );

    let summary = fixture
        .workflow
        .apply(fixture.dir(), &fixture.state, false)
        .await
        .unwrap();

    assert_eq!(summary.deleted, 2);
    assert!(fixture.arm.stored(&child_id("datasets", "orders")).is_none());
    assert_eq!(fixture.state_json()["resources"].as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn test_refresh_forgets_resources_deleted_outside() {
    let fixture = setup();
    fixture
        .workflow
        .apply(fixture.dir(), &fixture.state, false)
        .await
        .unwrap();

    fixture.arm.remove(&child_id("pipelines", "nightly"));

    let count = fixture.workflow.refresh(&fixture.state).await.unwrap();
    assert_eq!(count, 4);

    let state = fixture.state_json();
    let resources = state["resources"].as_object().unwrap();
    assert_eq!(resources.len(), 3);
    assert!(!resources.contains_key("azurerm_data_factory_pipeline.nightly"));

    let plan = fixture
        .workflow
        .plan(fixture.dir(), &fixture.state)
        .await
        .unwrap();
    let pipeline = plan
        .iter()
        .find(|c| c.name == "nightly")
        .unwrap();
    assert_eq!(pipeline.action, ChangeAction::Create);
}

#[tokio::test]
async fn test_destroy_deletes_in_reverse_order() {
    let fixture = setup();
    fixture
        .workflow
        .apply(fixture.dir(), &fixture.state, false)
        .await
        .unwrap();

    let count = fixture
        .workflow
        .destroy(&fixture.state, false)
        .await
        .unwrap();
    assert_eq!(count, 4);

    let deletes: Vec<String> = fixture
        .arm
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("DELETE "))
        .collect();
    assert_eq!(
        deletes,
        vec![
            format!("DELETE {}", child_id("pipelines", "nightly")),
            format!("DELETE {}", child_id("datasets", "orders")),
            format!("DELETE {}", child_id("linkedservices", "sql")),
            format!("DELETE {}", child_id("credentials", "loader")),
        ]
    );
    assert!(fixture.state_json()["resources"]
        .as_object()
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_destroy_tolerates_resources_already_gone() {
    let fixture = setup();
    fixture
        .workflow
        .apply(fixture.dir(), &fixture.state, false)
        .await
        .unwrap();

    fixture.arm.remove(&child_id("datasets", "orders"));

    assert_eq!(
        fixture
            .workflow
            .destroy(&fixture.state, false)
            .await
            .unwrap(),
        4
    );
}

#[tokio::test]
async fn test_create_refuses_existing_remote_resource() {
    let fixture = setup();
    fixture
        .arm
        .put(
            &child_id("pipelines", "nightly"),
            &json!({"properties": {"activities": []}}),
        )
        .await
        .unwrap();

    let error = fixture
        .workflow
        .apply(fixture.dir(), &fixture.state, false)
        .await
        .unwrap_err();

    assert!(format!("{:#}", error).contains("already exists"));
    // 失敗までに作成したリソースは記録されている
    assert_eq!(fixture.state_json()["resources"].as_object().unwrap().len(), 3);
}
