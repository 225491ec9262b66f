//! オフラインコマンド（schema / validate / plan）の統合テスト

use adf_provider::driver::workflow::ChangeAction;
use adf_provider::driver::ProviderWorkflow;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture_dir(name: &str) -> String {
    let path: PathBuf = [env!("CARGO_MANIFEST_DIR"), "tests", "fixtures", name]
        .iter()
        .collect();
    path.to_string_lossy().to_string()
}

fn missing_state(temp_dir: &TempDir) -> String {
    temp_dir
        .path()
        .join("adf-provider.state.json")
        .to_string_lossy()
        .to_string()
}

#[tokio::test]
async fn test_validate_fixture_manifests() {
    let workflow = ProviderWorkflow::offline();

    let count = workflow.validate(&fixture_dir("manifests")).await.unwrap();

    assert_eq!(count, 4);
}

#[tokio::test]
async fn test_validate_reports_every_failure() {
    let workflow = ProviderWorkflow::offline();

    let error = workflow
        .validate(&fixture_dir("invalid"))
        .await
        .unwrap_err();

    assert!(error.to_string().contains("2 of 2 resources failed validation"));
}

#[tokio::test]
async fn test_plan_without_state_creates_in_dependency_order() {
    let temp_dir = TempDir::new().unwrap();
    let workflow = ProviderWorkflow::offline();

    let plan = workflow
        .plan(&fixture_dir("manifests"), &missing_state(&temp_dir))
        .await
        .unwrap();

    let addresses: Vec<String> = plan.iter().map(|c| c.address()).collect();
    assert_eq!(
        addresses,
        vec![
            "azurerm_data_factory_credential_user_managed_identity.loader",
            "azurerm_data_factory_linked_service_azure_sql_database.sql",
            "azurerm_data_factory_dataset_azure_sql_table.orders",
            "azurerm_data_factory_pipeline.nightly",
        ]
    );
    assert!(plan.iter().all(|c| c.action == ChangeAction::Create));
    assert!(!temp_dir.path().join("adf-provider.state.json").exists());
}

#[tokio::test]
async fn test_plan_rejects_unknown_resource_type() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("unknown.json"),
        r#"{"type": "azurerm_data_factory_dataset_json", "name": "x", "config": {}}"#,
    )
    .unwrap();

    let error = ProviderWorkflow::offline()
        .plan(temp_dir.path().to_str().unwrap(), &missing_state(&temp_dir))
        .await
        .unwrap_err();

    assert!(format!("{:#}", error).contains("unsupported resource type"));
}

#[tokio::test]
async fn test_plan_rejects_duplicate_declarations() {
    let temp_dir = TempDir::new().unwrap();
    let manifest = r#"{"type": "azurerm_data_factory_pipeline", "name": "p", "config": {}}"#;
    fs::write(temp_dir.path().join("a.json"), manifest).unwrap();
    fs::write(temp_dir.path().join("b.json"), manifest).unwrap();

    let error = ProviderWorkflow::offline()
        .plan(temp_dir.path().to_str().unwrap(), &missing_state(&temp_dir))
        .await
        .unwrap_err();

    assert!(error.to_string().contains("declared more than once"));
}

#[tokio::test]
async fn test_apply_dry_run_needs_no_api() {
    let temp_dir = TempDir::new().unwrap();
    let state = missing_state(&temp_dir);

    let summary = ProviderWorkflow::offline()
        .apply(&fixture_dir("manifests"), &state, true)
        .await
        .unwrap();

    assert_eq!(summary.created, 0);
    assert!(!temp_dir.path().join("adf-provider.state.json").exists());
}

#[test]
fn test_schema_describes_pipeline() {
    let schema = ProviderWorkflow::offline()
        .schema(Some("azurerm_data_factory_pipeline"))
        .unwrap();

    let text = schema.to_string();
    assert!(text.contains("activities_json"));
    assert!(text.contains("concurrency"));
}
