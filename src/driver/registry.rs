//! Resource Registry
//!
//! リソース種別名から `Resource` 実装を引く

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::adapter::azure::client::ArmClient;
use crate::adapter::repositories::arm_resource_repository::ArmResourceRepository;
use crate::application::mappings::credential::{
    ServicePrincipalCredential, UserManagedIdentityCredential,
};
use crate::application::mappings::dataset::azure_blob::AzureBlobDataset;
use crate::application::mappings::dataset::azure_sql_table::AzureSqlTableDataset;
use crate::application::mappings::dataset::binary::BinaryDataset;
use crate::application::mappings::dataset::cosmosdb_sqlapi::CosmosDbSqlApiDataset;
use crate::application::mappings::dataset::delimited_text::DelimitedTextDataset;
use crate::application::mappings::dataset::parquet::ParquetDataset;
use crate::application::mappings::dataset::snowflake::SnowflakeDataset;
use crate::application::mappings::dataset::Datasets;
use crate::application::mappings::linked_service::azure_blob_storage::AzureBlobStorageLinkedService;
use crate::application::mappings::linked_service::azure_sql_database::AzureSqlDatabaseLinkedService;
use crate::application::mappings::linked_service::sftp::SftpLinkedService;
use crate::application::mappings::linked_service::sql_server::SqlServerLinkedService;
use crate::application::mappings::linked_service::web::WebLinkedService;
use crate::application::mappings::linked_service::LinkedServices;
use crate::application::mappings::pipeline::PipelineMapping;
use crate::application::mappings::ResourceMapping;
use crate::application::use_cases::resource_lifecycle::{Resource, ResourceUseCase};

/// 登録済みのリソース種別
pub struct ResourceRegistry {
    resources: BTreeMap<&'static str, Box<dyn Resource>>,
}

impl ResourceRegistry {
    /// すべての種別を1つの ARM クライアントで登録する
    pub fn new(client: Arc<dyn ArmClient>) -> Self {
        let repository = Arc::new(ArmResourceRepository::new(client));
        let mut registry = Self {
            resources: BTreeMap::new(),
        };

        registry.register(&repository, UserManagedIdentityCredential);
        registry.register(&repository, ServicePrincipalCredential);

        registry.register(&repository, LinkedServices::<AzureBlobStorageLinkedService>::new());
        registry.register(&repository, LinkedServices::<AzureSqlDatabaseLinkedService>::new());
        registry.register(&repository, LinkedServices::<SftpLinkedService>::new());
        registry.register(&repository, LinkedServices::<SqlServerLinkedService>::new());
        registry.register(&repository, LinkedServices::<WebLinkedService>::new());

        registry.register(&repository, Datasets::<AzureBlobDataset>::new());
        registry.register(&repository, Datasets::<AzureSqlTableDataset>::new());
        registry.register(&repository, Datasets::<BinaryDataset>::new());
        registry.register(&repository, Datasets::<CosmosDbSqlApiDataset>::new());
        registry.register(&repository, Datasets::<DelimitedTextDataset>::new());
        registry.register(&repository, Datasets::<ParquetDataset>::new());
        registry.register(&repository, Datasets::<SnowflakeDataset>::new());

        registry.register(&repository, PipelineMapping);

        registry
    }

    fn register<M>(&mut self, repository: &Arc<ArmResourceRepository>, mapping: M)
    where
        M: ResourceMapping,
        M::Model: serde::Serialize + serde::de::DeserializeOwned,
    {
        let resource = ResourceUseCase::new(repository.clone(), mapping);
        self.resources.insert(resource.type_name(), Box::new(resource));
    }

    pub fn get(&self, resource_type: &str) -> Option<&dyn Resource> {
        self.resources.get(resource_type).map(|r| r.as_ref())
    }

    /// 種別名の一覧（名前順）
    pub fn types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.keys().copied()
    }
}

/// 依存関係に沿った適用順（Credential → Linked Service → Dataset → Pipeline）
///
/// 削除はこの逆順で行う
pub fn apply_rank(resource_type: &str) -> u8 {
    if resource_type.starts_with("azurerm_data_factory_credential_") {
        0
    } else if resource_type.starts_with("azurerm_data_factory_linked_service_") {
        1
    } else if resource_type.starts_with("azurerm_data_factory_dataset_") {
        2
    } else {
        3
    }
}
