//! # Cosmos DB (SQL API) Dataset

use super::{expand_structure, schema_column_attribute, DatasetMapping};
use crate::application::dto::dataset::{CosmosDbSqlApiDatasetConfig, DatasetCommonConfig};
use crate::domain::entities::dataset::{CosmosDbSqlApiCollectionTypeProperties, Dataset, DatasetKind};
use crate::domain::entities::dynamic_value::{flatten_optional_string, DynamicValue};
use crate::domain::errors::DataFactoryError;
use crate::domain::schema::Attribute;
use crate::domain::services::field_mapping::FieldMapping;

/// `azurerm_data_factory_dataset_cosmosdb_sqlapi`
pub struct CosmosDbSqlApiDataset;

impl DatasetMapping for CosmosDbSqlApiDataset {
    type Config = CosmosDbSqlApiDatasetConfig;

    const TYPE_NAME: &'static str = "azurerm_data_factory_dataset_cosmosdb_sqlapi";
    const API_TYPE: &'static str = "CosmosDbSqlApiCollection";

    fn common(config: &Self::Config) -> &DatasetCommonConfig {
        &config.common
    }

    fn attributes() -> Vec<Attribute> {
        vec![
            Attribute::string("collection_name").optional(),
            schema_column_attribute(),
        ]
    }

    fn expand_kind(config: &Self::Config) -> Result<DatasetKind, DataFactoryError> {
        Ok(DatasetKind::CosmosDbSqlApiCollection(
            CosmosDbSqlApiCollectionTypeProperties {
                collection_name: config.collection_name.as_deref().map(DynamicValue::from),
            },
        ))
    }

    fn expand_columns(config: &Self::Config, dataset: &mut Dataset) {
        expand_structure(&config.schema_column, dataset);
    }

    fn flatten_type(
        dataset: &Dataset,
        common: DatasetCommonConfig,
        _prior: Option<&Self::Config>,
    ) -> Result<Self::Config, DataFactoryError> {
        let collection_name = match &dataset.kind {
            DatasetKind::CosmosDbSqlApiCollection(props) => {
                flatten_optional_string("collection_name", props.collection_name.as_ref())
            }
            _ => None,
        };

        Ok(CosmosDbSqlApiDatasetConfig {
            common,
            collection_name,
            schema_column: FieldMapping::flatten_structure_columns(dataset.structure.as_ref()),
        })
    }
}
