//! # Azure SQL Table Dataset

use super::{expand_structure, schema_column_attribute, DatasetMapping};
use crate::application::dto::dataset::{AzureSqlTableDatasetConfig, DatasetCommonConfig};
use crate::domain::entities::dataset::{AzureSqlTableTypeProperties, Dataset, DatasetKind};
use crate::domain::entities::dynamic_value::{flatten_optional_string, DynamicValue};
use crate::domain::errors::DataFactoryError;
use crate::domain::schema::Attribute;
use crate::domain::services::field_mapping::FieldMapping;

/// `azurerm_data_factory_dataset_azure_sql_table`
pub struct AzureSqlTableDataset;

impl DatasetMapping for AzureSqlTableDataset {
    type Config = AzureSqlTableDatasetConfig;

    const TYPE_NAME: &'static str = "azurerm_data_factory_dataset_azure_sql_table";
    const API_TYPE: &'static str = "AzureSqlTable";

    fn common(config: &Self::Config) -> &DatasetCommonConfig {
        &config.common
    }

    fn attributes() -> Vec<Attribute> {
        vec![
            Attribute::string("schema").optional(),
            Attribute::string("table").optional(),
            schema_column_attribute(),
        ]
    }

    fn expand_kind(config: &Self::Config) -> Result<DatasetKind, DataFactoryError> {
        Ok(DatasetKind::AzureSqlTable(AzureSqlTableTypeProperties {
            schema: config.schema.as_deref().map(DynamicValue::from),
            table: config.table.as_deref().map(DynamicValue::from),
            table_name: None,
        }))
    }

    fn expand_columns(config: &Self::Config, dataset: &mut Dataset) {
        expand_structure(&config.schema_column, dataset);
    }

    fn flatten_type(
        dataset: &Dataset,
        common: DatasetCommonConfig,
        _prior: Option<&Self::Config>,
    ) -> Result<Self::Config, DataFactoryError> {
        let DatasetKind::AzureSqlTable(props) = &dataset.kind else {
            return Ok(AzureSqlTableDatasetConfig {
                common,
                ..Default::default()
            });
        };

        // 旧形式の tableName しか持たない Dataset もある
        let table = flatten_optional_string("table", props.table.as_ref())
            .or_else(|| flatten_optional_string("table_name", props.table_name.as_ref()));

        Ok(AzureSqlTableDatasetConfig {
            common,
            schema: flatten_optional_string("schema", props.schema.as_ref()),
            table,
            schema_column: FieldMapping::flatten_structure_columns(dataset.structure.as_ref()),
        })
    }
}
