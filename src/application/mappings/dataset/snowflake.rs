//! # Snowflake Dataset

use super::DatasetMapping;
use crate::application::dto::dataset::{DatasetCommonConfig, SnowflakeDatasetConfig};
use crate::domain::entities::dataset::{Dataset, DatasetKind, SnowflakeTypeProperties};
use crate::domain::entities::dynamic_value::{flatten_optional_string, DynamicValue};
use crate::domain::errors::DataFactoryError;
use crate::domain::schema::{Attribute, Schema, Validation};
use crate::domain::services::field_mapping::FieldMapping;

/// `azurerm_data_factory_dataset_snowflake`
///
/// カラム定義は `structure` ではなく `schema` に入る
pub struct SnowflakeDataset;

impl DatasetMapping for SnowflakeDataset {
    type Config = SnowflakeDatasetConfig;

    const TYPE_NAME: &'static str = "azurerm_data_factory_dataset_snowflake";
    const API_TYPE: &'static str = "SnowflakeTable";

    fn common(config: &Self::Config) -> &DatasetCommonConfig {
        &config.common
    }

    fn attributes() -> Vec<Attribute> {
        vec![
            Attribute::string("schema_name").optional(),
            Attribute::string("table_name").optional(),
            Attribute::block_list(
                "schema_column",
                Schema::new(vec![
                    Attribute::string("name")
                        .required()
                        .validate(Validation::NotEmpty),
                    Attribute::string("type").optional(),
                    Attribute::int("precision")
                        .optional()
                        .validate(Validation::IntBetween(0, 38)),
                    Attribute::int("scale")
                        .optional()
                        .validate(Validation::IntBetween(0, 37)),
                ]),
            )
            .optional(),
        ]
    }

    fn expand_kind(config: &Self::Config) -> Result<DatasetKind, DataFactoryError> {
        Ok(DatasetKind::SnowflakeTable(SnowflakeTypeProperties {
            schema: config.schema_name.as_deref().map(DynamicValue::from),
            table: config.table_name.as_deref().map(DynamicValue::from),
        }))
    }

    fn expand_columns(config: &Self::Config, dataset: &mut Dataset) {
        dataset.schema = FieldMapping::expand_snowflake_columns(&config.schema_column);
    }

    fn flatten_type(
        dataset: &Dataset,
        common: DatasetCommonConfig,
        _prior: Option<&Self::Config>,
    ) -> Result<Self::Config, DataFactoryError> {
        let (schema_name, table_name) = match &dataset.kind {
            DatasetKind::SnowflakeTable(props) => (
                flatten_optional_string("schema_name", props.schema.as_ref()),
                flatten_optional_string("table_name", props.table.as_ref()),
            ),
            _ => (None, None),
        };

        Ok(SnowflakeDatasetConfig {
            common,
            schema_name,
            table_name,
            schema_column: FieldMapping::flatten_snowflake_columns(dataset.schema.as_ref()),
        })
    }
}
