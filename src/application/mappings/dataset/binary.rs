//! # Binary Dataset

use super::location::{
    expand_location, flatten_location, location_attributes, AZURE_BLOB_FS_LOCATION,
    AZURE_BLOB_STORAGE_LOCATION, HTTP_SERVER_LOCATION, SFTP_SERVER_LOCATION,
};
use super::DatasetMapping;
use crate::application::dto::dataset::{BinaryCompressionConfig, BinaryDatasetConfig, DatasetCommonConfig};
use crate::domain::entities::dataset::{BinaryTypeProperties, Dataset, DatasetCompression, DatasetKind};
use crate::domain::entities::dynamic_value::{flatten_optional_string, DynamicValue};
use crate::domain::errors::DataFactoryError;
use crate::domain::schema::{Attribute, Schema, Validation};
use crate::domain::services::compression::{
    CompressionNormalizer, BINARY_COMPRESSION_TYPES, COMPRESSION_LEVELS,
};
use crate::domain::services::diff_suppress::DiffSuppression;

const LOCATIONS: &[&str] = &[
    HTTP_SERVER_LOCATION,
    AZURE_BLOB_STORAGE_LOCATION,
    AZURE_BLOB_FS_LOCATION,
    SFTP_SERVER_LOCATION,
];

/// `azurerm_data_factory_dataset_binary`
pub struct BinaryDataset;

impl DatasetMapping for BinaryDataset {
    type Config = BinaryDatasetConfig;

    const TYPE_NAME: &'static str = "azurerm_data_factory_dataset_binary";
    const API_TYPE: &'static str = "Binary";

    fn common(config: &Self::Config) -> &DatasetCommonConfig {
        &config.common
    }

    fn attributes() -> Vec<Attribute> {
        let mut attributes = location_attributes(LOCATIONS);
        attributes.push(
            Attribute::block(
                "compression",
                Schema::new(vec![
                    Attribute::string("type")
                        .required()
                        .validate(Validation::one_of_ignore_case(&BINARY_COMPRESSION_TYPES))
                        .diff_suppress(DiffSuppression::case_insensitive),
                    Attribute::string("level")
                        .optional()
                        .validate(Validation::one_of(&COMPRESSION_LEVELS)),
                ]),
            )
            .optional(),
        );
        attributes
    }

    fn expand_kind(config: &Self::Config) -> Result<DatasetKind, DataFactoryError> {
        let compression = config.compression.as_ref().map(|c| DatasetCompression {
            compression_type: DynamicValue::from(c.compression_type.as_str()),
            level: c
                .level
                .as_deref()
                .filter(|level| !level.is_empty())
                .map(DynamicValue::from),
        });

        Ok(DatasetKind::Binary(BinaryTypeProperties {
            location: expand_location(&config.location)?,
            compression,
        }))
    }

    fn flatten_type(
        dataset: &Dataset,
        common: DatasetCommonConfig,
        _prior: Option<&Self::Config>,
    ) -> Result<Self::Config, DataFactoryError> {
        let DatasetKind::Binary(props) = &dataset.kind else {
            return Ok(BinaryDatasetConfig {
                common,
                ..Default::default()
            });
        };

        let compression = props.compression.as_ref().map(|c| {
            let compression_type = flatten_optional_string("compression.type", Some(&c.compression_type))
                .map(|t| CompressionNormalizer::flatten_binary_type(&t))
                .unwrap_or_default();
            BinaryCompressionConfig {
                compression_type,
                level: flatten_optional_string("compression.level", c.level.as_ref()),
            }
        });

        Ok(BinaryDatasetConfig {
            common,
            location: flatten_location(&props.location),
            compression,
        })
    }
}
