//! # Parquet Dataset

use super::location::{
    expand_location, flatten_location, location_attributes, AZURE_BLOB_FS_LOCATION,
    AZURE_BLOB_STORAGE_LOCATION, HTTP_SERVER_LOCATION,
};
use super::{expand_structure, schema_column_attribute, DatasetMapping};
use crate::application::dto::dataset::{DatasetCommonConfig, ParquetDatasetConfig};
use crate::domain::entities::dataset::{Dataset, DatasetKind, ParquetTypeProperties};
use crate::domain::entities::dynamic_value::{flatten_optional_string, DynamicValue};
use crate::domain::errors::DataFactoryError;
use crate::domain::schema::{Attribute, Validation};
use crate::domain::services::compression::{
    CompressionNormalizer, COMPRESSION_CODECS, COMPRESSION_LEVELS,
};
use crate::domain::services::diff_suppress::DiffSuppression;
use crate::domain::services::field_mapping::FieldMapping;

const LOCATIONS: &[&str] = &[
    HTTP_SERVER_LOCATION,
    AZURE_BLOB_STORAGE_LOCATION,
    AZURE_BLOB_FS_LOCATION,
];

/// `azurerm_data_factory_dataset_parquet`
pub struct ParquetDataset;

impl DatasetMapping for ParquetDataset {
    type Config = ParquetDatasetConfig;

    const TYPE_NAME: &'static str = "azurerm_data_factory_dataset_parquet";
    const API_TYPE: &'static str = "Parquet";

    fn common(config: &Self::Config) -> &DatasetCommonConfig {
        &config.common
    }

    fn attributes() -> Vec<Attribute> {
        let mut attributes = location_attributes(LOCATIONS);
        attributes.extend([
            Attribute::string("compression_codec")
                .optional()
                .validate(Validation::one_of_ignore_case(&COMPRESSION_CODECS))
                .diff_suppress(DiffSuppression::case_insensitive),
            Attribute::string("compression_level")
                .optional()
                .validate(Validation::one_of(&COMPRESSION_LEVELS)),
            schema_column_attribute(),
        ]);
        attributes
    }

    fn expand_kind(config: &Self::Config) -> Result<DatasetKind, DataFactoryError> {
        Ok(DatasetKind::Parquet(ParquetTypeProperties {
            location: expand_location(&config.location)?,
            compression_codec: config
                .compression_codec
                .as_deref()
                .filter(|codec| !codec.is_empty())
                .map(|codec| DynamicValue::String(CompressionNormalizer::expand_codec(codec))),
            compression_level: config
                .compression_level
                .as_deref()
                .filter(|level| !level.is_empty())
                .map(DynamicValue::from),
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
        let mut config = ParquetDatasetConfig {
            common,
            schema_column: FieldMapping::flatten_structure_columns(dataset.structure.as_ref()),
            ..Default::default()
        };

        if let DatasetKind::Parquet(props) = &dataset.kind {
            config.location = flatten_location(&props.location);
            config.compression_codec =
                flatten_optional_string("compression_codec", props.compression_codec.as_ref());
            config.compression_level =
                flatten_optional_string("compression_level", props.compression_level.as_ref());
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::dataset::{AzureBlobFsLocationConfig, LocationBlocks};
    use crate::domain::schema::Schema;
    use serde_json::{json, Map, Value};

    #[test]
    fn test_round_trip_with_codec_passthrough() {
        let config = ParquetDatasetConfig {
            location: LocationBlocks {
                azure_blob_fs_location: Some(AzureBlobFsLocationConfig {
                    file_system: Some("lake".to_string()),
                    path: Some("curated".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            },
            compression_codec: Some("TarGZip".to_string()),
            ..Default::default()
        };

        let dataset = Dataset::new("adls", ParquetDataset::expand_kind(&config).unwrap());
        let DatasetKind::Parquet(props) = &dataset.kind else {
            panic!("expected a parquet dataset");
        };
        assert_eq!(props.compression_codec, Some(DynamicValue::from("TarGZip")));

        let flattened =
            ParquetDataset::flatten_type(&dataset, DatasetCommonConfig::default(), None).unwrap();
        assert_eq!(flattened, config);
    }

    #[test]
    fn test_schema_rejects_sftp_location() {
        let schema = Schema::new(ParquetDataset::attributes());
        let mut config: Map<String, Value> = Map::new();
        config.insert(
            "sftp_server_location".to_string(),
            json!({"path": "/in", "filename": "x.parquet"}),
        );

        let Err(DataFactoryError::Validation(messages)) = schema.validate(&config) else {
            panic!("expected a validation error");
        };
        assert!(messages.iter().any(|m| m.contains("unsupported argument")));
        assert!(messages.iter().any(|m| m.starts_with("exactly one of")));
    }

    #[test]
    fn test_codec_case_is_suppressed() {
        let schema = Schema::new(ParquetDataset::attributes());
        let codec = schema.attribute("compression_codec").unwrap();
        let suppress = codec.diff_suppress.unwrap();
        assert!(suppress("compression_codec", "snappy", "Snappy"));
    }
}
