//! # Delimited Text Dataset

use super::location::{
    expand_location, flatten_location, location_attributes, AZURE_BLOB_FS_LOCATION,
    AZURE_BLOB_STORAGE_LOCATION, HTTP_SERVER_LOCATION,
};
use super::{expand_structure, schema_column_attribute, DatasetMapping};
use crate::application::dto::dataset::{DatasetCommonConfig, DelimitedTextDatasetConfig};
use crate::domain::entities::dataset::{Dataset, DatasetKind, DelimitedTextTypeProperties};
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

/// `azurerm_data_factory_dataset_delimited_text`
pub struct DelimitedTextDataset;

fn text(value: Option<&String>) -> Option<DynamicValue> {
    value.map(|v| DynamicValue::from(v.as_str()))
}

impl DatasetMapping for DelimitedTextDataset {
    type Config = DelimitedTextDatasetConfig;

    const TYPE_NAME: &'static str = "azurerm_data_factory_dataset_delimited_text";
    const API_TYPE: &'static str = "DelimitedText";

    fn common(config: &Self::Config) -> &DatasetCommonConfig {
        &config.common
    }

    fn attributes() -> Vec<Attribute> {
        let mut attributes = location_attributes(LOCATIONS);
        attributes.extend([
            Attribute::string("column_delimiter").optional(),
            Attribute::string("row_delimiter").optional(),
            Attribute::string("encoding").optional(),
            Attribute::string("quote_character").optional(),
            Attribute::string("escape_character").optional(),
            Attribute::bool("first_row_as_header")
                .optional()
                .default_value(false),
            Attribute::string("null_value").optional(),
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
        Ok(DatasetKind::DelimitedText(DelimitedTextTypeProperties {
            location: expand_location(&config.location)?,
            column_delimiter: text(config.column_delimiter.as_ref()),
            row_delimiter: text(config.row_delimiter.as_ref()),
            encoding_name: text(config.encoding.as_ref()),
            quote_char: text(config.quote_character.as_ref()),
            escape_char: text(config.escape_character.as_ref()),
            first_row_as_header: Some(DynamicValue::Bool(config.first_row_as_header)),
            null_value: text(config.null_value.as_ref()),
            compression_codec: config
                .compression_codec
                .as_deref()
                .filter(|codec| !codec.is_empty())
                .map(|codec| DynamicValue::String(CompressionNormalizer::expand_codec(codec))),
            compression_level: text(config.compression_level.as_ref()),
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
        let DatasetKind::DelimitedText(props) = &dataset.kind else {
            return Ok(DelimitedTextDatasetConfig {
                common,
                ..Default::default()
            });
        };

        Ok(DelimitedTextDatasetConfig {
            common,
            location: flatten_location(&props.location),
            column_delimiter: flatten_optional_string("column_delimiter", props.column_delimiter.as_ref()),
            row_delimiter: flatten_optional_string("row_delimiter", props.row_delimiter.as_ref()),
            encoding: flatten_optional_string("encoding", props.encoding_name.as_ref()),
            quote_character: flatten_optional_string("quote_character", props.quote_char.as_ref()),
            escape_character: flatten_optional_string("escape_character", props.escape_char.as_ref()),
            first_row_as_header: props
                .first_row_as_header
                .as_ref()
                .and_then(|v| v.flatten_bool("first_row_as_header"))
                .unwrap_or(false),
            null_value: flatten_optional_string("null_value", props.null_value.as_ref()),
            compression_codec: flatten_optional_string(
                "compression_codec",
                props.compression_codec.as_ref(),
            ),
            compression_level: flatten_optional_string(
                "compression_level",
                props.compression_level.as_ref(),
            ),
            schema_column: FieldMapping::flatten_structure_columns(dataset.structure.as_ref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::dataset::{AzureBlobStorageLocationConfig, LocationBlocks};
    use serde_json::json;

    fn config() -> DelimitedTextDatasetConfig {
        DelimitedTextDatasetConfig {
            location: LocationBlocks {
                azure_blob_storage_location: Some(AzureBlobStorageLocationConfig {
                    container: "raw".to_string(),
                    path: Some("csv".to_string()),
                    filename: Some("orders.csv".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            },
            column_delimiter: Some(",".to_string()),
            row_delimiter: Some("NEW".to_string()),
            encoding: Some("UTF-8".to_string()),
            quote_character: Some("x".to_string()),
            escape_character: Some("f".to_string()),
            first_row_as_header: true,
            null_value: Some("NULL".to_string()),
            compression_codec: Some("gzip".to_string()),
            compression_level: Some("Optimal".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_expand_type_properties() {
        let DatasetKind::DelimitedText(props) = DelimitedTextDataset::expand_kind(&config()).unwrap()
        else {
            panic!("expected a delimited text dataset");
        };

        let rendered = serde_json::to_value(&props).unwrap();
        assert_eq!(rendered["columnDelimiter"], ",");
        assert_eq!(rendered["encodingName"], "UTF-8");
        assert_eq!(rendered["firstRowAsHeader"], true);
        assert_eq!(rendered["compressionCodec"], "gzip");
        assert_eq!(rendered["location"]["type"], "AzureBlobStorageLocation");
    }

    #[test]
    fn test_expand_normalizes_codec() {
        let mut config = config();
        config.compression_codec = Some("GZip".to_string());
        let DatasetKind::DelimitedText(props) = DelimitedTextDataset::expand_kind(&config).unwrap()
        else {
            panic!("expected a delimited text dataset");
        };
        assert_eq!(props.compression_codec, Some(DynamicValue::from("gzip")));
    }

    #[test]
    fn test_round_trip() {
        let dataset = Dataset::new("blob", DelimitedTextDataset::expand_kind(&config()).unwrap());
        let flattened =
            DelimitedTextDataset::flatten_type(&dataset, DatasetCommonConfig::default(), None).unwrap();
        assert_eq!(flattened, config());
    }

    #[test]
    fn test_flatten_first_row_as_header_string() {
        let dataset: Dataset = serde_json::from_value(json!({
            "type": "DelimitedText",
            "linkedServiceName": {"referenceName": "blob", "type": "LinkedServiceReference"},
            "typeProperties": {
                "location": {"type": "AzureBlobStorageLocation", "container": "raw"},
                "firstRowAsHeader": "true",
                "columnDelimiter": {"value": "@dataset().sep", "type": "Expression"}
            }
        }))
        .unwrap();

        let flattened =
            DelimitedTextDataset::flatten_type(&dataset, DatasetCommonConfig::default(), None).unwrap();
        assert!(flattened.first_row_as_header);
        assert_eq!(flattened.column_delimiter, None);
    }
}
