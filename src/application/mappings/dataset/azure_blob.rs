//! # Azure Blob Dataset

use super::{expand_structure, schema_column_attribute, DatasetMapping};
use crate::application::dto::dataset::{AzureBlobDatasetConfig, DatasetCommonConfig};
use crate::domain::entities::dataset::{AzureBlobTypeProperties, Dataset, DatasetKind};
use crate::domain::entities::dynamic_value::{flatten_optional_dynamic, DynamicValue};
use crate::domain::errors::DataFactoryError;
use crate::domain::schema::Attribute;
use crate::domain::services::field_mapping::FieldMapping;

/// `azurerm_data_factory_dataset_azure_blob`
pub struct AzureBlobDataset;

impl DatasetMapping for AzureBlobDataset {
    type Config = AzureBlobDatasetConfig;

    const TYPE_NAME: &'static str = "azurerm_data_factory_dataset_azure_blob";
    const API_TYPE: &'static str = "AzureBlob";

    fn common(config: &Self::Config) -> &DatasetCommonConfig {
        &config.common
    }

    fn attributes() -> Vec<Attribute> {
        vec![
            Attribute::string("path").optional(),
            Attribute::string("filename").optional(),
            Attribute::bool("dynamic_path_enabled")
                .optional()
                .default_value(false),
            Attribute::bool("dynamic_filename_enabled")
                .optional()
                .default_value(false),
            schema_column_attribute(),
        ]
    }

    fn expand_kind(config: &Self::Config) -> Result<DatasetKind, DataFactoryError> {
        let expand = |value: Option<&String>, dynamic: bool| {
            value
                .filter(|v| !v.is_empty())
                .map(|v| DynamicValue::expand(v, dynamic))
        };

        Ok(DatasetKind::AzureBlob(AzureBlobTypeProperties {
            folder_path: expand(config.path.as_ref(), config.dynamic_path_enabled),
            file_name: expand(config.filename.as_ref(), config.dynamic_filename_enabled),
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
        let mut config = AzureBlobDatasetConfig {
            common,
            schema_column: FieldMapping::flatten_structure_columns(dataset.structure.as_ref()),
            ..Default::default()
        };

        if let DatasetKind::AzureBlob(props) = &dataset.kind {
            if let Some((path, dynamic)) = flatten_optional_dynamic("path", props.folder_path.as_ref()) {
                config.path = Some(path);
                config.dynamic_path_enabled = dynamic;
            }
            if let Some((filename, dynamic)) =
                flatten_optional_dynamic("filename", props.file_name.as_ref())
            {
                config.filename = Some(filename);
                config.dynamic_filename_enabled = dynamic;
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expand_dynamic_path() {
        let config = AzureBlobDatasetConfig {
            path: Some("@concat('raw/', dataset().day)".to_string()),
            filename: Some("data.json".to_string()),
            dynamic_path_enabled: true,
            ..Default::default()
        };

        let kind = AzureBlobDataset::expand_kind(&config).unwrap();
        let DatasetKind::AzureBlob(props) = &kind else {
            panic!("expected an Azure Blob dataset");
        };
        assert_eq!(
            serde_json::to_value(props).unwrap(),
            json!({
                "folderPath": {"value": "@concat('raw/', dataset().day)", "type": "Expression"},
                "fileName": "data.json"
            })
        );

        let dataset = Dataset::new("blob", kind);
        let flattened =
            AzureBlobDataset::flatten_type(&dataset, DatasetCommonConfig::default(), None).unwrap();
        assert_eq!(flattened, config);
    }

    #[test]
    fn test_empty_path_is_not_sent() {
        let config = AzureBlobDatasetConfig {
            path: Some(String::new()),
            ..Default::default()
        };

        let DatasetKind::AzureBlob(props) = AzureBlobDataset::expand_kind(&config).unwrap() else {
            panic!("expected an Azure Blob dataset");
        };
        assert!(props.folder_path.is_none());
        assert!(props.file_name.is_none());
    }
}
