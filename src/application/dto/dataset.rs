//! # Dataset Configuration DTO
//!
//! Dataset リソースの平坦な設定表現

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::entities::common::{DatasetColumn, DatasetSnowflakeSchemaColumn};

/// すべての Dataset に共通する設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetCommonConfig {
    pub name: String,
    pub data_factory_id: String,
    /// Linked Service の名前、または完全なID
    pub linked_service_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: Vec<String>,
    #[serde(default)]
    pub additional_properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpServerLocationConfig {
    pub relative_url: String,
    #[serde(default)]
    pub path: String,
    pub filename: String,
    #[serde(default)]
    pub dynamic_path_enabled: bool,
    #[serde(default)]
    pub dynamic_filename_enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AzureBlobStorageLocationConfig {
    pub container: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default)]
    pub dynamic_container_enabled: bool,
    #[serde(default)]
    pub dynamic_path_enabled: bool,
    #[serde(default)]
    pub dynamic_filename_enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AzureBlobFsLocationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default)]
    pub dynamic_file_system_enabled: bool,
    #[serde(default)]
    pub dynamic_path_enabled: bool,
    #[serde(default)]
    pub dynamic_filename_enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SftpServerLocationConfig {
    pub path: String,
    pub filename: String,
    #[serde(default)]
    pub dynamic_path_enabled: bool,
    #[serde(default)]
    pub dynamic_filename_enabled: bool,
}

/// 格納場所ブロック（いずれか1つだけが設定される）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationBlocks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_server_location: Option<HttpServerLocationConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_blob_storage_location: Option<AzureBlobStorageLocationConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_blob_fs_location: Option<AzureBlobFsLocationConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sftp_server_location: Option<SftpServerLocationConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AzureSqlTableDatasetConfig {
    #[serde(flatten)]
    pub common: DatasetCommonConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default)]
    pub schema_column: Vec<DatasetColumn>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CosmosDbSqlApiDatasetConfig {
    #[serde(flatten)]
    pub common: DatasetCommonConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
    #[serde(default)]
    pub schema_column: Vec<DatasetColumn>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AzureBlobDatasetConfig {
    #[serde(flatten)]
    pub common: DatasetCommonConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default)]
    pub dynamic_path_enabled: bool,
    #[serde(default)]
    pub dynamic_filename_enabled: bool,
    #[serde(default)]
    pub schema_column: Vec<DatasetColumn>,
}

/// Binary の圧縮設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BinaryCompressionConfig {
    #[serde(rename = "type")]
    pub compression_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BinaryDatasetConfig {
    #[serde(flatten)]
    pub common: DatasetCommonConfig,
    #[serde(flatten)]
    pub location: LocationBlocks,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<BinaryCompressionConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DelimitedTextDatasetConfig {
    #[serde(flatten)]
    pub common: DatasetCommonConfig,
    #[serde(flatten)]
    pub location: LocationBlocks,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_delimiter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_delimiter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_character: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escape_character: Option<String>,
    #[serde(default)]
    pub first_row_as_header: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_codec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_level: Option<String>,
    #[serde(default)]
    pub schema_column: Vec<DatasetColumn>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParquetDatasetConfig {
    #[serde(flatten)]
    pub common: DatasetCommonConfig,
    #[serde(flatten)]
    pub location: LocationBlocks,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_codec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_level: Option<String>,
    #[serde(default)]
    pub schema_column: Vec<DatasetColumn>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnowflakeDatasetConfig {
    #[serde(flatten)]
    pub common: DatasetCommonConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(default)]
    pub schema_column: Vec<DatasetSnowflakeSchemaColumn>,
}
