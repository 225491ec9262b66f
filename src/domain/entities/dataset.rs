//! # Dataset Entity
//!
//! Data Factory Dataset の API モデル
//!
//! `properties.type` が多態の判別子となり、`typeProperties` の形が決まる。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::common::{Folder, LinkedServiceReference, ParameterDefinitions};
use super::dynamic_value::DynamicValue;

/// Dataset の `properties`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDataset", into = "RawDataset")]
pub struct Dataset {
    pub linked_service_name: LinkedServiceReference,
    pub description: Option<String>,
    pub parameters: Option<ParameterDefinitions>,
    pub annotations: Option<Vec<Value>>,
    pub folder: Option<Folder>,
    /// `DatasetColumn` のリスト（API 上は `object`）
    pub structure: Option<Value>,
    /// Snowflake などのスキーマ定義（API 上は `object`）
    pub schema: Option<Value>,
    /// 既知のキー以外のプロパティ
    pub additional_properties: Map<String, Value>,
    pub kind: DatasetKind,
}

impl Dataset {
    /// 最小構成の Dataset を作成
    pub fn new(linked_service_name: impl Into<String>, kind: DatasetKind) -> Self {
        Self {
            linked_service_name: LinkedServiceReference::new(linked_service_name),
            description: None,
            parameters: None,
            annotations: None,
            folder: None,
            structure: None,
            schema: None,
            additional_properties: Map::new(),
            kind,
        }
    }
}

/// Dataset 種別ごとの `typeProperties`
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetKind {
    AzureSqlTable(AzureSqlTableTypeProperties),
    CosmosDbSqlApiCollection(CosmosDbSqlApiCollectionTypeProperties),
    AzureBlob(AzureBlobTypeProperties),
    Binary(BinaryTypeProperties),
    DelimitedText(DelimitedTextTypeProperties),
    Parquet(ParquetTypeProperties),
    SnowflakeTable(SnowflakeTypeProperties),
    /// 本クレートが扱わない種別（そのまま保持）
    Other {
        type_name: String,
        type_properties: Option<Value>,
    },
}

impl DatasetKind {
    /// API 上の種別名
    pub fn type_name(&self) -> &str {
        match self {
            DatasetKind::AzureSqlTable(_) => "AzureSqlTable",
            DatasetKind::CosmosDbSqlApiCollection(_) => "CosmosDbSqlApiCollection",
            DatasetKind::AzureBlob(_) => "AzureBlob",
            DatasetKind::Binary(_) => "Binary",
            DatasetKind::DelimitedText(_) => "DelimitedText",
            DatasetKind::Parquet(_) => "Parquet",
            DatasetKind::SnowflakeTable(_) => "SnowflakeTable",
            DatasetKind::Other { type_name, .. } => type_name,
        }
    }

    fn from_raw(type_name: String, type_properties: Option<Value>) -> Result<Self, serde_json::Error> {
        let props = type_properties.clone().unwrap_or_else(|| Value::Object(Map::new()));
        let kind = match type_name.as_str() {
            "AzureSqlTable" => DatasetKind::AzureSqlTable(serde_json::from_value(props)?),
            "CosmosDbSqlApiCollection" => {
                DatasetKind::CosmosDbSqlApiCollection(serde_json::from_value(props)?)
            }
            "AzureBlob" => DatasetKind::AzureBlob(serde_json::from_value(props)?),
            "Binary" => DatasetKind::Binary(serde_json::from_value(props)?),
            "DelimitedText" => DatasetKind::DelimitedText(serde_json::from_value(props)?),
            "Parquet" => DatasetKind::Parquet(serde_json::from_value(props)?),
            "SnowflakeTable" => DatasetKind::SnowflakeTable(serde_json::from_value(props)?),
            _ => DatasetKind::Other {
                type_name,
                type_properties,
            },
        };
        Ok(kind)
    }

    fn to_raw(&self) -> (String, Option<Value>) {
        let props = match self {
            DatasetKind::AzureSqlTable(p) => serde_json::to_value(p),
            DatasetKind::CosmosDbSqlApiCollection(p) => serde_json::to_value(p),
            DatasetKind::AzureBlob(p) => serde_json::to_value(p),
            DatasetKind::Binary(p) => serde_json::to_value(p),
            DatasetKind::DelimitedText(p) => serde_json::to_value(p),
            DatasetKind::Parquet(p) => serde_json::to_value(p),
            DatasetKind::SnowflakeTable(p) => serde_json::to_value(p),
            DatasetKind::Other {
                type_name,
                type_properties,
            } => return (type_name.clone(), type_properties.clone()),
        };
        // 型付き構造体の to_value はマップにしかならない
        (self.type_name().to_string(), props.ok())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureSqlTableTypeProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<DynamicValue>,
    /// 旧形式のテーブル名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<DynamicValue>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CosmosDbSqlApiCollectionTypeProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<DynamicValue>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureBlobTypeProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_path: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<DynamicValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryTypeProperties {
    pub location: DatasetLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<DatasetCompression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelimitedTextTypeProperties {
    pub location: DatasetLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_delimiter: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_delimiter: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding_name: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_char: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escape_char: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_row_as_header: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_value: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_codec: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_level: Option<DynamicValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParquetTypeProperties {
    pub location: DatasetLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_codec: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_level: Option<DynamicValue>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnowflakeTypeProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<DynamicValue>,
}

/// ファイル系 Dataset の格納場所
///
/// 設定側では排他的なブロックとして表現される
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DatasetLocation {
    #[serde(rename = "HttpServerLocation", rename_all = "camelCase")]
    HttpServer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        relative_url: Option<DynamicValue>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        folder_path: Option<DynamicValue>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_name: Option<DynamicValue>,
    },
    #[serde(rename = "AzureBlobStorageLocation", rename_all = "camelCase")]
    AzureBlobStorage {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        container: Option<DynamicValue>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        folder_path: Option<DynamicValue>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_name: Option<DynamicValue>,
    },
    #[serde(rename = "AzureBlobFSLocation", rename_all = "camelCase")]
    AzureBlobFs {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_system: Option<DynamicValue>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        folder_path: Option<DynamicValue>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_name: Option<DynamicValue>,
    },
    #[serde(rename = "SftpLocation", rename_all = "camelCase")]
    Sftp {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        folder_path: Option<DynamicValue>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_name: Option<DynamicValue>,
    },
    /// 上記以外の格納場所
    #[serde(other)]
    Unsupported,
}

/// 圧縮設定（`{"type": "GZip", "level": "Optimal"}`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetCompression {
    #[serde(rename = "type")]
    pub compression_type: DynamicValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<DynamicValue>,
}

/// シリアライズ用の生の表現
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDataset {
    #[serde(rename = "type")]
    dataset_type: String,
    linked_service_name: LinkedServiceReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parameters: Option<ParameterDefinitions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotations: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    folder: Option<Folder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    structure: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    type_properties: Option<Value>,
    #[serde(flatten)]
    additional_properties: Map<String, Value>,
}

impl TryFrom<RawDataset> for Dataset {
    type Error = serde_json::Error;

    fn try_from(raw: RawDataset) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: DatasetKind::from_raw(raw.dataset_type, raw.type_properties)?,
            linked_service_name: raw.linked_service_name,
            description: raw.description,
            parameters: raw.parameters,
            annotations: raw.annotations,
            folder: raw.folder,
            structure: raw.structure,
            schema: raw.schema,
            additional_properties: raw.additional_properties,
        })
    }
}

impl From<Dataset> for RawDataset {
    fn from(dataset: Dataset) -> Self {
        let (dataset_type, type_properties) = dataset.kind.to_raw();
        Self {
            dataset_type,
            linked_service_name: dataset.linked_service_name,
            description: dataset.description,
            parameters: dataset.parameters,
            annotations: dataset.annotations,
            folder: dataset.folder,
            structure: dataset.structure,
            schema: dataset.schema,
            type_properties,
            additional_properties: dataset.additional_properties,
        }
    }
}
