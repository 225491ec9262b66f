//! # Common API Types
//!
//! Dataset / Linked Service / Credential / Pipeline で共有される API 型

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// パラメータ・変数の型
///
/// API は定義済み定数と異なる大文字小文字で値を返すことがあるため、
/// パースは大文字小文字を区別しない。未知の値はそのまま保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterType {
    String,
    Int,
    Float,
    Bool,
    Array,
    Object,
    SecureString,
    Other(String),
}

impl ParameterType {
    const KNOWN: [(&'static str, ParameterType); 7] = [
        ("String", ParameterType::String),
        ("Int", ParameterType::Int),
        ("Float", ParameterType::Float),
        ("Bool", ParameterType::Bool),
        ("Array", ParameterType::Array),
        ("Object", ParameterType::Object),
        ("SecureString", ParameterType::SecureString),
    ];

    pub fn parse(input: &str) -> Self {
        Self::KNOWN
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(input))
            .map(|(_, t)| t.clone())
            .unwrap_or_else(|| ParameterType::Other(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            ParameterType::Other(s) => s,
            known => Self::KNOWN
                .iter()
                .find(|(_, t)| t == known)
                .map(|(name, _)| *name)
                .unwrap_or_default(),
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ParameterType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ParameterType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(|s| ParameterType::parse(&s))
    }
}

/// パラメータ定義（`{"type": "String", "defaultValue": ...}`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSpecification {
    #[serde(rename = "type")]
    pub parameter_type: ParameterType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

impl ParameterSpecification {
    /// 文字列型パラメータを作成
    pub fn string(default_value: impl Into<String>) -> Self {
        Self {
            parameter_type: ParameterType::String,
            default_value: Some(Value::String(default_value.into())),
        }
    }
}

/// パラメータ定義のマップ
pub type ParameterDefinitions = BTreeMap<String, ParameterSpecification>;

/// Linked Service への参照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedServiceReference {
    pub reference_name: String,
    #[serde(rename = "type", default = "linked_service_reference_type")]
    pub reference_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
}

fn linked_service_reference_type() -> String {
    "LinkedServiceReference".to_string()
}

impl LinkedServiceReference {
    pub fn new(reference_name: impl Into<String>) -> Self {
        Self {
            reference_name: reference_name.into(),
            reference_type: linked_service_reference_type(),
            parameters: None,
        }
    }
}

/// Integration Runtime への参照（`connectVia`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationRuntimeReference {
    pub reference_name: String,
    #[serde(rename = "type", default = "integration_runtime_reference_type")]
    pub reference_type: String,
}

fn integration_runtime_reference_type() -> String {
    "IntegrationRuntimeReference".to_string()
}

impl IntegrationRuntimeReference {
    pub fn new(reference_name: impl Into<String>) -> Self {
        Self {
            reference_name: reference_name.into(),
            reference_type: integration_runtime_reference_type(),
        }
    }
}

/// フォルダ（`{"name": "..."}`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub name: String,
}

/// シークレット値
///
/// `SecureString` は API から読み戻すとマスクされる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SecretBase {
    SecureString {
        value: String,
    },
    #[serde(rename_all = "camelCase")]
    AzureKeyVaultSecret {
        store: LinkedServiceReference,
        secret_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        secret_version: Option<String>,
    },
}

impl SecretBase {
    pub fn secure_string(value: impl Into<String>) -> Self {
        SecretBase::SecureString {
            value: value.into(),
        }
    }

    pub fn key_vault(
        linked_service_name: impl Into<String>,
        secret_name: impl Into<String>,
        secret_version: Option<String>,
    ) -> Self {
        SecretBase::AzureKeyVaultSecret {
            store: LinkedServiceReference::new(linked_service_name),
            secret_name: secret_name.into(),
            secret_version,
        }
    }
}

/// Dataset のカラム定義（`structure` 要素）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetColumn {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Snowflake Dataset のカラム定義（`schema` 要素）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSnowflakeSchemaColumn {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<i64>,
}
