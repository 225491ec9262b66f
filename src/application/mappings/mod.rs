//! # Resource Mappings
//!
//! 平坦な設定（DTO）と API モデルの相互変換
//!
//! ## 構成要素
//!
//! - **ResourceMapping**: リソース種別ごとのスキーマ・expand・flatten
//! - **dataset**: `DatasetMapping` と Dataset 種別ごとの実装
//! - **linked_service**: `LinkedServiceMapping` と Linked Service 種別ごとの実装
//! - **credential**: Credential 種別ごとの実装
//! - **pipeline**: Pipeline の実装

pub mod credential;
pub mod dataset;
pub mod linked_service;
pub mod pipeline;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::application::dto::linked_service::KeyVaultSecretConfig;
use crate::application::dto::timeouts::Timeouts;
use crate::domain::entities::common::SecretBase;
use crate::domain::entities::resource_id::{ChildKind, ChildResourceId, FactoryId};
use crate::domain::errors::DataFactoryError;
use crate::domain::schema::{Attribute, Schema, Validation};
use crate::domain::services::diff_suppress::DiffSuppression;

/// リソース種別ごとのマッピング
///
/// `Config` はマニフェストと状態ファイルに現れる平坦な表現、
/// `Model` は API に送受信する `properties` の型
pub trait ResourceMapping: Send + Sync + 'static {
    type Config: Serialize + DeserializeOwned + Clone + Send + Sync;
    type Model: Clone + Send + Sync + 'static;

    /// リソース種別名（`azurerm_data_factory_dataset_binary` など）
    fn type_name(&self) -> &'static str;

    fn kind(&self) -> ChildKind;

    fn schema(&self) -> Schema;

    fn timeouts(&self) -> Timeouts {
        Timeouts::default()
    }

    /// スキーマでは表現できない検証（API 呼び出し前に実行される）
    fn validate(&self, _config: &Self::Config, _factory: &FactoryId) -> Result<(), DataFactoryError> {
        Ok(())
    }

    /// 設定を API モデルに変換する
    fn expand(&self, config: &Self::Config, factory: &FactoryId) -> Result<Self::Model, DataFactoryError>;

    /// API モデルを設定に変換する
    ///
    /// # Arguments
    ///
    /// * `id` - 読み込んだリソースのID（`name` と `data_factory_id` はここから設定する）
    /// * `model` - API が返した `properties`
    /// * `prior` - 直前の設定（API が返さない機密値の読み戻しに使う）
    fn flatten(
        &self,
        id: &ChildResourceId,
        model: &Self::Model,
        prior: Option<&Self::Config>,
    ) -> Result<Self::Config, DataFactoryError>;
}

/// 想定外の種別が返された場合のエラー
pub(crate) fn unexpected_type(expected: &str, actual: &str) -> DataFactoryError {
    DataFactoryError::UnexpectedType {
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}

/// 空でない文字列のみを返す
pub(crate) fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

pub(crate) fn non_empty_string(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

/// 直前の設定が同じファクトリーを指していれば、その表記を保つ
pub(crate) fn flatten_factory_id(factory: &FactoryId, prior: Option<&str>) -> String {
    prior
        .filter(|p| FactoryId::parse(p).is_ok_and(|parsed| parsed.same_factory(factory)))
        .map(str::to_string)
        .unwrap_or_else(|| factory.to_string())
}

pub(crate) fn expand_key_vault_secret(config: &KeyVaultSecretConfig) -> SecretBase {
    SecretBase::key_vault(&config.linked_service_name, &config.secret_name, None)
}

pub(crate) fn flatten_key_vault_secret(secret: Option<&SecretBase>) -> Option<KeyVaultSecretConfig> {
    match secret? {
        SecretBase::AzureKeyVaultSecret {
            store, secret_name, ..
        } => Some(KeyVaultSecretConfig {
            linked_service_name: store.reference_name.clone(),
            secret_name: secret_name.clone(),
        }),
        SecretBase::SecureString { .. } => None,
    }
}

pub(crate) fn key_vault_secret_schema() -> Schema {
    Schema::new(vec![
        Attribute::string("linked_service_name")
            .required()
            .validate(Validation::NotEmpty),
        Attribute::string("secret_name")
            .required()
            .validate(Validation::NotEmpty),
    ])
}

pub(crate) fn name_attribute() -> Attribute {
    Attribute::string("name")
        .required()
        .force_new()
        .validate(Validation::ResourceName)
        .describe("Specifies the name of the resource. Changing this forces a new resource to be created.")
}

pub(crate) fn data_factory_id_attribute() -> Attribute {
    Attribute::string("data_factory_id")
        .required()
        .force_new()
        .validate(Validation::FactoryId)
        .diff_suppress(DiffSuppression::case_insensitive)
        .describe("The Data Factory ID in which to associate the resource.")
}

pub(crate) fn description_attribute() -> Attribute {
    Attribute::string("description").optional()
}

pub(crate) fn annotations_attribute() -> Attribute {
    Attribute::string_list("annotations").optional()
}

pub(crate) fn parameters_attribute() -> Attribute {
    Attribute::string_map("parameters").optional()
}

pub(crate) fn additional_properties_attribute() -> Attribute {
    Attribute::string_map("additional_properties").optional()
}
