//! # Linked Service Mappings
//!
//! Linked Service 種別ごとのマッピングと、共通フィールドを扱う汎用実装 `LinkedServices<M>`
//!
//! API はパスワードやキーなどの機密値を返さない（またはマスクして返す）ため、
//! flatten ではそれらを直前の設定から読み戻す。

pub mod azure_blob_storage;
pub mod azure_sql_database;
pub mod sftp;
pub mod sql_server;
pub mod web;

use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

use super::{
    additional_properties_attribute, annotations_attribute, data_factory_id_attribute,
    description_attribute, flatten_factory_id, flatten_key_vault_secret, name_attribute, non_empty,
    parameters_attribute, unexpected_type, ResourceMapping,
};
use crate::application::dto::linked_service::{KeyVaultSecretConfig, LinkedServiceCommonConfig};
use crate::domain::entities::common::{IntegrationRuntimeReference, SecretBase};
use crate::domain::entities::linked_service::{LinkedService, LinkedServiceKind, SecretOrLiteral};
use crate::domain::entities::resource_id::{ChildKind, ChildResourceId, FactoryId};
use crate::domain::errors::DataFactoryError;
use crate::domain::schema::{Attribute, Schema, Validation};
use crate::domain::services::diff_suppress::DiffSuppression;
use crate::domain::services::field_mapping::FieldMapping;

/// Linked Service 種別ごとのマッピング
pub trait LinkedServiceMapping: Send + Sync + 'static {
    type Config: Serialize + DeserializeOwned + Clone + Send + Sync;

    const TYPE_NAME: &'static str;
    const API_TYPE: &'static str;

    fn common(config: &Self::Config) -> &LinkedServiceCommonConfig;

    fn attributes() -> Vec<Attribute>;

    fn validate(_config: &Self::Config) -> Result<(), DataFactoryError> {
        Ok(())
    }

    fn expand_kind(config: &Self::Config) -> Result<LinkedServiceKind, DataFactoryError>;

    /// 種別固有の値を平坦化する
    ///
    /// # Arguments
    ///
    /// * `service` - API が返した Linked Service（種別は確認済み）
    /// * `common` - 平坦化済みの共通フィールド
    /// * `prior` - 直前の設定（機密値の読み戻しに使う）
    fn flatten_type(
        service: &LinkedService,
        common: LinkedServiceCommonConfig,
        prior: Option<&Self::Config>,
    ) -> Result<Self::Config, DataFactoryError>;
}

/// `LinkedServiceMapping` を `ResourceMapping` として扱うアダプター
pub struct LinkedServices<M>(PhantomData<fn() -> M>);

impl<M> LinkedServices<M> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<M> Default for LinkedServices<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// すべての Linked Service に共通する属性
pub fn common_attributes() -> Vec<Attribute> {
    vec![
        name_attribute(),
        data_factory_id_attribute(),
        description_attribute(),
        Attribute::string("integration_runtime_name")
            .optional()
            .validate(Validation::NotEmpty),
        annotations_attribute(),
        parameters_attribute(),
        additional_properties_attribute(),
    ]
}

impl<M: LinkedServiceMapping> ResourceMapping for LinkedServices<M> {
    type Config = M::Config;
    type Model = LinkedService;

    fn type_name(&self) -> &'static str {
        M::TYPE_NAME
    }

    fn kind(&self) -> ChildKind {
        ChildKind::LinkedService
    }

    fn schema(&self) -> Schema {
        Schema::new(common_attributes()).with(M::attributes())
    }

    fn validate(&self, config: &Self::Config, _factory: &FactoryId) -> Result<(), DataFactoryError> {
        M::validate(config)
    }

    fn expand(&self, config: &Self::Config, _factory: &FactoryId) -> Result<LinkedService, DataFactoryError> {
        let common = M::common(config);

        let mut service = LinkedService::new(M::expand_kind(config)?);
        service.description = non_empty(common.description.as_ref()).map(str::to_string);
        service.connect_via =
            non_empty(common.integration_runtime_name.as_ref()).map(IntegrationRuntimeReference::new);
        service.parameters = FieldMapping::expand_parameters(&common.parameters);
        service.annotations = FieldMapping::expand_annotations(&common.annotations);
        service.additional_properties =
            FieldMapping::expand_additional_properties(&common.additional_properties);

        Ok(service)
    }

    fn flatten(
        &self,
        id: &ChildResourceId,
        service: &LinkedService,
        prior: Option<&Self::Config>,
    ) -> Result<Self::Config, DataFactoryError> {
        let actual = service.kind.type_name();
        if actual != M::API_TYPE {
            return Err(unexpected_type(M::API_TYPE, actual));
        }

        let common = LinkedServiceCommonConfig {
            name: id.name.clone(),
            data_factory_id: flatten_factory_id(
                &id.factory,
                prior.map(|p| M::common(p).data_factory_id.as_str()),
            ),
            description: service.description.clone(),
            integration_runtime_name: service
                .connect_via
                .as_ref()
                .map(|runtime| runtime.reference_name.clone()),
            annotations: FieldMapping::flatten_annotations(service.annotations.as_ref()),
            parameters: FieldMapping::flatten_parameters(service.parameters.as_ref()),
            additional_properties: FieldMapping::flatten_additional_properties(
                &service.additional_properties,
            ),
        };

        M::flatten_type(service, common, prior)
    }
}

/// 接続文字列の属性（Key Vault 参照とのいずれか一方）
pub(crate) fn connection_string_attributes(diff_suppress: bool) -> Vec<Attribute> {
    let mut connection_string = Attribute::string("connection_string")
        .optional()
        .validate(Validation::NotEmpty)
        .exactly_one_of(&["connection_string", "key_vault_connection_string"]);
    if diff_suppress {
        connection_string = connection_string
            .diff_suppress(DiffSuppression::connection_string);
    }

    vec![
        connection_string,
        Attribute::block("key_vault_connection_string", super::key_vault_secret_schema())
            .optional()
            .exactly_one_of(&["connection_string", "key_vault_connection_string"]),
    ]
}

/// 接続文字列を平文または Key Vault 参照として組み立てる
pub(crate) fn expand_connection_string(
    connection_string: Option<&String>,
    key_vault: Option<&KeyVaultSecretConfig>,
) -> Option<SecretOrLiteral> {
    if let Some(value) = non_empty(connection_string) {
        return Some(SecretOrLiteral::literal(value));
    }
    key_vault.map(|kv| SecretOrLiteral::Secret(super::expand_key_vault_secret(kv)))
}

/// 接続文字列を平坦化する
///
/// # Returns
///
/// `(接続文字列, Key Vault 参照)`。API が値を返さない、またはマスクして返す場合は
/// 直前の設定の接続文字列を使う
pub(crate) fn flatten_connection_string(
    field: &str,
    value: Option<&SecretOrLiteral>,
    prior: Option<&String>,
) -> (Option<String>, Option<KeyVaultSecretConfig>) {
    match value {
        Some(SecretOrLiteral::Literal(literal)) => match literal.flatten_string(field) {
            Some(text) => (Some(text), None),
            None => (prior.cloned(), None),
        },
        Some(SecretOrLiteral::Secret(secret @ SecretBase::AzureKeyVaultSecret { .. })) => {
            (None, flatten_key_vault_secret(Some(secret)))
        }
        Some(SecretOrLiteral::Secret(SecretBase::SecureString { .. })) | None => (prior.cloned(), None),
    }
}

/// 平文のシークレットを `SecureString` として組み立てる
pub(crate) fn expand_secure_string(value: Option<&String>) -> Option<SecretBase> {
    non_empty(value).map(SecretBase::secure_string)
}

/// Key Vault 参照以外のシークレットは API から読み戻せないため無視する
pub(crate) fn flatten_key_vault_only(field: &str, secret: Option<&SecretBase>) -> Option<KeyVaultSecretConfig> {
    match secret {
        Some(SecretBase::SecureString { .. }) => {
            warn!("Skipping {:?} since it's not a Key Vault reference", field);
            None
        }
        other => flatten_key_vault_secret(other),
    }
}
