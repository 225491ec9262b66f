//! # Dataset Mappings
//!
//! Dataset 種別ごとのマッピングと、共通フィールドを扱う汎用実装 `Datasets<M>`
//!
//! 種別固有の部分（`typeProperties` とスキーマ）だけを `DatasetMapping` として実装し、
//! 共通フィールドの expand/flatten とリンクの検証は `Datasets<M>` が受け持つ。

pub mod azure_blob;
pub mod azure_sql_table;
pub mod binary;
pub mod cosmosdb_sqlapi;
pub mod delimited_text;
pub mod location;
pub mod parquet;
pub mod snowflake;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

use super::{
    additional_properties_attribute, annotations_attribute, data_factory_id_attribute,
    description_attribute, flatten_factory_id, name_attribute, non_empty, non_empty_string,
    parameters_attribute, unexpected_type, ResourceMapping,
};
use crate::application::dto::dataset::DatasetCommonConfig;
use crate::domain::entities::common::DatasetColumn;
use crate::domain::entities::dataset::{Dataset, DatasetKind};
use crate::domain::entities::resource_id::{ChildKind, ChildResourceId, FactoryId};
use crate::domain::errors::DataFactoryError;
use crate::domain::schema::{Attribute, Schema, Validation};
use crate::domain::services::field_mapping::FieldMapping;

/// Dataset 種別ごとのマッピング
pub trait DatasetMapping: Send + Sync + 'static {
    type Config: Serialize + DeserializeOwned + Clone + Send + Sync;

    /// リソース種別名
    const TYPE_NAME: &'static str;
    /// API 上の `type`
    const API_TYPE: &'static str;

    fn common(config: &Self::Config) -> &DatasetCommonConfig;

    /// 種別固有の属性
    fn attributes() -> Vec<Attribute>;

    /// 種別固有の検証
    fn validate(_config: &Self::Config) -> Result<(), DataFactoryError> {
        Ok(())
    }

    /// `typeProperties` を組み立てる
    fn expand_kind(config: &Self::Config) -> Result<DatasetKind, DataFactoryError>;

    /// `structure` / `schema` を設定する
    fn expand_columns(_config: &Self::Config, _dataset: &mut Dataset) {}

    /// 種別固有の値を平坦化する
    ///
    /// # Arguments
    ///
    /// * `dataset` - API が返した Dataset（種別は確認済み）
    /// * `common` - 平坦化済みの共通フィールド
    /// * `prior` - 直前の設定
    fn flatten_type(
        dataset: &Dataset,
        common: DatasetCommonConfig,
        prior: Option<&Self::Config>,
    ) -> Result<Self::Config, DataFactoryError>;
}

/// `DatasetMapping` を `ResourceMapping` として扱うアダプター
pub struct Datasets<M>(PhantomData<fn() -> M>);

impl<M> Datasets<M> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<M> Default for Datasets<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// すべての Dataset に共通する属性
pub fn common_attributes() -> Vec<Attribute> {
    vec![
        name_attribute(),
        data_factory_id_attribute(),
        Attribute::string("linked_service_name")
            .required()
            .validate(Validation::NotEmpty)
            .describe("The name or ID of the Linked Service with which to associate the Dataset."),
        Attribute::string("folder").optional(),
        description_attribute(),
        parameters_attribute(),
        annotations_attribute(),
        additional_properties_attribute(),
    ]
}

/// `schema_column` ブロック（`structure`）の属性
pub fn schema_column_attribute() -> Attribute {
    Attribute::block_list(
        "schema_column",
        Schema::new(vec![
            Attribute::string("name")
                .required()
                .validate(Validation::NotEmpty),
            Attribute::string("type").optional().validate(Validation::one_of(&[
                "Byte",
                "Byte[]",
                "Boolean",
                "Date",
                "DateTime",
                "DateTimeOffset",
                "Decimal",
                "Double",
                "Guid",
                "Int16",
                "Int32",
                "Int64",
                "Single",
                "String",
                "TimeSpan",
            ])),
            Attribute::string("description").optional(),
        ]),
    )
    .optional()
}

pub(crate) fn expand_structure(columns: &[DatasetColumn], dataset: &mut Dataset) {
    dataset.structure = FieldMapping::expand_structure_columns(columns);
}

impl<M: DatasetMapping> ResourceMapping for Datasets<M> {
    type Config = M::Config;
    type Model = Dataset;

    fn type_name(&self) -> &'static str {
        M::TYPE_NAME
    }

    fn kind(&self) -> ChildKind {
        ChildKind::Dataset
    }

    fn schema(&self) -> Schema {
        Schema::new(common_attributes()).with(M::attributes())
    }

    fn validate(&self, config: &Self::Config, factory: &FactoryId) -> Result<(), DataFactoryError> {
        FieldMapping::resolve_linked_service_name(&M::common(config).linked_service_name, factory)?;
        M::validate(config)
    }

    fn expand(&self, config: &Self::Config, factory: &FactoryId) -> Result<Dataset, DataFactoryError> {
        let common = M::common(config);
        let linked_service_name =
            FieldMapping::resolve_linked_service_name(&common.linked_service_name, factory)?;

        let mut dataset = Dataset::new(linked_service_name, M::expand_kind(config)?);
        dataset.description = non_empty(common.description.as_ref()).map(str::to_string);
        dataset.parameters = FieldMapping::expand_parameters(&common.parameters);
        dataset.annotations = FieldMapping::expand_annotations(&common.annotations);
        dataset.folder = FieldMapping::expand_folder(common.folder.as_deref());
        dataset.additional_properties =
            FieldMapping::expand_additional_properties(&common.additional_properties);
        M::expand_columns(config, &mut dataset);

        Ok(dataset)
    }

    fn flatten(
        &self,
        id: &ChildResourceId,
        dataset: &Dataset,
        prior: Option<&Self::Config>,
    ) -> Result<Self::Config, DataFactoryError> {
        let actual = dataset.kind.type_name();
        if actual != M::API_TYPE {
            return Err(unexpected_type(M::API_TYPE, actual));
        }

        let prior_common = prior.map(M::common);
        let common = DatasetCommonConfig {
            name: id.name.clone(),
            data_factory_id: flatten_factory_id(
                &id.factory,
                prior_common.map(|p| p.data_factory_id.as_str()),
            ),
            linked_service_name: flatten_linked_service_name(
                &dataset.linked_service_name.reference_name,
                &id.factory,
                prior_common,
            ),
            folder: non_empty_string(FieldMapping::flatten_folder(dataset.folder.as_ref())),
            description: dataset.description.clone(),
            parameters: FieldMapping::flatten_parameters(dataset.parameters.as_ref()),
            annotations: FieldMapping::flatten_annotations(dataset.annotations.as_ref()),
            additional_properties: FieldMapping::flatten_additional_properties(
                &dataset.additional_properties,
            ),
        };

        M::flatten_type(dataset, common, prior)
    }
}

/// 直前の設定がIDで同じ Linked Service を指していれば、IDの形を保つ
fn flatten_linked_service_name(
    reference_name: &str,
    factory: &FactoryId,
    prior: Option<&DatasetCommonConfig>,
) -> String {
    prior
        .map(|p| p.linked_service_name.as_str())
        .filter(|p| {
            FieldMapping::resolve_linked_service_name(p, factory)
                .is_ok_and(|name| name == reference_name)
        })
        .map(str::to_string)
        .unwrap_or_else(|| reference_name.to_string())
}
