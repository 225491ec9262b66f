//! # Field Mapping Service
//!
//! リソース種別をまたいで共通のフィールドの expand（設定 → API）と
//! flatten（API → 設定）
//!
//! flatten は「スキップしてログを出す」方針: 想定外の型の値は操作全体を失敗させず、
//! その要素だけを省略する。

use log::{debug, warn};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::domain::entities::common::{
    DatasetColumn, DatasetSnowflakeSchemaColumn, Folder, ParameterDefinitions, ParameterSpecification,
    ParameterType,
};
use crate::domain::entities::pipeline::{VariableDefinitions, VariableSpecification};
use crate::domain::entities::resource_id::{ChildKind, ChildResourceId, FactoryId};
use crate::domain::errors::DataFactoryError;

/// 共通フィールドのマッピングサービス
pub struct FieldMapping;

impl FieldMapping {
    /// パラメータを展開する（すべて `String` 型）
    pub fn expand_parameters(input: &BTreeMap<String, String>) -> Option<ParameterDefinitions> {
        if input.is_empty() {
            return None;
        }

        Some(
            input
                .iter()
                .map(|(name, value)| (name.clone(), ParameterSpecification::string(value.clone())))
                .collect(),
        )
    }

    /// パラメータを平坦化する
    ///
    /// 文字列のデフォルト値を持つパラメータのみ扱い、それ以外はログを出してスキップする
    pub fn flatten_parameters(input: Option<&ParameterDefinitions>) -> BTreeMap<String, String> {
        let mut output = BTreeMap::new();
        for (name, spec) in input.into_iter().flatten() {
            match (&spec.parameter_type, &spec.default_value) {
                (ParameterType::String, Some(Value::String(value))) => {
                    output.insert(name.clone(), value.clone());
                }
                (ParameterType::String, None) => {
                    output.insert(name.clone(), String::new());
                }
                _ => debug!("Skipping parameter {:?} since it's not a string", name),
            }
        }
        output
    }

    /// 変数を展開する（すべて `String` 型）
    pub fn expand_variables(input: &BTreeMap<String, String>) -> Option<VariableDefinitions> {
        if input.is_empty() {
            return None;
        }

        Some(
            input
                .iter()
                .map(|(name, value)| (name.clone(), VariableSpecification::string(value.clone())))
                .collect(),
        )
    }

    /// 変数を平坦化する
    pub fn flatten_variables(input: Option<&VariableDefinitions>) -> BTreeMap<String, String> {
        let mut output = BTreeMap::new();
        for (name, spec) in input.into_iter().flatten() {
            if !spec.variable_type.eq_ignore_ascii_case("String") {
                debug!("Skipping variable {:?} since it's not a string", name);
                continue;
            }
            match &spec.default_value {
                Some(Value::String(value)) => {
                    output.insert(name.clone(), value.clone());
                }
                None => {
                    output.insert(name.clone(), String::new());
                }
                Some(_) => debug!("Skipping variable {:?} since its default isn't a string", name),
            }
        }
        output
    }

    /// アノテーションを展開する
    pub fn expand_annotations(input: &[String]) -> Option<Vec<Value>> {
        if input.is_empty() {
            return None;
        }
        Some(input.iter().cloned().map(Value::String).collect())
    }

    /// アノテーションを平坦化する
    ///
    /// # Returns
    ///
    /// 文字列のアノテーションのリスト。入力がない場合は空リスト
    pub fn flatten_annotations(input: Option<&Vec<Value>>) -> Vec<String> {
        input
            .into_iter()
            .flatten()
            .filter_map(|annotation| match annotation {
                Value::String(s) => Some(s.clone()),
                other => {
                    debug!("Skipping annotation {} since it's not a string", other);
                    None
                }
            })
            .collect()
    }

    /// 追加プロパティを展開する
    pub fn expand_additional_properties(input: &BTreeMap<String, String>) -> Map<String, Value> {
        input
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect()
    }

    /// 追加プロパティを平坦化する
    ///
    /// 文字列以外の値は JSON テキストとして保持する
    pub fn flatten_additional_properties(input: &Map<String, Value>) -> BTreeMap<String, String> {
        input
            .iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), text)
            })
            .collect()
    }

    pub fn expand_folder(input: Option<&str>) -> Option<Folder> {
        input.filter(|name| !name.is_empty()).map(|name| Folder {
            name: name.to_string(),
        })
    }

    pub fn flatten_folder(input: Option<&Folder>) -> String {
        input.map(|folder| folder.name.clone()).unwrap_or_default()
    }

    /// `schema_column` を `structure` に展開する
    pub fn expand_structure_columns(input: &[DatasetColumn]) -> Option<Value> {
        if input.is_empty() {
            return None;
        }
        serde_json::to_value(input).ok()
    }

    /// `structure` を `schema_column` に平坦化する
    ///
    /// 形の合わない要素はログを出してスキップする
    pub fn flatten_structure_columns(input: Option<&Value>) -> Vec<DatasetColumn> {
        flatten_columns("structure", input)
    }

    /// Snowflake の `schema_column` を `schema` に展開する
    pub fn expand_snowflake_columns(input: &[DatasetSnowflakeSchemaColumn]) -> Option<Value> {
        if input.is_empty() {
            return None;
        }
        serde_json::to_value(input).ok()
    }

    pub fn flatten_snowflake_columns(input: Option<&Value>) -> Vec<DatasetSnowflakeSchemaColumn> {
        flatten_columns("schema", input)
    }

    /// `linked_service_name` を名前に解決する
    ///
    /// 名前そのもの、または Linked Service の完全なIDを受け付ける。
    /// IDの場合は、そのファクトリーがリソースの親ファクトリーと一致している必要がある。
    ///
    /// # Arguments
    ///
    /// * `input` - 設定された値
    /// * `factory` - リソースの親 Data Factory
    ///
    /// # Errors
    ///
    /// IDが不正、または別の Data Factory に属している場合
    pub fn resolve_linked_service_name(
        input: &str,
        factory: &FactoryId,
    ) -> Result<String, DataFactoryError> {
        if !input.starts_with('/') {
            return Ok(input.to_string());
        }

        let linked_service = ChildResourceId::parse(input, ChildKind::LinkedService)?;
        if !linked_service.factory.same_factory(factory) {
            return Err(DataFactoryError::Validation(vec![format!(
                "linked service {:?} belongs to Data Factory {:?}, which is different from the resource's Data Factory {:?}",
                linked_service.name, linked_service.factory.to_string(), factory.to_string()
            )]));
        }

        Ok(linked_service.name)
    }
}

fn flatten_columns<T: serde::de::DeserializeOwned>(field: &str, input: Option<&Value>) -> Vec<T> {
    let items = match input {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => {
            warn!("Skipping {:?} since it's not a list (got {})", field, other);
            return Vec::new();
        }
    };

    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<T>(item.clone()) {
            Ok(column) => Some(column),
            Err(e) => {
                warn!("Skipping {} column {} : {}", field, item, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parameters_round_trip() {
        let input = strings(&[("env", "dev"), ("region", "westeurope")]);
        let expanded = FieldMapping::expand_parameters(&input);
        assert_eq!(FieldMapping::flatten_parameters(expanded.as_ref()), input);
        assert!(FieldMapping::expand_parameters(&BTreeMap::new()).is_none());
    }

    #[test]
    fn test_flatten_parameters_skips_non_strings() {
        let mut definitions = ParameterDefinitions::new();
        definitions.insert("name".to_string(), ParameterSpecification::string("x"));
        definitions.insert(
            "count".to_string(),
            ParameterSpecification {
                parameter_type: ParameterType::Int,
                default_value: Some(json!(3)),
            },
        );
        definitions.insert(
            "odd".to_string(),
            ParameterSpecification {
                parameter_type: ParameterType::String,
                default_value: Some(json!(["a"])),
            },
        );

        let output = FieldMapping::flatten_parameters(Some(&definitions));
        assert_eq!(output, strings(&[("name", "x")]));
    }

    #[test]
    fn test_variables_round_trip() {
        let input = strings(&[("bob", "item1")]);
        let expanded = FieldMapping::expand_variables(&input);
        assert_eq!(FieldMapping::flatten_variables(expanded.as_ref()), input);
    }

    #[test]
    fn test_flatten_variables_skips_non_strings() {
        let mut definitions = VariableDefinitions::new();
        definitions.insert(
            "flag".to_string(),
            VariableSpecification {
                variable_type: "Bool".to_string(),
                default_value: Some(json!(true)),
            },
        );
        definitions.insert("name".to_string(), VariableSpecification::string("x"));

        assert_eq!(
            FieldMapping::flatten_variables(Some(&definitions)),
            strings(&[("name", "x")])
        );
    }

    #[test]
    fn test_annotations() {
        let input = vec!["test1".to_string(), "test2".to_string()];
        let expanded = FieldMapping::expand_annotations(&input);
        assert_eq!(FieldMapping::flatten_annotations(expanded.as_ref()), input);

        assert_eq!(FieldMapping::flatten_annotations(None), Vec::<String>::new());
        assert_eq!(
            FieldMapping::flatten_annotations(Some(&vec![json!("a"), json!(1), json!("b")])),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_additional_properties() {
        let input = strings(&[("foo", "test1"), ("bar", "test2")]);
        let expanded = FieldMapping::expand_additional_properties(&input);
        assert_eq!(FieldMapping::flatten_additional_properties(&expanded), input);

        let mut raw = Map::new();
        raw.insert("retries".to_string(), json!(3));
        assert_eq!(
            FieldMapping::flatten_additional_properties(&raw),
            strings(&[("retries", "3")])
        );
    }

    #[test]
    fn test_folder() {
        assert_eq!(FieldMapping::expand_folder(Some("")), None);
        let folder = FieldMapping::expand_folder(Some("raw/ingest"));
        assert_eq!(FieldMapping::flatten_folder(folder.as_ref()), "raw/ingest");
        assert_eq!(FieldMapping::flatten_folder(None), "");
    }

    #[test]
    fn test_structure_columns() {
        let columns = vec![DatasetColumn {
            name: "id".to_string(),
            column_type: Some("Int32".to_string()),
            description: Some("primary key".to_string()),
        }];

        let expanded = FieldMapping::expand_structure_columns(&columns);
        assert_eq!(FieldMapping::flatten_structure_columns(expanded.as_ref()), columns);
        assert!(FieldMapping::flatten_structure_columns(None).is_empty());
    }

    #[test]
    fn test_structure_columns_skip_malformed() {
        let input = json!([{"name": "id", "type": "Int32"}, {"type": "String"}, "oops"]);
        let columns = FieldMapping::flatten_structure_columns(Some(&input));
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].name, "id");

        assert!(FieldMapping::flatten_structure_columns(Some(&json!("text"))).is_empty());
    }

    #[test]
    fn test_snowflake_columns() {
        let input = json!([{"name": "amount", "type": "NUMBER", "precision": 10, "scale": 2}]);
        let columns = FieldMapping::flatten_snowflake_columns(Some(&input));
        assert_eq!(columns[0].precision, Some(10));
        assert_eq!(FieldMapping::expand_snowflake_columns(&columns), Some(input));
    }

    #[test]
    fn test_resolve_linked_service_name() {
        let factory = FactoryId::new("sub", "rg1", "factory1");

        assert_eq!(
            FieldMapping::resolve_linked_service_name("sql", &factory).unwrap(),
            "sql"
        );

        let same = factory.child(ChildKind::LinkedService, "sql").to_string();
        assert_eq!(
            FieldMapping::resolve_linked_service_name(&same, &factory).unwrap(),
            "sql"
        );
    }

    #[test]
    fn test_resolve_linked_service_other_factory() {
        let factory = FactoryId::new("sub", "rg1", "factory1");
        let other = FactoryId::new("sub", "rg1", "factory2")
            .child(ChildKind::LinkedService, "sql")
            .to_string();

        let result = FieldMapping::resolve_linked_service_name(&other, &factory);
        assert!(matches!(result, Err(DataFactoryError::Validation(_))));
    }

    #[test]
    fn test_resolve_linked_service_malformed_id() {
        let factory = FactoryId::new("sub", "rg1", "factory1");
        let result = FieldMapping::resolve_linked_service_name("/subscriptions/sub", &factory);
        assert!(matches!(result, Err(DataFactoryError::InvalidId { .. })));
    }
}
