//! # Resource Schema
//!
//! リソースの設定スキーマの宣言と検証
//!
//! ## 構成要素
//!
//! - **attribute**: 属性の宣言（型・制約・差分抑制）
//! - **validation**: 値のバリデーター
//! - **plan**: 状態と設定の差分計算

pub mod attribute;
pub mod plan;
pub mod validation;

use serde_json::{Map, Value};

pub use attribute::{Attribute, DiffSuppressFn, ValueType};
pub use plan::{AttributeChange, Plan, PlanAction};
pub use validation::Validation;

use crate::domain::entities::resource_data::is_zero_value;
use crate::domain::errors::DataFactoryError;

/// リソースのスキーマ
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn new(attributes: Vec<Attribute>) -> Self {
        Self { attributes }
    }

    /// 属性を追加したスキーマを返す
    pub fn with(mut self, attributes: Vec<Attribute>) -> Self {
        self.attributes.extend(attributes);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attribute| attribute.name == name)
    }

    /// 設定を検証する
    ///
    /// すべての違反をまとめて報告する。API 呼び出しは行わない。
    ///
    /// # Errors
    ///
    /// 違反が1つ以上ある場合に `DataFactoryError::Validation`
    pub fn validate(&self, config: &Map<String, Value>) -> Result<(), DataFactoryError> {
        let mut diagnostics = Vec::new();
        self.collect_diagnostics("", config, &mut diagnostics);

        if diagnostics.is_empty() {
            Ok(())
        } else {
            Err(DataFactoryError::Validation(diagnostics))
        }
    }

    fn collect_diagnostics(&self, prefix: &str, config: &Map<String, Value>, diagnostics: &mut Vec<String>) {
        for key in config.keys() {
            if self.attribute(key).is_none() {
                diagnostics.push(format!("unsupported argument {:?}", format!("{}{}", prefix, key)));
            }
        }

        let mut reported_groups: Vec<Vec<&str>> = Vec::new();

        for attribute in &self.attributes {
            let path = format!("{}{}", prefix, attribute.name);
            let value = config.get(attribute.name).filter(|v| !v.is_null());

            let Some(value) = value else {
                if attribute.required {
                    diagnostics.push(format!("{:?} is required", path));
                }
                self.check_exactly_one_of(prefix, attribute, config, &mut reported_groups, diagnostics);
                continue;
            };

            if attribute.is_computed_only() {
                diagnostics.push(format!("{:?} is computed and cannot be set", path));
                continue;
            }

            if !check_type(&path, &attribute.value_type, value, diagnostics) {
                continue;
            }

            for validation in &attribute.validations {
                match value {
                    Value::Array(items) => {
                        for (index, item) in items.iter().enumerate() {
                            if let Some(message) = validation.check(&format!("{}.{}", path, index), item) {
                                diagnostics.push(message);
                            }
                        }
                    }
                    other => {
                        if let Some(message) = validation.check(&path, other) {
                            diagnostics.push(message);
                        }
                    }
                }
            }

            if is_set(Some(value)) {
                for other in &attribute.conflicts_with {
                    if is_set(config.get(*other)) {
                        diagnostics.push(format!(
                            "{:?} conflicts with {:?}",
                            path,
                            format!("{}{}", prefix, other)
                        ));
                    }
                }
                for other in &attribute.required_with {
                    if !is_set(config.get(*other)) {
                        diagnostics.push(format!(
                            "{:?} requires {:?} to be set",
                            path,
                            format!("{}{}", prefix, other)
                        ));
                    }
                }
            }

            self.check_exactly_one_of(prefix, attribute, config, &mut reported_groups, diagnostics);
        }
    }

    fn check_exactly_one_of<'a>(
        &self,
        prefix: &str,
        attribute: &'a Attribute,
        config: &Map<String, Value>,
        reported_groups: &mut Vec<Vec<&'a str>>,
        diagnostics: &mut Vec<String>,
    ) {
        if attribute.exactly_one_of.is_empty() {
            return;
        }

        let mut group: Vec<&str> = attribute.exactly_one_of.clone();
        if !group.contains(&attribute.name) {
            group.push(attribute.name);
        }
        group.sort_unstable();
        if reported_groups.contains(&group) {
            return;
        }

        let set_count = group.iter().filter(|name| is_set(config.get(**name))).count();
        if set_count != 1 {
            let names: Vec<String> = group
                .iter()
                .map(|name| format!("{:?}", format!("{}{}", prefix, name)))
                .collect();
            diagnostics.push(format!("exactly one of {} must be specified", names.join(", ")));
        }
        reported_groups.push(group);
    }

    /// 未設定の属性にデフォルト値を入れる（ネストしたブロックも含む）
    pub fn apply_defaults(&self, config: &mut Map<String, Value>) {
        for attribute in &self.attributes {
            match config.get_mut(attribute.name) {
                None | Some(Value::Null) => {
                    if let Some(default) = &attribute.default {
                        config.insert(attribute.name.to_string(), default.clone());
                    }
                }
                Some(value) => match (&attribute.value_type, value) {
                    (ValueType::Block(schema), Value::Object(nested)) => schema.apply_defaults(nested),
                    (ValueType::BlockList(schema), Value::Array(items)) => {
                        for item in items.iter_mut() {
                            if let Value::Object(nested) = item {
                                schema.apply_defaults(nested);
                            }
                        }
                    }
                    _ => {}
                },
            }
        }
    }

    /// `schema` コマンド用のJSON表現
    pub fn describe(&self) -> Value {
        Value::Object(
            self.attributes
                .iter()
                .map(|attribute| (attribute.name.to_string(), attribute.to_json()))
                .collect(),
        )
    }

    /// 機密属性の値を `(sensitive)` に置き換えたコピー
    pub fn redact(&self, attributes: &Map<String, Value>) -> Map<String, Value> {
        attributes
            .iter()
            .map(|(key, value)| {
                let sensitive = self.attribute(key).is_some_and(|a| a.sensitive);
                if sensitive && !value.is_null() {
                    (key.clone(), Value::String("(sensitive)".to_string()))
                } else {
                    (key.clone(), value.clone())
                }
            })
            .collect()
    }
}

fn is_set(value: Option<&Value>) -> bool {
    value.is_some_and(|v| !is_zero_value(v))
}

/// 型を検査する。ネストしたブロックは再帰的に検証する。
fn check_type(path: &str, value_type: &ValueType, value: &Value, diagnostics: &mut Vec<String>) -> bool {
    let ok = match (value_type, value) {
        (ValueType::String, Value::String(_)) => true,
        (ValueType::Bool, Value::Bool(_)) => true,
        (ValueType::Int, Value::Number(n)) => n.is_i64(),
        (ValueType::StringList, Value::Array(items)) => items.iter().all(Value::is_string),
        (ValueType::StringMap, Value::Object(map)) => map.values().all(Value::is_string),
        (ValueType::Block(schema), Value::Object(nested)) => {
            schema.collect_diagnostics(&format!("{}.", path), nested, diagnostics);
            true
        }
        (ValueType::BlockList(schema), Value::Array(items)) => {
            for (index, item) in items.iter().enumerate() {
                match item {
                    Value::Object(nested) => {
                        schema.collect_diagnostics(&format!("{}.{}.", path, index), nested, diagnostics)
                    }
                    _ => diagnostics.push(format!("{:?} must be a block", format!("{}.{}", path, index))),
                }
            }
            true
        }
        _ => false,
    };

    if !ok {
        diagnostics.push(format!("{:?} must be of type {}", path, value_type.name()));
    }
    ok
}
