//! # Attribute
//!
//! スキーマ属性の宣言（ビルダー形式）

use serde_json::{json, Value};
use std::fmt;

use super::validation::Validation;
use super::Schema;

/// 差分抑制関数 `(属性名, 旧値, 新値) -> 抑制するか`
pub type DiffSuppressFn = fn(&str, &str, &str) -> bool;

/// 属性の値の型
#[derive(Debug, Clone)]
pub enum ValueType {
    String,
    Bool,
    Int,
    /// 文字列のリスト
    StringList,
    /// 文字列から文字列へのマップ
    StringMap,
    /// ネストしたブロック（単一のオブジェクト）
    Block(Schema),
    /// ネストしたブロックのリスト
    BlockList(Schema),
}

impl ValueType {
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::StringList => "list(string)",
            ValueType::StringMap => "map(string)",
            ValueType::Block(_) => "block",
            ValueType::BlockList(_) => "list(block)",
        }
    }
}

/// スキーマ属性
#[derive(Clone)]
pub struct Attribute {
    pub name: &'static str,
    pub value_type: ValueType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub force_new: bool,
    pub sensitive: bool,
    pub default: Option<Value>,
    pub conflicts_with: Vec<&'static str>,
    /// 自身を含むグループのうち、ちょうど1つが設定されている必要がある
    pub exactly_one_of: Vec<&'static str>,
    pub required_with: Vec<&'static str>,
    pub validations: Vec<Validation>,
    pub diff_suppress: Option<DiffSuppressFn>,
    pub description: &'static str,
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("force_new", &self.force_new)
            .field("sensitive", &self.sensitive)
            .field("diff_suppress", &self.diff_suppress.is_some())
            .finish_non_exhaustive()
    }
}

impl Attribute {
    fn new(name: &'static str, value_type: ValueType) -> Self {
        Self {
            name,
            value_type,
            required: false,
            optional: false,
            computed: false,
            force_new: false,
            sensitive: false,
            default: None,
            conflicts_with: Vec::new(),
            exactly_one_of: Vec::new(),
            required_with: Vec::new(),
            validations: Vec::new(),
            diff_suppress: None,
            description: "",
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, ValueType::String)
    }

    pub fn bool(name: &'static str) -> Self {
        Self::new(name, ValueType::Bool)
    }

    pub fn int(name: &'static str) -> Self {
        Self::new(name, ValueType::Int)
    }

    pub fn string_list(name: &'static str) -> Self {
        Self::new(name, ValueType::StringList)
    }

    pub fn string_map(name: &'static str) -> Self {
        Self::new(name, ValueType::StringMap)
    }

    pub fn block(name: &'static str, schema: Schema) -> Self {
        Self::new(name, ValueType::Block(schema))
    }

    pub fn block_list(name: &'static str, schema: Schema) -> Self {
        Self::new(name, ValueType::BlockList(schema))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn conflicts_with(mut self, names: &[&'static str]) -> Self {
        self.conflicts_with.extend_from_slice(names);
        self
    }

    pub fn exactly_one_of(mut self, names: &[&'static str]) -> Self {
        self.exactly_one_of.extend_from_slice(names);
        self
    }

    pub fn required_with(mut self, names: &[&'static str]) -> Self {
        self.required_with.extend_from_slice(names);
        self
    }

    pub fn validate(mut self, validation: Validation) -> Self {
        self.validations.push(validation);
        self
    }

    pub fn diff_suppress(mut self, function: DiffSuppressFn) -> Self {
        self.diff_suppress = Some(function);
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// 設定から値を受け付けない（計算専用の）属性か
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }

    /// `schema` コマンド用のJSON表現
    pub fn to_json(&self) -> Value {
        let mut value = json!({
            "type": self.value_type.name(),
            "required": self.required,
            "optional": self.optional,
            "computed": self.computed,
            "force_new": self.force_new,
            "sensitive": self.sensitive,
        });

        if let Value::Object(map) = &mut value {
            if !self.description.is_empty() {
                map.insert("description".to_string(), json!(self.description));
            }
            if let Some(default) = &self.default {
                map.insert("default".to_string(), default.clone());
            }
            if !self.conflicts_with.is_empty() {
                map.insert("conflicts_with".to_string(), json!(self.conflicts_with));
            }
            if !self.exactly_one_of.is_empty() {
                map.insert("exactly_one_of".to_string(), json!(self.exactly_one_of));
            }
            if !self.required_with.is_empty() {
                map.insert("required_with".to_string(), json!(self.required_with));
            }
            if self.diff_suppress.is_some() {
                map.insert("diff_suppressed".to_string(), json!(true));
            }
            match &self.value_type {
                ValueType::Block(schema) | ValueType::BlockList(schema) => {
                    map.insert("block".to_string(), schema.describe());
                }
                _ => {}
            }
        }

        value
    }
}
