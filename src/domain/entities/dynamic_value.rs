//! # DynamicValue
//!
//! API 上で `object` 型として宣言されているフィールドの表現
//!
//! Data Factory は多くのフィールドで「動的コンテンツ」（式）を受け付けるため、
//! 値は文字列・真偽値・式・リストのいずれかになりうる。想定外の形は
//! `Unrecognized` として保持し、flatten 時にログを出してスキップする。

use log::warn;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};

const EXPRESSION_TYPE: &str = "Expression";

/// 動的フィールドの値
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    String(String),
    Bool(bool),
    /// `{"value": "...", "type": "Expression"}`
    Expression(String),
    List(Vec<Value>),
    Unrecognized(Value),
}

impl DynamicValue {
    /// JSON値から分類する
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(s) => DynamicValue::String(s),
            Value::Bool(b) => DynamicValue::Bool(b),
            Value::Array(items) => DynamicValue::List(items),
            Value::Object(map) => {
                let expression = match (
                    map.get("type").and_then(Value::as_str),
                    map.get("value").and_then(Value::as_str),
                ) {
                    (Some(EXPRESSION_TYPE), Some(text)) => Some(text.to_string()),
                    _ => None,
                };
                match expression {
                    Some(text) => DynamicValue::Expression(text),
                    None => DynamicValue::Unrecognized(Value::Object(map)),
                }
            }
            other => DynamicValue::Unrecognized(other),
        }
    }

    /// 設定値を API 表現に変換する
    ///
    /// `dynamic` が true の場合は式として送信する
    pub fn expand(value: &str, dynamic: bool) -> Self {
        if dynamic {
            DynamicValue::Expression(value.to_string())
        } else {
            DynamicValue::String(value.to_string())
        }
    }

    /// JSON値に変換
    pub fn to_value(&self) -> Value {
        match self {
            DynamicValue::String(s) => Value::String(s.clone()),
            DynamicValue::Bool(b) => Value::Bool(*b),
            DynamicValue::Expression(text) => json!({ "value": text, "type": EXPRESSION_TYPE }),
            DynamicValue::List(items) => Value::Array(items.clone()),
            DynamicValue::Unrecognized(value) => value.clone(),
        }
    }

    /// 値の種類名（ログ用）
    pub fn kind(&self) -> &'static str {
        match self {
            DynamicValue::String(_) => "string",
            DynamicValue::Bool(_) => "bool",
            DynamicValue::Expression(_) => "expression",
            DynamicValue::List(_) => "list",
            DynamicValue::Unrecognized(_) => "unrecognized",
        }
    }

    /// 文字列として取り出す
    ///
    /// 文字列以外はログを出して `None` を返す（フィールドはスキップされる）
    pub fn flatten_string(&self, field: &str) -> Option<String> {
        match self {
            DynamicValue::String(s) => Some(s.clone()),
            other => {
                warn!("Skipping {:?} since it's not a string (got {})", field, other.kind());
                None
            }
        }
    }

    /// 真偽値として取り出す
    ///
    /// `"true"` / `"false"` の文字列は真偽値に変換する
    pub fn flatten_bool(&self, field: &str) -> Option<bool> {
        match self {
            DynamicValue::Bool(b) => Some(*b),
            DynamicValue::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            DynamicValue::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            other => {
                warn!("Skipping {:?} since it's not a bool (got {})", field, other.kind());
                None
            }
        }
    }

    /// 文字列または式として取り出す
    ///
    /// # Returns
    ///
    /// `(値, 式かどうか)`。それ以外の種類はログを出して `None`
    pub fn flatten_dynamic(&self, field: &str) -> Option<(String, bool)> {
        match self {
            DynamicValue::String(s) => Some((s.clone(), false)),
            DynamicValue::Expression(text) => Some((text.clone(), true)),
            other => {
                warn!(
                    "Skipping {:?} since it's neither a string nor an expression (got {})",
                    field,
                    other.kind()
                );
                None
            }
        }
    }
}

impl From<&str> for DynamicValue {
    fn from(value: &str) -> Self {
        DynamicValue::String(value.to_string())
    }
}

impl From<bool> for DynamicValue {
    fn from(value: bool) -> Self {
        DynamicValue::Bool(value)
    }
}

impl Serialize for DynamicValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DynamicValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(DynamicValue::from_value)
    }
}

/// `Option<DynamicValue>` から文字列を取り出す
pub fn flatten_optional_string(field: &str, value: Option<&DynamicValue>) -> Option<String> {
    value.and_then(|v| v.flatten_string(field))
}

/// `Option<DynamicValue>` から文字列または式を取り出す
pub fn flatten_optional_dynamic(field: &str, value: Option<&DynamicValue>) -> Option<(String, bool)> {
    value.and_then(|v| v.flatten_dynamic(field))
}
