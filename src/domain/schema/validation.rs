//! # Value Validation
//!
//! 属性値に対するバリデーター

use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, PoisonError};

use crate::domain::entities::resource_id::FactoryId;

/// Data Factory の子リソース名
pub const RESOURCE_NAME_PATTERN: &str = r"^[A-Za-z0-9_][^<>*#.%&:\\+?/]*$";

/// コンパイル済みの正規表現（パターンごとに1回だけコンパイルする）
static COMPILED_PATTERNS: LazyLock<Mutex<HashMap<&'static str, Regex>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn compiled(pattern: &'static str) -> Result<Regex, regex::Error> {
    let mut patterns = COMPILED_PATTERNS
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(re) = patterns.get(pattern) {
        return Ok(re.clone());
    }

    let re = Regex::new(pattern)?;
    patterns.insert(pattern, re.clone());
    Ok(re)
}

/// 属性値のバリデーター
#[derive(Debug, Clone)]
pub enum Validation {
    /// 空文字列を許可しない
    NotEmpty,
    /// 列挙値のいずれか
    OneOf {
        values: &'static [&'static str],
        ignore_case: bool,
    },
    /// 正規表現にマッチする
    Regex {
        pattern: &'static str,
        message: &'static str,
    },
    /// 整数の範囲（両端を含む）
    IntBetween(i64, i64),
    /// Data Factory のID
    FactoryId,
    /// JSON としてパースできる
    Json,
    /// 子リソース名の規則
    ResourceName,
}

impl Validation {
    /// 大文字小文字を区別する列挙値
    pub fn one_of(values: &'static [&'static str]) -> Self {
        Validation::OneOf {
            values,
            ignore_case: false,
        }
    }

    /// 大文字小文字を区別しない列挙値
    pub fn one_of_ignore_case(values: &'static [&'static str]) -> Self {
        Validation::OneOf {
            values,
            ignore_case: true,
        }
    }

    /// 値を検証する
    ///
    /// # Arguments
    ///
    /// * `path` - 診断メッセージに使う属性パス
    /// * `value` - 検証する値（型チェック済み）
    ///
    /// # Returns
    ///
    /// 違反があれば診断メッセージ
    pub fn check(&self, path: &str, value: &Value) -> Option<String> {
        match (self, value) {
            (Validation::NotEmpty, Value::String(s)) if s.trim().is_empty() => {
                Some(format!("{:?} must not be empty", path))
            }
            (Validation::OneOf { values, ignore_case }, Value::String(s)) => {
                let matched = values.iter().any(|candidate| {
                    if *ignore_case {
                        candidate.eq_ignore_ascii_case(s)
                    } else {
                        *candidate == s
                    }
                });
                (!matched).then(|| {
                    format!("expected {:?} to be one of {:?}, got {:?}", path, values, s)
                })
            }
            (Validation::Regex { pattern, message }, Value::String(s)) => match compiled(*pattern) {
                Ok(re) if re.is_match(s) => None,
                Ok(_) => Some(format!("{:?} {}: {:?}", path, message, s)),
                Err(e) => Some(format!("{:?} has an invalid pattern: {}", path, e)),
            },
            (Validation::IntBetween(min, max), Value::Number(n)) => match n.as_i64() {
                Some(i) if (*min..=*max).contains(&i) => None,
                _ => Some(format!(
                    "expected {:?} to be in the range ({} - {}), got {}",
                    path, min, max, n
                )),
            },
            (Validation::FactoryId, Value::String(s)) => FactoryId::parse(s)
                .err()
                .map(|e| format!("{:?}: {}", path, e)),
            (Validation::Json, Value::String(s)) => serde_json::from_str::<Value>(s)
                .err()
                .map(|e| format!("{:?} contains an invalid JSON: {}", path, e)),
            (Validation::ResourceName, Value::String(s)) => {
                match compiled(RESOURCE_NAME_PATTERN) {
                    Ok(re) if re.is_match(s) => None,
                    _ => Some(format!(
                        "invalid name for {:?}, see https://docs.microsoft.com/en-us/azure/data-factory/naming-rules: {:?}",
                        path, s
                    )),
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_patterns_are_compiled_once() {
        let first = compiled(RESOURCE_NAME_PATTERN).unwrap();
        let second = compiled(RESOURCE_NAME_PATTERN).unwrap();

        assert_eq!(first.as_str(), second.as_str());
        assert!(COMPILED_PATTERNS
            .lock()
            .unwrap()
            .contains_key(RESOURCE_NAME_PATTERN));
        assert!(compiled("(unclosed").is_err());
    }

    #[test]
    fn test_not_empty() {
        assert!(Validation::NotEmpty.check("table", &json!("")).is_some());
        assert!(Validation::NotEmpty.check("table", &json!("  ")).is_some());
        assert!(Validation::NotEmpty.check("table", &json!("orders")).is_none());
    }

    #[test]
    fn test_one_of() {
        const VALUES: &[&str] = &["Basic", "Anonymous"];
        assert!(Validation::one_of(VALUES).check("auth", &json!("Basic")).is_none());
        assert!(Validation::one_of(VALUES).check("auth", &json!("basic")).is_some());
        assert!(Validation::one_of_ignore_case(VALUES)
            .check("auth", &json!("basic"))
            .is_none());
    }

    #[test]
    fn test_int_between() {
        let validation = Validation::IntBetween(1, 50);
        assert!(validation.check("concurrency", &json!(1)).is_none());
        assert!(validation.check("concurrency", &json!(50)).is_none());
        assert!(validation.check("concurrency", &json!(51)).is_some());
        assert!(validation.check("concurrency", &json!(0)).is_some());
    }

    #[test]
    fn test_resource_name() {
        let validation = Validation::ResourceName;
        assert!(validation.check("name", &json!("my_dataset-1")).is_none());
        assert!(validation.check("name", &json!("_private")).is_none());
        assert!(validation.check("name", &json!("-leading")).is_some());
        assert!(validation.check("name", &json!("has.dot")).is_some());
        assert!(validation.check("name", &json!("a/b")).is_some());
        assert!(validation.check("name", &json!("")).is_some());
    }

    #[test]
    fn test_factory_id() {
        let validation = Validation::FactoryId;
        assert!(validation
            .check(
                "data_factory_id",
                &json!("/subscriptions/s/resourceGroups/rg/providers/Microsoft.DataFactory/factories/f")
            )
            .is_none());
        assert!(validation.check("data_factory_id", &json!("factory")).is_some());
    }

    #[test]
    fn test_json() {
        assert!(Validation::Json.check("activities_json", &json!("[]")).is_none());
        assert!(Validation::Json.check("activities_json", &json!("[")).is_some());
    }

    #[test]
    fn test_regex() {
        let validation = Validation::Regex {
            pattern: r"^\d+\.\d{2}:\d{2}:\d{2}$",
            message: "must be a duration like 0.00:10:00",
        };
        assert!(validation.check("duration", &json!("0.00:10:00")).is_none());
        assert!(validation.check("duration", &json!("10m")).is_some());
    }

    #[test]
    fn test_type_mismatch_is_ignored() {
        assert!(Validation::NotEmpty.check("table", &json!(1)).is_none());
    }
}
