//! # ResourceData
//!
//! 1つのリソースインスタンスについて、ID・設定（desired）・状態（recorded）を保持する。
//! 各ライフサイクル操作はこの構造体を受け取り、読み書きする。

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// リソースデータ
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceData {
    id: Option<String>,
    config: Map<String, Value>,
    state: Map<String, Value>,
    is_new: bool,
}

impl ResourceData {
    /// 新規リソース（まだ作成されていない）
    pub fn new(config: Map<String, Value>) -> Self {
        Self {
            id: None,
            config,
            state: Map::new(),
            is_new: true,
        }
    }

    /// 状態ファイルから復元した既存リソース
    ///
    /// # Arguments
    ///
    /// * `id` - 記録されているリソースID
    /// * `config` - 現在の設定（destroy や refresh では空でもよい）
    /// * `state` - 記録されている属性
    pub fn existing(id: impl Into<String>, config: Map<String, Value>, state: Map<String, Value>) -> Self {
        Self {
            id: Some(id.into()),
            config,
            state,
            is_new: false,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// IDを消去する（リモートで削除済みの場合）
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    pub fn is_new_resource(&self) -> bool {
        self.is_new
    }

    pub fn config(&self) -> &Map<String, Value> {
        &self.config
    }

    pub fn state(&self) -> &Map<String, Value> {
        &self.state
    }

    pub fn config_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.config
    }

    /// 属性値を取得する
    ///
    /// 設定に値があれば設定を、なければ状態を返す
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self.config.get(key) {
            Some(Value::Null) | None => self.state.get(key),
            Some(value) => Some(value),
        }
    }

    /// ゼロ値でない属性値を取得する
    ///
    /// 空文字列・`false`・`0`・空リスト・空マップは未設定として扱う
    pub fn get_ok(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|value| !is_zero_value(value))
    }

    /// 状態に属性を書き込む
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.state.insert(key.into(), value.into());
    }

    /// 設定値が記録済みの状態と異なるか
    pub fn has_change(&self, key: &str) -> bool {
        let desired = self.config.get(key).filter(|v| !v.is_null());
        let recorded = self.state.get(key).filter(|v| !v.is_null());
        desired != recorded
    }

    /// 設定を型付き構造体として取り出す
    ///
    /// # Errors
    ///
    /// 設定が構造体の形に合わない場合
    pub fn config_as<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.config.clone()))
            .context("Failed to decode resource configuration")
    }

    /// 状態を型付き構造体として取り出す
    pub fn state_as<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.state.clone()))
            .context("Failed to decode resource state")
    }

    /// 型付き構造体で状態を置き換える
    ///
    /// # Errors
    ///
    /// 構造体がJSONオブジェクトにシリアライズされない場合
    pub fn set_state_from<T: Serialize>(&mut self, value: &T) -> Result<()> {
        match serde_json::to_value(value).context("Failed to encode resource state")? {
            Value::Object(map) => {
                self.state = map;
                Ok(())
            }
            other => anyhow::bail!("resource state must be a JSON object, got {}", other),
        }
    }
}

/// ゼロ値かどうか
pub fn is_zero_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
