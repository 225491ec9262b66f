//! # Diff Suppression Service
//!
//! API が意味的に同一の値を異なる表現で返す場合に、差分を抑制する判定
//!
//! いずれの関数も `(属性名, 旧値, 新値)` を受け取るスキーマ用のシグネチャを持つ。

use serde_json::Value;

/// 差分抑制サービス
pub struct DiffSuppression;

impl DiffSuppression {
    /// 接続文字列の差分抑制
    ///
    /// 小文字化した `key=value` 成分を並べ替えて比較する。API はパスワードを返さないため、
    /// キーが `password` の成分は比較対象から除外する。
    ///
    /// # Arguments
    ///
    /// * `_key` - 属性名（未使用）
    /// * `old` - 記録済みの値（API が返した値）
    /// * `new` - 設定値
    ///
    /// # Returns
    ///
    /// 同一とみなせる場合 true
    pub fn connection_string(_key: &str, old: &str, new: &str) -> bool {
        connection_string_components(old) == connection_string_components(new)
    }

    /// JSON の差分抑制
    ///
    /// キー順序と空白を無視して構造的に比較する。配列の順序は区別する。
    /// 両方ともパースできない場合は前後の空白を除いた文字列で比較する。
    pub fn json(_key: &str, old: &str, new: &str) -> bool {
        match (
            serde_json::from_str::<Value>(old),
            serde_json::from_str::<Value>(new),
        ) {
            (Ok(old), Ok(new)) => old == new,
            (Err(_), Err(_)) => old.trim() == new.trim(),
            _ => false,
        }
    }

    /// 大文字小文字を区別しない比較
    ///
    /// API が正規化した表記（リソースIDのセグメント、圧縮コーデック名など）を返す属性に使う
    pub fn case_insensitive(_key: &str, old: &str, new: &str) -> bool {
        old.eq_ignore_ascii_case(new)
    }
}

fn connection_string_components(input: &str) -> Vec<String> {
    let lowered = input.to_lowercase();
    let mut components: Vec<String> = lowered
        .split(';')
        .map(str::trim)
        .filter(|component| !component.is_empty() && !is_password_component(component))
        .map(str::to_string)
        .collect();
    components.sort();
    components
}

fn is_password_component(component: &str) -> bool {
    component
        .split_once('=')
        .is_some_and(|(key, _)| key.trim() == "password")
}
