//! # Activity Serialization
//!
//! `activities_json`（アクティビティの JSON 配列）と型付き `Activity` の相互変換

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::entities::pipeline::Activity;
use crate::domain::services::diff_suppress::DiffSuppression;

#[derive(Deserialize)]
struct ActivityEnvelope {
    activities: Vec<Activity>,
}

#[derive(Serialize)]
struct ActivityEnvelopeRef<'a> {
    activities: &'a [Activity],
}

/// アクティビティ変換サービス
pub struct ActivitySerializer;

impl ActivitySerializer {
    /// JSON 配列をアクティビティのリストに変換する
    ///
    /// 配列であることを確かめてから `{"activities": [...]}` に包んでデシリアライズする。
    ///
    /// # Errors
    ///
    /// JSON が不正、または配列でない場合
    pub fn deserialize(json: &str) -> Result<Vec<Activity>> {
        let value: Value =
            serde_json::from_str(json).context("Failed to parse activities_json")?;
        if !value.is_array() {
            bail!("activities_json must be a JSON array of activities");
        }

        let mut wrapped = Map::new();
        wrapped.insert("activities".to_string(), value);
        let envelope: ActivityEnvelope = serde_json::from_value(Value::Object(wrapped))
            .context("Failed to decode activities_json as an array of activities")?;
        Ok(envelope.activities)
    }

    /// アクティビティのリストを JSON 配列の文字列に変換する
    ///
    /// 空の `dependsOn` / `userProperties` は出力されない
    pub fn serialize(activities: &[Activity]) -> Result<String> {
        let envelope = serde_json::to_value(ActivityEnvelopeRef { activities })
            .context("Failed to encode activities")?;
        let array = envelope
            .get("activities")
            .cloned()
            .unwrap_or(Value::Array(Vec::new()));
        serde_json::to_string(&array).context("Failed to encode activities")
    }

    /// `activities_json` の差分抑制
    ///
    /// 両方を型付きアクティビティ経由で正規化してから構造的に比較する。
    /// 正規化できない場合は通常の JSON 比較に戻る。
    pub fn suppress_diff(key: &str, old: &str, new: &str) -> bool {
        let normalize = |input: &str| Self::deserialize(input).and_then(|a| Self::serialize(&a));
        match (normalize(old), normalize(new)) {
            (Ok(old), Ok(new)) => DiffSuppression::json(key, &old, &new),
            _ => DiffSuppression::json(key, old, new),
        }
    }
}
