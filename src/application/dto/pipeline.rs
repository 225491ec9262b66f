//! # Pipeline Configuration DTO

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pipeline の平坦な設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub data_factory_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub annotations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    /// 経過時間メトリクスのしきい値（`0.00:10:00` 形式）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moniter_metrics_after_duration: Option<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    /// アクティビティの JSON 配列
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activities_json: Option<String>,
}
