//! # Pipeline Entity
//!
//! Data Factory Pipeline とアクティビティの API モデル
//!
//! アクティビティは `type` で判別される多態のオブジェクト。本クレートが型付けする
//! 種別以外は `ActivityKind::Other` として元の形のまま保持する。
//! 型付けした種別でも未知のキーは `extra` に保持するため、読み書きで情報は失われない。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::common::{Folder, ParameterDefinitions};
use super::dynamic_value::DynamicValue;

/// Pipeline の `properties`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activities: Option<Vec<Activity>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ParameterDefinitions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<VariableDefinitions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<Folder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<PipelinePolicy>,
}

/// 変数定義（`{"type": "String", "defaultValue": ...}`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableSpecification {
    /// `String` / `Bool` / `Array`
    #[serde(rename = "type")]
    pub variable_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

impl VariableSpecification {
    pub fn string(default_value: impl Into<String>) -> Self {
        Self {
            variable_type: "String".to_string(),
            default_value: Some(Value::String(default_value.into())),
        }
    }
}

pub type VariableDefinitions = BTreeMap<String, VariableSpecification>;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelinePolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_time_metric: Option<ElapsedTimeMetricPolicy>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElapsedTimeMetricPolicy {
    /// `0.00:10:00` 形式の期間
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Value>,
}

/// パイプラインのアクティビティ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawActivity", into = "RawActivity")]
pub struct Activity {
    pub name: String,
    pub description: Option<String>,
    pub state: Option<String>,
    pub on_inactive_mark_as: Option<String>,
    pub depends_on: Vec<ActivityDependency>,
    pub user_properties: Vec<UserProperty>,
    /// `policy` や `linkedServiceName` などの共通でないキー
    pub additional_properties: Map<String, Value>,
    pub kind: ActivityKind,
}

impl Activity {
    pub fn new(name: impl Into<String>, kind: ActivityKind) -> Self {
        Self {
            name: name.into(),
            description: None,
            state: None,
            on_inactive_mark_as: None,
            depends_on: Vec::new(),
            user_properties: Vec::new(),
            additional_properties: Map::new(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDependency {
    pub activity: String,
    #[serde(default)]
    pub dependency_conditions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProperty {
    pub name: String,
    pub value: Value,
}

/// アクティビティ種別
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityKind {
    SetVariable(VariableActivityProperties),
    AppendVariable(VariableActivityProperties),
    Wait(WaitActivityProperties),
    ExecutePipeline(ExecutePipelineActivityProperties),
    WebActivity(WebActivityProperties),
    Fail(FailActivityProperties),
    Other {
        type_name: String,
        type_properties: Option<Value>,
    },
}

impl ActivityKind {
    pub fn type_name(&self) -> &str {
        match self {
            ActivityKind::SetVariable(_) => "SetVariable",
            ActivityKind::AppendVariable(_) => "AppendVariable",
            ActivityKind::Wait(_) => "Wait",
            ActivityKind::ExecutePipeline(_) => "ExecutePipeline",
            ActivityKind::WebActivity(_) => "WebActivity",
            ActivityKind::Fail(_) => "Fail",
            ActivityKind::Other { type_name, .. } => type_name,
        }
    }

    fn from_raw(type_name: String, type_properties: Option<Value>) -> Result<Self, serde_json::Error> {
        let props = type_properties.clone().unwrap_or_else(|| Value::Object(Map::new()));
        let kind = match type_name.as_str() {
            "SetVariable" => ActivityKind::SetVariable(serde_json::from_value(props)?),
            "AppendVariable" => ActivityKind::AppendVariable(serde_json::from_value(props)?),
            "Wait" => ActivityKind::Wait(serde_json::from_value(props)?),
            "ExecutePipeline" => ActivityKind::ExecutePipeline(serde_json::from_value(props)?),
            "WebActivity" => ActivityKind::WebActivity(serde_json::from_value(props)?),
            "Fail" => ActivityKind::Fail(serde_json::from_value(props)?),
            _ => ActivityKind::Other {
                type_name,
                type_properties,
            },
        };
        Ok(kind)
    }

    fn to_raw(&self) -> (String, Option<Value>) {
        let props = match self {
            ActivityKind::SetVariable(p) | ActivityKind::AppendVariable(p) => serde_json::to_value(p),
            ActivityKind::Wait(p) => serde_json::to_value(p),
            ActivityKind::ExecutePipeline(p) => serde_json::to_value(p),
            ActivityKind::WebActivity(p) => serde_json::to_value(p),
            ActivityKind::Fail(p) => serde_json::to_value(p),
            ActivityKind::Other {
                type_name,
                type_properties,
            } => return (type_name.clone(), type_properties.clone()),
        };
        (self.type_name().to_string(), props.ok())
    }
}

/// SetVariable / AppendVariable
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableActivityProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitActivityProperties {
    /// 秒数または式
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_time_in_seconds: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReference {
    pub reference_name: String,
    #[serde(rename = "type", default = "pipeline_reference_type")]
    pub reference_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

fn pipeline_reference_type() -> String {
    "PipelineReference".to_string()
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutePipelineActivityProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<PipelineReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_on_completion: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebActivityProperties {
    /// `GET` / `POST` / `PUT` / `DELETE`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailActivityProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<DynamicValue>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawActivity {
    name: String,
    #[serde(rename = "type")]
    activity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    on_inactive_mark_as: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    depends_on: Vec<ActivityDependency>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    user_properties: Vec<UserProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    type_properties: Option<Value>,
    #[serde(flatten)]
    additional_properties: Map<String, Value>,
}

impl TryFrom<RawActivity> for Activity {
    type Error = serde_json::Error;

    fn try_from(raw: RawActivity) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: ActivityKind::from_raw(raw.activity_type, raw.type_properties)?,
            name: raw.name,
            description: raw.description,
            state: raw.state,
            on_inactive_mark_as: raw.on_inactive_mark_as,
            depends_on: raw.depends_on,
            user_properties: raw.user_properties,
            additional_properties: raw.additional_properties,
        })
    }
}

impl From<Activity> for RawActivity {
    fn from(activity: Activity) -> Self {
        let (activity_type, type_properties) = activity.kind.to_raw();
        Self {
            name: activity.name,
            activity_type,
            description: activity.description,
            state: activity.state,
            on_inactive_mark_as: activity.on_inactive_mark_as,
            depends_on: activity.depends_on,
            user_properties: activity.user_properties,
            type_properties,
            additional_properties: activity.additional_properties,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_set_variable() {
        let activity: Activity = serde_json::from_value(json!({
            "name": "Append variable1",
            "type": "AppendVariable",
            "dependsOn": [],
            "userProperties": [],
            "typeProperties": {"variableName": "bob", "value": "something"}
        }))
        .unwrap();

        assert_eq!(activity.name, "Append variable1");
        assert!(activity.depends_on.is_empty());
        let ActivityKind::AppendVariable(props) = &activity.kind else {
            panic!("expected append variable, got {:?}", activity.kind);
        };
        assert_eq!(props.variable_name.as_deref(), Some("bob"));
        assert_eq!(props.value, Some(json!("something")));
    }

    #[test]
    fn test_serialize_elides_empty_lists() {
        let activity = Activity::new(
            "wait",
            ActivityKind::Wait(WaitActivityProperties {
                wait_time_in_seconds: Some(json!(30)),
                extra: Map::new(),
            }),
        );

        assert_eq!(
            serde_json::to_value(&activity).unwrap(),
            json!({"name": "wait", "type": "Wait", "typeProperties": {"waitTimeInSeconds": 30}})
        );
    }

    #[test]
    fn test_typed_activity_keeps_unknown_keys() {
        let input = json!({
            "name": "call",
            "type": "WebActivity",
            "policy": {"timeout": "0.00:10:00", "retry": 0},
            "typeProperties": {
                "method": "GET",
                "url": "https://example.com",
                "disableCertValidation": true
            }
        });

        let activity: Activity = serde_json::from_value(input.clone()).unwrap();
        assert!(activity.additional_properties.contains_key("policy"));
        assert_eq!(serde_json::to_value(&activity).unwrap(), input);
    }

    #[test]
    fn test_other_activity_preserved() {
        let input = json!({
            "name": "copy",
            "type": "Copy",
            "dependsOn": [{"activity": "wait", "dependencyConditions": ["Succeeded"]}],
            "typeProperties": {"source": {"type": "BlobSource"}, "sink": {"type": "SqlSink"}}
        });

        let activity: Activity = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(activity.kind.type_name(), "Copy");
        assert_eq!(activity.depends_on[0].activity, "wait");
        assert_eq!(serde_json::to_value(&activity).unwrap(), input);
    }

    #[test]
    fn test_pipeline_serialization() {
        let mut variables = VariableDefinitions::new();
        variables.insert("env".to_string(), VariableSpecification::string("dev"));

        let pipeline = Pipeline {
            description: Some("nightly".to_string()),
            variables: Some(variables),
            concurrency: Some(2),
            policy: Some(PipelinePolicy {
                elapsed_time_metric: Some(ElapsedTimeMetricPolicy {
                    duration: Some(json!("0.00:10:00")),
                }),
            }),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&pipeline).unwrap(),
            json!({
                "description": "nightly",
                "variables": {"env": {"type": "String", "defaultValue": "dev"}},
                "concurrency": 2,
                "policy": {"elapsedTimeMetric": {"duration": "0.00:10:00"}}
            })
        );
    }
}
