//! # Plan
//!
//! 記録済みの状態と設定の差分計算

use serde::Serialize;
use serde_json::{Map, Value};

use super::{Attribute, Schema, ValueType};
use crate::domain::entities::resource_data::is_zero_value;

/// リソースに対して必要な操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanAction {
    Create,
    Update,
    /// force-new 属性の変更による再作成
    Replace,
    NoOp,
}

/// 属性1つ分の変更
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeChange {
    pub name: String,
    pub old: Option<Value>,
    pub new: Option<Value>,
    pub requires_replace: bool,
    pub sensitive: bool,
}

/// 差分計算の結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub action: PlanAction,
    pub changes: Vec<AttributeChange>,
}

impl Plan {
    pub fn has_changes(&self) -> bool {
        self.action != PlanAction::NoOp
    }
}

impl Schema {
    /// 状態と設定の差分を計算する
    ///
    /// # Arguments
    ///
    /// * `prior` - 記録済みの属性（新規リソースの場合は `None`）
    /// * `config` - デフォルト値を適用済みの設定
    ///
    /// # Returns
    ///
    /// 差分抑制と force-new を考慮した計画
    pub fn plan(&self, prior: Option<&Map<String, Value>>, config: &Map<String, Value>) -> Plan {
        let Some(prior) = prior else {
            let changes = self
                .attributes
                .iter()
                .filter_map(|attribute| {
                    let new = normalized(config.get(attribute.name))?;
                    Some(AttributeChange {
                        name: attribute.name.to_string(),
                        old: None,
                        new: Some(new.clone()),
                        requires_replace: false,
                        sensitive: attribute.sensitive,
                    })
                })
                .collect();
            return Plan {
                action: PlanAction::Create,
                changes,
            };
        };

        let mut changes = Vec::new();
        for attribute in &self.attributes {
            let old = normalized(prior.get(attribute.name));
            let new = normalized(config.get(attribute.name));

            // 計算属性は未設定なら記録済みの値を維持する
            if attribute.computed && new.is_none() {
                continue;
            }

            if old == new {
                continue;
            }

            if let (Some(o), Some(n)) = (old, new) {
                if attribute_equivalent(attribute, o, n) {
                    continue;
                }
            }

            changes.push(AttributeChange {
                name: attribute.name.to_string(),
                old: old.cloned(),
                new: new.cloned(),
                requires_replace: attribute.force_new,
                sensitive: attribute.sensitive,
            });
        }

        let action = if changes.iter().any(|c| c.requires_replace) {
            PlanAction::Replace
        } else if changes.is_empty() {
            PlanAction::NoOp
        } else {
            PlanAction::Update
        };

        Plan { action, changes }
    }
}

/// ゼロ値は未設定と同じに扱う
fn normalized(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !is_zero_value(v))
}

/// 属性の差分抑制と、ブロックなら子属性の差分抑制を適用して比較する
fn attribute_equivalent(attribute: &Attribute, old: &Value, new: &Value) -> bool {
    match (&attribute.value_type, old, new) {
        (_, Value::String(o), Value::String(n)) => {
            o == n || attribute.diff_suppress.is_some_and(|suppress| suppress(attribute.name, o, n))
        }
        (ValueType::Block(schema) | ValueType::BlockList(schema), o, n) => {
            blocks_equivalent(Some(schema), o, n)
        }
        (_, o, n) => o == n,
    }
}

/// ネストしたブロックをゼロ値を無視して比較する
///
/// スキーマにない属性はそのまま値を比較する
fn blocks_equivalent(schema: Option<&Schema>, old: &Value, new: &Value) -> bool {
    match (old, new) {
        (Value::Object(o), Value::Object(n)) => o.keys().chain(n.keys()).all(|key| {
            match (normalized(o.get(key)), normalized(n.get(key))) {
                (None, None) => true,
                (Some(a), Some(b)) => match schema.and_then(|s| s.attribute(key)) {
                    Some(attribute) => attribute_equivalent(attribute, a, b),
                    None => blocks_equivalent(None, a, b),
                },
                _ => false,
            }
        }),
        (Value::Array(o), Value::Array(n)) => {
            o.len() == n.len() && o.iter().zip(n).all(|(a, b)| blocks_equivalent(schema, a, b))
        }
        (a, b) => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::Attribute;
    use crate::domain::services::diff_suppress::DiffSuppression;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn schema() -> Schema {
        Schema::new(vec![
            Attribute::string("name").required().force_new(),
            Attribute::string("description").optional(),
            Attribute::string("connection_string")
                .required()
                .diff_suppress(DiffSuppression::connection_string),
            Attribute::string_list("annotations").optional(),
            Attribute::string("etag").computed(),
            Attribute::block(
                "location",
                Schema::new(vec![
                    Attribute::string("path").optional(),
                    Attribute::bool("dynamic_path_enabled").optional(),
                ]),
            )
            .optional(),
        ])
    }

    #[test]
    fn test_plan_create() {
        let plan = schema().plan(None, &map(json!({"name": "ls", "connection_string": "a=b"})));

        assert_eq!(plan.action, PlanAction::Create);
        assert_eq!(plan.changes.len(), 2);
        assert!(plan.changes.iter().all(|c| c.old.is_none()));
    }

    #[test]
    fn test_plan_noop_with_suppressed_password() {
        let prior = map(json!({
            "name": "ls",
            "connection_string": "Data Source=test",
            "annotations": [],
            "etag": "W/\"1\"",
            "location": {"path": "raw", "dynamic_path_enabled": false}
        }));
        let config = map(json!({
            "name": "ls",
            "connection_string": "Data Source=test;Password=secret",
            "location": {"path": "raw"}
        }));

        let plan = schema().plan(Some(&prior), &config);
        assert_eq!(plan.action, PlanAction::NoOp, "{:?}", plan.changes);
        assert!(!plan.has_changes());
    }

    #[test]
    fn test_plan_update() {
        let prior = map(json!({"name": "ls", "connection_string": "a=b", "description": "old"}));
        let config = map(json!({"name": "ls", "connection_string": "a=b", "description": "new"}));

        let plan = schema().plan(Some(&prior), &config);
        assert_eq!(plan.action, PlanAction::Update);
        assert_eq!(plan.changes[0].name, "description");
        assert_eq!(plan.changes[0].old, Some(json!("old")));
    }

    #[test]
    fn test_plan_replace_on_force_new() {
        let prior = map(json!({"name": "ls", "connection_string": "a=b"}));
        let config = map(json!({"name": "ls2", "connection_string": "a=b"}));

        let plan = schema().plan(Some(&prior), &config);
        assert_eq!(plan.action, PlanAction::Replace);
        assert!(plan.changes[0].requires_replace);
    }

    #[test]
    fn test_plan_applies_suppression_inside_blocks() {
        let schema = Schema::new(vec![Attribute::block(
            "compression",
            Schema::new(vec![
                Attribute::string("type")
                    .required()
                    .diff_suppress(DiffSuppression::case_insensitive),
                Attribute::string("level").optional(),
            ]),
        )
        .optional()]);

        let prior = map(json!({"compression": {"type": "GZip", "level": "Optimal"}}));
        let same = map(json!({"compression": {"type": "gzip", "level": "Optimal"}}));
        assert_eq!(schema.plan(Some(&prior), &same).action, PlanAction::NoOp);

        let other_level = map(json!({"compression": {"type": "gzip", "level": "Fastest"}}));
        assert_eq!(schema.plan(Some(&prior), &other_level).action, PlanAction::Update);
    }

    #[test]
    fn test_plan_removal_is_a_change() {
        let prior = map(json!({"name": "ls", "connection_string": "a=b", "description": "old"}));
        let config = map(json!({"name": "ls", "connection_string": "a=b"}));

        let plan = schema().plan(Some(&prior), &config);
        assert_eq!(plan.action, PlanAction::Update);
        assert_eq!(plan.changes[0].new, None);
    }
}
