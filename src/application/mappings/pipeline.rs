//! # Pipeline Mapping
//!
//! `azurerm_data_factory_pipeline` の設定と Pipeline モデルの相互変換

use log::debug;
use serde_json::Value;

use super::{
    annotations_attribute, data_factory_id_attribute, description_attribute, flatten_factory_id,
    name_attribute, non_empty, non_empty_string, parameters_attribute, ResourceMapping,
};
use crate::application::dto::pipeline::PipelineConfig;
use crate::domain::entities::pipeline::{Activity, ElapsedTimeMetricPolicy, Pipeline, PipelinePolicy};
use crate::domain::entities::resource_id::{ChildKind, ChildResourceId, FactoryId};
use crate::domain::errors::DataFactoryError;
use crate::domain::schema::{Attribute, Schema, Validation};
use crate::domain::services::activities::ActivitySerializer;
use crate::domain::services::field_mapping::FieldMapping;

/// `d.hh:mm:ss` 形式
const DURATION_PATTERN: &str = r"^\d+\.\d{2}:\d{2}:\d{2}$";

#[derive(Debug, Default)]
pub struct PipelineMapping;

impl PipelineMapping {
    fn expand_activities(config: &PipelineConfig) -> Result<Option<Vec<Activity>>, DataFactoryError> {
        let Some(json) = non_empty(config.activities_json.as_ref()) else {
            return Ok(None);
        };

        ActivitySerializer::deserialize(json)
            .map(Some)
            .map_err(|e| DataFactoryError::Validation(vec![format!("\"activities_json\": {:#}", e)]))
    }

    /// API が返したアクティビティを JSON にする
    ///
    /// 直前の設定と同等であれば、設定側の表記を保つ
    fn flatten_activities(
        pipeline: &Pipeline,
        prior: Option<&PipelineConfig>,
    ) -> Result<Option<String>, DataFactoryError> {
        let Some(activities) = pipeline.activities.as_ref() else {
            return Ok(None);
        };

        let rendered = ActivitySerializer::serialize(activities).map_err(|e| {
            DataFactoryError::Validation(vec![format!("encoding activities: {:#}", e)])
        })?;

        let prior = prior.and_then(|p| p.activities_json.as_ref());
        match prior {
            Some(prior) if ActivitySerializer::suppress_diff("activities_json", prior, &rendered) => {
                Ok(Some(prior.clone()))
            }
            _ => Ok(Some(rendered)),
        }
    }

    fn flatten_duration(pipeline: &Pipeline) -> Option<String> {
        let duration = pipeline
            .policy
            .as_ref()?
            .elapsed_time_metric
            .as_ref()?
            .duration
            .as_ref()?;

        match duration {
            Value::String(value) => non_empty_string(value.clone()),
            other => {
                debug!("Skipping elapsed time metric duration {} since it's not a string", other);
                None
            }
        }
    }
}

impl ResourceMapping for PipelineMapping {
    type Config = PipelineConfig;
    type Model = Pipeline;

    fn type_name(&self) -> &'static str {
        "azurerm_data_factory_pipeline"
    }

    fn kind(&self) -> ChildKind {
        ChildKind::Pipeline
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            name_attribute(),
            data_factory_id_attribute(),
            description_attribute(),
            annotations_attribute(),
            parameters_attribute(),
            Attribute::string_map("variables").optional(),
            Attribute::int("concurrency")
                .optional()
                .validate(Validation::IntBetween(1, 50)),
            Attribute::string("folder").optional(),
            Attribute::string("moniter_metrics_after_duration")
                .optional()
                .validate(Validation::Regex {
                    pattern: DURATION_PATTERN,
                    message: "must be a duration in the format d.hh:mm:ss",
                }),
            Attribute::string("activities_json")
                .optional()
                .validate(Validation::Json)
                .diff_suppress(ActivitySerializer::suppress_diff)
                .describe("A JSON array of the activities in the Pipeline."),
        ])
    }

    fn validate(&self, config: &PipelineConfig, _factory: &FactoryId) -> Result<(), DataFactoryError> {
        Self::expand_activities(config).map(|_| ())
    }

    fn expand(&self, config: &PipelineConfig, _factory: &FactoryId) -> Result<Pipeline, DataFactoryError> {
        let policy = non_empty(config.moniter_metrics_after_duration.as_ref()).map(|duration| {
            PipelinePolicy {
                elapsed_time_metric: Some(ElapsedTimeMetricPolicy {
                    duration: Some(Value::String(duration.to_string())),
                }),
            }
        });

        Ok(Pipeline {
            description: non_empty(config.description.as_ref()).map(str::to_string),
            activities: Self::expand_activities(config)?,
            parameters: FieldMapping::expand_parameters(&config.parameters),
            variables: FieldMapping::expand_variables(&config.variables),
            concurrency: config.concurrency.filter(|c| *c != 0),
            annotations: FieldMapping::expand_annotations(&config.annotations),
            folder: FieldMapping::expand_folder(config.folder.as_deref()),
            policy,
        })
    }

    fn flatten(
        &self,
        id: &ChildResourceId,
        pipeline: &Pipeline,
        prior: Option<&PipelineConfig>,
    ) -> Result<PipelineConfig, DataFactoryError> {
        Ok(PipelineConfig {
            name: id.name.clone(),
            data_factory_id: flatten_factory_id(
                &id.factory,
                prior.map(|p| p.data_factory_id.as_str()),
            ),
            description: pipeline.description.clone(),
            annotations: FieldMapping::flatten_annotations(pipeline.annotations.as_ref()),
            concurrency: pipeline.concurrency,
            folder: non_empty_string(FieldMapping::flatten_folder(pipeline.folder.as_ref())),
            moniter_metrics_after_duration: Self::flatten_duration(pipeline),
            parameters: FieldMapping::flatten_parameters(pipeline.parameters.as_ref()),
            variables: FieldMapping::flatten_variables(pipeline.variables.as_ref()),
            activities_json: Self::flatten_activities(pipeline, prior)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    const ACTIVITIES: &str = r#"[
        {
            "name": "Append variable1",
            "type": "AppendVariable",
            "dependsOn": [],
            "userProperties": [],
            "typeProperties": {"variableName": "bob", "value": "something"}
        }
    ]"#;

    fn factory() -> FactoryId {
        FactoryId::new("sub", "rg1", "factory1")
    }

    fn config() -> PipelineConfig {
        PipelineConfig {
            name: "nightly".to_string(),
            data_factory_id: factory().to_string(),
            description: Some("nightly load".to_string()),
            annotations: vec!["etl".to_string()],
            concurrency: Some(30),
            folder: Some("loads".to_string()),
            moniter_metrics_after_duration: Some("0.00:10:00".to_string()),
            parameters: BTreeMap::from([("env".to_string(), "dev".to_string())]),
            variables: BTreeMap::from([("bob".to_string(), "item1".to_string())]),
            activities_json: Some(ACTIVITIES.to_string()),
        }
    }

    #[test]
    fn test_expand_pipeline() {
        let pipeline = PipelineMapping.expand(&config(), &factory()).unwrap();
        let value = serde_json::to_value(&pipeline).unwrap();

        assert_eq!(value["concurrency"], 30);
        assert_eq!(value["folder"], json!({"name": "loads"}));
        assert_eq!(
            value["policy"],
            json!({"elapsedTimeMetric": {"duration": "0.00:10:00"}})
        );
        assert_eq!(
            value["variables"]["bob"],
            json!({"type": "String", "defaultValue": "item1"})
        );
        assert_eq!(value["activities"][0]["type"], "AppendVariable");
    }

    #[test]
    fn test_round_trip_keeps_configured_activities_json() {
        let config = config();
        let pipeline = PipelineMapping.expand(&config, &factory()).unwrap();
        let id = factory().child(ChildKind::Pipeline, "nightly");

        let flattened = PipelineMapping.flatten(&id, &pipeline, Some(&config)).unwrap();
        assert_eq!(flattened, config);

        let without_prior = PipelineMapping.flatten(&id, &pipeline, None).unwrap();
        let rendered = without_prior.activities_json.unwrap();
        assert!(ActivitySerializer::suppress_diff("activities_json", ACTIVITIES, &rendered));
        assert!(!rendered.contains("dependsOn"));
    }

    #[test]
    fn test_empty_pipeline() {
        let config = PipelineConfig {
            name: "empty".to_string(),
            data_factory_id: factory().to_string(),
            ..Default::default()
        };

        let pipeline = PipelineMapping.expand(&config, &factory()).unwrap();
        assert_eq!(pipeline, Pipeline::default());

        let id = factory().child(ChildKind::Pipeline, "empty");
        assert_eq!(PipelineMapping.flatten(&id, &pipeline, None).unwrap(), config);
    }

    #[test]
    fn test_invalid_activities_json_fails_validation() {
        let mut config = config();
        config.activities_json = Some(r#"[{"type": "Wait"}]"#.to_string());

        let result = PipelineMapping.validate(&config, &factory());
        assert!(matches!(result, Err(DataFactoryError::Validation(_))));
    }

    #[test]
    fn test_schema_rejects_bad_duration_and_concurrency() {
        let schema = PipelineMapping.schema();
        let config = json!({
            "name": "p",
            "data_factory_id": factory().to_string(),
            "concurrency": 51,
            "moniter_metrics_after_duration": "10 minutes"
        });

        let Err(DataFactoryError::Validation(diagnostics)) =
            schema.validate(config.as_object().unwrap())
        else {
            panic!("expected validation errors");
        };
        assert_eq!(diagnostics.len(), 2);
    }
}
