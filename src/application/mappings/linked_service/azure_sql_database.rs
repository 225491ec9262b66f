//! # Azure SQL Database Linked Service

use super::{
    connection_string_attributes, expand_connection_string, expand_secure_string,
    flatten_connection_string, flatten_key_vault_only, LinkedServiceMapping,
};
use crate::application::dto::linked_service::{
    AzureSqlDatabaseLinkedServiceConfig, LinkedServiceCommonConfig,
};
use crate::application::mappings::{expand_key_vault_secret, key_vault_secret_schema};
use crate::domain::entities::dynamic_value::{flatten_optional_string, DynamicValue};
use crate::domain::entities::linked_service::{
    AzureSqlDatabaseTypeProperties, LinkedService, LinkedServiceKind,
};
use crate::domain::errors::DataFactoryError;
use crate::domain::schema::{Attribute, Validation};

const MANAGED_IDENTITY: &str = "SystemAssignedManagedIdentity";
const SERVICE_PRINCIPAL: &str = "ServicePrincipal";

/// `azurerm_data_factory_linked_service_azure_sql_database`
pub struct AzureSqlDatabaseLinkedService;

impl LinkedServiceMapping for AzureSqlDatabaseLinkedService {
    type Config = AzureSqlDatabaseLinkedServiceConfig;

    const TYPE_NAME: &'static str = "azurerm_data_factory_linked_service_azure_sql_database";
    const API_TYPE: &'static str = "AzureSqlDatabase";

    fn common(config: &Self::Config) -> &LinkedServiceCommonConfig {
        &config.common
    }

    fn attributes() -> Vec<Attribute> {
        let mut attributes = connection_string_attributes(true);
        attributes.extend([
            Attribute::block("key_vault_password", key_vault_secret_schema()).optional(),
            Attribute::bool("use_managed_identity")
                .optional()
                .default_value(false)
                .conflicts_with(&["service_principal_id"]),
            Attribute::string("service_principal_id")
                .optional()
                .validate(Validation::NotEmpty)
                .required_with(&["service_principal_key"]),
            Attribute::string("service_principal_key")
                .optional()
                .sensitive()
                .validate(Validation::NotEmpty)
                .required_with(&["service_principal_id"]),
            Attribute::string("tenant_id").optional(),
        ]);
        attributes
    }

    fn expand_kind(config: &Self::Config) -> Result<LinkedServiceKind, DataFactoryError> {
        let mut props = AzureSqlDatabaseTypeProperties {
            connection_string: expand_connection_string(
                config.connection_string.as_ref(),
                config.key_vault_connection_string.as_ref(),
            ),
            password: config.key_vault_password.as_ref().map(expand_key_vault_secret),
            tenant: config.tenant_id.as_deref().map(DynamicValue::from),
            ..Default::default()
        };

        if config.use_managed_identity {
            props.authentication_type = Some(MANAGED_IDENTITY.to_string());
        } else if let Some(id) = config.service_principal_id.as_deref() {
            props.authentication_type = Some(SERVICE_PRINCIPAL.to_string());
            props.service_principal_id = Some(DynamicValue::from(id));
            props.service_principal_key = expand_secure_string(config.service_principal_key.as_ref());
        }

        Ok(LinkedServiceKind::AzureSqlDatabase(props))
    }

    fn flatten_type(
        service: &LinkedService,
        common: LinkedServiceCommonConfig,
        prior: Option<&Self::Config>,
    ) -> Result<Self::Config, DataFactoryError> {
        let LinkedServiceKind::AzureSqlDatabase(props) = &service.kind else {
            return Ok(AzureSqlDatabaseLinkedServiceConfig {
                common,
                ..Default::default()
            });
        };

        let (connection_string, key_vault_connection_string) = flatten_connection_string(
            "connection_string",
            props.connection_string.as_ref(),
            prior.and_then(|p| p.connection_string.as_ref()),
        );
        let service_principal_id =
            flatten_optional_string("service_principal_id", props.service_principal_id.as_ref());
        let service_principal_key = service_principal_id
            .as_ref()
            .and_then(|_| prior.and_then(|p| p.service_principal_key.clone()));

        Ok(AzureSqlDatabaseLinkedServiceConfig {
            common,
            connection_string,
            key_vault_connection_string,
            key_vault_password: flatten_key_vault_only("key_vault_password", props.password.as_ref()),
            use_managed_identity: props
                .authentication_type
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case(MANAGED_IDENTITY)),
            service_principal_id,
            service_principal_key,
            tenant_id: flatten_optional_string("tenant_id", props.tenant.as_ref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::linked_service::KeyVaultSecretConfig;
    use crate::application::mappings::linked_service::LinkedServices;
    use crate::application::mappings::ResourceMapping;
    use crate::domain::entities::resource_id::{ChildKind, FactoryId};
    use crate::domain::schema::PlanAction;
    use serde_json::{json, Map, Value};

    fn factory() -> FactoryId {
        FactoryId::new("sub", "rg1", "factory1")
    }

    fn config() -> AzureSqlDatabaseLinkedServiceConfig {
        AzureSqlDatabaseLinkedServiceConfig {
            common: LinkedServiceCommonConfig {
                name: "sql".to_string(),
                data_factory_id: factory().to_string(),
                integration_runtime_name: Some("ir".to_string()),
                ..Default::default()
            },
            connection_string: Some(
                "Data Source=test;Initial Catalog=db;Password=secret".to_string(),
            ),
            key_vault_password: Some(KeyVaultSecretConfig {
                linked_service_name: "kv".to_string(),
                secret_name: "sql-password".to_string(),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_expand_payload() {
        let mapping = LinkedServices::<AzureSqlDatabaseLinkedService>::new();
        let service = mapping.expand(&config(), &factory()).unwrap();

        assert_eq!(
            serde_json::to_value(&service).unwrap(),
            json!({
                "type": "AzureSqlDatabase",
                "connectVia": {"referenceName": "ir", "type": "IntegrationRuntimeReference"},
                "typeProperties": {
                    "connectionString": "Data Source=test;Initial Catalog=db;Password=secret",
                    "password": {
                        "type": "AzureKeyVaultSecret",
                        "store": {"referenceName": "kv", "type": "LinkedServiceReference"},
                        "secretName": "sql-password"
                    }
                }
            })
        );
    }

    #[test]
    fn test_password_stripped_by_api_produces_no_diff() {
        let mapping = LinkedServices::<AzureSqlDatabaseLinkedService>::new();
        let config = config();

        let returned: LinkedService = serde_json::from_value(json!({
            "type": "AzureSqlDatabase",
            "connectVia": {"referenceName": "ir", "type": "IntegrationRuntimeReference"},
            "typeProperties": {
                "connectionString": "Initial Catalog=db;Data Source=test",
                "password": {
                    "type": "AzureKeyVaultSecret",
                    "store": {"referenceName": "kv", "type": "LinkedServiceReference"},
                    "secretName": "sql-password"
                }
            }
        }))
        .unwrap();

        let id = factory().child(ChildKind::LinkedService, "sql");
        let state = mapping.flatten(&id, &returned, Some(&config)).unwrap();
        assert_eq!(
            state.connection_string.as_deref(),
            Some("Initial Catalog=db;Data Source=test")
        );

        let as_map = |value: &AzureSqlDatabaseLinkedServiceConfig| -> Map<String, Value> {
            match serde_json::to_value(value).unwrap() {
                Value::Object(map) => map,
                _ => unreachable!(),
            }
        };
        let plan = mapping.schema().plan(Some(&as_map(&state)), &as_map(&config));
        assert_eq!(plan.action, PlanAction::NoOp);
    }

    #[test]
    fn test_managed_identity() {
        let mut config = config();
        config.use_managed_identity = true;

        let LinkedServiceKind::AzureSqlDatabase(props) =
            AzureSqlDatabaseLinkedService::expand_kind(&config).unwrap()
        else {
            panic!("expected an Azure SQL Database linked service");
        };
        assert_eq!(props.authentication_type.as_deref(), Some(MANAGED_IDENTITY));
        assert!(props.service_principal_id.is_none());

        let service = LinkedService::new(LinkedServiceKind::AzureSqlDatabase(props));
        let flattened = AzureSqlDatabaseLinkedService::flatten_type(
            &service,
            LinkedServiceCommonConfig::default(),
            Some(&config),
        )
        .unwrap();
        assert!(flattened.use_managed_identity);
    }

    #[test]
    fn test_service_principal_key_read_back_from_prior() {
        let config = AzureSqlDatabaseLinkedServiceConfig {
            connection_string: Some("Data Source=test".to_string()),
            service_principal_id: Some("00000000-0000-0000-0000-000000000001".to_string()),
            service_principal_key: Some("key".to_string()),
            tenant_id: Some("tenant".to_string()),
            ..Default::default()
        };

        let returned: LinkedService = serde_json::from_value(json!({
            "type": "AzureSqlDatabase",
            "typeProperties": {
                "connectionString": "Data Source=test",
                "authenticationType": "ServicePrincipal",
                "servicePrincipalId": "00000000-0000-0000-0000-000000000001",
                "tenant": "tenant"
            }
        }))
        .unwrap();

        let flattened = AzureSqlDatabaseLinkedService::flatten_type(
            &returned,
            LinkedServiceCommonConfig::default(),
            Some(&config),
        )
        .unwrap();
        assert_eq!(flattened, config);
    }

    #[test]
    fn test_schema_requires_exactly_one_connection_string() {
        let schema = LinkedServices::<AzureSqlDatabaseLinkedService>::new().schema();
        let mut config = Map::new();
        config.insert("name".to_string(), json!("sql"));
        config.insert("data_factory_id".to_string(), json!(factory().to_string()));

        let Err(DataFactoryError::Validation(messages)) = schema.validate(&config) else {
            panic!("expected a validation error");
        };
        assert_eq!(
            messages,
            vec![r#"exactly one of "connection_string", "key_vault_connection_string" must be specified"#]
        );
    }
}
