//! # SQL Server Linked Service

use super::{
    connection_string_attributes, expand_connection_string, flatten_connection_string,
    flatten_key_vault_only, LinkedServiceMapping,
};
use crate::application::dto::linked_service::{LinkedServiceCommonConfig, SqlServerLinkedServiceConfig};
use crate::application::mappings::{expand_key_vault_secret, key_vault_secret_schema, non_empty};
use crate::domain::entities::dynamic_value::{flatten_optional_string, DynamicValue};
use crate::domain::entities::linked_service::{LinkedService, LinkedServiceKind, SqlServerTypeProperties};
use crate::domain::errors::DataFactoryError;
use crate::domain::schema::Attribute;

/// `azurerm_data_factory_linked_service_sql_server`
pub struct SqlServerLinkedService;

impl LinkedServiceMapping for SqlServerLinkedService {
    type Config = SqlServerLinkedServiceConfig;

    const TYPE_NAME: &'static str = "azurerm_data_factory_linked_service_sql_server";
    const API_TYPE: &'static str = "SqlServer";

    fn common(config: &Self::Config) -> &LinkedServiceCommonConfig {
        &config.common
    }

    fn attributes() -> Vec<Attribute> {
        let mut attributes = connection_string_attributes(true);
        attributes.extend([
            Attribute::string("user_name").optional(),
            Attribute::block("key_vault_password", key_vault_secret_schema()).optional(),
        ]);
        attributes
    }

    fn expand_kind(config: &Self::Config) -> Result<LinkedServiceKind, DataFactoryError> {
        Ok(LinkedServiceKind::SqlServer(SqlServerTypeProperties {
            connection_string: expand_connection_string(
                config.connection_string.as_ref(),
                config.key_vault_connection_string.as_ref(),
            ),
            user_name: non_empty(config.user_name.as_ref()).map(DynamicValue::from),
            password: config.key_vault_password.as_ref().map(expand_key_vault_secret),
        }))
    }

    fn flatten_type(
        service: &LinkedService,
        common: LinkedServiceCommonConfig,
        prior: Option<&Self::Config>,
    ) -> Result<Self::Config, DataFactoryError> {
        let LinkedServiceKind::SqlServer(props) = &service.kind else {
            return Ok(SqlServerLinkedServiceConfig {
                common,
                ..Default::default()
            });
        };

        let (connection_string, key_vault_connection_string) = flatten_connection_string(
            "connection_string",
            props.connection_string.as_ref(),
            prior.and_then(|p| p.connection_string.as_ref()),
        );

        Ok(SqlServerLinkedServiceConfig {
            common,
            connection_string,
            key_vault_connection_string,
            user_name: flatten_optional_string("user_name", props.user_name.as_ref()),
            key_vault_password: flatten_key_vault_only("key_vault_password", props.password.as_ref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::linked_service::KeyVaultSecretConfig;
    use serde_json::json;

    #[test]
    fn test_key_vault_connection_string_round_trip() {
        let config = SqlServerLinkedServiceConfig {
            key_vault_connection_string: Some(KeyVaultSecretConfig {
                linked_service_name: "kv".to_string(),
                secret_name: "sql-conn".to_string(),
            }),
            user_name: Some("sa".to_string()),
            ..Default::default()
        };

        let service = LinkedService::new(SqlServerLinkedService::expand_kind(&config).unwrap());
        assert_eq!(
            serde_json::to_value(&service).unwrap()["typeProperties"],
            json!({
                "connectionString": {
                    "type": "AzureKeyVaultSecret",
                    "store": {"referenceName": "kv", "type": "LinkedServiceReference"},
                    "secretName": "sql-conn"
                },
                "userName": "sa"
            })
        );

        let flattened =
            SqlServerLinkedService::flatten_type(&service, LinkedServiceCommonConfig::default(), None)
                .unwrap();
        assert_eq!(flattened, config);
    }
}
