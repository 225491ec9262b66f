//! # Azure Blob Storage Linked Service
//!
//! 接続文字列・SAS URI・サービスエンドポイントのいずれか1つで接続する。
//! API はいずれの値もマスクして返すため、flatten では直前の設定から読み戻す。

use super::{expand_secure_string, LinkedServiceMapping};
use crate::application::dto::linked_service::{
    AzureBlobStorageLinkedServiceConfig, LinkedServiceCommonConfig,
};
use crate::application::mappings::non_empty;
use crate::domain::entities::dynamic_value::{flatten_optional_string, DynamicValue};
use crate::domain::entities::linked_service::{
    AzureBlobStorageTypeProperties, LinkedService, LinkedServiceKind, SecretOrLiteral,
};
use crate::domain::errors::DataFactoryError;
use crate::domain::schema::{Attribute, Validation};

const ENDPOINTS: &[&str] = &["connection_string", "sas_uri", "service_endpoint"];

const MANAGED_IDENTITY: &str = "Msi";
const SERVICE_PRINCIPAL: &str = "ServicePrincipal";

/// `azurerm_data_factory_linked_service_azure_blob_storage`
pub struct AzureBlobStorageLinkedService;

impl LinkedServiceMapping for AzureBlobStorageLinkedService {
    type Config = AzureBlobStorageLinkedServiceConfig;

    const TYPE_NAME: &'static str = "azurerm_data_factory_linked_service_azure_blob_storage";
    const API_TYPE: &'static str = "AzureBlobStorage";

    fn common(config: &Self::Config) -> &LinkedServiceCommonConfig {
        &config.common
    }

    fn attributes() -> Vec<Attribute> {
        vec![
            Attribute::string("connection_string")
                .optional()
                .sensitive()
                .validate(Validation::NotEmpty)
                .exactly_one_of(ENDPOINTS),
            Attribute::string("sas_uri")
                .optional()
                .sensitive()
                .validate(Validation::NotEmpty)
                .exactly_one_of(ENDPOINTS),
            Attribute::string("service_endpoint")
                .optional()
                .sensitive()
                .validate(Validation::NotEmpty)
                .exactly_one_of(ENDPOINTS),
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
            Attribute::string("storage_kind").optional().validate(Validation::one_of(&[
                "Storage",
                "StorageV2",
                "BlobStorage",
                "BlockBlobStorage",
            ])),
        ]
    }

    fn expand_kind(config: &Self::Config) -> Result<LinkedServiceKind, DataFactoryError> {
        let mut props = AzureBlobStorageTypeProperties {
            connection_string: expand_secure_string(config.connection_string.as_ref())
                .map(SecretOrLiteral::Secret),
            sas_uri: expand_secure_string(config.sas_uri.as_ref()).map(SecretOrLiteral::Secret),
            service_endpoint: non_empty(config.service_endpoint.as_ref()).map(DynamicValue::from),
            account_kind: non_empty(config.storage_kind.as_ref()).map(DynamicValue::from),
            tenant: non_empty(config.tenant_id.as_ref()).map(DynamicValue::from),
            ..Default::default()
        };

        if config.use_managed_identity {
            props.authentication_type = Some(MANAGED_IDENTITY.to_string());
        } else if let Some(id) = non_empty(config.service_principal_id.as_ref()) {
            props.authentication_type = Some(SERVICE_PRINCIPAL.to_string());
            props.service_principal_id = Some(DynamicValue::from(id));
            props.service_principal_key = expand_secure_string(config.service_principal_key.as_ref());
        }

        Ok(LinkedServiceKind::AzureBlobStorage(props))
    }

    fn flatten_type(
        service: &LinkedService,
        common: LinkedServiceCommonConfig,
        prior: Option<&Self::Config>,
    ) -> Result<Self::Config, DataFactoryError> {
        let mut config = AzureBlobStorageLinkedServiceConfig {
            common,
            ..Default::default()
        };

        if let Some(prior) = prior {
            config.connection_string = prior.connection_string.clone();
            config.sas_uri = prior.sas_uri.clone();
            config.service_endpoint = prior.service_endpoint.clone();
            config.service_principal_key = prior.service_principal_key.clone();
        }

        let LinkedServiceKind::AzureBlobStorage(props) = &service.kind else {
            return Ok(config);
        };

        // エンドポイントは平文で返ることがある
        if let Some(endpoint) = flatten_optional_string("service_endpoint", props.service_endpoint.as_ref()) {
            config.service_endpoint = Some(endpoint);
        }

        config.use_managed_identity = props
            .authentication_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(MANAGED_IDENTITY));
        config.service_principal_id =
            flatten_optional_string("service_principal_id", props.service_principal_id.as_ref());
        if config.service_principal_id.is_none() {
            config.service_principal_key = None;
        }
        config.tenant_id = flatten_optional_string("tenant_id", props.tenant.as_ref());
        config.storage_kind = flatten_optional_string("storage_kind", props.account_kind.as_ref());

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::mappings::linked_service::LinkedServices;
    use crate::application::mappings::ResourceMapping;
    use crate::domain::entities::resource_id::FactoryId;
    use serde_json::{json, Map};

    #[test]
    fn test_connection_string_sent_as_secure_string() {
        let config = AzureBlobStorageLinkedServiceConfig {
            connection_string: Some("DefaultEndpointsProtocol=https;AccountName=acct".to_string()),
            ..Default::default()
        };

        let service = LinkedService::new(AzureBlobStorageLinkedService::expand_kind(&config).unwrap());
        assert_eq!(
            serde_json::to_value(&service).unwrap()["typeProperties"],
            json!({
                "connectionString": {
                    "type": "SecureString",
                    "value": "DefaultEndpointsProtocol=https;AccountName=acct"
                }
            })
        );
    }

    #[test]
    fn test_sensitive_values_read_back_from_prior() {
        let config = AzureBlobStorageLinkedServiceConfig {
            sas_uri: Some("https://acct.blob.core.windows.net/?sv=2020&sig=secret".to_string()),
            storage_kind: Some("StorageV2".to_string()),
            ..Default::default()
        };

        let returned: LinkedService = serde_json::from_value(json!({
            "type": "AzureBlobStorage",
            "typeProperties": {
                "sasUri": {"type": "SecureString", "value": "**********"},
                "accountKind": "StorageV2"
            }
        }))
        .unwrap();

        let flattened = AzureBlobStorageLinkedService::flatten_type(
            &returned,
            LinkedServiceCommonConfig::default(),
            Some(&config),
        )
        .unwrap();
        assert_eq!(flattened, config);

        let without_prior = AzureBlobStorageLinkedService::flatten_type(
            &returned,
            LinkedServiceCommonConfig::default(),
            None,
        )
        .unwrap();
        assert_eq!(without_prior.sas_uri, None);
    }

    #[test]
    fn test_managed_identity_with_service_endpoint() {
        let config = AzureBlobStorageLinkedServiceConfig {
            service_endpoint: Some("https://acct.blob.core.windows.net".to_string()),
            use_managed_identity: true,
            ..Default::default()
        };

        let LinkedServiceKind::AzureBlobStorage(props) =
            AzureBlobStorageLinkedService::expand_kind(&config).unwrap()
        else {
            panic!("expected an Azure Blob Storage linked service");
        };
        assert_eq!(props.authentication_type.as_deref(), Some("Msi"));

        let service = LinkedService::new(LinkedServiceKind::AzureBlobStorage(props));
        let flattened = AzureBlobStorageLinkedService::flatten_type(
            &service,
            LinkedServiceCommonConfig::default(),
            None,
        )
        .unwrap();
        assert_eq!(flattened, config);
    }

    #[test]
    fn test_schema_rejects_two_endpoints() {
        let schema = LinkedServices::<AzureBlobStorageLinkedService>::new().schema();
        let mut config = Map::new();
        config.insert("name".to_string(), json!("blob"));
        config.insert(
            "data_factory_id".to_string(),
            json!(FactoryId::new("sub", "rg1", "factory1").to_string()),
        );
        config.insert("connection_string".to_string(), json!("a=b"));
        config.insert("sas_uri".to_string(), json!("https://x"));

        let Err(DataFactoryError::Validation(messages)) = schema.validate(&config) else {
            panic!("expected a validation error");
        };
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("exactly one of"));
    }
}
