//! # Credential Mappings
//!
//! ユーザー割り当てマネージドIDとサービスプリンシパルの Credential

use super::{
    annotations_attribute, data_factory_id_attribute, description_attribute,
    expand_key_vault_secret, flatten_factory_id, flatten_key_vault_secret, key_vault_secret_schema,
    name_attribute, non_empty, unexpected_type, ResourceMapping,
};
use crate::application::dto::credential::{
    CredentialCommonConfig, ServicePrincipalCredentialConfig, UserManagedIdentityCredentialConfig,
};
use crate::domain::entities::credential::{
    Credential, CredentialKind, ManagedIdentityTypeProperties, ServicePrincipalTypeProperties,
};
use crate::domain::entities::dynamic_value::{flatten_optional_string, DynamicValue};
use crate::domain::entities::resource_id::{ChildKind, ChildResourceId, FactoryId};
use crate::domain::errors::DataFactoryError;
use crate::domain::schema::{Attribute, Schema, Validation};
use crate::domain::services::diff_suppress::DiffSuppression;
use crate::domain::services::field_mapping::FieldMapping;

fn common_attributes() -> Vec<Attribute> {
    vec![
        name_attribute(),
        data_factory_id_attribute(),
        description_attribute(),
        annotations_attribute(),
    ]
}

fn expand_common(common: &CredentialCommonConfig, kind: CredentialKind) -> Credential {
    let mut credential = Credential::new(kind);
    credential.description = non_empty(common.description.as_ref()).map(str::to_string);
    credential.annotations = FieldMapping::expand_annotations(&common.annotations);
    credential
}

fn flatten_common(
    id: &ChildResourceId,
    credential: &Credential,
    prior: Option<&CredentialCommonConfig>,
) -> CredentialCommonConfig {
    CredentialCommonConfig {
        name: id.name.clone(),
        data_factory_id: flatten_factory_id(&id.factory, prior.map(|p| p.data_factory_id.as_str())),
        description: credential.description.clone(),
        annotations: FieldMapping::flatten_annotations(credential.annotations.as_ref()),
    }
}

/// `azurerm_data_factory_credential_user_managed_identity`
#[derive(Debug, Default)]
pub struct UserManagedIdentityCredential;

impl ResourceMapping for UserManagedIdentityCredential {
    type Config = UserManagedIdentityCredentialConfig;
    type Model = Credential;

    fn type_name(&self) -> &'static str {
        "azurerm_data_factory_credential_user_managed_identity"
    }

    fn kind(&self) -> ChildKind {
        ChildKind::Credential
    }

    fn schema(&self) -> Schema {
        Schema::new(common_attributes()).with(vec![Attribute::string("identity_id")
            .required()
            .force_new()
            .validate(Validation::NotEmpty)
            .diff_suppress(DiffSuppression::case_insensitive)
            .describe("The resource ID of the User Assigned Managed Identity.")])
    }

    fn expand(
        &self,
        config: &Self::Config,
        _factory: &FactoryId,
    ) -> Result<Credential, DataFactoryError> {
        Ok(expand_common(
            &config.common,
            CredentialKind::ManagedIdentity(ManagedIdentityTypeProperties {
                resource_id: Some(config.identity_id.clone()),
            }),
        ))
    }

    fn flatten(
        &self,
        id: &ChildResourceId,
        credential: &Credential,
        prior: Option<&Self::Config>,
    ) -> Result<Self::Config, DataFactoryError> {
        let CredentialKind::ManagedIdentity(props) = &credential.kind else {
            return Err(unexpected_type("ManagedIdentity", credential.kind.type_name()));
        };

        Ok(UserManagedIdentityCredentialConfig {
            common: flatten_common(id, credential, prior.map(|p| &p.common)),
            identity_id: props.resource_id.clone().unwrap_or_default(),
        })
    }
}

/// `azurerm_data_factory_credential_service_principal`
#[derive(Debug, Default)]
pub struct ServicePrincipalCredential;

impl ResourceMapping for ServicePrincipalCredential {
    type Config = ServicePrincipalCredentialConfig;
    type Model = Credential;

    fn type_name(&self) -> &'static str {
        "azurerm_data_factory_credential_service_principal"
    }

    fn kind(&self) -> ChildKind {
        ChildKind::Credential
    }

    fn schema(&self) -> Schema {
        Schema::new(common_attributes()).with(vec![
            Attribute::string("tenant_id")
                .required()
                .validate(Validation::NotEmpty),
            Attribute::string("service_principal_id")
                .required()
                .validate(Validation::NotEmpty),
            Attribute::block("service_principal_key", key_vault_secret_schema()).optional(),
        ])
    }

    fn expand(
        &self,
        config: &Self::Config,
        _factory: &FactoryId,
    ) -> Result<Credential, DataFactoryError> {
        Ok(expand_common(
            &config.common,
            CredentialKind::ServicePrincipal(ServicePrincipalTypeProperties {
                service_principal_id: Some(DynamicValue::from(config.service_principal_id.as_str())),
                tenant: Some(DynamicValue::from(config.tenant_id.as_str())),
                service_principal_key: config
                    .service_principal_key
                    .as_ref()
                    .map(expand_key_vault_secret),
            }),
        ))
    }

    fn flatten(
        &self,
        id: &ChildResourceId,
        credential: &Credential,
        prior: Option<&Self::Config>,
    ) -> Result<Self::Config, DataFactoryError> {
        let CredentialKind::ServicePrincipal(props) = &credential.kind else {
            return Err(unexpected_type("ServicePrincipal", credential.kind.type_name()));
        };

        Ok(ServicePrincipalCredentialConfig {
            common: flatten_common(id, credential, prior.map(|p| &p.common)),
            tenant_id: flatten_optional_string("tenant_id", props.tenant.as_ref()).unwrap_or_default(),
            service_principal_id: flatten_optional_string(
                "service_principal_id",
                props.service_principal_id.as_ref(),
            )
            .unwrap_or_default(),
            service_principal_key: flatten_key_vault_secret(props.service_principal_key.as_ref()),
        })
    }
}
