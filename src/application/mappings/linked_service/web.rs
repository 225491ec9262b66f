//! # Web Linked Service

use super::{expand_secure_string, LinkedServiceMapping};
use crate::application::dto::linked_service::{LinkedServiceCommonConfig, WebLinkedServiceConfig};
use crate::application::mappings::non_empty;
use crate::domain::entities::dynamic_value::{flatten_optional_string, DynamicValue};
use crate::domain::entities::linked_service::{LinkedService, LinkedServiceKind, WebTypeProperties};
use crate::domain::errors::DataFactoryError;
use crate::domain::schema::{Attribute, Validation};

const AUTHENTICATION_TYPES: &[&str] = &["Anonymous", "Basic", "ClientCertificate"];

/// `azurerm_data_factory_linked_service_web`
pub struct WebLinkedService;

impl LinkedServiceMapping for WebLinkedService {
    type Config = WebLinkedServiceConfig;

    const TYPE_NAME: &'static str = "azurerm_data_factory_linked_service_web";
    const API_TYPE: &'static str = "Web";

    fn common(config: &Self::Config) -> &LinkedServiceCommonConfig {
        &config.common
    }

    fn attributes() -> Vec<Attribute> {
        vec![
            Attribute::string("authentication_type")
                .required()
                .validate(Validation::one_of(AUTHENTICATION_TYPES)),
            Attribute::string("url")
                .required()
                .validate(Validation::NotEmpty),
            Attribute::string("username").optional(),
            Attribute::string("password").optional().sensitive(),
        ]
    }

    fn validate(config: &Self::Config) -> Result<(), DataFactoryError> {
        if config.authentication_type != "Basic" {
            return Ok(());
        }

        let missing: Vec<String> = [("username", &config.username), ("password", &config.password)]
            .into_iter()
            .filter(|(_, value)| non_empty(value.as_ref()).is_none())
            .map(|(name, _)| format!("{:?} is required when \"authentication_type\" is \"Basic\"", name))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DataFactoryError::Validation(missing))
        }
    }

    fn expand_kind(config: &Self::Config) -> Result<LinkedServiceKind, DataFactoryError> {
        Ok(LinkedServiceKind::Web(WebTypeProperties {
            url: Some(DynamicValue::from(config.url.as_str())),
            authentication_type: Some(config.authentication_type.clone()),
            username: non_empty(config.username.as_ref()).map(DynamicValue::from),
            password: expand_secure_string(config.password.as_ref()),
        }))
    }

    fn flatten_type(
        service: &LinkedService,
        common: LinkedServiceCommonConfig,
        prior: Option<&Self::Config>,
    ) -> Result<Self::Config, DataFactoryError> {
        let mut config = WebLinkedServiceConfig {
            common,
            password: prior.and_then(|p| p.password.clone()),
            ..Default::default()
        };

        if let LinkedServiceKind::Web(props) = &service.kind {
            config.url = flatten_optional_string("url", props.url.as_ref()).unwrap_or_default();
            config.authentication_type = props.authentication_type.clone().unwrap_or_default();
            config.username = flatten_optional_string("username", props.username.as_ref());
        }

        Ok(config)
    }
}
