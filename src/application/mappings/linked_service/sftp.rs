//! # SFTP Linked Service

use log::debug;
use serde_json::Value;

use super::{expand_secure_string, LinkedServiceMapping};
use crate::application::dto::linked_service::{LinkedServiceCommonConfig, SftpLinkedServiceConfig};
use crate::application::mappings::non_empty;
use crate::domain::entities::dynamic_value::{flatten_optional_string, DynamicValue};
use crate::domain::entities::linked_service::{LinkedService, LinkedServiceKind, SftpTypeProperties};
use crate::domain::errors::DataFactoryError;
use crate::domain::schema::{Attribute, Validation};

const SSH_PUBLIC_KEY: &str = "SshPublicKey";
const AUTHENTICATION_TYPES: &[&str] = &["Basic", "MultiFactor", SSH_PUBLIC_KEY];

/// `azurerm_data_factory_linked_service_sftp`
pub struct SftpLinkedService;

impl LinkedServiceMapping for SftpLinkedService {
    type Config = SftpLinkedServiceConfig;

    const TYPE_NAME: &'static str = "azurerm_data_factory_linked_service_sftp";
    const API_TYPE: &'static str = "Sftp";

    fn common(config: &Self::Config) -> &LinkedServiceCommonConfig {
        &config.common
    }

    fn attributes() -> Vec<Attribute> {
        vec![
            Attribute::string("authentication_type")
                .required()
                .validate(Validation::one_of(AUTHENTICATION_TYPES)),
            Attribute::string("host")
                .required()
                .validate(Validation::NotEmpty),
            Attribute::int("port")
                .required()
                .validate(Validation::IntBetween(1, 65535)),
            Attribute::string("username")
                .required()
                .validate(Validation::NotEmpty),
            Attribute::string("password")
                .optional()
                .sensitive()
                .validate(Validation::NotEmpty),
            Attribute::bool("skip_host_key_validation")
                .optional()
                .default_value(false),
            Attribute::string("host_key_fingerprint").optional(),
            Attribute::string("private_key_content_base64")
                .optional()
                .sensitive()
                .validate(Validation::NotEmpty)
                .conflicts_with(&["private_key_path"]),
            Attribute::string("private_key_path")
                .optional()
                .validate(Validation::NotEmpty)
                .conflicts_with(&["private_key_content_base64"]),
            Attribute::string("private_key_passphrase")
                .optional()
                .sensitive(),
        ]
    }

    fn validate(config: &Self::Config) -> Result<(), DataFactoryError> {
        let mut diagnostics = Vec::new();

        let public_key = config.authentication_type == SSH_PUBLIC_KEY;
        let content = non_empty(config.private_key_content_base64.as_ref());
        let path = non_empty(config.private_key_path.as_ref());

        if !public_key && config.password.is_empty() {
            diagnostics.push(format!(
                "\"password\" is required when \"authentication_type\" is {:?}",
                config.authentication_type
            ));
        }
        if public_key && content.is_some() == path.is_some() {
            diagnostics.push(
                "exactly one of \"private_key_content_base64\", \"private_key_path\" must be specified when \"authentication_type\" is \"SshPublicKey\""
                    .to_string(),
            );
        }
        if !public_key && (content.is_some() || path.is_some()) {
            diagnostics.push(format!(
                "private key attributes require \"authentication_type\" \"SshPublicKey\", got {:?}",
                config.authentication_type
            ));
        }
        if !config.skip_host_key_validation && non_empty(config.host_key_fingerprint.as_ref()).is_none() {
            diagnostics.push(
                "\"host_key_fingerprint\" is required unless \"skip_host_key_validation\" is true"
                    .to_string(),
            );
        }

        if diagnostics.is_empty() {
            Ok(())
        } else {
            Err(DataFactoryError::Validation(diagnostics))
        }
    }

    fn expand_kind(config: &Self::Config) -> Result<LinkedServiceKind, DataFactoryError> {
        Ok(LinkedServiceKind::Sftp(SftpTypeProperties {
            host: Some(DynamicValue::from(config.host.as_str())),
            port: Some(Value::from(config.port)),
            authentication_type: Some(config.authentication_type.clone()),
            user_name: Some(DynamicValue::from(config.username.as_str())),
            password: expand_secure_string(Some(&config.password)),
            skip_host_key_validation: Some(DynamicValue::Bool(config.skip_host_key_validation)),
            host_key_fingerprint: non_empty(config.host_key_fingerprint.as_ref()).map(DynamicValue::from),
            private_key_content: expand_secure_string(config.private_key_content_base64.as_ref()),
            private_key_path: non_empty(config.private_key_path.as_ref()).map(DynamicValue::from),
            pass_phrase: expand_secure_string(config.private_key_passphrase.as_ref()),
        }))
    }

    fn flatten_type(
        service: &LinkedService,
        common: LinkedServiceCommonConfig,
        prior: Option<&Self::Config>,
    ) -> Result<Self::Config, DataFactoryError> {
        let prior_port = prior.map(|p| p.port).unwrap_or_default();
        let mut config = SftpLinkedServiceConfig {
            common,
            password: prior.map(|p| p.password.clone()).unwrap_or_default(),
            private_key_content_base64: prior.and_then(|p| p.private_key_content_base64.clone()),
            private_key_passphrase: prior.and_then(|p| p.private_key_passphrase.clone()),
            port: prior_port,
            ..Default::default()
        };

        let LinkedServiceKind::Sftp(props) = &service.kind else {
            return Ok(config);
        };

        config.authentication_type = props.authentication_type.clone().unwrap_or_default();
        config.host = flatten_optional_string("host", props.host.as_ref()).unwrap_or_default();
        config.username = flatten_optional_string("username", props.user_name.as_ref()).unwrap_or_default();
        config.port = flatten_port(props.port.as_ref()).unwrap_or(prior_port);
        config.skip_host_key_validation = props
            .skip_host_key_validation
            .as_ref()
            .and_then(|v| v.flatten_bool("skip_host_key_validation"))
            .unwrap_or(false);
        config.host_key_fingerprint =
            flatten_optional_string("host_key_fingerprint", props.host_key_fingerprint.as_ref());
        config.private_key_path =
            flatten_optional_string("private_key_path", props.private_key_path.as_ref());

        Ok(config)
    }
}

/// ポートは数値または数値の文字列で返る
fn flatten_port(port: Option<&Value>) -> Option<i64> {
    match port? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        other => {
            debug!("Skipping \"port\" since it's not a number (got {})", other);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> SftpLinkedServiceConfig {
        SftpLinkedServiceConfig {
            authentication_type: "Basic".to_string(),
            host: "sftp.example.com".to_string(),
            port: 22,
            username: "loader".to_string(),
            password: "secret".to_string(),
            skip_host_key_validation: false,
            host_key_fingerprint: Some("ssh-rsa 2048 aa:bb".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_round_trip_reads_password_from_prior() {
        let config = config();
        let service = LinkedService::new(SftpLinkedService::expand_kind(&config).unwrap());

        let rendered = serde_json::to_value(&service).unwrap();
        assert_eq!(rendered["typeProperties"]["port"], 22);
        assert_eq!(rendered["typeProperties"]["password"]["type"], "SecureString");

        let flattened =
            SftpLinkedService::flatten_type(&service, LinkedServiceCommonConfig::default(), Some(&config))
                .unwrap();
        assert_eq!(flattened, config);
    }

    #[test]
    fn test_port_as_expression_falls_back_to_prior() {
        let returned: LinkedService = serde_json::from_value(json!({
            "type": "Sftp",
            "typeProperties": {
                "host": "sftp.example.com",
                "port": {"value": "@linkedService().port", "type": "Expression"},
                "authenticationType": "Basic",
                "userName": "loader",
                "skipHostKeyValidation": "true"
            }
        }))
        .unwrap();

        let flattened = SftpLinkedService::flatten_type(
            &returned,
            LinkedServiceCommonConfig::default(),
            Some(&config()),
        )
        .unwrap();
        assert_eq!(flattened.port, 22);
        assert!(flattened.skip_host_key_validation);
        assert_eq!(flatten_port(Some(&json!("2222"))), Some(2222));
    }

    #[test]
    fn test_validate_requires_password_and_fingerprint() {
        let mut config = config();
        assert!(SftpLinkedService::validate(&config).is_ok());

        config.password.clear();
        config.host_key_fingerprint = None;
        let Err(DataFactoryError::Validation(messages)) = SftpLinkedService::validate(&config) else {
            panic!("expected a validation error");
        };
        assert_eq!(messages.len(), 2);

        config.authentication_type = "SshPublicKey".to_string();
        config.skip_host_key_validation = true;
        config.private_key_path = Some("/keys/loader".to_string());
        assert!(SftpLinkedService::validate(&config).is_ok());
    }

    fn public_key_config() -> SftpLinkedServiceConfig {
        SftpLinkedServiceConfig {
            authentication_type: "SshPublicKey".to_string(),
            password: String::new(),
            skip_host_key_validation: true,
            host_key_fingerprint: None,
            private_key_content_base64: Some("LS0tLS1CRUdJTi0tLS0t".to_string()),
            private_key_passphrase: Some("hunter2".to_string()),
            ..config()
        }
    }

    #[test]
    fn test_public_key_requires_key_material() {
        let mut config = public_key_config();
        config.private_key_content_base64 = None;
        let Err(DataFactoryError::Validation(messages)) = SftpLinkedService::validate(&config) else {
            panic!("expected a validation error");
        };
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("private_key_content_base64"));

        config.private_key_content_base64 = Some("LS0t".to_string());
        config.private_key_path = Some("/keys/loader".to_string());
        assert!(SftpLinkedService::validate(&config).is_err());
    }

    #[test]
    fn test_private_key_needs_public_key_authentication() {
        let mut config = config();
        config.private_key_path = Some("/keys/loader".to_string());
        assert!(SftpLinkedService::validate(&config).is_err());
    }

    #[test]
    fn test_public_key_round_trip_reads_secrets_from_prior() {
        let config = public_key_config();
        assert!(SftpLinkedService::validate(&config).is_ok());

        let service = LinkedService::new(SftpLinkedService::expand_kind(&config).unwrap());
        let rendered = serde_json::to_value(&service).unwrap();
        let props = &rendered["typeProperties"];
        assert_eq!(props["authenticationType"], "SshPublicKey");
        assert_eq!(props["privateKeyContent"]["type"], "SecureString");
        assert_eq!(props["privateKeyContent"]["value"], "LS0tLS1CRUdJTi0tLS0t");
        assert_eq!(props["passPhrase"]["type"], "SecureString");
        assert!(props.get("password").is_none());

        // API は秘密鍵とパスフレーズを返さない
        let returned: LinkedService = serde_json::from_value(json!({
            "type": "Sftp",
            "typeProperties": {
                "host": "sftp.example.com",
                "port": 22,
                "authenticationType": "SshPublicKey",
                "userName": "loader",
                "skipHostKeyValidation": true
            }
        }))
        .unwrap();
        let flattened =
            SftpLinkedService::flatten_type(&returned, LinkedServiceCommonConfig::default(), Some(&config))
                .unwrap();
        assert_eq!(flattened, config);
    }
}
