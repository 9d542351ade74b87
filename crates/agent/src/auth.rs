use carta_core::config::BedrockConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{error, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    ApiKey,
    None,
}

impl AuthMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ApiKey => "api_key",
            Self::None => "none",
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ModelInfo {
    pub model_id: String,
    pub region: String,
    pub auth_method: AuthMethod,
    pub authenticated: bool,
}

/// Credential handling for the Bedrock runtime.
///
/// Only API-key (bearer) auth is supported; `authenticate` verifies that a
/// key is configured and reports failure otherwise so the service can start
/// degraded instead of crashing.
#[derive(Clone, Debug)]
pub struct BedrockAuth {
    config: BedrockConfig,
    authenticated: bool,
}

impl BedrockAuth {
    pub fn new(config: BedrockConfig) -> Self {
        Self { config, authenticated: false }
    }

    pub fn auth_method(&self) -> AuthMethod {
        match &self.config.api_key {
            Some(key) if !key.expose_secret().trim().is_empty() => AuthMethod::ApiKey,
            _ => AuthMethod::None,
        }
    }

    pub fn authenticate(&mut self) -> bool {
        let method = self.auth_method();
        info!(auth_method = method.as_str(), "attempting bedrock authentication");

        match method {
            AuthMethod::ApiKey => {
                self.authenticated = true;
                info!(
                    model_id = %self.config.model_id,
                    region = %self.config.region,
                    "bedrock credentials configured"
                );
                true
            }
            AuthMethod::None => {
                error!(
                    "no bedrock credentials configured; set AWS_BEARER_TOKEN_BEDROCK or CARTA_BEDROCK_API_KEY"
                );
                false
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn model_id(&self) -> &str {
        &self.config.model_id
    }

    pub fn region(&self) -> &str {
        &self.config.region
    }

    pub fn api_key(&self) -> Option<&SecretString> {
        self.config.api_key.as_ref()
    }

    pub fn model_info(&self) -> ModelInfo {
        ModelInfo {
            model_id: self.config.model_id.clone(),
            region: self.config.region.clone(),
            auth_method: self.auth_method(),
            authenticated: self.authenticated,
        }
    }
}

#[cfg(test)]
mod tests {
    use carta_core::config::BedrockConfig;

    use super::{AuthMethod, BedrockAuth};

    fn config(api_key: Option<&str>) -> BedrockConfig {
        BedrockConfig {
            model_id: "us.amazon.nova-pro-v1:0".to_string(),
            region: "us-west-2".to_string(),
            api_key: api_key.map(|key| key.to_string().into()),
        }
    }

    #[test]
    fn authentication_succeeds_with_an_api_key() {
        let mut auth = BedrockAuth::new(config(Some("bedrock-key")));
        assert_eq!(auth.auth_method(), AuthMethod::ApiKey);
        assert!(auth.authenticate());
        assert!(auth.is_authenticated());
    }

    #[test]
    fn authentication_fails_without_credentials() {
        let mut auth = BedrockAuth::new(config(None));
        assert_eq!(auth.auth_method(), AuthMethod::None);
        assert!(!auth.authenticate());
        assert!(!auth.is_authenticated());
    }

    #[test]
    fn blank_api_key_counts_as_no_credentials() {
        let mut auth = BedrockAuth::new(config(Some("   ")));
        assert_eq!(auth.auth_method(), AuthMethod::None);
        assert!(!auth.authenticate());
    }

    #[test]
    fn model_info_reports_configuration() {
        let mut auth = BedrockAuth::new(config(Some("bedrock-key")));
        auth.authenticate();

        let info = auth.model_info();
        assert_eq!(info.model_id, "us.amazon.nova-pro-v1:0");
        assert_eq!(info.region, "us-west-2");
        assert_eq!(info.auth_method, AuthMethod::ApiKey);
        assert!(info.authenticated);
    }
}
