use std::sync::Arc;

use carta_agent::ShoppingAssistant;
use carta_core::config::{AppConfig, ConfigError, LoadOptions};
use thiserror::Error;
use tracing::{info, warn};

pub struct Application {
    pub config: AppConfig,
    pub assistant: Arc<ShoppingAssistant>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("http client construction failed: {0}")]
    HttpClient(#[source] reqwest::Error),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!("starting shopping assistant chatbot service");

    let mut assistant = ShoppingAssistant::new(&config).map_err(BootstrapError::HttpClient)?;

    if assistant.initialize().await {
        info!("shopping assistant initialized");
    } else {
        // Keep serving: the chat endpoint answers with a degraded response
        // until credentials are fixed and the process restarted.
        warn!("shopping assistant failed to initialize; serving degraded responses");
    }

    Ok(Application { config, assistant: Arc::new(assistant) })
}
