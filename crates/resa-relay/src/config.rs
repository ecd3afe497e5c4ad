use std::env;

use tracing::info;

use crate::constants::WEBHOOK_URL_VAR;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelayConfig {
    webhook_url: Option<String>,
}

impl RelayConfig {
    /// Blank URLs count as missing.
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            webhook_url: webhook_url
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
        }
    }

    pub fn from_env() -> Self {
        let config = Self::new(env::var(WEBHOOK_URL_VAR).ok());
        if config.webhook_url.is_none() {
            info!("{WEBHOOK_URL_VAR} not set, booking requests will be refused");
        }
        config
    }

    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook_url.as_deref()
    }
}
