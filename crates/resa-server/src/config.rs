use std::{env, fmt::Display, str::FromStr};

use resa_relay::RelayConfig;
use tracing::{info, warn};

pub const PORT_VAR: &str = "RESA_PORT";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub relay: RelayConfig,
}

impl ServerConfig {
    pub fn load() -> Self {
        Self {
            port: try_load(PORT_VAR, DEFAULT_PORT),
            relay: RelayConfig::from_env(),
        }
    }
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}
