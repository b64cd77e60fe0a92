use std::fmt;

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::core::consts::{API_BASE_URL, PLAYER_PAGE_URL};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_url, Validate,
};

#[derive(Clone, Serialize, Deserialize, Parser)]
#[command(name = "sxm-proxy")]
#[command(about = "Proxy server exposing SiriusXM streams to local HLS players")]
pub struct ProxyConfig {
    #[arg(long, env = "SXM_USERNAME")]
    pub username: String,

    #[arg(long, env = "SXM_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, default_value = "8080")]
    pub port: u16,

    #[arg(long, env = "SXM_API_BASE", default_value = API_BASE_URL)]
    pub api_base: String,

    #[arg(long, env = "SXM_PLAYER_URL", default_value = PLAYER_PAGE_URL)]
    pub player_url: String,

    #[arg(long, help = "Write the hydrated web-player config to this file on startup")]
    pub config_dump: Option<String>,

    #[arg(long, help = "Emit JSON log lines")]
    pub log_json: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_base", &self.api_base)
            .field("player_url", &self.player_url)
            .field("config_dump", &self.config_dump)
            .field("log_json", &self.log_json)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl Validate for ProxyConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("username", &self.username)?;
        validate_non_empty_string("password", &self.password)?;
        validate_non_empty_string("host", &self.host)?;
        validate_range("port", self.port, 1, 65535)?;
        validate_url("api_base", &self.api_base)?;
        validate_url("player_url", &self.player_url)?;
        if let Some(path) = &self.config_dump {
            validate_path("config_dump", path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> ProxyConfig {
        ProxyConfig {
            username: "someone@example.com".to_string(),
            password: "hunter2".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            api_base: API_BASE_URL.to_string(),
            player_url: PLAYER_PAGE_URL.to_string(),
            config_dump: None,
            log_json: false,
            verbose: false,
        }
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_credentials() {
        let mut config = sample_config();
        config.username = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = sample_config();
        config.password = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_api_base() {
        let mut config = sample_config();
        config.api_base = "ftp://api.example".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_port_zero() {
        let mut config = sample_config();
        config.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", sample_config());
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("hunter2"));
    }
}
