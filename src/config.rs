use crate::errors::ConfigError;
use apmec_api::transport::SessionConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the apmec CLI.
///
/// Values come from `~/.apmec/config.ini` with `APMEC_*` environment
/// variables taking precedence. Auth and session parameters are passed
/// through opaquely to the transport.
#[derive(Debug, Clone)]
pub struct Config {
    data: ini::Ini,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = config_dir()?.join("config.ini");
        let data = if config_path.exists() {
            ini::Ini::load_from_file(&config_path)
                .map_err(|e| ConfigError::Ini(e.to_string()))?
        } else {
            ini::Ini::new()
        };
        Ok(Config { data })
    }

    /// Build a config from an already-parsed INI tree.
    pub fn from_ini(data: ini::Ini) -> Self {
        Config { data }
    }

    fn get(&self, env_var: &str, section: &str, key: &str) -> Option<String> {
        if let Ok(value) = std::env::var(env_var) {
            if !value.is_empty() {
                return Some(value);
            }
        }
        self.data
            .get_from(Some(section), key)
            .map(|s| s.to_string())
    }

    /// Endpoint URL of the orchestration service. Required.
    pub fn endpoint_url(&self) -> Result<String, ConfigError> {
        self.get("APMEC_ENDPOINT_URL", "api", "endpoint_url")
            .ok_or_else(|| {
                ConfigError::Missing(
                    "endpoint URL (APMEC_ENDPOINT_URL or [api] endpoint_url)".to_string(),
                )
            })
    }

    /// Pre-acquired auth token, if any.
    pub fn token(&self) -> Option<String> {
        self.get("APMEC_TOKEN", "api", "token")
    }

    /// API version to talk; only 1.0 is registered.
    pub fn api_version(&self) -> String {
        self.get("APMEC_API_VERSION", "api", "version")
            .unwrap_or_else(|| apmec_api::DEFAULT_API_VERSION.to_string())
    }

    /// Retry count for idempotent requests.
    pub fn retries(&self) -> Result<u32, ConfigError> {
        match self.get("APMEC_RETRIES", "api", "retries") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                field: "retries".to_string(),
                value,
            }),
            None => Ok(0),
        }
    }

    /// Skip server certificate validation.
    pub fn insecure(&self) -> bool {
        matches!(
            self.get("APMEC_INSECURE", "api", "insecure").as_deref(),
            Some("1") | Some("true") | Some("True")
        )
    }

    /// SSL CA bundle file.
    pub fn ca_cert(&self) -> Option<PathBuf> {
        self.get("APMEC_CA_CERT", "api", "ca_cert").map(PathBuf::from)
    }

    /// Socket timeout in seconds.
    pub fn timeout(&self) -> Result<Option<Duration>, ConfigError> {
        match self.get("APMEC_TIMEOUT", "api", "timeout") {
            Some(value) => {
                let secs: u64 = value.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "timeout".to_string(),
                    value,
                })?;
                Ok(Some(Duration::from_secs(secs)))
            }
            None => Ok(None),
        }
    }

    /// Assemble the session parameters for the transport.
    pub fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        Ok(SessionConfig {
            endpoint_url: self.endpoint_url()?,
            token: self.token(),
            timeout: self.timeout()?,
            insecure: self.insecure(),
            ca_cert: self.ca_cert(),
        })
    }
}

fn config_dir() -> Result<PathBuf, ConfigError> {
    let home_dir = home::home_dir()
        .ok_or_else(|| ConfigError::Missing("home directory".to_string()))?;
    Ok(home_dir.join(".apmec"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ini_config(content: &str) -> Config {
        Config::from_ini(ini::Ini::load_from_str(content).unwrap())
    }

    #[test]
    fn endpoint_url_is_required() {
        let config = ini_config("");
        assert!(config.endpoint_url().is_err());
    }

    #[test]
    fn values_come_from_ini_sections() {
        let config = ini_config(
            "[api]\nendpoint_url = http://mec.example:9896\nretries = 3\ninsecure = true\n",
        );
        assert_eq!(config.endpoint_url().unwrap(), "http://mec.example:9896");
        assert_eq!(config.retries().unwrap(), 3);
        assert!(config.insecure());
    }

    #[test]
    fn env_overrides_ini_values() {
        std::env::set_var("APMEC_TOKEN", "tok-env");
        let config = ini_config("[api]\ntoken = tok-file\n");
        assert_eq!(config.token().as_deref(), Some("tok-env"));
        std::env::remove_var("APMEC_TOKEN");
    }

    #[test]
    fn api_version_defaults_to_1_0() {
        let config = ini_config("");
        assert_eq!(config.api_version(), "1.0");
    }

    #[test]
    fn invalid_retries_is_rejected() {
        let config = ini_config("[api]\nretries = lots\n");
        assert!(config.retries().is_err());
    }

    #[test]
    fn timeout_parses_seconds() {
        let config = ini_config("[api]\ntimeout = 30\n");
        assert_eq!(config.timeout().unwrap(), Some(Duration::from_secs(30)));
    }
}
