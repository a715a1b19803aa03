use std::{env, net::SocketAddr, path::PathBuf, str::FromStr};
use thiserror::Error;

pub const DEFAULT_CATALOG_PATH: &str = "data/memes.json";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_IMGFLIP_API_URL: &str = "https://api.imgflip.com";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid environment variable format for {0}: {1}")]
    InvalidVar(String, String),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Template catalog, relative to the working directory unless absolute.
    pub catalog_path: PathBuf,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub imgflip_api_url: String,
    pub imgflip_username: String,
    pub imgflip_password: String,
    pub memes_table_name: String,
    pub counters_table_name: String,
    pub aws_region: String,
    /// `AWS_ENDPOINT_URL`, set when running against LocalStack.
    pub localstack_endpoint: Option<String>,
}

impl Config {
    /// Reads `.env` (if any) and then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let bind_address_str = var_or("BIND_ADDRESS", "0.0.0.0:3000");
        let bind_address = SocketAddr::from_str(&bind_address_str)
            .map_err(|e| ConfigError::InvalidVar("BIND_ADDRESS".into(), e.to_string()))?;

        let openai_api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".into()))?;

        // Imgflip credentials are not validated; a missing pair surfaces as a
        // render failure on the first request.
        Ok(Config {
            bind_address,
            catalog_path: PathBuf::from(var_or("CATALOG_PATH", DEFAULT_CATALOG_PATH)),
            openai_api_key,
            openai_base_url: var_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            openai_model: var_or("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            imgflip_api_url: var_or("IMGFLIP_API_URL", DEFAULT_IMGFLIP_API_URL),
            imgflip_username: var_or("IMGFLIP_USERNAME", ""),
            imgflip_password: var_or("IMGFLIP_PASSWORD", ""),
            memes_table_name: var_or("MEMES_TABLE_NAME", "generated_memes"),
            counters_table_name: var_or("COUNTERS_TABLE_NAME", "meme_counters"),
            aws_region: var_or("AWS_DEFAULT_REGION", "ca-central-1"),
            localstack_endpoint: lookup("AWS_ENDPOINT_URL"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_api_key_is_set() {
        let config = Config::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.catalog_path, PathBuf::from(DEFAULT_CATALOG_PATH));
        assert_eq!(config.openai_model, DEFAULT_OPENAI_MODEL);
        assert_eq!(config.imgflip_username, "");
        assert_eq!(config.memes_table_name, "generated_memes");
        assert!(config.localstack_endpoint.is_none());
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ref v) if v == "OPENAI_API_KEY"));
    }

    #[test]
    fn bad_bind_address_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("BIND_ADDRESS", "not-an-address"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar(ref v, _) if v == "BIND_ADDRESS"));
    }

    #[test]
    fn overrides_are_honoured() {
        let config = Config::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("CATALOG_PATH", "/srv/memes.json"),
            ("IMGFLIP_USERNAME", "bob"),
            ("AWS_ENDPOINT_URL", "http://localhost:4566"),
        ]))
        .unwrap();
        assert_eq!(config.catalog_path, PathBuf::from("/srv/memes.json"));
        assert_eq!(config.imgflip_username, "bob");
        assert_eq!(config.localstack_endpoint.as_deref(), Some("http://localhost:4566"));
    }
}
