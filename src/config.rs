use crate::models::ListOrder;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Missing configuration: {0} is not set")]
    Missing(&'static str),
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

pub const KEYS: &[&str] = &[
    "graphql.endpoint",
    "graphql.api-key",
    "graphql.region",
    "auth.client-id",
    "auth.sign-in-url",
    "server.listen",
    "list-order",
];

const VALID_LIST_ORDERS: &[&str] = &["backend", "created"];
const DEFAULT_LISTEN: &str = "127.0.0.1:3000";

fn validate_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let url = reqwest::Url::parse(value)
        .map_err(|e| ConfigError::InvalidConfig(format!("{key} is not a valid URL: {e}")))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidConfig(format!(
            "{key} must use http or https"
        )));
    }
    Ok(())
}

fn validate_listen(value: &str) -> Result<SocketAddr, ConfigError> {
    value.parse().map_err(|_| {
        ConfigError::InvalidConfig(format!(
            "server.listen must be a socket address such as {DEFAULT_LISTEN}"
        ))
    })
}

fn validate_list_order(value: &str) -> Result<ListOrder, ConfigError> {
    ListOrder::from_str(value).map_err(|_| {
        ConfigError::InvalidConfig(format!(
            "list-order must be one of: {}",
            VALID_LIST_ORDERS.join(", ")
        ))
    })
}

fn validate_non_empty(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidConfig(format!("{key} cannot be empty")));
    }
    Ok(())
}

/// Backend connection settings. Field aliases accept the keys of an
/// exported `aws-exports` JSON file as-is. Saving rewrites the file with
/// the canonical field names and drops keys this struct does not know.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default, alias = "aws_appsync_graphqlEndpoint")]
    pub graphql_endpoint: Option<String>,
    #[serde(default, alias = "aws_appsync_apiKey")]
    pub graphql_api_key: Option<String>,
    #[serde(default, alias = "aws_appsync_region")]
    pub graphql_region: Option<String>,
    #[serde(default, alias = "aws_user_pools_web_client_id")]
    pub auth_client_id: Option<String>,
    #[serde(default)]
    pub auth_sign_in_url: Option<String>,
    #[serde(default)]
    pub server_listen: Option<String>,
    #[serde(default)]
    pub list_order: Option<String>,
}

/// Validated settings the server is started with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeSettings {
    pub graphql_endpoint: String,
    pub graphql_api_key: String,
    pub graphql_region: Option<String>,
    pub auth_client_id: String,
    pub auth_sign_in_url: Option<String>,
    pub listen: SocketAddr,
    pub list_order: ListOrder,
}

impl Config {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref endpoint) = self.graphql_endpoint {
            validate_url("graphql.endpoint", endpoint)?;
        }
        if let Some(ref url) = self.auth_sign_in_url {
            validate_url("auth.sign-in-url", url)?;
        }
        if let Some(ref listen) = self.server_listen {
            validate_listen(listen)?;
        }
        if let Some(ref order) = self.list_order {
            validate_list_order(order)?;
        }
        Ok(())
    }

    pub fn serve_settings(&self) -> Result<ServeSettings, ConfigError> {
        self.validate()?;

        let graphql_endpoint = self
            .graphql_endpoint
            .clone()
            .ok_or(ConfigError::Missing("graphql.endpoint"))?;
        let graphql_api_key = self
            .graphql_api_key
            .clone()
            .ok_or(ConfigError::Missing("graphql.api-key"))?;
        let auth_client_id = self
            .auth_client_id
            .clone()
            .ok_or(ConfigError::Missing("auth.client-id"))?;

        Ok(ServeSettings {
            graphql_endpoint,
            graphql_api_key,
            graphql_region: self.graphql_region.clone(),
            auth_client_id,
            auth_sign_in_url: self.auth_sign_in_url.clone(),
            listen: validate_listen(self.server_listen.as_deref().unwrap_or(DEFAULT_LISTEN))?,
            list_order: match self.list_order.as_deref() {
                Some(order) => validate_list_order(order)?,
                None => ListOrder::default(),
            },
        })
    }
}

/// Default config location: `~/.config/trtodo/web.json`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::InvalidConfig("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".config").join("trtodo").join("web.json"))
}

pub struct ConfigManager {
    path: PathBuf,
    config: Config,
}

impl ConfigManager {
    /// Opens the config file at `path` (tilde-expanded) or the default
    /// location. A missing file yields an empty config. Values are not
    /// validated here.
    pub fn new(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).into_owned()),
            None => default_config_path()?,
        };
        let config = Self::load(&path)?;
        Ok(Self { path, config })
    }

    fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }

        // Values are checked by `set` and `serve_settings`, so a bad
        // value can still be fixed with `config set` or `config unset`.
        let config: Config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&self.config)?;
        std::fs::write(&self.path, json)?;

        // Verify the write was successful by reading back
        let contents = std::fs::read_to_string(&self.path)?;
        let _: Config = serde_json::from_str(&contents)?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let config = &self.config;
        match key {
            "graphql.endpoint" => config.graphql_endpoint.clone(),
            "graphql.api-key" => config.graphql_api_key.clone(),
            "graphql.region" => config.graphql_region.clone(),
            "auth.client-id" => config.auth_client_id.clone(),
            "auth.sign-in-url" => config.auth_sign_in_url.clone(),
            "server.listen" => config.server_listen.clone(),
            "list-order" => config.list_order.clone(),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut config = self.config.clone();

        match key {
            "graphql.endpoint" => {
                validate_url(key, value)?;
                config.graphql_endpoint = Some(value.to_string());
            }
            "graphql.api-key" => {
                validate_non_empty(key, value)?;
                config.graphql_api_key = Some(value.to_string());
            }
            "graphql.region" => {
                validate_non_empty(key, value)?;
                config.graphql_region = Some(value.to_string());
            }
            "auth.client-id" => {
                validate_non_empty(key, value)?;
                config.auth_client_id = Some(value.to_string());
            }
            "auth.sign-in-url" => {
                validate_url(key, value)?;
                config.auth_sign_in_url = Some(value.to_string());
            }
            "server.listen" => {
                validate_listen(value)?;
                config.server_listen = Some(value.to_string());
            }
            "list-order" => {
                let order = validate_list_order(value)?;
                config.list_order = Some(order.to_str().to_string());
            }
            _ => {
                return Err(ConfigError::InvalidKey(key.to_string()));
            }
        }
        config.validate()?;
        self.config = config;
        self.save()
    }

    pub fn unset(&mut self, key: &str) -> Result<(), ConfigError> {
        let config = &mut self.config;
        match key {
            "graphql.endpoint" => config.graphql_endpoint = None,
            "graphql.api-key" => config.graphql_api_key = None,
            "graphql.region" => config.graphql_region = None,
            "auth.client-id" => config.auth_client_id = None,
            "auth.sign-in-url" => config.auth_sign_in_url = None,
            "server.listen" => config.server_listen = None,
            "list-order" => config.list_order = None,
            _ => return Err(ConfigError::InvalidKey(key.to_string())),
        }
        self.save()
    }

    /// Every key with its effective value and whether that value is a
    /// built-in default. Unset keys without a default are omitted.
    pub fn list(&self) -> Vec<(String, String, bool)> {
        let mut list = Vec::new();
        for key in KEYS {
            match (self.get(key), default_value(key)) {
                (Some(value), _) => list.push((key.to_string(), value, false)),
                (None, Some(default)) => list.push((key.to_string(), default.to_string(), true)),
                (None, None) => {}
            }
        }
        list
    }
}

fn default_value(key: &str) -> Option<&'static str> {
    match key {
        "server.listen" => Some(DEFAULT_LISTEN),
        "list-order" => Some(ListOrder::default().to_str()),
        _ => None,
    }
}
