use crate::{DEFAULT_RPC_URL, DEFAULT_SERVER_URL};
use crate::error::config::ConfigError;

use common::ErrorLocation;
use models::Address;

use std::env;
use std::panic::Location;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use url::Url;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_VERSION: u32 = 1;

/// Directory name under the platform config and data directories.
pub const APP_DIR_NAME: &str = "snake";
/// Overrides `server.url`.
pub const SERVER_URL_ENV: &str = "SNAKE_SERVER_URL";
/// Overrides `signer.program` and `signer.args`, whitespace separated.
pub const SIGNER_ENV: &str = "SNAKE_SIGNER";
/// Wallet helper used when none is configured.
pub const DEFAULT_SIGNER_PROGRAM: &str = "snake-wallet";
/// Overrides `balance.rpc_url`.
pub const RPC_URL_ENV: &str = "SNAKE_RPC_URL";
/// SnakeCoin deployment on the local development chain.
pub const DEFAULT_TOKEN_CONTRACT: &str = "0x9078f6C05508EEf46F1c390e50Aca47b66dB1069";

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_server_url")]
    pub url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    /// Directory holding `session.json`. Platform data dir when unset.
    pub directory_override: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignerConfig {
    #[serde(default = "default_signer_program")]
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            program: default_signer_program(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceConfig {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Token contract queried with `balanceOf`. `None` skips the lookup.
    #[serde(default = "default_token_contract")]
    pub contract: Option<String>,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            contract: default_token_contract(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub signer: SignerConfig,

    #[serde(default)]
    pub balance: BalanceConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: ServerConfig::default(),
            session: SessionConfig::default(),
            signer: SignerConfig::default(),
            balance: BalanceConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}
fn default_signer_program() -> String {
    DEFAULT_SIGNER_PROGRAM.to_string()
}
fn default_rpc_url() -> String {
    DEFAULT_RPC_URL.to_string()
}
fn default_token_contract() -> Option<String> {
    Some(DEFAULT_TOKEN_CONTRACT.to_string())
}

/// `{platform config dir}/snake`.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| ConfigError::DirectoryNotFound {
            location: ErrorLocation::from(Location::caller()),
        })
}

/// `{platform local data dir}/snake`.
pub fn default_data_dir() -> Result<PathBuf, ConfigError> {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| ConfigError::DirectoryNotFound {
            location: ErrorLocation::from(Location::caller()),
        })
}

/// Load a `.env` file from the working directory, if there is one.
///
/// Returns the path that was loaded.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            info!("Loaded .env from: {:?}", path);
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            warn!("Failed to parse .env: {}", e);
            None
        }
    }
}

// ============================================
// IMPLEMENTATION
// ============================================

impl ClientConfig {
    /// Load config from {config_dir}/config.json.
    ///
    /// # Returns
    ///
    /// Returns defaults if the file is missing.
    /// Returns `Err(ConfigError)` if the file exists but is corrupted or invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::ReadError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        let config: ClientConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/config.json using temp file + rename.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation, directory creation, serialization,
    /// write or rename fails.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{}.tmp", CONFIG_FILE_NAME));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Apply `SNAKE_SERVER_URL`, `SNAKE_SIGNER` and `SNAKE_RPC_URL` from the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EnvironmentError`] if a variable is set but blank or
    /// not unicode, or [`ConfigError::ValidationError`] if the result is invalid.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(url) = read_env(SERVER_URL_ENV)? {
            info!("Using {} override: {}", SERVER_URL_ENV, url);
            self.server.url = url;
        }

        if let Some(command) = read_env(SIGNER_ENV)? {
            let mut parts = command.split_whitespace().map(str::to_string);
            // read_env rejects blank values, so there is at least one part.
            if let Some(program) = parts.next() {
                info!("Using {} override: {}", SIGNER_ENV, program);
                self.signer.program = program;
                self.signer.args = parts.collect();
            }
        }

        if let Some(url) = read_env(RPC_URL_ENV)? {
            info!("Using {} override: {}", RPC_URL_ENV, url);
            self.balance.rpc_url = url;
        }

        self.validate()
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid version: {} (expected 1-{})",
                    self.version, CONFIG_VERSION
                ),
            });
        }

        self.server_url()?;

        if self.signer.program.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "signer.program cannot be empty".to_string(),
            });
        }

        if let Some(ref dir) = self.session.directory_override {
            if dir.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    location: ErrorLocation::from(Location::caller()),
                    reason: "session.directory_override cannot be empty string".to_string(),
                });
            }
        }

        self.rpc_url()?;
        self.token_contract()?;

        Ok(())
    }

    /// `server.url` parsed. Only `ws` and `wss` are accepted.
    pub fn server_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.server.url).map_err(|e| ConfigError::ValidationError {
            location: ErrorLocation::from(Location::caller()),
            reason: format!("Invalid URL {}: {}", self.server.url, e),
        })?;

        if url.scheme() != "ws" && url.scheme() != "wss" {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!("Invalid URL scheme: {} (expected ws or wss)", url.scheme()),
            });
        }

        Ok(url)
    }

    /// Where the session file lives: the override, else the platform data dir.
    pub fn session_dir(&self) -> Result<PathBuf, ConfigError> {
        match self.session.directory_override {
            Some(ref dir) => Ok(PathBuf::from(dir)),
            None => default_data_dir(),
        }
    }

    /// `balance.rpc_url` parsed. Only `http` and `https` are accepted.
    pub fn rpc_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.balance.rpc_url).map_err(|e| ConfigError::ValidationError {
            location: ErrorLocation::from(Location::caller()),
            reason: format!("Invalid RPC URL {}: {}", self.balance.rpc_url, e),
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid RPC URL scheme: {} (expected http or https)",
                    url.scheme()
                ),
            });
        }

        Ok(url)
    }

    /// `balance.contract` parsed, or `None` when the lookup is disabled.
    pub fn token_contract(&self) -> Result<Option<Address>, ConfigError> {
        self.balance
            .contract
            .as_deref()
            .map(|raw| {
                Address::parse(raw).map_err(|e| ConfigError::ValidationError {
                    location: ErrorLocation::from(Location::caller()),
                    reason: format!("Invalid balance.contract: {e}"),
                })
            })
            .transpose()
    }
}

fn read_env(variable: &'static str) -> Result<Option<String>, ConfigError> {
    match env::var(variable) {
        Ok(value) if value.trim().is_empty() => Err(ConfigError::EnvironmentError {
            location: ErrorLocation::from(Location::caller()),
            variable,
            reason: "set but empty".to_string(),
        }),
        Ok(value) => Ok(Some(value.trim().to_string())),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::EnvironmentError {
            location: ErrorLocation::from(Location::caller()),
            variable,
            reason: "contains invalid unicode".to_string(),
        }),
    }
}
