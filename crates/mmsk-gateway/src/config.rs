//! Application configuration.

use crate::error::{AppError, AppResult};
use mmsk_signer::KeySource;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Prefix of environment overrides, e.g. `MMSK_PROVIDER_URL` or
/// `MMSK_TIMEOUTS__QUOTE_MS`.
pub const ENV_PREFIX: &str = "MMSK";

/// Where the signing key comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyConfig {
    /// Environment variable holding the hex private key.
    #[serde(default = "default_key_env_var")]
    pub env_var: String,
    /// Key file; takes precedence over `env_var` when set.
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// Encrypted JSON keystore; takes precedence over `file` and `env_var`.
    #[serde(default)]
    pub keystore: Option<PathBuf>,
    /// Environment variable holding the keystore password.
    #[serde(default = "default_keystore_password_env")]
    pub keystore_password_env: String,
}

fn default_key_env_var() -> String {
    "MMSK_PRIVATE_KEY".to_string()
}

fn default_keystore_password_env() -> String {
    "MMSK_KEYSTORE_PASSWORD".to_string()
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            env_var: default_key_env_var(),
            file: None,
            keystore: None,
            keystore_password_env: default_keystore_password_env(),
        }
    }
}

impl KeyConfig {
    pub fn source(&self) -> KeySource {
        match (&self.keystore, &self.file) {
            (Some(path), _) => KeySource::Keystore {
                path: path.clone(),
                password_env: self.keystore_password_env.clone(),
            },
            (None, Some(path)) => KeySource::File { path: path.clone() },
            (None, None) => KeySource::EnvVar {
                var_name: self.env_var.clone(),
            },
        }
    }
}

/// Refresh interval per cached source, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_market_maker_config_secs")]
    pub market_maker_config_secs: u64,
    #[serde(default = "default_pairs_secs")]
    pub pairs_secs: u64,
    #[serde(default = "default_token_list_secs")]
    pub token_list_secs: u64,
    #[serde(default = "default_token_configs_secs")]
    pub token_configs_secs: u64,
}

fn default_market_maker_config_secs() -> u64 {
    60
}

fn default_pairs_secs() -> u64 {
    60
}

fn default_token_list_secs() -> u64 {
    300
}

fn default_token_configs_secs() -> u64 {
    60
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            market_maker_config_secs: default_market_maker_config_secs(),
            pairs_secs: default_pairs_secs(),
            token_list_secs: default_token_list_secs(),
            token_configs_secs: default_token_configs_secs(),
        }
    }
}

/// Timeouts in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Bound on the provider's firm and indicative price calls.
    #[serde(default = "default_quote_ms")]
    pub quote_ms: u64,
    /// Bound on one signing call.
    #[serde(default = "default_sign_ms")]
    pub sign_ms: u64,
    /// Per-request timeout of the HTTP clients.
    #[serde(default = "default_http_ms")]
    pub http_ms: u64,
}

fn default_quote_ms() -> u64 {
    5_000
}

fn default_sign_ms() -> u64 {
    5_000
}

fn default_http_ms() -> u64 {
    10_000
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            quote_ms: default_quote_ms(),
            sign_ms: default_sign_ms(),
            http_ms: default_http_ms(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Exchange JSON-RPC endpoint serving market-maker config and tokens.
    #[serde(default = "default_exchange_url")]
    pub exchange_url: String,
    /// Base URL of the market maker's quoting service.
    #[serde(default = "default_provider_url")]
    pub provider_url: String,
    /// Expected signer address; startup fails if the key does not match.
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub key: KeyConfig,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    /// Market-maker config older than this is refused for signing. 0 disables the check.
    #[serde(default = "default_max_config_age_secs")]
    pub max_config_age_secs: u64,
    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_exchange_url() -> String {
    "http://localhost:8545/rpc".to_string()
}

fn default_provider_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_chain_id() -> u64 {
    1
}

fn default_max_config_age_secs() -> u64 {
    600
}

fn default_log_level() -> String {
    "info,mmsk=debug".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            exchange_url: default_exchange_url(),
            provider_url: default_provider_url(),
            wallet_address: None,
            key: KeyConfig::default(),
            chain_id: default_chain_id(),
            refresh: RefreshConfig::default(),
            timeouts: TimeoutConfig::default(),
            max_config_age_secs: default_max_config_age_secs(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load from a specific TOML file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` (if it exists) with `MMSK_*` environment overrides on top.
    ///
    /// Nested keys use a double underscore: `MMSK_REFRESH__PAIRS_SECS=30`.
    pub fn load(path: &str) -> AppResult<Self> {
        if !Path::new(path).exists() {
            tracing::warn!(path = %path, "Config file not found, using defaults");
        }

        let config = config::Config::builder()
            .add_source(config::File::new(path, config::FileFormat::Toml).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize::<Self>())
            .map_err(|e| AppError::Config(format!("Failed to load config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject intervals and timeouts of zero.
    pub fn validate(&self) -> AppResult<()> {
        let refresh = &self.refresh;
        let timeouts = &self.timeouts;
        let fields = [
            ("refresh.market_maker_config_secs", refresh.market_maker_config_secs),
            ("refresh.pairs_secs", refresh.pairs_secs),
            ("refresh.token_list_secs", refresh.token_list_secs),
            ("refresh.token_configs_secs", refresh.token_configs_secs),
            ("timeouts.quote_ms", timeouts.quote_ms),
            ("timeouts.sign_ms", timeouts.sign_ms),
            ("timeouts.http_ms", timeouts.http_ms),
        ];

        match fields.iter().find(|(_, value)| *value == 0) {
            Some((field, _)) => Err(AppError::Config(format!("{field} must be greater than 0"))),
            None => Ok(()),
        }
    }

    pub fn quote_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.quote_ms)
    }

    pub fn sign_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.sign_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.http_ms)
    }

    pub fn max_config_age(&self) -> Option<Duration> {
        (self.max_config_age_secs > 0).then(|| Duration::from_secs(self.max_config_age_secs))
    }
}
