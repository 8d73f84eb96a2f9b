//! Configuration loading and resolution
//!
//! Config file priority order:
//! 1. Command-line argument (highest priority)
//! 2. `TSL_CONFIG` environment variable
//! 3. `<user config dir>/tsl/config.toml`
//! 4. Compiled defaults (fallback)
//!
//! A missing file is never fatal: a warning is logged and defaults are used.
//! A file that exists but does not parse is a configuration error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::session::DEFAULT_TARGET;
use crate::source::HUGGING_FACE_ENDPOINT;
use crate::stats::DEFAULT_RECENT_LIMIT;
use crate::store::SHEETS_ENDPOINT;
use crate::{Error, Result};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "TSL_CONFIG";
/// Environment variable holding the Sheets access token
pub const SHEETS_TOKEN_ENV_VAR: &str = "TSL_SHEETS_TOKEN";

/// Complete labeler configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub dataset: DatasetConfig,
    pub store: StoreConfig,
    pub session: SessionConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5780,
        }
    }
}

/// Logging settings; `RUST_LOG` takes precedence when set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Where messages to label come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatasetConfig {
    /// Hugging Face datasets-server rows API
    HuggingFace {
        #[serde(default = "default_hf_endpoint")]
        endpoint: String,
        #[serde(default = "default_hf_dataset")]
        dataset: String,
        #[serde(default = "default_hf_config")]
        config: String,
        #[serde(default = "default_hf_split")]
        split: String,
        /// Stop after this many rows
        #[serde(default)]
        max_rows: Option<usize>,
        #[serde(default)]
        load_on_startup: bool,
    },
    /// Local UTF-8 file, one message per line
    File {
        path: PathBuf,
        #[serde(default)]
        load_on_startup: bool,
    },
}

impl Default for DatasetConfig {
    fn default() -> Self {
        DatasetConfig::HuggingFace {
            endpoint: default_hf_endpoint(),
            dataset: default_hf_dataset(),
            config: default_hf_config(),
            split: default_hf_split(),
            max_rows: None,
            load_on_startup: false,
        }
    }
}

impl DatasetConfig {
    pub fn load_on_startup(&self) -> bool {
        match self {
            DatasetConfig::HuggingFace { load_on_startup, .. }
            | DatasetConfig::File { load_on_startup, .. } => *load_on_startup,
        }
    }
}

fn default_hf_endpoint() -> String {
    HUGGING_FACE_ENDPOINT.to_string()
}

fn default_hf_dataset() -> String {
    "lparkourer10/twitch_chat".to_string()
}

fn default_hf_config() -> String {
    "default".to_string()
}

fn default_hf_split() -> String {
    "train".to_string()
}

/// Where completed labels are persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Local CSV file; relative paths resolve against the data directory
    Csv {
        #[serde(default = "default_csv_path")]
        path: PathBuf,
    },
    /// Shared Google Sheets worksheet
    Sheets {
        #[serde(default = "default_sheets_endpoint")]
        endpoint: String,
        spreadsheet_id: String,
        #[serde(default = "default_sheet_name")]
        sheet_name: String,
        /// OAuth bearer token; `TSL_SHEETS_TOKEN` is used when absent
        #[serde(default)]
        access_token: Option<String>,
    },
    /// Process-local, nothing persisted
    Memory,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Csv {
            path: default_csv_path(),
        }
    }
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("labels.csv")
}

fn default_sheets_endpoint() -> String {
    SHEETS_ENDPOINT.to_string()
}

fn default_sheet_name() -> String {
    "Sheet1".to_string()
}

/// Per-run session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Labels to aim for per run
    pub target: u64,
    /// Size of the recent-labels view
    pub recent_limit: usize,
    /// Annotator name used when a submission does not carry one
    pub labeler: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET,
            recent_limit: DEFAULT_RECENT_LIMIT,
            labeler: String::new(),
        }
    }
}

impl TomlConfig {
    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Sheets token from the file, else from the environment
    pub fn sheets_access_token(&self) -> Option<String> {
        match &self.store {
            StoreConfig::Sheets {
                access_token: Some(token),
                ..
            } => Some(token.clone()),
            StoreConfig::Sheets { .. } => std::env::var(SHEETS_TOKEN_ENV_VAR)
                .ok()
                .filter(|token| !token.is_empty()),
            _ => None,
        }
    }
}

/// Resolves and loads the config file following the priority order above
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Path of the config file to use, if any candidate applies
    pub fn resolve_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.cli_path {
            return Some(path.clone());
        }

        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
            return Some(PathBuf::from(path));
        }

        default_config_path().filter(|path| path.exists())
    }

    /// Load the resolved file, falling back to defaults when it is missing
    pub fn load(&self) -> Result<TomlConfig> {
        let Some(path) = self.resolve_path() else {
            info!("No config file found, using compiled defaults");
            return Ok(TomlConfig::default());
        };

        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using compiled defaults");
            return Ok(TomlConfig::default());
        }

        let config = TomlConfig::from_file(&path)?;
        info!(path = %path.display(), "Loaded config file");
        Ok(config)
    }
}

/// `<user config dir>/tsl/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tsl").join("config.toml"))
}

/// OS-dependent data directory for local label files
pub fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tsl"))
        .unwrap_or_else(|| PathBuf::from("./tsl_data"))
}

/// Resolve a relative path against the data directory
pub fn resolve_data_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        data_dir().join(path)
    }
}

/// Write a config file atomically (temp file + rename)
///
/// On Unix the file is created with mode 0600 since it may hold a Sheets
/// access token.
pub fn write_toml_config(config: &TomlConfig, target: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut temp_name = target.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    std::fs::write(&temp_path, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    if let Err(e) = std::fs::rename(&temp_path, target) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e.into());
    }

    Ok(())
}
