//! Configuration management for Truverizen using the prefer crate.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_API_URL;
use crate::dedup::DedupStrategy;

/// File holding the persisted login session.
pub const SESSION_FILENAME: &str = "session.json";

/// File holding saved deduplication configurations.
pub const DEDUP_CONFIGS_FILENAME: &str = "dedup-configs.json";

/// Default exports subdirectory name.
const EXPORTS_SUBDIR: &str = "exports";

/// Environment variable overriding the backend URL.
pub const API_URL_ENV: &str = "TRUVERIZEN_API_URL";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "TRUVERIZEN_DATA_DIR";

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory for session and saved configurations.
    pub data_dir: PathBuf,
    /// Directory downloads and exports are written to.
    pub output_dir: PathBuf,
    /// Backend base URL.
    pub api_url: String,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// Strategy used by the deduplication wizard.
    pub dedup_strategy: DedupStrategy,
}

impl Default for Settings {
    fn default() -> Self {
        // ~/Documents/truverizen, falling back to home then CWD
        let data_dir = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("truverizen");

        Self {
            output_dir: data_dir.join(EXPORTS_SUBDIR),
            data_dir,
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: 120,
            dedup_strategy: DedupStrategy::default(),
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            output_dir: data_dir.join(EXPORTS_SUBDIR),
            data_dir,
            ..Default::default()
        }
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILENAME)
    }

    pub fn dedup_configs_path(&self) -> PathBuf {
        self.data_dir.join(DEDUP_CONFIGS_FILENAME)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Ensure all directories exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        for (label, dir) in [("data", &self.data_dir), ("output", &self.output_dir)] {
            fs::create_dir_all(dir).map_err(|e| {
                std::io::Error::new(
                    e.kind(),
                    format!("Failed to create {} directory '{}': {}", label, dir.display(), e),
                )
            })?;
        }
        Ok(())
    }

    /// Apply environment overrides using `lookup` to read variables.
    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|s| !s.is_empty()) {
            tracing::debug!("Using {} from environment: {}", API_URL_ENV, url);
            self.api_url = url;
        }
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|s| !s.is_empty()) {
            tracing::debug!("Using {} from environment: {}", DATA_DIR_ENV, dir);
            self.data_dir = PathBuf::from(shellexpand::tilde(&dir).as_ref());
            self.output_dir = self.data_dir.join(EXPORTS_SUBDIR);
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, prefer::FromValue)]
pub struct Config {
    /// Backend base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Output directory for downloads and exports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    /// Deduplication strategy: "simulated" or "similarity".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedup_strategy: Option<String>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    #[prefer(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    pub async fn load() -> Self {
        match prefer::load("truverizen").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => Self::load_from_path(path).await.unwrap_or_else(|e| {
                    tracing::warn!("{}", e);
                    Self::default()
                }),
                None => Self::default(),
            },
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// Absolute paths are kept, `~` is expanded, anything else is joined
    /// onto `base_dir`.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref url) = self.api_url {
            settings.api_url = url.clone();
        }
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
            settings.output_dir = settings.data_dir.join(EXPORTS_SUBDIR);
        }
        if let Some(ref output_dir) = self.output_dir {
            settings.output_dir = self.resolve_path(output_dir, base_dir);
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(ref strategy) = self.dedup_strategy {
            match strategy.parse() {
                Ok(s) => settings.dedup_strategy = s,
                Err(e) => tracing::warn!("Ignoring dedup_strategy: {}", e),
            }
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Use CWD for relative paths instead of config file directory.
    pub use_cwd: bool,
    /// Data directory (--data flag).
    pub data: Option<PathBuf>,
}

/// Look for a config file inside the data directory.
fn find_config_in_data_dir(data_dir: &Path) -> Option<PathBuf> {
    let extensions = ["json", "yaml", "yml", "toml"];
    let basenames = ["truverizen", "config"];

    for basename in basenames {
        for ext in extensions {
            let path = data_dir.join(format!("{}.{}", basename, ext));
            if path.exists() {
                return Some(path);
            }
        }
    }
    None
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    }
}

async fn load_file_config(options: &LoadOptions, data_dir: Option<&PathBuf>) -> Config {
    // Priority 1: explicit --config flag
    if let Some(ref config_path) = options.config_path {
        return Config::load_from_path(config_path)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("{}", e);
                Config::default()
            });
    }

    // Priority 2: config inside the data dir
    if let Some(dir) = data_dir {
        if let Some(config_path) = find_config_in_data_dir(dir) {
            tracing::debug!("Found config in data dir: {}", config_path.display());
            return Config::load_from_path(&config_path)
                .await
                .unwrap_or_default();
        }
    }

    // Priority 3: auto-discover via prefer
    Config::load().await
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    let data_dir_override = options.data.as_deref().map(absolute);

    let config = load_file_config(&options, data_dir_override.as_ref()).await;

    let mut settings = Settings::default();

    let base_dir = if options.use_cwd {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    } else {
        config
            .base_dir()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    };

    config.apply_to_settings(&mut settings, &base_dir);
    settings.apply_env(|key| std::env::var(key).ok());

    // --data wins over both file and environment
    if let Some(data_dir) = data_dir_override {
        settings.output_dir = data_dir.join(EXPORTS_SUBDIR);
        settings.data_dir = data_dir;
    }

    (settings, config)
}
