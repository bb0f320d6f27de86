//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/artsel/config.toml)
//! 3. Environment variables (ARTSEL_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::DEFAULT_FIELDS;

/// Environment variable prefix
const ENV_PREFIX: &str = "ARTSEL";

/// Default collection API
pub const DEFAULT_API_URL: &str = "https://api.artic.edu/api/v1";

/// Default rows per page
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the collection API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Rows per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Record fields requested from the API
    #[serde(default = "default_fields")]
    pub fields: Vec<String>,

    /// Directory for session data
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Name of the selection session
    #[serde(default = "default_session")]
    pub session: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Log file for TUI mode (default: {data_dir}/debug.log)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            page_size: default_page_size(),
            fields: default_fields(),
            data_dir: default_data_dir(),
            session: default_session(),
            request_timeout_secs: default_timeout(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (ARTSEL_API_URL, ARTSEL_PAGE_SIZE, ARTSEL_DATA_DIR, ARTSEL_SESSION)
    /// 2. Config file (~/.config/artsel/config.toml or ARTSEL_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from an explicit path, or the default location
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // ARTSEL_API_URL
        if let Ok(val) = std::env::var(format!("{}_API_URL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.api_url = val;
            }
        }

        // ARTSEL_PAGE_SIZE (ignored when not a number)
        if let Ok(val) = std::env::var(format!("{}_PAGE_SIZE", ENV_PREFIX)) {
            if let Ok(size) = val.parse() {
                self.page_size = size;
            }
        }

        // ARTSEL_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // ARTSEL_SESSION
        if let Ok(val) = std::env::var(format!("{}_SESSION", ENV_PREFIX)) {
            if !val.is_empty() {
                self.session = val;
            }
        }
    }

    /// Reject values the rest of the program can't work with
    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            anyhow::bail!("page_size must be at least 1");
        }
        if self.session.is_empty()
            || !self
                .session
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            anyhow::bail!(
                "Invalid session name '{}': use letters, digits, '-' or '_'",
                self.session
            );
        }
        Ok(())
    }

    /// Save configuration to the default config file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with ARTSEL_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("artsel")
            .join("config.toml")
    }

    /// Directory holding the current session's persisted state
    pub fn session_dir(&self) -> PathBuf {
        self.data_dir.join("sessions").join(&self.session)
    }

    /// Log file used in TUI mode
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("debug.log"))
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_fields() -> Vec<String> {
    DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect()
}

fn default_session() -> String {
    "default".to_string()
}

fn default_timeout() -> u64 {
    10
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("artsel")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "ARTSEL_API_URL",
        "ARTSEL_PAGE_SIZE",
        "ARTSEL_DATA_DIR",
        "ARTSEL_SESSION",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, "https://api.artic.edu/api/v1");
        assert_eq!(config.page_size, 12);
        assert_eq!(config.session, "default");
        assert!(config.fields.contains(&"id".to_string()));
        assert!(config.data_dir.ends_with("artsel"));
    }

    #[test]
    fn test_paths() {
        let config = Config {
            data_dir: PathBuf::from("/data/artsel"),
            session: "review".to_string(),
            ..Config::default()
        };

        assert_eq!(
            config.session_dir(),
            PathBuf::from("/data/artsel/sessions/review")
        );
        assert_eq!(config.log_path(), PathBuf::from("/data/artsel/debug.log"));
    }

    #[test]
    fn test_env_override_page_size() {
        let _guard = EnvGuard::new(ENV_VARS);
        let mut config = Config::default();

        env::set_var("ARTSEL_PAGE_SIZE", "25");
        config.apply_env_overrides();
        assert_eq!(config.page_size, 25);

        // Garbage is ignored
        env::set_var("ARTSEL_PAGE_SIZE", "many");
        config.apply_env_overrides();
        assert_eq!(config.page_size, 25);
    }

    #[test]
    fn test_env_override_session_and_url() {
        let _guard = EnvGuard::new(ENV_VARS);
        let mut config = Config::default();

        env::set_var("ARTSEL_SESSION", "tab-2");
        env::set_var("ARTSEL_API_URL", "http://localhost:8080/api/v1");
        config.apply_env_overrides();

        assert_eq!(config.session, "tab-2");
        assert_eq!(config.api_url, "http://localhost:8080/api/v1");

        // Empty values keep the current setting
        env::set_var("ARTSEL_SESSION", "");
        config.apply_env_overrides();
        assert_eq!(config.session, "tab-2");
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            page_size = 20
            session = "curation"
            fields = ["id", "title"]
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.page_size, 20);
        assert_eq!(config.session, "curation");
        assert_eq!(config.fields, vec!["id", "title"]);
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let _guard = EnvGuard::new(ENV_VARS);

        assert!(Config::load_from_str("page_size = 0").is_err());
        assert!(Config::load_from_str(r#"session = "../up""#).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            page_size: 50,
            session: "saved".to_string(),
            ..Config::default()
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.page_size, 50);
        assert_eq!(loaded.session, "saved");
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }
}
