//! Configuration module for the test discovery system.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file (`.phptest/settings.toml`)
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `PHPTEST_` and use double
//! underscores to separate nested levels:
//! - `PHPTEST_TEST_ROOT=/srv/app` sets `test_root`
//! - `PHPTEST_LOGGING__LEVEL=debug` sets `logging.level`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding the settings file
pub const CONFIG_DIR: &str = ".phptest";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Project root tests are discovered under and Pest class names are
    /// derived from. Relative paths resolve against the workspace root.
    #[serde(default = "default_test_root")]
    pub test_root: PathBuf,

    /// Workspace root directory (where .phptest is located)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,

    /// Global debug mode
    #[serde(default = "default_false")]
    pub debug: bool,

    /// File discovery settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DiscoveryConfig {
    /// Directories under the test root to search
    #[serde(default = "default_include")]
    pub include: Vec<PathBuf>,

    /// File name suffixes that mark test files
    #[serde(default = "default_suffixes")]
    pub suffixes: Vec<String>,

    /// Glob patterns to skip, relative to the searched directory
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Maximum level: error, warn, info, debug or trace
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_test_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_false() -> bool {
    false
}
fn default_include() -> Vec<PathBuf> {
    vec![PathBuf::from("tests")]
}
fn default_suffixes() -> Vec<String> {
    vec!["Test.php".to_string()]
}
fn default_ignore_patterns() -> Vec<String> {
    vec!["vendor/**".to_string(), "node_modules/**".to_string()]
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            test_root: default_test_root(),
            workspace_root: None,
            debug: false,
            discovery: DiscoveryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            include: default_include(),
            suffixes: default_suffixes(),
            ignore_patterns: default_ignore_patterns(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        // Try to find the workspace root by looking for .phptest directory
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));

        Self::figment(config_path)
            .extract()
            .map_err(Box::new)
            .map(|mut settings: Settings| {
                // If workspace_root is not set in config, detect it
                if settings.workspace_root.is_none() {
                    settings.workspace_root = Self::workspace_root();
                }
                settings
            })
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path.as_ref().to_path_buf())
            .extract()
            .map_err(Box::new)
    }

    fn figment(config_path: PathBuf) -> Figment {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(config_path))
            // Layer in environment variables with PHPTEST_ prefix
            // Use double underscore (__) to separate nested levels
            // Single underscore (_) remains as is within field names
            .merge(Env::prefixed("PHPTEST_").map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".") // Double underscore becomes dot
                    .into()
            }))
    }

    /// Find the settings file by looking for a .phptest directory
    /// from the current directory up to the filesystem root
    fn find_workspace_config() -> Option<PathBuf> {
        Self::workspace_root().map(|root| root.join(CONFIG_DIR).join("settings.toml"))
    }

    /// Get the workspace root directory (where .phptest is located)
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .find(|ancestor| ancestor.join(CONFIG_DIR).is_dir())
            .map(Path::to_path_buf)
    }

    /// Test root with relative paths resolved against the workspace root
    pub fn resolved_test_root(&self) -> PathBuf {
        if self.test_root.is_absolute() {
            return self.test_root.clone();
        }
        match &self.workspace_root {
            Some(workspace) => workspace.join(&self.test_root),
            None => self.test_root.clone(),
        }
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file with helpful comments
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = PathBuf::from(CONFIG_DIR).join("settings.toml");

        if config_path.exists() && !force {
            return Err(format!(
                "Configuration file already exists at {}",
                config_path.display()
            )
            .into());
        }

        std::fs::create_dir_all(CONFIG_DIR)?;
        std::fs::write(&config_path, Self::default_config_content())?;

        Ok(config_path)
    }

    fn default_config_content() -> String {
        r#"# phptest configuration
version = 1

# Project root; Pest test names are derived from paths relative to it
test_root = "."

debug = false

[discovery]
# Directories under test_root that hold tests
include = ["tests"]

# Files ending with one of these suffixes are parsed
suffixes = ["Test.php"]

# Glob patterns to skip
ignore_patterns = ["vendor/**", "node_modules/**"]

[logging]
# error, warn, info, debug or trace
level = "warn"
"#
        .to_string()
    }
}
