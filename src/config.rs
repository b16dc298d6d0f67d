//! Configuration for the documentation mirror.
//!
//! Supports both environment variables and YAML config file.
//! Environment variables take precedence over config file values.

use crate::error::{MirrorError, Result};
use crate::keyword::IndexOrder;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Name of the extra stylesheet shipped next to the executable.
pub const STYLESHEET_FILE: &str = "custom.css";

/// Default install location of the HTML Help Workshop compiler.
pub const DEFAULT_COMPILER: &str = r"C:\Program Files (x86)\HTML Help Workshop\hhc.exe";

/// Help project settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name; also the base name of the `.hhp`/`.hhc`/`.hhk` files.
    pub name: String,

    /// Stylesheet copied into the output directory.
    #[serde(default = "default_stylesheet")]
    pub stylesheet: PathBuf,

    /// Help compiler run with `--compile`.
    #[serde(default = "default_compiler")]
    pub compiler: PathBuf,

    /// Exit status the compiler reports on success (hhc.exe exits with 1).
    #[serde(default = "default_compiler_success_code")]
    pub compiler_success_code: i32,
}

fn default_compiler() -> PathBuf {
    PathBuf::from(DEFAULT_COMPILER)
}

fn default_compiler_success_code() -> i32 {
    1
}

fn default_stylesheet() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(STYLESHEET_FILE)))
        .unwrap_or_else(|| PathBuf::from(STYLESHEET_FILE))
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Go".to_string(),
            stylesheet: default_stylesheet(),
            compiler: default_compiler(),
            compiler_success_code: default_compiler_success_code(),
        }
    }
}

/// HTTP settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Response cache database, used with `--cache`
    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,
}

fn default_user_agent() -> String {
    format!("help-mirror/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_cache_file() -> PathBuf {
    PathBuf::from("cache.db")
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            cache_file: default_cache_file(),
        }
    }
}

/// Package listing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Pixels of `padding-left` per nesting level
    #[serde(default = "default_indent_unit")]
    pub indent_unit_px: usize,
}

fn default_indent_unit() -> usize {
    20
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            indent_unit_px: default_indent_unit(),
        }
    }
}

/// Keyword index settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexConfig {
    #[serde(default)]
    pub order: IndexOrder,
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MirrorConfig {
    pub project: ProjectConfig,
    pub fetch: FetchConfig,
    pub listing: ListingConfig,
    pub index: IndexConfig,
}

/// Configuration file structure (YAML format).
#[derive(Debug, Deserialize)]
struct ConfigFile {
    project: Option<ProjectFileSection>,
    fetch: Option<FetchFileSection>,
    listing: Option<ListingFileSection>,
    index: Option<IndexFileSection>,
}

#[derive(Debug, Deserialize)]
struct ProjectFileSection {
    name: Option<String>,
    stylesheet: Option<PathBuf>,
    compiler: Option<PathBuf>,
    compiler_success_code: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct FetchFileSection {
    user_agent: Option<String>,
    timeout_secs: Option<u64>,
    cache_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct ListingFileSection {
    indent_unit_px: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct IndexFileSection {
    order: Option<IndexOrder>,
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| MirrorError::InvalidConfig(format!("{key}: cannot parse '{value}'")))
}

impl MirrorConfig {
    /// Load configuration from environment variables and an optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (HELP_MIRROR_PROJECT, HELP_MIRROR_TIMEOUT_SECS, ...)
    /// 2. Config file (`path`, or ~/.config/help-mirror/config.yaml)
    /// 3. Default values
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => match Self::config_file_path() {
                Some(default) if default.exists() => Self::load_from_file(&default)?,
                _ => MirrorConfig::default(),
            },
        };

        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `HELP_MIRROR_*` overrides looked up through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(name) = lookup("HELP_MIRROR_PROJECT") {
            self.project.name = name;
        }

        if let Some(stylesheet) = lookup("HELP_MIRROR_STYLESHEET") {
            self.project.stylesheet = PathBuf::from(stylesheet);
        }

        if let Some(compiler) = lookup("HELP_MIRROR_COMPILER") {
            self.project.compiler = PathBuf::from(compiler);
        }

        if let Some(user_agent) = lookup("HELP_MIRROR_USER_AGENT") {
            self.fetch.user_agent = user_agent;
        }

        if let Some(timeout) = lookup("HELP_MIRROR_TIMEOUT_SECS") {
            self.fetch.timeout_secs = parse_env("HELP_MIRROR_TIMEOUT_SECS", &timeout)?;
        }

        if let Some(cache_file) = lookup("HELP_MIRROR_CACHE_FILE") {
            self.fetch.cache_file = PathBuf::from(cache_file);
        }

        if let Some(unit) = lookup("HELP_MIRROR_INDENT_UNIT") {
            self.listing.indent_unit_px = parse_env("HELP_MIRROR_INDENT_UNIT", &unit)?;
        }

        if let Some(order) = lookup("HELP_MIRROR_INDEX_ORDER") {
            self.index.order = order.parse()?;
        }

        Ok(())
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| MirrorError::io(path, e))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text; missing keys keep their defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file_config: ConfigFile = serde_yaml::from_str(content)
            .map_err(|e| MirrorError::Config(format!("Failed to parse config file: {}", e)))?;

        let mut config = MirrorConfig::default();

        if let Some(project) = file_config.project {
            if let Some(name) = project.name {
                config.project.name = name;
            }
            if let Some(stylesheet) = project.stylesheet {
                config.project.stylesheet = stylesheet;
            }
            if let Some(compiler) = project.compiler {
                config.project.compiler = compiler;
            }
            if let Some(code) = project.compiler_success_code {
                config.project.compiler_success_code = code;
            }
        }

        if let Some(fetch) = file_config.fetch {
            if let Some(user_agent) = fetch.user_agent {
                config.fetch.user_agent = user_agent;
            }
            if let Some(timeout_secs) = fetch.timeout_secs {
                config.fetch.timeout_secs = timeout_secs;
            }
            if let Some(cache_file) = fetch.cache_file {
                config.fetch.cache_file = cache_file;
            }
        }

        if let Some(unit) = file_config.listing.and_then(|l| l.indent_unit_px) {
            config.listing.indent_unit_px = unit;
        }

        if let Some(order) = file_config.index.and_then(|i| i.order) {
            config.index.order = order;
        }

        Ok(config)
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "help-mirror")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.project.name.trim().is_empty() {
            return Err(MirrorError::InvalidConfig(
                "Project name is required. Set HELP_MIRROR_PROJECT or project.name in the config file."
                    .to_string(),
            ));
        }

        if self.listing.indent_unit_px == 0 {
            return Err(MirrorError::InvalidConfig(
                "listing.indent_unit_px must be greater than zero".to_string(),
            ));
        }

        if self.fetch.timeout_secs == 0 {
            return Err(MirrorError::InvalidConfig(
                "fetch.timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = MirrorConfig::default();
        assert_eq!(config.project.name, "Go");
        assert!(config.project.stylesheet.ends_with(STYLESHEET_FILE));
        assert_eq!(config.project.compiler, PathBuf::from(DEFAULT_COMPILER));
        assert_eq!(config.project.compiler_success_code, 1);
        assert!(config.fetch.user_agent.starts_with("help-mirror/"));
        assert_eq!(config.fetch.timeout_secs, 60);
        assert_eq!(config.fetch.cache_file, PathBuf::from("cache.db"));
        assert_eq!(config.listing.indent_unit_px, 20);
        assert_eq!(config.index.order, IndexOrder::Composite);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = MirrorConfig::from_yaml(
            "project:\n  name: GoDoc\n  compiler: /usr/local/bin/hhc\n  compiler_success_code: 0\nlisting:\n  indent_unit_px: 16\nindex:\n  order: keyword\n",
        )
        .unwrap();
        assert_eq!(config.project.name, "GoDoc");
        assert_eq!(config.project.compiler, PathBuf::from("/usr/local/bin/hhc"));
        assert_eq!(config.project.compiler_success_code, 0);
        assert_eq!(config.listing.indent_unit_px, 16);
        assert_eq!(config.index.order, IndexOrder::Keyword);
        // untouched sections keep their defaults
        assert_eq!(config.fetch.timeout_secs, 60);
    }

    #[test]
    fn test_from_yaml_rejects_garbage() {
        assert!(matches!(
            MirrorConfig::from_yaml("project: [unclosed"),
            Err(MirrorError::Config(_))
        ));
        assert!(MirrorConfig::from_yaml("index:\n  order: random\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "fetch:\n  timeout_secs: 5\n  cache_file: /tmp/c.db\n").unwrap();

        let config = MirrorConfig::load_from_file(&path).unwrap();
        assert_eq!(config.fetch.timeout_secs, 5);
        assert_eq!(config.fetch.cache_file, PathBuf::from("/tmp/c.db"));

        let missing = MirrorConfig::load_from_file(&dir.path().join("nope.yaml"));
        assert!(matches!(missing, Err(MirrorError::Io { .. })));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("HELP_MIRROR_PROJECT", "Go1.4"),
            ("HELP_MIRROR_TIMEOUT_SECS", "15"),
            ("HELP_MIRROR_INDEX_ORDER", "keyword"),
            ("HELP_MIRROR_COMPILER", "hhc"),
        ]
        .into_iter()
        .collect();

        let mut config = MirrorConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.project.name, "Go1.4");
        assert_eq!(config.fetch.timeout_secs, 15);
        assert_eq!(config.index.order, IndexOrder::Keyword);
        assert_eq!(config.project.compiler, PathBuf::from("hhc"));
        assert_eq!(config.listing.indent_unit_px, 20);
    }

    #[test]
    fn test_bad_override_is_rejected() {
        let mut config = MirrorConfig::default();
        let result = config.apply_overrides(|key| {
            (key == "HELP_MIRROR_INDENT_UNIT").then(|| "wide".to_string())
        });
        assert!(matches!(result, Err(MirrorError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_fails_on_bad_values() {
        let mut config = MirrorConfig::default();
        config.project.name = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = MirrorConfig::default();
        config.listing.indent_unit_px = 0;
        assert!(config.validate().is_err());

        let mut config = MirrorConfig::default();
        config.fetch.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
