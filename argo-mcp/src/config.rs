//! Configuration management for argo-mcp
//!
//! Values come from, in increasing precedence: built-in defaults,
//! `ARGO_MCP_*` environment variables, and an `argo-mcp.yaml` file.

use crate::render::{LayoutEngineKind, OutputFormat, RenderOptions, SvgCompiler};
use crate::validation::{validate_label, ValidationError};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

const CONFIG_FILE_NAME: &str = "argo-mcp.yaml";
const ENV_PREFIX: &str = "ARGO_MCP";

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file from disk
    #[error("Failed to read configuration file {path}: {source}")]
    FileRead {
        /// Path to the configuration file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML content from a configuration file
    #[error("Invalid YAML syntax in {path}:\n{source}\n\nHint: Check for proper indentation and YAML formatting")]
    YamlParse {
        /// Path to the configuration file
        path: PathBuf,
        /// Underlying YAML parsing error
        #[source]
        source: serde_yaml::Error,
    },

    /// Invalid configuration value for a specific field
    #[error("Invalid configuration value for '{field}': {value}\n{hint}")]
    InvalidValue {
        /// Name of the field
        field: String,
        /// The rejected value
        value: String,
        /// How to fix it
        hint: String,
    },
}

impl From<ValidationError> for ConfigError {
    fn from(err: ValidationError) -> Self {
        ConfigError::InvalidValue {
            field: err.field,
            value: err.value,
            hint: err.reason,
        }
    }
}

/// Reads environment variables sharing a prefix
struct EnvLoader {
    prefix: &'static str,
}

impl EnvLoader {
    fn new(prefix: &'static str) -> Self {
        Self { prefix }
    }

    fn key(&self, suffix: &str) -> String {
        format!("{}_{}", self.prefix, suffix)
    }

    fn load_string(&self, suffix: &str, default: &str) -> String {
        env::var(self.key(suffix)).unwrap_or_else(|_| default.to_string())
    }

    /// Parsed value, or the default when unset or unparseable
    fn load_parsed<T: FromStr>(&self, suffix: &str, default: T) -> T {
        let key = self.key(suffix);
        match env::var(&key) {
            Ok(value) => value.parse().unwrap_or_else(|_| {
                tracing::warn!("Ignoring unparseable value '{}' for {}", value, key);
                default
            }),
            Err(_) => default,
        }
    }
}

/// Configuration settings for argo-mcp
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Namespace used when a tool call names none (default: "argo")
    pub default_namespace: String,
    /// Format used when a caller names none (default: mermaid)
    pub default_format: OutputFormat,
    /// Whether live renders show node phases (default: true)
    pub include_status: bool,
    /// Engine used for SVG output (default: auto)
    pub layout_engine: LayoutEngineKind,
    /// Graphviz executable name or path (default: "dot")
    pub graphviz_binary: String,
    /// Log filter used when `RUST_LOG` is unset (default: "info")
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_namespace: "argo".to_string(),
            default_format: OutputFormat::Mermaid,
            include_status: true,
            layout_engine: LayoutEngineKind::Auto,
            graphviz_binary: "dot".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Create a configuration from defaults, environment variables and the
    /// YAML file, in that order of precedence
    pub fn new() -> Self {
        let mut config = Self::default();
        config.apply_env_vars();

        match YamlConfig::load_or_default() {
            Ok(yaml_config) => {
                yaml_config.apply_to_config(&mut config);
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to load YAML configuration, falling back to env vars and defaults: {}",
                    e
                );
            }
        }

        if let Err(e) = config.validate() {
            tracing::warn!("Invalid configuration: {}. Using defaults.", e);
            return Self::default();
        }
        config
    }

    fn apply_env_vars(&mut self) {
        let loader = EnvLoader::new(ENV_PREFIX);

        self.default_namespace = loader.load_string("DEFAULT_NAMESPACE", &self.default_namespace);
        self.default_format = loader.load_parsed("DEFAULT_FORMAT", self.default_format);
        self.include_status = loader.load_parsed("INCLUDE_STATUS", self.include_status);
        self.layout_engine = loader.load_parsed("LAYOUT_ENGINE", self.layout_engine);
        self.graphviz_binary = loader.load_string("GRAPHVIZ_BINARY", &self.graphviz_binary);
        self.log_filter = loader.load_string("LOG_FILTER", &self.log_filter);
    }

    /// Get the global configuration instance
    pub fn global() -> &'static Self {
        static CONFIG: std::sync::OnceLock<Config> = std::sync::OnceLock::new();
        CONFIG.get_or_init(Config::new)
    }

    /// Find `argo-mcp.yaml` in the current directory, then in
    /// `~/.config/argo-mcp/`
    pub fn find_yaml_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(home_dir) = dirs::home_dir() {
            search_paths.push(home_dir.join(".config").join("argo-mcp").join(CONFIG_FILE_NAME));
        }

        let found = search_paths.into_iter().find(|path| path.is_file());
        match &found {
            Some(path) => tracing::debug!("Found configuration file: {:?}", path),
            None => tracing::debug!("No {} configuration file found", CONFIG_FILE_NAME),
        }
        found
    }

    /// Validate the current configuration settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_label("default_namespace", &self.default_namespace)?;
        if self.graphviz_binary.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "graphviz_binary".to_string(),
                value: self.graphviz_binary.clone(),
                hint: "graphviz_binary must name an executable".to_string(),
            });
        }
        Ok(())
    }

    /// Render options for a request that does not set them
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            include_status: self.include_status,
        }
    }

    /// SVG compiler using the configured engine
    pub fn svg_compiler(&self) -> SvgCompiler {
        SvgCompiler::new(self.layout_engine, self.graphviz_binary.as_str())
    }
}

/// Configuration loaded from `argo-mcp.yaml`; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct YamlConfig {
    /// Namespace used when a tool call names none
    pub default_namespace: Option<String>,
    /// Format used when a caller names none
    pub default_format: Option<OutputFormat>,
    /// Whether live renders show node phases
    pub include_status: Option<bool>,
    /// Engine used for SVG output
    pub layout_engine: Option<LayoutEngineKind>,
    /// Graphviz executable name or path
    pub graphviz_binary: Option<String>,
    /// Log filter used when `RUST_LOG` is unset
    pub log_filter: Option<String>,
}

impl YamlConfig {
    /// Apply YAML values to an existing Config; YAML values win
    pub fn apply_to_config(&self, config: &mut Config) {
        if let Some(ref namespace) = self.default_namespace {
            config.default_namespace = namespace.clone();
        }
        if let Some(format) = self.default_format {
            config.default_format = format;
        }
        if let Some(include_status) = self.include_status {
            config.include_status = include_status;
        }
        if let Some(engine) = self.layout_engine {
            config.layout_engine = engine;
        }
        if let Some(ref binary) = self.graphviz_binary {
            config.graphviz_binary = binary.clone();
        }
        if let Some(ref filter) = self.log_filter {
            config.log_filter = filter.clone();
        }
    }

    /// Load YAML configuration from a file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        tracing::info!("Loading YAML configuration from: {:?}", path);

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|e| ConfigError::YamlParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load the YAML configuration, or an empty one when no file exists
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Config::find_yaml_config_file() {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }
}
