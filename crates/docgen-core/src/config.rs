//! Project configuration (`docgen.toml`) parsing and validation.
//!
//! Every field is optional:
//!
//! ```toml
//! template = ".docgen"
//! output-dir = "docs"
//! output-file = "index.md"
//!
//! [extensions]
//! compiler = "rustc"
//! edition = "2021"
//! opt-level = "2"
//! flags = ["-C", "debuginfo=0"]
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the optional configuration file in the project root.
pub const CONFIG_FILE: &str = "docgen.toml";

/// Default template marker file.
pub const DEFAULT_TEMPLATE: &str = ".docgen";

/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "docs";

/// Default name of the final document.
pub const DEFAULT_OUTPUT_FILE: &str = "index.md";

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for '{0}': {1}")]
    Invalid(&'static str, String),
}

/// The complete docgen.toml configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// Template file, relative to the project root.
    pub template: PathBuf,

    /// Output directory, relative to the project root.
    #[serde(rename = "output-dir")]
    pub output_dir: PathBuf,

    /// File name of the final document inside the output directory.
    #[serde(rename = "output-file")]
    pub output_file: String,

    /// How extension commands are compiled.
    pub extensions: ExtensionConfig,
}

/// Toolchain settings for `NEW_COMMAND`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ExtensionConfig {
    /// Compiler executable.
    pub compiler: String,

    /// Rust edition passed to the compiler.
    pub edition: String,

    /// Optimisation level passed as `-C opt-level`.
    #[serde(rename = "opt-level")]
    pub opt_level: String,

    /// Extra flags appended to the compiler invocation.
    pub flags: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template: PathBuf::from(DEFAULT_TEMPLATE),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            output_file: String::from(DEFAULT_OUTPUT_FILE),
            extensions: ExtensionConfig::default(),
        }
    }
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            compiler: String::from("rustc"),
            edition: String::from("2021"),
            opt_level: String::from("2"),
            flags: Vec::new(),
        }
    }
}

impl Config {
    /// Load `docgen.toml` from the project root, falling back to defaults when
    /// the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = root.as_ref().join(CONFIG_FILE);
        if path.exists() {
            Self::from_path(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load a config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a config from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or a value fails validation.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the config.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_file.is_empty() {
            return Err(ConfigError::Invalid(
                "output-file",
                "file name cannot be empty".to_string(),
            ));
        }

        if self.output_file.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(
                "output-file",
                format!("'{}' must be a file name, not a path", self.output_file),
            ));
        }

        if self.template.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "template",
                "path cannot be empty".to_string(),
            ));
        }

        if self.extensions.compiler.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "extensions.compiler",
                "compiler cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
