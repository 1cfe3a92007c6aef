//! Error types for docgen
//!
//! Per-command failures ([`CommandError`], [`ExtensionError`]) are reported and
//! skipped; only [`DocgenError`] ends a run.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// A failure of one command in either command language
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{command} requires {expected}, got {found}")]
    ArgumentCount {
        command: String,
        expected: &'static str,
        found: usize,
    },

    #[error("invalid argument '{value}' for {command}: {reason}")]
    InvalidArgument {
        command: String,
        value: String,
        reason: String,
    },

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("argument {index} not found (the argument list has {count})")]
    ArgumentOutOfRange { index: i64, count: usize },

    #[error("section '{0}' not found")]
    MissingSection(String),

    #[error("alias cycle detected: {0}")]
    AliasCycle(String),

    #[error("invalid command name '{0}': expected an uppercase letter followed by letters, digits, or underscores")]
    InvalidCommandName(String),

    #[error("no sources found for patterns: {}", .0.join(", "))]
    NoSources(Vec<String>),

    #[error("invalid source pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to read source '{}': {source}", .path.display())]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Extension(#[from] ExtensionError),
}

impl CommandError {
    /// Wrong number of arguments for `command`
    pub fn argument_count(command: impl Into<String>, expected: &'static str, found: usize) -> Self {
        Self::ArgumentCount {
            command: command.into(),
            expected,
            found,
        }
    }
}

/// A failure to build, load, or run an extension command
#[derive(Error, Debug)]
pub enum ExtensionError {
    #[error("extension command '{name}' failed to build: {diagnostics}")]
    BuildFailed { name: String, diagnostics: String },

    #[error("could not load extension command '{name}': {source}")]
    Load {
        name: String,
        #[source]
        source: libloading::Error,
    },

    #[error("extension command '{name}' does not export '{symbol}': {source}")]
    MissingSymbol {
        name: String,
        symbol: String,
        #[source]
        source: libloading::Error,
    },

    #[error("extension command '{name}' failed with status {status}")]
    Failed { name: String, status: i32 },

    #[error("failed to write extension source for '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// A failure that ends the run
#[derive(Error, Debug)]
pub enum DocgenError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to read template '{}': {source}", .path.display())]
    ReadTemplate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create output directory '{}': {source}", .path.display())]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write document '{}': {source}", .path.display())]
    WriteDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
