//! Docgen Core - Comment-driven documentation engine
//!
//! This crate provides the core functionality:
//! - Comments: lexical extraction of line and block comments from source text
//! - Arguments: delimiter- and quote-aware argument splitting
//! - Source interpreter: `@COMMAND` expansion inside comments
//! - Plugins: extension commands compiled to native modules and loaded at runtime
//! - Template: the `@@COMMAND@@` orchestration language of the `.docgen` file
//! - Generator: one complete run from template to final document

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Byte-offset spans into source text
pub mod span;

/// Whitespace and blank-line normalisation
pub mod text;

/// Delimiter-balanced argument splitting
pub mod args;

/// Comment extraction
pub mod comment;

/// Shared document state threaded through every interpretation call
pub mod context;

/// Error types
pub mod error;

/// Project configuration (`docgen.toml`)
pub mod config;

/// Source file discovery from glob patterns
pub mod discovery;

/// In-comment command interpreter
pub mod source;

/// Extension commands: build, load, and invoke native modules.
/// Loading requires unsafe code for symbol lookup and the foreign call
#[allow(unsafe_code)]
pub mod plugin;

/// Template (orchestration) command interpreter
pub mod template;

/// Top-level run
pub mod generator;

/// Convenience re-export of the document context
pub use context::{Diagnostic, DocContext};

/// Convenience re-export of error types
pub use error::{CommandError, DocgenError, ExtensionError};

/// Convenience re-export of configuration
pub use config::{Config, ConfigError, ExtensionConfig};

/// Convenience re-export of the source interpreter
pub use source::{SourceInterpreter, SourceMode, SourceUnit};

/// Convenience re-export of the template interpreter
pub use template::TemplateInterpreter;

/// Convenience re-export of the generator
pub use generator::{Generator, Rendered, RunOutcome};
