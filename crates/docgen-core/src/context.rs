//! Shared document state
//!
//! One [`DocContext`] exists per run. It is passed explicitly to every
//! interpretation call; nothing in the engine keeps ambient state.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::error;

/// A reported, non-fatal problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Source file or template the problem came from, if known
    pub origin: Option<String>,
    /// Human-readable message
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.origin {
            Some(origin) => write!(f, "{origin}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Section buffers, aliases, and the assembled output of one run
#[derive(Debug, Default)]
pub struct DocContext {
    sections: HashMap<String, String>,
    main: String,
    current_section: Option<String>,
    aliases: HashMap<String, String>,
    output: String,
    output_dir: PathBuf,
    diagnostics: Vec<Diagnostic>,
}

impl DocContext {
    /// Create an empty context writing generated files under `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Directory for the final document and generated extension modules
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// The selected section, `None` meaning the main buffer
    #[must_use]
    pub fn current_section(&self) -> Option<&str> {
        self.current_section.as_deref()
    }

    /// Route subsequent text to `section`, or to the main buffer for `None`.
    /// An empty name selects the main buffer.
    pub fn select_section(&mut self, section: Option<String>) {
        self.current_section = section.filter(|name| !name.is_empty());
    }

    /// Append text to the active buffer. Section buffers are created on first write.
    pub fn append(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match &self.current_section {
            Some(name) => self.sections.entry(name.clone()).or_default().push_str(text),
            None => self.main.push_str(text),
        }
    }

    /// Contents of a named section, if anything was ever written to it
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&str> {
        self.sections.get(name).map(String::as_str)
    }

    /// Text written while no section was selected
    #[must_use]
    pub fn main_buffer(&self) -> &str {
        &self.main
    }

    /// Register or replace an alias. The replacement is stored verbatim.
    pub fn register_alias(&mut self, name: impl Into<String>, replacement: impl Into<String>) {
        self.aliases.insert(name.into(), replacement.into());
    }

    /// Look up an alias (case-sensitive)
    #[must_use]
    pub fn alias(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }

    /// The assembled output so far
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Append to the assembled output
    pub fn push_output(&mut self, text: &str) {
        self.output.push_str(text);
    }

    /// Log a non-fatal error and keep it for the end-of-run summary
    pub fn report(&mut self, origin: Option<&str>, err: &dyn fmt::Display) {
        let diagnostic = Diagnostic {
            origin: origin.map(str::to_string),
            message: err.to_string(),
        };
        error!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    /// All problems reported so far
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the context, keeping only the reported problems
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_goes_to_exactly_one_buffer() {
        let mut ctx = DocContext::new("docs");
        ctx.append("main ");
        ctx.select_section(Some("api".into()));
        ctx.append("api text");
        ctx.select_section(None);
        ctx.append("!");

        assert_eq!(ctx.main_buffer(), "main !");
        assert_eq!(ctx.section("api"), Some("api text"));
    }

    #[test]
    fn sections_are_created_lazily() {
        let mut ctx = DocContext::new("docs");
        ctx.select_section(Some("empty".into()));
        ctx.append("");
        assert_eq!(ctx.section("empty"), None);
    }

    #[test]
    fn empty_section_name_selects_main() {
        let mut ctx = DocContext::new("docs");
        ctx.select_section(Some(String::new()));
        assert_eq!(ctx.current_section(), None);
    }

    #[test]
    fn aliases_are_case_sensitive() {
        let mut ctx = DocContext::new("docs");
        ctx.register_alias("RET", "returns");
        assert_eq!(ctx.alias("RET"), Some("returns"));
        assert_eq!(ctx.alias("Ret"), None);
    }

    #[test]
    fn reports_are_collected() {
        let mut ctx = DocContext::new("docs");
        ctx.report(Some("a.c"), &"unknown command 'X'");
        ctx.report(None, &"no sources");
        assert_eq!(ctx.diagnostics().len(), 2);
        assert_eq!(ctx.diagnostics()[0].to_string(), "a.c: unknown command 'X'");
        assert_eq!(ctx.diagnostics()[1].to_string(), "no sources");
    }
}
