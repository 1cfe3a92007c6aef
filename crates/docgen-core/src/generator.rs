//! One complete run: template in, final document out

use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::Config;
use crate::context::{Diagnostic, DocContext};
use crate::error::DocgenError;
use crate::plugin::ExtensionBuilder;
use crate::template::TemplateInterpreter;
use crate::text::collapse_blank_lines;

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No template marker: nothing was done
    Skipped { template: PathBuf },
    /// The document was written; `diagnostics` lists every reported problem
    Generated {
        path: PathBuf,
        diagnostics: Vec<Diagnostic>,
    },
}

/// A document assembled in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub document: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Drives the template interpreter for one project
#[derive(Debug, Clone)]
pub struct Generator {
    root: PathBuf,
    config: Config,
}

impl Generator {
    /// Create a generator for the project at `root`
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Create a generator using the project's `docgen.toml`, if any.
    pub fn from_root(root: impl Into<PathBuf>) -> Result<Self, DocgenError> {
        let root = root.into();
        let config = Config::load(&root)?;
        Ok(Self::new(root, config))
    }

    /// Template marker path
    #[must_use]
    pub fn template_path(&self) -> PathBuf {
        self.root.join(&self.config.template)
    }

    /// Directory for the final document and generated modules
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.config.output_dir)
    }

    /// Path of the final document
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output_dir().join(&self.config.output_file)
    }

    /// Run the template and write the final document.
    ///
    /// A missing template is not an error: the run is skipped. Per-command
    /// problems are reported and collected, never returned.
    pub fn run(&self) -> Result<RunOutcome, DocgenError> {
        let template = self.template_path();
        if !template.is_file() {
            info!("No {} file found", template.display());
            return Ok(RunOutcome::Skipped { template });
        }
        info!("Generating docs...");

        let output_dir = self.output_dir();
        if !output_dir.exists() {
            std::fs::create_dir_all(&output_dir).map_err(|source| {
                DocgenError::CreateOutputDir {
                    path: output_dir.clone(),
                    source,
                }
            })?;
            info!("Created {} directory", output_dir.display());
        }

        let text = std::fs::read_to_string(&template).map_err(|source| DocgenError::ReadTemplate {
            path: template.clone(),
            source,
        })?;

        let rendered = self.render(&text);

        let path = self.output_path();
        std::fs::write(&path, &rendered.document).map_err(|source| DocgenError::WriteDocument {
            path: path.clone(),
            source,
        })?;

        if !rendered.diagnostics.is_empty() {
            warn!("{} diagnostic(s) reported", rendered.diagnostics.len());
        }
        info!("Wrote {}", path.display());

        Ok(RunOutcome::Generated {
            path,
            diagnostics: rendered.diagnostics,
        })
    }

    /// Interpret `template` and assemble the document without writing it.
    ///
    /// Extension commands are still built under the output directory.
    pub fn render(&self, template: &str) -> Rendered {
        let mut ctx = DocContext::new(self.output_dir());
        let builder = ExtensionBuilder::new(self.config.extensions.clone());
        let origin = self.config.template.display().to_string();

        TemplateInterpreter::new(&self.root, builder)
            .with_origin(origin)
            .run(template, &mut ctx);

        let main = collapse_blank_lines(ctx.main_buffer());
        ctx.push_output(&main);
        let document = collapse_blank_lines(ctx.output()).trim().to_string();

        Rendered {
            document,
            diagnostics: ctx.into_diagnostics(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_template_skips() {
        let tmp = TempDir::new().unwrap();
        let generator = Generator::new(tmp.path(), Config::default());
        let outcome = generator.run().unwrap();
        assert_eq!(
            outcome,
            RunOutcome::Skipped {
                template: tmp.path().join(".docgen")
            }
        );
        assert!(!tmp.path().join("docs").exists());
    }

    #[test]
    fn render_appends_main_buffer_and_trims() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.c"), "// @DOC tail text").unwrap();
        let generator = Generator::new(tmp.path(), Config::default());

        let rendered = generator.render("\n\n# Head\n\n\n\n@@PROCESS_SOURCES(a.c)@@\n");
        assert_eq!(rendered.document, "# Head\n\n tail text");
        assert!(rendered.diagnostics.is_empty());
    }

    #[test]
    fn run_writes_configured_output() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("DOCS"), "# Project\n").unwrap();
        let config = Config::parse("template = \"DOCS\"\noutput-dir = \"site\"\noutput-file = \"README.md\"").unwrap();
        let generator = Generator::new(tmp.path(), config);

        let outcome = generator.run().unwrap();
        let expected = tmp.path().join("site").join("README.md");
        assert_eq!(
            outcome,
            RunOutcome::Generated {
                path: expected.clone(),
                diagnostics: Vec::new()
            }
        );
        assert_eq!(fs::read_to_string(expected).unwrap(), "# Project");
    }

    #[test]
    fn diagnostics_do_not_fail_the_run() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".docgen"), "@@INSERT_SECTION(nope)@@\nbody").unwrap();
        let generator = Generator::new(tmp.path(), Config::default());

        let RunOutcome::Generated { path, diagnostics } = generator.run().unwrap() else {
            panic!("expected a generated document");
        };
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].origin.as_deref(), Some(".docgen:1"));
        assert_eq!(fs::read_to_string(path).unwrap(), "body");
    }

    #[test]
    fn from_root_reads_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("docgen.toml"), "output-dir = \"out\"").unwrap();
        let generator = Generator::from_root(tmp.path()).unwrap();
        assert_eq!(generator.output_dir(), tmp.path().join("out"));
    }

    #[test]
    fn from_root_rejects_bad_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("docgen.toml"), "output-file = \"\"").unwrap();
        let err = Generator::from_root(tmp.path()).unwrap_err();
        assert!(matches!(err, DocgenError::Config(_)));
    }
}
