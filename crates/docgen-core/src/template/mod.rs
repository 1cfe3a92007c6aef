//! Template (orchestration) command interpreter
//!
//! Literal template lines go straight to the output. Commands register
//! aliases and extension commands, run source files through the in-comment
//! interpreter, and splice section buffers into the output.

pub mod reader;

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::context::DocContext;
use crate::discovery::discover_sources;
use crate::error::CommandError;
use crate::plugin::ExtensionBuilder;
use crate::source::builtins::is_builtin;
use crate::source::{SourceInterpreter, SourceMode, SourceUnit};
use crate::text::{collapse_blank_lines, is_command_name, unquote, unwrap_enclosing};

use reader::{parse_command, parse_template, TemplateItem};

/// The orchestration interpreter for one run
#[derive(Debug)]
pub struct TemplateInterpreter {
    /// Project root; relative source patterns resolve against it
    root: PathBuf,
    builder: ExtensionBuilder,
    sources: SourceInterpreter,
    /// Template name used in diagnostics
    origin: String,
}

impl TemplateInterpreter {
    /// Create an interpreter for the project at `root`
    pub fn new(root: impl Into<PathBuf>, builder: ExtensionBuilder) -> Self {
        Self {
            root: root.into(),
            builder,
            sources: SourceInterpreter::new(),
            origin: String::from("template"),
        }
    }

    /// Name diagnostics after `origin` (usually the template file name)
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Interpret a whole template, appending to the context's output.
    pub fn run(&mut self, template: &str, ctx: &mut DocContext) {
        for item in parse_template(template) {
            match item {
                TemplateItem::Literal(line) => {
                    ctx.push_output(line);
                    ctx.push_output("\n");
                }
                TemplateItem::Command(command) => {
                    let location = format!("{}:{}", self.origin, command.line);
                    if !command.closed {
                        warn!(
                            "{location}: command is missing its closing '{}'",
                            reader::MARKER
                        );
                    }
                    if let Err(err) = self.process_command(&command.text, ctx) {
                        ctx.report(Some(location.as_str()), &err);
                    }
                }
            }
        }
    }

    /// Run one orchestration command given as raw text, e.g. `INSERT_SECTION(api)`.
    pub fn process_command(&mut self, command: &str, ctx: &mut DocContext) -> Result<(), CommandError> {
        let parsed = parse_command(command);
        let args = parsed.args.as_slice();

        match parsed.name.as_str() {
            "NEW_COMMAND" => self.new_command(args, ctx),
            "PROCESS_SOURCES" => self.process_sources(args, ctx),
            "INSERT_SECTION" => insert_section(args, ctx),
            "NEW_ALIAS" => new_alias(args, ctx),
            _ => Err(CommandError::UnknownCommand(parsed.name.clone())),
        }
    }

    /// `NEW_COMMAND(name, [items], body)`: build an extension command.
    ///
    /// Build failures are recorded and only reported when the command is used.
    fn new_command(&mut self, args: &[String], ctx: &mut DocContext) -> Result<(), CommandError> {
        let (name, items, body) = match args {
            [name, body] => (name, "", body),
            [name, items, body] => (name, unwrap_enclosing(items), body),
            _ => {
                return Err(CommandError::argument_count(
                    "NEW_COMMAND",
                    "2 or 3 arguments",
                    args.len(),
                ))
            }
        };
        let name = checked_name(name)?;

        let result = self.builder.build(ctx.output_dir(), name, items, body);
        match &result {
            Ok(path) => info!("Built command {name} ({})", path.display()),
            Err(err) => debug!(error = %err, "build of {name} failed, deferring report to first use"),
        }
        self.sources.extensions_mut().record_build(name, &result);
        Ok(())
    }

    /// `PROCESS_SOURCES(patterns...)`: run every matching file through the
    /// in-comment interpreter.
    fn process_sources(&mut self, args: &[String], ctx: &mut DocContext) -> Result<(), CommandError> {
        let patterns: Vec<String> = args.iter().map(|p| unquote(p).to_string()).collect();
        let discovered = discover_sources(&self.root, &patterns);

        for err in &discovered.errors {
            ctx.report(Some(self.origin.as_str()), err);
        }
        if discovered.files.is_empty() {
            return Err(CommandError::NoSources(patterns));
        }

        for path in &discovered.files {
            let rel = path.strip_prefix(&self.root).unwrap_or(path);
            info!("Processing {}", rel.display());

            let mut unit = match SourceUnit::read(path) {
                Ok(unit) => unit,
                Err(err) => {
                    ctx.report(Some(self.origin.as_str()), &err);
                    continue;
                }
            };
            unit.filename = rel.display().to_string();
            self.sources.process_source(&unit, SourceMode::File, ctx);
        }
        Ok(())
    }
}

/// `INSERT_SECTION(name)`: splice a section into the output.
fn insert_section(args: &[String], ctx: &mut DocContext) -> Result<(), CommandError> {
    let [name] = args else {
        return Err(CommandError::argument_count(
            "INSERT_SECTION",
            "1 argument",
            args.len(),
        ));
    };
    let name = unquote(name);
    let section = ctx
        .section(name)
        .map(collapse_blank_lines)
        .ok_or_else(|| CommandError::MissingSection(name.to_string()))?;

    ctx.push_output(&section);
    ctx.push_output("\n\n");
    Ok(())
}

/// `NEW_ALIAS(name, replacement)`: register an alias, minus one layer of
/// enclosing brackets or quotes.
fn new_alias(args: &[String], ctx: &mut DocContext) -> Result<(), CommandError> {
    let [name, replacement] = args else {
        return Err(CommandError::argument_count(
            "NEW_ALIAS",
            "2 arguments",
            args.len(),
        ));
    };
    let name = checked_name(name)?;
    ctx.register_alias(name, unwrap_enclosing(replacement));
    Ok(())
}

/// Validate a user-chosen command name and warn when it can never be reached.
fn checked_name(name: &str) -> Result<&str, CommandError> {
    let name = unquote(name);
    if !is_command_name(name) {
        return Err(CommandError::InvalidCommandName(name.to_string()));
    }
    if is_builtin(name) {
        warn!("'{name}' is a built-in command; the definition will never be used");
    }
    Ok(name)
}
