//! In-comment command interpreter
//!
//! Each comment of a source unit is scanned for `@NAME` tokens. `@DOC` opens a
//! documentation span and `@END` closes it; prose and every other command only
//! take effect inside a span. Commands are resolved by built-ins, then aliases,
//! then extension modules.

pub mod builtins;
pub mod resolver;

use std::path::Path;

use logos::Logos;
use tracing::trace;

use crate::args::split_args;
use crate::comment::extract_comments;
use crate::context::DocContext;
use crate::error::CommandError;
use crate::plugin::ExtensionResolver;
use crate::text::{is_command_name, simplify_whitespace};

use builtins::Builtins;
use resolver::{AliasResolver, CommandCall, CommandResolver, CommentSite, Expansion};

/// Tokens of comment text
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    /// `@` followed by an uppercase letter, then letters, digits, or `_`
    #[regex(r"@[A-Z][A-Za-z0-9_]*")]
    Command,

    /// An `@` that does not start a command
    #[token("@")]
    At,

    #[regex(r"[^@]+")]
    Text,
}

/// One source file (or synthesized pseudo-source) and its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub filename: String,
    pub text: String,
}

impl SourceUnit {
    pub fn new(filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            text: text.into(),
        }
    }

    /// Read a source file from disk
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::ReadSource`] if the file cannot be read. Invalid
    /// UTF-8 is replaced rather than rejected.
    pub fn read(path: &Path) -> Result<Self, CommandError> {
        let bytes = std::fs::read(path).map_err(|source| CommandError::ReadSource {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        Ok(Self::new(path.display().to_string(), text))
    }
}

/// Whether a unit is a real file or an alias expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    /// A real source file: the section selection resets to main afterwards
    File,
    /// An alias pseudo-source: the section selection carries on
    Expansion,
}

/// The in-comment command interpreter
#[derive(Debug, Default)]
pub struct SourceInterpreter {
    builtins: Builtins,
    aliases: AliasResolver,
    extensions: ExtensionResolver,
    /// Aliases currently being expanded, outermost first
    expanding: Vec<String>,
}

impl SourceInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The extension resolver, for recording build results
    pub fn extensions_mut(&mut self) -> &mut ExtensionResolver {
        &mut self.extensions
    }

    /// Run every comment of `unit` through the interpreter.
    pub fn process_source(&mut self, unit: &SourceUnit, mode: SourceMode, ctx: &mut DocContext) {
        for comment in extract_comments(&unit.text) {
            let site = CommentSite {
                src: &unit.text,
                end: comment.end(),
                filename: &unit.filename,
            };
            self.process_comment(&comment.text, &site, ctx);
        }

        if mode == SourceMode::File {
            ctx.select_section(None);
        }
    }

    /// Interpret the inner text of one comment found at `site`.
    pub fn process_comment(&mut self, text: &str, site: &CommentSite<'_>, ctx: &mut DocContext) {
        let mut in_doc = false;
        let mut lexer = Token::lexer(text);

        while let Some(token) = lexer.next() {
            if token != Ok(Token::Command) {
                if in_doc {
                    ctx.append(lexer.slice());
                }
                continue;
            }

            let name = &lexer.slice()[1..];
            let mut args = Vec::new();
            if lexer.remainder().starts_with('(') {
                let open = lexer.span().end;
                let list = split_args(text, open);
                lexer.bump(list.end - open);
                args = list.args;
            }

            match name {
                "DOC" => in_doc = true,
                "END" => in_doc = false,
                _ if in_doc => self.dispatch(name, &args, site, ctx),
                _ => {}
            }

            // `\(` right after a command is a literal parenthesis
            if lexer.remainder().starts_with("\\(") {
                lexer.bump(1);
            }
        }
    }

    /// Resolve one command, unwrapping the `SIMPLIFY`/`S`/`S_` meta-commands first.
    fn dispatch(
        &mut self,
        name: &str,
        args: &[String],
        site: &CommentSite<'_>,
        ctx: &mut DocContext,
    ) {
        let mut name = name;
        let mut args = args;
        let mut simplify = false;

        loop {
            if let Some(inner) = name.strip_prefix("S_") {
                name = inner;
            } else if name == "SIMPLIFY" || name == "S" {
                let Some((first, rest)) = args.split_first() else {
                    let err = CommandError::argument_count(name, "at least 1 argument", 0);
                    ctx.report(Some(site.filename), &err);
                    return;
                };
                name = first.trim_start_matches('@');
                args = rest;
            } else {
                break;
            }
            simplify = true;
        }

        // Targets taken from arguments have not been through the lexer
        if !is_command_name(name) {
            let err = CommandError::InvalidCommandName(name.to_string());
            ctx.report(Some(site.filename), &err);
            return;
        }

        let call = CommandCall {
            name,
            args,
            site: *site,
        };
        let chain: [&mut dyn CommandResolver; 3] =
            [&mut self.builtins, &mut self.aliases, &mut self.extensions];
        let outcome = chain.into_iter().find_map(|resolver| {
            let result = resolver.resolve(&call, ctx)?;
            trace!(resolver = resolver.kind(), command = call.name, "resolved command");
            Some(result)
        });

        match outcome {
            None => ctx.report(
                Some(site.filename),
                &CommandError::UnknownCommand(name.to_string()),
            ),
            Some(Err(err)) => ctx.report(Some(site.filename), &err),
            Some(Ok(Expansion::Text(text))) if simplify => ctx.append(&simplify_whitespace(&text)),
            Some(Ok(Expansion::Text(text))) => ctx.append(&text),
            Some(Ok(Expansion::Reenter { alias, source })) => {
                self.expand_alias(alias, source, site.filename, ctx);
            }
            Some(Ok(Expansion::Done)) => {}
        }
    }

    /// Re-enter the interpreter with an alias pseudo-source, refusing cycles.
    fn expand_alias(&mut self, alias: String, source: String, filename: &str, ctx: &mut DocContext) {
        if let Some(pos) = self.expanding.iter().position(|a| *a == alias) {
            let mut chain = self.expanding[pos..].to_vec();
            chain.push(alias);
            ctx.report(Some(filename), &CommandError::AliasCycle(chain.join(" -> ")));
            return;
        }

        self.expanding.push(alias);
        let unit = SourceUnit::new(filename, source);
        self.process_source(&unit, SourceMode::Expansion, ctx);
        self.expanding.pop();
    }
}
