//! Extension commands
//!
//! `NEW_COMMAND` compiles a Rust function into a native module under
//! `<output-dir>/commands/`. In-comment commands that are neither built-ins
//! nor aliases are looked up there, loaded once, and invoked through the
//! [`abi`] calling convention.

pub mod abi;
pub mod builder;

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::env::consts::DLL_EXTENSION;
use std::ffi::c_void;
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};
use tracing::debug;

use crate::context::DocContext;
use crate::error::{CommandError, ExtensionError};
use crate::source::resolver::{CommandCall, CommandResolver, Expansion};
use crate::text::is_command_name;

use abi::{emit_into_string, entry_symbol, EntryFn, StrRef};

pub use builder::ExtensionBuilder;

/// Directory holding generated sources and compiled modules
#[must_use]
pub fn commands_dir(output_dir: &Path) -> PathBuf {
    output_dir.join("commands")
}

/// Path of the compiled module for command `name`
#[must_use]
pub fn module_path(output_dir: &Path, name: &str) -> PathBuf {
    commands_dir(output_dir).join(format!("{name}.{DLL_EXTENSION}"))
}

/// Resolves commands to compiled extension modules
#[derive(Debug, Default)]
pub struct ExtensionResolver {
    /// Modules loaded so far, kept open until the end of the run
    loaded: HashMap<String, Library>,
    /// Compiler diagnostics of failed builds, reported on first use
    build_failures: HashMap<String, String>,
}

impl ExtensionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of building `name`.
    ///
    /// A success clears any earlier failure and drops a stale loaded module so
    /// the next use picks up the new build.
    pub fn record_build(&mut self, name: &str, result: &Result<PathBuf, ExtensionError>) {
        match result {
            Ok(_) => {
                self.build_failures.remove(name);
                self.loaded.remove(name);
            }
            Err(ExtensionError::BuildFailed { diagnostics, .. }) => {
                self.build_failures.insert(name.to_string(), diagnostics.clone());
            }
            Err(other) => {
                self.build_failures.insert(name.to_string(), other.to_string());
            }
        }
    }

    /// Returns true if a module for `name` is loaded or present on disk
    pub fn is_available(&self, output_dir: &Path, name: &str) -> bool {
        if !is_command_name(name) {
            return false;
        }
        self.loaded.contains_key(name) || module_path(output_dir, name).is_file()
    }

    /// Load (or reuse) the module for `name` and run it.
    pub fn invoke(
        &mut self,
        output_dir: &Path,
        name: &str,
        code: &str,
        args: &[String],
    ) -> Result<String, ExtensionError> {
        let library = match self.loaded.entry(name.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let path = module_path(output_dir, name);
                debug!(module = %path.display(), "loading extension module");
                // SAFETY: modules are built from generated sources whose
                // initialisers have no side effects beyond the Rust runtime.
                let library = unsafe { Library::new(&path) }.map_err(|source| {
                    ExtensionError::Load {
                        name: name.to_string(),
                        source,
                    }
                })?;
                entry.insert(library)
            }
        };

        let symbol = entry_symbol(name);
        // SAFETY: the symbol is exported by the generated entry point with the
        // `EntryFn` signature.
        let entry: Symbol<EntryFn> = unsafe { library.get(symbol.as_bytes()) }.map_err(|source| {
            ExtensionError::MissingSymbol {
                name: name.to_string(),
                symbol: symbol.clone(),
                source,
            }
        })?;

        let argv: Vec<StrRef> = args.iter().map(|a| StrRef::new(a)).collect();
        let mut out = String::new();
        // SAFETY: every `StrRef` borrows a string that outlives the call, and
        // `out` is the `String` that `emit_into_string` expects behind `sink`.
        let status = unsafe {
            entry(
                StrRef::new(code),
                argv.as_ptr(),
                argv.len(),
                std::ptr::addr_of_mut!(out).cast::<c_void>(),
                emit_into_string,
            )
        };

        if status != 0 {
            return Err(ExtensionError::Failed {
                name: name.to_string(),
                status,
            });
        }
        Ok(out)
    }
}

impl CommandResolver for ExtensionResolver {
    fn kind(&self) -> &'static str {
        "extension"
    }

    fn resolve(
        &mut self,
        call: &CommandCall<'_>,
        ctx: &mut DocContext,
    ) -> Option<Result<Expansion, CommandError>> {
        if let Some(diagnostics) = self.build_failures.get(call.name) {
            return Some(Err(ExtensionError::BuildFailed {
                name: call.name.to_string(),
                diagnostics: diagnostics.clone(),
            }
            .into()));
        }

        let output_dir = ctx.output_dir();
        if !self.is_available(output_dir, call.name) {
            return None;
        }

        let result = self
            .invoke(output_dir, call.name, call.site.trailing(), call.args)
            .map(Expansion::Text)
            .map_err(CommandError::from);
        Some(result)
    }
}
