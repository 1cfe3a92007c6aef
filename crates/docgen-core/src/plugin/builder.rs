//! Compiling extension commands into loadable modules

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::config::ExtensionConfig;
use crate::error::ExtensionError;

use super::{commands_dir, module_path};

/// Support code appended to every generated module. It defines the ABI types
/// and forwards the exported entry point to the user function.
const ENTRY_TEMPLATE: &str = r#"
#[repr(C)]
#[derive(Clone, Copy)]
pub struct StrRef {
    ptr: *const u8,
    len: usize,
}

impl StrRef {
    unsafe fn into_owned(self) -> String {
        if self.ptr.is_null() || self.len == 0 {
            return String::new();
        }
        String::from_utf8_lossy(std::slice::from_raw_parts(self.ptr, self.len)).into_owned()
    }
}

#[no_mangle]
pub unsafe extern "C" fn docgen_command_{name}(
    code: StrRef,
    argv: *const StrRef,
    argc: usize,
    sink: *mut std::ffi::c_void,
    emit: extern "C" fn(*mut std::ffi::c_void, StrRef),
) -> i32 {
    let code = code.into_owned();
    let args: Vec<String> = if argv.is_null() {
        Vec::new()
    } else {
        std::slice::from_raw_parts(argv, argc)
            .iter()
            .map(|arg| arg.into_owned())
            .collect()
    };
    match std::panic::catch_unwind(|| {name}(&code, &args)) {
        Ok(out) => {
            emit(sink, StrRef { ptr: out.as_ptr(), len: out.len() });
            0
        }
        Err(_) => 1,
    }
}
"#;

/// Writes extension sources and runs the compiler on them
#[derive(Debug, Clone)]
pub struct ExtensionBuilder {
    config: ExtensionConfig,
}

impl Default for ExtensionBuilder {
    fn default() -> Self {
        Self::new(ExtensionConfig::default())
    }
}

impl ExtensionBuilder {
    /// Create a builder with the given toolchain settings
    #[must_use]
    pub fn new(config: ExtensionConfig) -> Self {
        Self { config }
    }

    /// Generate the module source for command `name`.
    ///
    /// `items` is emitted verbatim at module level (typically `use` lines).
    /// `body` becomes the body of `fn name(code: &str, args: &[String]) -> String`
    /// and is wrapped in braces unless it already is a braced block.
    #[must_use]
    pub fn render_source(name: &str, items: &str, body: &str) -> String {
        let mut source = String::from("#![allow(non_snake_case, unused_imports, unused_variables)]\n");

        let items = items.trim();
        if !items.is_empty() {
            source.push_str(items);
            source.push('\n');
        }

        let body = body.trim();
        let _ = writeln!(source, "\nfn {name}(code: &str, args: &[String]) -> String");
        if body.starts_with('{') && body.ends_with('}') {
            source.push_str(body);
        } else {
            let _ = write!(source, "{{\n{body}\n}}");
        }
        source.push('\n');

        source.push_str(&ENTRY_TEMPLATE.replace("{name}", name));
        source
    }

    /// Materialise and compile command `name` under `output_dir/commands/`.
    ///
    /// Returns the path of the compiled module.
    pub fn build(
        &self,
        output_dir: &Path,
        name: &str,
        items: &str,
        body: &str,
    ) -> Result<PathBuf, ExtensionError> {
        let io_err = |source| ExtensionError::Io {
            name: name.to_string(),
            source,
        };

        let dir = commands_dir(output_dir);
        std::fs::create_dir_all(&dir).map_err(io_err)?;

        let source_path = dir.join(format!("{name}.rs"));
        std::fs::write(&source_path, Self::render_source(name, items, body)).map_err(io_err)?;

        let module = module_path(output_dir, name);
        let mut cmd = self.command(name, &source_path, &module);
        debug!(command = ?cmd, "building extension module");

        let output = cmd.output().map_err(|e| ExtensionError::BuildFailed {
            name: name.to_string(),
            diagnostics: format!("failed to run '{}': {}", self.config.compiler, e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtensionError::BuildFailed {
                name: name.to_string(),
                diagnostics: stderr.trim().to_string(),
            });
        }

        debug!(module = %module.display(), "built extension module");
        Ok(module)
    }

    /// The compiler invocation for one module
    fn command(&self, name: &str, source: &Path, module: &Path) -> Command {
        let mut cmd = Command::new(&self.config.compiler);

        cmd.arg("--edition")
            .arg(&self.config.edition)
            .arg("--crate-type")
            .arg("cdylib")
            .arg("--crate-name")
            .arg(format!("docgen_cmd_{}", name.to_ascii_lowercase()))
            .arg("-C")
            .arg(format!("opt-level={}", self.config.opt_level));

        for flag in &self.config.flags {
            cmd.arg(flag);
        }

        cmd.arg("-o").arg(module).arg(source);
        cmd
    }
}
