//! Source file discovery from glob patterns
//!
//! Patterns follow the `glob` crate syntax, including `**` for recursive
//! matching. Relative patterns are resolved against the project root.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::CommandError;

/// Files matched by a set of patterns, plus per-pattern problems
#[derive(Debug, Default)]
pub struct Discovered {
    /// Matched regular files, first-seen order, no duplicates
    pub files: Vec<PathBuf>,
    /// Invalid patterns and unreadable matches. Each contributes nothing.
    pub errors: Vec<CommandError>,
}

/// Resolve `patterns` against `root` into a de-duplicated list of files.
pub fn discover_sources(root: &Path, patterns: &[String]) -> Discovered {
    let mut discovered = Discovered::default();
    let mut seen = HashSet::new();

    for pattern in patterns {
        let full_pattern = if Path::new(pattern).is_absolute() {
            PathBuf::from(pattern)
        } else {
            root.join(pattern)
        };
        let pattern_str = full_pattern.to_string_lossy();

        let entries = match glob::glob(&pattern_str) {
            Ok(entries) => entries,
            Err(source) => {
                discovered.errors.push(CommandError::Pattern {
                    pattern: pattern.clone(),
                    source,
                });
                continue;
            }
        };

        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    let path = e.path().to_path_buf();
                    discovered.errors.push(CommandError::ReadSource {
                        path,
                        source: e.into(),
                    });
                    continue;
                }
            };

            if !path.is_file() {
                continue;
            }

            // Skip if already seen
            if seen.insert(path.clone()) {
                discovered.files.push(path);
            }
        }
    }

    debug!(count = discovered.files.len(), "discovered sources");
    discovered
}
