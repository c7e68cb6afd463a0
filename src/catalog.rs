//! Indexes the executable scripts found under a set of directories.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Serialize;

use crate::{
    engine::rhai::ScriptRuntime,
    script::{ScriptError, ScriptOperator},
};

/// An executable script found during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Command name, see [`ScriptOperator::command`].
    pub command: String,
    /// Display title, see [`ScriptOperator::title`].
    pub title: String,
    /// Location of the script file.
    pub path: PathBuf,
    /// Declared parameter count.
    pub num_parameters: usize,
}

/// Executable scripts indexed by command name.
#[derive(Debug, Default)]
pub struct ScriptCatalog {
    entries: Vec<CatalogEntry>,
    failures: Vec<(PathBuf, ScriptError)>,
}

impl ScriptCatalog {
    /// Walks each directory recursively and loads every supported script.
    ///
    /// Scripts without `getResult()` are skipped. Scripts that fail to load
    /// are collected in [`failures`](Self::failures). A directory listed
    /// twice is only walked once.
    pub fn scan(runtime: Arc<ScriptRuntime>, dirs: &[PathBuf]) -> Self {
        let mut catalog = Self::default();
        let mut visited = HashSet::new();

        for dir in dirs {
            if !dir.is_dir() {
                tracing::warn!(dir = %dir.display(), "Script directory does not exist, skipping");
                continue;
            }
            catalog.scan_dir(&runtime, dir, &mut visited);
        }

        catalog.entries.sort_by(|a, b| a.command.cmp(&b.command).then_with(|| a.path.cmp(&b.path)));
        tracing::info!(
            scripts = catalog.entries.len(),
            failures = catalog.failures.len(),
            "Script catalog built"
        );
        catalog
    }

    fn scan_dir(&mut self, runtime: &Arc<ScriptRuntime>, dir: &Path, visited: &mut HashSet<PathBuf>) {
        let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        if !visited.insert(canonical) {
            return;
        }

        let read_dir = match fs::read_dir(dir) {
            Ok(read_dir) => read_dir,
            Err(source) => {
                tracing::warn!(dir = %dir.display(), error = %source, "Failed to read script directory");
                self.failures.push((dir.to_path_buf(), ScriptError::Io { path: dir.to_path_buf(), source }));
                return;
            }
        };

        let mut paths: Vec<PathBuf> = read_dir.filter_map(|entry| entry.ok().map(|e| e.path())).collect();
        paths.sort();

        for path in paths {
            if path.is_dir() {
                self.scan_dir(runtime, &path, visited);
            } else if ScriptRuntime::supports_path(&path) {
                self.add_file(runtime, path);
            }
        }
    }

    fn add_file(&mut self, runtime: &Arc<ScriptRuntime>, path: PathBuf) {
        match ScriptOperator::from_file(Arc::clone(runtime), &path) {
            Ok(operator) if operator.is_executable() => {
                tracing::debug!(path = %path.display(), command = %operator.command(), "Script added to catalog");
                self.entries.push(CatalogEntry {
                    command: operator.command(),
                    title: operator.title(),
                    num_parameters: operator.num_parameters(),
                    path,
                });
            }
            Ok(_) => {
                tracing::debug!(path = %path.display(), "Script has no getResult(), skipping");
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Failed to load script");
                self.failures.push((path, err));
            }
        }
    }

    /// Catalog entries sorted by command name.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Files and directories that could not be loaded.
    pub fn failures(&self) -> &[(PathBuf, ScriptError)] {
        &self.failures
    }

    /// The first entry with the given command name.
    pub fn find(&self, command: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.command == command)
    }

    /// Loads a fresh operator for a command.
    pub fn load(
        &self,
        runtime: Arc<ScriptRuntime>,
        command: &str,
    ) -> Option<Result<ScriptOperator, ScriptError>> {
        self.find(command).map(|entry| ScriptOperator::from_file(runtime, &entry.path))
    }
}
