//! Compiles script sources and remembers the result.
//!
//! Loading the same source twice (a reloaded operator, a `duplicate()`)
//! reuses the compiled `AST` and its analysis. Sources loaded from a file
//! replace the file's previous version in the cache.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::Arc,
};

use dashmap::DashMap;
use rhai::{AST, Engine};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::ast_analysis::analyze_ast;

/// A compiled script and the functions the host may call on it.
#[derive(Clone, Debug)]
pub struct ScriptAnalysis {
    /// The compiled script.
    pub ast: Arc<AST>,

    /// Script-defined functions the host can call without arguments.
    pub zero_arg_functions: Arc<HashSet<String>>,

    /// Convention functions declared only with arguments.
    pub misdeclared_functions: Arc<Vec<(String, usize)>>,
}

/// SHA-256 of a script source.
type SourceDigest = [u8; 32];

fn digest(source: &str) -> SourceDigest {
    Sha256::digest(source.as_bytes()).into()
}

/// Compiles scripts on a shared engine, caching by source digest.
#[derive(Debug)]
pub struct RhaiCompiler {
    engine: Arc<Engine>,
    cache: DashMap<SourceDigest, ScriptAnalysis>,
    /// Digest of the source last compiled for each file.
    files: DashMap<PathBuf, SourceDigest>,
}

/// Errors raised while compiling a script.
#[derive(Debug, Clone, Error)]
pub enum RhaiCompilerError {
    /// The source does not parse.
    #[error("Rhai compilation error: {0}")]
    CompilationError(#[from] rhai::ParseError),
}

impl RhaiCompiler {
    /// Creates a compiler backed by the given engine.
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine, cache: DashMap::new(), files: DashMap::new() }
    }

    /// The engine scripts are compiled for and run on.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Compiles `source` and lists its callable functions. Failed
    /// compilations are not cached.
    pub fn analyze_script(&self, source: &str) -> Result<ScriptAnalysis, RhaiCompilerError> {
        let key = digest(source);
        if let Some(hit) = self.cache.get(&key) {
            tracing::trace!(functions = hit.zero_arg_functions.len(), "Compile cache hit");
            return Ok(hit.clone());
        }

        let ast = self.engine.compile(source)?;
        let found = analyze_ast(&ast);
        tracing::debug!(
            functions = found.zero_arg_functions.len(),
            misdeclared = found.misdeclared_functions.len(),
            "Script compiled"
        );

        let analysis = ScriptAnalysis {
            ast: Arc::new(ast),
            zero_arg_functions: Arc::new(found.zero_arg_functions),
            misdeclared_functions: Arc::new(found.misdeclared_functions),
        };
        self.cache.insert(key, analysis.clone());
        Ok(analysis)
    }

    /// Like [`analyze_script`](Self::analyze_script) for the contents of a
    /// file. When the file was compiled before with different contents, the
    /// old entry is evicted unless another file still has that source.
    pub fn analyze_file(&self, path: &Path, source: &str) -> Result<ScriptAnalysis, RhaiCompilerError> {
        let analysis = self.analyze_script(source)?;

        let key = digest(source);
        if let Some(previous) = self.files.insert(path.to_path_buf(), key)
            && previous != key
            && !self.files.iter().any(|entry| *entry.value() == previous)
        {
            tracing::debug!(path = %path.display(), "Evicting previous version of script");
            self.cache.remove(&previous);
        }

        Ok(analysis)
    }
}
