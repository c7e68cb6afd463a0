//! The host runtime: one configured engine, a compile cache and the guards
//! that apply to every script call.

use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use rhai::{AST, CallFnOptions, Dynamic, Engine, EvalAltResult, Scope};

use super::{RhaiCompiler, RhaiCompilerError, ScriptAnalysis, create_engine};
use crate::{config::RhaiConfig, script::ScriptError};

/// File extensions recognised as scripts.
const SUPPORTED_EXTENSIONS: &[&str] = &["rhai"];

/// Token returned by the progress hook when a call runs past its deadline.
const TIMEOUT_TOKEN: &str = "execution timeout";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds the deadline of the script call currently in progress.
#[derive(Debug, Default)]
pub struct ExecutionGuard {
    deadline: Mutex<Option<Instant>>,
}

impl ExecutionGuard {
    fn arm(&self, timeout: Duration) {
        *lock(&self.deadline) = Instant::now().checked_add(timeout);
    }

    fn disarm(&self) {
        *lock(&self.deadline) = None;
    }

    /// Called from the engine's progress hook. Returns a termination token
    /// once the deadline has passed.
    pub fn check(&self) -> Option<Dynamic> {
        match *lock(&self.deadline) {
            Some(deadline) if Instant::now() >= deadline => Some(Dynamic::from(TIMEOUT_TOKEN.to_string())),
            _ => None,
        }
    }
}

/// Shared channel collecting everything scripts `print`.
#[derive(Debug, Clone, Default)]
pub struct ScriptOutput(Arc<Mutex<Vec<String>>>);

impl ScriptOutput {
    /// Appends one line of output.
    pub fn push(&self, line: &str) {
        lock(&self.0).push(line.to_string());
    }

    /// Drains and returns the collected output.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *lock(&self.0))
    }
}

/// Returns true if the error, or an error it wraps, is a termination by the
/// progress hook.
fn is_terminated(err: &EvalAltResult) -> bool {
    match err {
        EvalAltResult::ErrorTerminated(..) => true,
        EvalAltResult::ErrorInFunctionCall(_, _, inner, _) => is_terminated(inner),
        _ => false,
    }
}

/// The engine every loaded script runs on.
///
/// Calls are serialized: the deadline guard belongs to one call at a time.
#[derive(Debug)]
pub struct ScriptRuntime {
    config: RhaiConfig,
    compiler: RhaiCompiler,
    guard: Arc<ExecutionGuard>,
    output: ScriptOutput,
    call_lock: Mutex<()>,
}

impl ScriptRuntime {
    /// Creates a runtime with the given limits.
    pub fn new(config: RhaiConfig) -> Self {
        let guard = Arc::new(ExecutionGuard::default());
        let output = ScriptOutput::default();
        let engine = create_engine(&config, Arc::clone(&guard), output.clone());

        Self {
            config,
            compiler: RhaiCompiler::new(Arc::new(engine)),
            guard,
            output,
            call_lock: Mutex::new(()),
        }
    }

    /// Returns the configuration the runtime was built with.
    pub fn config(&self) -> &RhaiConfig {
        &self.config
    }

    /// Extensions of files this runtime can load.
    pub fn supported_extensions() -> &'static [&'static str] {
        SUPPORTED_EXTENSIONS
    }

    /// Returns true if the path has a supported script extension.
    pub fn supports_path(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| SUPPORTED_EXTENSIONS.iter().any(|s| s.eq_ignore_ascii_case(ext)))
    }

    /// Compiles and analyzes a script, using the cache when possible.
    pub fn compile(&self, source: &str) -> Result<ScriptAnalysis, RhaiCompilerError> {
        self.compiler.analyze_script(source)
    }

    /// Compiles the source of a script file. A previous version of the same
    /// file is evicted from the cache.
    pub fn compile_file(&self, path: &Path, source: &str) -> Result<ScriptAnalysis, RhaiCompilerError> {
        self.compiler.analyze_file(path, source)
    }

    /// Runs the top-level statements of a script once, leaving its variables
    /// in `scope`.
    pub fn run_top_level(&self, scope: &mut Scope<'static>, ast: &AST) -> Result<(), ScriptError> {
        self.guarded(None, |engine| engine.run_ast_with_scope(scope, ast))
    }

    /// Calls a script-defined zero-argument function with `this` bound to the
    /// script's record.
    pub fn call_function(
        &self,
        scope: &mut Scope<'static>,
        ast: &AST,
        this: &mut Dynamic,
        name: &str,
    ) -> Result<Dynamic, ScriptError> {
        tracing::debug!(function = name, "Calling script function");
        self.guarded(Some(name), |engine| {
            let options = CallFnOptions::new().eval_ast(false).rewind_scope(true).bind_this_ptr(this);
            engine.call_fn_with_options::<Dynamic>(options, scope, ast, name, ())
        })
    }

    /// Drains everything scripts have printed since the last call.
    pub fn take_output(&self) -> Vec<String> {
        self.output.take()
    }

    fn guarded<T>(
        &self,
        function: Option<&str>,
        call: impl FnOnce(&Engine) -> Result<T, Box<EvalAltResult>>,
    ) -> Result<T, ScriptError> {
        let _serialized = lock(&self.call_lock);

        self.guard.arm(self.config.execution_timeout);
        let result = call(self.compiler.engine());
        self.guard.disarm();

        result.map_err(|err| {
            if is_terminated(&err) {
                let function = function.unwrap_or("<top-level>").to_string();
                tracing::warn!(%function, timeout = ?self.config.execution_timeout, "Script call timed out");
                return ScriptError::Timeout { function, timeout: self.config.execution_timeout };
            }
            match function {
                Some(function) => ScriptError::Runtime { function: function.to_string(), source: err },
                None => ScriptError::Load(err),
            }
        })
    }
}
