//! The boundary between the convention and the scripting engine.

use std::{collections::HashSet, path::Path, sync::Arc};

use rhai::{AST, Dynamic, Map, Scope};

use super::ScriptError;
use crate::{
    config::DEFAULT_MAX_PARAMETERS,
    engine::rhai::{ScriptAnalysis, ScriptRuntime},
};

/// One loaded script's isolated namespace.
///
/// Absence is a valid answer: `has_function` returns false and `read_value`
/// returns `None` for names the script does not define.
pub trait ScriptNamespace {
    /// Returns true if the script defines a function with this name that
    /// takes no arguments.
    fn has_function(&self, name: &str) -> bool;

    /// Calls a zero-argument function. Fails with `MissingFunction` if it is
    /// not defined.
    fn call_function(&mut self, name: &str) -> Result<Dynamic, ScriptError>;

    /// Reads a named value from the namespace.
    fn read_value(&self, name: &str) -> Option<Dynamic>;

    /// The most parameter slots discovery reads from this namespace.
    fn max_parameters(&self) -> usize {
        DEFAULT_MAX_PARAMETERS
    }
}

/// A script loaded into the Rhai runtime.
///
/// Convention functions run with `this` bound to the script's record, so
/// `this.NumParameters = 1` inside `setDefaultParameters()` lands here.
/// Variables created by top-level `let` statements are visible as well; the
/// record takes precedence.
pub struct RhaiNamespace {
    runtime: Arc<ScriptRuntime>,
    ast: Arc<AST>,
    functions: Arc<HashSet<String>>,
    misdeclared_functions: Arc<Vec<(String, usize)>>,
    scope: Scope<'static>,
    initial_scope: Scope<'static>,
    record: Dynamic,
}

impl RhaiNamespace {
    /// Compiles `source` and runs its top-level statements once.
    pub fn load(runtime: Arc<ScriptRuntime>, source: &str) -> Result<Self, ScriptError> {
        let analysis = runtime.compile(source)?;
        Self::from_analysis(runtime, analysis)
    }

    /// Compiles the source of the file at `path` and runs its top-level
    /// statements once. A previous version of the same file is dropped from
    /// the compile cache.
    pub fn load_file(
        runtime: Arc<ScriptRuntime>,
        path: &Path,
        source: &str,
    ) -> Result<Self, ScriptError> {
        let analysis = runtime.compile_file(path, source)?;
        Self::from_analysis(runtime, analysis)
    }

    fn from_analysis(runtime: Arc<ScriptRuntime>, analysis: ScriptAnalysis) -> Result<Self, ScriptError> {
        let mut scope = Scope::new();
        runtime.run_top_level(&mut scope, &analysis.ast)?;

        Ok(Self {
            runtime,
            ast: analysis.ast,
            functions: analysis.zero_arg_functions,
            misdeclared_functions: analysis.misdeclared_functions,
            initial_scope: scope.clone(),
            scope,
            record: Dynamic::from_map(Map::new()),
        })
    }

    /// Returns every name to its state right after loading: top-level
    /// variables get their initial values back and the record is emptied.
    pub fn reset(&mut self) {
        self.scope = self.initial_scope.clone();
        self.record = Dynamic::from_map(Map::new());
    }

    /// Convention functions declared only with arguments.
    pub fn misdeclared_functions(&self) -> &[(String, usize)] {
        &self.misdeclared_functions
    }

    /// Returns the runtime this namespace was loaded into.
    pub fn runtime(&self) -> &Arc<ScriptRuntime> {
        &self.runtime
    }

    /// Overwrites an existing named value. Returns false when the name is not
    /// defined in the record or the top-level scope.
    pub fn write_value(&mut self, name: &str, value: Dynamic) -> bool {
        if let Some(mut record) = self.record.write_lock::<Map>() {
            if let Some(slot) = record.get_mut(name) {
                *slot = value;
                return true;
            }
        }
        // Constants are not writable
        match self.scope.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

impl ScriptNamespace for RhaiNamespace {
    fn has_function(&self, name: &str) -> bool {
        self.functions.contains(name)
    }

    fn call_function(&mut self, name: &str) -> Result<Dynamic, ScriptError> {
        if !self.has_function(name) {
            return Err(ScriptError::MissingFunction(name.to_string()));
        }
        self.runtime.call_function(&mut self.scope, &self.ast, &mut self.record, name)
    }

    fn read_value(&self, name: &str) -> Option<Dynamic> {
        self.record
            .read_lock::<Map>()
            .and_then(|record| record.get(name).cloned())
            .or_else(|| self.scope.get_value::<Dynamic>(name))
    }

    fn max_parameters(&self) -> usize {
        self.runtime.config().max_parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RhaiConfig;

    fn load(source: &str) -> RhaiNamespace {
        let runtime = Arc::new(ScriptRuntime::new(RhaiConfig::default()));
        RhaiNamespace::load(runtime, source).unwrap()
    }

    #[test]
    fn test_functions_write_to_the_record() {
        let mut ns = load("fn setDefaultParameters() { this.NumParameters = 1; }");

        assert!(ns.read_value("NumParameters").is_none());
        ns.call_function("setDefaultParameters").unwrap();
        assert_eq!(ns.read_value("NumParameters").unwrap().as_int().unwrap(), 1);
    }

    #[test]
    fn test_top_level_variables_are_visible() {
        let ns = load("let NumParameters = 3;");
        assert_eq!(ns.read_value("NumParameters").unwrap().as_int().unwrap(), 3);
    }

    #[test]
    fn test_record_wins_over_top_level() {
        let mut ns = load("let Title = \"top\"; fn setup() { this.Title = \"record\"; }");
        ns.call_function("setup").unwrap();
        assert_eq!(ns.read_value("Title").unwrap().into_string().unwrap(), "record");
    }

    #[test]
    fn test_missing_function_is_reported() {
        let mut ns = load("fn getTitle() { \"T\" }");

        assert!(ns.has_function("getTitle"));
        assert!(!ns.has_function("getResult"));
        let result = ns.call_function("getResult");
        assert!(matches!(result, Err(ScriptError::MissingFunction(name)) if name == "getResult"));
    }

    #[test]
    fn test_functions_with_arguments_are_not_callable() {
        let ns = load("fn getResult(x) { x }");
        assert!(!ns.has_function("getResult"));
        assert_eq!(ns.misdeclared_functions(), &[("getResult".to_string(), 1)]);
    }

    #[test]
    fn test_write_value_updates_existing_names_only() {
        let mut ns = load("let Offset = 1; fn setup() { this.Scale = 2; }");
        ns.call_function("setup").unwrap();

        assert!(ns.write_value("Scale", Dynamic::from_int(5)));
        assert!(ns.write_value("Offset", Dynamic::from_int(7)));
        assert!(!ns.write_value("Missing", Dynamic::from_int(0)));

        assert_eq!(ns.read_value("Scale").unwrap().as_int().unwrap(), 5);
        assert_eq!(ns.read_value("Offset").unwrap().as_int().unwrap(), 7);
        assert!(ns.read_value("Missing").is_none());
    }

    #[test]
    fn test_reset_restores_the_loaded_state() {
        let mut ns = load("let Offset = 1; fn setup() { this.Scale = 2; }");
        ns.call_function("setup").unwrap();
        ns.write_value("Offset", Dynamic::from_int(7));

        ns.reset();

        assert_eq!(ns.read_value("Offset").unwrap().as_int().unwrap(), 1);
        assert!(ns.read_value("Scale").is_none());
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let runtime = Arc::new(ScriptRuntime::new(RhaiConfig::default()));
        let source = "fn setDefaultParameters() { this.NumParameters = 2; }";
        let mut first = RhaiNamespace::load(Arc::clone(&runtime), source).unwrap();
        let second = RhaiNamespace::load(runtime, source).unwrap();

        first.call_function("setDefaultParameters").unwrap();

        assert!(first.read_value("NumParameters").is_some());
        assert!(second.read_value("NumParameters").is_none());
    }
}
