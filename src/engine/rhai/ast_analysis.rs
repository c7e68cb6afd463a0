//! Static analysis of compiled scripts: which functions the host can call.

use std::collections::{HashMap, HashSet};

use rhai::AST;

use crate::script::names::CONVENTION_FUNCTIONS;

/// The result of a script analysis.
#[derive(Debug, Default)]
pub struct ScriptAnalysisResult {
    /// Names of all script-defined functions that take no arguments.
    pub zero_arg_functions: HashSet<String>,

    /// Convention functions that are only declared with arguments, paired
    /// with the smallest declared arity. The host can never call these.
    pub misdeclared_functions: Vec<(String, usize)>,
}

/// Walks the function definitions of a compiled `AST`.
pub fn analyze_ast(ast: &AST) -> ScriptAnalysisResult {
    let mut result = ScriptAnalysisResult::default();
    let mut with_arguments: HashMap<String, usize> = HashMap::new();

    for function in ast.iter_functions() {
        if function.params.is_empty() {
            result.zero_arg_functions.insert(function.name.to_string());
        } else {
            let arity = with_arguments.entry(function.name.to_string()).or_insert(usize::MAX);
            *arity = (*arity).min(function.params.len());
        }
    }

    // Only report convention names without a zero-argument overload
    for &name in CONVENTION_FUNCTIONS {
        if result.zero_arg_functions.contains(name) {
            continue;
        }
        if let Some(&arity) = with_arguments.get(name) {
            result.misdeclared_functions.push((name.to_string(), arity));
        }
    }

    result
}
