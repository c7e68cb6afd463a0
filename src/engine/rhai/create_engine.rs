use std::sync::Arc;

use rhai::Engine;

use super::{
    parameters::register_parameters_with_rhai,
    runtime::{ExecutionGuard, ScriptOutput},
};
use crate::config::RhaiConfig;

/// Creates a Rhai engine with security limits, the parameter API and host
/// hooks for script output and execution deadlines.
pub fn create_engine(
    rhai_config: &RhaiConfig,
    guard: Arc<ExecutionGuard>,
    output: ScriptOutput,
) -> Engine {
    let mut engine = Engine::new();

    // Apply security limits
    engine.set_max_operations(rhai_config.max_operations);
    engine.set_max_call_levels(rhai_config.max_call_levels);
    engine.set_max_string_size(rhai_config.max_string_size);
    engine.set_max_array_size(rhai_config.max_array_size);
    engine.set_max_map_size(rhai_config.max_map_size);

    // Scripts run in their own namespace and must not load other code
    const DISABLED_SYMBOLS: &[&str] = &["eval", "import", "export"];
    for &symbol in DISABLED_SYMBOLS {
        engine.disable_symbol(symbol);
    }

    register_parameters_with_rhai(&mut engine);

    engine.on_print(move |text| {
        tracing::info!(target: "scriptop::script", "{text}");
        output.push(text);
    });
    engine.on_debug(|text, source, pos| {
        tracing::debug!(target: "scriptop::script", source = source.unwrap_or("-"), line = ?pos.line(), "{text}");
    });

    engine.on_progress(move |_operations| guard.check());

    engine
}
