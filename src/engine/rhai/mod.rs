//! This module provides the Rhai engine that loads and runs operator scripts.

mod ast_analysis;
pub mod compiler;
mod create_engine;
pub mod parameters;
pub mod runtime;

pub use compiler::{RhaiCompiler, RhaiCompilerError, ScriptAnalysis};
pub use create_engine::create_engine;
pub use runtime::ScriptRuntime;
