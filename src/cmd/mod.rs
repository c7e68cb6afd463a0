//! Command-line entry points of the scriptop host.

pub mod inspect;
pub mod list;
pub mod run;

use std::sync::Arc;

use thiserror::Error;

pub use inspect::InspectArgs;
pub use list::ListArgs;
pub use run::RunArgs;

use crate::{
    config::AppConfig,
    engine::rhai::ScriptRuntime,
    script::{ParameterError, ScriptError},
};

/// Errors surfaced to the command-line user.
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    /// Loading or running the script failed.
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),
    /// A parameter value was rejected.
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),
    /// A `-p` argument is not of the form `INDEX=VALUE`.
    #[error("Invalid parameter assignment '{0}': expected INDEX=VALUE")]
    InvalidAssignment(String),
    /// The report could not be serialized.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Builds the shared runtime from the application configuration.
fn runtime(config: &AppConfig) -> Arc<ScriptRuntime> {
    Arc::new(ScriptRuntime::new(config.rhai.clone()))
}
