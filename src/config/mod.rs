//! Configuration module for scriptop.

mod app_config;
mod helpers;
mod rhai;

pub use app_config::AppConfig;
pub use helpers::deserialize_duration_from_ms;
pub use rhai::{DEFAULT_MAX_PARAMETERS, RhaiConfig};
