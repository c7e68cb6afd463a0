//! This module contains the data models for scriptop.

pub mod parameter;
pub mod report;

pub use parameter::{ParameterKind, ParameterObject, ScriptParameter};
pub use report::{DiscoveryReport, RunReport};
