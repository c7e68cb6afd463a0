//! The scriptop engine: the Rhai runtime scripts are loaded into.

pub mod rhai;
