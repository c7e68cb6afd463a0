//! Discovery and invocation of operator scripts.
//!
//! A script exposes well-known names ([`names`]) that the host probes through
//! the [`ScriptNamespace`] boundary. [`discovery`] implements the convention;
//! [`ScriptOperator`] is the loaded-script entity built on top of it.

pub mod discovery;
mod error;
pub mod names;
mod namespace;
mod operator;

pub use discovery::{DiscoveredParameter, Discovery, ParameterSlot, ScriptMetadata};
pub use error::{DiscoveryIssue, ParameterError, ScriptError, ScriptErrorInfo};
pub use namespace::{RhaiNamespace, ScriptNamespace};
pub use operator::{ScriptOperator, UNKNOWN_COMMAND, default_documentation};
