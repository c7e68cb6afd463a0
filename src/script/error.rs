use std::{path::PathBuf, time::Duration};

use rhai::{EvalAltResult, Position};
use serde::Serialize;
use thiserror::Error;

use crate::{engine::rhai::RhaiCompilerError, models::parameter::ParameterKind};

/// Errors raised while loading or calling into a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The script file could not be read.
    #[error("Failed to read script '{}': {source}", .path.display())]
    Io {
        /// Path of the script file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The file extension does not belong to a supported script language.
    #[error("Unsupported script file '{}': expected a .rhai file", .0.display())]
    UnsupportedExtension(PathBuf),

    /// The script has syntax errors.
    #[error("Script compilation error: {0}")]
    Compilation(#[from] RhaiCompilerError),

    /// The top-level statements of the script failed.
    #[error("Script failed while loading: {0}")]
    Load(Box<EvalAltResult>),

    /// The script does not define `getResult()`.
    #[error("Script is not executable: it does not define getResult()")]
    NotExecutable,

    /// A function the host asked for is not defined.
    #[error("Script does not define {0}()")]
    MissingFunction(String),

    /// A script function raised an error.
    #[error("Error in {function}(): {source}")]
    Runtime {
        /// The function that failed.
        function: String,
        /// The error raised by the engine.
        source: Box<EvalAltResult>,
    },

    /// A script call ran past the execution timeout.
    #[error("{function}() exceeded the execution timeout of {timeout:?}")]
    Timeout {
        /// The function that was terminated.
        function: String,
        /// The timeout that was exceeded.
        timeout: Duration,
    },
}

impl ScriptError {
    /// Position in the script source the error points at, if known.
    pub fn position(&self) -> Option<Position> {
        let position = match self {
            Self::Compilation(RhaiCompilerError::CompilationError(err)) => err.1,
            Self::Load(err) | Self::Runtime { source: err, .. } => innermost_position(err),
            _ => return None,
        };
        (!position.is_none()).then_some(position)
    }

    /// A serializable summary of the error for reports and error displays.
    pub fn info(&self) -> ScriptErrorInfo {
        let position = self.position();
        ScriptErrorInfo {
            message: self.to_string(),
            line: position.and_then(|p| p.line()),
            column: position.and_then(|p| p.position()),
        }
    }
}

/// Errors raised inside nested script calls carry the call site on the
/// outside; the location that failed is on the innermost error.
fn innermost_position(err: &EvalAltResult) -> Position {
    match err {
        EvalAltResult::ErrorInFunctionCall(_, _, inner, pos) => {
            let inner_pos = innermost_position(inner);
            if inner_pos.is_none() { *pos } else { inner_pos }
        }
        _ => err.position(),
    }
}

/// Message and source location of the last script error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptErrorInfo {
    /// Human-readable message.
    pub message: String,
    /// One-based line number.
    pub line: Option<usize>,
    /// One-based column.
    pub column: Option<usize>,
}

/// Errors attributed to a single parameter slot.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParameterError {
    /// The slot is within `NumParameters` but holds nothing.
    #[error("Parameter slot '{slot}' is not defined")]
    MissingSlot {
        /// Slot name, e.g. `Parameter1`.
        slot: String,
    },

    /// The slot holds an object without a value accessor.
    #[error("Parameter slot '{slot}' holds a {type_name}, which has no value accessor")]
    NoValueAccessor {
        /// Slot name.
        slot: String,
        /// The script type found in the slot.
        type_name: String,
    },

    /// The index is outside `0..NumParameters`.
    #[error("Parameter index {index} is out of range: the script declares {count} parameters")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Declared parameter count.
        count: usize,
    },

    /// The slot was declared but did not resolve to a parameter object.
    #[error("Parameter slot '{slot}' is unavailable")]
    Unavailable {
        /// Slot name.
        slot: String,
    },

    /// A value of the wrong kind was assigned.
    #[error("Parameter slot '{slot}' expects a {expected} value, got {found}")]
    KindMismatch {
        /// Slot name.
        slot: String,
        /// The kind the slot accepts.
        expected: ParameterKind,
        /// The script type that was supplied.
        found: String,
    },

    /// User input could not be parsed for the slot's kind.
    #[error("Invalid input for parameter slot '{slot}': {message}")]
    InvalidInput {
        /// Slot name.
        slot: String,
        /// Parse failure description.
        message: String,
    },
}

/// Non-fatal problems found while discovering a script.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiscoveryIssue {
    /// `setDefaultParameters()` raised an error.
    #[error("setDefaultParameters() failed: {message}")]
    DefaultsFailed {
        /// The error message.
        message: String,
    },

    /// `NumParameters` is not a number.
    #[error("NumParameters must be a number, found {type_name}")]
    InvalidParameterCount {
        /// The script type found.
        type_name: String,
    },

    /// `NumParameters` is above the host's parameter limit and was clamped.
    #[error("NumParameters is {declared}, only the first {limit} slots are read")]
    TooManyParameters {
        /// The declared value as the script wrote it.
        declared: String,
        /// The limit the count was clamped to.
        limit: usize,
    },

    /// Some slots within `NumParameters` are not populated.
    #[error("NumParameters declares {declared} parameters but only {populated} slots are populated")]
    CountMismatch {
        /// Declared parameter count.
        declared: usize,
        /// Slots that resolved to a parameter.
        populated: usize,
    },

    /// A metadata accessor raised an error.
    #[error("{accessor}() failed: {message}")]
    MetadataFailed {
        /// The accessor name.
        accessor: String,
        /// The error message.
        message: String,
    },

    /// A convention function is declared with arguments the host never passes.
    #[error("{function}() is declared with {arity} argument(s); the host calls it with none")]
    MisdeclaredFunction {
        /// The function name.
        function: String,
        /// Smallest declared arity.
        arity: usize,
    },
}
