//! The loaded-script entity a host dialog or command works with.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use rhai::{Dynamic, Map};

use super::{
    DiscoveryIssue, ParameterError, RhaiNamespace, ScriptError, ScriptErrorInfo, ScriptNamespace,
    discovery::{self, DiscoveredParameter, Discovery},
};
use crate::{engine::rhai::ScriptRuntime, models::parameter::ScriptParameter};

/// Command name used when neither the script nor a file name provides one.
pub const UNKNOWN_COMMAND: &str = "UNKNOWN";

/// Characters replaced by `_` when a file name becomes a command name.
const COMMAND_UNSAFE_CHARS: &[char] = &[' ', '-', '&', '+', '*', '^', '/', '\\'];

/// A script loaded into its own namespace, with the result of its last
/// discovery.
pub struct ScriptOperator {
    namespace: RhaiNamespace,
    source: String,
    path: Option<PathBuf>,
    discovery: Discovery,
    last_result: Option<Dynamic>,
    last_error: Option<ScriptErrorInfo>,
}

impl ScriptOperator {
    /// Loads a script file. The extension must belong to a supported language.
    pub fn from_file(
        runtime: Arc<ScriptRuntime>,
        path: impl AsRef<Path>,
    ) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        if !ScriptRuntime::supports_path(path) {
            return Err(ScriptError::UnsupportedExtension(path.to_path_buf()));
        }

        let source = fs::read_to_string(path)
            .map_err(|source| ScriptError::Io { path: path.to_path_buf(), source })?;

        tracing::debug!(path = %path.display(), "Loading script");
        Self::load(runtime, source, Some(path.to_path_buf()))
    }

    /// Loads a script from source text.
    pub fn from_source(
        runtime: Arc<ScriptRuntime>,
        source: impl Into<String>,
    ) -> Result<Self, ScriptError> {
        Self::load(runtime, source.into(), None)
    }

    fn load(
        runtime: Arc<ScriptRuntime>,
        source: String,
        path: Option<PathBuf>,
    ) -> Result<Self, ScriptError> {
        let namespace = match &path {
            Some(path) => RhaiNamespace::load_file(runtime, path, &source)?,
            None => RhaiNamespace::load(runtime, &source)?,
        };
        let mut operator = Self {
            namespace,
            source,
            path,
            discovery: Discovery::default(),
            last_result: None,
            last_error: None,
        };
        operator.set_default_parameters();
        Ok(operator)
    }

    /// Re-runs discovery: `setDefaultParameters()`, the parameter slots and
    /// the metadata accessors. The namespace is reset first, so parameter
    /// values return to their defaults whether they are assigned in
    /// `setDefaultParameters()` or by top-level `let` statements.
    pub fn set_default_parameters(&mut self) -> &Discovery {
        self.namespace.reset();
        let mut discovery = discovery::discover(&mut self.namespace);
        discovery.issues.extend(self.namespace.misdeclared_functions().iter().map(
            |(function, arity)| DiscoveryIssue::MisdeclaredFunction {
                function: function.clone(),
                arity: *arity,
            },
        ));

        self.discovery = discovery;
        &self.discovery
    }

    /// The result of the last discovery.
    pub fn discovery(&self) -> &Discovery {
        &self.discovery
    }

    /// The declared number of parameters.
    pub fn num_parameters(&self) -> usize {
        self.discovery.declared_count
    }

    /// The parameter at `index`, or `None` if it is out of range or
    /// unavailable.
    pub fn parameter(&self, index: usize) -> Option<&DiscoveredParameter> {
        self.discovery.parameters.get(index)?.parameter.as_ref().ok()
    }

    /// Assigns a new value to a parameter. The value must match the
    /// parameter's kind; integers are accepted for float parameters.
    pub fn set_parameter_value(&mut self, index: usize, value: Dynamic) -> Result<(), ParameterError> {
        let count = self.discovery.declared_count;
        let entry = self
            .discovery
            .parameters
            .get_mut(index)
            .ok_or(ParameterError::IndexOutOfRange { index, count })?;
        let slot = entry.slot.clone();
        let current = entry
            .parameter
            .as_mut()
            .map_err(|_| ParameterError::Unavailable { slot: slot.clone() })?;

        let found = value.type_name().to_string();
        let value = current.kind.coerce(value).ok_or_else(|| ParameterError::KindMismatch {
            slot: slot.clone(),
            expected: current.kind,
            found,
        })?;

        let stored = self
            .namespace
            .read_value(&slot)
            .ok_or_else(|| ParameterError::MissingSlot { slot: slot.clone() })?;
        let updated = replace_value(stored, value.clone())
            .ok_or_else(|| ParameterError::Unavailable { slot: slot.clone() })?;
        if !self.namespace.write_value(&slot, updated) {
            return Err(ParameterError::MissingSlot { slot });
        }

        tracing::debug!(%slot, value = %value, "Parameter value updated");
        current.value = value;
        Ok(())
    }

    /// Parses text input according to the parameter's kind and assigns it.
    pub fn set_parameter_from_str(&mut self, index: usize, input: &str) -> Result<(), ParameterError> {
        let count = self.discovery.declared_count;
        let entry =
            self.discovery.parameters.get(index).ok_or(ParameterError::IndexOutOfRange { index, count })?;
        let kind = match &entry.parameter {
            Ok(param) => param.kind,
            Err(_) => return Err(ParameterError::Unavailable { slot: entry.slot.clone() }),
        };

        let value = kind
            .parse(input)
            .map_err(|message| ParameterError::InvalidInput { slot: entry.slot.clone(), message })?;
        self.set_parameter_value(index, value)
    }

    /// The script title, else the file stem, else an empty string.
    pub fn title(&self) -> String {
        self.discovery
            .metadata
            .title
            .clone()
            .or_else(|| self.file_stem())
            .unwrap_or_default()
    }

    /// The script command, else the file stem made identifier-safe, else
    /// `UNKNOWN`.
    pub fn command(&self) -> String {
        self.discovery
            .metadata
            .command
            .clone()
            .or_else(|| self.file_stem().map(|stem| stem.replace(COMMAND_UNSAFE_CHARS, "_")))
            .unwrap_or_else(|| UNKNOWN_COMMAND.to_string())
    }

    /// The script documentation, else a description of how to write a
    /// script the host can discover.
    pub fn documentation(&self) -> String {
        self.discovery.metadata.documentation.clone().unwrap_or_else(default_documentation)
    }

    /// True if the script defines `getResult()`.
    pub fn is_executable(&self) -> bool {
        self.discovery.executable
    }

    /// Runs `getResult()` once and returns its value.
    pub fn get_result(&mut self) -> Result<Dynamic, ScriptError> {
        self.last_error = None;

        match discovery::invoke(&mut self.namespace) {
            Ok(value) => {
                tracing::info!(command = %self.command(), "Script executed");
                self.last_result = Some(value.clone());
                Ok(value)
            }
            Err(err) => {
                tracing::error!(command = %self.command(), error = %err, "Script execution failed");
                self.last_error = Some(err.info());
                Err(err)
            }
        }
    }

    /// The value returned by the last successful `get_result`.
    pub fn last_result(&self) -> Option<&Dynamic> {
        self.last_result.as_ref()
    }

    /// The error raised by the last `get_result`, if it failed.
    pub fn last_error(&self) -> Option<&ScriptErrorInfo> {
        self.last_error.as_ref()
    }

    /// Path of the script file, if it was loaded from one.
    pub fn file_name(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Everything scripts printed since the last drain.
    pub fn take_output(&self) -> Vec<String> {
        self.namespace.runtime().take_output()
    }

    /// Loads a fresh copy of this script in a new namespace and copies the
    /// current parameter values across.
    pub fn duplicate(&self) -> Result<Self, ScriptError> {
        let mut copy =
            Self::load(Arc::clone(self.namespace.runtime()), self.source.clone(), self.path.clone())?;

        for (index, param) in self.discovery.available_parameters() {
            if let Err(err) = copy.set_parameter_value(index, param.value.clone()) {
                tracing::warn!(index, error = %err, "Could not copy parameter value");
            }
        }

        Ok(copy)
    }

    fn file_stem(&self) -> Option<String> {
        self.path
            .as_deref()
            .and_then(Path::file_stem)
            .map(|stem| stem.to_string_lossy().into_owned())
    }
}

/// Writes `value` into a parameter object, keeping its other properties.
fn replace_value(stored: Dynamic, value: Dynamic) -> Option<Dynamic> {
    if stored.is::<ScriptParameter>() {
        let mut param = stored.try_cast::<ScriptParameter>()?;
        param.set_value(value);
        return Some(Dynamic::from(param));
    }
    if stored.is_map() {
        let mut map = stored.try_cast::<Map>()?;
        map.insert("value".into(), value);
        return Some(Dynamic::from_map(map));
    }
    None
}

/// Help text for scripts without `getDocumentation()`.
pub fn default_documentation() -> String {
    [
        "This script does not document itself.",
        "",
        "To be discovered and run by the host, a script defines:",
        "  1. fn getResult(), which does the work and returns the result;",
        "  2. optionally fn setDefaultParameters(), which sets this.NumParameters",
        "     and this.Parameter0, this.Parameter1, ... using parameter(),",
        "     string_parameter(), int_parameter(), float_parameter() or bool_parameter();",
        "  3. optionally fn getTitle(), fn getCommand() and fn getDocumentation().",
    ]
    .join("\n")
}
