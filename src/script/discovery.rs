//! Host-side discovery and invocation of a script, written against the
//! [`ScriptNamespace`] boundary only.
//!
//! Discovery order:
//! 1. `setDefaultParameters()` when defined,
//! 2. `NumParameters`,
//! 3. `Parameter0` .. `Parameter<NumParameters-1>`, ascending,
//! 4. `getTitle()`, `getCommand()`, `getDocumentation()`, each independently.
//!
//! Every failure along the way is recorded as a [`DiscoveryIssue`] or a
//! per-slot [`ParameterError`]; discovery itself never fails.

use rhai::{Dynamic, FLOAT, Map};

use super::{
    DiscoveryIssue, ParameterError, ScriptError, ScriptNamespace,
    names::{
        GET_CATEGORY_LIST, GET_COMMAND, GET_DOCUMENTATION, GET_RESULT, GET_TITLE, NUM_PARAMETERS,
        SET_DEFAULT_PARAMETERS, parameter_slot,
    },
};
use crate::models::parameter::{ParameterKind, ParameterObject, ScriptParameter};

/// Optional human-readable fields. `None` means the field is unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptMetadata {
    /// Result of `getTitle()`.
    pub title: Option<String>,
    /// Result of `getCommand()`.
    pub command: Option<String>,
    /// Result of `getDocumentation()`.
    pub documentation: Option<String>,
    /// True if the script defines `getCategoryList()`. It is never called.
    pub declares_category_list: bool,
}

/// A parameter read from a slot through its value accessor.
#[derive(Debug, Clone)]
pub struct DiscoveredParameter {
    /// Prompt shown next to the value.
    pub label: Option<String>,
    /// The value type the slot accepts.
    pub kind: ParameterKind,
    /// The current value.
    pub value: Dynamic,
}

/// One declared parameter slot and what was found in it.
#[derive(Debug, Clone)]
pub struct ParameterSlot {
    /// Zero-based index.
    pub index: usize,
    /// Slot name, e.g. `Parameter0`.
    pub slot: String,
    /// The parameter, or why it is unavailable.
    pub parameter: Result<DiscoveredParameter, ParameterError>,
}

/// Everything the host learned about a script.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// The value of `NumParameters`, or zero.
    pub declared_count: usize,
    /// Exactly `declared_count` slots, in index order.
    pub parameters: Vec<ParameterSlot>,
    /// Title, command and documentation.
    pub metadata: ScriptMetadata,
    /// True if the script defines `getResult()`.
    pub executable: bool,
    /// Non-fatal problems.
    pub issues: Vec<DiscoveryIssue>,
}

impl Discovery {
    /// Number of slots that resolved to a parameter.
    pub fn populated_count(&self) -> usize {
        self.parameters.iter().filter(|slot| slot.parameter.is_ok()).count()
    }

    /// Parameters that resolved, paired with their index.
    pub fn available_parameters(&self) -> impl Iterator<Item = (usize, &DiscoveredParameter)> {
        self.parameters
            .iter()
            .filter_map(|slot| slot.parameter.as_ref().ok().map(|param| (slot.index, param)))
    }
}

/// Calls `setDefaultParameters()` if the script defines it.
///
/// Returns false if the call failed; the failure is recorded as an issue.
pub fn apply_defaults<N>(ns: &mut N, issues: &mut Vec<DiscoveryIssue>) -> bool
where
    N: ScriptNamespace + ?Sized,
{
    if !ns.has_function(SET_DEFAULT_PARAMETERS) {
        return true;
    }
    match ns.call_function(SET_DEFAULT_PARAMETERS) {
        Ok(_) => true,
        Err(err) => {
            tracing::warn!(error = %err, "setDefaultParameters() failed");
            issues.push(DiscoveryIssue::DefaultsFailed { message: err.to_string() });
            false
        }
    }
}

/// Reads `NumParameters`. Absent, negative or non-numeric values count as
/// zero; non-numeric values are also recorded as an issue. Counts above the
/// namespace's [`max_parameters`](ScriptNamespace::max_parameters) are
/// clamped to it and recorded.
pub fn read_parameter_count<N>(ns: &N, issues: &mut Vec<DiscoveryIssue>) -> usize
where
    N: ScriptNamespace + ?Sized,
{
    let Some(value) = ns.read_value(NUM_PARAMETERS) else {
        return 0;
    };
    let limit = ns.max_parameters();

    let within_limit = if let Ok(count) = value.as_int() {
        if count <= 0 {
            return 0;
        }
        usize::try_from(count).ok().filter(|&count| count <= limit)
    } else if let Ok(count) = value.as_float() {
        if count.is_nan() || count < 1.0 {
            return 0;
        }
        (count < limit as FLOAT + 1.0).then(|| count.trunc() as usize)
    } else {
        tracing::warn!(type_name = value.type_name(), "NumParameters is not a number");
        issues.push(DiscoveryIssue::InvalidParameterCount { type_name: value.type_name().to_string() });
        return 0;
    };

    within_limit.unwrap_or_else(|| {
        tracing::warn!(declared = %value, limit, "NumParameters exceeds the parameter limit");
        issues.push(DiscoveryIssue::TooManyParameters { declared: value.to_string(), limit });
        limit
    })
}

/// Resolves the object found in a slot through its value accessor.
pub fn resolve_parameter(
    slot: &str,
    value: Option<Dynamic>,
) -> Result<DiscoveredParameter, ParameterError> {
    let value = match value {
        Some(value) if !value.is_unit() => value,
        _ => return Err(ParameterError::MissingSlot { slot: slot.to_string() }),
    };

    let no_accessor = |type_name: &str| ParameterError::NoValueAccessor {
        slot: slot.to_string(),
        type_name: type_name.to_string(),
    };

    if let Some(param) = value.read_lock::<ScriptParameter>() {
        return describe(&*param).ok_or_else(|| no_accessor("Parameter"));
    }
    if let Some(map) = value.read_lock::<Map>() {
        return describe(&*map).ok_or_else(|| no_accessor("map without a 'value' property"));
    }
    Err(no_accessor(value.type_name()))
}

fn describe<P: ParameterObject + ?Sized>(param: &P) -> Option<DiscoveredParameter> {
    let value = param.value()?;
    Some(DiscoveredParameter { label: param.label(), kind: param.kind(), value })
}

/// Reads `Parameter0` through `Parameter<count-1>` in ascending order.
///
/// Never reads `Parameter<count>` or beyond. Each slot resolves
/// independently of the others.
pub fn discover_parameters<N>(
    ns: &N,
    count: usize,
    issues: &mut Vec<DiscoveryIssue>,
) -> Vec<ParameterSlot>
where
    N: ScriptNamespace + ?Sized,
{
    let slots: Vec<ParameterSlot> = (0..count)
        .map(|index| {
            let slot = parameter_slot(index);
            let parameter = resolve_parameter(&slot, ns.read_value(&slot));
            if let Err(err) = &parameter {
                tracing::warn!(%slot, error = %err, "Parameter slot unavailable");
            }
            ParameterSlot { index, slot, parameter }
        })
        .collect();

    let populated = slots.iter().filter(|slot| slot.parameter.is_ok()).count();
    if populated < count {
        issues.push(DiscoveryIssue::CountMismatch { declared: count, populated });
    }

    slots
}

/// Calls one optional metadata accessor. Absent or failing accessors yield
/// `None`; failures are recorded as issues.
fn read_metadata<N>(ns: &mut N, accessor: &str, issues: &mut Vec<DiscoveryIssue>) -> Option<String>
where
    N: ScriptNamespace + ?Sized,
{
    if !ns.has_function(accessor) {
        return None;
    }
    match ns.call_function(accessor) {
        Ok(value) if value.is_unit() => None,
        Ok(value) => Some(value.to_string()),
        Err(err) => {
            tracing::warn!(%accessor, error = %err, "Metadata accessor failed");
            issues.push(DiscoveryIssue::MetadataFailed {
                accessor: accessor.to_string(),
                message: err.to_string(),
            });
            None
        }
    }
}

/// Probes the metadata accessors independently of each other.
pub fn discover_metadata<N>(ns: &mut N, issues: &mut Vec<DiscoveryIssue>) -> ScriptMetadata
where
    N: ScriptNamespace + ?Sized,
{
    ScriptMetadata {
        title: read_metadata(ns, GET_TITLE, issues),
        command: read_metadata(ns, GET_COMMAND, issues),
        documentation: read_metadata(ns, GET_DOCUMENTATION, issues),
        declares_category_list: ns.has_function(GET_CATEGORY_LIST),
    }
}

/// Runs the full discovery sequence.
pub fn discover<N>(ns: &mut N) -> Discovery
where
    N: ScriptNamespace + ?Sized,
{
    let mut issues = Vec::new();

    apply_defaults(ns, &mut issues);
    let declared_count = read_parameter_count(ns, &mut issues);
    let parameters = discover_parameters(ns, declared_count, &mut issues);
    let metadata = discover_metadata(ns, &mut issues);
    let executable = ns.has_function(GET_RESULT);

    tracing::debug!(
        declared_count,
        executable,
        issues = issues.len(),
        title = ?metadata.title,
        "Script discovery finished"
    );

    Discovery { declared_count, parameters, metadata, executable, issues }
}

/// Calls `getResult()` exactly once and returns its value.
///
/// A script without `getResult()` fails with `NotExecutable` before anything
/// else is called.
pub fn invoke<N>(ns: &mut N) -> Result<Dynamic, ScriptError>
where
    N: ScriptNamespace + ?Sized,
{
    if !ns.has_function(GET_RESULT) {
        return Err(ScriptError::NotExecutable);
    }
    ns.call_function(GET_RESULT)
}
