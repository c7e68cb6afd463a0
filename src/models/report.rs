//! Serializable views of a loaded script for command-line output.

use std::path::PathBuf;

use rhai::Dynamic;
use serde::Serialize;
use serde_json::Value;

use super::parameter::ParameterKind;
use crate::script::{ScriptErrorInfo, ScriptOperator};

/// Converts a script value to JSON. Values without a JSON form are rendered
/// as their display string.
pub fn dynamic_to_json(value: &Dynamic) -> Value {
    serde_json::to_value(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

/// One parameter slot as reported to the user.
#[derive(Debug, Clone, Serialize)]
pub struct ParameterReport {
    /// Zero-based index.
    pub index: usize,
    /// Slot name, e.g. `Parameter0`.
    pub slot: String,
    /// Prompt shown next to the value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// The value type the slot accepts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ParameterKind>,
    /// The current value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Why the slot is unavailable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What discovery found in a script.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryReport {
    /// Script file, if loaded from one.
    pub file: Option<PathBuf>,
    /// Display title, with the file-name fallback applied.
    pub title: String,
    /// Command name, with the file-name fallback applied.
    pub command: String,
    /// Script documentation or the generated help text.
    pub documentation: String,
    /// True if the script defines `getResult()`.
    pub executable: bool,
    /// The value of `NumParameters`, after clamping.
    pub declared_parameters: usize,
    /// One entry per declared slot.
    pub parameters: Vec<ParameterReport>,
    /// Non-fatal discovery problems.
    pub issues: Vec<String>,
}

impl DiscoveryReport {
    /// Builds a report from the operator's last discovery.
    pub fn from_operator(operator: &ScriptOperator) -> Self {
        let discovery = operator.discovery();
        let parameters = discovery
            .parameters
            .iter()
            .map(|slot| match &slot.parameter {
                Ok(param) => ParameterReport {
                    index: slot.index,
                    slot: slot.slot.clone(),
                    label: param.label.clone(),
                    kind: Some(param.kind),
                    value: Some(dynamic_to_json(&param.value)),
                    error: None,
                },
                Err(err) => ParameterReport {
                    index: slot.index,
                    slot: slot.slot.clone(),
                    label: None,
                    kind: None,
                    value: None,
                    error: Some(err.to_string()),
                },
            })
            .collect();

        Self {
            file: operator.file_name().map(|path| path.to_path_buf()),
            title: operator.title(),
            command: operator.command(),
            documentation: operator.documentation(),
            executable: operator.is_executable(),
            declared_parameters: discovery.declared_count,
            parameters,
            issues: discovery.issues.iter().map(|issue| issue.to_string()).collect(),
        }
    }
}

/// The outcome of running a script.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Command name of the script that ran.
    pub command: String,
    /// The value returned by `getResult()`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// The failure, when the run did not succeed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ScriptErrorInfo>,
    /// Lines the script printed.
    pub output: Vec<String>,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rhai::Map;

    use super::*;
    use crate::{config::RhaiConfig, engine::rhai::ScriptRuntime};

    #[test]
    fn test_dynamic_to_json() {
        assert_eq!(dynamic_to_json(&Dynamic::from("HI There".to_string())), Value::from("HI There"));
        assert_eq!(dynamic_to_json(&Dynamic::from_int(3)), Value::from(3));

        let mut map = Map::new();
        map.insert("ok".into(), Dynamic::from_bool(true));
        assert_eq!(dynamic_to_json(&Dynamic::from_map(map)), serde_json::json!({ "ok": true }));
    }

    #[test]
    fn test_report_lists_every_declared_slot() {
        let source = r#"
            fn setDefaultParameters() {
                this.NumParameters = 2;
                this.Parameter0 = int_parameter("Count", 4);
            }
            fn getTitle() { "Counter" }
            fn getResult() { this.Parameter0.value }
        "#;
        let runtime = Arc::new(ScriptRuntime::new(RhaiConfig::default()));
        let operator = ScriptOperator::from_source(runtime, source).unwrap();

        let report = DiscoveryReport::from_operator(&operator);

        assert_eq!(report.title, "Counter");
        assert!(report.executable);
        assert_eq!(report.declared_parameters, 2);
        assert_eq!(report.parameters.len(), 2);
        assert_eq!(report.parameters[0].value, Some(Value::from(4)));
        assert_eq!(report.parameters[0].kind, Some(ParameterKind::Integer));
        assert!(report.parameters[1].error.as_deref().unwrap().contains("Parameter1"));
        assert_eq!(report.issues.len(), 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["parameters"][0]["label"], "Count");
        assert!(json["parameters"][1].get("value").is_none());
    }
}
