//! A set of helpers for testing

use std::sync::Arc;

use crate::{config::RhaiConfig, engine::rhai::ScriptRuntime};

/// Creates a runtime with default limits.
pub fn runtime() -> Arc<ScriptRuntime> {
    Arc::new(ScriptRuntime::new(RhaiConfig::default()))
}

/// A builder for creating convention script sources for testing.
#[derive(Debug, Clone, Default)]
pub struct ScriptSourceBuilder {
    num_parameters: Option<String>,
    parameters: Vec<(usize, String)>,
    result_body: Option<String>,
    title: Option<String>,
    command: Option<String>,
    documentation: Option<String>,
    functions: Vec<String>,
}

impl ScriptSourceBuilder {
    /// Creates a new `ScriptSourceBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `NumParameters` expression assigned in `setDefaultParameters()`.
    pub fn num_parameters(mut self, expr: impl ToString) -> Self {
        self.num_parameters = Some(expr.to_string());
        self
    }

    /// Assigns an expression to the `Parameter<index>` slot.
    pub fn parameter(mut self, index: usize, expr: &str) -> Self {
        self.parameters.push((index, expr.to_string()));
        self
    }

    /// Assigns a `string_parameter(label, value)` to the `Parameter<index>` slot.
    pub fn string_parameter(self, index: usize, label: &str, value: &str) -> Self {
        self.parameter(index, &format!("string_parameter({label:?}, {value:?})"))
    }

    /// Sets the body of `getResult()`.
    pub fn result(mut self, body: &str) -> Self {
        self.result_body = Some(body.to_string());
        self
    }

    /// Adds a `getTitle()` returning the given string.
    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Adds a `getCommand()` returning the given string.
    pub fn command(mut self, command: &str) -> Self {
        self.command = Some(command.to_string());
        self
    }

    /// Adds a `getDocumentation()` returning the given string.
    pub fn documentation(mut self, documentation: &str) -> Self {
        self.documentation = Some(documentation.to_string());
        self
    }

    /// Appends arbitrary source, e.g. an extra function definition.
    pub fn function(mut self, source: &str) -> Self {
        self.functions.push(source.to_string());
        self
    }

    /// Builds the script source.
    pub fn build(self) -> String {
        let mut source = String::new();

        if self.num_parameters.is_some() || !self.parameters.is_empty() {
            source.push_str("fn setDefaultParameters() {\n");
            if let Some(count) = &self.num_parameters {
                source.push_str(&format!("    this.NumParameters = {count};\n"));
            }
            for (index, expr) in &self.parameters {
                source.push_str(&format!("    this.Parameter{index} = {expr};\n"));
            }
            source.push_str("}\n");
        }

        if let Some(body) = &self.result_body {
            source.push_str(&format!("fn getResult() {{\n    {body}\n}}\n"));
        }
        for (name, value) in [
            ("getTitle", &self.title),
            ("getCommand", &self.command),
            ("getDocumentation", &self.documentation),
        ] {
            if let Some(value) = value {
                source.push_str(&format!("fn {name}() {{ {value:?} }}\n"));
            }
        }
        for function in &self.functions {
            source.push_str(function);
            source.push('\n');
        }

        source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_renders_convention_functions() {
        let source = ScriptSourceBuilder::new()
            .num_parameters(1)
            .string_parameter(0, "Text", "HI")
            .result("this.Parameter0.value")
            .title("Echo")
            .build();

        assert!(source.contains("this.NumParameters = 1;"));
        assert!(source.contains(r#"this.Parameter0 = string_parameter("Text", "HI");"#));
        assert!(source.contains("fn getResult()"));
        assert!(source.contains(r#"fn getTitle() { "Echo" }"#));
        assert!(!source.contains("getCommand"));
    }

    #[test]
    fn test_empty_builder_renders_nothing() {
        assert!(ScriptSourceBuilder::new().build().is_empty());
    }
}
