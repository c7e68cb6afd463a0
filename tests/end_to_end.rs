//! End-to-end tests running script files through `ScriptOperator`

use std::{path::PathBuf, sync::Arc, time::Duration};

use rhai::Dynamic;
use scriptop::{
    config::RhaiConfig,
    engine::rhai::ScriptRuntime,
    models::{DiscoveryReport, ParameterKind, RunReport},
    script::{ScriptError, ScriptOperator},
    test_helpers::{ScriptSourceBuilder, runtime},
};

fn script_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scripts").join(name)
}

#[test]
fn test_echo_script_defaults() {
    let runtime = runtime();
    let mut operator = ScriptOperator::from_file(Arc::clone(&runtime), script_path("echo.rhai")).unwrap();

    assert_eq!(operator.num_parameters(), 2);
    assert_eq!(operator.title(), "Echo");
    assert_eq!(operator.command(), "Echo");
    assert!(operator.discovery().metadata.declares_category_list);

    let first = operator.parameter(0).unwrap();
    assert_eq!(first.label.as_deref(), Some("First word"));
    assert_eq!(first.kind, ParameterKind::String);

    let result = operator.get_result().unwrap();
    assert_eq!(result.into_string().unwrap(), "HI There");
    assert_eq!(operator.take_output(), vec!["HI There".to_string()]);
}

#[test]
fn test_echo_script_with_edited_parameter() {
    let mut operator = ScriptOperator::from_file(runtime(), script_path("echo.rhai")).unwrap();

    operator.set_parameter_from_str(1, "World").unwrap();

    assert_eq!(operator.get_result().unwrap().into_string().unwrap(), "HI World");
}

#[test]
fn test_scale_script_mixes_parameter_types() {
    let mut operator = ScriptOperator::from_file(runtime(), script_path("math/scale.rhai")).unwrap();
    assert_eq!(operator.num_parameters(), 3);
    assert_eq!(operator.parameter(1).unwrap().kind, ParameterKind::Float);

    operator.set_parameter_value(2, Dynamic::from_int(2)).unwrap();
    let values: Vec<f64> = operator
        .get_result()
        .unwrap()
        .into_array()
        .unwrap()
        .into_iter()
        .map(|value| value.as_float().unwrap())
        .collect();

    assert_eq!(values, vec![0.5, 2.5]);
}

#[test]
fn test_single_declared_parameter() {
    let source = ScriptSourceBuilder::new()
        .num_parameters(1)
        .string_parameter(0, "Name", "world")
        .result(r#""hello " + this.Parameter0.value"#)
        .build();
    let mut operator = ScriptOperator::from_source(runtime(), source).unwrap();

    assert_eq!(operator.num_parameters(), 1);
    assert_eq!(operator.discovery().parameters.len(), 1);
    assert_eq!(operator.get_result().unwrap().into_string().unwrap(), "hello world");
}

#[test]
fn test_top_level_declarations_are_discovered() {
    let source = r#"
        let NumParameters = 1;
        let Parameter0 = bool_parameter("Verbose", true);
        fn getResult() { "done" }
    "#;
    let operator = ScriptOperator::from_source(runtime(), source).unwrap();

    assert_eq!(operator.num_parameters(), 1);
    let param = operator.parameter(0).unwrap();
    assert_eq!(param.kind, ParameterKind::Boolean);
    assert!(param.value.as_bool().unwrap());
}

#[test]
fn test_top_level_defaults_come_back_after_edits() {
    let source = r#"
        let NumParameters = 1;
        let Parameter0 = int_parameter("N", 1);
        fn getResult() { "done" }
    "#;
    let mut operator = ScriptOperator::from_source(runtime(), source).unwrap();
    operator.set_parameter_from_str(0, "9").unwrap();

    operator.set_default_parameters();

    assert_eq!(operator.parameter(0).unwrap().value.as_int().unwrap(), 1);
}

#[test]
fn test_loaded_scripts_do_not_share_names() {
    let runtime = runtime();
    let first = ScriptSourceBuilder::new()
        .num_parameters(1)
        .string_parameter(0, "Text", "first")
        .result("this.Parameter0.value")
        .build();
    let second = ScriptSourceBuilder::new().result("this.Parameter0").build();

    let mut a = ScriptOperator::from_source(Arc::clone(&runtime), first).unwrap();
    let mut b = ScriptOperator::from_source(runtime, second).unwrap();

    assert_eq!(a.get_result().unwrap().into_string().unwrap(), "first");
    assert_eq!(b.num_parameters(), 0);
    // Missing properties of the record read as unit
    assert!(b.get_result().unwrap().is_unit());
}

#[test]
fn test_endless_script_times_out_and_recovers() {
    let config = RhaiConfig {
        max_operations: 0,
        execution_timeout: Duration::from_millis(100),
        ..Default::default()
    };
    let runtime = Arc::new(ScriptRuntime::new(config));
    let source = ScriptSourceBuilder::new().title("Spin").result("loop { }").build();
    let mut operator = ScriptOperator::from_source(runtime, source).unwrap();

    let result = operator.get_result();

    assert!(matches!(result, Err(ScriptError::Timeout { .. })));
    assert!(operator.last_error().is_some());
    assert_eq!(operator.title(), "Spin");
}

#[test]
fn test_compile_error_has_a_position() {
    let err = ScriptOperator::from_source(runtime(), "fn getResult() {\n    let = 1;\n}").err().unwrap();

    assert!(matches!(err, ScriptError::Compilation(_)));
    let info = err.info();
    assert_eq!(info.line, Some(2));
}

#[test]
fn test_reports_serialize() {
    let mut operator = ScriptOperator::from_file(runtime(), script_path("echo.rhai")).unwrap();

    let discovery = serde_json::to_value(DiscoveryReport::from_operator(&operator)).unwrap();
    assert_eq!(discovery["command"], "Echo");
    assert_eq!(discovery["parameters"][0]["value"], "HI");

    let result = operator.get_result();
    let report = RunReport {
        command: operator.command(),
        result: result.as_ref().ok().map(scriptop::models::report::dynamic_to_json),
        error: operator.last_error().cloned(),
        output: operator.take_output(),
    };
    let json = serde_json::to_value(report).unwrap();
    assert_eq!(json["result"], "HI There");
    assert!(json["error"].is_null());
}
