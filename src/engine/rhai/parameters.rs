//! Registers the `Parameter` type and its constructors with Rhai.
//!
//! Scripts declare their parameter slots with these constructors inside
//! `setDefaultParameters()`:
//!
//! ```rhai
//! this.Parameter0 = string_parameter("Enter Text", "HI");
//! ```

use rhai::{Dynamic, Engine, FLOAT, INT};

use crate::models::parameter::{ParameterKind, ScriptParameter};

/// Register the `Parameter` type, its constructors and properties with a Rhai engine
pub fn register_parameters_with_rhai(engine: &mut Engine) {
    engine.register_type_with_name::<ScriptParameter>("Parameter");

    // Constructors
    engine.register_fn("parameter", |label: &str, value: Dynamic| {
        ScriptParameter::new(label, ParameterKind::Any, value)
    });
    engine.register_fn("string_parameter", |label: &str, value: &str| {
        ScriptParameter::new(label, ParameterKind::String, Dynamic::from(value.to_string()))
    });
    engine.register_fn("int_parameter", |label: &str, value: INT| {
        ScriptParameter::new(label, ParameterKind::Integer, Dynamic::from_int(value))
    });
    engine.register_fn("float_parameter", |label: &str, value: FLOAT| {
        ScriptParameter::new(label, ParameterKind::Float, Dynamic::from_float(value))
    });
    engine.register_fn("float_parameter", |label: &str, value: INT| {
        ScriptParameter::new(label, ParameterKind::Float, Dynamic::from_float(value as FLOAT))
    });
    engine.register_fn("bool_parameter", |label: &str, value: bool| {
        ScriptParameter::new(label, ParameterKind::Boolean, Dynamic::from_bool(value))
    });

    // Properties
    engine.register_get("value", |param: &mut ScriptParameter| param.value().clone());
    engine.register_set("value", |param: &mut ScriptParameter, value: Dynamic| param.set_value(value));
    engine.register_get("label", |param: &mut ScriptParameter| param.label().to_string());
    engine.register_get("kind", |param: &mut ScriptParameter| param.kind().to_string());

    engine.register_fn("to_string", |param: &mut ScriptParameter| {
        format!("{} = {}", param.label(), param.value())
    });
}
