//! Parameter objects exposed to scripts through the `Parameter<i>` slots.

use std::fmt;

use rhai::{Dynamic, FLOAT, INT, Map};
use serde::Serialize;

/// The value type a parameter slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    /// Accepts any value.
    Any,
    /// A text value.
    String,
    /// A whole number.
    Integer,
    /// A floating point number. Integers are widened on assignment.
    Float,
    /// A boolean flag.
    Boolean,
}

impl ParameterKind {
    /// Infers the kind of a value. Anything that is not a primitive is `Any`.
    pub fn of(value: &Dynamic) -> Self {
        if value.is_string() {
            Self::String
        } else if value.is_int() {
            Self::Integer
        } else if value.is_float() {
            Self::Float
        } else if value.is_bool() {
            Self::Boolean
        } else {
            Self::Any
        }
    }

    /// Parses a kind name as written by scripts (`"string"`, `"int"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "any" => Some(Self::Any),
            "string" | "str" => Some(Self::String),
            "integer" | "int" => Some(Self::Integer),
            "float" | "number" => Some(Self::Float),
            "boolean" | "bool" => Some(Self::Boolean),
            _ => None,
        }
    }

    /// Converts `value` into this kind, widening integers to floats.
    /// Returns `None` when the value cannot be held by a slot of this kind.
    pub fn coerce(self, value: Dynamic) -> Option<Dynamic> {
        match self {
            Self::Any => Some(value),
            Self::String if value.is_string() => Some(value),
            Self::Integer if value.is_int() => Some(value),
            Self::Float if value.is_float() => Some(value),
            Self::Float if value.is_int() => value.as_int().ok().map(|i| Dynamic::from_float(i as FLOAT)),
            Self::Boolean if value.is_bool() => Some(value),
            _ => None,
        }
    }

    /// Parses user input (dialog field, command line) into a value of this kind.
    ///
    /// `Any` tries integer, float and boolean in that order and falls back to
    /// the raw text.
    pub fn parse(self, input: &str) -> Result<Dynamic, String> {
        let trimmed = input.trim();
        match self {
            Self::String => Ok(Dynamic::from(input.to_string())),
            Self::Integer => trimmed
                .parse::<INT>()
                .map(Dynamic::from_int)
                .map_err(|e| format!("'{input}' is not an integer: {e}")),
            Self::Float => trimmed
                .parse::<FLOAT>()
                .map(Dynamic::from_float)
                .map_err(|e| format!("'{input}' is not a number: {e}")),
            Self::Boolean => trimmed
                .parse::<bool>()
                .map(Dynamic::from_bool)
                .map_err(|_| format!("'{input}' is not 'true' or 'false'")),
            Self::Any => Ok(if let Ok(i) = trimmed.parse::<INT>() {
                Dynamic::from_int(i)
            } else if let Ok(f) = trimmed.parse::<FLOAT>() {
                Dynamic::from_float(f)
            } else if let Ok(b) = trimmed.parse::<bool>() {
                Dynamic::from_bool(b)
            } else {
                Dynamic::from(input.to_string())
            }),
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Any => "any",
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

/// The capability every parameter object must provide: a current value.
///
/// Labels and kinds are optional extras a richer parameter type can expose.
pub trait ParameterObject {
    /// The current value, or `None` if the object cannot produce one.
    fn value(&self) -> Option<Dynamic>;

    /// A human-readable prompt for the parameter.
    fn label(&self) -> Option<String> {
        None
    }

    /// The value type accepted by the parameter.
    fn kind(&self) -> ParameterKind {
        self.value().map_or(ParameterKind::Any, |value| ParameterKind::of(&value))
    }
}

/// The parameter type scripts create with `parameter()`, `string_parameter()`
/// and friends. Registered with Rhai as `Parameter`.
#[derive(Debug, Clone)]
pub struct ScriptParameter {
    label: String,
    kind: ParameterKind,
    value: Dynamic,
}

impl ScriptParameter {
    /// Creates a new parameter with a label, a kind and an initial value.
    pub fn new(label: impl Into<String>, kind: ParameterKind, value: Dynamic) -> Self {
        Self { label: label.into(), kind, value }
    }

    /// Returns the parameter label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the parameter kind.
    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    /// Returns the current value.
    pub fn value(&self) -> &Dynamic {
        &self.value
    }

    /// Replaces the value without any kind checks.
    pub fn set_value(&mut self, value: Dynamic) {
        self.value = value;
    }
}

impl ParameterObject for ScriptParameter {
    fn value(&self) -> Option<Dynamic> {
        Some(self.value.clone())
    }

    fn label(&self) -> Option<String> {
        Some(self.label.clone())
    }

    fn kind(&self) -> ParameterKind {
        self.kind
    }
}

/// Object maps work as parameters when they carry a `value` property.
/// `label` and `kind` properties are honoured when present.
impl ParameterObject for Map {
    fn value(&self) -> Option<Dynamic> {
        self.get("value").cloned()
    }

    fn label(&self) -> Option<String> {
        self.get("label").or_else(|| self.get("name")).map(|label| label.to_string())
    }

    fn kind(&self) -> ParameterKind {
        self.get("kind")
            .and_then(|kind| kind.clone().into_string().ok())
            .and_then(|kind| ParameterKind::from_name(&kind))
            .or_else(|| self.get("value").map(ParameterKind::of))
            .unwrap_or(ParameterKind::Any)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_of_primitives() {
        assert_eq!(ParameterKind::of(&Dynamic::from("HI".to_string())), ParameterKind::String);
        assert_eq!(ParameterKind::of(&Dynamic::from_int(3)), ParameterKind::Integer);
        assert_eq!(ParameterKind::of(&Dynamic::from_float(1.5)), ParameterKind::Float);
        assert_eq!(ParameterKind::of(&Dynamic::from_bool(true)), ParameterKind::Boolean);
        assert_eq!(ParameterKind::of(&Dynamic::UNIT), ParameterKind::Any);
    }

    #[test]
    fn test_coerce_widens_integers_for_float_slots() {
        let value = ParameterKind::Float.coerce(Dynamic::from_int(2)).unwrap();
        assert_eq!(value.as_float().unwrap(), 2.0);
    }

    #[test]
    fn test_coerce_rejects_mismatched_kinds() {
        assert!(ParameterKind::Integer.coerce(Dynamic::from("x".to_string())).is_none());
        assert!(ParameterKind::Boolean.coerce(Dynamic::from_int(1)).is_none());
        assert!(ParameterKind::String.coerce(Dynamic::from_bool(false)).is_none());
        assert!(ParameterKind::Any.coerce(Dynamic::from_bool(false)).is_some());
    }

    #[test]
    fn test_parse_by_kind() {
        assert_eq!(ParameterKind::Integer.parse(" 42 ").unwrap().as_int().unwrap(), 42);
        assert_eq!(ParameterKind::Float.parse("0.25").unwrap().as_float().unwrap(), 0.25);
        assert!(ParameterKind::Boolean.parse("true").unwrap().as_bool().unwrap());
        assert_eq!(ParameterKind::String.parse(" padded ").unwrap().into_string().unwrap(), " padded ");
        assert!(ParameterKind::Integer.parse("4.5").is_err());
        assert!(ParameterKind::Boolean.parse("yes").is_err());
    }

    #[test]
    fn test_parse_any_guesses_the_type() {
        assert!(ParameterKind::Any.parse("7").unwrap().is_int());
        assert!(ParameterKind::Any.parse("7.5").unwrap().is_float());
        assert!(ParameterKind::Any.parse("false").unwrap().is_bool());
        assert!(ParameterKind::Any.parse("There").unwrap().is_string());
    }

    #[test]
    fn test_kind_from_name() {
        assert_eq!(ParameterKind::from_name("INT"), Some(ParameterKind::Integer));
        assert_eq!(ParameterKind::from_name("bool"), Some(ParameterKind::Boolean));
        assert_eq!(ParameterKind::from_name("matrix"), None);
    }

    #[test]
    fn test_map_parameter_object() {
        let mut map = Map::new();
        map.insert("label".into(), Dynamic::from("Count".to_string()));
        map.insert("value".into(), Dynamic::from_int(5));

        assert_eq!(ParameterObject::value(&map).unwrap().as_int().unwrap(), 5);
        assert_eq!(ParameterObject::label(&map).as_deref(), Some("Count"));
        assert_eq!(ParameterObject::kind(&map), ParameterKind::Integer);

        map.insert("kind".into(), Dynamic::from("float".to_string()));
        assert_eq!(ParameterObject::kind(&map), ParameterKind::Float);
    }

    #[test]
    fn test_map_without_value_has_no_value() {
        let map = Map::new();
        assert!(ParameterObject::value(&map).is_none());
        assert_eq!(ParameterObject::kind(&map), ParameterKind::Any);
    }
}
