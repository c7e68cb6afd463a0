//! The well-known names a script exposes to the host.

/// Populates `NumParameters` and the `Parameter<i>` slots.
pub const SET_DEFAULT_PARAMETERS: &str = "setDefaultParameters";

/// The number of parameter slots that follow.
pub const NUM_PARAMETERS: &str = "NumParameters";

/// Prefix of the zero-indexed parameter slots.
pub const PARAMETER_PREFIX: &str = "Parameter";

/// The entry point. The only required name.
pub const GET_RESULT: &str = "getResult";

/// Short display name.
pub const GET_TITLE: &str = "getTitle";

/// Machine-usable command identifier.
pub const GET_COMMAND: &str = "getCommand";

/// Free-text documentation.
pub const GET_DOCUMENTATION: &str = "getDocumentation";

/// Reserved for operator catalogs. Detected but never called.
pub const GET_CATEGORY_LIST: &str = "getCategoryList";

/// Every function name the host looks for.
pub const CONVENTION_FUNCTIONS: &[&str] = &[
    SET_DEFAULT_PARAMETERS,
    GET_RESULT,
    GET_TITLE,
    GET_COMMAND,
    GET_DOCUMENTATION,
    GET_CATEGORY_LIST,
];

/// Returns the slot name for a parameter index, e.g. `Parameter0`.
pub fn parameter_slot(index: usize) -> String {
    format!("{PARAMETER_PREFIX}{index}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_slot_names() {
        assert_eq!(parameter_slot(0), "Parameter0");
        assert_eq!(parameter_slot(12), "Parameter12");
    }
}
