use std::time::Duration;

use serde::Deserialize;

use super::deserialize_duration_from_ms;

const DEFAULT_MAX_OPERATIONS: u64 = 1_000_000;
const DEFAULT_MAX_CALL_LEVELS: usize = 32;
const DEFAULT_MAX_STRING_SIZE: usize = 65_536;
const DEFAULT_MAX_ARRAY_SIZE: usize = 10_000;
const DEFAULT_MAX_MAP_SIZE: usize = 1_000;
/// Parameter slots read from one script unless configured otherwise.
pub const DEFAULT_MAX_PARAMETERS: usize = 256;
const DEFAULT_EXECUTION_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Limits applied to every loaded script.
///
/// Missing keys take their default. `0` disables a size or operation limit,
/// as in Rhai itself.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RhaiConfig {
    /// Operations one script call may perform.
    pub max_operations: u64,

    /// Function call nesting depth.
    pub max_call_levels: usize,

    /// String length, in characters.
    pub max_string_size: usize,

    /// Array length.
    pub max_array_size: usize,

    /// Object map property count.
    pub max_map_size: usize,

    /// Parameter slots the host reads. A larger `NumParameters` is clamped
    /// and reported.
    pub max_parameters: usize,

    /// Wall-clock budget of one script call, in milliseconds in YAML.
    #[serde(deserialize_with = "deserialize_duration_from_ms")]
    pub execution_timeout: Duration,
}

impl Default for RhaiConfig {
    fn default() -> Self {
        Self {
            max_operations: DEFAULT_MAX_OPERATIONS,
            max_call_levels: DEFAULT_MAX_CALL_LEVELS,
            max_string_size: DEFAULT_MAX_STRING_SIZE,
            max_array_size: DEFAULT_MAX_ARRAY_SIZE,
            max_map_size: DEFAULT_MAX_MAP_SIZE,
            max_parameters: DEFAULT_MAX_PARAMETERS,
            execution_timeout: DEFAULT_EXECUTION_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use config::{Config, File, FileFormat};

    use super::*;

    fn from_yaml(yaml: &str) -> RhaiConfig {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = RhaiConfig::default();
        assert_eq!(config.max_operations, 1_000_000);
        assert_eq!(config.max_call_levels, 32);
        assert_eq!(config.max_string_size, 65_536);
        assert_eq!(config.max_array_size, 10_000);
        assert_eq!(config.max_map_size, 1_000);
        assert_eq!(config.max_parameters, 256);
        assert_eq!(config.execution_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_every_limit_from_yaml() {
        let config = from_yaml(
            "
            max_operations: 50000
            max_call_levels: 5
            max_string_size: 4096
            max_array_size: 500
            max_map_size: 64
            max_parameters: 8
            execution_timeout: 3000
            ",
        );

        assert_eq!(
            config,
            RhaiConfig {
                max_operations: 50_000,
                max_call_levels: 5,
                max_string_size: 4_096,
                max_array_size: 500,
                max_map_size: 64,
                max_parameters: 8,
                execution_timeout: Duration::from_millis(3_000),
            }
        );
    }

    #[test]
    fn test_missing_keys_keep_defaults() {
        let config = from_yaml("execution_timeout: 250");

        assert_eq!(config.execution_timeout, Duration::from_millis(250));
        assert_eq!(
            config,
            RhaiConfig { execution_timeout: Duration::from_millis(250), ..RhaiConfig::default() }
        );
    }
}
