use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use super::RhaiConfig;

/// Provides the default list of script directories.
fn default_script_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("scripts")]
}

/// Application configuration for scriptop.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Directories scanned for operator scripts. Relative entries are
    /// resolved against the configuration directory.
    #[serde(default = "default_script_dirs")]
    pub script_dirs: Vec<PathBuf>,

    /// Rhai script execution configuration.
    #[serde(default)]
    pub rhai: RhaiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { script_dirs: default_script_dirs(), rhai: RhaiConfig::default() }
    }
}

impl AppConfig {
    /// Creates a new `AppConfig` by reading from the configuration directory.
    ///
    /// The `app.yaml` file is optional; environment variables prefixed with
    /// `SCRIPTOP__` override file values.
    pub fn new(config_dir: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir_str = config_dir.unwrap_or("configs");
        let s = Config::builder()
            .add_source(File::with_name(&format!("{}/app.yaml", config_dir_str)).required(false))
            .add_source(Environment::with_prefix("SCRIPTOP").separator("__"))
            .build()?;
        let mut config: Self = s.try_deserialize()?;

        let config_path = Path::new(config_dir_str);
        config.script_dirs = config
            .script_dirs
            .into_iter()
            .map(|dir| if dir.is_relative() { config_path.join(dir) } else { dir })
            .collect();

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_app_config_missing_file_uses_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = AppConfig::new(Some(temp_dir.path().to_str().unwrap())).unwrap();

        assert_eq!(config.script_dirs, vec![temp_dir.path().join("scripts")]);
        assert_eq!(config.rhai.execution_timeout, Duration::from_millis(5_000));
    }

    #[test]
    fn test_app_config_from_file() {
        let config_content = r#"
        script_dirs:
          - "operators"
          - "/opt/shared/scripts"
        rhai:
          max_operations: 2000
          execution_timeout: 250
        "#;
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("app.yaml"), config_content).unwrap();

        let config = AppConfig::new(Some(temp_dir.path().to_str().unwrap())).unwrap();

        assert_eq!(
            config.script_dirs,
            vec![temp_dir.path().join("operators"), PathBuf::from("/opt/shared/scripts")]
        );
        assert_eq!(config.rhai.max_operations, 2_000);
        assert_eq!(config.rhai.execution_timeout, Duration::from_millis(250));
        // Unspecified limits keep their defaults
        assert_eq!(config.rhai.max_call_levels, RhaiConfig::default().max_call_levels);
    }

    #[test]
    fn test_app_config_invalid_yaml_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("app.yaml"), "rhai: [unclosed").unwrap();

        let result = AppConfig::new(Some(temp_dir.path().to_str().unwrap()));
        assert!(result.is_err());
    }
}
