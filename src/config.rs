//! Configuration management with validation and defaults
//!
//! Values come from defaults, then an optional TOML file, then environment
//! variables, and are validated once at the end.

use crate::errors::{BolaoResult, ConfigurationError};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BolaoConfig {
    pub ai: AiConfig,
    pub generator: GeneratorConfig,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

/// External AI text-generation service
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AiConfig {
    /// Credential gating the AI path; absence selects the local fallback
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            temperature: 1.0,
            timeout_secs: 15,
        }
    }
}

impl AiConfig {
    pub fn has_credentials(&self) -> bool {
        self.api_key.as_deref().map_or(false, |key| !key.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// How the fallback draw picks its upper bound
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RangePolicy {
    /// Use the registry's `max_numbers` for the game
    #[default]
    Registry,
    /// 60 for mega-sena, 25 for every other game
    Legacy,
}

impl std::str::FromStr for RangePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "registry" => Ok(RangePolicy::Registry),
            "legacy" => Ok(RangePolicy::Legacy),
            other => Err(format!("unknown range policy '{}'", other)),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    pub range_policy: RangePolicy,
    /// Count used when the game is not in the registry
    pub default_count: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            range_policy: RangePolicy::Registry,
            default_count: 6,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    pub seed_demo_data: bool,
    /// The acting organizer for pools created through the CLI
    pub organizer_id: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            seed_demo_data: true,
            organizer_id: "u1".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration loader with environment variable support
#[derive(Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> BolaoResult<BolaoConfig> {
        let mut config = if let Some(ref path) = self.config_path {
            self.load_from_file(path)?
        } else {
            BolaoConfig::default()
        };

        self.apply_env_overrides(&mut config)?;
        self.validate(&config)?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> BolaoResult<BolaoConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        let config = toml::from_str(&content).map_err(ConfigurationError::from)?;
        Ok(config)
    }

    fn apply_env_overrides(&self, config: &mut BolaoConfig) -> BolaoResult<()> {
        // Either variable supplies the credential; blank values count as absent
        for var in ["API_KEY", "BOLAO_AI_API_KEY"] {
            if let Ok(key) = env::var(var) {
                if !key.trim().is_empty() {
                    config.ai.api_key = Some(key);
                }
            }
        }
        if let Ok(endpoint) = env::var("BOLAO_AI_ENDPOINT") {
            config.ai.endpoint = endpoint;
        }
        if let Ok(model) = env::var("BOLAO_AI_MODEL") {
            config.ai.model = model;
        }
        if let Ok(timeout) = env::var("BOLAO_AI_TIMEOUT_SECS") {
            config.ai.timeout_secs = timeout.parse().map_err(|_| ConfigurationError::InvalidValue {
                field: "BOLAO_AI_TIMEOUT_SECS".to_string(),
                value: timeout.clone(),
                reason: "Invalid timeout value".to_string(),
            })?;
        }
        if let Ok(policy) = env::var("BOLAO_RANGE_POLICY") {
            config.generator.range_policy =
                policy.parse().map_err(|reason| ConfigurationError::InvalidValue {
                    field: "BOLAO_RANGE_POLICY".to_string(),
                    value: policy.clone(),
                    reason,
                })?;
        }
        if let Ok(level) = env::var("BOLAO_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self, config: &BolaoConfig) -> BolaoResult<()> {
        if config.ai.timeout_secs == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "ai.timeout_secs".to_string(),
                value: "0".to_string(),
                reason: "Timeout cannot be zero".to_string(),
            }
            .into());
        }

        if !(0.0..=2.0).contains(&config.ai.temperature) {
            return Err(ConfigurationError::InvalidValue {
                field: "ai.temperature".to_string(),
                value: config.ai.temperature.to_string(),
                reason: "Temperature must be between 0 and 2".to_string(),
            }
            .into());
        }

        if config.ai.model.trim().is_empty() {
            return Err(ConfigurationError::MissingRequired("ai.model".to_string()).into());
        }

        if config.ai.endpoint.trim().is_empty() {
            return Err(ConfigurationError::MissingRequired("ai.endpoint".to_string()).into());
        }

        if config.generator.default_count == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "generator.default_count".to_string(),
                value: "0".to_string(),
                reason: "Default count cannot be zero".to_string(),
            }
            .into());
        }

        if config.catalog.organizer_id.trim().is_empty() {
            return Err(ConfigurationError::MissingRequired("catalog.organizer_id".to_string()).into());
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, config: &BolaoConfig, path: &str) -> BolaoResult<()> {
        let toml_string = toml::to_string_pretty(config).map_err(ConfigurationError::from)?;

        std::fs::write(path, toml_string).map_err(|e| {
            ConfigurationError::SaveFailed(format!("Failed to write to {}: {}", path, e)).into()
        })
    }
}

/// Builder pattern for creating configurations
#[derive(Default)]
pub struct ConfigBuilder {
    config: BolaoConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: BolaoConfig::default(),
        }
    }

    pub fn ai(mut self, ai: AiConfig) -> Self {
        self.config.ai = ai;
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.ai.api_key = Some(key.into());
        self
    }

    pub fn range_policy(mut self, policy: RangePolicy) -> Self {
        self.config.generator.range_policy = policy;
        self
    }

    pub fn catalog(mut self, catalog: CatalogConfig) -> Self {
        self.config.catalog = catalog;
        self
    }

    pub fn build(self) -> BolaoConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BolaoError;
    use std::sync::{Mutex, MutexGuard};
    use tempfile::NamedTempFile;

    const ENV_VARS: [&str; 7] = [
        "API_KEY",
        "BOLAO_AI_API_KEY",
        "BOLAO_AI_ENDPOINT",
        "BOLAO_AI_MODEL",
        "BOLAO_AI_TIMEOUT_SECS",
        "BOLAO_RANGE_POLICY",
        "BOLAO_LOG_LEVEL",
    ];

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Serializes tests that read or write process environment variables
    fn lock_env() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs `f` with exactly `vars` set among the loader's variables, restoring them afterwards
    fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
        let saved: Vec<(&str, Option<String>)> =
            ENV_VARS.iter().map(|name| (*name, env::var(name).ok())).collect();
        for name in ENV_VARS {
            env::remove_var(name);
        }
        for (name, value) in vars {
            env::set_var(name, value);
        }

        let result = f();

        for (name, value) in saved {
            match value {
                Some(value) => env::set_var(name, value),
                None => env::remove_var(name),
            }
        }
        result
    }

    #[test]
    fn test_default_config() {
        let config = BolaoConfig::default();
        assert_eq!(config.ai.model, "gemini-3-flash-preview");
        assert_eq!(config.generator.range_policy, RangePolicy::Registry);
        assert!(!config.ai.has_credentials());
        assert!(config.catalog.seed_demo_data);
    }

    #[test]
    fn test_config_validation() {
        let loader = ConfigLoader::new();
        let mut config = BolaoConfig::default();

        assert!(loader.validate(&config).is_ok());

        config.ai.timeout_secs = 0;
        assert!(loader.validate(&config).is_err());

        config.ai.timeout_secs = 5;
        config.ai.temperature = 3.5;
        assert!(loader.validate(&config).is_err());
    }

    #[test]
    fn test_blank_key_is_not_a_credential() {
        let config = ConfigBuilder::new().api_key("   ").build();
        assert!(!config.ai.has_credentials());

        let config = ConfigBuilder::new().api_key("secret").build();
        assert!(config.ai.has_credentials());
    }

    #[test]
    fn test_range_policy_parsing() {
        assert_eq!("legacy".parse::<RangePolicy>(), Ok(RangePolicy::Legacy));
        assert_eq!(" Registry ".parse::<RangePolicy>(), Ok(RangePolicy::Registry));
        assert!("buckets".parse::<RangePolicy>().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: BolaoConfig = toml::from_str(
            r#"
            [generator]
            range_policy = "legacy"
            "#,
        )
        .unwrap();

        assert_eq!(config.generator.range_policy, RangePolicy::Legacy);
        assert_eq!(config.generator.default_count, 6);
        assert_eq!(config.ai.timeout_secs, 15);
    }

    #[test]
    fn test_save_and_load_config() -> BolaoResult<()> {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        let original = ConfigBuilder::new()
            .range_policy(RangePolicy::Legacy)
            .catalog(CatalogConfig {
                seed_demo_data: false,
                organizer_id: "u7".to_string(),
            })
            .build();

        let _env = lock_env();
        let loader = ConfigLoader::new();
        loader.save(&original, path)?;

        let loaded = with_env(&[], || ConfigLoader::new().with_path(path).load())?;

        assert_eq!(loaded.generator.range_policy, RangePolicy::Legacy);
        assert_eq!(loaded.catalog.organizer_id, "u7");
        assert!(!loaded.catalog.seed_demo_data);

        Ok(())
    }

    #[test]
    fn test_api_key_override() {
        let _env = lock_env();

        let config = with_env(&[], || ConfigLoader::new().load()).unwrap();
        assert!(!config.ai.has_credentials());

        let config = with_env(&[("API_KEY", "   ")], || ConfigLoader::new().load()).unwrap();
        assert_eq!(config.ai.api_key, None);

        let config = with_env(&[("API_KEY", "secret")], || ConfigLoader::new().load()).unwrap();
        assert_eq!(config.ai.api_key.as_deref(), Some("secret"));

        let config = with_env(&[("BOLAO_AI_API_KEY", "scoped")], || ConfigLoader::new().load()).unwrap();
        assert!(config.ai.has_credentials());
    }

    #[test]
    fn test_env_overrides_file_values() -> BolaoResult<()> {
        let _env = lock_env();
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();
        std::fs::write(
            path,
            r#"
            [ai]
            model = "from-file"
            timeout_secs = 30

            [generator]
            range_policy = "registry"
            "#,
        )
        .unwrap();

        let config = with_env(
            &[("BOLAO_AI_MODEL", "from-env"), ("BOLAO_RANGE_POLICY", "legacy")],
            || ConfigLoader::new().with_path(path).load(),
        )?;

        assert_eq!(config.ai.model, "from-env");
        assert_eq!(config.ai.timeout_secs, 30);
        assert_eq!(config.generator.range_policy, RangePolicy::Legacy);
        Ok(())
    }

    #[test]
    fn test_invalid_env_values_are_rejected() {
        let _env = lock_env();

        let result = with_env(&[("BOLAO_RANGE_POLICY", "buckets")], || ConfigLoader::new().load());
        match result {
            Err(BolaoError::Configuration(ConfigurationError::InvalidValue { field, value, .. })) => {
                assert_eq!(field, "BOLAO_RANGE_POLICY");
                assert_eq!(value, "buckets");
            }
            other => panic!("Expected invalid range policy, got {:?}", other),
        }

        let result = with_env(&[("BOLAO_AI_TIMEOUT_SECS", "0")], || ConfigLoader::new().load());
        assert!(matches!(
            result,
            Err(BolaoError::Configuration(ConfigurationError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_missing_config_file() {
        let _env = lock_env();
        let result = with_env(&[], || {
            ConfigLoader::new().with_path("/nonexistent/bolao.toml").load()
        });

        assert!(matches!(
            result,
            Err(BolaoError::Configuration(ConfigurationError::LoadFailed(_)))
        ));
    }
}
