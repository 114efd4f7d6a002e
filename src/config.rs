//! Transformer configuration

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{KindqlError, KindqlResult};

/// File looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "kindql.toml";

/// Main transformer configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformConfig {
    /// Receiver names of recognized call sites (`datastore.executeQuery { }`)
    pub receivers: Vec<String>,

    /// Entry-point method names of recognized call sites
    pub methods: Vec<String>,

    /// Suffix appended to every generated variable name
    pub suffix: String,

    /// Reserved key pseudo-field usable in filters and sorts
    pub key_property: String,

    /// Methods whose bodies are never scanned
    pub skip_methods: Vec<String>,

    /// Report typed `from` types that cannot be resolved; `false` accepts any type
    pub strict_types: bool,

    /// Extra result types and their declared fields
    pub types: BTreeMap<String, Vec<String>>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            receivers: vec!["datastore".to_string(), "Entitystore".to_string()],
            methods: vec!["executeQuery".to_string(), "defineQuery".to_string()],
            suffix: "__kql".to_string(),
            key_property: "KEY_RESERVED_PROPERTY".to_string(),
            skip_methods: vec!["main".to_string()],
            strict_types: true,
            types: BTreeMap::new(),
        }
    }
}

impl TransformConfig {
    /// Create a new configuration builder
    pub fn builder() -> TransformConfigBuilder {
        TransformConfigBuilder::default()
    }

    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> KindqlResult<Self> {
        let config: TransformConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> KindqlResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load from `explicit`, else `./kindql.toml`, else the user config
    /// directory, else defaults.
    pub fn discover(explicit: Option<&Path>) -> KindqlResult<Self> {
        if let Some(path) = explicit {
            tracing::debug!(path = %path.display(), "loading configuration");
            return Self::from_file(path);
        }
        for path in Self::search_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading configuration");
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("kindql").join("config.toml"));
        }
        paths
    }

    pub fn validate(&self) -> KindqlResult<()> {
        if self.suffix.is_empty() {
            return Err(KindqlError::Config("suffix must not be empty".to_string()));
        }
        if !self
            .suffix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        {
            return Err(KindqlError::Config(format!(
                "suffix '{}' is not a valid identifier part",
                self.suffix
            )));
        }
        if self.receivers.is_empty() || self.methods.is_empty() {
            return Err(KindqlError::Config(
                "at least one receiver and one method are required".to_string(),
            ));
        }
        if self.key_property.is_empty() {
            return Err(KindqlError::Config(
                "key_property must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// `name` followed by the configured suffix.
    pub fn slot(&self, name: &str) -> String {
        format!("{}{}", name, self.suffix)
    }
}

/// Builder for TransformConfig
#[derive(Debug, Default)]
pub struct TransformConfigBuilder {
    config: TransformConfig,
}

impl TransformConfigBuilder {
    /// Replace the recognized receiver names
    pub fn receivers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.receivers = names.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the recognized entry-point method names
    pub fn methods<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.methods = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the generated variable suffix
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.suffix = suffix.into();
        self
    }

    /// Set the reserved key pseudo-field
    pub fn key_property(mut self, name: impl Into<String>) -> Self {
        self.config.key_property = name.into();
        self
    }

    pub fn strict_types(mut self, strict: bool) -> Self {
        self.config.strict_types = strict;
        self
    }

    /// Declare a result type and its fields
    pub fn with_type<I, S>(mut self, name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config
            .types
            .insert(name.into(), fields.into_iter().map(Into::into).collect());
        self
    }

    /// Build the configuration
    pub fn build(self) -> KindqlResult<TransformConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TransformConfig::default();
        assert_eq!(config.suffix, "__kql");
        assert_eq!(config.slot("query"), "query__kql");
        assert!(config.strict_types);
        assert!(config.receivers.contains(&"Entitystore".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = TransformConfig::from_toml(
            r#"
suffix = "__q1"
strict_types = false

[types]
Person = ["name", "age"]
"#,
        )
        .unwrap();
        assert_eq!(config.suffix, "__q1");
        assert!(!config.strict_types);
        assert_eq!(config.methods, vec!["executeQuery", "defineQuery"]);
        assert_eq!(config.types["Person"], vec!["name", "age"]);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = TransformConfig::from_toml("sufix = \"x\"").unwrap_err();
        assert!(matches!(err, KindqlError::Toml(_)));
    }

    #[test]
    fn test_invalid_suffix_rejected() {
        let err = TransformConfig::builder().suffix("__a-b").build().unwrap_err();
        assert!(err.to_string().contains("not a valid identifier part"));
    }

    #[test]
    fn test_builder() {
        let config = TransformConfig::builder()
            .receivers(["store"])
            .methods(["run"])
            .with_type("Person", ["name"])
            .build()
            .unwrap();
        assert_eq!(config.receivers, vec!["store"]);
        assert_eq!(config.types.len(), 1);
    }
}
