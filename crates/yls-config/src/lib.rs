//! Configuration types for yls tools.
//!
//! The configuration lives in a `yls.json` file at the project root:
//!
//! ```json
//! {
//!   "schemas": {
//!     "schemas/deployment.schema.json": ["deploy/**/*.yaml", "*.deploy.yml"]
//!   },
//!   "completion": true
//! }
//! ```
//!
//! Schema paths are relative to the directory holding the config file.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

/// The standard configuration filename.
pub const CONFIG_FILENAME: &str = "yls.json";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid glob pattern `{pattern}` for schema {schema}: {source}")]
    InvalidPattern {
        schema: String,
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// A schema file together with the document globs it applies to.
#[derive(Debug, Clone)]
pub struct SchemaAssociation {
    /// Schema path, joined onto the config directory.
    pub schema: PathBuf,
    pub patterns: Vec<glob::Pattern>,
}

/// The main yls configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct YlsConfig {
    /// Schema path -> document globs, in file order.
    pub schemas: IndexMap<String, Vec<String>>,

    /// Whether completion requests are answered.
    pub completion: bool,
}

impl Default for YlsConfig {
    fn default() -> Self {
        Self {
            schemas: IndexMap::new(),
            completion: true,
        }
    }
}

impl YlsConfig {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_str(&content)
    }

    /// Parse configuration from a string. Blank input is the default config.
    pub fn parse_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(content)?)
    }

    /// Find the configuration file by searching upward from the given directory.
    pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
        let mut current = start_dir.to_path_buf();
        loop {
            let config_path = current.join(CONFIG_FILENAME);
            if config_path.exists() {
                return Some(config_path);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration by searching upward from the given directory.
    pub fn load_from_dir(start_dir: &Path) -> Result<Option<(PathBuf, Self)>, ConfigError> {
        if let Some(config_path) = Self::find_config_file(start_dir) {
            let config = Self::load(&config_path)?;
            Ok(Some((config_path, config)))
        } else {
            Ok(None)
        }
    }

    /// Compile the `schemas` table, resolving schema paths against `config_dir`.
    pub fn associations(&self, config_dir: &Path) -> Result<Vec<SchemaAssociation>, ConfigError> {
        self.schemas
            .iter()
            .map(|(schema, globs)| {
                let patterns = globs
                    .iter()
                    .map(|pattern| {
                        glob::Pattern::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                            schema: schema.clone(),
                            pattern: pattern.clone(),
                            source,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(SchemaAssociation {
                    schema: config_dir.join(schema),
                    patterns,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let content = r#"{
            "schemas": {
                "schemas/deploy.json": ["deploy/**/*.yaml"],
                "schemas/ci.json": ["ci.yml", ".ci/*.yml"]
            },
            "completion": false
        }"#;

        let config = YlsConfig::parse_str(content).unwrap();
        assert_eq!(config.schemas.len(), 2);
        assert_eq!(
            config.schemas.keys().collect::<Vec<_>>(),
            ["schemas/deploy.json", "schemas/ci.json"]
        );
        assert_eq!(config.schemas["schemas/ci.json"], ["ci.yml", ".ci/*.yml"]);
        assert!(!config.completion);
    }

    #[test]
    fn test_empty_config() {
        let config = YlsConfig::parse_str("").unwrap();
        assert!(config.schemas.is_empty());
        assert!(config.completion);

        let config = YlsConfig::parse_str("{}").unwrap();
        assert_eq!(config, YlsConfig::default());
    }

    #[test]
    fn test_malformed_config() {
        let err = YlsConfig::parse_str("{ \"schemas\": [] }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_associations_resolve_against_config_dir() {
        let config = YlsConfig::parse_str(r#"{ "schemas": { "s.json": ["*.yaml"] } }"#).unwrap();
        let associations = config.associations(Path::new("/project")).unwrap();
        assert_eq!(associations.len(), 1);
        assert_eq!(associations[0].schema, Path::new("/project/s.json"));
        assert!(associations[0].patterns[0].matches("app.yaml"));
    }

    #[test]
    fn test_invalid_pattern() {
        let config = YlsConfig::parse_str(r#"{ "schemas": { "s.json": ["[a-"] } }"#).unwrap();
        let err = config.associations(Path::new(".")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidPattern { ref pattern, .. } if pattern == "[a-"
        ));
    }

    #[test]
    fn test_find_config_file_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "{}").unwrap();

        let found = YlsConfig::find_config_file(&nested).unwrap();
        assert_eq!(found, dir.path().join(CONFIG_FILENAME));

        let (path, config) = YlsConfig::load_from_dir(&nested).unwrap().unwrap();
        assert_eq!(path, found);
        assert!(config.completion);
    }
}
