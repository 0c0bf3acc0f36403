//! Error types for editor support operations

use yls_config::ConfigError;
use yls_schema::SchemaError;

/// Errors raised while loading or associating schemas.
#[derive(Debug, thiserror::Error)]
pub enum SchemaManagerError {
    #[error("failed to load schema {uri}: {source}")]
    Schema {
        uri: String,
        #[source]
        source: SchemaError,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid glob pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}
