//! Schema registry and document association for editor integration

use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;
use yls_config::YlsConfig;
use yls_schema::{ResolvedSchema, SchemaNode, SchemaResolver};

use crate::error::SchemaManagerError;
use crate::uri::{path_to_uri, uri_to_path};

/// Manages schemas for a workspace
#[derive(Debug, Clone, Default)]
pub struct SchemaManager {
    /// Loaded schemas by URI
    schemas: HashMap<String, Arc<SchemaNode>>,
    /// Explicit mapping from document URI to schema URI
    schema_paths: HashMap<String, String>,
    /// Glob associations in registration order
    associations: Vec<(glob::Pattern, String)>,
    /// Directory relative globs are matched against
    base_dir: Option<PathBuf>,
}

impl SchemaManager {
    /// Create a new schema manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a manager from a config file's `schemas` table. Every listed
    /// schema is loaded eagerly.
    pub fn from_config(config: &YlsConfig, config_dir: &Path) -> Result<Self, SchemaManagerError> {
        let mut manager = Self::new();
        manager.set_base_dir(config_dir);
        for association in config.associations(config_dir)? {
            let schema_uri = manager.load_schema_file(&association.schema)?;
            for pattern in association.patterns {
                manager.associations.push((pattern, schema_uri.clone()));
            }
        }
        debug!(
            schemas = manager.schemas.len(),
            associations = manager.associations.len(),
            "schema manager loaded from config"
        );
        Ok(manager)
    }

    pub fn set_base_dir(&mut self, dir: impl Into<PathBuf>) {
        self.base_dir = Some(dir.into());
    }

    /// Load a schema from JSON text
    pub fn load_schema(&mut self, uri: &str, json: &str) -> Result<(), SchemaManagerError> {
        let schema = SchemaNode::from_json(json).map_err(|source| SchemaManagerError::Schema {
            uri: uri.to_string(),
            source,
        })?;
        self.insert_schema(uri, schema);
        Ok(())
    }

    /// Load a schema file, registering it under its `file://` URI.
    pub fn load_schema_file(&mut self, path: &Path) -> Result<String, SchemaManagerError> {
        let uri = path_to_uri(path);
        let schema = SchemaNode::from_file(path).map_err(|source| SchemaManagerError::Schema {
            uri: uri.clone(),
            source,
        })?;
        self.insert_schema(&uri, schema);
        Ok(uri)
    }

    pub fn insert_schema(&mut self, uri: &str, schema: SchemaNode) {
        self.schemas.insert(uri.to_string(), Arc::new(schema));
    }

    /// Get a schema by URI
    pub fn get_schema(&self, uri: &str) -> Option<&Arc<SchemaNode>> {
        self.schemas.get(uri)
    }

    /// Associate a document with a schema
    pub fn set_document_schema(&mut self, doc_uri: &str, schema_uri: &str) {
        self.schema_paths
            .insert(doc_uri.to_string(), schema_uri.to_string());
    }

    /// Associate every document matching `pattern` with a schema. Earlier
    /// associations win.
    pub fn associate(&mut self, pattern: &str, schema_uri: &str) -> Result<(), SchemaManagerError> {
        let pattern =
            glob::Pattern::new(pattern).map_err(|source| SchemaManagerError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        self.associations.push((pattern, schema_uri.to_string()));
        Ok(())
    }

    /// Get the schema URI for a document: an explicit binding first, then the
    /// first matching glob.
    pub fn get_document_schema_uri(&self, doc_uri: &str) -> Option<&str> {
        if let Some(schema_uri) = self.schema_paths.get(doc_uri) {
            return Some(schema_uri);
        }

        let path = uri_to_path(doc_uri);
        let relative = self
            .base_dir
            .as_deref()
            .and_then(|base| path.strip_prefix(base).ok());
        let found = self
            .associations
            .iter()
            .find(|(pattern, _)| {
                pattern.matches_path(&path)
                    || relative.is_some_and(|relative| pattern.matches_path(relative))
            })
            .map(|(_, schema_uri)| schema_uri.as_str());
        debug!(doc_uri, schema_uri = ?found, "schema association lookup");
        found
    }
}

impl SchemaResolver for SchemaManager {
    type Error = Infallible;

    fn schema_for_resource(
        &self,
        uri: &str,
    ) -> impl Future<Output = Result<ResolvedSchema, Self::Error>> + Send {
        let schema = self
            .get_document_schema_uri(uri)
            .and_then(|schema_uri| self.get_schema(schema_uri))
            .cloned();
        std::future::ready(Ok(ResolvedSchema { schema }))
    }
}
