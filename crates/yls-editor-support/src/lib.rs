//! Editor-facing features for YAML documents backed by JSON schemas.
//!
//! [`completion::CompletionEngine`] turns a cursor position into schema driven
//! suggestions. [`schema_manager::SchemaManager`] decides which schema applies
//! to which document.

pub mod completion;
pub mod error;
pub mod schema_manager;
pub mod uri;

pub use completion::CompletionEngine;
pub use error::SchemaManagerError;
pub use schema_manager::SchemaManager;
