//! Schema side of yls completion.
//!
//! - [`SchemaNode`]: the subset of JSON Schema that completion reads
//! - [`SchemaResolver`]: finds the schema that applies to a document
//! - [`SchemaTraversal`]: walks a schema along a document's parent chain; the
//!   default implementation is [`SearchService`]

mod error;
mod node;
mod resolver;
mod traversal;

pub use error::SchemaError;
pub use node::{SchemaItems, SchemaNode, SchemaShape};
pub use resolver::{FixedSchemaResolver, ResolvedSchema, SchemaResolver};
pub use traversal::{SchemaTraversal, SearchHit, SearchService, TraversalResult};
