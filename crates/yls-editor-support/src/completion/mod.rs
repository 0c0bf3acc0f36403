//! Schema driven completion.
//!
//! A request goes through four steps:
//! 1. [`CursorContext::locate`] finds the node under the cursor and the chain
//!    of nodes leading to it
//! 2. a [`SchemaTraversal`](yls_schema::SchemaTraversal) walks the schema along
//!    that chain
//! 3. [`classify`] decides whether the cursor expects a root key, a key or a
//!    value
//! 4. [`CandidatePool::into_items`] shapes the reached schema nodes into
//!    completion items

mod context;
mod engine;
mod format;
mod parent_chain;

pub use context::{CandidatePool, classify};
pub use engine::CompletionEngine;
pub use format::{mapping_items, root_items, scalar_items};
pub use parent_chain::{CursorContext, build_parent_chain, should_trim_root};
