use lsp_types::CompletionList;
use tracing::debug;
use yls_document::{Position, TextDocument};
use yls_schema::{SchemaNode, SchemaResolver, SchemaTraversal, SearchService};
use yls_tree::YamlAst;

use super::context::classify;
use super::parent_chain::CursorContext;

/// Entry point for completion requests.
///
/// Holds no per-request state, so one engine can serve concurrent requests
/// for different documents.
#[derive(Debug, Clone)]
pub struct CompletionEngine<R, T = SearchService> {
    resolver: R,
    traversal: T,
}

impl<R: SchemaResolver> CompletionEngine<R> {
    pub fn new(resolver: R) -> Self {
        Self::with_traversal(resolver, SearchService)
    }
}

impl<R: SchemaResolver, T: SchemaTraversal> CompletionEngine<R, T> {
    pub fn with_traversal(resolver: R, traversal: T) -> Self {
        Self {
            resolver,
            traversal,
        }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Completion items for `position` in `document`, whose parsed tree is
    /// `ast`.
    ///
    /// A document without a schema gets an empty list. Only a failing schema
    /// lookup is an error.
    pub async fn complete(
        &self,
        document: &TextDocument,
        position: Position,
        ast: &YamlAst,
    ) -> Result<CompletionList, R::Error> {
        let resolved = self.resolver.schema_for_resource(document.uri()).await?;
        let Some(schema) = resolved.schema else {
            debug!(uri = document.uri(), "no schema for document");
            return Ok(empty_list());
        };
        Ok(self.complete_with_schema(&schema, document, position, ast))
    }

    /// Synchronous part of [`complete`](Self::complete), once the schema is known.
    pub fn complete_with_schema(
        &self,
        schema: &SchemaNode,
        document: &TextDocument,
        position: Position,
        ast: &YamlAst,
    ) -> CompletionList {
        let cursor = CursorContext::locate(document, position, ast);
        let result = self
            .traversal
            .traverse(schema, ast, &cursor.chain, cursor.node, true);
        let items = classify(ast, cursor.node, result).into_items(schema);
        debug!(uri = document.uri(), items = items.len(), "completion finished");
        CompletionList {
            is_incomplete: false,
            items,
        }
    }
}

fn empty_list() -> CompletionList {
    CompletionList {
        is_incomplete: false,
        items: Vec::new(),
    }
}
