use lsp_types::CompletionItem;
use tracing::debug;
use yls_schema::{SchemaNode, SearchHit, TraversalResult};
use yls_tree::{NodeId, NodeKind, YamlAst};

use super::format::{mapping_items, root_items, scalar_items};

/// Schema nodes reached for a cursor, tagged with the kind of completion the
/// cursor expects.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidatePool<'s> {
    /// Top-level key names.
    Root(Vec<String>),
    /// Value position: candidates come from defaults.
    Scalar(Vec<SearchHit<'s>>),
    /// Key position: candidates come from properties.
    Mapping(Vec<&'s SchemaNode>),
}

impl<'s> CandidatePool<'s> {
    /// Shape the pool into items. `root` is the document schema that `$ref`s
    /// point into.
    pub fn into_items(self, root: &SchemaNode) -> Vec<CompletionItem> {
        match self {
            CandidatePool::Root(names) => root_items(&names),
            CandidatePool::Scalar(hits) => scalar_items(hits.iter().filter_map(SearchHit::primary)),
            CandidatePool::Mapping(nodes) => mapping_items(root, &nodes),
        }
    }
}

/// Pick the pool for the cursor. Root names win whenever there are any; a
/// scalar node or a pair holding a scalar means a value position; anything
/// else, including no node at all, means a key position.
pub fn classify<'s>(
    ast: &YamlAst,
    node: Option<NodeId>,
    result: TraversalResult<'s>,
) -> CandidatePool<'s> {
    let pool = if !result.root_names.is_empty() {
        CandidatePool::Root(result.root_names)
    } else if node.is_some_and(|node| is_scalar_position(ast, node)) {
        CandidatePool::Scalar(result.nodes_to_search)
    } else {
        CandidatePool::Mapping(result.possible_children)
    };
    debug!(
        context = match &pool {
            CandidatePool::Root(_) => "root",
            CandidatePool::Scalar(_) => "scalar",
            CandidatePool::Mapping(_) => "mapping",
        },
        "classified completion context"
    );
    pool
}

fn is_scalar_position(ast: &YamlAst, node: NodeId) -> bool {
    let located = ast.node(node);
    located.kind() == NodeKind::Scalar
        || located
            .value()
            .is_some_and(|value| ast.node(value).kind() == NodeKind::Scalar)
}
