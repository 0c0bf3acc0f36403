use tracing::{debug, trace};
use yls_tree::{NodeContent, NodeId, ParentChain, YamlAst};

use crate::node::{SchemaItems, SchemaNode};

/// A schema reached by a traversal. Tuple `items` reach one schema per
/// position and are kept together.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchHit<'s> {
    Single(&'s SchemaNode),
    Alternatives(Vec<&'s SchemaNode>),
}

impl<'s> SearchHit<'s> {
    /// The schema standing for the hit: the single node, or the first
    /// alternative.
    pub fn primary(&self) -> Option<&'s SchemaNode> {
        match self {
            SearchHit::Single(node) => Some(node),
            SearchHit::Alternatives(nodes) => nodes.first().copied(),
        }
    }
}

/// Raw output of a schema traversal.
///
/// `root_names` is non-empty only when the walk never left the schema root.
/// The two node lists are filled regardless; telling a scalar position from a
/// mapping position is left to the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraversalResult<'s> {
    pub root_names: Vec<String>,
    pub possible_children: Vec<&'s SchemaNode>,
    pub nodes_to_search: Vec<SearchHit<'s>>,
}

/// Walks a schema along a parent chain.
pub trait SchemaTraversal {
    /// `node` is the node under the cursor. With `initial_search`, a key that
    /// is still being typed is not descended into.
    fn traverse<'s>(
        &self,
        schema: &'s SchemaNode,
        ast: &YamlAst,
        chain: &ParentChain,
        node: Option<NodeId>,
        initial_search: bool,
    ) -> TraversalResult<'s>;
}

/// Default traversal: follows pair keys through `properties` and sequences
/// through `items`, resolving local `$ref`s on the way.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchService;

impl SearchService {
    pub fn new() -> Self {
        Self
    }
}

impl SchemaTraversal for SearchService {
    fn traverse<'s>(
        &self,
        schema: &'s SchemaNode,
        ast: &YamlAst,
        chain: &ParentChain,
        node: Option<NodeId>,
        initial_search: bool,
    ) -> TraversalResult<'s> {
        let root = schema.resolve(schema);
        let mut current = vec![SearchHit::Single(root)];
        let mut depth = 0;

        for &id in chain {
            if current.is_empty() {
                break;
            }
            match &ast.node(id).content {
                NodeContent::MappingPair { separator, .. } => {
                    if initial_search && node == Some(id) && separator.is_none() {
                        trace!(?id, "key still being typed, stopping");
                        break;
                    }
                    let key = ast.key_text(id).unwrap_or_default();
                    current = current
                        .iter()
                        .filter_map(SearchHit::primary)
                        .filter_map(|parent| parent.effective_properties(schema)?.get(key))
                        .map(|child| SearchHit::Single(child.resolve(schema)))
                        .collect();
                    depth += 1;
                }
                NodeContent::Sequence { .. } => {
                    current = current
                        .iter()
                        .filter_map(SearchHit::primary)
                        .filter_map(|parent| parent.items.as_ref())
                        .map(|items| match items {
                            SchemaItems::Single(item) => SearchHit::Single(item.resolve(schema)),
                            SchemaItems::Tuple(items) => SearchHit::Alternatives(
                                items.iter().map(|item| item.resolve(schema)).collect(),
                            ),
                        })
                        .collect();
                    depth += 1;
                }
                NodeContent::Mapping { .. }
                | NodeContent::Scalar { .. }
                | NodeContent::AnchorReference { .. } => {}
            }
        }

        let root_names = if depth == 0 {
            root.properties
                .iter()
                .flat_map(|properties| properties.keys().cloned())
                .collect()
        } else {
            Vec::new()
        };
        debug!(
            depth,
            reached = current.len(),
            root_names = root_names.len(),
            "schema traversal finished"
        );

        TraversalResult {
            root_names,
            possible_children: current.iter().filter_map(SearchHit::primary).collect(),
            nodes_to_search: current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use yls_tree::parse;

    fn schema(value: serde_json::Value) -> SchemaNode {
        serde_json::from_value(value).unwrap()
    }

    fn traverse_at<'s>(schema: &'s SchemaNode, text: &str, offset: usize) -> TraversalResult<'s> {
        let ast = parse(text).unwrap();
        let node = ast.find_node(offset);
        let chain = node.map(|node| ast.path_to(node)).unwrap_or_default();
        SearchService.traverse(schema, &ast, &chain, node, true)
    }

    fn descriptions(result: &TraversalResult<'_>) -> Vec<Option<String>> {
        result
            .possible_children
            .iter()
            .map(|node| node.description.clone())
            .collect()
    }

    #[test]
    fn test_empty_chain_lists_root_names() {
        let schema = schema(json!({ "properties": { "kind": {}, "spec": {} } }));
        let ast = parse("").unwrap();
        let result = SearchService.traverse(&schema, &ast, &ParentChain::default(), None, true);
        assert_eq!(result.root_names, ["kind", "spec"]);
        assert_eq!(result.possible_children.len(), 1);
    }

    #[test]
    fn test_key_being_typed_is_not_descended() {
        let schema = schema(json!({
            "properties": { "spec": { "description": "spec", "properties": { "containers": {} } } }
        }));
        let result = traverse_at(&schema, "spec:\n  con", 11);
        assert!(result.root_names.is_empty());
        assert_eq!(descriptions(&result), [Some("spec".to_string())]);
    }

    #[test]
    fn test_pair_with_value_descends_into_property() {
        let schema = schema(json!({
            "properties": { "kind": { "description": "kind", "default": "Deployment" } }
        }));
        let result = traverse_at(&schema, "kind: Dep", 9);
        assert_eq!(descriptions(&result), [Some("kind".to_string())]);
    }

    #[test]
    fn test_sequence_descends_into_items() {
        let schema = schema(json!({
            "properties": {
                "containers": {
                    "items": { "description": "container", "properties": { "name": {} } }
                }
            }
        }));
        let result = traverse_at(&schema, "containers:\n  - ", 16);
        assert_eq!(descriptions(&result), [Some("container".to_string())]);
    }

    #[test]
    fn test_tuple_items_become_alternatives() {
        let schema = schema(json!({
            "properties": {
                "pair": { "items": [{ "description": "first" }, { "description": "second" }] }
            }
        }));
        let result = traverse_at(&schema, "pair:\n  - a", 11);
        assert_eq!(result.nodes_to_search.len(), 1);
        assert!(matches!(&result.nodes_to_search[0], SearchHit::Alternatives(nodes) if nodes.len() == 2));
        assert_eq!(descriptions(&result), [Some("first".to_string())]);
    }

    #[test]
    fn test_refs_are_resolved_on_the_way() {
        let schema = schema(json!({
            "definitions": {
                "meta": { "description": "metadata", "properties": { "name": {} } }
            },
            "properties": { "metadata": { "$ref": "#/definitions/meta" } }
        }));
        let result = traverse_at(&schema, "metadata:\n  na", 14);
        assert_eq!(descriptions(&result), [Some("metadata".to_string())]);
    }

    #[test]
    fn test_unknown_key_reaches_nothing() {
        let schema = schema(json!({ "properties": { "kind": {} } }));
        let result = traverse_at(&schema, "other:\n  x", 10);
        assert!(result.root_names.is_empty());
        assert!(result.nodes_to_search.is_empty());
    }
}
