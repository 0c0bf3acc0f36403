use tracing::{debug, trace};
use yls_document::{Position, TextDocument};
use yls_tree::{NodeContent, NodeId, ParentChain, YamlAst};

/// Where a completion request points into the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorContext {
    pub offset: usize,
    /// Node under the cursor; `None` when the cursor is outside every node.
    pub node: Option<NodeId>,
    /// Ancestors of `node`, root first, after root trimming.
    pub chain: ParentChain,
}

impl CursorContext {
    pub fn locate(document: &TextDocument, position: Position, ast: &YamlAst) -> Self {
        let offset = document.offset_at(position);
        let node = ast.find_node(offset);
        let chain = match node {
            Some(node) => build_parent_chain(ast, node, document.line_text(position.line)),
            None => ParentChain::default(),
        };
        debug!(offset, ?node, chain_len = chain.len(), "located cursor");
        Self {
            offset,
            node,
            chain,
        }
    }
}

/// Root-to-node chain for `node`, with the root dropped when
/// [`should_trim_root`] says so. `line_text` is the cursor's line.
pub fn build_parent_chain(ast: &YamlAst, node: NodeId, line_text: &str) -> ParentChain {
    let mut chain = ast.path_to(node);
    if should_trim_root(ast, node, line_text) {
        trace!(?node, "dropping root from parent chain");
        chain.drop_root();
    }
    chain
}

/// A cursor on a line without `:` whose node is top level or has no value
/// sits one level higher than its chain suggests.
pub fn should_trim_root(ast: &YamlAst, node: NodeId, line_text: &str) -> bool {
    if line_text.contains(':') {
        return false;
    }
    is_top_level(ast, node) || ast.node(node).value().is_none()
}

/// The root itself or one of the root mapping's pairs.
fn is_top_level(ast: &YamlAst, node: NodeId) -> bool {
    if ast.is_root(node) {
        return true;
    }
    match &ast.node(ast.root()).content {
        NodeContent::Mapping { pairs } => pairs.contains(&node),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yls_tree::{NodeKind, parse};

    fn kinds(ast: &YamlAst, chain: &ParentChain) -> Vec<NodeKind> {
        chain.iter().map(|id| ast.node(*id).kind()).collect()
    }

    #[test]
    fn test_root_on_line_without_separator_is_trimmed() {
        let ast = parse("").unwrap();
        let root = ast.root();
        let trimmed = build_parent_chain(&ast, root, "");
        let untrimmed = build_parent_chain(&ast, root, "key:");
        assert!(trimmed.is_empty());
        assert_eq!(untrimmed.as_slice(), [root]);
    }

    #[test]
    fn test_key_only_pair_is_trimmed() {
        let ast = parse("spec:\n  con").unwrap();
        let node = ast.find_node(11).unwrap();
        let chain = build_parent_chain(&ast, node, "  con");
        assert_eq!(
            kinds(&ast, &chain),
            [NodeKind::MappingPair, NodeKind::Mapping, NodeKind::MappingPair]
        );
    }

    #[test]
    fn test_line_with_separator_keeps_root() {
        let ast = parse("kind: Dep").unwrap();
        let node = ast.find_node(9).unwrap();
        let chain = build_parent_chain(&ast, node, "kind: Dep");
        assert_eq!(
            kinds(&ast, &chain),
            [NodeKind::Mapping, NodeKind::MappingPair, NodeKind::Scalar]
        );
    }

    #[test]
    fn test_top_level_pair_with_value_is_trimmed() {
        let ast = parse("spec:\n  a: 1\n").unwrap();
        let spec = ast.find_node(3).unwrap();
        assert_eq!(ast.node(spec).kind(), NodeKind::MappingPair);
        assert!(ast.node(spec).value().is_some());
        assert!(should_trim_root(&ast, spec, "spec"));
        assert!(!should_trim_root(&ast, spec, "spec:"));
    }

    #[test]
    fn test_nested_node_with_value_is_kept() {
        let ast = parse("spec:\n  a: 1").unwrap();
        let a = ast.find_node(9).unwrap();
        assert_eq!(ast.key_text(a), Some("a"));
        assert!(!should_trim_root(&ast, a, "  a"));
    }

    #[test]
    fn test_locate_uses_cursor_line() {
        let document = TextDocument::new("file:///t.yaml", "spec:\n  con");
        let ast = parse(document.get_text()).unwrap();
        let cursor = CursorContext::locate(&document, Position::new(1, 5), &ast);
        assert_eq!(cursor.offset, 11);
        assert_eq!(cursor.node.map(|id| ast.key_text(id)), Some(Some("con")));
        assert_eq!(cursor.chain.len(), 3);
    }

    #[test]
    fn test_locate_outside_document() {
        let document = TextDocument::new("file:///t.yaml", "");
        let ast = parse("").unwrap();
        let cursor = CursorContext::locate(&document, Position::new(0, 0), &ast);
        assert_eq!(cursor.node, Some(ast.root()));
        assert!(cursor.chain.is_empty());
    }
}
