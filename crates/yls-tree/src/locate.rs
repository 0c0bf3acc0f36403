//! Cursor-to-node lookup.

use crate::ast::{NodeContent, NodeId, ParentChain, YamlAst};

impl YamlAst {
    /// Children a cursor can land in. Keys are skipped: a cursor on a key
    /// resolves to the pair that owns it.
    fn locatable_children(&self, id: NodeId) -> &[NodeId] {
        match &self.node(id).content {
            NodeContent::Mapping { pairs } => pairs,
            NodeContent::MappingPair { value, .. } => value.as_slice(),
            NodeContent::Sequence { items } => items,
            NodeContent::Scalar { .. } | NodeContent::AnchorReference { .. } => &[],
        }
    }

    /// Smallest node touching `offset`.
    ///
    /// Walks the tree in pre-order and keeps the last node whose span contains
    /// the offset, so at a boundary shared by two siblings the later one wins.
    pub fn find_node(&self, offset: usize) -> Option<NodeId> {
        let mut found = None;
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            if self.node(id).span.contains(offset) {
                found = Some(id);
            }
            stack.extend(self.locatable_children(id).iter().rev());
        }
        found
    }

    /// Root-to-node path ending at `target` (inclusive).
    ///
    /// Returns an empty chain when `target` is not reachable from the root.
    pub fn path_to(&self, target: NodeId) -> ParentChain {
        let mut path = Vec::new();
        if self.get(target).is_some() && self.descend_to(self.root(), target, &mut path) {
            ParentChain::new(path)
        } else {
            ParentChain::default()
        }
    }

    fn descend_to(&self, current: NodeId, target: NodeId, path: &mut Vec<NodeId>) -> bool {
        path.push(current);
        if current == target {
            return true;
        }
        let target_span = self.node(target).span;
        for child in self.children(current) {
            let span = self.node(child).span;
            if span.start <= target_span.start
                && target_span.end <= span.end
                && self.descend_to(child, target, path)
            {
                return true;
            }
        }
        path.pop();
        false
    }
}

#[cfg(test)]
mod tests {
    use crate::{NodeKind, parse};

    #[test]
    fn test_find_node_never_lands_on_a_key() {
        let ast = parse("spec:\n  image: nginx").unwrap();
        // Inside "image"
        let id = ast.find_node(10).unwrap();
        assert_eq!(ast.node(id).kind(), NodeKind::MappingPair);
        assert_eq!(ast.key_text(id), Some("image"));
    }

    #[test]
    fn test_find_node_prefers_value_scalar() {
        let text = "kind: Dep";
        let ast = parse(text).unwrap();
        let id = ast.find_node(text.len()).unwrap();
        assert_eq!(ast.node(id).scalar_value(), Some("Dep"));
    }

    #[test]
    fn test_find_node_on_empty_document_is_root() {
        let ast = parse("").unwrap();
        assert_eq!(ast.find_node(0), Some(ast.root()));
        assert_eq!(ast.find_node(1), None);
    }

    #[test]
    fn test_path_to_is_root_first_and_inclusive() {
        let text = "spec:\n  con";
        let ast = parse(text).unwrap();
        let id = ast.find_node(text.len()).unwrap();
        let chain = ast.path_to(id);
        let kinds: Vec<_> = chain.iter().map(|id| ast.node(*id).kind()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Mapping,
                NodeKind::MappingPair,
                NodeKind::Mapping,
                NodeKind::MappingPair,
            ]
        );
        assert_eq!(chain.first(), Some(ast.root()));
        assert_eq!(chain.last(), Some(id));
    }
}
