use std::fmt;

/// Stable handle of a node inside one [`YamlAst`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Byte range `[start, end)` in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Whether a cursor at `offset` touches this span. Both ends are inclusive
    /// so a cursor right after the last character still belongs to the node.
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Mapping,
    MappingPair,
    Scalar,
    Sequence,
    AnchorReference,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Mapping => "Mapping",
            NodeKind::MappingPair => "MappingPair",
            NodeKind::Scalar => "Scalar",
            NodeKind::Sequence => "Sequence",
            NodeKind::AnchorReference => "AnchorReference",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
    /// Flow collection kept as opaque text.
    Flow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeContent {
    Mapping {
        pairs: Vec<NodeId>,
    },
    MappingPair {
        key: NodeId,
        /// Span of the `:` separator. `None` while the key is still being typed.
        separator: Option<Span>,
        value: Option<NodeId>,
    },
    Scalar {
        value: String,
        style: ScalarStyle,
    },
    Sequence {
        items: Vec<NodeId>,
    },
    AnchorReference {
        name: String,
        target: Option<NodeId>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstNode {
    pub span: Span,
    pub anchor: Option<String>,
    pub content: NodeContent,
}

impl AstNode {
    pub fn kind(&self) -> NodeKind {
        match self.content {
            NodeContent::Mapping { .. } => NodeKind::Mapping,
            NodeContent::MappingPair { .. } => NodeKind::MappingPair,
            NodeContent::Scalar { .. } => NodeKind::Scalar,
            NodeContent::Sequence { .. } => NodeKind::Sequence,
            NodeContent::AnchorReference { .. } => NodeKind::AnchorReference,
        }
    }

    /// The `value` child: a pair's value, or the node an alias points at.
    pub fn value(&self) -> Option<NodeId> {
        match &self.content {
            NodeContent::MappingPair { value, .. } => *value,
            NodeContent::AnchorReference { target, .. } => *target,
            _ => None,
        }
    }

    pub fn scalar_value(&self) -> Option<&str> {
        match &self.content {
            NodeContent::Scalar { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// Parsed document. The root always exists and spans the whole text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YamlAst {
    nodes: Vec<AstNode>,
    root: NodeId,
}

impl YamlAst {
    pub(crate) fn from_parts(nodes: Vec<AstNode>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        id == self.root
    }

    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree.
    pub fn node(&self, id: NodeId) -> &AstNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&AstNode> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Text of a pair's key, if `pair` is a mapping pair with a scalar key.
    pub fn key_text(&self, pair: NodeId) -> Option<&str> {
        match &self.get(pair)?.content {
            NodeContent::MappingPair { key, .. } => self.get(*key)?.scalar_value(),
            _ => None,
        }
    }

    /// Structurally owned children, keys included. Alias targets are not
    /// owned by the alias and are left out.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match &self.node(id).content {
            NodeContent::Mapping { pairs } => pairs.clone(),
            NodeContent::MappingPair { key, value, .. } => {
                std::iter::once(*key).chain(*value).collect()
            }
            NodeContent::Sequence { items } => items.clone(),
            NodeContent::Scalar { .. } | NodeContent::AnchorReference { .. } => Vec::new(),
        }
    }
}

/// Root-first sequence of nodes leading to the node under the cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentChain(Vec<NodeId>);

impl ParentChain {
    pub fn new(nodes: Vec<NodeId>) -> Self {
        Self(nodes)
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeId> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<NodeId> {
        self.0.first().copied()
    }

    pub fn last(&self) -> Option<NodeId> {
        self.0.last().copied()
    }

    /// Remove the first element, if any.
    pub fn drop_root(&mut self) {
        if !self.0.is_empty() {
            self.0.remove(0);
        }
    }
}

impl FromIterator<NodeId> for ParentChain {
    fn from_iter<T: IntoIterator<Item = NodeId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ParentChain {
    type Item = &'a NodeId;
    type IntoIter = std::slice::Iter<'a, NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
