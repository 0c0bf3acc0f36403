use std::fmt::{self, Write};

use crate::ast::{NodeContent, NodeId, YamlAst};

impl YamlAst {
    /// Write an indented dump of the tree, one node per line.
    pub fn inspect(&self, out: &mut impl Write) -> fmt::Result {
        self.inspect_node(self.root(), 0, out)
    }

    fn inspect_node(&self, id: NodeId, depth: usize, out: &mut impl Write) -> fmt::Result {
        let node = self.node(id);
        write!(out, "{:indent$}{} #{} [{}]", "", node.kind(), id.0, node.span, indent = depth * 2)?;
        if let Some(anchor) = &node.anchor {
            write!(out, " &{anchor}")?;
        }
        match &node.content {
            NodeContent::Scalar { value, style } => writeln!(out, " {style:?} {value:?}"),
            NodeContent::AnchorReference { name, target } => match target {
                Some(target) => writeln!(out, " *{name} -> #{}", target.0),
                None => writeln!(out, " *{name} (unresolved)"),
            },
            NodeContent::MappingPair { separator: None, .. } => {
                writeln!(out, " (no separator)")?;
                self.inspect_children(id, depth, out)
            }
            _ => {
                writeln!(out)?;
                self.inspect_children(id, depth, out)
            }
        }
    }

    fn inspect_children(&self, id: NodeId, depth: usize, out: &mut impl Write) -> fmt::Result {
        for child in self.children(id) {
            self.inspect_node(child, depth + 1, out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::parse;

    #[test]
    fn test_inspect_prints_nested_tree() {
        let ast = parse("spec:\n  con").unwrap();
        let mut out = String::new();
        ast.inspect(&mut out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("Mapping #"));
        assert!(lines[1].starts_with("  MappingPair #"));
        assert!(lines[2].starts_with("    Scalar #"));
        assert!(lines[2].ends_with("\"spec\""));
        assert!(lines[5].ends_with("Plain \"con\""));
        assert!(lines[4].ends_with("(no separator)"));
    }
}
