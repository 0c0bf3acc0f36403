//! Shaping reached schema nodes into completion items.
//!
//! Items keep the order in which their schema nodes were reached; nothing is
//! sorted here.

use std::collections::HashSet;

use lsp_types::{CompletionItem, CompletionItemKind, Documentation};
use tracing::trace;
use yls_schema::{SchemaNode, SchemaShape};

/// One item per top-level key name.
pub fn root_items(names: &[String]) -> Vec<CompletionItem> {
    names
        .iter()
        .map(|name| CompletionItem {
            label: name.clone(),
            kind: Some(CompletionItemKind::PROPERTY),
            ..Default::default()
        })
        .collect()
}

/// Property names offered by the given schema nodes.
///
/// Nodes describing neither an object nor an array are ignored. When that
/// leaves nothing, the nodes are treated as value candidates instead. `$ref`s
/// are resolved against `root` before a property is offered.
pub fn mapping_items(root: &SchemaNode, nodes: &[&SchemaNode]) -> Vec<CompletionItem> {
    let nodes: Vec<&SchemaNode> = nodes.iter().map(|node| node.resolve(root)).collect();
    let structured: Vec<&SchemaNode> = nodes
        .iter()
        .copied()
        .filter(|node| !matches!(node.shape(), SchemaShape::Leaf))
        .collect();
    if structured.is_empty() && !nodes.is_empty() {
        trace!(nodes = nodes.len(), "no structured nodes, offering defaults");
        return scalar_items(nodes);
    }

    let mut seen = PropertySeen::default();
    structured
        .into_iter()
        .filter_map(|node| node.effective_properties(root))
        .flatten()
        .map(|(name, property)| (name, property.resolve(root)))
        .filter(|&(name, property)| seen.insert(name.as_str(), property))
        .map(|(name, property)| CompletionItem {
            label: name.clone(),
            kind: Some(CompletionItemKind::PROPERTY),
            documentation: documentation(property),
            ..Default::default()
        })
        .collect()
}

/// Default values of the given schema nodes, first occurrence of each value
/// only. Nodes without a usable default produce nothing.
pub fn scalar_items<'s>(nodes: impl IntoIterator<Item = &'s SchemaNode>) -> Vec<CompletionItem> {
    let mut seen = DefaultSeen::default();
    nodes
        .into_iter()
        .filter(|node| seen.insert(usable_default(node)))
        .filter_map(|node| {
            let label = match usable_default(node)? {
                serde_json::Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            Some(CompletionItem {
                label,
                kind: Some(CompletionItemKind::VALUE),
                documentation: documentation(node),
                ..Default::default()
            })
        })
        .collect()
}

/// The node's default, unless it is missing or falsy (`false`, zero, `""`).
fn usable_default(node: &SchemaNode) -> Option<&serde_json::Value> {
    node.default.as_ref().filter(|value| match value {
        serde_json::Value::Bool(flag) => *flag,
        serde_json::Value::Number(number) => number.as_f64() != Some(0.0),
        serde_json::Value::String(text) => !text.is_empty(),
        _ => true,
    })
}

fn documentation(node: &SchemaNode) -> Option<Documentation> {
    node.documentation()
        .map(|text| Documentation::String(text.to_string()))
}

/// Property records already offered, keyed by name and description. The same
/// name with another description is a different record.
#[derive(Default)]
struct PropertySeen<'s> {
    seen: HashSet<(&'s str, Option<&'s str>)>,
}

impl<'s> PropertySeen<'s> {
    fn insert(&mut self, name: &'s str, property: &'s SchemaNode) -> bool {
        self.seen.insert((name, property.description.as_deref()))
    }
}

/// Default values already offered, keyed by the value alone. `None` is the
/// bucket shared by every node without a usable default.
#[derive(Default)]
struct DefaultSeen {
    seen: HashSet<Option<String>>,
}

impl DefaultSeen {
    /// Register `default`; true when it is the first occurrence.
    fn insert(&mut self, default: Option<&serde_json::Value>) -> bool {
        self.seen.insert(default.map(|value| value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: serde_json::Value) -> SchemaNode {
        serde_json::from_value(value).unwrap()
    }

    fn summary(items: &[CompletionItem]) -> Vec<(String, Option<String>)> {
        items
            .iter()
            .map(|item| {
                let documentation = item.documentation.as_ref().map(|doc| match doc {
                    Documentation::String(text) => text.clone(),
                    Documentation::MarkupContent(markup) => markup.value.clone(),
                });
                (item.label.clone(), documentation)
            })
            .collect()
    }

    fn item(label: &str, documentation: Option<&str>) -> (String, Option<String>) {
        (label.to_string(), documentation.map(str::to_string))
    }

    #[test]
    fn test_root_items_have_no_documentation() {
        let items = root_items(&["kind".to_string(), "spec".to_string()]);
        assert_eq!(summary(&items), [item("kind", None), item("spec", None)]);
        assert!(items.iter().all(|item| item.kind == Some(CompletionItemKind::PROPERTY)));
    }

    #[test]
    fn test_mapping_dedup_keys_on_name_and_description() {
        let first = schema(json!({ "properties": { "a": { "description": "x" } } }));
        let second = schema(json!({ "properties": { "a": { "description": "x" } } }));
        let third = schema(json!({ "properties": { "a": { "description": "y" } } }));
        let items = mapping_items(&SchemaNode::default(), &[&first, &second, &third]);
        assert_eq!(summary(&items), [item("a", Some("x")), item("a", Some("y"))]);
    }

    #[test]
    fn test_mapping_items_follow_discovery_order() {
        let first = schema(json!({ "properties": { "z": {}, "b": {} } }));
        let second = schema(json!({ "properties": { "a": {}, "z": {} } }));
        let items = mapping_items(&SchemaNode::default(), &[&first, &second]);
        assert_eq!(
            summary(&items),
            [item("z", None), item("b", None), item("a", None)]
        );
    }

    #[test]
    fn test_mapping_items_use_item_properties() {
        let array = schema(json!({
            "items": { "properties": { "name": { "description": "container name" } } }
        }));
        let items = mapping_items(&SchemaNode::default(), &[&array]);
        assert_eq!(summary(&items), [item("name", Some("container name"))]);
    }

    #[test]
    fn test_mapping_items_skip_empty_description() {
        let node = schema(json!({ "properties": { "a": { "description": "" } } }));
        let items = mapping_items(&SchemaNode::default(), &[&node]);
        assert_eq!(summary(&items), [item("a", None)]);
    }

    #[test]
    fn test_mapping_items_drop_leaf_nodes_next_to_structured_ones() {
        let leaf = schema(json!({ "default": "v" }));
        let object = schema(json!({ "properties": { "a": {} } }));
        let items = mapping_items(&SchemaNode::default(), &[&leaf, &object]);
        assert_eq!(summary(&items), [item("a", None)]);
    }

    #[test]
    fn test_mapping_items_fall_back_to_defaults() {
        let leaf = schema(json!({ "default": "Always", "description": "restart policy" }));
        let as_mapping = mapping_items(&SchemaNode::default(), &[&leaf]);
        let as_scalar = scalar_items([&leaf]);
        assert_eq!(as_mapping, as_scalar);
        assert_eq!(summary(&as_mapping), [item("Always", Some("restart policy"))]);
    }

    #[test]
    fn test_array_without_item_properties_offers_nothing() {
        let array = schema(json!({ "items": { "default": "x" } }));
        assert!(mapping_items(&SchemaNode::default(), &[&array]).is_empty());
    }

    #[test]
    fn test_empty_pools() {
        assert!(root_items(&[]).is_empty());
        assert!(mapping_items(&SchemaNode::default(), &[]).is_empty());
        assert!(scalar_items([]).is_empty());
    }

    #[test]
    fn test_scalar_dedup_keys_on_default_only() {
        let first = schema(json!({ "default": "v1", "description": "d1" }));
        let second = schema(json!({ "default": "v1", "description": "d2" }));
        let items = scalar_items([&first, &second]);
        assert_eq!(summary(&items), [item("v1", Some("d1"))]);
        assert!(items.iter().all(|item| item.kind == Some(CompletionItemKind::VALUE)));
    }

    #[test]
    fn test_scalar_items_skip_nodes_without_default() {
        let none = schema(json!({ "description": "no default" }));
        let null = schema(json!({ "default": null }));
        let value = schema(json!({ "default": "v" }));
        let items = scalar_items([&none, &null, &value]);
        assert_eq!(summary(&items), [item("v", None)]);
    }

    #[test]
    fn test_scalar_items_skip_falsy_defaults() {
        let flag = schema(json!({ "default": false }));
        let zero = schema(json!({ "default": 0 }));
        let float_zero = schema(json!({ "default": 0.0 }));
        let empty = schema(json!({ "default": "" }));
        let value = schema(json!({ "default": "v" }));
        let items = scalar_items([&flag, &zero, &float_zero, &empty, &value]);
        assert_eq!(summary(&items), [item("v", None)]);
    }

    #[test]
    fn test_mapping_items_resolve_item_ref() {
        let root = schema(json!({
            "definitions": {
                "container": { "properties": { "name": { "description": "n" } } }
            },
            "properties": {
                "containers": { "items": { "$ref": "#/definitions/container" } }
            }
        }));
        let containers = &root.properties.as_ref().unwrap()["containers"];
        let items = mapping_items(&root, &[containers]);
        assert_eq!(summary(&items), [item("name", Some("n"))]);
    }

    #[test]
    fn test_mapping_items_document_ref_properties_from_target() {
        let root = schema(json!({
            "definitions": { "pod": { "description": "pod template" } },
            "properties": {
                "spec": {
                    "properties": { "template": { "$ref": "#/definitions/pod" } }
                }
            }
        }));
        let spec = &root.properties.as_ref().unwrap()["spec"];
        let items = mapping_items(&root, &[spec]);
        assert_eq!(summary(&items), [item("template", Some("pod template"))]);
    }

    #[test]
    fn test_scalar_labels_for_non_string_defaults() {
        let flag = schema(json!({ "default": true }));
        let count = schema(json!({ "default": 3 }));
        let list = schema(json!({ "default": ["a"] }));
        let text = schema(json!({ "default": "3" }));
        let items = scalar_items([&flag, &count, &list, &text]);
        assert_eq!(
            summary(&items),
            [
                item("true", None),
                item("3", None),
                item("[\"a\"]", None),
                item("3", None)
            ]
        );
    }
}
