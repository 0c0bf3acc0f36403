//! Schema document model.
//!
//! Only the parts of JSON Schema that drive completion are modelled. Every
//! other keyword (`type`, `enum`, `oneOf`, ...) is accepted and ignored.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Upper bound on `$ref` hops followed by [`SchemaNode::resolve`].
const MAX_REF_HOPS: usize = 32;

/// One node of a schema document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// A JSON `null` default deserialises to `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, SchemaNode>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<SchemaItems>,

    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definitions: Option<IndexMap<String, SchemaNode>>,

    #[serde(rename = "$defs", default, skip_serializing_if = "Option::is_none")]
    pub defs: Option<IndexMap<String, SchemaNode>>,
}

/// `items` is either one schema for every element or one schema per position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaItems {
    // Tried first: a struct would also accept an empty array.
    Tuple(Vec<SchemaNode>),
    Single(Box<SchemaNode>),
}

impl SchemaItems {
    /// The schema that stands for all elements: the single schema, or the
    /// first one of a tuple.
    pub fn primary(&self) -> Option<&SchemaNode> {
        match self {
            SchemaItems::Single(node) => Some(node),
            SchemaItems::Tuple(nodes) => nodes.first(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SchemaNode> {
        match self {
            SchemaItems::Single(node) => std::slice::from_ref(&**node).iter(),
            SchemaItems::Tuple(nodes) => nodes.iter(),
        }
    }
}

/// What a schema node describes, as far as completion cares.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaShape<'a> {
    Object(&'a IndexMap<String, SchemaNode>),
    Array(&'a SchemaItems),
    Leaf,
}

impl SchemaNode {
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn shape(&self) -> SchemaShape<'_> {
        match (&self.properties, &self.items) {
            (Some(properties), _) => SchemaShape::Object(properties),
            (None, Some(items)) => SchemaShape::Array(items),
            (None, None) => SchemaShape::Leaf,
        }
    }

    /// Properties offered as keys: the node's own, else those of its
    /// element schema. A `$ref` element schema is resolved against `root`.
    pub fn effective_properties<'a>(
        &'a self,
        root: &'a SchemaNode,
    ) -> Option<&'a IndexMap<String, SchemaNode>> {
        match self.shape() {
            SchemaShape::Object(properties) => Some(properties),
            SchemaShape::Array(items) => items.primary()?.resolve(root).properties.as_ref(),
            SchemaShape::Leaf => None,
        }
    }

    /// Non-empty description.
    pub fn documentation(&self) -> Option<&str> {
        self.description.as_deref().filter(|text| !text.is_empty())
    }

    /// Follow `$ref` links against `root` until a node without one is reached.
    /// Unknown references and cycles stop at the last node reached.
    pub fn resolve<'a>(&'a self, root: &'a SchemaNode) -> &'a SchemaNode {
        let mut current = self;
        for _ in 0..MAX_REF_HOPS {
            let Some(reference) = current.reference.as_deref() else {
                return current;
            };
            match root.lookup(reference) {
                Some(target) if !std::ptr::eq(target, current) => current = target,
                _ => return current,
            }
        }
        current
    }

    /// Look up a local reference such as `#/definitions/port` or
    /// `#/properties/spec/items`.
    pub fn lookup(&self, reference: &str) -> Option<&SchemaNode> {
        let pointer = reference.strip_prefix('#')?;
        let mut segments = pointer
            .split('/')
            .skip(1)
            .map(|segment| segment.replace("~1", "/").replace("~0", "~"));
        let mut current = self;
        while let Some(segment) = segments.next() {
            current = match segment.as_str() {
                "properties" => current.properties.as_ref()?.get(&segments.next()?)?,
                "definitions" => current.definitions.as_ref()?.get(&segments.next()?)?,
                "$defs" => current.defs.as_ref()?.get(&segments.next()?)?,
                "items" => match current.items.as_ref()? {
                    SchemaItems::Single(node) => &**node,
                    SchemaItems::Tuple(nodes) => {
                        nodes.get(segments.next()?.parse::<usize>().ok()?)?
                    }
                },
                _ => return None,
            };
        }
        Some(current)
    }
}
