use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use crate::node::SchemaNode;

/// Outcome of a schema lookup. A missing schema is not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSchema {
    pub schema: Option<Arc<SchemaNode>>,
}

impl ResolvedSchema {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(schema: Arc<SchemaNode>) -> Self {
        Self {
            schema: Some(schema),
        }
    }
}

/// Finds the schema that applies to a document.
pub trait SchemaResolver {
    type Error;

    fn schema_for_resource(
        &self,
        uri: &str,
    ) -> impl Future<Output = Result<ResolvedSchema, Self::Error>> + Send;
}

impl<R: SchemaResolver + Sync> SchemaResolver for &R {
    type Error = R::Error;

    fn schema_for_resource(
        &self,
        uri: &str,
    ) -> impl Future<Output = Result<ResolvedSchema, Self::Error>> + Send {
        (**self).schema_for_resource(uri)
    }
}

/// Resolver answering every document with the same schema.
#[derive(Debug, Clone, Default)]
pub struct FixedSchemaResolver {
    schema: Option<Arc<SchemaNode>>,
}

impl FixedSchemaResolver {
    pub fn new(schema: SchemaNode) -> Self {
        Self {
            schema: Some(Arc::new(schema)),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl SchemaResolver for FixedSchemaResolver {
    type Error = Infallible;

    fn schema_for_resource(
        &self,
        _uri: &str,
    ) -> impl Future<Output = Result<ResolvedSchema, Self::Error>> + Send {
        std::future::ready(Ok(ResolvedSchema {
            schema: self.schema.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_fixed_resolver_answers_every_uri() {
        let resolver = FixedSchemaResolver::new(SchemaNode {
            description: Some("root".to_string()),
            ..Default::default()
        });
        for uri in ["file:///a.yaml", "untitled:1"] {
            let resolved = block_on(resolver.schema_for_resource(uri)).unwrap();
            assert_eq!(
                resolved.schema.unwrap().description.as_deref(),
                Some("root")
            );
        }
    }

    #[test]
    fn test_empty_resolver_yields_no_schema() {
        let resolved = block_on(FixedSchemaResolver::empty().schema_for_resource("x")).unwrap();
        assert_eq!(resolved, ResolvedSchema::none());
    }
}
