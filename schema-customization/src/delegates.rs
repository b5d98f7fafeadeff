//! Transforms for fields referencing nodes or unions.
//!
//! These fields cannot be typed from their shape alone: their value has to be looked up among
//! the nodes sourced from the remote API. The [`RuleTable`](crate::RuleTable) hands them over
//! to a [`Delegates`] implementation.

use std::sync::Arc;

use derivative::Derivative;

use crate::error::TransformError;
use crate::introspection::FieldDescriptor;
use crate::json_ext::Object;
use crate::json_ext::Value;
use crate::json_ext::ValueExt;
use crate::naming::Canonicalizer;
use crate::naming::auto_alias;
use crate::outcome::Resolver;
use crate::outcome::TransformationOutcome;
use crate::signature::Signature;
use crate::signature::TypeWrapping;

/// Transforms for the fields the rule table does not type by itself.
///
/// `type_name` is the remote type owning `field`. Failures are returned as is to the caller of
/// the rule table.
pub trait Delegates: Send + Sync {
    /// A field whose type is a union.
    fn union(
        &self,
        type_name: &str,
        field: &FieldDescriptor,
    ) -> Result<TransformationOutcome, TransformError>;

    /// A field whose type is a list of a union.
    fn union_list(
        &self,
        type_name: &str,
        field: &FieldDescriptor,
    ) -> Result<TransformationOutcome, TransformError>;

    /// A field whose type is a node type.
    fn node_object(
        &self,
        type_name: &str,
        field: &FieldDescriptor,
    ) -> Result<TransformationOutcome, TransformError>;

    /// A field whose type is a list of a node type.
    fn node_list(
        &self,
        type_name: &str,
        field: &FieldDescriptor,
    ) -> Result<TransformationOutcome, TransformError>;
}

/// Nodes sourced from the remote API.
pub trait NodeStore: Send + Sync {
    /// The node with the given id, `type_name` being its output type name.
    fn node_by_id(&self, id: &str, type_name: &str) -> Option<Value>;
}

impl<F> NodeStore for F
where
    F: Fn(&str, &str) -> Option<Value> + Send + Sync,
{
    fn node_by_id(&self, id: &str, type_name: &str) -> Option<Value> {
        self(id, type_name)
    }
}

/// Types node fields as references to nodes, resolved through a [`NodeStore`].
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct NodeReferenceDelegates {
    #[derivative(Debug = "ignore")]
    canonicalizer: Arc<dyn Canonicalizer>,
    #[derivative(Debug = "ignore")]
    store: Arc<dyn NodeStore>,
}

impl NodeReferenceDelegates {
    pub fn new(canonicalizer: Arc<dyn Canonicalizer>, store: Arc<dyn NodeStore>) -> Self {
        Self {
            canonicalizer,
            store,
        }
    }

    fn named_type<'f>(
        &self,
        type_name: &str,
        field: &'f FieldDescriptor,
    ) -> Result<(&'f str, String), TransformError> {
        let name = field
            .ty
            .find_leaf_name()
            .ok_or_else(|| TransformError::Delegate {
                type_name: type_name.to_string(),
                field_name: field.name.clone(),
                reason: format!("type {} has no named type", field.ty.to_json()),
            })?;
        Ok((name, self.canonicalizer.canonicalize(name)))
    }
}

impl Delegates for NodeReferenceDelegates {
    fn union(
        &self,
        type_name: &str,
        field: &FieldDescriptor,
    ) -> Result<TransformationOutcome, TransformError> {
        let (union_name, output_name) = self.named_type(type_name, field)?;
        let field_name = field.name.clone();
        let alias = auto_alias(&field_name, union_name);
        let canonicalizer = self.canonicalizer.clone();
        let store = self.store.clone();
        let signature = Signature::new(TypeWrapping::Named, output_name.clone());

        let resolver = Resolver::new(move |source: &Object| {
            let Some(value) = non_null(source, &field_name).or_else(|| non_null(source, &alias))
            else {
                return Value::Null;
            };
            let member_name = member_type_name(value, &*canonicalizer, &output_name);
            value
                .node_id()
                .and_then(|id| store.node_by_id(id, &member_name))
                .unwrap_or_else(|| value.clone())
        });
        Ok(TransformationOutcome::resolved(signature, resolver))
    }

    fn union_list(
        &self,
        type_name: &str,
        field: &FieldDescriptor,
    ) -> Result<TransformationOutcome, TransformError> {
        let (union_name, output_name) = self.named_type(type_name, field)?;
        let field_name = field.name.clone();
        let alias = auto_alias(&field_name, union_name);
        let canonicalizer = self.canonicalizer.clone();
        let store = self.store.clone();
        let signature = Signature::new(TypeWrapping::List, output_name.clone());

        let resolver = Resolver::new(move |source: &Object| {
            let value = match source.get(field_name.as_str()) {
                Some(value) if !value.is_null() => value,
                _ => match source.get(alias.as_str()) {
                    Some(value) => value,
                    None => return Value::Null,
                },
            };
            let Some(items) = value.as_array() else {
                return value.clone();
            };
            items
                .iter()
                .filter(|item| !item.is_null())
                .map(|item| {
                    let member_name = member_type_name(item, &*canonicalizer, &output_name);
                    item.node_id()
                        .and_then(|id| store.node_by_id(id, &member_name))
                        .unwrap_or_else(|| item.clone())
                })
                .collect::<Vec<_>>()
                .into()
        });
        Ok(TransformationOutcome::resolved(signature, resolver))
    }

    fn node_object(
        &self,
        type_name: &str,
        field: &FieldDescriptor,
    ) -> Result<TransformationOutcome, TransformError> {
        let (_, output_name) = self.named_type(type_name, field)?;
        let field_name = field.name.clone();
        let store = self.store.clone();
        let signature = Signature::new(TypeWrapping::Named, output_name.clone());

        let resolver = Resolver::new(move |source: &Object| {
            source
                .get(field_name.as_str())
                .and_then(Value::node_id)
                .and_then(|id| store.node_by_id(id, &output_name))
                .unwrap_or(Value::Null)
        });
        Ok(TransformationOutcome::resolved(signature, resolver))
    }

    fn node_list(
        &self,
        type_name: &str,
        field: &FieldDescriptor,
    ) -> Result<TransformationOutcome, TransformError> {
        let (_, output_name) = self.named_type(type_name, field)?;
        let field_name = field.name.clone();
        let store = self.store.clone();
        let signature = Signature::new(TypeWrapping::List, output_name.clone());

        let resolver = Resolver::new(move |source: &Object| {
            // connections expose their nodes under `nodes`
            let nodes = match source.get(field_name.as_str()) {
                Some(Value::Array(nodes)) => nodes,
                Some(Value::Object(connection)) => match connection.get("nodes") {
                    Some(Value::Array(nodes)) => nodes,
                    _ => return Value::Null,
                },
                _ => return Value::Null,
            };
            nodes
                .iter()
                .filter_map(|node| {
                    node.node_id()
                        .and_then(|id| store.node_by_id(id, &output_name))
                })
                .collect::<Vec<_>>()
                .into()
        });
        Ok(TransformationOutcome::resolved(signature, resolver))
    }
}

fn non_null<'a>(source: &'a Object, property: &str) -> Option<&'a Value> {
    source.get(property).filter(|value| !value.is_null())
}

/// Output type of a union member value, from its `__typename` when the remote API sent one.
fn member_type_name(value: &Value, canonicalizer: &dyn Canonicalizer, union_output: &str) -> String {
    value
        .as_object()
        .and_then(|object| object.get("__typename"))
        .and_then(Value::as_str)
        .map(|typename| canonicalizer.canonicalize(typename))
        .unwrap_or_else(|| union_output.to_string())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json_bytes::json;

    use super::*;
    use crate::introspection::LeafKind;
    use crate::introspection::TypeDescriptor;
    use crate::naming::PrefixCanonicalizer;

    fn delegates() -> NodeReferenceDelegates {
        let store = |id: &str, type_name: &str| match (id, type_name) {
            ("cG9zdDox", "WpPost") => Some(json!({ "id": "cG9zdDox", "title": "Hello" })),
            ("cGFnZToy", "WpPage") => Some(json!({ "id": "cGFnZToy", "title": "About" })),
            _ => None,
        };
        NodeReferenceDelegates::new(
            Arc::new(PrefixCanonicalizer::new("Wp")),
            Arc::new(store),
        )
    }

    fn resolve(outcome: &TransformationOutcome, source: Value) -> Value {
        outcome
            .resolver()
            .unwrap()
            .resolve(source.as_object().unwrap())
    }

    #[test]
    fn node_object_resolves_referenced_node() {
        let field = FieldDescriptor::new("parent", TypeDescriptor::object("Post"));
        let outcome = delegates().node_object("Comment", &field).unwrap();

        assert_eq!(outcome.signature().to_string(), "WpPost");
        assert_eq!(
            resolve(&outcome, json!({ "parent": { "id": "cG9zdDox" } })),
            json!({ "id": "cG9zdDox", "title": "Hello" })
        );
        assert_eq!(resolve(&outcome, json!({ "parent": { "id": "missing" } })), Value::Null);
        assert_eq!(resolve(&outcome, json!({ "parent": { "title": "x" } })), Value::Null);
        assert_eq!(resolve(&outcome, json!({})), Value::Null);
    }

    #[test]
    fn node_list_accepts_lists_and_connections() {
        let field = FieldDescriptor::new(
            "posts",
            TypeDescriptor::list(TypeDescriptor::object("Post")),
        );
        let outcome = delegates().node_list("User", &field).unwrap();

        assert_eq!(outcome.signature().to_string(), "[WpPost]");
        let expected = json!([{ "id": "cG9zdDox", "title": "Hello" }]);
        assert_eq!(
            resolve(&outcome, json!({ "posts": [{ "id": "cG9zdDox" }, { "id": "missing" }] })),
            expected
        );
        assert_eq!(
            resolve(&outcome, json!({ "posts": { "nodes": [{ "id": "cG9zdDox" }] } })),
            expected
        );
        assert_eq!(resolve(&outcome, json!({ "posts": { "edges": [] } })), Value::Null);
        assert_eq!(resolve(&outcome, json!({})), Value::Null);
    }

    #[test]
    fn union_prefers_stored_node_and_falls_back_to_alias() {
        let field = FieldDescriptor::new(
            "target",
            TypeDescriptor::named(LeafKind::Union, "MenuItemObjectUnion"),
        );
        let outcome = delegates().union("MenuItem", &field).unwrap();

        assert_eq!(outcome.signature().to_string(), "WpMenuItemObjectUnion");
        assert_eq!(
            resolve(
                &outcome,
                json!({ "target": { "__typename": "Page", "id": "cGFnZToy" } })
            ),
            json!({ "id": "cGFnZToy", "title": "About" })
        );
        assert_eq!(
            resolve(
                &outcome,
                json!({
                    "target": null,
                    "target__typename_MenuItemObjectUnion": { "__typename": "Tag", "name": "rust" }
                })
            ),
            json!({ "__typename": "Tag", "name": "rust" })
        );
        assert_eq!(resolve(&outcome, json!({ "target": null })), Value::Null);
    }

    #[test]
    fn union_list_replaces_stored_nodes_and_drops_nulls() {
        let field = FieldDescriptor::new(
            "blocks",
            TypeDescriptor::list(TypeDescriptor::named(LeafKind::Union, "Block")),
        );
        let outcome = delegates().union_list("Post", &field).unwrap();

        assert_eq!(outcome.signature().to_string(), "[WpBlock]");
        assert_eq!(
            resolve(
                &outcome,
                json!({
                    "blocks": [
                        { "__typename": "Post", "id": "cG9zdDox" },
                        null,
                        { "__typename": "Paragraph", "content": "hi" }
                    ]
                })
            ),
            json!([
                { "id": "cG9zdDox", "title": "Hello" },
                { "__typename": "Paragraph", "content": "hi" }
            ])
        );
        assert_eq!(
            resolve(&outcome, json!({ "blocks__typename_Block": [] })),
            json!([])
        );
        assert_eq!(resolve(&outcome, json!({ "blocks": null })), Value::Null);
    }

    #[test]
    fn missing_named_type_is_a_delegate_failure() {
        let field = FieldDescriptor::new(
            "broken",
            TypeDescriptor {
                kind: crate::TypeKind::List,
                name: None,
                of_type: None,
            },
        );
        let error = delegates().node_list("Post", &field).unwrap_err();
        insta::assert_snapshot!(
            error,
            @r#"delegate transform failed for field 'Post.broken': type {"kind":"LIST"} has no named type"#
        );
    }
}
