//! Rules turning an introspected field into an output signature.
//!
//! Each field is classified by its [`FieldShape`] into exactly one [`Rule`]. Several rule
//! predicates overlap (every list of node objects is also a list of objects), the first rule
//! in [`Rule::PRIORITY`] order wins. [`Rule::classify`] encodes that order as a single match
//! so the compiler checks that every shape is considered.

use std::sync::Arc;

use derivative::Derivative;

use crate::delegates::Delegates;
use crate::error::TransformError;
use crate::introspection::FieldDescriptor;
use crate::introspection::LeafKind;
use crate::introspection::TypeDescriptor;
use crate::json_ext::Object;
use crate::json_ext::Value;
use crate::naming::Canonicalizer;
use crate::naming::auto_alias;
use crate::outcome::Resolver;
use crate::outcome::TransformationOutcome;
use crate::registry::NodeTypes;
use crate::signature::OPAQUE_SCALAR;
use crate::signature::Signature;
use crate::signature::TypeWrapping;

/// Everything the rules look at to classify a field.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FieldShape {
    pub wrapping: TypeWrapping,
    pub leaf_kind: LeafKind,
    /// The named type is a registered node type.
    pub is_node: bool,
    /// The named type is a built-in scalar.
    pub is_builtin_scalar: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Rule {
    /// `Scalar!`
    NonNullScalar,
    /// `[Type]!`
    NonNullList,
    /// `[Type!]!`, resolved through the auto-aliased property when the field itself is absent
    NonNullListOfNonNull,
    /// `[Scalar!]` for built-in scalars
    ListOfNonNullBuiltinScalars,
    /// `[Type!]`
    ListOfNonNull,
    /// `Scalar`
    Scalar,
    /// reference to a node
    NodeObject,
    /// references to nodes
    ListOfNodeObjects,
    /// embedded object
    Object,
    /// embedded objects
    ListOfObjects,
    ListOfUnions,
    ListOfScalars,
    ListOfInterfaces,
    Union,
    Interface,
}

impl Rule {
    /// Rules in the order their predicates are tested.
    pub const PRIORITY: [Rule; 15] = [
        Rule::NonNullScalar,
        Rule::NonNullList,
        Rule::NonNullListOfNonNull,
        Rule::ListOfNonNullBuiltinScalars,
        Rule::ListOfNonNull,
        Rule::Scalar,
        Rule::NodeObject,
        Rule::ListOfNodeObjects,
        Rule::Object,
        Rule::ListOfObjects,
        Rule::ListOfUnions,
        Rule::ListOfScalars,
        Rule::ListOfInterfaces,
        Rule::Union,
        Rule::Interface,
    ];

    /// The predicate of this rule, regardless of the rules tested before it.
    pub fn matches(self, shape: &FieldShape) -> bool {
        use LeafKind as K;
        use TypeWrapping as W;

        let FieldShape {
            wrapping,
            leaf_kind,
            is_node,
            is_builtin_scalar,
        } = *shape;
        match self {
            Rule::NonNullScalar => wrapping == W::NonNull && leaf_kind == K::Scalar,
            Rule::NonNullList => wrapping == W::NonNullList,
            Rule::NonNullListOfNonNull => wrapping == W::NonNullListOfNonNull,
            Rule::ListOfNonNullBuiltinScalars => {
                wrapping == W::ListOfNonNull && leaf_kind == K::Scalar && is_builtin_scalar
            }
            Rule::ListOfNonNull => wrapping == W::ListOfNonNull,
            Rule::Scalar => wrapping == W::Named && leaf_kind == K::Scalar,
            Rule::NodeObject => wrapping == W::Named && leaf_kind == K::Object && is_node,
            Rule::ListOfNodeObjects => wrapping == W::List && leaf_kind == K::Object && is_node,
            Rule::Object => wrapping == W::Named && leaf_kind == K::Object,
            Rule::ListOfObjects => wrapping == W::List && leaf_kind == K::Object,
            Rule::ListOfUnions => wrapping == W::List && leaf_kind == K::Union,
            Rule::ListOfScalars => wrapping == W::List && leaf_kind == K::Scalar,
            Rule::ListOfInterfaces => wrapping == W::List && leaf_kind == K::Interface,
            Rule::Union => wrapping == W::Named && leaf_kind == K::Union,
            Rule::Interface => wrapping == W::Named && leaf_kind == K::Interface,
        }
    }

    /// The first rule of [`Rule::PRIORITY`] matching `shape`, if any.
    pub fn classify(shape: &FieldShape) -> Option<Rule> {
        use LeafKind as K;
        use TypeWrapping as W;

        let rule = match (shape.wrapping, shape.leaf_kind) {
            (W::NonNull, K::Scalar) => Rule::NonNullScalar,
            (W::NonNullList, _) => Rule::NonNullList,
            (W::NonNullListOfNonNull, _) => Rule::NonNullListOfNonNull,
            (W::ListOfNonNull, K::Scalar) if shape.is_builtin_scalar => {
                Rule::ListOfNonNullBuiltinScalars
            }
            (W::ListOfNonNull, _) => Rule::ListOfNonNull,
            (W::Named, K::Scalar) => Rule::Scalar,
            (W::Named, K::Object) if shape.is_node => Rule::NodeObject,
            (W::List, K::Object) if shape.is_node => Rule::ListOfNodeObjects,
            (W::Named, K::Object) => Rule::Object,
            (W::List, K::Object) => Rule::ListOfObjects,
            (W::List, K::Union) => Rule::ListOfUnions,
            (W::List, K::Scalar) => Rule::ListOfScalars,
            (W::List, K::Interface) => Rule::ListOfInterfaces,
            (W::Named, K::Union) => Rule::Union,
            (W::Named, K::Interface) => Rule::Interface,
            (W::NonNull, K::Object | K::Interface | K::Union | K::Enum | K::InputObject)
            | (W::Named | W::List, K::Enum | K::InputObject) => return None,
        };
        Some(rule)
    }
}

/// The ordered rules, bound to the registries and collaborators they consult.
///
/// Built once before a customization pass. Transforming a field never mutates the table, so
/// fields can be transformed in any order, from any thread.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct RuleTable {
    #[derivative(Debug = "ignore")]
    canonicalizer: Arc<dyn Canonicalizer>,
    node_types: NodeTypes,
    #[derivative(Debug = "ignore")]
    delegates: Arc<dyn Delegates>,
}

impl RuleTable {
    pub fn new(
        canonicalizer: Arc<dyn Canonicalizer>,
        node_types: NodeTypes,
        delegates: Arc<dyn Delegates>,
    ) -> Self {
        Self {
            canonicalizer,
            node_types,
            delegates,
        }
    }

    pub fn canonicalizer(&self) -> &dyn Canonicalizer {
        &*self.canonicalizer
    }

    pub fn node_types(&self) -> &NodeTypes {
        &self.node_types
    }

    /// Computes the shape of a field type, along with the name of its named type.
    ///
    /// `None` when the type is wrapped in a way no signature can express, or breaks the
    /// introspection contract.
    pub fn shape<'ty>(&self, ty: &'ty TypeDescriptor) -> Option<(FieldShape, &'ty str)> {
        let (wrapping, leaf) = TypeWrapping::of(ty)?;
        let name = leaf.name.as_deref()?;
        let leaf_kind = leaf.kind.as_leaf()?;
        let shape = FieldShape {
            wrapping,
            leaf_kind,
            is_node: self.node_types.is_registered_node_type(name),
            is_builtin_scalar: leaf.is_builtin_scalar(),
        };
        Some((shape, name))
    }

    pub fn classify(&self, field: &FieldDescriptor) -> Option<Rule> {
        self.shape(&field.ty)
            .and_then(|(shape, _)| Rule::classify(&shape))
    }

    /// Derives the output definition of `field`, a field of the remote type `type_name`.
    pub fn transform(
        &self,
        type_name: &str,
        field: &FieldDescriptor,
    ) -> Result<TransformationOutcome, TransformError> {
        let Some((shape, name, rule)) = self
            .shape(&field.ty)
            .and_then(|(shape, name)| Some((shape, name, Rule::classify(&shape)?)))
        else {
            let descriptor = field.ty.to_json();
            tracing::error!(
                type_name,
                field_name = %field.name,
                %descriptor,
                "no rule matches field type"
            );
            return Err(TransformError::UnclassifiableField {
                type_name: type_name.to_string(),
                field_name: field.name.clone(),
                descriptor,
            });
        };
        tracing::debug!(type_name, field_name = %field.name, %rule, "classified field");

        let outcome = match rule {
            Rule::NonNullScalar => {
                Signature::new(TypeWrapping::NonNull, self.scalar_name(&shape, name)).into()
            }
            Rule::NonNullList => {
                Signature::new(TypeWrapping::NonNullList, self.item_name(&shape, name)).into()
            }
            Rule::NonNullListOfNonNull => TransformationOutcome::resolved(
                Signature::new(
                    TypeWrapping::NonNullListOfNonNull,
                    self.item_name(&shape, name),
                ),
                aliased_list_resolver(&field.name, name),
            ),
            Rule::ListOfNonNullBuiltinScalars => {
                Signature::new(TypeWrapping::ListOfNonNull, name).into()
            }
            Rule::ListOfNonNull => Signature::new(
                TypeWrapping::ListOfNonNull,
                self.canonicalizer.canonicalize(name),
            )
            .into(),
            Rule::Scalar => {
                Signature::new(TypeWrapping::Named, self.scalar_name(&shape, name)).into()
            }
            Rule::NodeObject => self.delegates.node_object(type_name, field)?,
            Rule::ListOfNodeObjects => self.delegates.node_list(type_name, field)?,
            Rule::Object | Rule::Interface => {
                Signature::new(TypeWrapping::Named, self.canonicalizer.canonicalize(name)).into()
            }
            Rule::ListOfObjects | Rule::ListOfInterfaces => {
                Signature::new(TypeWrapping::List, self.canonicalizer.canonicalize(name)).into()
            }
            Rule::ListOfUnions => self.delegates.union_list(type_name, field)?,
            Rule::ListOfScalars => {
                Signature::new(TypeWrapping::List, self.scalar_name(&shape, name)).into()
            }
            Rule::Union => self.delegates.union(type_name, field)?,
        };
        Ok(outcome)
    }

    /// Custom scalars are typed as the opaque scalar.
    fn scalar_name<'a>(&self, shape: &FieldShape, name: &'a str) -> &'a str {
        if shape.is_builtin_scalar {
            name
        } else {
            OPAQUE_SCALAR
        }
    }

    fn item_name(&self, shape: &FieldShape, name: &str) -> String {
        if shape.is_builtin_scalar {
            name.to_string()
        } else {
            self.canonicalizer.canonicalize(name)
        }
    }
}

/// Resolves a non-null list from the field property, falling back to the property aliased
/// by type. The list is empty when neither holds a value.
fn aliased_list_resolver(field_name: &str, type_name: &str) -> Resolver {
    let field_name = field_name.to_string();
    let alias = auto_alias(&field_name, type_name);
    Resolver::new(move |source: &Object| {
        if let Some(value) = source.get(field_name.as_str()) {
            return non_null_or_empty_list(value);
        }
        tracing::trace!(field_name = %field_name, %alias, "reading auto-aliased field");
        source
            .get(alias.as_str())
            .map(non_null_or_empty_list)
            .unwrap_or_else(|| Value::Array(Vec::new()))
    })
}

fn non_null_or_empty_list(value: &Value) -> Value {
    if value.is_null() {
        Value::Array(Vec::new())
    } else {
        value.clone()
    }
}

#[cfg(test)]
mod tests {
    use itertools::iproduct;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::delegates::NodeReferenceDelegates;
    use crate::naming::PrefixCanonicalizer;

    fn all_shapes() -> impl Iterator<Item = FieldShape> {
        iproduct!(
            TypeWrapping::iter(),
            LeafKind::iter(),
            [false, true],
            [false, true]
        )
        .map(
            |(wrapping, leaf_kind, is_node, is_builtin_scalar)| FieldShape {
                wrapping,
                leaf_kind,
                is_node,
                is_builtin_scalar,
            },
        )
        // only scalars can be built in
        .filter(|shape| shape.leaf_kind == LeafKind::Scalar || !shape.is_builtin_scalar)
    }

    #[test]
    fn classification_is_first_matching_predicate() {
        for shape in all_shapes() {
            let first_match = Rule::PRIORITY
                .into_iter()
                .find(|rule| rule.matches(&shape));
            assert_eq!(Rule::classify(&shape), first_match, "{shape:?}");
        }
    }

    #[test]
    fn priority_lists_every_rule_once() {
        assert_eq!(Rule::PRIORITY.to_vec(), Rule::iter().collect::<Vec<_>>());
    }

    #[test]
    fn specific_rules_precede_the_general_rules_they_overlap() {
        for shape in all_shapes() {
            let matching: Vec<Rule> = Rule::PRIORITY
                .into_iter()
                .filter(|rule| rule.matches(&shape))
                .collect();
            match matching.as_slice() {
                [] | [_] => {}
                [Rule::ListOfNonNullBuiltinScalars, Rule::ListOfNonNull]
                | [Rule::NodeObject, Rule::Object]
                | [Rule::ListOfNodeObjects, Rule::ListOfObjects] => {}
                other => panic!("unexpected overlap {other:?} for {shape:?}"),
            }
        }
    }

    #[test]
    fn unsupported_shapes() {
        let unsupported: Vec<_> = all_shapes()
            .filter(|shape| Rule::classify(shape).is_none())
            .map(|shape| format!("{} {}", shape.wrapping, shape.leaf_kind))
            .collect::<indexmap::IndexSet<_>>()
            .into_iter()
            .collect();
        insta::assert_snapshot!(unsupported.join("\n"), @r"
        Named ENUM
        Named INPUT_OBJECT
        NonNull OBJECT
        NonNull INTERFACE
        NonNull UNION
        NonNull ENUM
        NonNull INPUT_OBJECT
        List ENUM
        List INPUT_OBJECT
        ");
    }

    #[test]
    #[tracing_test::traced_test]
    fn unclassifiable_field_is_logged() {
        let canonicalizer: Arc<dyn Canonicalizer> = Arc::new(PrefixCanonicalizer::new("Wp"));
        let no_nodes = |_: &str, _: &str| -> Option<Value> { None };
        let delegates = NodeReferenceDelegates::new(canonicalizer.clone(), Arc::new(no_nodes));
        let rule_table = RuleTable::new(canonicalizer, NodeTypes::default(), Arc::new(delegates));
        let field = FieldDescriptor::new(
            "status",
            TypeDescriptor::named(LeafKind::Enum, "PostStatusEnum"),
        );

        assert!(rule_table.transform("Post", &field).is_err());
        assert!(logs_contain("no rule matches field type"));
        assert!(logs_contain("PostStatusEnum"));
    }

    #[test]
    fn aliased_list_resolver_defaults_null_to_empty_list() {
        let resolver = aliased_list_resolver("tags", "Tag");
        let source = serde_json_bytes::json!({ "tags": null, "tags__typename_Tag": [{ "id": "1" }] });
        assert_eq!(
            resolver.resolve(source.as_object().unwrap()),
            Value::Array(Vec::new())
        );
    }
}
