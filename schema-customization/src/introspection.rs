//! Introspected remote schema, as returned by a standard GraphQL introspection query.
//!
//! Only the parts of the `__schema` result needed to derive field signatures are kept:
//! every type's `kind` and `name`, and for types with fields, each field's `name` and `type`.

use serde::Deserialize;
use serde::Serialize;

use crate::error::IntrospectionError;

/// Built-in scalars of the output schema language.
// https://spec.graphql.org/draft/#sec-Scalars.Built-in-Scalars
pub const BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

/// The `__TypeKind` of an introspected type.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

/// The kind of a named, unwrapped type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LeafKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
}

impl TypeKind {
    /// Returns the leaf kind, or `None` for the `LIST` and `NON_NULL` wrappers.
    pub fn as_leaf(self) -> Option<LeafKind> {
        match self {
            TypeKind::Scalar => Some(LeafKind::Scalar),
            TypeKind::Object => Some(LeafKind::Object),
            TypeKind::Interface => Some(LeafKind::Interface),
            TypeKind::Union => Some(LeafKind::Union),
            TypeKind::Enum => Some(LeafKind::Enum),
            TypeKind::InputObject => Some(LeafKind::InputObject),
            TypeKind::List | TypeKind::NonNull => None,
        }
    }

    pub fn is_wrapper(self) -> bool {
        self.as_leaf().is_none()
    }
}

impl From<LeafKind> for TypeKind {
    fn from(kind: LeafKind) -> Self {
        match kind {
            LeafKind::Scalar => TypeKind::Scalar,
            LeafKind::Object => TypeKind::Object,
            LeafKind::Interface => TypeKind::Interface,
            LeafKind::Union => TypeKind::Union,
            LeafKind::Enum => TypeKind::Enum,
            LeafKind::InputObject => TypeKind::InputObject,
        }
    }
}

/// A node of an introspected type reference.
///
/// Leaf kinds carry a `name`, the `LIST` and `NON_NULL` wrappers carry the wrapped type in
/// `of_type`. Introspection results always respect this; descriptors built by hand may not, in
/// which case no rule will classify them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptor {
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub of_type: Option<Box<TypeDescriptor>>,
}

impl TypeDescriptor {
    pub fn named(kind: LeafKind, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: Some(name.into()),
            of_type: None,
        }
    }

    pub fn scalar(name: impl Into<String>) -> Self {
        Self::named(LeafKind::Scalar, name)
    }

    pub fn object(name: impl Into<String>) -> Self {
        Self::named(LeafKind::Object, name)
    }

    pub fn list(of_type: TypeDescriptor) -> Self {
        Self {
            kind: TypeKind::List,
            name: None,
            of_type: Some(Box::new(of_type)),
        }
    }

    pub fn non_null(of_type: TypeDescriptor) -> Self {
        Self {
            kind: TypeKind::NonNull,
            name: None,
            of_type: Some(Box::new(of_type)),
        }
    }

    pub fn of_type(&self) -> Option<&TypeDescriptor> {
        self.of_type.as_deref()
    }

    /// Follows `of_type` through the wrappers down to the innermost descriptor.
    pub fn innermost(&self) -> &TypeDescriptor {
        let mut current = self;
        while let Some(inner) = current.of_type() {
            current = inner;
        }
        current
    }

    /// return the name of the innermost named type
    ///
    /// Example if we get the field `list: [User!]!`, it will return "User"
    pub fn find_leaf_name(&self) -> Option<&str> {
        self.innermost().name.as_deref()
    }

    /// Returns the kind of the innermost descriptor.
    pub fn find_leaf_kind(&self) -> TypeKind {
        self.innermost().kind
    }

    /// Whether the innermost type is one of the [`BUILTIN_SCALARS`].
    pub fn is_builtin_scalar(&self) -> bool {
        let leaf = self.innermost();
        leaf.kind == TypeKind::Scalar
            && leaf
                .name
                .as_deref()
                .is_some_and(|name| BUILTIN_SCALARS.contains(&name))
    }

    /// Number of `LIST`/`NON_NULL` wrappers around the innermost descriptor.
    pub fn depth(&self) -> usize {
        std::iter::successors(self.of_type(), |ty| ty.of_type()).count()
    }

    /// Compact JSON rendering, used in diagnostics.
    pub(crate) fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}

/// One field of a remote type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A named type of the remote schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectTypeDescriptor {
    pub kind: TypeKind,
    pub name: String,
    /// `null` in introspection results for types without fields.
    #[serde(default)]
    pub fields: Option<Vec<FieldDescriptor>>,
}

impl ObjectTypeDescriptor {
    pub fn new(kind: TypeKind, name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            kind,
            name: name.into(),
            fields: Some(fields),
        }
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        self.fields.as_deref().unwrap_or_default()
    }

    /// Introspection meta types such as `__Type` are prefixed by `__`.
    pub fn is_introspection_type(&self) -> bool {
        self.name.starts_with("__")
    }
}

/// The `__schema` part of an introspection result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntrospectionSchema {
    pub types: Vec<ObjectTypeDescriptor>,
}

impl IntrospectionSchema {
    /// Reads either a full GraphQL response (`{"data": {"__schema": ...}}`) or the bare
    /// `{"__schema": ...}` object.
    pub fn from_json(json: &str) -> Result<Self, IntrospectionError> {
        let mut response: serde_json::Value = serde_json::from_str(json)?;
        if let Some(data) = response.get_mut("data").map(serde_json::Value::take) {
            response = data;
        }
        let schema = response
            .get_mut("__schema")
            .map(serde_json::Value::take)
            .ok_or(IntrospectionError::MissingSchema)?;

        let schema: Self = serde_json::from_value(schema)?;
        tracing::debug!(types = schema.types.len(), "read introspection result");
        Ok(schema)
    }

    pub fn get(&self, name: &str) -> Option<&ObjectTypeDescriptor> {
        self.types.iter().find(|ty| ty.name == name)
    }

    /// Object and interface types, the only types whose fields get customized.
    pub fn types_with_fields(&self) -> impl Iterator<Item = &ObjectTypeDescriptor> {
        self.types.iter().filter(|ty| {
            matches!(ty.kind, TypeKind::Object | TypeKind::Interface) && !ty.is_introspection_type()
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn posts_field() -> TypeDescriptor {
        TypeDescriptor::non_null(TypeDescriptor::list(TypeDescriptor::non_null(
            TypeDescriptor::object("Post"),
        )))
    }

    #[test]
    fn leaf_accessors_walk_through_wrappers() {
        let ty = posts_field();
        assert_eq!(ty.find_leaf_name(), Some("Post"));
        assert_eq!(ty.find_leaf_kind(), TypeKind::Object);
        assert_eq!(ty.depth(), 3);
        assert!(!ty.is_builtin_scalar());
    }

    #[test]
    fn builtin_scalars_require_scalar_kind() {
        assert!(TypeDescriptor::non_null(TypeDescriptor::scalar("ID")).is_builtin_scalar());
        assert!(!TypeDescriptor::scalar("DateTime").is_builtin_scalar());
        assert!(!TypeDescriptor::object("String").is_builtin_scalar());
    }

    #[test]
    fn malformed_wrapper_has_no_leaf_name() {
        let ty = TypeDescriptor {
            kind: TypeKind::List,
            name: None,
            of_type: None,
        };
        assert_eq!(ty.find_leaf_name(), None);
        assert_eq!(ty.find_leaf_kind(), TypeKind::List);
    }

    #[test]
    fn descriptor_serializes_like_introspection() {
        insta::assert_snapshot!(
            posts_field().to_json(),
            @r#"{"kind":"NON_NULL","ofType":{"kind":"LIST","ofType":{"kind":"NON_NULL","ofType":{"kind":"OBJECT","name":"Post"}}}}"#
        );
    }

    #[test]
    fn reads_full_response() {
        let schema = IntrospectionSchema::from_json(
            r#"{
              "data": {
                "__schema": {
                  "types": [
                    {
                      "kind": "OBJECT",
                      "name": "Post",
                      "description": null,
                      "fields": [
                        {
                          "name": "title",
                          "args": [],
                          "type": { "kind": "SCALAR", "name": "String", "ofType": null }
                        }
                      ]
                    },
                    { "kind": "SCALAR", "name": "String", "fields": null },
                    { "kind": "OBJECT", "name": "__Type", "fields": [] }
                  ]
                }
              }
            }"#,
        )
        .unwrap();

        assert_eq!(schema.types.len(), 3);
        let post = schema.get("Post").unwrap();
        assert_eq!(
            post.fields(),
            &[FieldDescriptor::new("title", TypeDescriptor::scalar("String"))]
        );
        assert!(schema.get("String").unwrap().fields().is_empty());
        assert_eq!(
            schema
                .types_with_fields()
                .map(|ty| ty.name.as_str())
                .collect::<Vec<_>>(),
            vec!["Post"]
        );
    }

    #[test]
    fn reads_bare_schema() {
        let schema =
            IntrospectionSchema::from_json(r#"{ "__schema": { "types": [] } }"#).unwrap();
        assert!(schema.types.is_empty());
    }

    #[test]
    fn missing_schema_is_an_error() {
        let error = IntrospectionSchema::from_json(r#"{ "data": { "posts": [] } }"#).unwrap_err();
        assert!(matches!(error, IntrospectionError::MissingSchema));
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let error = IntrospectionSchema::from_json(
            r#"{ "__schema": { "types": [ { "kind": "TUPLE", "name": "Pair" } ] } }"#,
        )
        .unwrap_err();
        assert!(matches!(error, IntrospectionError::Deserialize(_)));
    }
}
