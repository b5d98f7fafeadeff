//! Output type signatures.
//!
//! A signature is a named type with at most three wrappers, always one of
//! `Name`, `Name!`, `[Name]`, `[Name]!`, `[Name!]` or `[Name!]!`.

use std::fmt;
use std::str::FromStr;

use crate::error::TransformError;
use crate::introspection::TypeDescriptor;
use crate::introspection::TypeKind;
use crate::naming::is_valid_name;

/// Scalar standing in for every scalar that is not built in.
pub const OPAQUE_SCALAR: &str = "JSON";

/// The wrappers around a named type that a signature can express.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::EnumIter)]
pub enum TypeWrapping {
    /// `Name`
    Named,
    /// `Name!`
    NonNull,
    /// `[Name]`
    List,
    /// `[Name]!`
    NonNullList,
    /// `[Name!]`
    ListOfNonNull,
    /// `[Name!]!`
    NonNullListOfNonNull,
}

impl TypeWrapping {
    /// Splits a type descriptor into its wrapping and its innermost named descriptor.
    ///
    /// Returns `None` for wrappings no signature can express (nested lists, deeper
    /// nesting) and for descriptors breaking the wrapper/leaf contract.
    pub fn of(ty: &TypeDescriptor) -> Option<(Self, &TypeDescriptor)> {
        let (wrapping, leaf) = match ty.kind {
            TypeKind::NonNull => {
                let inner = ty.of_type()?;
                if inner.kind == TypeKind::List {
                    let item = inner.of_type()?;
                    if item.kind == TypeKind::NonNull {
                        (Self::NonNullListOfNonNull, item.of_type()?)
                    } else {
                        (Self::NonNullList, item)
                    }
                } else {
                    (Self::NonNull, inner)
                }
            }
            TypeKind::List => {
                let item = ty.of_type()?;
                if item.kind == TypeKind::NonNull {
                    (Self::ListOfNonNull, item.of_type()?)
                } else {
                    (Self::List, item)
                }
            }
            _ => (Self::Named, ty),
        };
        if leaf.kind.is_wrapper() || leaf.of_type.is_some() {
            return None;
        }
        Some((wrapping, leaf))
    }
}

/// A type signature of the output schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    wrapping: TypeWrapping,
    name: String,
}

impl Signature {
    pub fn new(wrapping: TypeWrapping, name: impl Into<String>) -> Self {
        Self {
            wrapping,
            name: name.into(),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::new(TypeWrapping::Named, name)
    }

    pub fn wrapping(&self) -> TypeWrapping {
        self.wrapping
    }

    /// The named type, without wrappers.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = &self.name;
        match self.wrapping {
            TypeWrapping::Named => write!(f, "{name}"),
            TypeWrapping::NonNull => write!(f, "{name}!"),
            TypeWrapping::List => write!(f, "[{name}]"),
            TypeWrapping::NonNullList => write!(f, "[{name}]!"),
            TypeWrapping::ListOfNonNull => write!(f, "[{name}!]"),
            TypeWrapping::NonNullListOfNonNull => write!(f, "[{name}!]!"),
        }
    }
}

impl FromStr for Signature {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TransformError::InvalidSignature(s.to_string());

        let (outer, non_null) = match s.strip_suffix('!') {
            Some(outer) => (outer, true),
            None => (s, false),
        };
        let (wrapping, name) = match outer.strip_prefix('[').and_then(|o| o.strip_suffix(']')) {
            Some(item) => match (item.strip_suffix('!'), non_null) {
                (Some(name), true) => (TypeWrapping::NonNullListOfNonNull, name),
                (Some(name), false) => (TypeWrapping::ListOfNonNull, name),
                (None, true) => (TypeWrapping::NonNullList, item),
                (None, false) => (TypeWrapping::List, item),
            },
            None if non_null => (TypeWrapping::NonNull, outer),
            None => (TypeWrapping::Named, outer),
        };
        if !is_valid_name(name) {
            return Err(invalid());
        }
        Ok(Self::new(wrapping, name))
    }
}
