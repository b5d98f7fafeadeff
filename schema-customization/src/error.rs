//! Schema customization errors.
use displaydoc::Display;
use thiserror::Error;

/// Failure to turn one introspected field into a type signature.
#[derive(Error, Display, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransformError {
    /// field '{type_name}.{field_name}' has a type that no rule can represent: {descriptor}
    UnclassifiableField {
        /// The remote type owning the field.
        type_name: String,
        /// The field name.
        field_name: String,
        /// The raw type descriptor, as JSON.
        descriptor: String,
    },

    /// delegate transform failed for field '{type_name}.{field_name}': {reason}
    Delegate {
        /// The remote type owning the field.
        type_name: String,
        /// The field name.
        field_name: String,
        /// Why the delegate could not produce a signature.
        reason: String,
    },

    /// invalid type signature '{0}'
    InvalidSignature(String),
}

/// A customization pass was aborted.
#[derive(Error, Display, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CustomizationError {
    /// could not customize type '{type_name}': {source}
    Field {
        /// The remote type being customized.
        type_name: String,
        /// The field failure that aborted the pass.
        source: TransformError,
    },
}

/// The introspection result could not be read.
#[derive(Error, Display, Debug)]
#[non_exhaustive]
pub enum IntrospectionError {
    /// could not deserialize introspection result: {0}
    Deserialize(#[from] serde_json::Error),
    /// introspection result has no '__schema' entry
    MissingSchema,
}

/// Configuration error.
#[derive(Error, Display, Debug)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// could not deserialize configuration: {0}
    Deserialize(#[from] serde_yaml::Error),
    /// type prefix '{0}' is not a valid GraphQL name
    InvalidTypePrefix(String),
}
