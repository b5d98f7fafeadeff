//! Derives the type signatures (and, where needed, field resolvers) of a schema built on top
//! of a remote GraphQL API, starting from the API's introspection result.
//!
//! The entry points are [`RuleTable`], which turns one introspected field into a
//! [`TransformationOutcome`], and [`SchemaCustomizer`], which runs the rule table over every
//! field of every customizable type of an [`IntrospectionSchema`].
//!
//! ```ignore
//! let configuration = Configuration::from_yaml(config_yaml)?;
//! let schema = IntrospectionSchema::from_json(introspection_json)?;
//! let customizer = SchemaCustomizer::from_configuration(&configuration, node_store);
//! for customization in customizer.customize_schema(&schema)? {
//!     println!("{customization}");
//! }
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![warn(
    rustdoc::broken_intra_doc_links,
    unreachable_pub,
    unreachable_patterns,
    unused,
    unused_qualifications,
    dead_code,
    while_true,
    unconditional_panic,
    clippy::all
)]

pub mod configuration;
pub mod customization;
pub mod delegates;
pub mod error;
pub mod introspection;
pub mod json_ext;
pub mod naming;
pub mod outcome;
pub mod registry;
pub mod rules;
pub mod signature;

pub use crate::configuration::Configuration;
pub use crate::customization::SchemaCustomizer;
pub use crate::customization::TypeCustomization;
pub use crate::delegates::Delegates;
pub use crate::delegates::NodeReferenceDelegates;
pub use crate::delegates::NodeStore;
pub use crate::error::ConfigurationError;
pub use crate::error::CustomizationError;
pub use crate::error::IntrospectionError;
pub use crate::error::TransformError;
pub use crate::introspection::FieldDescriptor;
pub use crate::introspection::IntrospectionSchema;
pub use crate::introspection::ObjectTypeDescriptor;
pub use crate::introspection::TypeDescriptor;
pub use crate::introspection::TypeKind;
pub use crate::naming::Canonicalizer;
pub use crate::naming::PrefixCanonicalizer;
pub use crate::outcome::Resolver;
pub use crate::outcome::TransformationOutcome;
pub use crate::registry::NodeTypes;
pub use crate::rules::Rule;
pub use crate::rules::RuleTable;
pub use crate::signature::Signature;
pub use crate::signature::TypeWrapping;

const _: () = {
    const fn assert_thread_safe<T: Sync + Send>() {}

    assert_thread_safe::<RuleTable>();
    assert_thread_safe::<SchemaCustomizer>();
    assert_thread_safe::<TransformationOutcome>();
};
