//! Customization of every field of every remote type.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use indexmap::IndexSet;

use crate::configuration::Configuration;
use crate::delegates::NodeReferenceDelegates;
use crate::delegates::NodeStore;
use crate::error::CustomizationError;
use crate::introspection::IntrospectionSchema;
use crate::introspection::ObjectTypeDescriptor;
use crate::introspection::TypeKind;
use crate::naming::Canonicalizer;
use crate::outcome::TransformationOutcome;
use crate::rules::RuleTable;

/// The output definition of one remote type.
#[derive(Debug, Clone)]
pub struct TypeCustomization {
    /// Name of the type in the remote schema.
    pub remote_name: String,
    /// Name of the type in the output schema.
    pub name: String,
    pub kind: TypeKind,
    /// Output definition of each field, in introspection order.
    pub fields: IndexMap<String, TransformationOutcome>,
}

impl fmt::Display for TypeCustomization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self.kind {
            TypeKind::Interface => "interface",
            _ => "type",
        };
        writeln!(f, "{keyword} {} {{", self.name)?;
        for (field_name, outcome) in &self.fields {
            writeln!(f, "  {field_name}: {}", outcome.signature())?;
        }
        write!(f, "}}")
    }
}

/// Runs a [`RuleTable`] over every field of the remote types.
#[derive(Debug, Clone)]
pub struct SchemaCustomizer {
    rule_table: RuleTable,
    excluded_types: IndexSet<String>,
}

impl SchemaCustomizer {
    pub fn new(rule_table: RuleTable) -> Self {
        Self {
            rule_table,
            excluded_types: IndexSet::new(),
        }
    }

    /// Builds the rule table described by `configuration`, with node references resolved
    /// through `store`.
    pub fn from_configuration(configuration: &Configuration, store: Arc<dyn NodeStore>) -> Self {
        let canonicalizer: Arc<dyn Canonicalizer> = Arc::new(configuration.canonicalizer());
        let delegates = NodeReferenceDelegates::new(canonicalizer.clone(), store);
        let rule_table = RuleTable::new(
            canonicalizer,
            configuration.node_type_snapshot(),
            Arc::new(delegates),
        );
        Self::new(rule_table).with_excluded_types(configuration.excluded_types.iter().cloned())
    }

    pub fn with_excluded_types(mut self, excluded_types: impl IntoIterator<Item = String>) -> Self {
        self.excluded_types.extend(excluded_types);
        self
    }

    pub fn rule_table(&self) -> &RuleTable {
        &self.rule_table
    }

    /// Customizes the object and interface types of an introspected schema.
    pub fn customize_schema(
        &self,
        schema: &IntrospectionSchema,
    ) -> Result<Vec<TypeCustomization>, CustomizationError> {
        self.customize(schema.types_with_fields())
    }

    /// Customizes every type that is not excluded.
    ///
    /// The first field that cannot be customized aborts the pass: a schema missing a field
    /// type is unusable.
    pub fn customize<'a>(
        &self,
        types: impl IntoIterator<Item = &'a ObjectTypeDescriptor>,
    ) -> Result<Vec<TypeCustomization>, CustomizationError> {
        let span = tracing::info_span!("schema_customization");
        let _guard = span.enter();

        let customizations = types
            .into_iter()
            .filter(|ty| !self.excluded_types.contains(&ty.name))
            .map(|ty| self.customize_type(ty))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(types = customizations.len(), "customized remote types");
        Ok(customizations)
    }

    /// Customizes the fields of one type.
    pub fn customize_type(
        &self,
        ty: &ObjectTypeDescriptor,
    ) -> Result<TypeCustomization, CustomizationError> {
        let span = tracing::debug_span!("customize_type", type_name = %ty.name);
        let _guard = span.enter();

        let mut fields = IndexMap::with_capacity(ty.fields().len());
        for field in ty.fields() {
            if field
                .ty
                .find_leaf_name()
                .is_some_and(|name| self.excluded_types.contains(name))
            {
                tracing::debug!(field_name = %field.name, "skipping field of excluded type");
                continue;
            }
            let outcome = self.rule_table.transform(&ty.name, field).map_err(|source| {
                CustomizationError::Field {
                    type_name: ty.name.clone(),
                    source,
                }
            })?;
            fields.insert(field.name.clone(), outcome);
        }

        Ok(TypeCustomization {
            remote_name: ty.name.clone(),
            name: self.rule_table.canonicalizer().canonicalize(&ty.name),
            kind: ty.kind,
            fields,
        })
    }
}
