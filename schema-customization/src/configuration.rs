//! Logic for loading configuration in to an object model

use schemars::JsonSchema;
use schemars::schema::RootSchema;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigurationError;
use crate::naming::PrefixCanonicalizer;
use crate::naming::is_valid_name;
use crate::registry::NodeTypes;

const DEFAULT_TYPE_PREFIX: &str = "Wp";

/// The configuration of a customization pass.
///
/// Can be created through `serde::Deserialize` from various formats, or with
/// [`Configuration::builder`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct Configuration {
    /// Prefix added to remote type names to build output type names.
    pub type_prefix: String,

    /// Remote types that are left out of the customization.
    pub excluded_types: Vec<String>,

    /// Remote object types sourced as nodes. Fields of these types become node references.
    pub node_types: Vec<String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            type_prefix: DEFAULT_TYPE_PREFIX.to_string(),
            excluded_types: Vec::new(),
            node_types: Vec::new(),
        }
    }
}

#[buildstructor::buildstructor]
impl Configuration {
    #[builder]
    pub fn new(
        type_prefix: Option<String>,
        excluded_types: Vec<String>,
        node_types: Vec<String>,
    ) -> Result<Self, ConfigurationError> {
        let configuration = Self {
            type_prefix: type_prefix.unwrap_or_else(|| DEFAULT_TYPE_PREFIX.to_string()),
            excluded_types,
            node_types,
        };
        configuration.validate()?;
        Ok(configuration)
    }

    /// Parses and validates a YAML configuration. An empty document yields the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigurationError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let configuration: Self = serde_yaml::from_str(yaml)?;
        configuration.validate()?;
        Ok(configuration)
    }

    /// The JSON schema of the configuration, for editor support.
    pub fn json_schema() -> RootSchema {
        schemars::schema_for!(Configuration)
    }

    pub fn canonicalizer(&self) -> PrefixCanonicalizer {
        PrefixCanonicalizer::new(self.type_prefix.clone())
    }

    pub fn node_type_snapshot(&self) -> NodeTypes {
        self.node_types.iter().cloned().collect()
    }

    pub fn is_excluded(&self, type_name: &str) -> bool {
        self.excluded_types.iter().any(|excluded| excluded == type_name)
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        if !is_valid_name(&self.type_prefix) {
            return Err(ConfigurationError::InvalidTypePrefix(
                self.type_prefix.clone(),
            ));
        }
        Ok(())
    }
}
