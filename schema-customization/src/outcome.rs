use std::fmt;
use std::sync::Arc;

use crate::json_ext::Object;
use crate::json_ext::Value;
use crate::signature::Signature;

/// Computes a field value from the runtime record of its parent.
#[derive(Clone)]
pub struct Resolver(Arc<dyn Fn(&Object) -> Value + Send + Sync>);

impl Resolver {
    pub fn new(resolve: impl Fn(&Object) -> Value + Send + Sync + 'static) -> Self {
        Self(Arc::new(resolve))
    }

    pub fn resolve(&self, source: &Object) -> Value {
        (self.0)(source)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Resolver").finish_non_exhaustive()
    }
}

/// The output definition of one field.
#[derive(Debug, Clone)]
pub enum TransformationOutcome {
    /// The field is read as is from its parent record.
    Signature(Signature),
    /// The field value is computed by a resolver.
    ResolvedField {
        signature: Signature,
        resolver: Resolver,
    },
}

impl TransformationOutcome {
    pub fn resolved(signature: Signature, resolver: Resolver) -> Self {
        Self::ResolvedField {
            signature,
            resolver,
        }
    }

    pub fn signature(&self) -> &Signature {
        match self {
            Self::Signature(signature) | Self::ResolvedField { signature, .. } => signature,
        }
    }

    pub fn resolver(&self) -> Option<&Resolver> {
        match self {
            Self::Signature(_) => None,
            Self::ResolvedField { resolver, .. } => Some(resolver),
        }
    }
}

impl From<Signature> for TransformationOutcome {
    fn from(signature: Signature) -> Self {
        Self::Signature(signature)
    }
}
