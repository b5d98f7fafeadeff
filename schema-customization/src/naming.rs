//! Naming of output types.

use apollo_compiler::Name;

/// Maps a remote type name to the name of the corresponding output type.
///
/// Implementations must be deterministic: the same remote name always yields the same output
/// name, and distinct remote names should not collide.
pub trait Canonicalizer: Send + Sync {
    fn canonicalize(&self, remote_name: &str) -> String;
}

/// Namespaces remote types by prefixing their name, `Post` becoming `WpPost`.
///
/// A remote type named exactly like the prefix is the root namespace type and keeps its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixCanonicalizer {
    prefix: String,
}

impl PrefixCanonicalizer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Canonicalizer for PrefixCanonicalizer {
    fn canonicalize(&self, remote_name: &str) -> String {
        if remote_name == self.prefix {
            return remote_name.to_string();
        }
        format!("{}{remote_name}", self.prefix)
    }
}

/// Separates the field name from the type name in auto-aliased properties.
pub const ALIAS_SEPARATOR: &str = "__typename_";

/// Property under which the remote data of `field_name` is stored when the query fetching it
/// had to alias the field by type, e.g. `posts__typename_Post`.
pub fn auto_alias(field_name: &str, type_name: &str) -> String {
    format!("{field_name}{ALIAS_SEPARATOR}{type_name}")
}

/// Whether `name` can be used as a GraphQL type name.
pub(crate) fn is_valid_name(name: &str) -> bool {
    Name::new(name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_remote_names() {
        let canonicalizer = PrefixCanonicalizer::new("Wp");
        assert_eq!(canonicalizer.canonicalize("Post"), "WpPost");
        assert_eq!(canonicalizer.canonicalize("MediaItem"), "WpMediaItem");
        // already prefixed types are still namespaced, only the root type is left alone
        assert_eq!(canonicalizer.canonicalize("WpPost"), "WpWpPost");
        assert_eq!(canonicalizer.canonicalize("Wp"), "Wp");
    }

    #[test]
    fn auto_aliases() {
        assert_eq!(auto_alias("posts", "Post"), "posts__typename_Post");
    }

    #[test]
    fn name_validation() {
        assert!(is_valid_name("Wp"));
        assert!(is_valid_name("_internal2"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("2Wp"));
        assert!(!is_valid_name("Wp-Type"));
    }
}
