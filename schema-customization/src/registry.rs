//! Node type registry.

use indexmap::IndexSet;

/// Snapshot of the remote object types that are top-level, independently addressable nodes.
///
/// Fields pointing to a node type become references to that node instead of embedded
/// objects. The snapshot is taken before a customization pass starts and is never mutated
/// while the pass runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeTypes {
    names: IndexSet<String>,
}

impl NodeTypes {
    pub fn is_registered_node_type(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for NodeTypes {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}
