//! JSON types for the runtime records resolvers read from.

use serde_json_bytes::ByteString;
use serde_json_bytes::Map;
pub use serde_json_bytes::Value;

/// A JSON object.
pub type Object = Map<ByteString, Value>;

pub(crate) trait ValueExt {
    /// Returns the `id` property of an object value, if it is a string.
    fn node_id(&self) -> Option<&str>;
}

impl ValueExt for Value {
    fn node_id(&self) -> Option<&str> {
        self.as_object()
            .and_then(|object| object.get("id"))
            .and_then(Value::as_str)
    }
}
