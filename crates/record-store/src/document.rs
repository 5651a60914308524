use serde::{Serialize, de::DeserializeOwned};

/// A typed document stored in a single collection.
///
/// The document body is serialized to a JSON object; the record id and
/// timestamps live outside it on the [`Record`](crate::Record).
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    /// Name of the collection this document type is stored in.
    const COLLECTION: &'static str;

    /// Top-level fields whose values must be unique within the collection.
    fn unique_fields() -> &'static [&'static str] {
        &[]
    }
}
