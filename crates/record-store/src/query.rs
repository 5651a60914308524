use serde_json::{Map, Value};

/// Builder for selecting records within a collection.
///
/// A record matches when every listed top-level field equals the given
/// JSON value. Constraints are meant for scalar values (ids, strings,
/// numbers, booleans).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    /// Field equality constraints, in insertion order.
    pub fields: Vec<(String, Value)>,

    /// Maximum number of records to return.
    pub limit: Option<usize>,

    /// Number of records to skip.
    pub offset: Option<usize>,
}

impl Filter {
    /// Creates a filter that matches every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a filter on a single field.
    pub fn by(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new().eq(field, value)
    }

    /// Requires `field` to equal `value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((field.into(), value.into()));
        self
    }

    /// Limits the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips the first `offset` results.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns true if the document body satisfies every constraint.
    pub fn matches(&self, data: &Value) -> bool {
        self.fields
            .iter()
            .all(|(field, expected)| data.get(field) == Some(expected))
    }

    /// Returns the constraints as a single JSON object.
    pub fn as_object(&self) -> Value {
        let map: Map<String, Value> = self.fields.iter().cloned().collect();
        Value::Object(map)
    }

    /// Returns true if the filter has no field constraints.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
