use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An untyped backend row, exactly as decoded from JSON.
///
/// This is the distrust boundary: nothing past the normalizer sees one.
pub type RawRow = Map<String, Value>;

/// Everything fetched for one customer in a single dashboard load,
/// before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPolicyBundle {
    /// The normalized e-mail the rows were fetched for
    pub email: String,

    /// At most one investment row
    pub investment: Option<RawRow>,

    /// ETF allocation rows, in backend order
    pub etfs: Vec<RawRow>,

    /// Portfolio snapshot rows, in backend order
    pub snapshots: Vec<RawRow>,
}

/// Interpret a decoded JSON value as a list of rows, skipping non-objects.
///
/// Backends occasionally answer with `null` or a single object where a list
/// is expected; both are accepted.
#[must_use]
pub fn rows_from_value(value: Value) -> Vec<RawRow> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        Value::Object(map) => vec![map],
        _ => Vec::new(),
    }
}
