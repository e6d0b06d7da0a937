// Cache key construction.
// Maps an endpoint path and its query parameters to a stable string key.

use crate::github::Params;

/// Separator between the path and the serialized parameters.
const KEY_SEPARATOR: char = '?';

/// Build the cache key for a request.
///
/// Parameters serialize with names in lexicographic order, so the same set
/// of parameters always yields the same key regardless of how it was built.
pub fn request_key(path: &str, params: &Params) -> String {
    // Params serializes as a sorted map of JSON scalars; this cannot fail.
    let serialized = serde_json::to_string(params).unwrap_or_default();
    format!("{}{}{}", path, KEY_SEPARATOR, serialized)
}
