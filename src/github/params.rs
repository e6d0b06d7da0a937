// Query parameters for GitHub REST requests.
// Kept sorted by name so equal parameter sets compare and serialize identically.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Query parameters for a single request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, Value>);

impl Params {
    /// Empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a parameter, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Value of a parameter, if set.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy of these parameters with `page` set.
    pub fn with_page(&self, page: u32) -> Self {
        self.clone().with("page", page)
    }

    /// Render as `name=value` pairs for the query string.
    pub fn to_query(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(name, value)| {
                let rendered = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (name.clone(), rendered)
            })
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_query_renders_scalars() {
        let params = Params::new()
            .with("state", "open")
            .with("per_page", 20)
            .with("recursive", true);

        assert_eq!(
            params.to_query(),
            vec![
                ("per_page".to_string(), "20".to_string()),
                ("recursive".to_string(), "true".to_string()),
                ("state".to_string(), "open".to_string()),
            ]
        );
    }

    #[test]
    fn test_with_page_leaves_base_untouched() {
        let base = Params::new().with("q", "bug");
        let paged = base.with_page(3);

        assert!(base.get("page").is_none());
        assert_eq!(paged.get("page"), Some(&Value::from(3)));
        assert_eq!(paged.len(), 2);
    }
}
