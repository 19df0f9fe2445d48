use serde::{Deserialize, Serialize};

/// Registry configuration.
///
/// Deserializable so an embedding application can keep it alongside its
/// own settings; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryOptions {
    /// Maximum number of distinct selector strings kept in the expansion
    /// cache. `None` keeps every selector.
    pub selector_cache_limit: Option<usize>,

    /// Let namespaced lookups fall back to declarations registered in the
    /// root scope.
    pub root_fallback: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            selector_cache_limit: None,
            root_fallback: true,
        }
    }
}
