use std::path::Path;

use anyhow::Context;
use serde_json::Value;

use super::{path_segments, CatalogStore};

/// Whole catalog tree kept in memory, usually loaded from an export of the
/// realtime database.
pub struct JsonCatalogStore {
    root: Value,
}

impl JsonCatalogStore {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read catalog file {}", path.display()))?;
        let root = serde_json::from_str(&raw)
            .with_context(|| format!("catalog file {} is not valid json", path.display()))?;

        Ok(Self::new(root))
    }

    fn lookup(&self, path: &str) -> Option<&Value> {
        path_segments(path)
            .try_fold(&self.root, |node, segment| match node {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
            .filter(|value| !value.is_null())
    }
}

impl CatalogStore for JsonCatalogStore {
    async fn get(&self, path: &str) -> anyhow::Result<Option<Value>> {
        Ok(self.lookup(path).cloned())
    }
}
