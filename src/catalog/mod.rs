mod json_store;
mod realtime_db;
pub mod resolver;

pub use json_store::JsonCatalogStore;
pub use realtime_db::RealtimeDbStore;
pub use resolver::{CatalogError, CatalogFilter};

use enum_dispatch::enum_dispatch;
use serde_json::Value;
use strum_macros::{Display, EnumString, VariantNames};

/// Read-only view of the hierarchical key-value store holding
/// `servers/{id}/...` and `users/{id}`.
#[enum_dispatch]
pub trait CatalogStore {
    /// Value at a slash-delimited path, `None` when absent.
    async fn get(&self, path: &str) -> anyhow::Result<Option<Value>>;
}

#[enum_dispatch(CatalogStore)]
pub enum AllCatalogStores {
    JsonCatalogStore,
    RealtimeDbStore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, VariantNames, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum StoreKind {
    Json,
    RealtimeDb,
}

/// Splits a store path into its segments. Empty, `.` and `..` segments are
/// dropped so a path can never climb out of the node it names.
pub(crate) fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/')
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
}

/// Whether `id` can be used as a single store key. Mirrors the characters
/// the realtime database refuses in keys.
pub(crate) fn is_valid_key(id: &str) -> bool {
    !id.is_empty()
        && !id
            .chars()
            .any(|c| matches!(c, '/' | '.' | '#' | '$' | '[' | ']') || c.is_control())
}
