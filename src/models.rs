use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One `servers/{id}/catalogo/{entry}` node as it is kept in the store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogEntry {
    pub title: String,
    pub synopsis: String,
    pub cover: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub featured: bool,
    pub episode_count: u32,
    pub genres: Value,
    pub season_path: Option<String>,
}

impl CatalogEntry {
    /// Values of the genre mapping (or array) with falsy entries dropped.
    pub fn genre_list(&self) -> Vec<String> {
        let values: Box<dyn Iterator<Item = &Value> + '_> = match &self.genres {
            Value::Object(map) => Box::new(map.values()),
            Value::Array(items) => Box::new(items.iter()),
            Value::String(_) => Box::new(std::iter::once(&self.genres)),
            _ => Box::new(std::iter::empty()),
        };

        values
            .filter_map(|value| match value {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpisodeRecord {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub video: String,
}

/// Listing projection of a catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogItem {
    pub id: String,
    pub title: String,
    pub cover: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub featured: bool,
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPreview {
    pub id: String,
    pub title: String,
    pub synopsis: String,
    pub cover: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub featured: bool,
    pub genres: Vec<String>,
    pub episode_count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEntry {
    pub preview: EntryPreview,
    pub fetch_url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodesResponse {
    pub server: String,
    pub entry: String,
    pub title: String,
    pub synopsis: String,
    pub cover: String,
    pub episode_count: u32,
    pub genres: Vec<String>,
    pub total_extracted: usize,
    pub episodes: Vec<EpisodeRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub access_code: String,
}
