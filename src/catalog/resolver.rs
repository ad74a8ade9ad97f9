use indexmap::IndexMap;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use thiserror::Error;

use super::{is_valid_key, AllCatalogStores, CatalogStore};
use crate::{
    models::{CatalogEntry, CatalogItem, EntryPreview, ResolvedEntry, UserRecord},
    utils::text::contains_ignore_case,
};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("catalog misconfigured: {0}")]
    Misconfigured(String),
    #[error("catalog store failure: {0}")]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogFilter {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub featured: Option<bool>,
    pub genre: Option<String>,
}

impl CatalogFilter {
    pub fn matches(&self, item: &CatalogItem) -> bool {
        if let Some(title) = &self.title {
            if !contains_ignore_case(&item.title, title) {
                return false;
            }
        }

        if let Some(content_type) = &self.content_type {
            if item.content_type != *content_type {
                return false;
            }
        }

        if self.featured == Some(true) && !item.featured {
            return false;
        }

        if let Some(genre) = &self.genre {
            if !item.genres.iter().any(|g| contains_ignore_case(g, genre)) {
                return false;
            }
        }

        true
    }
}

fn entry_path(server: &str, entry: &str) -> String {
    format!("servers/{server}/catalogo/{entry}")
}

fn parse<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, CatalogError> {
    serde_json::from_value(value)
        .map_err(|err| CatalogError::Misconfigured(format!("{what} has unexpected shape: {err}")))
}

fn to_preview(id: &str, entry: &CatalogEntry) -> EntryPreview {
    EntryPreview {
        id: id.to_owned(),
        title: entry.title.clone(),
        synopsis: entry.synopsis.clone(),
        cover: entry.cover.clone(),
        content_type: entry.content_type.clone(),
        featured: entry.featured,
        genres: entry.genre_list(),
        episode_count: entry.episode_count,
    }
}

fn to_item(id: &str, entry: &CatalogEntry) -> CatalogItem {
    CatalogItem {
        id: id.to_owned(),
        title: entry.title.clone(),
        cover: entry.cover.clone(),
        content_type: entry.content_type.clone(),
        featured: entry.featured,
        genres: entry.genre_list(),
    }
}

async fn load_entry(
    store: &AllCatalogStores,
    server: &str,
    entry: &str,
) -> Result<CatalogEntry, CatalogError> {
    if !is_valid_key(server) || !is_valid_key(entry) {
        return Err(CatalogError::NotFound("entry"));
    }

    let path = entry_path(server, entry);
    let value = store
        .get(&path)
        .await?
        .ok_or(CatalogError::NotFound("entry"))?;

    parse(value, &path)
}

/// Entry metadata plus the page to scrape: `{link}/{seasonPath}`.
pub async fn resolve(
    store: &AllCatalogStores,
    server: &str,
    entry: &str,
) -> Result<ResolvedEntry, CatalogError> {
    let catalog_entry = load_entry(store, server, entry).await?;

    let link = match store.get(&format!("servers/{server}/link")).await? {
        Some(Value::String(link)) => link,
        Some(_) => {
            return Err(CatalogError::Misconfigured(format!(
                "server {server} link is not a string"
            )))
        }
        None => {
            return Err(CatalogError::Misconfigured(format!(
                "server {server} has no link"
            )))
        }
    };

    let season_path = catalog_entry.season_path.as_deref().ok_or_else(|| {
        CatalogError::Misconfigured(format!("entry {server}/{entry} has no season path"))
    })?;

    Ok(ResolvedEntry {
        fetch_url: format!("{link}/{season_path}"),
        preview: to_preview(entry, &catalog_entry),
    })
}

pub async fn preview(
    store: &AllCatalogStores,
    server: &str,
    entry: &str,
) -> Result<EntryPreview, CatalogError> {
    let catalog_entry = load_entry(store, server, entry).await?;

    Ok(to_preview(entry, &catalog_entry))
}

/// Every entry of a server in store order. An unknown server is an empty
/// catalog, not an error.
///
/// The catalog node may be a mapping or an array (numeric keys come back as
/// an array from the realtime database); array slots are keyed by index and
/// `null` slots are holes. Entries that do not parse are skipped.
pub async fn list(
    store: &AllCatalogStores,
    server: &str,
    filter: &CatalogFilter,
) -> Result<Vec<CatalogItem>, CatalogError> {
    if !is_valid_key(server) {
        return Ok(vec![]);
    }

    let path = format!("servers/{server}/catalogo");
    let nodes: Vec<(String, Value)> = match store.get(&path).await? {
        Some(Value::Object(map)) => map.into_iter().collect(),
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .filter(|(_, value)| !value.is_null())
            .map(|(idx, value)| (idx.to_string(), value))
            .collect(),
        Some(_) => {
            return Err(CatalogError::Misconfigured(format!(
                "{path} is neither a mapping nor an array"
            )))
        }
        None => return Ok(vec![]),
    };

    let entries: IndexMap<String, CatalogEntry> = nodes
        .into_iter()
        .filter_map(|(id, value)| match serde_json::from_value(value) {
            Ok(entry) => Some((id, entry)),
            Err(err) => {
                log::warn!("[catalog] skipping {path}/{id}: {err}");
                None
            }
        })
        .collect();

    Ok(entries
        .iter()
        .map(|(id, entry)| to_item(id, entry))
        .filter(|item| filter.matches(item))
        .collect())
}

pub async fn lookup_user(
    store: &AllCatalogStores,
    user: &str,
) -> Result<Option<UserRecord>, CatalogError> {
    if !is_valid_key(user) {
        return Ok(None);
    }

    match store.get(&format!("users/{user}")).await? {
        Some(value) => parse(value, "user record").map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::catalog::JsonCatalogStore;

    fn store() -> AllCatalogStores {
        JsonCatalogStore::new(json!({
            "servers": {
                "anime": {
                    "link": "https://blog.example",
                    "catalogo": {
                        "naruto": {
                            "title": "Naruto",
                            "synopsis": "Ninjas.",
                            "cover": "https://img.example/naruto.jpg",
                            "type": "anime",
                            "featured": true,
                            "episodeCount": 220,
                            "genres": { "a": "Ação", "b": "", "c": null, "d": "Aventura", "e": false },
                            "seasonPath": "2020/01/naruto.html"
                        },
                        "bleach": {
                            "title": "Bleach",
                            "type": "anime",
                            "featured": false,
                            "genres": ["Ação", "Sobrenatural"]
                        },
                        "your-name": {
                            "title": "Kimi no Na wa",
                            "type": "filme",
                            "genres": { "x": "Romance" },
                            "seasonPath": "2019/kimi.html"
                        }
                    }
                },
                "broken": {
                    "catalogo": { "x": { "title": "X", "seasonPath": "x.html" } }
                }
            },
            "users": { "ana": { "accessCode": "1234" } }
        }))
        .into()
    }

    #[tokio::test]
    async fn should_resolve_entry_and_fetch_url() {
        let res = resolve(&store(), "anime", "naruto").await.unwrap();

        assert_eq!(res.fetch_url, "https://blog.example/2020/01/naruto.html");
        assert_eq!(res.preview.title, "Naruto");
        assert_eq!(res.preview.episode_count, 220);
        let mut genres = res.preview.genres.clone();
        genres.sort();
        assert_eq!(genres, vec!["Aventura", "Ação"]);
    }

    #[tokio::test]
    async fn should_report_missing_entry_as_not_found() {
        assert!(matches!(
            resolve(&store(), "anime", "nope").await,
            Err(CatalogError::NotFound("entry"))
        ));
        assert!(matches!(
            resolve(&store(), "manga", "naruto").await,
            Err(CatalogError::NotFound(_))
        ));
        assert!(matches!(
            preview(&store(), "manga", "naruto").await,
            Err(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn should_report_missing_link_or_path_as_misconfigured() {
        assert!(matches!(
            resolve(&store(), "broken", "x").await,
            Err(CatalogError::Misconfigured(_))
        ));
        assert!(matches!(
            resolve(&store(), "anime", "bleach").await,
            Err(CatalogError::Misconfigured(_))
        ));
    }

    #[tokio::test]
    async fn should_preview_without_season_path() {
        let res = preview(&store(), "anime", "bleach").await.unwrap();

        assert_eq!(res.id, "bleach");
        assert_eq!(res.genres, vec!["Ação", "Sobrenatural"]);
        assert_eq!(res.synopsis, "");
        assert_eq!(res.episode_count, 0);
    }

    #[tokio::test]
    async fn should_list_in_store_order() {
        let res = list(&store(), "anime", &CatalogFilter::default()).await.unwrap();

        assert_eq!(
            res.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(),
            vec!["naruto", "bleach", "your-name"]
        );
    }

    #[tokio::test]
    async fn should_list_unknown_server_as_empty() {
        let res = list(&store(), "manga", &CatalogFilter::default()).await.unwrap();
        assert!(res.is_empty());
    }

    #[tokio::test]
    async fn should_filter_listing() {
        let ids = |items: Vec<CatalogItem>| items.into_iter().map(|i| i.id).collect::<Vec<_>>();
        let store = store();

        let featured = CatalogFilter {
            featured: Some(true),
            ..Default::default()
        };
        assert_eq!(ids(list(&store, "anime", &featured).await.unwrap()), vec!["naruto"]);

        let not_featured = CatalogFilter {
            featured: Some(false),
            ..Default::default()
        };
        assert_eq!(list(&store, "anime", &not_featured).await.unwrap().len(), 3);

        let by_title = CatalogFilter {
            title: Some("BLEA".into()),
            ..Default::default()
        };
        assert_eq!(ids(list(&store, "anime", &by_title).await.unwrap()), vec!["bleach"]);

        let by_type = CatalogFilter {
            content_type: Some("filme".into()),
            ..Default::default()
        };
        assert_eq!(ids(list(&store, "anime", &by_type).await.unwrap()), vec!["your-name"]);

        let by_genre = CatalogFilter {
            genre: Some("ação".into()),
            ..Default::default()
        };
        assert_eq!(
            ids(list(&store, "anime", &by_genre).await.unwrap()),
            vec!["naruto", "bleach"]
        );
    }

    #[tokio::test]
    async fn should_lookup_users() {
        let store = store();

        let user = lookup_user(&store, "ana").await.unwrap().unwrap();
        assert_eq!(user.access_code, "1234");
        assert!(lookup_user(&store, "bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_treat_unusable_ids_as_absent() {
        let store = store();

        for entry in ["", "..", "../link", "a.b", "a#b", "a$b", "a[0]", "a\nb"] {
            assert!(
                matches!(
                    preview(&store, "anime", entry).await,
                    Err(CatalogError::NotFound(_))
                ),
                "{entry:?}"
            );
            assert!(matches!(
                resolve(&store, "anime", entry).await,
                Err(CatalogError::NotFound(_))
            ));
        }
        assert!(matches!(
            preview(&store, "anime/catalogo/naruto/..", "naruto").await,
            Err(CatalogError::NotFound(_))
        ));
        assert!(list(&store, "../users", &CatalogFilter::default())
            .await
            .unwrap()
            .is_empty());
        assert!(lookup_user(&store, "ana/..").await.unwrap().is_none());
    }

    #[test_log::test(tokio::test)]
    async fn should_list_array_catalogs_by_index() {
        let store: AllCatalogStores = JsonCatalogStore::new(json!({
            "servers": {
                "anime": {
                    "catalogo": [{ "title": "Zero" }, null, { "title": "Two", "featured": true }]
                }
            }
        }))
        .into();

        let res = list(&store, "anime", &CatalogFilter::default()).await.unwrap();

        assert_eq!(
            res.iter()
                .map(|i| (i.id.as_str(), i.title.as_str()))
                .collect::<Vec<_>>(),
            vec![("0", "Zero"), ("2", "Two")]
        );
    }

    #[test_log::test(tokio::test)]
    async fn should_skip_malformed_entries_in_listing() {
        let store: AllCatalogStores = JsonCatalogStore::new(json!({
            "servers": {
                "anime": {
                    "catalogo": {
                        "good": { "title": "Good" },
                        "bad-count": { "title": "Bad", "episodeCount": "12" },
                        "scalar": "oops",
                        "also-good": { "title": "Also good" }
                    }
                },
                "flat": { "catalogo": "not a catalog" }
            }
        }))
        .into();

        let res = list(&store, "anime", &CatalogFilter::default()).await.unwrap();
        assert_eq!(
            res.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(),
            vec!["good", "also-good"]
        );

        assert!(matches!(
            list(&store, "flat", &CatalogFilter::default()).await,
            Err(CatalogError::Misconfigured(_))
        ));
    }
}
