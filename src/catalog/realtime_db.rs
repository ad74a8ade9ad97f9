use anyhow::anyhow;
use serde_json::Value;
use url::Url;

use super::{path_segments, CatalogStore};
use crate::utils;

/// Firebase Realtime Database over its REST interface:
/// `GET {db_url}/{path}.json[?auth=secret]`, where a `null` body means the
/// node does not exist.
pub struct RealtimeDbStore {
    base: Url,
    auth: Option<String>,
}

impl RealtimeDbStore {
    pub fn new(db_url: &str, auth: Option<String>) -> anyhow::Result<Self> {
        let base = Url::parse(db_url)?;
        if base.cannot_be_a_base() {
            return Err(anyhow!("database url {db_url} cannot be used as a base"));
        }

        Ok(Self { base, auth })
    }

    /// `{base}/{segments}.json`, every segment percent-encoded on its own.
    fn node_url(&self, path: &str) -> anyhow::Result<Url> {
        let mut segments: Vec<String> = path_segments(path).map(String::from).collect();
        match segments.last_mut() {
            Some(last) => last.push_str(".json"),
            None => segments.push(".json".into()),
        }

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("database url {} cannot be used as a base", self.base))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }
}

impl CatalogStore for RealtimeDbStore {
    async fn get(&self, path: &str) -> anyhow::Result<Option<Value>> {
        let mut request = utils::create_json_client().get(self.node_url(path)?);
        if let Some(auth) = &self.auth {
            request = request.query(&[("auth", auth)]);
        }

        let value: Value = request.send().await?.error_for_status()?.json().await?;

        Ok(Some(value).filter(|v| !v.is_null()))
    }
}
