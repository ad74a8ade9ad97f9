pub mod html;
pub mod text;
pub mod token;

use std::{sync::OnceLock, time::Duration};

use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    ClientBuilder,
};

pub fn get_user_agent<'a>() -> &'a str {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36"
}

pub fn create_client() -> &'static reqwest::Client {
    static LAZZY_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    LAZZY_CLIENT.get_or_init(|| {
        let mut headers = get_default_headers();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );

        build_client(headers)
    })
}

pub fn create_json_client() -> &'static reqwest::Client {
    static LAZZY_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    LAZZY_CLIENT.get_or_init(|| {
        let mut headers = HeaderMap::default();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        build_client(headers)
    })
}

pub fn create_client_builder() -> ClientBuilder {
    // no overall timeout, a slow upstream only holds its own request
    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(10))
        .user_agent(get_user_agent())
}

fn build_client(headers: HeaderMap) -> reqwest::Client {
    create_client_builder()
        .default_headers(headers)
        .build()
        .unwrap_or_else(|err| {
            log::warn!("[http] falling back to default client: {err}");
            reqwest::Client::new()
        })
}

pub fn get_default_headers() -> HeaderMap {
    let mut headers = HeaderMap::default();

    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("pt-BR,pt;q=0.9,en-US;q=0.5"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers
}

/// Downloads a page, treating any non-2xx status as a failure.
pub async fn fetch_page(url: &str) -> anyhow::Result<String> {
    let html = create_client()
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    Ok(html)
}

pub async fn scrap_page<T>(
    url: &str,
    processor: &dyn html::DOMProcessor<T>,
) -> Result<T, anyhow::Error> {
    let html = fetch_page(url).await?;

    let document = scraper::Html::parse_document(&html);
    let root = document.root_element();

    Ok(processor.process(&root))
}
