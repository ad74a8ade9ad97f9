use std::sync::OnceLock;

use scraper::{ElementRef, Selector};

use crate::{
    models::EpisodeRecord,
    utils::{
        self,
        html::{self, AttrValue, DOMProcessor, ExtractValue, ForwardScan, TextValue},
        text,
        token::TokenCodec,
    },
};

const POST_BODY: &str = ".post-body";
const BOLD_TAGS: &[&str] = &["b", "strong"];
const ITALIC_TAGS: &[&str] = &["i", "em"];

/// What a single embedded player contributes before ids and tokens are
/// assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbedMarkup {
    pub src: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

pub fn embeds_processor() -> &'static html::ItemsProcessor<EmbedMarkup> {
    static EMBEDS_PROCESSOR: OnceLock<html::ItemsProcessor<EmbedMarkup>> = OnceLock::new();
    EMBEDS_PROCESSOR.get_or_init(|| {
        ExtractValue::new(embed_markup).itr_scope(&format!("{POST_BODY} iframe"))
    })
}

fn post_body_selector() -> &'static Selector {
    static POST_BODY_SELECTOR: OnceLock<Selector> = OnceLock::new();
    POST_BODY_SELECTOR.get_or_init(|| Selector::parse(POST_BODY).unwrap())
}

fn embed_markup(iframe: &ElementRef) -> EmbedMarkup {
    let bound = html::closest(iframe, post_body_selector());

    // bold and italic are looked up independently, each takes the first hit
    let title = ForwardScan::after(*iframe, bound)
        .find_tag(BOLD_TAGS)
        .map(|b| TextValue::new().all_nodes().process(&b).trim().to_owned())
        .filter(|t| !t.is_empty());

    let description = ForwardScan::after(*iframe, bound)
        .find_tag(ITALIC_TAGS)
        .map(|i| text::sanitize_text(&TextValue::new().all_nodes().process(&i)));

    EmbedMarkup {
        src: AttrValue::new("src").process(iframe),
        title,
        description,
    }
}

pub fn into_episodes(embeds: Vec<EmbedMarkup>, codec: &TokenCodec) -> Vec<EpisodeRecord> {
    embeds
        .into_iter()
        .zip(1u32..)
        .map(|(embed, id)| EpisodeRecord {
            id,
            title: embed.title.unwrap_or_else(|| format!("Episódio {id}")),
            description: embed.description.unwrap_or_default(),
            video: codec.encode(&embed.src),
        })
        .collect()
}

/// Turns a blog post into its episode list. Malformed markup never fails,
/// it just yields fewer (possibly zero) episodes.
pub fn extract(html: &str, codec: &TokenCodec) -> Vec<EpisodeRecord> {
    let document = scraper::Html::parse_document(html);
    let embeds = embeds_processor().process(&document.root_element());

    into_episodes(embeds, codec)
}

pub async fn load_episodes(url: &str, codec: &TokenCodec) -> anyhow::Result<Vec<EpisodeRecord>> {
    let embeds = utils::scrap_page(url, embeds_processor()).await?;

    Ok(into_episodes(embeds, codec))
}
