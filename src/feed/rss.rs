// src/feed/rss.rs
//! HTTP feed client for RSS 2.0 and RSS 1.0 (RDF) documents.

use std::convert::Infallible;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::histogram;
use quick_xml::de::{Deserializer, EntityResolver};
use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::BytesText;
use serde::Deserialize;

use super::{Enclosure, FeedClient, FetchError, MediaDescriptor, RawItem};

const USER_AGENT: &str = concat!("cameroon-news/", env!("CARGO_PKG_VERSION"));

// RSS 2.0: <rss><channel><item/>..</channel></rss>
// RSS 1.0: <rdf:RDF><channel/><item/>..</rdf:RDF>
// Elements bind by local name, so `dc:date` is "date", `media:content` is "content".
#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    channel: Option<Channel>,
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Default, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    // Lists: `media:title`, `atom:link` and `media:description` share these local names.
    #[serde(rename = "title", default)]
    titles: Vec<String>,
    #[serde(rename = "link", default)]
    links: Vec<String>,
    #[serde(rename = "description", default)]
    descriptions: Vec<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    #[serde(rename = "date")]
    dc_date: Option<String>,
    #[serde(rename = "encoded")]
    content_encoded: Option<String>,
    #[serde(rename = "content", default)]
    media_content: Vec<MediaNode>,
    #[serde(rename = "thumbnail", default)]
    media_thumbnail: Vec<MediaNode>,
    #[serde(rename = "group", default)]
    media_group: Vec<MediaGroup>,
    #[serde(rename = "enclosure", default)]
    enclosures: Vec<EnclosureNode>,
}

#[derive(Debug, Deserialize)]
struct MediaGroup {
    #[serde(rename = "content", default)]
    media_content: Vec<MediaNode>,
}

#[derive(Debug, Deserialize)]
struct MediaNode {
    #[serde(rename = "@url")]
    url: Option<String>,
    #[serde(rename = "@medium")]
    medium: Option<String>,
    #[serde(rename = "@type")]
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EnclosureNode {
    #[serde(rename = "@url")]
    url: Option<String>,
    #[serde(rename = "@type")]
    mime_type: Option<String>,
}

impl From<MediaNode> for MediaDescriptor {
    fn from(n: MediaNode) -> Self {
        Self {
            url: n.url,
            medium: n.medium,
            mime_type: n.mime_type,
        }
    }
}

fn first_non_blank(values: Vec<String>) -> Option<String> {
    values.into_iter().find(|v| !v.trim().is_empty())
}

impl From<Item> for RawItem {
    fn from(it: Item) -> Self {
        // media:content (direct, then grouped) before thumbnails
        let media = it
            .media_content
            .into_iter()
            .chain(it.media_group.into_iter().flat_map(|g| g.media_content))
            .chain(it.media_thumbnail)
            .map(MediaDescriptor::from)
            .collect();

        let content = first_non_blank(it.descriptions).or(it.content_encoded);

        RawItem {
            title: it.titles.into_iter().next(),
            link: first_non_blank(it.links).map(|l| l.trim().to_string()),
            published: it.pub_date.or(it.dc_date),
            content,
            media,
            enclosures: it
                .enclosures
                .into_iter()
                .map(|e| Enclosure {
                    url: e.url,
                    mime_type: e.mime_type,
                })
                .collect(),
        }
    }
}

/// Resolves HTML named entities (`&nbsp;`, `&laquo;`, `&ocirc;`, ...) that
/// feeds routinely embed even though XML only predefines five.
#[derive(Debug, Default, Clone, Copy)]
struct HtmlEntities;

impl EntityResolver for HtmlEntities {
    type Error = Infallible;

    fn capture(&mut self, _doctype: BytesText) -> Result<(), Self::Error> {
        Ok(())
    }

    fn resolve(&self, entity: &str) -> Option<&str> {
        resolve_html5_entity(entity)
    }
}

/// Parse an RSS 2.0 or RDF document into raw items, in document order.
pub fn parse_feed(xml: &str) -> Result<Vec<RawItem>, FetchError> {
    let mut de = Deserializer::from_str_with_resolver(xml, HtmlEntities);
    let doc = Document::deserialize(&mut de).map_err(|e| FetchError::Parse(e.to_string()))?;

    let mut items = doc.channel.unwrap_or_default().item;
    items.extend(doc.item);
    Ok(items.into_iter().map(RawItem::from).collect())
}

/// Production feed client: one shared `reqwest::Client`, per-call timeout.
#[derive(Debug, Clone)]
pub struct HttpFeedClient {
    client: reqwest::Client,
}

impl HttpFeedClient {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    async fn get_and_parse(&self, source: &str) -> Result<Vec<RawItem>, FetchError> {
        let resp = self.client.get(source).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = resp.text().await?;
        parse_feed(&body)
    }
}

#[async_trait]
impl FeedClient for HttpFeedClient {
    async fn fetch(&self, source: &str, timeout: Duration) -> Result<Vec<RawItem>, FetchError> {
        let t0 = Instant::now();
        let items = tokio::time::timeout(timeout, self.get_and_parse(source))
            .await
            .map_err(|_| FetchError::Timeout(timeout))??;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("news_fetch_ms").record(ms);
        tracing::debug!(target: "feed", source, items = items.len(), ms, "feed fetched");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AFRICANEWS: &str = include_str!("../../tests/fixtures/africanews_rss.xml");
    const ALLAFRICA: &str = include_str!("../../tests/fixtures/allafrica_rdf.xml");

    #[test]
    fn parses_rss2_items_with_media_and_enclosure() {
        let items = parse_feed(AFRICANEWS).unwrap();
        assert_eq!(items.len(), 4);

        let first = &items[0];
        assert_eq!(
            first.link.as_deref(),
            Some("https://www.africanews.com/2025/01/10/cameroon-lions-win/")
        );
        assert!(first.published.as_deref().unwrap().contains("10 Jan 2025"));
        assert_eq!(first.media.len(), 1);
        assert_eq!(first.media[0].medium.as_deref(), Some("image"));

        let with_enclosure = &items[1];
        let enc = &with_enclosure.enclosures[0];
        assert_eq!(enc.mime_type.as_deref(), Some("video/mp4"));
    }

    #[test]
    fn parses_rdf_items_outside_channel() {
        let items = parse_feed(ALLAFRICA).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(
            items[0].published.as_deref(),
            Some("2025-01-09T08:30:00Z"),
            "dc:date is used when pubDate is missing"
        );
        // &nbsp; is an HTML entity, resolved rather than rejected
        assert!(items[0]
            .content
            .as_deref()
            .unwrap()
            .starts_with("Yaoundé\u{a0}- The finance ministry"));
    }

    #[test]
    fn channel_without_items_is_empty_not_error() {
        let xml = r#"<rss version="2.0"><channel><title>x</title></channel></rss>"#;
        assert!(parse_feed(xml).unwrap().is_empty());
    }

    #[test]
    fn malformed_xml_is_a_parse_error() {
        let err = parse_feed("<rss><channel><item><title>oops</channel>").unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn html_named_entities_resolve_without_failing_the_feed() {
        let xml = r#"<rss version="2.0"><channel>
            <item><title>Ch&ocirc;mage</title><link>https://a.test/1</link>
              <description>Le ch&ocirc;mage &laquo;Cameroun&raquo; &amp; la f&ecirc;te</description></item>
            <item><title>Second</title><link>https://a.test/2</link></item>
        </channel></rss>"#;
        let items = parse_feed(xml).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title.as_deref(), Some("Chômage"));
        assert_eq!(
            items[0].content.as_deref(),
            Some("Le chômage «Cameroun» & la fête")
        );
    }

    #[test]
    fn repeated_enclosures_are_all_kept() {
        let xml = r#"<rss version="2.0"><channel><item>
            <title>Two enclosures</title><link>https://a.test/1</link>
            <enclosure url="https://a.test/still.jpg" type="image/jpeg"/>
            <enclosure url="https://a.test/clip.mp4" type="video/mp4"/>
        </item></channel></rss>"#;
        let items = parse_feed(xml).unwrap();
        assert_eq!(items.len(), 1);
        let urls: Vec<_> = items[0]
            .enclosures
            .iter()
            .map(|e| e.url.as_deref().unwrap())
            .collect();
        assert_eq!(urls, ["https://a.test/still.jpg", "https://a.test/clip.mp4"]);
    }

    #[test]
    fn namespaced_siblings_do_not_clash_with_core_fields() {
        let xml = r#"<rss version="2.0"
              xmlns:media="http://search.yahoo.com/mrss/"
              xmlns:atom="http://www.w3.org/2005/Atom"
              xmlns:content="http://purl.org/rss/1.0/modules/content/"><channel><item>
            <title>Cameroon story</title>
            <media:title>Photo caption</media:title>
            <link>https://a.test/story</link>
            <atom:link href="https://a.test/story" rel="alternate"/>
            <content:encoded><![CDATA[<p>Full body</p>]]></content:encoded>
            <media:group>
              <media:content url="https://a.test/clip.mp4" type="video/mp4"/>
            </media:group>
            <media:thumbnail url="https://a.test/thumb.jpg"/>
        </item></channel></rss>"#;
        let items = parse_feed(xml).unwrap();
        let it = &items[0];
        assert_eq!(it.title.as_deref(), Some("Cameroon story"));
        assert_eq!(it.link.as_deref(), Some("https://a.test/story"));
        assert_eq!(it.content.as_deref(), Some("<p>Full body</p>"), "content:encoded fallback");
        let urls: Vec<_> = it.media.iter().map(|m| m.url.as_deref().unwrap()).collect();
        assert_eq!(urls, ["https://a.test/clip.mp4", "https://a.test/thumb.jpg"]);
    }
}
