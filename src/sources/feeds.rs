//! Event feed adapter (FOMC meeting calendar, speech RSS)
//!
//! Both feeds are XML documents of dated `<item>` elements. The calendar
//! carries its timestamp in a `<start>` element ("2024-06-11T18:00:00Z");
//! the speech feed is plain RSS with an RFC 2822 `<pubDate>`. Items are
//! scanned in document order and the first one strictly in the future is
//! the result; a feed with no future-dated item is a legitimate empty
//! result, while a truncated document or an item missing a required
//! element is a parse failure.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::Client;

use super::REQUEST_TIMEOUT;
use crate::error::{FetchError, FetchResult};
use crate::types::NextEvent;

/// Which feed dialect is being parsed. Decides the timestamp element name
/// and its format.
#[derive(Debug, Clone, Copy)]
enum FeedKind {
    /// `<start>` with "%Y-%m-%dT%H:%M:%SZ"
    Calendar,
    /// `<pubDate>` with RFC 2822
    Rss,
}

impl FeedKind {
    fn timestamp_tag(self) -> &'static [u8] {
        match self {
            FeedKind::Calendar => b"start",
            FeedKind::Rss => b"pubDate",
        }
    }

    fn parse_timestamp(self, raw: &str) -> FetchResult<DateTime<Utc>> {
        match self {
            FeedKind::Calendar => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%SZ")
                .map(|naive| Utc.from_utc_datetime(&naive))
                .map_err(|e| FetchError::Parse(format!("bad calendar timestamp {:?}: {}", raw, e))),
            FeedKind::Rss => DateTime::parse_from_rfc2822(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| FetchError::Parse(format!("bad RSS timestamp {:?}: {}", raw, e))),
        }
    }
}

/// One dated feed item.
#[derive(Debug, Clone)]
struct FeedItem {
    title: String,
    url: String,
    starts_at: DateTime<Utc>,
}

pub struct FeedClient {
    client: Client,
    fomc_url: String,
    speech_url: String,
}

impl FeedClient {
    pub fn new(fomc_url: &str, speech_url: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            fomc_url: fomc_url.to_string(),
            speech_url: speech_url.to_string(),
        }
    }

    /// Next upcoming FOMC meeting, `None` when the calendar has none.
    pub async fn fomc_next(&self) -> FetchResult<Option<NextEvent>> {
        let xml = self.fetch(&self.fomc_url).await?;
        let items = parse_feed(&xml, FeedKind::Calendar)?;
        Ok(next_event(&items, Utc::now()))
    }

    /// Next upcoming speech, `None` when the feed has none.
    pub async fn powell_speech(&self) -> FetchResult<Option<NextEvent>> {
        let xml = self.fetch(&self.speech_url).await?;
        let items = parse_feed(&xml, FeedKind::Rss)?;
        Ok(next_event(&items, Utc::now()))
    }

    async fn fetch(&self, url: &str) -> FetchResult<String> {
        tracing::debug!(url = %url, "Fetching event feed");

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Upstream(format!(
                "feed returned {} for {}",
                response.status(),
                url
            )));
        }

        Ok(response.text().await?)
    }
}

/// Element currently capturing text inside an item.
enum Field {
    Title,
    Url,
    Timestamp,
}

/// Pull every `<item>` out of the document, in order.
///
/// Each item must carry a title, a link, and its timestamp element; a
/// document that ends while an item is still open is malformed even when
/// the XML reader itself tolerates it.
fn parse_feed(xml: &str, kind: FeedKind) -> FetchResult<Vec<FeedItem>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut items = Vec::new();
    let mut in_item = false;
    let mut title: Option<String> = None;
    let mut url: Option<String> = None;
    let mut timestamp: Option<String> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let name = start.name();
                let name = name.as_ref();
                if name == b"item" {
                    in_item = true;
                    title = None;
                    url = None;
                    timestamp = None;
                } else if in_item {
                    field = if name == b"title" {
                        Some(Field::Title)
                    } else if name == b"link" {
                        Some(Field::Url)
                    } else if name == kind.timestamp_tag() {
                        Some(Field::Timestamp)
                    } else {
                        None
                    };
                }
            }
            Ok(Event::Text(text)) => {
                let value = text
                    .unescape()
                    .map_err(|e| FetchError::Parse(format!("invalid feed text: {}", e)))?;
                store_field(&field, &value, &mut title, &mut url, &mut timestamp);
            }
            Ok(Event::CData(cdata)) => {
                let bytes = cdata.into_inner();
                let value = String::from_utf8_lossy(&bytes);
                store_field(&field, &value, &mut title, &mut url, &mut timestamp);
            }
            Ok(Event::End(end)) => {
                let name = end.name();
                if name.as_ref() == b"item" {
                    let item = build_item(
                        kind,
                        title.take(),
                        url.take(),
                        timestamp.take(),
                    )?;
                    items.push(item);
                    in_item = false;
                }
                field = None;
            }
            Ok(Event::Eof) => {
                if in_item {
                    return Err(FetchError::Parse(
                        "feed document ended inside an item".to_string(),
                    ));
                }
                break;
            }
            Err(e) => return Err(FetchError::Parse(format!("invalid feed XML: {}", e))),
            _ => {}
        }
    }

    Ok(items)
}

fn store_field(
    field: &Option<Field>,
    value: &str,
    title: &mut Option<String>,
    url: &mut Option<String>,
    timestamp: &mut Option<String>,
) {
    match field {
        Some(Field::Title) => *title = Some(value.to_string()),
        Some(Field::Url) => *url = Some(value.to_string()),
        Some(Field::Timestamp) => *timestamp = Some(value.to_string()),
        None => {}
    }
}

fn build_item(
    kind: FeedKind,
    title: Option<String>,
    url: Option<String>,
    timestamp: Option<String>,
) -> FetchResult<FeedItem> {
    let title = title.ok_or_else(|| FetchError::Parse("feed item has no title".to_string()))?;
    let url = url.ok_or_else(|| FetchError::Parse("feed item has no link".to_string()))?;
    let timestamp =
        timestamp.ok_or_else(|| FetchError::Parse("feed item has no timestamp".to_string()))?;

    Ok(FeedItem {
        title,
        url,
        starts_at: kind.parse_timestamp(&timestamp)?,
    })
}

/// First item strictly after `now`, in document order.
fn next_event(items: &[FeedItem], now: DateTime<Utc>) -> Option<NextEvent> {
    items
        .iter()
        .find(|item| item.starts_at > now)
        .map(|item| NextEvent {
            date: item.starts_at.format("%Y-%m-%d").to_string(),
            time: item.starts_at.format("%H:%M").to_string(),
            title: item.title.clone(),
            url: item.url.clone(),
        })
}
