//! `/trends` — scrapes a benchmark page for its opening paragraphs.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::{Captures, Regex};

use crate::error::TrendsError;

/// Page the trend text is scraped from.
pub const TRENDS_URL: &str = "https://databox.com/ppc-industry-benchmarks";
/// Number of paragraphs included in a reply.
pub const TREND_PARAGRAPHS: usize = 5;
/// Heading of the `/trends` reply.
pub const TRENDS_HEADER: &str = "Here are the latest industry trends:";

static NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<!--.*?-->|<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
        .unwrap()
});
static PARAGRAPH_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<p(?:\s[^>]*)?>").unwrap());
// A paragraph ends at its close tag, the next paragraph, or its container's end
static PARAGRAPH_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)</p\s*>|<p(?:\s[^>]*)?>|</(?:div|section|article|main|header|footer|li|td|th|body|html)\s*>",
    )
    .unwrap()
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap());

/// Source of trend text for `/trends`.
#[async_trait]
pub trait TrendSource: Send + Sync {
    /// Fetch trend text: paragraphs joined by newlines.
    async fn fetch_trends(&self) -> Result<String, TrendsError>;
}

/// Fetches `TRENDS_URL` over HTTP and extracts the first paragraphs.
pub struct HttpTrendSource {
    url: String,
    client: reqwest::Client,
}

impl HttpTrendSource {
    pub fn new() -> Self {
        Self::with_url(TRENDS_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for HttpTrendSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TrendSource for HttpTrendSource {
    async fn fetch_trends(&self) -> Result<String, TrendsError> {
        let resp = self.client.get(&self.url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TrendsError::Status { status });
        }

        let html = resp.text().await?;
        let paragraphs = extract_paragraphs(&html, TREND_PARAGRAPHS);
        tracing::info!(url = %self.url, count = paragraphs.len(), "Fetched trend paragraphs");

        if paragraphs.is_empty() {
            return Err(TrendsError::Empty {
                url: self.url.clone(),
            });
        }
        Ok(paragraphs.join("\n"))
    }
}

/// Text of the first `limit` non-empty `<p>` elements, tags stripped and
/// whitespace collapsed.
///
/// Comments, scripts and styles are ignored. A `<p>` without a close tag
/// ends where the next one opens.
pub fn extract_paragraphs(html: &str, limit: usize) -> Vec<String> {
    let html = NOISE.replace_all(html, " ");
    PARAGRAPH_OPEN
        .find_iter(&html)
        .map(|open| {
            let rest = &html[open.end()..];
            let end = PARAGRAPH_END.find(rest).map_or(rest.len(), |m| m.start());
            paragraph_text(&rest[..end])
        })
        .filter(|text| !text.is_empty())
        .take(limit)
        .collect()
}

/// Full `/trends` reply for fetched trend text.
pub fn format_trends(text: &str) -> String {
    format!("{TRENDS_HEADER}\n{text}")
}

fn paragraph_text(inner: &str) -> String {
    let stripped = TAG.replace_all(inner, " ");
    let decoded = decode_entities(&stripped);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| entity.strip_prefix('#').map(str::parse::<u32>))
                    .and_then(Result::ok)
                    .and_then(char::from_u32),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
