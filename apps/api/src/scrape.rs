//! Page Extractor — fetches a company page and reduces it to bounded plain text.
//!
//! One GET per call: no retries, no caching, no robots.txt.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{redirect::Policy, Client};
use scraper::{Html, Node};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

/// Browser-like identification; some sites refuse unknown agents.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Appended when the text is cut at the cap.
pub const TRUNCATION_MARKER: &str = "...";

/// Subtrees whose text never reaches the prompt.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "nav", "header", "footer", "aside"];

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to fetch {url}: timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("Failed to fetch {url}: HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to fetch {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to set up page fetcher: {0}")]
    Client(#[source] reqwest::Error),
}

/// Plain text extracted from a page, at most `cap` characters long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText(String);

impl PageText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    #[cfg(test)]
    pub fn from_trusted(text: &str) -> Self {
        PageText(text.to_string())
    }
}

/// Where the orchestrator gets page text from. `PageExtractor` in production.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_and_extract(&self, url: &Url) -> Result<PageText, FetchError>;
}

/// Fetches pages over HTTP and extracts their visible text.
#[derive(Clone)]
pub struct PageExtractor {
    http: Client,
    timeout: Duration,
    max_chars: usize,
}

impl PageExtractor {
    pub fn new(timeout: Duration, max_chars: usize) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(Policy::limited(10))
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            http,
            timeout,
            max_chars,
        })
    }

    fn request_error(&self, url: &Url, source: reqwest::Error) -> FetchError {
        if source.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout: self.timeout,
            }
        } else {
            FetchError::Request {
                url: url.to_string(),
                source,
            }
        }
    }
}

#[async_trait]
impl PageSource for PageExtractor {
    async fn fetch_and_extract(&self, url: &Url) -> Result<PageText, FetchError> {
        info!("Fetching company page {url}");

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| self.request_error(url, e))?;

        let text = extract_text(&html, self.max_chars);
        debug!(
            "Extracted {} chars from {} bytes of markup at {url}",
            text.char_len(),
            html.len()
        );

        Ok(text)
    }
}

/// Reduces markup to visible text: drops `SKIPPED_ELEMENTS` subtrees, joins the
/// remaining text nodes with single spaces, collapses whitespace, and caps the
/// result at `max_chars` characters (marker included).
pub fn extract_text(html: &str, max_chars: usize) -> PageText {
    let document = Html::parse_document(html);

    let mut pieces: Vec<&str> = Vec::new();
    let mut stack = vec![document.tree.root()];

    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Element(element) if SKIPPED_ELEMENTS.contains(&element.name()) => continue,
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    pieces.push(trimmed);
                }
            }
            _ => {}
        }

        // Reverse so children pop in document order.
        let children: Vec<_> = node.children().collect();
        stack.extend(children.into_iter().rev());
    }

    let joined = pieces.join(" ");
    let collapsed = WHITESPACE_RUN.replace_all(&joined, " ");

    PageText(truncate_chars(collapsed.trim(), max_chars))
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let marker_len = TRUNCATION_MARKER.chars().count();
    if max_chars <= marker_len {
        return text.chars().take(max_chars).collect();
    }

    let mut truncated: String = text.chars().take(max_chars - marker_len).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
