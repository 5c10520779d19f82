//! Wikipedia lookup through the MediaWiki action API.
//!
//! Two requests per lookup: a full-text search for the top page titles, then
//! one extracts query for their plain-text intros. Results are rendered as
//!
//! ```text
//! Page: Genghis Khan
//! Summary: Genghis Khan (born Temüjin; c. 1162 – August 1227) ...
//! ```
//!
//! blocks separated by blank lines and capped at `max_chars`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use coordination::trial::MAX_QUERY_CHARS;
use coordination::{CollaboratorError, KnowledgeSource};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::WikipediaConfig;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum WikipediaError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("wikipedia returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

impl From<WikipediaError> for CollaboratorError {
    fn from(err: WikipediaError) -> Self {
        match err {
            WikipediaError::Http(e) if e.is_decode() => {
                CollaboratorError::InvalidResponse(e.to_string())
            }
            WikipediaError::Http(e) if e.is_timeout() => CollaboratorError::Timeout {
                operation: "wikipedia",
                timeout: HTTP_TIMEOUT,
            },
            WikipediaError::Http(e) => CollaboratorError::Unavailable(e.to_string()),
            WikipediaError::Status { status, body } if status.is_server_error() => {
                CollaboratorError::Unavailable(format!("{status}: {body}"))
            }
            other => CollaboratorError::InvalidResponse(other.to_string()),
        }
    }
}

// ── Response shapes ────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub query: Option<SearchQuery>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
pub struct SearchHit {
    pub title: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExtractsResponse {
    #[serde(default)]
    pub query: Option<ExtractsQuery>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExtractsQuery {
    #[serde(default)]
    pub pages: HashMap<String, PageExtract>,
}

#[derive(Debug, Deserialize)]
pub struct PageExtract {
    pub title: String,
    #[serde(default)]
    pub extract: Option<String>,
}

impl SearchResponse {
    pub fn titles(&self) -> Vec<String> {
        self.query
            .as_ref()
            .map(|q| q.search.iter().map(|h| h.title.clone()).collect())
            .unwrap_or_default()
    }
}

/// Render pages in search order; pages without an extract are skipped.
pub fn format_pages(titles: &[String], extracts: &ExtractsResponse, max_chars: usize) -> Option<String> {
    let by_title: HashMap<&str, &str> = extracts
        .query
        .as_ref()
        .map(|q| {
            q.pages
                .values()
                .filter_map(|p| {
                    p.extract
                        .as_deref()
                        .map(str::trim)
                        .filter(|e| !e.is_empty())
                        .map(|e| (p.title.as_str(), e))
                })
                .collect()
        })
        .unwrap_or_default();

    let blocks: Vec<String> = titles
        .iter()
        .filter_map(|title| {
            by_title
                .get(title.as_str())
                .map(|summary| format!("Page: {title}\nSummary: {summary}"))
        })
        .collect();

    if blocks.is_empty() {
        return None;
    }
    let text = blocks.join("\n\n");
    Some(text.chars().take(max_chars).collect())
}

/// `KnowledgeSource` backed by Wikipedia.
pub struct WikipediaSource {
    client: reqwest::Client,
    config: WikipediaConfig,
}

impl WikipediaSource {
    pub fn new(config: WikipediaConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<T, WikipediaError> {
        let response = self
            .client
            .get(&self.config.api_url)
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WikipediaError::Status { status, body });
        }
        Ok(response.json().await?)
    }

    async fn lookup(&self, query: &str) -> Result<Option<String>, WikipediaError> {
        let query: String = query.chars().take(MAX_QUERY_CHARS).collect();
        let limit = self.config.top_k_results.to_string();

        let search: SearchResponse = self
            .get_json(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query.as_str()),
                ("srlimit", limit.as_str()),
                ("format", "json"),
            ])
            .await?;
        let titles = search.titles();
        debug!(query = %query, hits = titles.len(), "wikipedia search");
        if titles.is_empty() {
            return Ok(None);
        }

        let joined = titles.join("|");
        let extracts: ExtractsResponse = self
            .get_json(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", joined.as_str()),
                ("format", "json"),
            ])
            .await?;

        Ok(format_pages(&titles, &extracts, self.config.max_chars))
    }
}

#[async_trait]
impl KnowledgeSource for WikipediaSource {
    async fn search(&self, query: &str) -> Result<Option<String>, CollaboratorError> {
        Ok(self.lookup(query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_JSON: &str = r#"{
        "batchcomplete": "",
        "query": {
            "searchinfo": {"totalhits": 2},
            "search": [
                {"ns": 0, "title": "Genghis Khan", "pageid": 12345},
                {"ns": 0, "title": "Mongol Empire", "pageid": 678}
            ]
        }
    }"#;

    const EXTRACTS_JSON: &str = r#"{
        "query": {
            "pages": {
                "678": {"pageid": 678, "title": "Mongol Empire", "extract": "The largest contiguous empire."},
                "12345": {"pageid": 12345, "title": "Genghis Khan", "extract": "Founder of the Mongol Empire."}
            }
        }
    }"#;

    #[test]
    fn parses_search_titles_in_order() {
        let search: SearchResponse = serde_json::from_str(SEARCH_JSON).unwrap();
        assert_eq!(search.titles(), vec!["Genghis Khan", "Mongol Empire"]);
    }

    #[test]
    fn empty_search_has_no_titles() {
        let search: SearchResponse =
            serde_json::from_str(r#"{"query": {"search": []}}"#).unwrap();
        assert!(search.titles().is_empty());
        let search: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(search.titles().is_empty());
    }

    #[test]
    fn formats_pages_in_search_order() {
        let search: SearchResponse = serde_json::from_str(SEARCH_JSON).unwrap();
        let extracts: ExtractsResponse = serde_json::from_str(EXTRACTS_JSON).unwrap();
        let text = format_pages(&search.titles(), &extracts, 4_000).unwrap();
        assert_eq!(
            text,
            "Page: Genghis Khan\nSummary: Founder of the Mongol Empire.\n\n\
             Page: Mongol Empire\nSummary: The largest contiguous empire."
        );
    }

    #[test]
    fn caps_output_length() {
        let search: SearchResponse = serde_json::from_str(SEARCH_JSON).unwrap();
        let extracts: ExtractsResponse = serde_json::from_str(EXTRACTS_JSON).unwrap();
        let text = format_pages(&search.titles(), &extracts, 20).unwrap();
        assert_eq!(text.chars().count(), 20);
        assert!(text.starts_with("Page: Genghis Khan"));
    }

    #[test]
    fn pages_without_extracts_yield_none() {
        let extracts: ExtractsResponse = serde_json::from_str(
            r#"{"query": {"pages": {"-1": {"title": "Nothing", "missing": ""}}}}"#,
        )
        .unwrap();
        assert!(format_pages(&["Nothing".to_string()], &extracts, 4_000).is_none());
    }
}
