// src/ingest/providers/social.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use crate::ingest::normalize_text;
use crate::ingest::types::{EventRecord, EventTime, SourceAdapter};

/// Public syndication mirror serving per-handle RSS feeds.
pub const DEFAULT_MIRROR: &str = "https://nitter.net";
pub const DEFAULT_POSTS_PER_HANDLE: usize = 20;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

fn parse_rfc2822_to_unix(ts: &str) -> i64 {
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .unwrap_or(0)
}

#[derive(Debug, Clone)]
pub struct SocialConfig {
    /// Feed mirror base URL; `{mirror}/{handle}/rss` must serve RSS.
    pub mirror: String,
    /// Handles to watch, without the `@` prefix.
    pub handles: Vec<String>,
    /// Newest posts kept per handle.
    pub limit: usize,
    /// Optional cut-off: posts older than this date are dropped.
    pub since: Option<NaiveDate>,
}

/// Social watchlist adapter: one RSS fetch per handle.
pub struct SocialAdapter {
    cfg: SocialConfig,
    mode: Mode,
}

enum Mode {
    // (handle, captured feed xml) pairs
    Fixture(Vec<(String, String)>),
    Http { client: reqwest::Client },
}

impl SocialAdapter {
    pub fn from_config(cfg: SocialConfig) -> Self {
        Self {
            cfg,
            mode: Mode::Http {
                client: reqwest::Client::new(),
            },
        }
    }

    pub fn from_fixtures(cfg: SocialConfig, feeds: Vec<(String, String)>) -> Self {
        Self {
            cfg,
            mode: Mode::Fixture(feeds),
        }
    }

    fn parse_feed(&self, handle: &str, xml: &str) -> Result<Vec<EventRecord>> {
        let rss: Rss =
            from_str(xml).with_context(|| format!("parsing social feed xml for @{handle}"))?;

        let mut out = Vec::new();
        for it in rss.channel.item {
            if out.len() >= self.cfg.limit {
                break;
            }

            // Feed descriptions carry the post body as HTML; titles are a
            // plain-text fallback.
            let body = it
                .description
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .or(it.title.as_deref())
                .unwrap_or_default();
            let text = normalize_text(body);
            if text.is_empty() {
                continue;
            }

            let when = EventTime::from_unix(
                it.pub_date.as_deref().map(parse_rfc2822_to_unix).unwrap_or(0),
            );
            if let Some(since) = self.cfg.since {
                if when.date() < since {
                    continue;
                }
            }

            out.push(EventRecord {
                source: "Social".to_string(),
                subject: format!("@{handle}"),
                when,
                text,
                url: it.link,
                detail: None,
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl SourceAdapter for SocialAdapter {
    async fn fetch(&self) -> Result<Vec<EventRecord>> {
        match &self.mode {
            Mode::Fixture(feeds) => {
                let mut out = Vec::new();
                for (handle, xml) in feeds {
                    out.extend(self.parse_feed(handle, xml)?);
                }
                Ok(out)
            }
            Mode::Http { client } => {
                let mirror = self.cfg.mirror.trim_end_matches('/');
                let mut out = Vec::new();
                for handle in &self.cfg.handles {
                    let url = format!("{mirror}/{handle}/rss");
                    let body = client
                        .get(&url)
                        .timeout(REQUEST_TIMEOUT)
                        .send()
                        .await
                        .with_context(|| format!("social feed http get() for @{handle}"))?
                        .error_for_status()
                        .with_context(|| format!("social feed http status for @{handle}"))?
                        .text()
                        .await
                        .context("social feed http .text()")?;
                    out.extend(self.parse_feed(handle, &body)?);
                }
                Ok(out)
            }
        }
    }

    fn name(&self) -> &'static str {
        "Social"
    }
}
