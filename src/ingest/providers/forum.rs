// src/ingest/providers/forum.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::ingest::normalize_text;
use crate::ingest::types::{EventRecord, EventTime, SourceAdapter};

pub const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
pub const API_BASE: &str = "https://oauth.reddit.com";
pub const DEFAULT_USER_AGENT: &str = "market-digest";

pub const DEFAULT_SUBFORUM_LIMIT: usize = 10;
pub const DEFAULT_USER_LIMIT: usize = 5;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Script-type API credentials; resolved from flags or environment by the
/// caller, never read from ambient state here.
#[derive(Debug, Clone)]
pub struct ForumCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct ForumConfig {
    pub credentials: ForumCredentials,
    /// Subforum names, without the `r/` prefix.
    pub subforums: Vec<String>,
    /// Usernames whose submissions to fetch, without the `u/` prefix.
    pub users: Vec<String>,
    pub subforum_limit: usize,
    pub user_limit: usize,
}

/// Forum adapter: client-credentials token exchange, then one listing fetch
/// per watched subforum and per watched user.
pub struct ForumAdapter {
    cfg: ForumConfig,
    mode: Mode,
}

enum Mode {
    // (subject label, captured listing json) pairs, e.g. ("r/stocks", ...)
    Fixture(Vec<(String, String)>),
    Http { client: reqwest::Client },
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Submission,
}

#[derive(Debug, Deserialize)]
struct Submission {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    created_utc: f64,
    author: Option<String>,
    #[serde(default)]
    score: i64,
}

impl ForumAdapter {
    pub fn from_config(cfg: ForumConfig) -> Self {
        Self {
            cfg,
            mode: Mode::Http {
                client: reqwest::Client::new(),
            },
        }
    }

    pub fn from_fixtures(cfg: ForumConfig, listings: Vec<(String, String)>) -> Self {
        Self {
            cfg,
            mode: Mode::Fixture(listings),
        }
    }

    fn parse_listing(subject: &str, json: &str) -> Result<Vec<EventRecord>> {
        let listing: Listing = serde_json::from_str(json)
            .with_context(|| format!("parsing forum listing for {subject}"))?;

        let mut out = Vec::with_capacity(listing.data.children.len());
        for child in listing.data.children {
            let post = child.data;
            let text = normalize_text(&post.title);
            if text.is_empty() {
                continue;
            }

            let detail = match post.author.as_deref().filter(|a| !a.is_empty()) {
                Some(author) => format!("by u/{author}, score {}", post.score),
                None => format!("score {}", post.score),
            };

            out.push(EventRecord {
                source: "Forum".to_string(),
                subject: subject.to_string(),
                when: EventTime::from_unix(post.created_utc as i64),
                text,
                url: (!post.url.is_empty()).then(|| post.url.clone()),
                detail: Some(detail),
            });
        }
        Ok(out)
    }

    async fn obtain_token(&self, client: &reqwest::Client) -> Result<String> {
        let creds = &self.cfg.credentials;
        let token: TokenResponse = client
            .post(TOKEN_URL)
            .basic_auth(&creds.client_id, Some(&creds.client_secret))
            .header(reqwest::header::USER_AGENT, &creds.user_agent)
            .form(&[("grant_type", "client_credentials")])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("forum token http post()")?
            .error_for_status()
            .context("forum token http status")?
            .json()
            .await
            .context("forum token response body")?;
        Ok(token.access_token)
    }

    async fn fetch_listing(
        &self,
        client: &reqwest::Client,
        token: &str,
        path: &str,
        limit: usize,
    ) -> Result<String> {
        client
            .get(format!("{API_BASE}{path}"))
            .query(&[("limit", limit.to_string())])
            .bearer_auth(token)
            .header(reqwest::header::USER_AGENT, &self.cfg.credentials.user_agent)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .with_context(|| format!("forum listing http get() for {path}"))?
            .error_for_status()
            .with_context(|| format!("forum listing http status for {path}"))?
            .text()
            .await
            .context("forum listing http .text()")
    }
}

#[async_trait]
impl SourceAdapter for ForumAdapter {
    async fn fetch(&self) -> Result<Vec<EventRecord>> {
        match &self.mode {
            Mode::Fixture(listings) => {
                let mut out = Vec::new();
                for (subject, json) in listings {
                    out.extend(Self::parse_listing(subject, json)?);
                }
                Ok(out)
            }
            Mode::Http { client } => {
                let token = self.obtain_token(client).await?;
                let mut out = Vec::new();
                for subforum in &self.cfg.subforums {
                    let body = self
                        .fetch_listing(
                            client,
                            &token,
                            &format!("/r/{subforum}/new"),
                            self.cfg.subforum_limit,
                        )
                        .await?;
                    out.extend(Self::parse_listing(&format!("r/{subforum}"), &body)?);
                }
                for user in &self.cfg.users {
                    let body = self
                        .fetch_listing(
                            client,
                            &token,
                            &format!("/user/{user}/submitted"),
                            self.cfg.user_limit,
                        )
                        .await?;
                    out.extend(Self::parse_listing(&format!("u/{user}"), &body)?);
                }
                Ok(out)
            }
        }
    }

    fn name(&self) -> &'static str {
        "Forum"
    }
}
