// src/ingest/providers/earnings.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::ingest::normalize_text;
use crate::ingest::types::{EventRecord, EventTime, SourceAdapter, Window};

pub const BASE_URL: &str = "https://api.nasdaq.com/api/calendar/earnings";

// The endpoint rejects clients that do not look like a browser.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const ACCEPT: &str = "application/json, text/plain, */*";
const REFERER: &str = "https://www.nasdaq.com/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct EarningsConfig {
    pub window: Window,
}

/// Earnings calendar adapter. The provider serves one day per request, so the
/// HTTP mode walks the window date by date.
pub struct EarningsAdapter {
    cfg: EarningsConfig,
    mode: Mode,
}

enum Mode {
    // One captured payload, attributed to the window start date.
    Fixture(String),
    Http { client: reqwest::Client },
}

#[derive(Debug, Deserialize)]
struct EarningsRow {
    #[serde(default)]
    symbol: String,
    #[serde(default, alias = "name")]
    company: String,
    #[serde(rename = "epsForecast", alias = "epsEstimate")]
    eps_forecast: Option<String>,
    #[serde(rename = "epsActual")]
    eps_actual: Option<String>,
    #[serde(rename = "when")]
    session: Option<String>,
}

impl EarningsAdapter {
    pub fn from_config(cfg: EarningsConfig) -> Self {
        Self {
            cfg,
            mode: Mode::Http {
                client: reqwest::Client::new(),
            },
        }
    }

    pub fn from_fixture_str(cfg: EarningsConfig, payload: &str) -> Self {
        Self {
            cfg,
            mode: Mode::Fixture(payload.to_string()),
        }
    }

    fn parse_payload(payload: &str, date: NaiveDate) -> Result<Vec<EventRecord>> {
        let payload: Value =
            serde_json::from_str(payload).context("parsing earnings calendar payload")?;

        // Rows live under data.rows, or data.calendar.rows on older payloads.
        let rows = payload
            .get("data")
            .map(|data| {
                data.get("rows")
                    .or_else(|| data.get("calendar").and_then(|c| c.get("rows")))
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default()
            })
            .unwrap_or_default();

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let Ok(row) = serde_json::from_value::<EarningsRow>(row) else {
                continue;
            };
            let symbol = row.symbol.trim().to_uppercase();
            if symbol.is_empty() {
                continue;
            }

            let mut details = Vec::new();
            if let Some(est) = nonempty(row.eps_forecast) {
                details.push(format!("Est: {est}"));
            }
            if let Some(actual) = nonempty(row.eps_actual) {
                details.push(format!("Actual: {actual}"));
            }
            if let Some(session) = nonempty(row.session) {
                details.push(session);
            }

            out.push(EventRecord {
                source: "Earnings".to_string(),
                subject: symbol,
                when: EventTime::Date(date),
                text: normalize_text(&row.company),
                url: None,
                detail: (!details.is_empty()).then(|| details.join(", ")),
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl SourceAdapter for EarningsAdapter {
    async fn fetch(&self) -> Result<Vec<EventRecord>> {
        match &self.mode {
            Mode::Fixture(payload) => Self::parse_payload(payload, self.cfg.window.start),
            Mode::Http { client } => {
                let mut out = Vec::new();
                for date in self.cfg.window.iter_days() {
                    let formatted = date.format("%Y-%m-%d").to_string();
                    let body = client
                        .get(BASE_URL)
                        .query(&[("date", formatted.as_str())])
                        .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
                        .header(reqwest::header::ACCEPT, ACCEPT)
                        .header(reqwest::header::REFERER, REFERER)
                        .timeout(REQUEST_TIMEOUT)
                        .send()
                        .await
                        .with_context(|| format!("earnings calendar http get() for {formatted}"))?
                        .error_for_status()
                        .context("earnings calendar http status")?
                        .text()
                        .await
                        .context("earnings calendar http .text()")?;
                    out.extend(Self::parse_payload(&body, date)?);
                }
                Ok(out)
            }
        }
    }

    fn name(&self) -> &'static str {
        "Earnings"
    }
}

fn nonempty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
