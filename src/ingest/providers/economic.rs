// src/ingest/providers/economic.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::time::Duration;

use crate::ingest::normalize_text;
use crate::ingest::types::{EventRecord, EventTime, SourceAdapter, Window};

pub const BASE_URL: &str = "https://api.tradingeconomics.com/calendar";

/// Public key accepted by the provider when no account key is configured.
pub const GUEST_KEY: &str = "guest:guest";
pub const ENV_API_KEY: &str = "ECON_CALENDAR_KEY";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct EconomicConfig {
    pub window: Window,
    /// Optional country filter, forwarded comma-joined. Empty means all.
    pub countries: Vec<String>,
    /// Optional importance filter (Low/Medium/High). Empty means all.
    pub importance: Vec<String>,
    pub api_key: String,
}

/// Economic calendar adapter. Fetches the calendar for the configured window
/// and normalizes rows into [`EventRecord`]s.
pub struct EconomicAdapter {
    cfg: EconomicConfig,
    mode: Mode,
}

enum Mode {
    // Owned copy of a captured payload; keeps parsing testable offline.
    Fixture(String),
    Http { client: reqwest::Client },
}

impl EconomicAdapter {
    pub fn from_config(cfg: EconomicConfig) -> Self {
        Self {
            cfg,
            mode: Mode::Http {
                client: reqwest::Client::new(),
            },
        }
    }

    pub fn from_fixture_str(cfg: EconomicConfig, payload: &str) -> Self {
        Self {
            cfg,
            mode: Mode::Fixture(payload.to_string()),
        }
    }

    fn parse_payload(&self, body: &str) -> Result<Vec<EventRecord>> {
        let payload: Value =
            serde_json::from_str(body).context("parsing economic calendar payload")?;

        // The provider sometimes wraps rows in an envelope object.
        let empty = Vec::new();
        let rows: &Vec<Value> = match &payload {
            Value::Array(rows) => rows,
            Value::Object(map) => map
                .get("data")
                .or_else(|| map.get("calendar"))
                .or_else(|| map.get("Events"))
                .and_then(Value::as_array)
                .unwrap_or(&empty),
            _ => &empty,
        };

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(row) = row.as_object() else {
                continue;
            };
            let Some(when) = parse_row_time(row) else {
                continue;
            };
            if !self.cfg.window.contains(when.date()) {
                continue;
            }

            let country = field_str(row, "Country").unwrap_or_default();
            let category = field_str(row, "Category").unwrap_or_default();
            let event = field_str(row, "Event").unwrap_or_default();
            let text = normalize_text(&event);
            if text.is_empty() {
                continue;
            }

            let subject = if category.is_empty() {
                country.clone()
            } else if country.is_empty() {
                category.clone()
            } else {
                format!("{country} — {category}")
            };

            let mut details = Vec::new();
            if let Some(actual) = field_str(row, "Actual") {
                details.push(format!("Actual: {actual}"));
            }
            if let Some(forecast) = field_str(row, "Forecast") {
                details.push(format!("Forecast: {forecast}"));
            }
            if let Some(previous) = field_str(row, "Previous") {
                details.push(format!("Previous: {previous}"));
            }
            if let Some(importance) = field_str(row, "Importance") {
                details.push(format!("Importance: {importance}"));
            }

            out.push(EventRecord {
                source: "Economic".to_string(),
                subject,
                when,
                text,
                url: None,
                detail: (!details.is_empty()).then(|| details.join("; ")),
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl SourceAdapter for EconomicAdapter {
    async fn fetch(&self) -> Result<Vec<EventRecord>> {
        match &self.mode {
            Mode::Fixture(payload) => self.parse_payload(payload),
            Mode::Http { client } => {
                let mut query: Vec<(&str, String)> = vec![
                    ("d1", self.cfg.window.start.format("%Y-%m-%d").to_string()),
                    ("d2", self.cfg.window.end.format("%Y-%m-%d").to_string()),
                    ("key", self.cfg.api_key.clone()),
                    ("format", "json".to_string()),
                ];
                if !self.cfg.countries.is_empty() {
                    query.push(("country", self.cfg.countries.join(",")));
                }
                if !self.cfg.importance.is_empty() {
                    query.push(("importance", self.cfg.importance.join(",")));
                }

                let body = client
                    .get(BASE_URL)
                    .query(&query)
                    .timeout(REQUEST_TIMEOUT)
                    .send()
                    .await
                    .context("economic calendar http get()")?
                    .error_for_status()
                    .context("economic calendar http status")?
                    .text()
                    .await
                    .context("economic calendar http .text()")?;
                self.parse_payload(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "Economic"
    }
}

/// Read a field tolerantly: the provider mixes strings and numbers.
fn field_str(row: &Map<String, Value>, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) => {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Row dates look like `2026-08-07T12:30:00`; fall back to the bare date when
/// the time part is missing or malformed.
fn parse_row_time(row: &Map<String, Value>) -> Option<EventTime> {
    let raw = field_str(row, "Date")?;
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(EventTime::Instant(ndt.and_utc()));
    }
    let date_part = raw.get(..10)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .ok()
        .map(EventTime::Date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> Window {
        Window::days_ahead(NaiveDate::from_ymd_opt(2026, 8, 7).unwrap(), 7)
    }

    fn cfg() -> EconomicConfig {
        EconomicConfig {
            window: window(),
            countries: vec![],
            importance: vec![],
            api_key: GUEST_KEY.to_string(),
        }
    }

    #[tokio::test]
    async fn bare_array_payload_parses() {
        let payload = r#"[
            {"Date":"2026-08-07T12:30:00","Country":"United States","Category":"Inflation Rate","Event":"CPI YoY","Actual":"2.9%","Forecast":"3.0%","Importance":3}
        ]"#;
        let adapter = EconomicAdapter::from_fixture_str(cfg(), payload);
        let records = adapter.fetch().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].subject, "United States — Inflation Rate");
        assert_eq!(records[0].text, "CPI YoY");
        assert_eq!(
            records[0].detail.as_deref(),
            Some("Actual: 2.9%; Forecast: 3.0%; Importance: 3")
        );
    }

    #[tokio::test]
    async fn rows_outside_window_are_dropped() {
        let payload = r#"[
            {"Date":"2026-08-20T08:00:00","Country":"Germany","Category":"GDP","Event":"GDP Growth Rate QoQ"},
            {"Date":"2026-08-08T08:00:00","Country":"Germany","Category":"GDP","Event":"GDP Growth Rate QoQ"}
        ]"#;
        let adapter = EconomicAdapter::from_fixture_str(cfg(), payload);
        let records = adapter.fetch().await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(window().contains(records[0].when.date()));
    }

    #[tokio::test]
    async fn non_object_rows_and_dateless_rows_are_skipped() {
        let payload = r#"["garbage", {"Country":"Japan","Event":"No date"}, 42]"#;
        let adapter = EconomicAdapter::from_fixture_str(cfg(), payload);
        assert!(adapter.fetch().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn enveloped_payload_parses() {
        let payload = r#"{"data":[{"Date":"2026-08-09","Country":"Japan","Category":"Trade","Event":"Balance of Trade"}]}"#;
        let adapter = EconomicAdapter::from_fixture_str(cfg(), payload);
        let records = adapter.fetch().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].when, EventTime::Date(NaiveDate::from_ymd_opt(2026, 8, 9).unwrap()));
    }
}
