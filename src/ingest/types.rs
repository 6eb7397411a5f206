// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};

/// When an event happened or is scheduled. Calendar providers only give a
/// date; feed providers give a full timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum EventTime {
    Date(NaiveDate),
    Instant(DateTime<Utc>),
}

impl EventTime {
    pub fn from_unix(secs: i64) -> Self {
        let dt = DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        EventTime::Instant(dt)
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            EventTime::Date(d) => *d,
            EventTime::Instant(dt) => dt.date_naive(),
        }
    }

    /// Human-readable label used in the rendered report.
    pub fn label(&self) -> String {
        match self {
            EventTime::Date(d) => d.format("%Y-%m-%d").to_string(),
            EventTime::Instant(dt) => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
        }
    }
}

/// One normalized fact pulled from an external source: a calendar entry, a
/// post, an earnings date. Immutable after fetch.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EventRecord {
    pub source: String,  // adapter label, e.g. "Economic", "Social"
    pub subject: String, // handle, symbol, country/category or subforum
    pub when: EventTime,
    pub text: String, // normalized body
    pub url: Option<String>,
    pub detail: Option<String>, // short annotation: EPS figures, score, ...
}

/// Inclusive date window derived from "today" plus a look-ahead count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    pub fn days_ahead(today: NaiveDate, days: u32) -> Self {
        Self {
            start: today,
            end: today + chrono::Duration::days(i64::from(days)),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every date in the window, start through end inclusive.
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        std::iter::successors(Some(self.start), move |d| {
            d.succ_opt().filter(|next| *next <= end)
        })
    }
}

/// Shared capability interface: one external provider wrapped into a uniform
/// record-fetching contract. An empty result is not an error; `Err` means the
/// provider was unreachable or returned garbage.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    async fn fetch(&self) -> Result<Vec<EventRecord>>;
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn window_zero_days_is_today_only() {
        let w = Window::days_ahead(d(2026, 8, 7), 0);
        assert!(w.contains(d(2026, 8, 7)));
        assert!(!w.contains(d(2026, 8, 8)));
        assert_eq!(w.iter_days().count(), 1);
    }

    #[test]
    fn window_week_ahead_is_inclusive_on_both_ends() {
        let w = Window::days_ahead(d(2026, 8, 7), 7);
        assert!(w.contains(d(2026, 8, 7)));
        assert!(w.contains(d(2026, 8, 14)));
        assert!(!w.contains(d(2026, 8, 15)));
        assert_eq!(w.iter_days().count(), 8);
    }

    #[test]
    fn event_time_labels() {
        let date = EventTime::Date(d(2026, 8, 7));
        assert_eq!(date.label(), "2026-08-07");

        let instant = EventTime::from_unix(1_770_000_000);
        assert!(instant.label().ends_with("UTC"));
        assert_eq!(instant.date().year(), 2026);
    }

    #[test]
    fn from_unix_clamps_negative_to_epoch() {
        let t = EventTime::from_unix(-5);
        assert_eq!(t, EventTime::Instant(DateTime::<Utc>::UNIX_EPOCH));
    }
}
