use chrono::NaiveDate;
use market_digest::ingest::providers::social::{
    SocialAdapter, SocialConfig, DEFAULT_MIRROR, DEFAULT_POSTS_PER_HANDLE,
};
use market_digest::ingest::types::SourceAdapter;
use std::fs;

fn feed_xml() -> String {
    fs::read_to_string("tests/fixtures/social_feed.xml")
        .expect("missing tests/fixtures/social_feed.xml")
}

fn cfg(handles: Vec<String>, limit: usize, since: Option<NaiveDate>) -> SocialConfig {
    SocialConfig {
        mirror: DEFAULT_MIRROR.to_string(),
        handles,
        limit,
        since,
    }
}

#[tokio::test]
async fn every_record_subject_is_a_watched_handle() {
    let watchlist = vec!["MarketWatch".to_string(), "wsjmarkets".to_string()];
    let adapter = SocialAdapter::from_fixtures(
        cfg(watchlist.clone(), DEFAULT_POSTS_PER_HANDLE, None),
        vec![
            ("MarketWatch".to_string(), feed_xml()),
            ("wsjmarkets".to_string(), feed_xml()),
        ],
    );

    let records = adapter.fetch().await.expect("social parse ok");
    assert!(!records.is_empty());
    assert!(records
        .iter()
        .all(|r| watchlist.iter().any(|h| r.subject == format!("@{h}"))));
}

#[tokio::test]
async fn html_bodies_are_normalized_and_blank_items_dropped() {
    let adapter = SocialAdapter::from_fixtures(
        cfg(vec!["MarketWatch".to_string()], DEFAULT_POSTS_PER_HANDLE, None),
        vec![("MarketWatch".to_string(), feed_xml())],
    );

    let records = adapter.fetch().await.expect("social parse ok");
    // 4 items in the fixture, one blank.
    assert_eq!(records.len(), 3);
    assert_eq!(
        records[0].text,
        "Stocks slip as Treasury yields climb ahead of the CPI print"
    );
    assert_eq!(records[2].text, "\"Soft landing\" talk returns");
    assert!(records.iter().all(|r| !r.text.contains('<')));
}

#[tokio::test]
async fn since_cutoff_applies_per_item() {
    let since = NaiveDate::from_ymd_opt(2026, 8, 7);
    let adapter = SocialAdapter::from_fixtures(
        cfg(vec!["MarketWatch".to_string()], DEFAULT_POSTS_PER_HANDLE, since),
        vec![("MarketWatch".to_string(), feed_xml())],
    );

    let records = adapter.fetch().await.expect("social parse ok");
    // The Aug 6 item falls before the cutoff.
    assert_eq!(records.len(), 2);
}
