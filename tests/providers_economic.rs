use chrono::NaiveDate;
use market_digest::ingest::providers::economic::{EconomicAdapter, EconomicConfig, GUEST_KEY};
use market_digest::ingest::types::{SourceAdapter, Window};
use std::fs;

fn window() -> Window {
    Window::days_ahead(NaiveDate::from_ymd_opt(2026, 8, 7).unwrap(), 7)
}

fn adapter_from_fixture() -> EconomicAdapter {
    let payload = fs::read_to_string("tests/fixtures/economic_calendar.json")
        .expect("missing tests/fixtures/economic_calendar.json");
    EconomicAdapter::from_fixture_str(
        EconomicConfig {
            window: window(),
            countries: vec![],
            importance: vec![],
            api_key: GUEST_KEY.to_string(),
        },
        &payload,
    )
}

#[tokio::test]
async fn fixture_parses_and_keeps_only_in_window_rows() {
    let records = adapter_from_fixture().fetch().await.expect("econ parse ok");

    // 4 in-window rows; the September row, the garbage row and the dateless
    // row are all dropped.
    assert_eq!(records.len(), 4);
    assert!(
        records.iter().all(|r| window().contains(r.when.date())),
        "every record must fall inside the requested window"
    );
}

#[tokio::test]
async fn records_carry_country_category_subject_and_details() {
    let records = adapter_from_fixture().fetch().await.expect("econ parse ok");

    let cpi = records
        .iter()
        .find(|r| r.text == "Inflation Rate YoY")
        .expect("CPI row present");
    assert_eq!(cpi.source, "Economic");
    assert_eq!(cpi.subject, "United States — Inflation Rate");
    assert_eq!(
        cpi.detail.as_deref(),
        Some("Actual: 2.9%; Forecast: 3.0%; Previous: 3.1%; Importance: 3")
    );

    // Null Actual must not leak into details.
    let gdp = records
        .iter()
        .find(|r| r.text == "GDP Growth Rate QoQ Prel")
        .expect("GDP row present");
    assert_eq!(
        gdp.detail.as_deref(),
        Some("Forecast: 0.3%; Previous: 0.2%; Importance: 2")
    );
}

#[tokio::test]
async fn date_only_rows_render_as_dates() {
    let records = adapter_from_fixture().fetch().await.expect("econ parse ok");
    let trade = records
        .iter()
        .find(|r| r.subject.starts_with("Euro Area"))
        .expect("trade balance row present");
    assert_eq!(trade.when.label(), "2026-08-14");
}
