mod common;

use chrono::{TimeZone, Utc};
use common::*;
use marketpulse::application::compare::SENTIMENT_SERIES;
use marketpulse::domain::entities::news_item::Headline;
use marketpulse::domain::values::date_range::DateRange;
use marketpulse::domain::values::sentiment_label::SentimentLabel;
use std::collections::BTreeMap;

fn march() -> DateRange {
    DateRange::new(date(2025, 3, 1), date(2025, 3, 31)).unwrap()
}

fn close_to(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// ACME: two headlines on the 9th (0.6, 0.8), one on the 10th (-0.4).
/// INIT: one neutral headline on the 9th.
async fn seeded() -> Harness {
    let h = setup();
    h.scorer.score_keyword("beats", 0.6);
    h.scorer.score_keyword("record", 0.8);
    h.scorer.score_keyword("lawsuit", -0.4);
    h.news.with_headlines(
        "ACME",
        vec![
            Headline::new("Acme beats estimates", Utc.with_ymd_and_hms(2025, 3, 9, 14, 0, 0).unwrap(), "Reuters"),
            Headline::new("Acme hits record high", Utc.with_ymd_and_hms(2025, 3, 9, 18, 0, 0).unwrap(), "CNBC"),
            Headline::new("Acme faces lawsuit", Utc.with_ymd_and_hms(2025, 3, 10, 8, 30, 0).unwrap(), "AP"),
        ],
    );
    h.news.with_headlines(
        "INIT",
        vec![Headline::new("Init holds annual meeting", Utc.with_ymd_and_hms(2025, 3, 9, 9, 0, 0).unwrap(), "AP")],
    );

    h.prices.with_bars(bars("ACME", date(2025, 3, 6), 5));
    h.prices.with_bars(bars("^GSPC", date(2025, 3, 8), 3));
    h.prices.with_bars(bars("^VIX", date(2025, 3, 9), 2));

    let report = h
        .mp
        .run_cycle(
            &[sym("ACME"), sym("INIT")],
            &[sym("^GSPC"), sym("^VIX"), sym("^NSEI")],
            at(2025, 3, 10),
        )
        .await;
    assert_eq!(report.error_count(), 0);
    h
}

#[tokio::test]
async fn test_read_news_in_publication_order() {
    let h = seeded().await;
    let news = h.mp.news(&sym("ACME"), march()).unwrap();
    let headlines: Vec<&str> = news.iter().map(|n| n.headline.as_str()).collect();
    assert_eq!(
        headlines,
        vec!["Acme beats estimates", "Acme hits record high", "Acme faces lawsuit"]
    );
    assert_eq!(news[2].label(), SentimentLabel::Negative);

    let only_tenth = DateRange::new(date(2025, 3, 10), date(2025, 3, 10)).unwrap();
    assert_eq!(h.mp.news(&sym("ACME"), only_tenth).unwrap().len(), 1);
}

#[tokio::test]
async fn test_daily_sentiment_per_symbol_and_overall() {
    let h = seeded().await;

    let acme = h.mp.daily_sentiment(Some(&sym("ACME")), march()).unwrap();
    assert_eq!(acme.len(), 2);
    assert_eq!(acme[0].date, date(2025, 3, 9));
    assert_eq!(acme[0].count, 2);
    assert!(close_to(acme[0].average, 0.7));
    assert!(close_to(acme[1].average, -0.4));

    let all = h.mp.daily_sentiment(None, march()).unwrap();
    assert_eq!(all[0].count, 3);
    assert!(close_to(all[0].average, 1.4 / 3.0));
    assert_eq!(all[1].count, 1);
}

#[tokio::test]
async fn test_summary_breakdown() {
    let h = seeded().await;
    let summary = h.mp.summary(&[sym("ACME"), sym("INIT"), sym("NONE")]).unwrap();

    assert_eq!(summary.len(), 3);
    let acme = &summary[0];
    assert_eq!(acme.count, 3);
    assert_eq!((acme.positive, acme.neutral, acme.negative), (2, 0, 1));
    assert!(close_to(acme.average.unwrap(), 1.0 / 3.0));

    let init = &summary[1];
    assert_eq!((init.count, init.neutral), (1, 1));

    let none = &summary[2];
    assert_eq!(none.count, 0);
    assert!(none.average.is_none());
}

#[tokio::test]
async fn test_compare_joins_and_normalizes() {
    let h = seeded().await;
    let indices: BTreeMap<String, _> = [
        ("S&P 500".to_string(), sym("^GSPC")),
        ("VIX".to_string(), sym("^VIX")),
        ("NIFTY 50".to_string(), sym("^NSEI")),
    ]
    .into();

    let cmp = h.mp.compare(&indices, march()).unwrap();

    assert_eq!(cmp.dates, vec![date(2025, 3, 9), date(2025, 3, 10)]);
    let names: Vec<&str> = cmp.series.iter().map(|s| s.name.as_str()).collect();
    // NIFTY 50 has no stored closes and is left out.
    assert_eq!(names, vec!["S&P 500", "VIX", SENTIMENT_SERIES]);
    assert_eq!(cmp.series[0].values, vec![0.0, 1.0]);
    assert_eq!(cmp.series[2].values, vec![1.0, 0.0]);
    for s in &cmp.series {
        assert!(s.values.iter().all(|v| (0.0..=1.0).contains(v)));
    }
}

#[tokio::test]
async fn test_compare_without_news_is_empty() {
    let h = setup();
    h.prices.with_bars(bars("^GSPC", date(2025, 3, 8), 3));
    h.mp.run_cycle(&[], &[sym("^GSPC")], at(2025, 3, 10)).await;

    let indices: BTreeMap<String, _> = [("S&P 500".to_string(), sym("^GSPC"))].into();
    assert!(h.mp.compare(&indices, march()).unwrap().is_empty());
}

#[tokio::test]
async fn test_stats_coverage() {
    let h = seeded().await;
    let stats = h.mp.stats().unwrap();

    assert_eq!(stats.price_rows, 10);
    assert_eq!(stats.news_rows, 4);
    let gspc = stats
        .symbols
        .iter()
        .find(|c| c.symbol.as_str() == "^GSPC")
        .unwrap();
    assert_eq!(gspc.rows, 3);
    assert_eq!(gspc.first_date, date(2025, 3, 8));
    assert_eq!(gspc.last_date, date(2025, 3, 10));
    assert!(stats.symbols.iter().all(|c| c.symbol.as_str() != "INIT"));
}

#[tokio::test]
async fn test_store_persists_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("marketpulse.db");
    let path = path.to_str().unwrap();

    {
        let h = setup_with(path, settings());
        h.prices.with_bars(bars("ACME", date(2025, 3, 6), 5));
        h.mp.run_once(&[sym("ACME")], at(2025, 3, 10)).await;
    }

    let h = setup_with(path, settings());
    assert_eq!(h.mp.stats().unwrap().price_rows, 5);

    h.mp.run_once(&[sym("ACME")], at(2025, 3, 12)).await;
    assert_eq!(
        h.prices.requests_for("ACME"),
        vec![DateRange::new(date(2025, 3, 11), date(2025, 3, 12)).unwrap()]
    );
}
