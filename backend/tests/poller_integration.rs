mod mock_feed;

use std::time::Duration;

use backend::audit::AuditLog;
use backend::feed::client::decode_batch;
use backend::feed::{FeedError, SalePoller};
use backend::notify::NotifyHandle;
use corelib::{FeedRecord, FilterConfig, Sale};
use engine::FilterSet;
use mock_feed::ScriptedFeed;
use tokio::sync::watch;

const KARAMBIT_RULE: &str = r#"{
    "names": "Karambit",
    "minPrice": "50",
    "maxPrice": "210",
    "patterns": "100,231,31,321",
    "minWear": "0.001",
    "maxWear": "0.5",
    "exterior": "Minimal Wear"
}"#;

const BATCH: &[u8] = br#"[
    {
        "eventType": "listed",
        "sale": {
            "saleId": 61598590,
            "marketName": "Karambit Tiger Tooth",
            "salePrice": "200",
            "wear": "0.02453",
            "pattern": 231,
            "exterior": "Minimal Wear"
        }
    },
    {
        "eventType": "listed",
        "sale": {
            "saleId": 61598591,
            "marketName": "Desert Eagle | The Bronze (Minimal Wear)",
            "salePrice": "10",
            "pattern": 81
        }
    }
]"#;

fn karambit_filters() -> FilterSet {
    FilterSet::new(FilterConfig::from_json(KARAMBIT_RULE).unwrap().into_rules())
}

struct Harness {
    feed: ScriptedFeed,
    audit: AuditLog,
    poller: SalePoller<ScriptedFeed>,
    rx: tokio::sync::mpsc::UnboundedReceiver<corelib::NotifiedSale>,
    _dir: tempfile::TempDir,
}

fn harness(filters: FilterSet) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let audit = AuditLog::new(dir.path().join("logs").join("listings.txt"));
    let feed = ScriptedFeed::new();
    let (notify, rx) = NotifyHandle::channel();

    let poller = SalePoller::new(
        feed.clone(),
        filters,
        audit.clone(),
        notify,
        Duration::from_secs(5),
    );

    Harness {
        feed,
        audit,
        poller,
        rx,
        _dir: dir,
    }
}

#[tokio::test]
async fn karambit_is_notified_and_audited_bronze_is_not() {
    let mut h = harness(karambit_filters());
    h.feed.push_ok(decode_batch(BATCH).unwrap()).await;

    let report = h.poller.run_cycle().await.unwrap();

    assert_eq!(report.received, 2);
    assert_eq!(report.new_sales, 2);
    assert_eq!(report.matched, 1);

    let notified = h.rx.try_recv().unwrap();
    assert_eq!(notified.sale_id, 61598590);
    assert_eq!(notified.matched_rule, "Karambit");
    assert!((notified.sale_price - 2.0).abs() < 1e-9);
    assert!(h.rx.try_recv().is_err());

    let lines = h.audit.read_lines().await.unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with(" - [MATCH] Karambit Tiger Tooth - 0.0245 - 2.00 EUR (61598590)"));

    assert!(h.poller.dedup().seen(61598590));
    assert!(h.poller.dedup().seen(61598591));
}

#[tokio::test]
async fn matched_price_is_normalized_to_major_units() {
    let mut h = harness(FilterSet::new(vec![Default::default()]));
    h.feed
        .push_ok(vec![FeedRecord::listed(Sale::new(7, "M4A4 | Howl", 20050))])
        .await;

    h.poller.run_cycle().await.unwrap();

    let notified = h.rx.try_recv().unwrap();
    assert!((notified.sale_price - 200.50).abs() < 1e-9);
}

#[tokio::test]
async fn repeated_sale_is_not_notified_twice() {
    let mut h = harness(karambit_filters());
    h.feed.push_ok(decode_batch(BATCH).unwrap()).await;
    h.feed.push_ok(decode_batch(BATCH).unwrap()).await;

    let first = h.poller.run_cycle().await.unwrap();
    let second = h.poller.run_cycle().await.unwrap();

    assert_eq!(first.matched, 1);
    assert_eq!(second.duplicates, 2);
    assert_eq!(second.new_sales, 0);
    assert_eq!(second.matched, 0);

    assert!(h.rx.try_recv().is_ok());
    assert!(h.rx.try_recv().is_err());
    assert_eq!(h.audit.read_lines().await.unwrap().len(), 1);
}

#[tokio::test]
async fn failed_cycle_leaves_state_for_the_next_one() {
    let mut h = harness(karambit_filters());
    h.feed
        .push_err(decode_batch(b"<html>bad gateway</html>").unwrap_err())
        .await;
    h.feed.push_ok(decode_batch(BATCH).unwrap()).await;

    let failed = h.poller.run_cycle().await;
    assert!(matches!(failed, Err(FeedError::Decode(_))));
    assert!(h.poller.dedup().is_empty());

    let report = h.poller.run_cycle().await.unwrap();
    assert_eq!(report.matched, 1);

    let snap = h.poller.counters().snapshot();
    assert_eq!(snap.cycles, 2);
    assert_eq!(snap.failed_cycles, 1);
    assert_eq!(snap.matches, 1);
}

#[tokio::test]
async fn oversized_batch_leaves_newest_hundred_ids() {
    let mut h = harness(FilterSet::empty());
    let batch = (1..=150)
        .map(|id| FeedRecord::listed(Sale::new(id, "Glock-18 | Fade", 100)))
        .collect();
    h.feed.push_ok(batch).await;

    let report = h.poller.run_cycle().await.unwrap();

    // Every record in the batch is new; trimming only happens afterwards.
    assert_eq!(report.new_sales, 150);
    assert_eq!(h.poller.dedup().len(), 100);
    assert_eq!(
        h.poller.dedup().iter().collect::<Vec<_>>(),
        (51..=150).collect::<Vec<i64>>()
    );

    // Evicted ids count as new again.
    h.feed
        .push_ok(vec![FeedRecord::listed(Sale::new(1, "Glock-18 | Fade", 100))])
        .await;
    assert_eq!(h.poller.run_cycle().await.unwrap().new_sales, 1);
}

#[tokio::test]
async fn empty_filter_set_still_records_sales() {
    let mut h = harness(FilterSet::empty());
    h.feed.push_ok(decode_batch(BATCH).unwrap()).await;

    let report = h.poller.run_cycle().await.unwrap();

    assert_eq!(report.new_sales, 2);
    assert_eq!(report.matched, 0);
    assert!(h.rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn run_loop_ticks_until_shutdown() {
    let h = harness(FilterSet::empty());
    let feed = h.feed.clone();
    let (tx, rx) = watch::channel(false);

    let task = tokio::spawn(h.poller.run(rx));

    // Ticks at 0s, 5s and 10s.
    tokio::time::sleep(Duration::from_secs(12)).await;
    tx.send(true).unwrap();
    task.await.unwrap();

    assert_eq!(feed.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn run_loop_exits_when_sender_is_dropped() {
    let h = harness(FilterSet::empty());
    let feed = h.feed.clone();
    let (tx, rx) = watch::channel(false);

    let task = tokio::spawn(h.poller.run(rx));
    tokio::time::sleep(Duration::from_secs(1)).await;
    drop(tx);
    task.await.unwrap();

    assert_eq!(feed.calls(), 1);
}

#[tokio::test]
async fn shutdown_before_start_skips_every_cycle() {
    let h = harness(FilterSet::empty());
    let feed = h.feed.clone();
    let (_tx, rx) = watch::channel(true);

    h.poller.run(rx).await;

    assert_eq!(feed.calls(), 0);
}
