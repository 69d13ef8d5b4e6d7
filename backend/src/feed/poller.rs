//! Sale Poller
//!
//! Periodically pulls the sale feed, drops records already seen, evaluates
//! the rest against the active `FilterSet` and hands matches to the notifier
//! and the audit log.
//!
//! Data flow:
//! Feed → DedupWindow → FilterSet → NotifyHandle + AuditLog

use std::time::Duration;

use corelib::{FeedRecord, NotifiedSale, Sale, minor_to_major};
use engine::{DedupWindow, FilterSet};
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{Instrument, debug, error, info, warn};

use crate::audit::AuditLog;
use crate::feed::errors::FeedError;
use crate::feed::source::SaleFeed;
use crate::logger::{TraceId, annotate_cycle, cycle_span, warn_if_slow};
use crate::metrics::counters::PollerCounters;
use crate::notify::NotifyHandle;
use crate::time::now_ms;

/// What one successful cycle did with its batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub received: usize,
    pub excluded: usize,
    pub duplicates: usize,
    pub new_sales: usize,
    pub matched: usize,
}

/// Single-task feed poller. Owns its dedup window and audit log.
pub struct SalePoller<F: SaleFeed> {
    feed: F,
    filters: FilterSet,
    dedup: DedupWindow,
    audit: AuditLog,
    notify: NotifyHandle,
    /// Lowercased.
    excluded_categories: Vec<String>,
    poll_every: Duration,
    counters: PollerCounters,
}

impl<F: SaleFeed> SalePoller<F> {
    pub fn new(
        feed: F,
        filters: FilterSet,
        audit: AuditLog,
        notify: NotifyHandle,
        poll_every: Duration,
    ) -> Self {
        Self {
            feed,
            filters,
            dedup: DedupWindow::default(),
            audit,
            notify,
            excluded_categories: Vec::new(),
            poll_every,
            counters: PollerCounters::default(),
        }
    }

    pub fn with_dedup_capacity(mut self, capacity: usize) -> Self {
        self.dedup = DedupWindow::new(capacity);
        self
    }

    pub fn with_excluded_categories(mut self, categories: &[String]) -> Self {
        self.excluded_categories = categories.iter().map(|c| c.trim().to_lowercase()).collect();
        self
    }

    pub fn with_counters(mut self, counters: PollerCounters) -> Self {
        self.counters = counters;
        self
    }

    pub fn dedup(&self) -> &DedupWindow {
        &self.dedup
    }

    pub fn counters(&self) -> &PollerCounters {
        &self.counters
    }

    /// Runs the tick loop until `shutdown` turns true or its sender is
    /// dropped. Shutdown is only observed between cycles.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.poll_every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            every_ms = self.poll_every.as_millis() as u64,
            rules = self.filters.len(),
            dedup_capacity = self.dedup.capacity(),
            "sale poller started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }

            let trace_id = TraceId::new();
            // Failures are logged inside the cycle; the next tick retries.
            let _ = self.run_cycle().instrument(cycle_span(&trace_id)).await;
        }

        info!(counters = ?self.counters.snapshot(), "sale poller stopped");
    }

    /// One poll: fetch, process the whole batch, then trim the dedup window.
    ///
    /// A transport or decode failure abandons the batch and is returned after
    /// being logged; the window is trimmed either way.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, FeedError> {
        PollerCounters::incr(&self.counters.cycles);

        let fetched = warn_if_slow("feed_fetch", self.poll_every, self.feed.fetch()).await;

        let result = match fetched {
            Ok(records) => {
                debug!(count = records.len(), "looking for filtered offers");
                let mut report = CycleReport::default();
                for record in records {
                    self.process(record, &mut report).await;
                }
                annotate_cycle(report.received, report.matched);
                Ok(report)
            }
            Err(e) => {
                PollerCounters::incr(&self.counters.failed_cycles);
                warn!(error = %e, "feed fetch failed; skipping cycle");
                Err(e)
            }
        };

        let evicted = self.dedup.trim();
        if evicted > 0 {
            debug!(evicted, window = self.dedup.len(), "dedup window trimmed");
        }

        result
    }

    async fn process(&mut self, record: FeedRecord, report: &mut CycleReport) {
        report.received += 1;
        PollerCounters::incr(&self.counters.received);

        if self.is_excluded(&record.sale) {
            report.excluded += 1;
            PollerCounters::incr(&self.counters.skip_excluded);
            return;
        }

        let sale_id = record.sale.sale_id;
        if self.dedup.seen(sale_id) {
            report.duplicates += 1;
            PollerCounters::incr(&self.counters.skip_duplicate);
            return;
        }
        self.dedup.record(sale_id);
        report.new_sales += 1;
        PollerCounters::incr(&self.counters.new_sales);

        let line = listing_line(&record.sale);

        let Some(rule) = self.filters.evaluate(&record).map(|r| r.label().to_string()) else {
            info!(sale_id, "[NEW] {line}");
            return;
        };

        report.matched += 1;
        PollerCounters::incr(&self.counters.matches);

        let notified = NotifiedSale::from_match(record.sale, rule.clone(), now_ms());
        if let Err(e) = self.notify.dispatch(notified) {
            PollerCounters::incr(&self.counters.notify_failures);
            error!(sale_id, error = %e, "failed to queue notification");
        }

        info!(sale_id, rule = %rule, "[MATCH] {line}");

        if let Err(e) = self.audit.append(&format!("[MATCH] {line}")).await {
            PollerCounters::incr(&self.counters.audit_failures);
            warn!(sale_id, error = %e, "audit log append failed");
        }
    }

    fn is_excluded(&self, sale: &Sale) -> bool {
        if self.excluded_categories.is_empty() {
            return false;
        }
        sale.category
            .as_deref()
            .map(|c| self.excluded_categories.contains(&c.trim().to_lowercase()))
            .unwrap_or(false)
    }
}

/// `"{marketName} - {wear:.4} - {price:.2} EUR ({saleId})"`, price in major
/// units. A sale without wear shows `n/a`.
pub fn listing_line(sale: &Sale) -> String {
    let wear = sale
        .wear
        .map(|w| format!("{w:.4}"))
        .unwrap_or_else(|| "n/a".to_string());

    format!(
        "{} - {} - {:.2} EUR ({})",
        sale.market_name,
        wear,
        minor_to_major(sale.sale_price),
        sale.sale_id
    )
}
