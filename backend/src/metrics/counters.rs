use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Minimal counters for operational visibility of the poller.
#[derive(Clone, Default)]
pub struct PollerCounters {
    pub cycles: Arc<AtomicU64>,
    pub failed_cycles: Arc<AtomicU64>,

    pub received: Arc<AtomicU64>,
    pub new_sales: Arc<AtomicU64>,
    pub matches: Arc<AtomicU64>,

    // skip reasons
    pub skip_duplicate: Arc<AtomicU64>,
    pub skip_excluded: Arc<AtomicU64>,

    pub notify_failures: Arc<AtomicU64>,
    pub audit_failures: Arc<AtomicU64>,
}

impl PollerCounters {
    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        let get = |c: &Arc<AtomicU64>| c.load(Ordering::Relaxed);
        CounterSnapshot {
            cycles: get(&self.cycles),
            failed_cycles: get(&self.failed_cycles),
            received: get(&self.received),
            new_sales: get(&self.new_sales),
            matches: get(&self.matches),
            skip_duplicate: get(&self.skip_duplicate),
            skip_excluded: get(&self.skip_excluded),
            notify_failures: get(&self.notify_failures),
            audit_failures: get(&self.audit_failures),
        }
    }
}

/// Point-in-time copy of [`PollerCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub cycles: u64,
    pub failed_cycles: u64,
    pub received: u64,
    pub new_sales: u64,
    pub matches: u64,
    pub skip_duplicate: u64,
    pub skip_excluded: u64,
    pub notify_failures: u64,
    pub audit_failures: u64,
}
