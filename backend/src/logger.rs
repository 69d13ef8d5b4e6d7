//! Tracing setup and poll-cycle spans.

use std::future::Future;
use std::time::{Duration, Instant};

use tracing::{Span, field, info, info_span, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Output format for the process-wide subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human readable.
    Pretty,
    /// One JSON object per event, for log shipping.
    Json,
}

impl LogFormat {
    /// `production` → JSON, anything else → pretty.
    pub fn for_env(app_env: Option<&str>) -> Self {
        match app_env.map(str::trim) {
            Some(env) if env.eq_ignore_ascii_case("production") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Correlation id attached to every event of one poll cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceId(String);

impl TraceId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over the `info` default.
///
/// Fails if a subscriber is already installed.
pub fn init_tracing(service: &'static str, format: LogFormat) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_span_events(fmt::format::FmtSpan::CLOSE);

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(layer.json()).try_init()?,
        LogFormat::Pretty => registry.with(layer.pretty()).try_init()?,
    }

    info!(service, ?format, "logger initialized");
    Ok(())
}

/// Root span of one poll cycle; `received` and `matched` are filled in by
/// [`annotate_cycle`] once the batch is processed.
pub fn cycle_span(trace_id: &TraceId) -> Span {
    info_span!(
        "poll_cycle",
        trace_id = %trace_id.as_str(),
        received = field::Empty,
        matched = field::Empty
    )
}

pub fn annotate_cycle(received: usize, matched: usize) {
    Span::current()
        .record("received", received)
        .record("matched", matched);
}

/// Awaits `fut` and warns under the `performance` target when it took
/// longer than `budget`.
pub async fn warn_if_slow<F, T>(label: &'static str, budget: Duration, fut: F) -> T
where
    F: Future<Output = T>,
{
    let started = Instant::now();
    let out = fut.await;

    let elapsed = started.elapsed();
    if elapsed > budget {
        warn!(
            target: "performance",
            label,
            elapsed_ms = elapsed.as_millis() as u64,
            budget_ms = budget.as_millis() as u64,
            "slow operation"
        );
    }
    out
}
