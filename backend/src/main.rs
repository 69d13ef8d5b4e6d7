use std::sync::Arc;

use anyhow::Context;
use backend::{
    audit::AuditLog,
    config::AppConfig,
    feed::{FeedClient, SalePoller},
    filters::load_filter_set,
    logger::{LogFormat, init_tracing},
    metrics::counters::PollerCounters,
    notify::{LogNotifier, SaleNotifier, WebhookNotifier, spawn_dispatcher},
};
use tokio::sync::watch;

fn build_notifier(cfg: &AppConfig) -> anyhow::Result<Arc<dyn SaleNotifier>> {
    match &cfg.notify_webhook_url {
        Some(url) => {
            let hook = WebhookNotifier::new(url.clone(), cfg.request_timeout)
                .context("failed to build webhook notifier")?;
            Ok(Arc::new(hook))
        }
        None => {
            tracing::info!("NOTIFY_WEBHOOK_URL not set; matches are only logged");
            Ok(Arc::new(LogNotifier))
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM from the supervisor.
async fn shutdown_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate())?;
        tokio::select! {
            r = tokio::signal::ctrl_c() => r?,
            _ = term.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let format = LogFormat::for_env(std::env::var("APP_ENV").ok().as_deref());
    init_tracing("salewatch", format)?;

    let cfg = AppConfig::from_env();

    let filters = load_filter_set(&cfg.filters_path).await;

    let feed = FeedClient::new(cfg.feed_url.clone(), cfg.request_timeout)
        .context("failed to build feed client")?;

    let (notify, dispatcher) = spawn_dispatcher(build_notifier(&cfg)?);

    let audit = AuditLog::new(cfg.audit_log_path.clone()).with_max_lines(cfg.audit_log_max_lines);

    let counters = PollerCounters::default();

    let poller = SalePoller::new(feed, filters, audit, notify, cfg.poll_interval)
        .with_dedup_capacity(cfg.dedup_capacity)
        .with_excluded_categories(&cfg.excluded_categories)
        .with_counters(counters.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller_task = tokio::spawn(poller.run(shutdown_rx));

    shutdown_signal().await?;
    tracing::info!("Shutdown signal received");

    let _ = shutdown_tx.send(true);

    // The poller owns the last NotifyHandle; once it returns the dispatcher
    // drains what is queued and exits.
    poller_task.await.context("poller task panicked")?;
    dispatcher.await.context("dispatcher task panicked")?;

    tracing::info!(counters = ?counters.snapshot(), "salewatch stopped");

    Ok(())
}
