//! Notification hand-off.
//!
//! The poller never waits for delivery: a match is pushed onto an unbounded
//! channel and a separate dispatcher task feeds it to the [`SaleNotifier`].
//! There is no back-pressure; a slow notifier lets the queue grow.

pub mod log;
pub mod webhook;

use std::sync::Arc;

use async_trait::async_trait;
use corelib::NotifiedSale;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::error::NotifyError;

pub use self::log::LogNotifier;
pub use self::webhook::WebhookNotifier;

/// Delivers a matched sale to a human-facing channel.
///
/// Rendering (chat embeds, image links, ...) belongs to the implementation.
#[async_trait]
pub trait SaleNotifier: Send + Sync + 'static {
    fn name(&self) -> &str;

    async fn notify(&self, sale: &NotifiedSale) -> Result<(), NotifyError>;
}

/// Sending side of the notification queue, owned by the poller.
#[derive(Clone, Debug)]
pub struct NotifyHandle {
    tx: UnboundedSender<NotifiedSale>,
}

impl NotifyHandle {
    pub fn channel() -> (Self, UnboundedReceiver<NotifiedSale>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queues a sale for delivery; returns once it is enqueued.
    pub fn dispatch(&self, sale: NotifiedSale) -> Result<(), NotifyError> {
        self.tx.send(sale).map_err(|_| NotifyError::ChannelClosed)
    }
}

/// Spawns the dispatcher task. It exits once every [`NotifyHandle`] is
/// dropped and the queue is drained.
pub fn spawn_dispatcher(notifier: Arc<dyn SaleNotifier>) -> (NotifyHandle, JoinHandle<()>) {
    let (handle, rx) = NotifyHandle::channel();
    let span = info_span!("notify_dispatcher", notifier = %notifier.name());
    let task = tokio::spawn(run_dispatcher(notifier, rx).instrument(span));
    (handle, task)
}

/// Delivers queued sales one at a time, in queue order. A failed delivery is
/// logged and dropped.
pub async fn run_dispatcher(
    notifier: Arc<dyn SaleNotifier>,
    mut rx: UnboundedReceiver<NotifiedSale>,
) {
    info!("notification dispatcher started");

    while let Some(sale) = rx.recv().await {
        match notifier.notify(&sale).await {
            Ok(()) => debug!(sale_id = sale.sale_id, "sale notified"),
            Err(e) => error!(
                sale_id = sale.sale_id,
                error = %e,
                "notification delivery failed"
            ),
        }
    }

    warn!("notification channel closed; dispatcher exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::Sale;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct FlakyNotifier {
        delivered: Mutex<Vec<i64>>,
    }

    #[async_trait]
    impl SaleNotifier for FlakyNotifier {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn notify(&self, sale: &NotifiedSale) -> Result<(), NotifyError> {
            if sale.sale_id % 2 == 0 {
                return Err(NotifyError::ChannelClosed);
            }
            self.delivered.lock().await.push(sale.sale_id);
            Ok(())
        }
    }

    fn notified(id: i64) -> NotifiedSale {
        NotifiedSale::from_match(Sale::new(id, "AK-47 | Redline", 1_000), "AK", 0)
    }

    #[tokio::test]
    async fn delivers_in_order_and_survives_failures() {
        let notifier = Arc::new(FlakyNotifier::default());
        let (handle, task) = spawn_dispatcher(notifier.clone());

        for id in 1..=5 {
            handle.dispatch(notified(id)).unwrap();
        }
        drop(handle);
        task.await.unwrap();

        assert_eq!(*notifier.delivered.lock().await, vec![1, 3, 5]);
    }

    #[tokio::test]
    async fn dispatch_fails_once_receiver_is_gone() {
        let (handle, rx) = NotifyHandle::channel();
        drop(rx);

        assert!(matches!(
            handle.dispatch(notified(1)),
            Err(NotifyError::ChannelClosed)
        ));
    }
}
