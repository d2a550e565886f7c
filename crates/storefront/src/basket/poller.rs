//! Background basket polling.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::sync::{BasketSync, BasketView};

/// Refreshes the basket on a fixed interval and publishes each view.
///
/// The first refresh runs immediately. Dropping the poller aborts the task.
pub struct BasketPoller {
    view: watch::Receiver<BasketView>,
    refresh: Arc<Notify>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl BasketPoller {
    /// Spawn the polling task on the current runtime.
    #[must_use]
    pub fn spawn(sync: BasketSync, interval: Duration) -> Self {
        let (tx, view) = watch::channel(BasketView::default());
        let refresh = Arc::new(Notify::new());
        let (shutdown, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(run(sync, interval, tx, Arc::clone(&refresh), shutdown_rx));
        info!(interval_secs = interval.as_secs_f64(), "Basket poller started");

        Self {
            view,
            refresh,
            shutdown: Some(shutdown),
            task: Some(task),
        }
    }

    /// Refresh as soon as possible instead of waiting for the next tick.
    pub fn refresh_now(&self) {
        self.refresh.notify_one();
    }

    /// Latest published view.
    #[must_use]
    pub fn view(&self) -> BasketView {
        self.view.borrow().clone()
    }

    /// Subscribe to published views.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<BasketView> {
        self.view.clone()
    }

    /// Stop polling and wait for an in-flight refresh to finish.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            tracing::error!(error = %e, "Basket poller task failed");
        }
        info!("Basket poller stopped");
    }
}

impl Drop for BasketPoller {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run(
    sync: BasketSync,
    interval: Duration,
    tx: watch::Sender<BasketView>,
    refresh: Arc<Notify>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
            () = refresh.notified() => {
                debug!("Basket refresh requested");
                ticker.reset();
            }
        }

        let previous = tx.borrow().clone();
        let next = sync.refresh(&previous).await;
        tx.send_replace(next);
    }
}
