//! Polling refresher: timer-driven background fetch of the newest mail.
//!
//! One fetch is in flight at a time: each poll is awaited inline and missed
//! ticks coalesce, so a round-trip slower than the interval delays the next
//! poll instead of racing it. Changing the interval drops the old ticker
//! before arming the new one, so timers never leak or double-fire.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::backend::ApiClient;
use crate::constants::{CHANNEL_CAPACITY, MIN_FETCH_INTERVAL_SECS, POLL_BATCH_SIZE};
use crate::store::Email;

/// Commands accepted by the refresher actor.
#[derive(Debug)]
pub enum RefreshCommand {
    /// Re-arm the timer with a new interval in seconds.
    SetInterval(u64),
    /// Poll immediately, outside the timer cadence.
    RefreshNow,
    Shutdown,
}

/// Events emitted by the refresher actor.
#[derive(Debug, Clone)]
pub enum RefreshEvent {
    /// Newest batch from the backend, not yet deduplicated.
    Fetched(Vec<Email>),
}

/// Handle for communicating with the refresher actor.
pub struct RefresherHandle {
    pub cmd_tx: mpsc::Sender<RefreshCommand>,
    pub event_rx: mpsc::Receiver<RefreshEvent>,
}

/// Spawn the refresher task.
pub fn spawn_refresher(
    client: Arc<ApiClient>,
    interval_secs: u64,
    cancel: CancellationToken,
) -> RefresherHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);

    tokio::spawn(refresher_loop(client, interval_secs, cancel, cmd_rx, event_tx));

    RefresherHandle { cmd_tx, event_rx }
}

/// Build a ticker that fires after one full period, not immediately.
fn arm_timer(secs: u64) -> Interval {
    let period = Duration::from_secs(secs.max(MIN_FETCH_INTERVAL_SECS));
    let mut ticker = time::interval_at(time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

enum Step {
    Cmd(Option<RefreshCommand>),
    Tick,
    Cancelled,
}

async fn refresher_loop(
    client: Arc<ApiClient>,
    interval_secs: u64,
    cancel: CancellationToken,
    mut cmd_rx: mpsc::Receiver<RefreshCommand>,
    event_tx: mpsc::Sender<RefreshEvent>,
) {
    let mut ticker = arm_timer(interval_secs);

    loop {
        let step = tokio::select! {
            biased;
            _ = cancel.cancelled() => Step::Cancelled,
            cmd = cmd_rx.recv() => Step::Cmd(cmd),
            _ = ticker.tick() => Step::Tick,
        };

        match step {
            Step::Cmd(Some(RefreshCommand::SetInterval(secs))) => {
                // Dropping the old ticker fully cancels it.
                ticker = arm_timer(secs);
                tracing::debug!(
                    "refresher: interval set to {}s",
                    secs.max(MIN_FETCH_INTERVAL_SECS)
                );
            }
            Step::Cmd(Some(RefreshCommand::RefreshNow)) | Step::Tick => {
                if !poll_once(&client, &event_tx).await {
                    break;
                }
            }
            Step::Cmd(Some(RefreshCommand::Shutdown)) | Step::Cmd(None) | Step::Cancelled => break,
        }
    }
}

/// Fetch the newest batch and forward it. Returns false once the session side
/// is gone, so a late completion can never reach a detached store.
async fn poll_once(client: &ApiClient, event_tx: &mpsc::Sender<RefreshEvent>) -> bool {
    match client.fetch_emails(0, POLL_BATCH_SIZE).await {
        Ok(emails) => {
            if event_tx.send(RefreshEvent::Fetched(emails)).await.is_err() {
                tracing::warn!("refresher: event receiver dropped");
                return false;
            }
        }
        Err(e) => {
            // The store gains nothing this cycle; the next tick retries.
            tracing::warn!("refresher: poll failed: {}", e);
        }
    }
    true
}
