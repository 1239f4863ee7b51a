//! Summary enricher actor.
//!
//! Receives batches of email ids, requests summaries from the backend with
//! retry, and reports results back to the session task. The session keeps the
//! per-id in-flight guard; `Failed` events release ids so a later scan can
//! request them again.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::actor::{RetryConfig, with_retry};
use crate::backend::ApiClient;
use crate::constants::CHANNEL_CAPACITY;
use crate::store::{EmailId, EmailSummary};

fn summary_retry_config() -> RetryConfig {
    RetryConfig::new(2, Duration::from_millis(500), Duration::from_secs(5))
}

/// Commands accepted by the enricher actor.
#[derive(Debug)]
pub enum EnrichCommand {
    /// Request summaries for a batch of unsummarized emails.
    Summarize { ids: Vec<EmailId> },
    Shutdown,
}

/// Events emitted by the enricher actor.
#[derive(Debug, Clone)]
pub enum EnrichEvent {
    /// A batch of summaries is ready to merge.
    Ready(Vec<EmailSummary>),
    /// A batch failed after retries; its ids return to the fetchable pool.
    Failed { ids: Vec<EmailId>, error: String },
}

/// Handle for communicating with the enricher actor.
pub struct EnricherHandle {
    pub cmd_tx: mpsc::Sender<EnrichCommand>,
    pub event_rx: mpsc::Receiver<EnrichEvent>,
}

/// Spawn the enricher task.
pub fn spawn_enricher(client: Arc<ApiClient>, cancel: CancellationToken) -> EnricherHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);

    tokio::spawn(enricher_loop(client, cancel, cmd_rx, event_tx));

    EnricherHandle { cmd_tx, event_rx }
}

async fn enricher_loop(
    client: Arc<ApiClient>,
    cancel: CancellationToken,
    mut cmd_rx: mpsc::Receiver<EnrichCommand>,
    event_tx: mpsc::Sender<EnrichEvent>,
) {
    loop {
        let cmd = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            cmd = cmd_rx.recv() => match cmd {
                Some(cmd) => cmd,
                None => break,
            },
        };

        match cmd {
            EnrichCommand::Summarize { ids } => {
                if ids.is_empty() {
                    continue;
                }
                tracing::debug!("enricher: requesting {} summaries", ids.len());

                let retry = summary_retry_config();
                let result = with_retry(&retry, || client.fetch_summaries(&ids)).await;

                let event = match result {
                    Ok(summaries) => EnrichEvent::Ready(summaries),
                    Err(e) => EnrichEvent::Failed {
                        ids,
                        error: e.to_string(),
                    },
                };
                if event_tx.send(event).await.is_err() {
                    tracing::warn!("enricher: event receiver dropped");
                    break;
                }
            }
            EnrichCommand::Shutdown => break,
        }
    }
}
