//! Session core - owns the stores and coordinates the background actors.

mod event_loop;
pub mod state;

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use crate::ai::{EnricherHandle, spawn_enricher};
use crate::backend::ApiClient;
use crate::config::Config;
use crate::constants::{CHANNEL_CAPACITY, PERSIST_QUEUE_CAPACITY};
use crate::store::{
    EmailId, InboxAction, PrefAction, PrefsStore, ScrollPos, UserPreferences,
};
use crate::sync::{RefresherHandle, spawn_refresher};
use state::SessionState;

/// Session-level actions. Applied strictly in dispatch order: one queue, one
/// consumer, no other mutation path into the stores.
#[derive(Debug, Clone)]
pub enum Action {
    Inbox(InboxAction),
    Pref(PrefAction),
    /// The list container scrolled; reaching the bottom advances pagination.
    Scroll(ScrollPos),
    /// The search query changed; re-paginates the filtered view from the top.
    SearchChanged(String),
    /// Poll for new mail immediately.
    Refresh,
    /// Log a snapshot of the session state.
    Status,
    /// The viewport changed and the page size was recomputed.
    Resize(usize),
    /// Clear the session state (logout).
    Logout,
}

/// Events broadcast to interested views.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Polling discovered mail not previously in the store.
    NewMail { count: usize },
    /// A batch of summaries was merged into the store.
    SummariesReady { count: usize },
}

/// Per-id guard for summary requests currently in flight.
#[derive(Debug, Default)]
pub struct EnrichState {
    pub in_flight: HashSet<EmailId>,
}

impl EnrichState {
    /// Clear all tracking (used on logout).
    pub fn clear(&mut self) {
        self.in_flight.clear();
    }
}

pub struct App {
    pub(crate) config: Config,
    pub(crate) backend: Arc<ApiClient>,
    pub(crate) state: SessionState,
    pub(crate) prefs: PrefsStore,
    pub(crate) enrich: EnrichState,
    pub(crate) refresher: RefresherHandle,
    pub(crate) enricher: EnricherHandle,
    pub(crate) action_tx: mpsc::Sender<Action>,
    pub(crate) action_rx: mpsc::Receiver<Action>,
    pub(crate) events: broadcast::Sender<SessionEvent>,
    pub(crate) cancel: CancellationToken,
}

impl App {
    /// Create the session: fetch the remotely stored preferences (falling
    /// back to config defaults), then spawn the background actors.
    pub async fn new(config: Config) -> Result<Self> {
        let backend = Arc::new(ApiClient::new(
            config.backend.url.clone(),
            config.backend.token.clone(),
        ));

        // A stored remote copy wins over config defaults.
        let initial_prefs = match backend.fetch_preferences(&config.backend.user_id).await {
            Ok(Some(prefs)) => prefs,
            Ok(None) => config.default_preferences(),
            Err(e) => {
                tracing::warn!("Could not fetch stored preferences: {}", e);
                config.default_preferences()
            }
        };

        let cancel = CancellationToken::new();

        let (persist_tx, persist_rx) = mpsc::channel(PERSIST_QUEUE_CAPACITY);
        spawn_persister(
            Arc::clone(&backend),
            config.backend.user_id.clone(),
            persist_rx,
        );

        let refresher = spawn_refresher(
            Arc::clone(&backend),
            initial_prefs.fetch_interval_secs,
            cancel.clone(),
        );
        let enricher = spawn_enricher(Arc::clone(&backend), cancel.clone());

        let (action_tx, action_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (events, _) = broadcast::channel(CHANNEL_CAPACITY);

        let state = SessionState::new(config.sync.page_size);

        Ok(Self {
            config,
            backend,
            state,
            prefs: PrefsStore::new(initial_prefs, persist_tx),
            enrich: EnrichState::default(),
            refresher,
            enricher,
            action_tx,
            action_rx,
            events,
            cancel,
        })
    }

    /// Queue handle for dispatching session actions.
    pub fn handle(&self) -> mpsc::Sender<Action> {
        self.action_tx.clone()
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Token that stops the session and its actors.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

/// Forward queued preference snapshots to the backend. Fire-and-forget: a
/// failed save is logged and never retried.
fn spawn_persister(
    backend: Arc<ApiClient>,
    user_id: String,
    mut persist_rx: mpsc::Receiver<UserPreferences>,
) {
    tokio::spawn(async move {
        while let Some(prefs) = persist_rx.recv().await {
            if let Err(e) = backend.save_preferences(&user_id, &prefs).await {
                tracing::warn!("Preference persist failed: {}", e);
            }
        }
    });
}
