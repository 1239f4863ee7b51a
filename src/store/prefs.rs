//! User preferences with remote persistence.
//!
//! Preferences are local-first: the in-memory copy is authoritative, and every
//! mutation queues exactly one persist of the full updated object. Persistence
//! failures are logged and never retried; the in-memory copy stays correct
//! either way.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::constants::{DEFAULT_FETCH_INTERVAL_SECS, MIN_FETCH_INTERVAL_SECS};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub show_summaries: bool,
    pub fetch_interval_secs: u64,
    pub theme: Theme,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            show_summaries: true,
            fetch_interval_secs: DEFAULT_FETCH_INTERVAL_SECS,
            theme: Theme::default(),
        }
    }
}

/// Preference mutations.
#[derive(Debug, Clone)]
pub enum PrefAction {
    /// Flip summary visibility based on the current stored value.
    ToggleSummaries,
    /// Set the polling interval, clamped to the supported minimum.
    SetFetchInterval(u64),
    SetTheme(Theme),
}

/// Pure transition: current preferences + action -> next preferences.
pub fn reduce(mut prefs: UserPreferences, action: PrefAction) -> UserPreferences {
    match action {
        PrefAction::ToggleSummaries => prefs.show_summaries = !prefs.show_summaries,
        PrefAction::SetFetchInterval(secs) => {
            prefs.fetch_interval_secs = secs.max(MIN_FETCH_INTERVAL_SECS)
        }
        PrefAction::SetTheme(theme) => prefs.theme = theme,
    }
    prefs
}

/// The Preferences Store: owned preferences plus the persist queue.
#[derive(Debug)]
pub struct PrefsStore {
    prefs: UserPreferences,
    persist_tx: mpsc::Sender<UserPreferences>,
}

impl PrefsStore {
    pub fn new(initial: UserPreferences, persist_tx: mpsc::Sender<UserPreferences>) -> Self {
        Self {
            prefs: initial,
            persist_tx,
        }
    }

    pub fn get(&self) -> &UserPreferences {
        &self.prefs
    }

    /// Apply a mutation and queue one persist of the full updated object.
    pub fn apply(&mut self, action: PrefAction) -> &UserPreferences {
        self.prefs = reduce(self.prefs.clone(), action);
        if let Err(e) = self.persist_tx.try_send(self.prefs.clone()) {
            tracing::warn!("Preference persist queue unavailable: {}", e);
        }
        &self.prefs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_the_current_value() {
        let prefs = UserPreferences::default();
        assert!(prefs.show_summaries);
        let prefs = reduce(prefs, PrefAction::ToggleSummaries);
        assert!(!prefs.show_summaries);
        let prefs = reduce(prefs, PrefAction::ToggleSummaries);
        assert!(prefs.show_summaries);
    }

    #[test]
    fn fetch_interval_is_clamped_to_minimum() {
        let prefs = reduce(UserPreferences::default(), PrefAction::SetFetchInterval(0));
        assert_eq!(prefs.fetch_interval_secs, MIN_FETCH_INTERVAL_SECS);
        let prefs = reduce(prefs, PrefAction::SetFetchInterval(120));
        assert_eq!(prefs.fetch_interval_secs, 120);
    }

    #[test]
    fn each_mutation_persists_one_full_snapshot() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut store = PrefsStore::new(UserPreferences::default(), tx);

        store.apply(PrefAction::ToggleSummaries);
        store.apply(PrefAction::SetFetchInterval(120));
        store.apply(PrefAction::SetTheme(Theme::Dark));

        let first = rx.try_recv().unwrap();
        assert!(!first.show_summaries);
        assert_eq!(first.fetch_interval_secs, DEFAULT_FETCH_INTERVAL_SECS);

        // Full object, not a diff: the second snapshot still carries the
        // toggled flag from the first mutation.
        let second = rx.try_recv().unwrap();
        assert!(!second.show_summaries);
        assert_eq!(second.fetch_interval_secs, 120);

        let third = rx.try_recv().unwrap();
        assert_eq!(third.theme, Theme::Dark);
        assert_eq!(third.fetch_interval_secs, 120);

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn persist_failure_keeps_memory_copy() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let mut store = PrefsStore::new(UserPreferences::default(), tx);

        let prefs = store.apply(PrefAction::SetTheme(Theme::Light)).clone();
        assert_eq!(prefs.theme, Theme::Light);
        assert_eq!(store.get().theme, Theme::Light);
    }
}
