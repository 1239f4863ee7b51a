//! Session event loop.
//!
//! The single consumer of the action queue and the actor event channels.
//! Every store mutation happens here, on one task, so reducer transitions
//! are serialized in dispatch order without locks.

use std::collections::HashSet;

use anyhow::Result;

use crate::ai::{EnrichCommand, EnrichEvent};
use crate::store::{Email, EmailId, InboxAction, PrefAction, select_new};
use crate::sync::{RefreshCommand, RefreshEvent};

use super::{Action, App, SessionEvent};

enum Step {
    Action(Action),
    Refresh(RefreshEvent),
    Enrich(EnrichEvent),
    Stop,
}

impl App {
    /// Run the session until cancelled.
    pub async fn run(&mut self) -> Result<()> {
        tracing::info!("Session started for {}", self.config.backend.user_id);

        self.load_initial_page().await;
        self.maybe_enrich();

        loop {
            let step = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Step::Stop,
                Some(action) = self.action_rx.recv() => Step::Action(action),
                Some(event) = self.refresher.event_rx.recv() => Step::Refresh(event),
                Some(event) = self.enricher.event_rx.recv() => Step::Enrich(event),
            };

            match step {
                Step::Action(action) => self.apply(action).await,
                Step::Refresh(event) => self.on_refresh_event(event),
                Step::Enrich(event) => self.on_enrich_event(event),
                Step::Stop => break,
            }
        }

        self.enricher.cmd_tx.send(EnrichCommand::Shutdown).await.ok();
        self.refresher
            .cmd_tx
            .send(RefreshCommand::Shutdown)
            .await
            .ok();
        tracing::info!("Session stopped");
        Ok(())
    }

    /// Apply one session action. Reducer transitions are pure; everything
    /// async (pagination fetches, timer re-arms) happens around them.
    pub(crate) async fn apply(&mut self, action: Action) {
        match action {
            Action::Inbox(action) => {
                let selecting = matches!(action, InboxAction::EmailChange(_));
                self.state.inbox.apply(action);
                if selecting {
                    match self.state.inbox.current_email() {
                        Some(email) => {
                            tracing::debug!("selected email {}: {}", email.email_id, email.subject)
                        }
                        // Selection is not validated against the list; a
                        // stale id just resolves to nothing.
                        None => tracing::debug!("selection does not resolve to a fetched email"),
                    }
                }
                self.maybe_enrich();
            }
            Action::Pref(action) => self.apply_pref(action).await,
            Action::Scroll(pos) => {
                if pos.at_bottom() {
                    self.advance_pagination().await;
                }
            }
            Action::SearchChanged(query) => {
                if self.state.search.set_query(&query) {
                    tracing::debug!("search changed: {:?}", self.state.search.query());
                    self.state.page.reset();
                    self.maybe_enrich();
                }
            }
            Action::Refresh => {
                self.refresher
                    .cmd_tx
                    .send(RefreshCommand::RefreshNow)
                    .await
                    .ok();
            }
            Action::Status => self.log_status(),
            Action::Resize(page_size) => {
                self.state.page.set_page_size(page_size);
                self.maybe_enrich();
            }
            Action::Logout => self.clear_session(),
        }
    }

    /// Apply a preference mutation; interval changes re-arm the poll timer.
    async fn apply_pref(&mut self, action: PrefAction) {
        let interval_before = self.prefs.get().fetch_interval_secs;
        let prefs = self.prefs.apply(action).clone();

        if prefs.fetch_interval_secs != interval_before {
            self.refresher
                .cmd_tx
                .send(RefreshCommand::SetInterval(prefs.fetch_interval_secs))
                .await
                .ok();
        }
        // Turning summaries on may expose unsummarized mail.
        if prefs.show_summaries {
            self.maybe_enrich();
        }
    }

    /// First page load at session start.
    async fn load_initial_page(&mut self) {
        self.state.status.loading = true;
        let limit = self.state.page.page_size();

        match self.backend.fetch_emails(0, limit).await {
            Ok(emails) => {
                self.state.inbox.all_loaded = emails.len() < limit;
                self.state.inbox.apply(InboxAction::EmailsAdd {
                    emails,
                    prepend: false,
                });
                if self.state.inbox.is_empty() {
                    tracing::info!("Inbox is empty");
                } else {
                    tracing::info!("Loaded {} email(s); most recent:", self.state.inbox.len());
                    for email in self.state.top_recent() {
                        tracing::info!("  {} - {}", email.sender, email.subject);
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Initial email fetch failed: {}", e);
                self.state.status.set_error(e);
            }
        }
        self.state.status.loading = false;
    }

    /// Advance the paginator: fetch another backend page when upstream mail
    /// remains, then reveal one more page of the (filtered) list.
    async fn advance_pagination(&mut self) {
        let has_more_local = self.state.has_more_local();
        let has_upstream = !self.state.inbox.all_loaded;
        if !has_more_local && !has_upstream {
            return;
        }

        if has_upstream {
            self.fetch_more().await;
        }
        self.state.page.advance();
        tracing::debug!(
            "pagination advanced to {} revealed page(s)",
            self.state.page.revealed_pages()
        );
        self.maybe_enrich();
    }

    /// Append the next backend page. Appends are assumed monotonic and
    /// non-overlapping, so no dedup on this path.
    async fn fetch_more(&mut self) {
        let offset = self.state.inbox.len();
        let limit = self.state.page.page_size();

        match self.backend.fetch_emails(offset, limit).await {
            Ok(emails) => {
                self.state.inbox.all_loaded = emails.len() < limit;
                if !emails.is_empty() {
                    self.state.inbox.apply(InboxAction::EmailsAdd {
                        emails,
                        prepend: false,
                    });
                }
            }
            Err(e) => {
                // Reveal still advances; the next scroll retries the fetch.
                tracing::warn!("Fetch-more failed: {}", e);
            }
        }
    }

    /// Handle a polled batch: keep only ids not already resident, prepend
    /// them and signal interested views.
    pub(crate) fn on_refresh_event(&mut self, event: RefreshEvent) {
        match event {
            RefreshEvent::Fetched(batch) => {
                let fresh = select_new(&self.state.inbox, batch);
                if fresh.is_empty() {
                    return;
                }
                let count = fresh.len();
                self.state.inbox.apply(InboxAction::EmailsAdd {
                    emails: fresh,
                    prepend: true,
                });
                self.state
                    .status
                    .set_message(format!("{} new email(s)", count));
                let _ = self.events.send(SessionEvent::NewMail { count });
                self.maybe_enrich();
            }
        }
    }

    /// Merge finished summaries, or release failed ids back to the pool.
    pub(crate) fn on_enrich_event(&mut self, event: EnrichEvent) {
        match event {
            EnrichEvent::Ready(summaries) => {
                let count = summaries.len();
                for summary in &summaries {
                    self.enrich.in_flight.remove(&summary.email_id);
                }
                self.state.inbox.apply(InboxAction::SummariesMerged(summaries));
                if count > 0 {
                    let _ = self.events.send(SessionEvent::SummariesReady { count });
                }
            }
            EnrichEvent::Failed { ids, error } => {
                for id in ids {
                    self.enrich.in_flight.remove(&id);
                }
                tracing::warn!("Summary batch failed: {}", error);
            }
        }
    }

    /// Scan the visible page for unsummarized mail and request one batch.
    /// Idempotent: summarized and in-flight ids are skipped.
    pub(crate) fn maybe_enrich(&mut self) {
        if !self.prefs.get().show_summaries {
            return;
        }

        let visible = self.state.visible();
        let ids = unsummarized_ids(&visible, &self.enrich.in_flight);
        if ids.is_empty() {
            return;
        }

        self.enrich.in_flight.extend(ids.iter().copied());
        if let Err(e) = self
            .enricher
            .cmd_tx
            .try_send(EnrichCommand::Summarize { ids: ids.clone() })
        {
            // Roll back so a later scan can request these ids again.
            for id in &ids {
                self.enrich.in_flight.remove(id);
            }
            tracing::warn!("enricher queue unavailable: {}", e);
        }
    }

    /// Log a snapshot of the session state (the `status` stdin command).
    fn log_status(&self) {
        let inbox = &self.state.inbox;
        tracing::info!(
            "{} email(s) loaded, {} visible, {} revealed page(s), page marker {}, \
             sidebar expanded: {}, all loaded: {}, {} summary request(s) in flight",
            inbox.len(),
            self.state.visible().len(),
            self.state.page.revealed_pages(),
            inbox.cur_page,
            inbox.expanded_sidebar,
            inbox.all_loaded,
            self.enrich.in_flight.len(),
        );
        if let Some(email) = inbox.current_email() {
            tracing::info!("selected: {} - {}", email.email_id, email.subject);
        }
        if self.state.status.loading {
            tracing::info!("a fetch is in progress");
        }
        if !self.state.status.message.is_empty() {
            tracing::info!("last status: {}", self.state.status.message);
        }
        if let Some(ref error) = self.state.status.error {
            tracing::info!("last error: {}", error);
        }
    }

    /// Reset all session-owned state (logout).
    pub(crate) fn clear_session(&mut self) {
        self.state.inbox.apply(InboxAction::Reset);
        self.state.page.reset();
        self.state.search.set_query("");
        self.state.status = Default::default();
        self.enrich.clear();
        tracing::info!("Session cleared");
    }
}

/// Ids on the visible page still missing a summary and not already requested.
fn unsummarized_ids(visible: &[&Email], in_flight: &HashSet<EmailId>) -> Vec<EmailId> {
    visible
        .iter()
        .filter(|e| !e.has_summary())
        .map(|e| e.email_id)
        .filter(|id| !in_flight.contains(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_email(id: EmailId, summary: &str) -> Email {
        Email {
            user_id: "u1".to_string(),
            email_id: id,
            sender: "ana@example.com".to_string(),
            recipients: Vec::new(),
            subject: "subject".to_string(),
            body: String::new(),
            received_at: chrono::Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            category: String::new(),
            is_read: false,
            summary_text: summary.to_string(),
            keywords: Vec::new(),
        }
    }

    #[test]
    fn unsummarized_ids_skips_summarized_and_in_flight() {
        let emails = [
            make_email(1, ""),
            make_email(2, "already summarized"),
            make_email(3, ""),
        ];
        let visible: Vec<&Email> = emails.iter().collect();

        let mut in_flight = HashSet::new();
        in_flight.insert(3);

        assert_eq!(unsummarized_ids(&visible, &in_flight), vec![1]);
    }

    #[test]
    fn unsummarized_ids_is_empty_when_everything_is_covered() {
        let emails = [make_email(1, "done")];
        let visible: Vec<&Email> = emails.iter().collect();
        assert!(unsummarized_ids(&visible, &HashSet::new()).is_empty());
    }
}
