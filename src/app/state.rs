//! Session state types.
//!
//! All state types live here to keep a clean dependency: view layers read
//! from the session state, never the other way around.

use crate::constants::TOP_RECENT_COUNT;
use crate::store::{Email, InboxState, PageView, SearchFilter};

/// Loading, error, and status message state for the session.
#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub loading: bool,
    pub error: Option<String>,
    pub message: String,
}

impl StatusState {
    pub fn set_error(&mut self, error: impl ToString) {
        self.error = Some(error.to_string());
    }

    pub fn set_message(&mut self, msg: impl ToString) {
        self.message = msg.to_string();
    }
}

/// Aggregate state owned by the session task.
#[derive(Debug)]
pub struct SessionState {
    pub inbox: InboxState,
    pub page: PageView,
    pub search: SearchFilter,
    pub status: StatusState,
}

impl SessionState {
    pub fn new(page_size: usize) -> Self {
        Self {
            inbox: InboxState::default(),
            page: PageView::new(page_size),
            search: SearchFilter::default(),
            status: StatusState::default(),
        }
    }

    /// The filtered, revealed prefix of the email list - what a view renders.
    pub fn visible(&self) -> Vec<&Email> {
        let filtered = self.search.filter(&self.inbox.emails);
        let count = self.page.visible_count(filtered.len());
        filtered.into_iter().take(count).collect()
    }

    /// Whether more filtered entries exist beyond the visible prefix.
    pub fn has_more_local(&self) -> bool {
        self.page.has_more_local(self.filtered_len())
    }

    /// Newest emails for the dashboard digest.
    pub fn top_recent(&self) -> &[Email] {
        self.inbox.top_recent(TOP_RECENT_COUNT)
    }

    fn filtered_len(&self) -> usize {
        if !self.search.is_active() {
            return self.inbox.len();
        }
        self.inbox
            .emails
            .iter()
            .filter(|e| self.search.matches(e))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InboxAction;
    use chrono::TimeZone;

    fn make_email(id: u64, subject: &str) -> Email {
        Email {
            user_id: "u1".to_string(),
            email_id: id,
            sender: "ana@example.com".to_string(),
            recipients: Vec::new(),
            subject: subject.to_string(),
            body: String::new(),
            received_at: chrono::Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            category: String::new(),
            is_read: false,
            summary_text: String::new(),
            keywords: Vec::new(),
        }
    }

    fn session_with_emails(page_size: usize, count: u64) -> SessionState {
        let mut state = SessionState::new(page_size);
        state.inbox.apply(InboxAction::EmailsAdd {
            emails: (1..=count).map(|i| make_email(i, "mail")).collect(),
            prepend: false,
        });
        state
    }

    #[test]
    fn visible_is_the_revealed_prefix() {
        let mut state = session_with_emails(10, 30);
        assert_eq!(state.visible().len(), 10);
        assert!(state.has_more_local());

        state.page.advance();
        assert_eq!(state.visible().len(), 20);
    }

    #[test]
    fn empty_inbox_renders_nothing() {
        let state = SessionState::new(10);
        assert!(state.visible().is_empty());
        assert!(!state.has_more_local());
    }

    #[test]
    fn search_narrows_the_visible_set() {
        let mut state = session_with_emails(10, 30);
        state.inbox.apply(InboxAction::EmailsAdd {
            emails: vec![make_email(100, "standup notes")],
            prepend: true,
        });

        state.search.set_query("standup");
        state.page.reset();

        let visible = state.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].email_id, 100);
        assert!(!state.has_more_local());
    }
}
