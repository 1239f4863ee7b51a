//! Email Collection Store: the authoritative in-memory email list.
//!
//! All mutation goes through [`InboxState::apply`]. The session task applies
//! actions in dispatch order, so every transition only ever sees the state
//! produced by the previous one.

use super::email::{Email, EmailId, EmailSummary};

/// State transitions accepted by the store. The enum keeps the transition set
/// closed: there is no "unknown action" case to mishandle.
#[derive(Debug, Clone)]
pub enum InboxAction {
    /// Set the sidebar expansion flag to the inverse of the carried value.
    LogoClick { expanded: bool },
    /// Mark a page as current (dashboard navigation).
    PageChange(usize),
    /// Select an email by id. Membership is not validated; a stale id
    /// resolves to no selection.
    EmailChange(EmailId),
    /// Merge a batch into the list: prepend for newly polled mail, append for
    /// pagination. The reducer never deduplicates; the polling path
    /// pre-filters with [`select_new`].
    EmailsAdd { emails: Vec<Email>, prepend: bool },
    /// Replace summary text and keywords on matching ids. Last write wins.
    SummariesMerged(Vec<EmailSummary>),
    /// Clear the session (logout).
    Reset,
}

#[derive(Debug, Clone, Default)]
pub struct InboxState {
    /// Received-date descending, as supplied by the backend.
    pub emails: Vec<Email>,
    /// Selected email; key-equal to an entry in `emails` while that entry is
    /// resident.
    pub current: Option<EmailId>,
    pub expanded_sidebar: bool,
    pub cur_page: usize,
    /// False while the backend may hold older pages we have not fetched.
    pub all_loaded: bool,
}

impl InboxState {
    pub fn apply(&mut self, action: InboxAction) {
        match action {
            InboxAction::LogoClick { expanded } => self.expanded_sidebar = !expanded,
            InboxAction::PageChange(page) => self.cur_page = page,
            InboxAction::EmailChange(id) => self.current = Some(id),
            InboxAction::EmailsAdd { emails, prepend } => {
                if prepend {
                    let mut merged = emails;
                    merged.append(&mut self.emails);
                    self.emails = merged;
                } else {
                    self.emails.extend(emails);
                }
            }
            InboxAction::SummariesMerged(batch) => {
                for summary in batch {
                    if let Some(email) =
                        self.emails.iter_mut().find(|e| e.email_id == summary.email_id)
                    {
                        email.summary_text = summary.summary_text;
                        email.keywords = summary.keywords;
                    }
                }
            }
            InboxAction::Reset => *self = Self::default(),
        }
    }

    /// Resolve the current selection against the list.
    pub fn current_email(&self) -> Option<&Email> {
        let id = self.current?;
        self.emails.iter().find(|e| e.email_id == id)
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }

    pub fn contains(&self, id: EmailId) -> bool {
        self.emails.iter().any(|e| e.email_id == id)
    }

    /// The newest `n` emails (the list is already newest-first).
    pub fn top_recent(&self, n: usize) -> &[Email] {
        &self.emails[..self.emails.len().min(n)]
    }
}

/// Subset of `incoming` whose ids are not already resident in the store.
///
/// Linear scan per candidate, which is fine at the tens-of-items scale
/// polling batches run at.
pub fn select_new(existing: &InboxState, incoming: Vec<Email>) -> Vec<Email> {
    incoming
        .into_iter()
        .filter(|e| !existing.contains(e.email_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_email(id: EmailId, subject: &str) -> Email {
        Email {
            user_id: "u1".to_string(),
            email_id: id,
            sender: "ana@example.com".to_string(),
            recipients: vec!["me@example.com".to_string()],
            subject: subject.to_string(),
            body: String::new(),
            received_at: chrono::Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            category: String::new(),
            is_read: false,
            summary_text: String::new(),
            keywords: Vec::new(),
        }
    }

    #[test]
    fn prepend_batches_with_disjoint_ids_accumulate() {
        let mut state = InboxState::default();
        state.apply(InboxAction::EmailsAdd {
            emails: vec![make_email(1, "a"), make_email(2, "b")],
            prepend: true,
        });
        state.apply(InboxAction::EmailsAdd {
            emails: vec![make_email(3, "c")],
            prepend: true,
        });

        assert_eq!(state.len(), 3);
        // Newest batch lands in front of the existing list.
        assert_eq!(state.emails[0].email_id, 3);
        assert_eq!(state.emails[1].email_id, 1);
    }

    #[test]
    fn append_keeps_existing_order() {
        let mut state = InboxState::default();
        state.apply(InboxAction::EmailsAdd {
            emails: vec![make_email(1, "a")],
            prepend: false,
        });
        state.apply(InboxAction::EmailsAdd {
            emails: vec![make_email(2, "b")],
            prepend: false,
        });

        assert_eq!(state.emails[0].email_id, 1);
        assert_eq!(state.emails[1].email_id, 2);
    }

    #[test]
    fn email_change_is_idempotent() {
        let mut state = InboxState::default();
        state.apply(InboxAction::EmailsAdd {
            emails: vec![make_email(4, "a")],
            prepend: false,
        });

        state.apply(InboxAction::EmailChange(4));
        let once = state.current;
        state.apply(InboxAction::EmailChange(4));

        assert_eq!(state.current, once);
        assert_eq!(state.current_email().unwrap().email_id, 4);
    }

    #[test]
    fn select_new_drops_resident_ids() {
        let mut state = InboxState::default();
        state.apply(InboxAction::EmailsAdd {
            emails: vec![make_email(7, "old")],
            prepend: false,
        });

        let fresh = select_new(&state, vec![make_email(5, "new"), make_email(7, "dup")]);

        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].email_id, 5);
    }

    #[test]
    fn add_then_select_scenario() {
        let mut state = InboxState::default();
        assert!(state.is_empty());
        assert!(state.current.is_none());

        state.apply(InboxAction::EmailsAdd {
            emails: vec![make_email(1, "hello")],
            prepend: false,
        });
        assert_eq!(state.len(), 1);

        let id = state.emails[0].email_id;
        state.apply(InboxAction::EmailChange(id));
        assert_eq!(state.current_email().unwrap().email_id, 1);
    }

    #[test]
    fn top_recent_clamps_to_available() {
        let mut state = InboxState::default();
        state.apply(InboxAction::EmailsAdd {
            emails: (1..=3).map(|i| make_email(i, "x")).collect(),
            prepend: false,
        });
        assert_eq!(state.top_recent(5).len(), 3);

        state.apply(InboxAction::EmailsAdd {
            emails: (4..=7).map(|i| make_email(i, "y")).collect(),
            prepend: false,
        });
        let top = state.top_recent(5);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].email_id, 1);
        assert_eq!(top[4].email_id, 5);
    }

    #[test]
    fn logo_click_inverts_carried_value() {
        let mut state = InboxState::default();
        state.apply(InboxAction::LogoClick { expanded: true });
        assert!(!state.expanded_sidebar);
        state.apply(InboxAction::LogoClick { expanded: false });
        assert!(state.expanded_sidebar);
    }

    #[test]
    fn summaries_merge_by_id_last_write_wins() {
        let mut state = InboxState::default();
        state.apply(InboxAction::EmailsAdd {
            emails: vec![make_email(1, "a"), make_email(2, "b")],
            prepend: false,
        });

        state.apply(InboxAction::SummariesMerged(vec![EmailSummary {
            email_id: 1,
            summary_text: "first".to_string(),
            keywords: vec!["k1".to_string()],
        }]));
        state.apply(InboxAction::SummariesMerged(vec![
            EmailSummary {
                email_id: 1,
                summary_text: "second".to_string(),
                keywords: vec!["k2".to_string()],
            },
            // Unknown id is ignored, not an error.
            EmailSummary {
                email_id: 99,
                summary_text: "orphan".to_string(),
                keywords: Vec::new(),
            },
        ]));

        assert_eq!(state.emails[0].summary_text, "second");
        assert_eq!(state.emails[0].keywords, vec!["k2".to_string()]);
        assert!(!state.emails[1].has_summary());
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut state = InboxState::default();
        state.apply(InboxAction::EmailsAdd {
            emails: vec![make_email(1, "a")],
            prepend: false,
        });
        state.apply(InboxAction::EmailChange(1));
        state.apply(InboxAction::PageChange(3));

        state.apply(InboxAction::Reset);

        assert!(state.is_empty());
        assert!(state.current.is_none());
        assert_eq!(state.cur_page, 0);
    }
}
