//! Query filter over the email list.
//!
//! Substring matching over subject, sender and keywords using an
//! aho-corasick automaton, rebuilt only when the query changes.

use aho_corasick::AhoCorasick;

use super::email::Email;

#[derive(Debug, Default)]
pub struct SearchFilter {
    query: String,
    automaton: Option<AhoCorasick>,
}

impl SearchFilter {
    /// Update the query. Returns true if it actually changed.
    pub fn set_query(&mut self, query: &str) -> bool {
        let normalized = query.trim().to_lowercase();
        if normalized == self.query {
            return false;
        }
        self.automaton = if normalized.is_empty() {
            None
        } else {
            AhoCorasick::new([&normalized]).ok()
        };
        self.query = normalized;
        true
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_active(&self) -> bool {
        self.automaton.is_some()
    }

    pub fn matches(&self, email: &Email) -> bool {
        let Some(ref ac) = self.automaton else {
            return true;
        };
        ac.is_match(&email.subject.to_lowercase())
            || ac.is_match(&email.sender.to_lowercase())
            || email.keywords.iter().any(|k| ac.is_match(&k.to_lowercase()))
    }

    /// Filtered view of the list, original order preserved.
    pub fn filter<'a>(&self, emails: &'a [Email]) -> Vec<&'a Email> {
        emails.iter().filter(|e| self.matches(e)).collect()
    }
}
