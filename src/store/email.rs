//! Email value objects shared by the stores and the backend client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity key for an email; unique within the collection store.
pub type EmailId = u64;

/// A single email as served by the backend (camelCase on the wire).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    pub user_id: String,
    pub email_id: EmailId,
    pub sender: String,
    #[serde(default)]
    pub recipients: Vec<String>,
    pub subject: String,
    #[serde(default)]
    pub body: String,
    pub received_at: DateTime<Utc>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub is_read: bool,
    /// Empty until the enricher merges a summary in.
    #[serde(default)]
    pub summary_text: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Email {
    /// Whether a summary has been merged in yet.
    pub fn has_summary(&self) -> bool {
        !self.summary_text.is_empty()
    }
}

/// Summary payload returned by the summarization backend, aligned by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSummary {
    pub email_id: EmailId,
    pub summary_text: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}
