//! In-memory session stores.
//!
//! Ownership is strict: the inbox store owns the email list and selection,
//! the preferences store owns user preferences, and the paginator owns only
//! its page counter.

pub mod email;
pub mod inbox;
pub mod pagination;
pub mod prefs;
pub mod search;

pub use email::{Email, EmailId, EmailSummary};
pub use inbox::{InboxAction, InboxState, select_new};
pub use pagination::{PageView, ScrollPos};
pub use prefs::{PrefAction, PrefsStore, Theme, UserPreferences};
pub use search::SearchFilter;
