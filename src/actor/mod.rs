//! Shared actor utilities.

mod retry;

pub use retry::{RetryConfig, with_retry};
