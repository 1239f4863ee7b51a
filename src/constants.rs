//! Application-wide constants for tuning and configuration
//!
//! Centralizes magic numbers to make them discoverable and configurable.

/// Number of emails fetched per backend page and revealed per scroll step.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Newest-mail batch size requested by the polling refresher.
/// Deduplicated by id against the resident list, so overlap is harmless.
pub const POLL_BATCH_SIZE: usize = 20;

/// Polling interval in seconds used until a stored preference is known.
pub const DEFAULT_FETCH_INTERVAL_SECS: u64 = 60;

/// Lower bound for the polling interval preference.
pub const MIN_FETCH_INTERVAL_SECS: u64 = 1;

/// Scroll-offset tolerance in layout units when detecting the list bottom.
/// Absorbs floating-point and layout rounding.
pub const SCROLL_BOTTOM_TOLERANCE: f64 = 1.0;

/// Number of emails surfaced by the recent-mail digest.
pub const TOP_RECENT_COUNT: usize = 5;

/// Bound for actor command and event channels.
pub const CHANNEL_CAPACITY: usize = 32;

/// Bound for the queue of pending preference persists.
pub const PERSIST_QUEUE_CAPACITY: usize = 16;
