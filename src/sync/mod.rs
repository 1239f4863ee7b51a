//! Background synchronization with the backend.

mod refresher;

pub use refresher::{RefreshCommand, RefreshEvent, RefresherHandle, spawn_refresher};
