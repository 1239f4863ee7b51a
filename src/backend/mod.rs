//! HTTP client for the summarization backend.
//!
//! The only collaborator the core talks to: email pages, summary batches and
//! preference persistence all live behind one API.

mod client;

pub use client::ApiClient;

use thiserror::Error;

/// Errors at the backend API seam.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("malformed response body: {0}")]
    Decode(#[source] reqwest::Error),
}
