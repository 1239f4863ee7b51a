//! Backend API client.

use reqwest::{Client, Method, StatusCode};
use serde::Serialize;

use crate::store::{Email, EmailId, EmailSummary, UserPreferences};

use super::ApiError;

/// HTTP client for the email-fetch, summary and preferences endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryRequest<'a> {
    email_ids: &'a [EmailId],
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let mut request = self.client.request(method, url);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }
        request
    }

    /// Fetch one page of emails, newest first. Overlapping ranges are fine;
    /// the polling path deduplicates by id before merging.
    pub async fn fetch_emails(&self, offset: usize, limit: usize) -> Result<Vec<Email>, ApiError> {
        let url = format!("{}/emails?offset={}&limit={}", self.base_url, offset, limit);
        let response = self.request(Method::GET, &url).send().await?;
        let response = Self::check_status(response).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    /// Request summaries for a batch of emails. Results align by id.
    pub async fn fetch_summaries(&self, ids: &[EmailId]) -> Result<Vec<EmailSummary>, ApiError> {
        let url = format!("{}/summaries", self.base_url);
        let response = self
            .request(Method::POST, &url)
            .json(&SummaryRequest { email_ids: ids })
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    /// Persist the full preferences object. The ack body is ignored.
    pub async fn save_preferences(
        &self,
        user_id: &str,
        prefs: &UserPreferences,
    ) -> Result<(), ApiError> {
        let url = format!("{}/users/{}/preferences", self.base_url, user_id);
        let response = self.request(Method::PUT, &url).json(prefs).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// Fetch the remotely stored preferences, if any.
    pub async fn fetch_preferences(
        &self,
        user_id: &str,
    ) -> Result<Option<UserPreferences>, ApiError> {
        let url = format!("{}/users/{}/preferences", self.base_url, user_id);
        let response = self.request(Method::GET, &url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check_status(response).await?;
        response.json().await.map(Some).map_err(ApiError::Decode)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::Status { status, body })
        }
    }
}
