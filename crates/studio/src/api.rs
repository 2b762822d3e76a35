//! REST client for the Studio HTTP endpoints.

use async_trait::async_trait;

use zimage_core::job::JobSnapshot;
use zimage_core::params::GenerationRequest;
use zimage_core::service::{JobService, ServiceError};

/// HTTP client for a single Studio backend.
pub struct StudioClient {
    client: reqwest::Client,
    base_url: String,
}

/// Errors from the Studio REST layer.
#[derive(Debug, thiserror::Error)]
pub enum StudioClientError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Studio API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl StudioClient {
    /// Create a new client for the backend at `base_url`,
    /// e.g. `http://localhost:8000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling across multiple backends).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Base HTTP URL of the backend.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a generation request.
    ///
    /// Sends `POST /api/generate`. The backend queues the job and
    /// returns a sparse acknowledgment carrying at least the new id.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<JobSnapshot, StudioClientError> {
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch the job history, newest first.
    ///
    /// Sends `GET /api/history`; the backend caps the result at its own
    /// default (50) when `limit` is `None`.
    pub async fn history(&self, limit: Option<u32>) -> Result<Vec<JobSnapshot>, StudioClientError> {
        let mut request = self.client.get(format!("{}/api/history", self.base_url));
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }

        Self::parse_response(request.send().await?).await
    }

    /// Fetch current status for one job.
    ///
    /// Sends `GET /api/status/{id}`.
    pub async fn status(&self, id: &str) -> Result<JobSnapshot, StudioClientError> {
        let response = self
            .client
            .get(format!("{}/api/status/{}", self.base_url, id))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Delete a job and its stored image.
    ///
    /// Sends `DELETE /api/history/{id}`. The response body is not needed.
    pub async fn delete(&self, id: &str) -> Result<(), StudioClientError> {
        let response = self
            .client
            .delete(format!("{}/api/history/{}", self.base_url, id))
            .send()
            .await?;

        Self::check_status(response).await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`StudioClientError::Api`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, StudioClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(StudioClientError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, StudioClientError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), StudioClientError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

impl From<StudioClientError> for ServiceError {
    fn from(err: StudioClientError) -> Self {
        match err {
            StudioClientError::Request(e) => ServiceError::Transport(e.to_string()),
            StudioClientError::Api { status, body } => ServiceError::Api { status, body },
        }
    }
}

#[async_trait]
impl JobService for StudioClient {
    async fn submit(&self, request: &GenerationRequest) -> Result<JobSnapshot, ServiceError> {
        Ok(self.generate(request).await?)
    }

    async fn list_jobs(&self, limit: Option<u32>) -> Result<Vec<JobSnapshot>, ServiceError> {
        Ok(self.history(limit).await?)
    }

    async fn job_status(&self, id: &str) -> Result<JobSnapshot, ServiceError> {
        Ok(self.status(id).await?)
    }

    async fn delete_job(&self, id: &str) -> Result<(), ServiceError> {
        Ok(self.delete(id).await?)
    }
}
