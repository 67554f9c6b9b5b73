// Transport trait for dashboard server round-trips
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    #[error("Server Request at '{url}' failed with status {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("Server Request to '{url}' failed with a network error: {reason}")]
    Network { url: String, reason: String },
}

#[async_trait]
pub trait DashboardTransport: Send + Sync {
    /// Fetch activity content (or any other text resource).
    async fn get(&self, url: &str) -> Result<String, TransportError>;

    /// POST a JSON body and return the raw response text.
    async fn post(&self, url: &str, body: &Value) -> Result<String, TransportError>;
}
