// HTTP transport against the application server
use crate::application::dashboard_transport::{DashboardTransport, TransportError};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CACHE_CONTROL, HeaderMap, HeaderValue};
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Locators are server-relative; absolute URLs pass through.
    fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            format!("{}/{}", self.base_url, url)
        }
    }

    async fn read_body(url: &str, response: reqwest::Response) -> Result<String, TransportError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        response.text().await.map_err(|e| network_error(url, e))
    }
}

fn network_error(url: &str, e: reqwest::Error) -> TransportError {
    TransportError::Network {
        url: url.to_string(),
        reason: e.to_string(),
    }
}

#[async_trait]
impl DashboardTransport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String, TransportError> {
        let target = self.resolve(url);
        tracing::debug!("GET {}", target);
        let response = self
            .client
            .get(&target)
            .send()
            .await
            .map_err(|e| network_error(url, e))?;
        Self::read_body(url, response).await
    }

    async fn post(&self, url: &str, body: &Value) -> Result<String, TransportError> {
        let target = self.resolve(url);
        tracing::debug!("POST {} {}", target, body);
        let response = self
            .client
            .post(&target)
            .json(body)
            .send()
            .await
            .map_err(|e| network_error(url, e))?;
        Self::read_body(url, response).await
    }
}
