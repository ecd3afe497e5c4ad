use std::future::Future;

use reqwest::{header::CONTENT_TYPE, Client, StatusCode};

use crate::error::ForwardError;

/// Status and raw body of the webhook's answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: String,
}

/// The outbound side of the relay: one JSON POST, no retry.
pub trait Upstream: Send + Sync {
    fn post_json(
        &self,
        url: &str,
        body: Vec<u8>,
    ) -> impl Future<Output = Result<UpstreamResponse, ForwardError>> + Send;
}

#[derive(Clone, Debug)]
pub struct HttpUpstream {
    http_client: Client,
}

impl HttpUpstream {
    /// An upstream on a plain client; use [`HttpUpstream::with_client`] to share one.
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(http_client: Client) -> Self {
        Self { http_client }
    }
}

impl Default for HttpUpstream {
    fn default() -> Self {
        Self::new()
    }
}

impl Upstream for HttpUpstream {
    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<UpstreamResponse, ForwardError> {
        let response = self
            .http_client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(ForwardError::ResponseBodyError)?;
        Ok(UpstreamResponse { status, body })
    }
}
