use reqwest::{header::HeaderName, Method, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::{
    constants::CORS_HEADERS,
    error::{ForwardError, RelayError},
    RelayConfig, Upstream, UpstreamResponse,
};

/// Interpreted answer of the webhook.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RelayResult {
    pub success: bool,
    pub upstream_status: u16,
    /// Parsed JSON body, or `{ "raw": <text> }` when the body is not JSON.
    pub body: Value,
}

impl From<UpstreamResponse> for RelayResult {
    fn from(response: UpstreamResponse) -> Self {
        Self {
            success: response.status.is_success(),
            upstream_status: response.status.as_u16(),
            body: interpret_body(&response.body),
        }
    }
}

/// Read a webhook body as JSON, falling back to wrapping the raw text.
pub fn interpret_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "raw": text }))
}

/// What the relay sends back to its caller.
#[derive(Clone, Debug, PartialEq)]
pub struct RelayResponse {
    pub status: StatusCode,
    /// `None` for an empty body.
    pub body: Option<Value>,
}

impl RelayResponse {
    pub fn preflight() -> Self {
        Self {
            status: StatusCode::OK,
            body: None,
        }
    }

    /// Headers to set on the response, whatever its status.
    pub fn headers(&self) -> [(HeaderName, &'static str); 4] {
        CORS_HEADERS
    }
}

impl From<RelayResult> for RelayResponse {
    fn from(result: RelayResult) -> Self {
        Self {
            status: StatusCode::OK,
            body: Some(json!({ "success": true, "n8n_response": result.body })),
        }
    }
}

impl From<RelayError> for RelayResponse {
    fn from(e: RelayError) -> Self {
        Self {
            status: e.status(),
            body: Some(e.body()),
        }
    }
}

/// Handle one request to the relay endpoint.
///
/// Preflight requests are answered before anything else. Every other outcome, including a
/// transport failure, becomes a JSON response; this never panics on bad input.
pub async fn handle<U: Upstream>(
    method: &Method,
    body: &[u8],
    config: &RelayConfig,
    upstream: &U,
) -> RelayResponse {
    if *method == Method::OPTIONS {
        return RelayResponse::preflight();
    }
    match forward(method, body, config, upstream).await {
        Ok(result) => result.into(),
        Err(e) => report(e),
    }
}

/// Handle a request whose body could not be received, e.g. because it was too large.
///
/// Method and configuration are checked in the same order as [`handle`], so only a request
/// that would have been forwarded reports the unreadable body.
pub fn handle_unreadable(method: &Method, reason: &str, config: &RelayConfig) -> RelayResponse {
    if *method == Method::OPTIONS {
        return RelayResponse::preflight();
    }
    let e = match admit(method, config) {
        Ok(_) => ForwardError::UnreadableBody(reason.to_owned()).into(),
        Err(e) => e,
    };
    report(e)
}

fn report(e: RelayError) -> RelayResponse {
    match &e {
        RelayError::MethodNotAllowed(method) => debug!("refusing {method} request"),
        RelayError::MissingWebhookUrl => {
            error!("webhook URL is not configured, cannot forward booking")
        }
        RelayError::Upstream(result) => error!(
            "workflow returned {}: {}",
            result.upstream_status, result.body
        ),
        RelayError::Internal(e) => error!("forwarding booking failed: {e}"),
    }
    e.into()
}

/// Only POST is forwarded, and only once a webhook is configured.
fn admit<'c>(method: &Method, config: &'c RelayConfig) -> Result<&'c str, RelayError> {
    if *method != Method::POST {
        return Err(RelayError::MethodNotAllowed(method.clone()));
    }
    config.webhook_url().ok_or(RelayError::MissingWebhookUrl)
}

async fn forward<U: Upstream>(
    method: &Method,
    body: &[u8],
    config: &RelayConfig,
    upstream: &U,
) -> Result<RelayResult, RelayError> {
    let url = admit(method, config)?;
    let payload = forwardable(body)?;

    info!("forwarding booking ({} bytes)", payload.len());
    let result = RelayResult::from(upstream.post_json(url, payload).await?);
    if !result.success {
        return Err(RelayError::Upstream(result));
    }
    Ok(result)
}

/// The body is passed on byte for byte once it is known to be JSON. A request without a
/// body is forwarded without one.
fn forwardable(body: &[u8]) -> Result<Vec<u8>, ForwardError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice::<serde::de::IgnoredAny>(body)?;
    Ok(body.to_vec())
}
