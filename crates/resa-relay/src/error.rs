use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    constants::{
        INTERNAL_ERROR, METHOD_NOT_ALLOWED, MISSING_CONFIGURATION, MISSING_CONFIGURATION_DETAILS,
        UPSTREAM_FAILURE,
    },
    RelayResult,
};

/// Failure while talking to the webhook.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("the request body is not valid JSON: {0}")]
    MalformedPayload(#[from] serde_json::Error),
    #[error("the request body could not be read: {0}")]
    UnreadableBody(String),
    #[error("the request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("the response body could not be read: {0}")]
    ResponseBodyError(#[source] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("method {0} is not allowed")]
    MethodNotAllowed(Method),
    #[error("the webhook URL is not configured")]
    MissingWebhookUrl,
    #[error("the workflow answered with status {}", .0.upstream_status)]
    Upstream(RelayResult),
    #[error("forwarding failed: {0}")]
    Internal(#[from] ForwardError),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::MissingWebhookUrl => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body sent back to the caller.
    pub fn body(&self) -> Value {
        match self {
            RelayError::MethodNotAllowed(_) => json!({ "error": METHOD_NOT_ALLOWED }),
            RelayError::MissingWebhookUrl => json!({
                "error": MISSING_CONFIGURATION,
                "details": MISSING_CONFIGURATION_DETAILS,
            }),
            RelayError::Upstream(result) => json!({
                "error": UPSTREAM_FAILURE,
                "status": result.upstream_status,
                "details": result.body,
            }),
            RelayError::Internal(e) => json!({
                "error": INTERNAL_ERROR,
                "message": e.to_string(),
            }),
        }
    }
}
