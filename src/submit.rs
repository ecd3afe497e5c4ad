use reqwest::{header::CONTENT_TYPE, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::{error::SubmitError, BookingRequest};

/// The relay's answer to an accepted booking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelaySubmission {
    pub success: bool,
    /// Whatever the workflow answered, `{"raw": ...}` when it was not JSON.
    pub n8n_response: Value,
}

/// Error relay answer; every relay error body carries an `error` field.
#[derive(Deserialize)]
struct Refused {
    error: String,
}

/// Post a booking to the relay and return the workflow's answer.
pub async fn submit(
    client: &Client,
    relay_url: &str,
    booking: &BookingRequest,
) -> Result<RelaySubmission, SubmitError> {
    let response = client
        .post(relay_url)
        .header(CONTENT_TYPE, "application/json")
        .body(serde_json::to_vec(booking)?)
        .send()
        .await?;
    let status = response.status();
    let body = response.text().await.map_err(SubmitError::ResponseBodyError)?;

    if !status.is_success() {
        let message = serde_json::from_str::<Refused>(&body)
            .map(|refused| refused.error)
            .unwrap_or(body);
        return Err(SubmitError::Rejected { status, message });
    }

    let submission: RelaySubmission = serde_json::from_str(&body)?;
    info!("booking accepted by the relay");
    Ok(submission)
}
