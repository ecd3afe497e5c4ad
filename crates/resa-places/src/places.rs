use reqwest::Client;
use tracing::debug;

use crate::{
    api_interfaces::places,
    constants::{DEFAULT_AUTOCOMPLETE_ENDPOINT, STATUS_OK},
    error::SuggestError,
    util::default_http_client,
    GeocodingProvider, SuggestOptions, Suggestion,
};

/// Google Places autocomplete client.
#[derive(Clone, Debug)]
pub struct GooglePlaces {
    http_client: Client,
    api_key: String,
    endpoint: String,
}

impl GooglePlaces {
    /// Create a client for the default Places endpoint.
    pub fn new(api_key: &str) -> Self {
        Self::custom(default_http_client(), api_key, None)
    }

    /// Create a client with a custom HTTP client and endpoint.
    /// If the endpoint is not provided, the default Places autocomplete URL will be used.
    pub fn custom(http_client: Client, api_key: &str, endpoint: Option<&str>) -> Self {
        Self {
            http_client,
            api_key: api_key.to_owned(),
            endpoint: endpoint.unwrap_or(DEFAULT_AUTOCOMPLETE_ENDPOINT).to_owned(),
        }
    }
}

impl GeocodingProvider for GooglePlaces {
    async fn suggest(
        &self,
        query: &str,
        options: &SuggestOptions,
    ) -> Result<Vec<Suggestion>, SuggestError> {
        let components = format!("country:{}", options.country);
        let types = options.types.join("|");
        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[
                ("input", query),
                ("components", components.as_str()),
                ("types", types.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SuggestError::ResponseError(response.status()));
        }
        let body = response
            .text()
            .await
            .map_err(SuggestError::ResponseBodyError)?;
        let parsed_body: places::Response = serde_json::from_str(&body)?;
        if parsed_body.status != STATUS_OK {
            return Err(SuggestError::Status {
                status: parsed_body.status,
                message: parsed_body.error_message,
            });
        }
        debug!(
            "{} predictions for {:?}",
            parsed_body.predictions.len(),
            query
        );
        Ok(parsed_body
            .predictions
            .into_iter()
            .map(Suggestion::from)
            .collect())
    }
}
