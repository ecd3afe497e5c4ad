use thiserror::Error;

#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("the request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("the request failed with status code: {0}")]
    ResponseError(reqwest::StatusCode),
    #[error("the response body could not be read: {0}")]
    ResponseBodyError(#[source] reqwest::Error),
    #[error("unable to parse the response body: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("the geocoding service answered with status {status}")]
    Status {
        status: String,
        message: Option<String>,
    },
}
