use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookingError {
    #[error("the origin address is missing")]
    MissingOrigin,
    #[error("the destination address is missing")]
    MissingDestination,
    #[error("the date `{0}` is not of the form YYYY-MM-DDTHH:MM")]
    InvalidDate(String),
    #[error("a contact name and phone number are required")]
    MissingContact,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unable to read the file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("unable to parse the file: {0}")]
    ParseError(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("the request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("the response body could not be read: {0}")]
    ResponseBodyError(#[source] reqwest::Error),
    #[error("unable to parse the response body: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("the relay refused the booking ({status}): {message}")]
    Rejected { status: StatusCode, message: String },
}
