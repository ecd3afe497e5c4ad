use std::{path::Path, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{BookingError, LoadError};

/// Matches the value of a `datetime-local` input, e.g. `2026-10-18T07:30`.
static DATETIME_LOCAL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])T([01]\d|2[0-3]):[0-5]\d$")
        .expect("Invalid regex pattern")
});

/// How to reach the visitor about their booking.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Payload posted to the relay. The relay does not look inside it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub origin: String,
    pub destination: String,
    /// Local pickup time as `YYYY-MM-DDTHH:MM`.
    pub date: String,
    pub is_round_trip: bool,
    pub contact: Contact,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BookingRequest {
    /// Label of the trip type as shown on the form.
    pub fn trip_label(&self) -> &'static str {
        if self.is_round_trip {
            "Aller / Retour"
        } else {
            "Aller Simple"
        }
    }

    pub fn validate(&self) -> Result<(), BookingError> {
        if self.origin.trim().is_empty() {
            return Err(BookingError::MissingOrigin);
        }
        if self.destination.trim().is_empty() {
            return Err(BookingError::MissingDestination);
        }
        if !DATETIME_LOCAL_REGEX.is_match(&self.date) {
            return Err(BookingError::InvalidDate(self.date.clone()));
        }
        if self.contact.name.trim().is_empty() || self.contact.phone.trim().is_empty() {
            return Err(BookingError::MissingContact);
        }
        Ok(())
    }

    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let file_contents = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&file_contents)?)
    }
}
