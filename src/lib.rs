//! Taxi booking client: address fields with autocomplete, the booking payload, and its
//! submission to the relay.
pub mod booking;
pub mod error;
pub mod form;
pub mod submit;

pub use booking::{BookingRequest, Contact};
pub use form::BookingForm;
