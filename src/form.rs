use std::sync::Arc;

use resa_places::{
    AddressAutocomplete, Document, FieldPropsBuilder, FieldPropsBuilderError, GeocodingProvider,
};

use crate::{BookingRequest, Contact};

pub const ORIGIN_LABEL: &str = "Départ";
pub const ORIGIN_PLACEHOLDER: &str = "Adresse de départ (France)...";
pub const DESTINATION_LABEL: &str = "Arrivée";
pub const DESTINATION_PLACEHOLDER: &str = "Adresse d'arrivée (France)...";

/// Booking form: two independent address fields plus pickup time and trip type.
pub struct BookingForm {
    pub origin: AddressAutocomplete,
    pub destination: AddressAutocomplete,
    pub date: String,
    pub is_round_trip: bool,
}

impl BookingForm {
    /// Mount both address fields on `document`, sharing one provider.
    pub fn mount<P>(
        provider: Option<Arc<P>>,
        document: &Document,
        date: impl Into<String>,
    ) -> Result<Self, FieldPropsBuilderError>
    where
        P: GeocodingProvider + 'static,
    {
        let origin = FieldPropsBuilder::default()
            .label(ORIGIN_LABEL)
            .placeholder(ORIGIN_PLACEHOLDER)
            .build()?;
        let destination = FieldPropsBuilder::default()
            .label(DESTINATION_LABEL)
            .placeholder(DESTINATION_PLACEHOLDER)
            .build()?;

        Ok(Self {
            origin: AddressAutocomplete::mount(origin, provider.clone(), document),
            destination: AddressAutocomplete::mount(destination, provider, document),
            date: date.into(),
            is_round_trip: false,
        })
    }

    /// Snapshot the form into a payload. Addresses are whatever the fields hold, committed
    /// suggestion or free text.
    pub fn request(&self, contact: Contact) -> BookingRequest {
        BookingRequest {
            origin: self.origin.value(),
            destination: self.destination.value(),
            date: self.date.clone(),
            is_round_trip: self.is_round_trip,
            contact,
            notes: None,
        }
    }

    pub async fn unmount(self) {
        self.origin.unmount().await;
        self.destination.unmount().await;
    }
}
