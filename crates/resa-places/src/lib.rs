mod api_interfaces;
pub mod autocomplete;
pub mod constants;
pub mod document;
pub mod error;
pub mod places;
pub mod provider;
pub mod suggestion;
mod util;

pub use autocomplete::{
    AddressAutocomplete, AddressFieldState, Dropdown, FieldProps, FieldPropsBuilder,
    FieldPropsBuilderError,
};
pub use document::{Document, ElementId, PointerDown};
pub use places::GooglePlaces;
pub use provider::GeocodingProvider;
pub use suggestion::{SuggestOptions, Suggestion};
pub use util::default_http_client;
