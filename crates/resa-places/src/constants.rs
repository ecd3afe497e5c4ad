use std::time::Duration;

/// The default endpoint for the Places autocomplete web service
pub const DEFAULT_AUTOCOMPLETE_ENDPOINT: &str =
    "https://maps.googleapis.com/maps/api/place/autocomplete/json";

/// Status reported by the Places API when predictions were found
pub const STATUS_OK: &str = "OK";

/// Suggestions are restricted to this country unless overridden
pub const DEFAULT_COUNTRY: &str = "fr";
pub const DEFAULT_PLACE_TYPES: [&str; 2] = ["geocode", "establishment"];

/// Quiet period after the last keystroke before a lookup is issued
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);

/// Values must be strictly longer than this to be looked up
pub const MIN_QUERY_CHARS: usize = 2;
