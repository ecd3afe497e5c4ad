use serde::Deserialize;

// Request parameters are passed as a query string, so only the response is modelled.

/// Raw autocomplete response from the Places API.
#[derive(Deserialize)]
pub struct Response {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
    pub status: String,
    pub error_message: Option<String>,
}

/// Raw prediction from the Places API.
#[derive(Deserialize)]
pub struct Prediction {
    pub description: String,
    pub place_id: String,
    pub structured_formatting: StructuredFormatting,
}

#[derive(Deserialize)]
pub struct StructuredFormatting {
    pub main_text: String,
    #[serde(default)]
    pub secondary_text: String,
}
