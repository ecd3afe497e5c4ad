use serde::{Deserialize, Serialize};

use crate::{
    api_interfaces::places,
    constants::{DEFAULT_COUNTRY, DEFAULT_PLACE_TYPES},
};

/// A single address proposal shown in the dropdown.
///
/// Two suggestions are the same suggestion when their `id` matches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub primary_text: String,
    pub secondary_text: String,
    /// Full display text, committed to the field on selection.
    pub description: String,
}

impl From<places::Prediction> for Suggestion {
    fn from(prediction: places::Prediction) -> Self {
        Self {
            id: prediction.place_id,
            primary_text: prediction.structured_formatting.main_text,
            secondary_text: prediction.structured_formatting.secondary_text,
            description: prediction.description,
        }
    }
}

/// Restrictions applied to every lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuggestOptions {
    pub country: String,
    pub types: Vec<String>,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            country: DEFAULT_COUNTRY.to_string(),
            types: DEFAULT_PLACE_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_maps_to_suggestion() {
        // Arrange
        let prediction: places::Prediction = serde_json::from_value(serde_json::json!({
            "description": "Gare de Lyon, Paris, France",
            "place_id": "ChIJ-gare",
            "structured_formatting": {
                "main_text": "Gare de Lyon",
                "secondary_text": "Paris, France"
            }
        }))
        .unwrap();

        // Act
        let suggestion = Suggestion::from(prediction);

        // Assert
        assert_eq!(suggestion.id, "ChIJ-gare");
        assert_eq!(suggestion.primary_text, "Gare de Lyon");
        assert_eq!(suggestion.secondary_text, "Paris, France");
        assert_eq!(suggestion.description, "Gare de Lyon, Paris, France");
    }

    #[test]
    fn missing_secondary_text_is_empty() {
        let prediction: places::Prediction = serde_json::from_value(serde_json::json!({
            "description": "France",
            "place_id": "ChIJ-fr",
            "structured_formatting": { "main_text": "France" }
        }))
        .unwrap();

        assert_eq!(Suggestion::from(prediction).secondary_text, "");
    }

    #[test]
    fn default_options_target_france() {
        let options = SuggestOptions::default();
        assert_eq!(options.country, "fr");
        assert_eq!(options.types, vec!["geocode", "establishment"]);
    }
}
