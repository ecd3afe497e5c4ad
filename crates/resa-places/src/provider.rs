use std::future::Future;

use crate::{error::SuggestError, SuggestOptions, Suggestion};

/// A source of address suggestions.
///
/// A field holds at most one provider, resolved when it is mounted. Fields mounted without
/// one behave as plain text inputs.
pub trait GeocodingProvider: Send + Sync {
    fn suggest(
        &self,
        query: &str,
        options: &SuggestOptions,
    ) -> impl Future<Output = Result<Vec<Suggestion>, SuggestError>> + Send;
}
