use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{HeaderMap, HeaderValue, Method},
    response::{IntoResponse, Response},
    Json,
};
use resa_relay::RelayResponse;
use tracing::warn;

use crate::state::AppState;

pub async fn reservation_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Reply {
    let response = match body {
        Ok(body) => resa_relay::handle(&method, &body, &state.relay, &state.upstream).await,
        Err(rejection) => {
            warn!("request body rejected: {rejection}");
            resa_relay::handle_unreadable(&method, &rejection.body_text(), &state.relay)
        }
    };
    Reply(response)
}

/// A relay response ready to be written to the wire.
pub struct Reply(pub RelayResponse);

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        for (name, value) in self.0.headers() {
            headers.insert(name, HeaderValue::from_static(value));
        }

        match self.0.body {
            Some(body) => (self.0.status, headers, Json(body)).into_response(),
            None => (self.0.status, headers).into_response(),
        }
    }
}
