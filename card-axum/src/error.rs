use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use card_core::errors::CardError;

/// JSON error response for service routes.
#[derive(Debug)]
pub struct CardAxumError(pub anyhow::Error);

impl From<anyhow::Error> for CardAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<CardError> for CardAxumError {
    fn from(e: CardError) -> Self {
        Self(e.into_anyhow())
    }
}

impl IntoResponse for CardAxumError {
    fn into_response(self) -> Response {
        let card = CardError::normalize(self.0);
        if card.kind.is_server_error() {
            tracing::error!(error = %card, source = ?card.source, "request failed");
        } else {
            tracing::debug!(error = %card, "request rejected");
        }

        let safe = card.sanitize_for_client();
        let status =
            StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(safe.to_json())).into_response()
    }
}
