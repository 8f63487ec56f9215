use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use card_core::errors::CardError;

use super::views;

const SERVER_ERROR_MESSAGE: &str = "Something went wrong on our side. Please try again later.";

/// Failure page for HTML routes. Server errors never show their message.
#[derive(Debug)]
pub struct PageError(pub anyhow::Error);

impl From<anyhow::Error> for PageError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<CardError> for PageError {
    fn from(e: CardError) -> Self {
        Self(e.into_anyhow())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let card = CardError::normalize(self.0);
        let status = StatusCode::from_u16(card.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if card.kind.is_server_error() {
            tracing::error!(error = %card, source = ?card.source, "page failed");
            SERVER_ERROR_MESSAGE
        } else {
            tracing::debug!(error = %card, "page rejected");
            card.message.as_str()
        };

        let title = status.canonical_reason().unwrap_or("Error");
        (status, Html(views::error_page(status.as_u16(), title, message))).into_response()
    }
}
