//! Server-rendered pages: the contact list, the edit form and the
//! Heroku Connect welcome page.

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{HeaderMap, Uri};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use card_axum::params::{Provider, RestParams};
use card_axum::CsrfGuard;
use card_core::CardApp;

use crate::services::{Contact, ContactParams};
use crate::sync::SyncProbe;

mod contacts;
mod error;
pub mod views;
mod welcome;

pub use error::PageError;

#[derive(Clone)]
pub struct PageState {
    pub app: CardApp<Contact, ContactParams>,
    pub probe: Arc<dyn SyncProbe>,
    pub csrf: CsrfGuard,
}

impl PageState {
    /// `Some(redirect)` while the sync schema is missing.
    async fn require_sync(&self) -> Result<Option<Response>, PageError> {
        if self.probe.is_ready().await? {
            return Ok(None);
        }
        Ok(Some(Redirect::to("/welcome").into_response()))
    }
}

fn page_params(headers: &HeaderMap, method: &str, uri: &Uri) -> ContactParams {
    RestParams::from_parts(Provider::Html, headers, HashMap::new(), method, uri)
}

pub fn router(state: PageState) -> Router {
    Router::new()
        .route("/", get(contacts::index))
        .route("/contact/{sfid}", get(contacts::edit).post(contacts::save))
        .route("/welcome", get(welcome::welcome))
        .with_state(state)
}
