//! card-axum: Axum adapter for ContactCard.
//!
//! Builds an Axum router from a `CardApp`: JSON routes for registered
//! services, request ids and tracing, plus the small pieces HTML pages
//! need (flash messages, CSRF tokens, HTTPS redirects).

pub mod app;
pub mod csrf;
mod error;
pub mod flash;
pub mod middlewares;
pub mod params;
pub mod rest;
pub mod state;

pub use app::{axum, AxumApp};
pub use csrf::CsrfGuard;
pub use error::CardAxumError;
pub use flash::{Flash, FlashCategory, FlashMessage, IncomingFlash};
pub use state::CardAxumState;
