//! ContactCard: list and edit Salesforce contacts mirrored into Postgres
//! by Heroku Connect.
//!
//! The app only reads rows and overwrites their mutable fields. Heroku
//! Connect owns `sfid`, creates and deletes rows, and syncs every update
//! back to Salesforce.

mod app;
mod config;
mod hooks;
pub mod pages;
pub mod services;
pub mod sync;

pub use app::{build, build_from, build_with, contact_app, Backend};
pub use config::from_env;
