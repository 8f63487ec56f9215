//! card-core: framework-agnostic core for ContactCard.
//!
//! Named services, a hook pipeline wrapped around every service call,
//! a string key/value config and Feathers-style structured errors.

pub mod adapters;
pub mod app;
pub mod config;
pub mod errors;
pub mod hooks;
pub mod registry;
pub mod service;

pub use app::{CardApp, ServiceHandle};
pub use config::{CardConfig, CardConfigSnapshot};
pub use errors::{CardError, ErrorKind};
pub use hooks::{
    CardAfterHook, CardAroundHook, CardBeforeHook, CardErrorHook, HookContext, HookResult, Next,
    ServiceHooks,
};
pub use registry::CardServiceRegistry;
pub use service::{CardService, Record, ServiceCapabilities, ServiceMethodKind};
