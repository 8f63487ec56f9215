pub mod contacts_hooks;
pub mod contacts_schema;
pub mod contacts_service;
pub mod contacts_shared;

pub use contacts_schema::{Contact, ContactChanges};
pub use contacts_service::ContactsService;
