use std::sync::Arc;

use card_core::errors::CardError;
use card_core::{CardApp, CardService, ServiceCapabilities};

use crate::services::ContactParams;
use crate::sync::SyncProbe;

use super::contacts_hooks::{
    NormalizeContactChanges, RequireContact, RequireSyncedSchema, ValidateContactChanges,
};
use super::Contact;

pub const SERVICE: &str = "contacts";
pub const TABLE: &str = "contact";
pub const NOT_FOUND: &str = "No contact with matching Salesforce ID exists.";

pub fn capabilities() -> ServiceCapabilities {
    ServiceCapabilities::read_write()
}

pub fn not_found(sfid: &str) -> anyhow::Error {
    tracing::debug!(sfid, "contact not found");
    CardError::not_found(NOT_FOUND).into_anyhow()
}

/// `contacts` is the bare service (not the registered handle), so the
/// existence check does not re-enter the hook pipeline.
pub fn register_hooks(
    app: &CardApp<Contact, ContactParams>,
    contacts: Arc<dyn CardService<Contact, ContactParams>>,
    probe: Arc<dyn SyncProbe>,
) -> anyhow::Result<()> {
    app.service(SERVICE)?.hooks(|h| {
        h.before_all(Arc::new(RequireSyncedSchema { probe }));
        h.before_patch(Arc::new(RequireContact { contacts }));
        h.before_patch(Arc::new(NormalizeContactChanges));
        h.before_patch(Arc::new(ValidateContactChanges));
    });
    Ok(())
}
