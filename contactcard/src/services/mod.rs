use std::sync::Arc;

use card_core::{CardApp, CardService};

use crate::sync::SyncProbe;

pub mod adapters;
pub mod contacts;
pub mod types;

pub use contacts::{Contact, ContactChanges};
pub use types::ContactParams;

pub struct ContactServices {
    pub contacts: Arc<dyn CardService<Contact, ContactParams>>,
}

/// Wrap `store` in the contacts service. Registration (and mounting of
/// its JSON routes) happens in `AxumApp::use_service`; hooks attach after.
pub fn configure(store: Arc<dyn CardService<Contact, ContactParams>>) -> ContactServices {
    ContactServices {
        contacts: Arc::new(contacts::ContactsService::new(store)),
    }
}

pub fn register_hooks(
    app: &CardApp<Contact, ContactParams>,
    svcs: &ContactServices,
    probe: Arc<dyn SyncProbe>,
) -> anyhow::Result<()> {
    contacts::contacts_shared::register_hooks(app, Arc::clone(&svcs.contacts), probe)
}
