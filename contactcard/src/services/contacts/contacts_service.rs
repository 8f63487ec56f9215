use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use card_core::errors::CardError;
use card_core::{CardService, ServiceCapabilities};

use crate::services::ContactParams;

use super::contacts_shared;
use super::{Contact, ContactChanges};

/// The `contacts` service: list, fetch by `sfid`, and overwrite the
/// writable fields of one contact. Storage is delegated to an adapter.
pub struct ContactsService {
    pub store: Arc<dyn CardService<Contact, ContactParams>>,
}

impl ContactsService {
    pub fn new(store: Arc<dyn CardService<Contact, ContactParams>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CardService<Contact, ContactParams> for ContactsService {
    fn capabilities(&self) -> ServiceCapabilities {
        contacts_shared::capabilities()
    }

    async fn find(&self, params: ContactParams) -> Result<Vec<Contact>> {
        let mut contacts = self.store.find(params).await?;
        contacts.sort_by_key(|c| c.id);
        Ok(contacts)
    }

    async fn get(&self, sfid: &str, params: ContactParams) -> Result<Contact> {
        if sfid.trim().is_empty() {
            return Err(contacts_shared::not_found(sfid));
        }
        self.store.get(sfid, params).await
    }

    async fn patch(&self, sfid: &str, data: ContactChanges, params: ContactParams) -> Result<Contact> {
        if sfid.trim().is_empty() {
            return Err(contacts_shared::not_found(sfid));
        }

        let updated = self.store.patch(sfid, data, params).await?;
        if updated.sfid != sfid {
            return Err(CardError::general_error("Store returned a different contact")
                .into_anyhow());
        }

        tracing::info!(sfid, id = updated.id, "contact updated");
        Ok(updated)
    }
}
