use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use card_core::errors::CardError;
use card_core::{CardBeforeHook, CardService, HookContext};

use crate::services::ContactParams;
use crate::sync::SyncProbe;

use super::contacts_schema::VALIDATION_FAILED;
use super::Contact;

pub const NOT_SYNCED: &str = "Heroku Connect has not created the contact table yet.";

/// Every call fails with `Unavailable` until the sync schema exists.
pub struct RequireSyncedSchema {
    pub probe: Arc<dyn SyncProbe>,
}

#[async_trait]
impl CardBeforeHook<Contact, ContactParams> for RequireSyncedSchema {
    async fn run(&self, _ctx: &mut HookContext<Contact, ContactParams>) -> Result<()> {
        if self.probe.is_ready().await? {
            return Ok(());
        }
        Err(CardError::unavailable(NOT_SYNCED).into_anyhow())
    }
}

/// A patch for an unknown `sfid` is `NotFound`, whatever its payload.
pub struct RequireContact {
    pub contacts: Arc<dyn CardService<Contact, ContactParams>>,
}

#[async_trait]
impl CardBeforeHook<Contact, ContactParams> for RequireContact {
    async fn run(&self, ctx: &mut HookContext<Contact, ContactParams>) -> Result<()> {
        let Some(sfid) = ctx.id.as_deref() else {
            return Ok(());
        };
        self.contacts.get(sfid, ctx.params.clone()).await?;
        Ok(())
    }
}

pub struct NormalizeContactChanges;

#[async_trait]
impl CardBeforeHook<Contact, ContactParams> for NormalizeContactChanges {
    async fn run(&self, ctx: &mut HookContext<Contact, ContactParams>) -> Result<()> {
        if let Some(data) = ctx.data.take() {
            ctx.data = Some(data.normalized());
        }
        Ok(())
    }
}

/// Runs after normalization, so blank-but-spaced input counts as missing.
pub struct ValidateContactChanges;

#[async_trait]
impl CardBeforeHook<Contact, ContactParams> for ValidateContactChanges {
    async fn run(&self, ctx: &mut HookContext<Contact, ContactParams>) -> Result<()> {
        let Some(data) = ctx.data.as_ref() else {
            return Ok(());
        };
        card_schema::validate(data, VALIDATION_FAILED)
    }
}
