use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use card_core::errors::CardError;
use card_core::{
    CardAfterHook, CardApp, CardAroundHook, CardErrorHook, HookContext, HookResult, Next,
};

use crate::services::{Contact, ContactParams};

pub struct LogAround;

#[async_trait]
impl CardAroundHook<Contact, ContactParams> for LogAround {
    async fn run(
        &self,
        ctx: &mut HookContext<Contact, ContactParams>,
        next: Next<Contact, ContactParams>,
    ) -> Result<()> {
        let started = Instant::now();
        tracing::debug!(
            service = %ctx.service,
            method = ctx.method.as_str(),
            id = ctx.id.as_deref(),
            provider = %ctx.params.provider,
            request_id = ctx.params.request_id(),
            "-> service call"
        );

        let res = next.run(ctx).await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &res {
            Ok(()) => tracing::info!(
                service = %ctx.service,
                method = ctx.method.as_str(),
                elapsed_ms,
                "<- ok"
            ),
            Err(e) => tracing::info!(
                service = %ctx.service,
                method = ctx.method.as_str(),
                elapsed_ms,
                error = %e,
                "<- failed"
            ),
        }
        res
    }
}

pub struct LogAfter;

#[async_trait]
impl CardAfterHook<Contact, ContactParams> for LogAfter {
    async fn run(&self, ctx: &mut HookContext<Contact, ContactParams>) -> Result<()> {
        let records = match &ctx.result {
            Some(HookResult::One(_)) => 1,
            Some(HookResult::Many(v)) => v.len(),
            None => 0,
        };
        tracing::debug!(service = %ctx.service, method = ctx.method.as_str(), records, "result");
        Ok(())
    }
}

/// Server-side failures are logged with their source; client errors at debug.
pub struct LogError;

#[async_trait]
impl CardErrorHook<Contact, ContactParams> for LogError {
    async fn run(&self, ctx: &mut HookContext<Contact, ContactParams>) -> Result<()> {
        let Some(err) = ctx.error.as_ref() else {
            return Ok(());
        };

        match CardError::from_anyhow(err) {
            Some(card) if !card.kind.is_server_error() => tracing::debug!(
                service = %ctx.service,
                method = ctx.method.as_str(),
                kind = card.name(),
                "{}",
                card.message
            ),
            _ => tracing::error!(
                service = %ctx.service,
                method = ctx.method.as_str(),
                id = ctx.id.as_deref(),
                error = ?err,
                "service call failed"
            ),
        }
        Ok(())
    }
}

pub fn global_hooks(app: &CardApp<Contact, ContactParams>) {
    app.hooks(|h| {
        h.around_all(Arc::new(LogAround));
        h.after_all(Arc::new(LogAfter));
        h.error_all(Arc::new(LogError));
    });
}
