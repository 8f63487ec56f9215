//! Is Heroku Connect provisioned yet?
//!
//! Until the add-on has created its schema there is no contact table, so
//! the pages send visitors to `/welcome` instead of failing.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use card_sqlx::SchemaProbe;

#[async_trait]
pub trait SyncProbe: Send + Sync {
    async fn is_ready(&self) -> Result<bool>;
}

#[async_trait]
impl SyncProbe for SchemaProbe {
    async fn is_ready(&self) -> Result<bool> {
        SchemaProbe::is_ready(self).await
    }
}

/// Fixed answer, for the in-memory store.
#[derive(Debug)]
pub struct StaticProbe {
    ready: AtomicBool,
}

impl StaticProbe {
    pub fn new(ready: bool) -> Self {
        Self {
            ready: AtomicBool::new(ready),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }
}

#[async_trait]
impl SyncProbe for StaticProbe {
    async fn is_ready(&self) -> Result<bool> {
        Ok(self.ready.load(Ordering::Acquire))
    }
}
