use anyhow::Result;
use async_trait::async_trait;

use crate::errors::CardError;

/// A record type a service serves.
///
/// `Changes` is the payload accepted by `patch`. Keeping it a separate
/// type lets a record expose only the fields callers may write.
pub trait Record: Send + Sync + 'static {
    type Changes: Send + Sync + 'static;
}

/// Service methods, named after their Feathers counterparts.
///
/// No create/remove: records are created and deleted outside the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceMethodKind {
    Find,
    Get,
    Patch,
}

impl ServiceMethodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceMethodKind::Find => "find",
            ServiceMethodKind::Get => "get",
            ServiceMethodKind::Patch => "patch",
        }
    }
}

/// Capabilities describe which methods a service wants to expose
/// to the outside world.
///
/// Adapters (like card-axum) use this to mount only allowed routes.
#[derive(Debug, Clone)]
pub struct ServiceCapabilities {
    pub allowed_methods: Vec<ServiceMethodKind>,
}

impl ServiceCapabilities {
    /// `find`, `get` and `patch`.
    pub fn read_write() -> Self {
        use ServiceMethodKind::*;
        Self {
            allowed_methods: vec![Find, Get, Patch],
        }
    }

    /// `find` and `get` only.
    pub fn read_only() -> Self {
        use ServiceMethodKind::*;
        Self {
            allowed_methods: vec![Find, Get],
        }
    }

    pub fn from_methods(methods: Vec<ServiceMethodKind>) -> Self {
        Self {
            allowed_methods: methods,
        }
    }

    pub fn allows(&self, method: ServiceMethodKind) -> bool {
        self.allowed_methods.contains(&method)
    }
}

/// Core service trait:
///
/// - `find`  → list many
/// - `get`   → fetch one by id
/// - `patch` → overwrite the writable fields of one record
///
/// Every method has a default implementation returning `NotImplemented`,
/// so a service overrides only what it supports.
#[async_trait]
pub trait CardService<R, P = ()>: Send + Sync
where
    R: Record,
    P: Send + 'static,
{
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::read_write()
    }

    async fn find(&self, _params: P) -> Result<Vec<R>> {
        Err(CardError::not_implemented("Method not implemented: find").into_anyhow())
    }

    async fn get(&self, _id: &str, _params: P) -> Result<R> {
        Err(CardError::not_implemented("Method not implemented: get").into_anyhow())
    }

    async fn patch(&self, _id: &str, _data: R::Changes, _params: P) -> Result<R> {
        Err(CardError::not_implemented("Method not implemented: patch").into_anyhow())
    }
}
