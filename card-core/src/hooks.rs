use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::{CardConfigSnapshot, Record, ServiceMethodKind};

pub type HookFut<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// What a service call produced.
#[derive(Debug, Clone)]
pub enum HookResult<R> {
    One(R),
    Many(Vec<R>),
}

/// Context passed through the pipeline of one service call.
///
/// `data` is the patch payload (taken by the service call), `result` is
/// set by the service call and may be rewritten by after hooks, `error`
/// is only populated while error hooks run.
pub struct HookContext<R, P>
where
    R: Record,
{
    pub service: String,
    pub method: ServiceMethodKind,
    pub id: Option<String>,
    pub params: P,
    pub data: Option<R::Changes>,
    pub result: Option<HookResult<R>>,
    pub error: Option<anyhow::Error>,
    pub config: CardConfigSnapshot,
}

impl<R, P> HookContext<R, P>
where
    R: Record,
{
    pub fn new(
        service: impl Into<String>,
        method: ServiceMethodKind,
        params: P,
        config: CardConfigSnapshot,
    ) -> Self {
        Self {
            service: service.into(),
            method,
            id: None,
            params,
            data: None,
            result: None,
            error: None,
            config,
        }
    }
}

type NextFn<R, P> =
    Box<dyn for<'a> FnOnce(&'a mut HookContext<R, P>) -> HookFut<'a> + Send>;

/// The rest of the pipeline, handed to around hooks.
pub struct Next<R, P>
where
    R: Record,
{
    call: NextFn<R, P>,
}

impl<R, P> Next<R, P>
where
    R: Record,
{
    pub(crate) fn new<F>(f: F) -> Self
    where
        F: for<'a> FnOnce(&'a mut HookContext<R, P>) -> HookFut<'a> + Send + 'static,
    {
        Self { call: Box::new(f) }
    }

    pub async fn run(self, ctx: &mut HookContext<R, P>) -> Result<()> {
        (self.call)(ctx).await
    }
}

#[async_trait]
pub trait CardAroundHook<R, P>: Send + Sync
where
    R: Record,
    P: Send + 'static,
{
    async fn run(&self, ctx: &mut HookContext<R, P>, next: Next<R, P>) -> Result<()>;
}

#[async_trait]
pub trait CardBeforeHook<R, P>: Send + Sync
where
    R: Record,
    P: Send + 'static,
{
    async fn run(&self, ctx: &mut HookContext<R, P>) -> Result<()>;
}

#[async_trait]
pub trait CardAfterHook<R, P>: Send + Sync
where
    R: Record,
    P: Send + 'static,
{
    async fn run(&self, ctx: &mut HookContext<R, P>) -> Result<()>;
}

/// Error hooks see `ctx.error`; clearing it recovers the call.
#[async_trait]
pub trait CardErrorHook<R, P>: Send + Sync
where
    R: Record,
    P: Send + 'static,
{
    async fn run(&self, ctx: &mut HookContext<R, P>) -> Result<()>;
}

type ByMethod<H> = HashMap<ServiceMethodKind, Vec<Arc<H>>>;

/// Hook tables for one scope (the whole app, or one service).
pub struct ServiceHooks<R, P>
where
    R: Record,
    P: Send + 'static,
{
    pub(crate) around_all: Vec<Arc<dyn CardAroundHook<R, P>>>,
    pub(crate) before_all: Vec<Arc<dyn CardBeforeHook<R, P>>>,
    pub(crate) after_all: Vec<Arc<dyn CardAfterHook<R, P>>>,
    pub(crate) error_all: Vec<Arc<dyn CardErrorHook<R, P>>>,

    pub(crate) around_by_method: ByMethod<dyn CardAroundHook<R, P>>,
    pub(crate) before_by_method: ByMethod<dyn CardBeforeHook<R, P>>,
    pub(crate) after_by_method: ByMethod<dyn CardAfterHook<R, P>>,
    pub(crate) error_by_method: ByMethod<dyn CardErrorHook<R, P>>,
}

impl<R, P> Default for ServiceHooks<R, P>
where
    R: Record,
    P: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R, P> ServiceHooks<R, P>
where
    R: Record,
    P: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            around_all: Vec::new(),
            before_all: Vec::new(),
            after_all: Vec::new(),
            error_all: Vec::new(),
            around_by_method: HashMap::new(),
            before_by_method: HashMap::new(),
            after_by_method: HashMap::new(),
            error_by_method: HashMap::new(),
        }
    }

    pub fn around_all(&mut self, hook: Arc<dyn CardAroundHook<R, P>>) -> &mut Self {
        self.around_all.push(hook);
        self
    }

    pub fn before_all(&mut self, hook: Arc<dyn CardBeforeHook<R, P>>) -> &mut Self {
        self.before_all.push(hook);
        self
    }

    pub fn after_all(&mut self, hook: Arc<dyn CardAfterHook<R, P>>) -> &mut Self {
        self.after_all.push(hook);
        self
    }

    pub fn error_all(&mut self, hook: Arc<dyn CardErrorHook<R, P>>) -> &mut Self {
        self.error_all.push(hook);
        self
    }

    pub fn around(
        &mut self,
        method: ServiceMethodKind,
        hook: Arc<dyn CardAroundHook<R, P>>,
    ) -> &mut Self {
        self.around_by_method.entry(method).or_default().push(hook);
        self
    }

    pub fn before(
        &mut self,
        method: ServiceMethodKind,
        hook: Arc<dyn CardBeforeHook<R, P>>,
    ) -> &mut Self {
        self.before_by_method.entry(method).or_default().push(hook);
        self
    }

    pub fn after(
        &mut self,
        method: ServiceMethodKind,
        hook: Arc<dyn CardAfterHook<R, P>>,
    ) -> &mut Self {
        self.after_by_method.entry(method).or_default().push(hook);
        self
    }

    pub fn error(
        &mut self,
        method: ServiceMethodKind,
        hook: Arc<dyn CardErrorHook<R, P>>,
    ) -> &mut Self {
        self.error_by_method.entry(method).or_default().push(hook);
        self
    }

    pub fn before_patch(&mut self, hook: Arc<dyn CardBeforeHook<R, P>>) -> &mut Self {
        self.before(ServiceMethodKind::Patch, hook)
    }

    pub fn after_find(&mut self, hook: Arc<dyn CardAfterHook<R, P>>) -> &mut Self {
        self.after(ServiceMethodKind::Find, hook)
    }

    pub fn after_get(&mut self, hook: Arc<dyn CardAfterHook<R, P>>) -> &mut Self {
        self.after(ServiceMethodKind::Get, hook)
    }

    pub fn after_patch(&mut self, hook: Arc<dyn CardAfterHook<R, P>>) -> &mut Self {
        self.after(ServiceMethodKind::Patch, hook)
    }
}

/// `*_all` hooks first, then the ones registered for `method`.
pub(crate) fn collect_method_hooks<H: ?Sized>(
    all: &[Arc<H>],
    by_method: &HashMap<ServiceMethodKind, Vec<Arc<H>>>,
    method: ServiceMethodKind,
) -> Vec<Arc<H>> {
    let mut out: Vec<Arc<H>> = all.to_vec();
    if let Some(v) = by_method.get(&method) {
        out.extend(v.iter().cloned());
    }
    out
}
