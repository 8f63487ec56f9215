use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use parking_lot::RwLock;

use crate::hooks::collect_method_hooks;
use crate::{
    CardAfterHook, CardAroundHook, CardBeforeHook, CardConfig, CardConfigSnapshot, CardError,
    CardErrorHook, CardService, CardServiceRegistry, HookContext, HookResult, Next, Record,
    ServiceHooks, ServiceMethodKind,
};

struct CardAppInner<R, P>
where
    R: Record,
    P: Send + Sync + Clone + 'static,
{
    registry: RwLock<CardServiceRegistry<R, P>>,
    global_hooks: RwLock<ServiceHooks<R, P>>,
    service_hooks: RwLock<HashMap<String, ServiceHooks<R, P>>>,
    config: RwLock<CardConfig>,
}

/// Central application container.
///
/// Framework-agnostic. Holds:
/// - service registry
/// - app hooks
/// - per-service hooks
/// - config
pub struct CardApp<R, P = ()>
where
    R: Record,
    P: Send + Sync + Clone + 'static,
{
    inner: Arc<CardAppInner<R, P>>,
}

type HooksForMethod<R, P> = (
    Vec<Arc<dyn CardAroundHook<R, P>>>,
    Vec<Arc<dyn CardBeforeHook<R, P>>>,
    Vec<Arc<dyn CardAfterHook<R, P>>>,
    Vec<Arc<dyn CardErrorHook<R, P>>>,
);

impl<R, P> Default for CardApp<R, P>
where
    R: Record,
    P: Send + Sync + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R, P> Clone for CardApp<R, P>
where
    R: Record,
    P: Send + Sync + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, P> CardApp<R, P>
where
    R: Record,
    P: Send + Sync + Clone + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CardAppInner {
                registry: RwLock::new(CardServiceRegistry::new()),
                global_hooks: RwLock::new(ServiceHooks::new()),
                service_hooks: RwLock::new(HashMap::new()),
                config: RwLock::new(CardConfig::new()),
            }),
        }
    }

    pub fn register_service<S>(&self, name: S, service: Arc<dyn CardService<R, P>>)
    where
        S: Into<String>,
    {
        self.inner.registry.write().register(name, service);
    }

    /// Feathers: `app.hooks({ ... })`
    pub fn hooks<F>(&self, f: F)
    where
        F: FnOnce(&mut ServiceHooks<R, P>),
    {
        let mut g = self.inner.global_hooks.write();
        f(&mut g);
    }

    fn configure_service_hooks<F>(&self, service_name: &str, f: F)
    where
        F: FnOnce(&mut ServiceHooks<R, P>),
    {
        let mut map = self.inner.service_hooks.write();
        let hooks = map.entry(service_name.to_string()).or_default();
        f(hooks);
    }

    /// Feathers: `app.service("name")`
    pub fn service(&self, name: &str) -> Result<ServiceHandle<R, P>> {
        let svc = self
            .inner
            .registry
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("CardService not found: {name}"))?;

        Ok(ServiceHandle {
            app: self.clone(),
            name: name.to_string(),
            service: svc,
        })
    }

    pub fn set<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.inner.config.write().set(key, value);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.config.read().get(key).map(|v| v.to_string())
    }

    pub fn config_snapshot(&self) -> CardConfigSnapshot {
        self.inner.config.read().snapshot()
    }
}

/// A registered service, called through the hook pipeline.
pub struct ServiceHandle<R, P>
where
    R: Record,
    P: Send + Sync + Clone + 'static,
{
    app: CardApp<R, P>,
    name: String,
    service: Arc<dyn CardService<R, P>>,
}

impl<R, P> ServiceHandle<R, P>
where
    R: Record,
    P: Send + Sync + Clone + 'static,
{
    /// Feathers: `app.service("x").hooks({ ... })`
    pub fn hooks<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut ServiceHooks<R, P>),
    {
        self.app.configure_service_hooks(&self.name, f);
        self
    }

    /// Global hooks first, then service hooks.
    fn collect_hooks_for_method(&self, method: ServiceMethodKind) -> HooksForMethod<R, P> {
        let g = self.app.inner.global_hooks.read();
        let map = self.app.inner.service_hooks.read();

        let mut around = collect_method_hooks(&g.around_all, &g.around_by_method, method);
        let mut before = collect_method_hooks(&g.before_all, &g.before_by_method, method);
        let mut after = collect_method_hooks(&g.after_all, &g.after_by_method, method);
        let mut error = collect_method_hooks(&g.error_all, &g.error_by_method, method);

        if let Some(h) = map.get(&self.name) {
            around.extend(collect_method_hooks(&h.around_all, &h.around_by_method, method));
            before.extend(collect_method_hooks(&h.before_all, &h.before_by_method, method));
            after.extend(collect_method_hooks(&h.after_all, &h.after_by_method, method));
            error.extend(collect_method_hooks(&h.error_all, &h.error_by_method, method));
        }

        (around, before, after, error)
    }

    /// around → before → service call → after, then error hooks on failure.
    ///
    /// After hooks unwind in reverse, so global after hooks see the
    /// result last.
    async fn run_pipeline(&self, mut ctx: HookContext<R, P>) -> Result<HookContext<R, P>> {
        let (around, before, after, error) = self.collect_hooks_for_method(ctx.method);
        let svc = Arc::clone(&self.service);

        let mut next: Next<R, P> = Next::new(move |ctx| {
            Box::pin(async move {
                for h in &before {
                    h.run(ctx).await?;
                }

                invoke(svc.as_ref(), ctx).await?;

                for h in after.iter().rev() {
                    h.run(ctx).await?;
                }

                Ok::<(), anyhow::Error>(())
            })
        });

        // first registered around hook is outermost
        for hook in around.into_iter().rev() {
            let prev = next;
            next = Next::new(move |ctx| {
                Box::pin(async move { hook.run(ctx, prev).await })
            });
        }

        if let Err(e) = next.run(&mut ctx).await {
            ctx.error = Some(e);

            for h in &error {
                if let Err(hook_err) = h.run(&mut ctx).await {
                    ctx.error = Some(hook_err);
                }
            }

            if let Some(err) = ctx.error.take() {
                return Err(err);
            }
        }

        Ok(ctx)
    }

    fn context(&self, method: ServiceMethodKind, params: P) -> HookContext<R, P> {
        HookContext::new(
            self.name.clone(),
            method,
            params,
            self.app.config_snapshot(),
        )
    }

    pub async fn find(&self, params: P) -> Result<Vec<R>> {
        let ctx = self.context(ServiceMethodKind::Find, params);
        let ctx = self.run_pipeline(ctx).await?;

        match ctx.result {
            Some(HookResult::Many(v)) => Ok(v),
            Some(HookResult::One(_)) => Err(anyhow!("find() produced HookResult::One unexpectedly")),
            None => Ok(vec![]),
        }
    }

    pub async fn get(&self, id: &str, params: P) -> Result<R> {
        let mut ctx = self.context(ServiceMethodKind::Get, params);
        ctx.id = Some(id.to_string());
        let ctx = self.run_pipeline(ctx).await?;

        match ctx.result {
            Some(HookResult::One(v)) => Ok(v),
            Some(HookResult::Many(_)) => Err(anyhow!("get() produced HookResult::Many unexpectedly")),
            None => Err(anyhow!("get() produced no result")),
        }
    }

    pub async fn patch(&self, id: &str, data: R::Changes, params: P) -> Result<R> {
        let mut ctx = self.context(ServiceMethodKind::Patch, params);
        ctx.id = Some(id.to_string());
        ctx.data = Some(data);
        let ctx = self.run_pipeline(ctx).await?;

        match ctx.result {
            Some(HookResult::One(v)) => Ok(v),
            Some(HookResult::Many(_)) => Err(anyhow!("patch() produced HookResult::Many unexpectedly")),
            None => Err(anyhow!("patch() produced no result")),
        }
    }
}

/// The innermost step of the pipeline: the actual service call.
async fn invoke<R, P>(svc: &dyn CardService<R, P>, ctx: &mut HookContext<R, P>) -> Result<()>
where
    R: Record,
    P: Send + Sync + Clone + 'static,
{
    if !svc.capabilities().allows(ctx.method) {
        return Err(CardError::method_not_allowed(format!(
            "Method '{}' is not allowed on service '{}'",
            ctx.method.as_str(),
            ctx.service
        ))
        .into_anyhow());
    }

    match ctx.method {
        ServiceMethodKind::Find => {
            let records = svc.find(ctx.params.clone()).await?;
            ctx.result = Some(HookResult::Many(records));
        }
        ServiceMethodKind::Get => {
            let id = ctx
                .id
                .clone()
                .ok_or_else(|| CardError::bad_request("get() requires an id").into_anyhow())?;
            let record = svc.get(&id, ctx.params.clone()).await?;
            ctx.result = Some(HookResult::One(record));
        }
        ServiceMethodKind::Patch => {
            let id = ctx
                .id
                .clone()
                .ok_or_else(|| CardError::bad_request("patch() requires an id").into_anyhow())?;
            let data = ctx
                .data
                .take()
                .ok_or_else(|| anyhow!("patch() requires ctx.data"))?;
            let record = svc.patch(&id, data, ctx.params.clone()).await?;
            ctx.result = Some(HookResult::One(record));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;
    use crate::ServiceCapabilities;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: String,
        text: String,
    }

    impl Record for Note {
        type Changes = String;
    }

    struct Notes {
        rows: Mutex<Vec<Note>>,
    }

    impl Notes {
        fn seeded() -> Self {
            Self {
                rows: Mutex::new(vec![
                    Note { id: "a".into(), text: "first".into() },
                    Note { id: "b".into(), text: "second".into() },
                ]),
            }
        }
    }

    #[async_trait]
    impl CardService<Note, ()> for Notes {
        async fn find(&self, _params: ()) -> Result<Vec<Note>> {
            Ok(self.rows.lock().clone())
        }

        async fn get(&self, id: &str, _params: ()) -> Result<Note> {
            self.rows
                .lock()
                .iter()
                .find(|n| n.id == id)
                .cloned()
                .ok_or_else(|| CardError::not_found(format!("No note {id}")).into_anyhow())
        }

        async fn patch(&self, id: &str, data: String, _params: ()) -> Result<Note> {
            let mut rows = self.rows.lock();
            let row = rows
                .iter_mut()
                .find(|n| n.id == id)
                .ok_or_else(|| CardError::not_found(format!("No note {id}")).into_anyhow())?;
            row.text = data;
            Ok(row.clone())
        }
    }

    struct ReadOnlyNotes;

    #[async_trait]
    impl CardService<Note, ()> for ReadOnlyNotes {
        fn capabilities(&self) -> ServiceCapabilities {
            ServiceCapabilities::read_only()
        }
    }

    struct Trace(&'static str, Arc<Mutex<Vec<String>>>);

    #[async_trait]
    impl CardAroundHook<Note, ()> for Trace {
        async fn run(&self, ctx: &mut HookContext<Note, ()>, next: Next<Note, ()>) -> Result<()> {
            self.1.lock().push(format!("{}:enter", self.0));
            let res = next.run(ctx).await;
            self.1.lock().push(format!("{}:exit", self.0));
            res
        }
    }

    #[async_trait]
    impl CardBeforeHook<Note, ()> for Trace {
        async fn run(&self, _ctx: &mut HookContext<Note, ()>) -> Result<()> {
            self.1.lock().push(format!("{}:before", self.0));
            Ok(())
        }
    }

    #[async_trait]
    impl CardAfterHook<Note, ()> for Trace {
        async fn run(&self, _ctx: &mut HookContext<Note, ()>) -> Result<()> {
            self.1.lock().push(format!("{}:after", self.0));
            Ok(())
        }
    }

    struct Shout;

    #[async_trait]
    impl CardBeforeHook<Note, ()> for Shout {
        async fn run(&self, ctx: &mut HookContext<Note, ()>) -> Result<()> {
            if let Some(text) = ctx.data.as_mut() {
                *text = text.to_uppercase();
            }
            Ok(())
        }
    }

    struct RejectEmpty;

    #[async_trait]
    impl CardBeforeHook<Note, ()> for RejectEmpty {
        async fn run(&self, ctx: &mut HookContext<Note, ()>) -> Result<()> {
            if ctx.data.as_deref().is_some_and(|t| t.trim().is_empty()) {
                crate::bail_card!(unprocessable, "text must not be empty");
            }
            Ok(())
        }
    }

    struct CountErrors(Arc<AtomicUsize>);

    #[async_trait]
    impl CardErrorHook<Note, ()> for CountErrors {
        async fn run(&self, _ctx: &mut HookContext<Note, ()>) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct RecoverNotFound;

    #[async_trait]
    impl CardErrorHook<Note, ()> for RecoverNotFound {
        async fn run(&self, ctx: &mut HookContext<Note, ()>) -> Result<()> {
            let missing = ctx
                .error
                .as_ref()
                .and_then(CardError::from_anyhow)
                .is_some_and(|e| e.kind == crate::ErrorKind::NotFound);
            if missing {
                ctx.error = None;
                ctx.result = Some(HookResult::One(Note {
                    id: "fallback".into(),
                    text: String::new(),
                }));
            }
            Ok(())
        }
    }

    fn app() -> CardApp<Note, ()> {
        let app = CardApp::new();
        app.register_service("notes", Arc::new(Notes::seeded()));
        app
    }

    #[tokio::test]
    async fn find_get_and_patch_go_through_the_service() {
        let app = app();
        let notes = app.service("notes").unwrap();

        assert_eq!(notes.find(()).await.unwrap().len(), 2);
        assert_eq!(notes.get("b", ()).await.unwrap().text, "second");

        let patched = notes.patch("a", "changed".into(), ()).await.unwrap();
        assert_eq!(patched.text, "changed");
        assert_eq!(notes.get("a", ()).await.unwrap().text, "changed");
        assert_eq!(notes.get("b", ()).await.unwrap().text, "second");
    }

    #[tokio::test]
    async fn unknown_service_is_an_error() {
        assert!(app().service("missing").is_err());
    }

    #[tokio::test]
    async fn hooks_run_in_feathers_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let app = app();

        app.hooks(|h| {
            h.around_all(Arc::new(Trace("g", Arc::clone(&log))));
            h.before_all(Arc::new(Trace("g", Arc::clone(&log))));
            h.after_all(Arc::new(Trace("g", Arc::clone(&log))));
        });
        let notes = app.service("notes").unwrap().hooks(|h| {
            h.around_all(Arc::new(Trace("s", Arc::clone(&log))));
            h.before_all(Arc::new(Trace("s", Arc::clone(&log))));
            h.after_all(Arc::new(Trace("s", Arc::clone(&log))));
        });

        notes.get("a", ()).await.unwrap();

        assert_eq!(
            *log.lock(),
            vec![
                "g:enter", "s:enter", "g:before", "s:before", "s:after", "g:after", "s:exit",
                "g:exit",
            ]
        );
    }

    #[tokio::test]
    async fn before_patch_hooks_can_rewrite_data() {
        let app = app();
        let notes = app
            .service("notes")
            .unwrap()
            .hooks(|h| {
                h.before_patch(Arc::new(Shout));
            });

        let patched = notes.patch("a", "loud".into(), ()).await.unwrap();
        assert_eq!(patched.text, "LOUD");

        // find is not affected by a patch-only hook
        let all = notes.find(()).await.unwrap();
        assert_eq!(all[1].text, "second");
    }

    #[tokio::test]
    async fn failing_before_hook_skips_the_service_and_runs_error_hooks() {
        let errors = Arc::new(AtomicUsize::new(0));
        let app = app();
        app.hooks(|h| {
            h.error_all(Arc::new(CountErrors(Arc::clone(&errors))));
        });
        let notes = app.service("notes").unwrap().hooks(|h| {
            h.before_patch(Arc::new(RejectEmpty));
        });

        let err = notes.patch("a", "   ".into(), ()).await.unwrap_err();
        let card = CardError::from_anyhow(&err).unwrap();
        assert_eq!(card.kind, crate::ErrorKind::Unprocessable);
        assert_eq!(errors.load(Ordering::SeqCst), 1);
        assert_eq!(notes.get("a", ()).await.unwrap().text, "first");
    }

    #[tokio::test]
    async fn error_hook_may_recover() {
        let app = app();
        let notes = app.service("notes").unwrap().hooks(|h| {
            h.error(ServiceMethodKind::Get, Arc::new(RecoverNotFound));
        });

        let note = notes.get("zzz", ()).await.unwrap();
        assert_eq!(note.id, "fallback");
    }

    #[tokio::test]
    async fn capabilities_gate_methods() {
        let app: CardApp<Note, ()> = CardApp::new();
        app.register_service("ro", Arc::new(ReadOnlyNotes));
        let ro = app.service("ro").unwrap();

        let err = ro.patch("a", "x".into(), ()).await.unwrap_err();
        assert_eq!(
            CardError::from_anyhow(&err).unwrap().kind,
            crate::ErrorKind::MethodNotAllowed
        );

        let err = ro.find(()).await.unwrap_err();
        assert_eq!(
            CardError::from_anyhow(&err).unwrap().kind,
            crate::ErrorKind::NotImplemented
        );
    }

    #[tokio::test]
    async fn hooks_see_config_snapshot() {
        struct RequireFlag;

        #[async_trait]
        impl CardBeforeHook<Note, ()> for RequireFlag {
            async fn run(&self, ctx: &mut HookContext<Note, ()>) -> Result<()> {
                if ctx.config.get_bool("notes.writable") != Some(true) {
                    crate::bail_card!(forbidden, "notes are read-only");
                }
                Ok(())
            }
        }

        let app = app();
        let notes = app.service("notes").unwrap().hooks(|h| {
            h.before_patch(Arc::new(RequireFlag));
        });

        assert!(notes.patch("a", "x".into(), ()).await.is_err());
        app.set("notes.writable", "true");
        assert!(notes.patch("a", "x".into(), ()).await.is_ok());
    }
}
