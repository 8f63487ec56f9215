use std::sync::Arc;

use anyhow::{Context, Result};
use card_axum::{axum, AxumApp, CsrfGuard};
use card_core::{CardApp, CardService};
use card_sqlx::{PgPoolFactory, SchemaName, SchemaProbe};

use crate::config::{self, MEMORY_URL_PREFIX};
use crate::pages::{self, PageState};
use crate::services::adapters::{MemoryContacts, PgContacts};
use crate::services::contacts::contacts_shared::SERVICE;
use crate::services::{self, Contact, ContactParams};
use crate::sync::{StaticProbe, SyncProbe};

/// Where contacts come from, and how to tell whether they exist yet.
pub struct Backend {
    pub store: Arc<dyn CardService<Contact, ContactParams>>,
    pub probe: Arc<dyn SyncProbe>,
}

impl Backend {
    /// Seeded in-memory contacts; the sync is always "ready".
    pub fn memory() -> Self {
        Self {
            store: Arc::new(MemoryContacts::demo()),
            probe: Arc::new(StaticProbe::new(true)),
        }
    }

    /// Lazily connected pool: the app starts while the database is down
    /// and serves 500 pages until it comes back.
    pub fn postgres(url: &str, schema: SchemaName, max_connections: u32) -> Result<Self> {
        let pool = PgPoolFactory::connect_lazy(url, max_connections)?;
        Ok(Self {
            store: Arc::new(PgContacts::new(pool.clone(), schema.clone())),
            probe: Arc::new(SchemaProbe::new(pool, schema)),
        })
    }

    pub fn from_config(app: &CardApp<Contact, ContactParams>) -> Result<Self> {
        let cfg = app.config_snapshot();
        let url = cfg.get("database.url").context("Missing database.url")?;

        if url.starts_with(MEMORY_URL_PREFIX) {
            tracing::info!("using the in-memory contact store");
            return Ok(Self::memory());
        }

        let schema = SchemaName::parse(cfg.get("database.schema").unwrap_or("salesforce"))?;
        let max_connections = cfg.get_usize("database.max_connections").unwrap_or(5);
        let max_connections = u32::try_from(max_connections).unwrap_or(u32::MAX);

        tracing::info!(schema = %schema, max_connections, "using postgres contact store");
        Self::postgres(url, schema, max_connections)
    }
}

/// A configured `CardApp` with the global hooks installed.
pub fn contact_app<F>(lookup: F) -> Result<CardApp<Contact, ContactParams>>
where
    F: Fn(&str) -> Option<String>,
{
    let app: CardApp<Contact, ContactParams> = CardApp::new();
    config::config(&app, lookup)?;
    crate::hooks::global_hooks(&app);
    Ok(app)
}

/// Mount the contacts service, its JSON routes, the pages and `/health`.
pub fn build_with(
    app: CardApp<Contact, ContactParams>,
    backend: Backend,
) -> Result<AxumApp<Contact, ContactParams>> {
    let cfg = app.config_snapshot();
    let secret = cfg
        .get("security.secret_key")
        .context("Missing security.secret_key")?;
    let force_https = cfg.get_bool("http.force_https").unwrap_or(true);

    let pages = pages::router(PageState {
        app: app.clone(),
        probe: Arc::clone(&backend.probe),
        csrf: CsrfGuard::new(secret)?,
    });

    let svcs = services::configure(backend.store);
    let ax = axum(app).use_service("/api/contacts", SERVICE, Arc::clone(&svcs.contacts));
    services::register_hooks(&ax.app, &svcs, backend.probe)?;

    Ok(ax
        .merge(pages)
        .use_get("/health", || async { "ok" })
        .force_https(force_https))
}

pub fn build_from<F>(lookup: F) -> Result<AxumApp<Contact, ContactParams>>
where
    F: Fn(&str) -> Option<String>,
{
    let app = contact_app(lookup)?;
    let backend = Backend::from_config(&app)?;
    build_with(app, backend)
}

/// Build from the process environment.
pub fn build() -> Result<AxumApp<Contact, ContactParams>> {
    build_from(config::from_env)
}
