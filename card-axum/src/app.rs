use std::sync::Arc;

use axum::body::Body;
use axum::handler::Handler;
use axum::http::{HeaderName, Request};
use axum::middleware;
use axum::routing::get;
use axum::Router;
use card_core::{CardApp, CardService, Record};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::middlewares::https::redirect_to_https;
use crate::params::FromRestParams;
use crate::rest;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Builder tying a `CardApp` to an axum router.
pub struct AxumApp<R, P = ()>
where
    R: Record,
    P: Send + Sync + Clone + 'static,
{
    pub app: CardApp<R, P>,
    pub router: Router<()>,
    force_https: bool,
}

impl<R, P> Clone for AxumApp<R, P>
where
    R: Record,
    P: Send + Sync + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            app: self.app.clone(),
            router: self.router.clone(),
            force_https: self.force_https,
        }
    }
}

impl<R, P> AxumApp<R, P>
where
    R: Record,
    P: Send + Sync + Clone + 'static,
{
    pub fn new(app: CardApp<R, P>) -> Self {
        Self {
            app,
            router: Router::new(),
            force_https: false,
        }
    }

    /// Mount `router` under `path`. Use [`AxumApp::merge`] for the root.
    pub fn use_router(mut self, path: &str, router: Router<()>) -> Self {
        self.router = self.router.nest(path, router);
        self
    }

    pub fn merge(mut self, router: Router<()>) -> Self {
        self.router = self.router.merge(router);
        self
    }

    pub fn use_get<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()> + Clone + Send + Sync + 'static,
        T: 'static,
    {
        let router = Router::new().route("/", get(handler));
        self.use_router(path, router)
    }

    /// Register `service` as `name` and mount its JSON routes under `path`.
    pub fn use_service(
        mut self,
        path: &str,
        name: &str,
        service: Arc<dyn CardService<R, P>>,
    ) -> Self
    where
        R: Serialize,
        R::Changes: DeserializeOwned,
        P: FromRestParams,
    {
        let capabilities = service.capabilities();
        self.app.register_service(name, service);

        let router = rest::service_router(name, self.app.clone(), &capabilities);
        tracing::debug!(service = name, path, "mounted service routes");

        self.router = self.router.nest(path, router);
        self
    }

    /// Redirect plain-HTTP requests (as seen by the edge proxy) to HTTPS.
    pub fn force_https(mut self, enabled: bool) -> Self {
        self.force_https = enabled;
        self
    }

    /// The finished router, wrapped in request-id and tracing layers.
    pub fn into_router(self) -> Router<()> {
        let mut router = self.router;
        if self.force_https {
            router = router.layer(middleware::from_fn(redirect_to_https));
        }

        let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                    let request_id = req
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "http",
                        method = %req.method(),
                        uri = %req.uri(),
                        request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::new(request_id)),
        )
    }

    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        if let Ok(local) = listener.local_addr() {
            tracing::info!(addr = %local, "listening");
        }

        axum::serve(listener, self.into_router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        tracing::info!("server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}

pub fn axum<R, P>(app: CardApp<R, P>) -> AxumApp<R, P>
where
    R: Record,
    P: Send + Sync + Clone + 'static,
{
    AxumApp::new(app)
}
