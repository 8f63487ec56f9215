use std::collections::HashMap;

use axum::{
    extract::rejection::JsonRejection,
    extract::{OriginalUri, Path, Query, State},
    http::HeaderMap,
    routing::{self, MethodRouter},
    Json, Router,
};
use card_core::errors::CardError;
use card_core::{CardApp, Record, ServiceCapabilities, ServiceMethodKind};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::{
    params::{FromRestParams, Provider, RestParams},
    CardAxumError, CardAxumState,
};

fn map_json_rejection(rejection: JsonRejection) -> CardAxumError {
    CardError::bad_request("Failed to parse the request body as JSON")
        .with_errors(json!({"_schema": [rejection.body_text()]}))
        .into()
}

fn params_for<P: FromRestParams>(
    headers: &HeaderMap,
    query: HashMap<String, String>,
    method: &str,
    uri: &axum::http::Uri,
) -> P {
    P::from_rest_params(RestParams::from_parts(
        Provider::Rest,
        headers,
        query,
        method,
        uri,
    ))
}

async fn find<R, P>(
    State(state): State<CardAxumState<R, P>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<Vec<R>>, CardAxumError>
where
    R: Record + Serialize,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let params = params_for::<P>(&headers, query, "GET", &uri);
    let svc = state.app.service(&state.service)?;
    Ok(Json(svc.find(params).await?))
}

async fn get<R, P>(
    State(state): State<CardAxumState<R, P>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> Result<Json<R>, CardAxumError>
where
    R: Record + Serialize,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let params = params_for::<P>(&headers, query, "GET", &uri);
    let svc = state.app.service(&state.service)?;
    Ok(Json(svc.get(&id, params).await?))
}

async fn patch<R, P>(
    State(state): State<CardAxumState<R, P>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
    data: Result<Json<R::Changes>, JsonRejection>,
) -> Result<Json<R>, CardAxumError>
where
    R: Record + Serialize,
    R::Changes: DeserializeOwned,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let Json(data) = data.map_err(map_json_rejection)?;
    let params = params_for::<P>(&headers, query, "PATCH", &uri);
    let svc = state.app.service(&state.service)?;
    Ok(Json(svc.patch(&id, data, params).await?))
}

/// JSON routes for one registered service:
///
/// - `GET /`       → find
/// - `GET /{id}`   → get
/// - `PATCH /{id}` → patch
///
/// Only methods listed in `capabilities` are mounted; the rest answer 405.
pub fn service_router<R, P>(
    service_name: &str,
    app: CardApp<R, P>,
    capabilities: &ServiceCapabilities,
) -> Router<()>
where
    R: Record + Serialize,
    R::Changes: DeserializeOwned,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let state = CardAxumState::new(app, service_name);

    let mut router = Router::new();
    if capabilities.allows(ServiceMethodKind::Find) {
        router = router.route("/", routing::get(find::<R, P>));
    }

    let mut one: MethodRouter<CardAxumState<R, P>> = MethodRouter::new();
    if capabilities.allows(ServiceMethodKind::Get) {
        one = one.get(get::<R, P>);
    }
    if capabilities.allows(ServiceMethodKind::Patch) {
        one = one.patch(patch::<R, P>);
    }

    router.route("/{id}", one).with_state(state)
}
