use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};

pub const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// `true` when the edge proxy saw the request over plain HTTP.
///
/// Proxies may append hops (`http, https`); the first value is the client's.
fn arrived_over_http(headers: &HeaderMap) -> bool {
    headers
        .get(FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|proto| proto.trim().eq_ignore_ascii_case("http"))
        .unwrap_or(false)
}

fn https_location(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))?;
    let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    Some(format!("https://{host}{path}"))
}

/// 301 to the `https` URL for requests that reached the edge over HTTP.
pub async fn redirect_to_https(req: Request, next: Next) -> Response {
    if !arrived_over_http(req.headers()) {
        return next.run(req).await;
    }

    match https_location(req.headers(), req.uri()) {
        Some(location) => {
            tracing::debug!(%location, "redirecting to https");
            (
                StatusCode::MOVED_PERMANENTLY,
                [(header::LOCATION, location)],
            )
                .into_response()
        }
        None => {
            tracing::warn!("plain http request without a host, passing through");
            next.run(req).await
        }
    }
}
