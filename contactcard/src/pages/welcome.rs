use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{Html, IntoResponse, Redirect, Response};

use super::{views, PageError, PageState};

const DASHBOARD: &str = "https://dashboard.heroku.com/apps";

/// `<name>.herokuapp.com[:port]` → `name`.
fn heroku_app_name(host: &str) -> Option<&str> {
    let host = host.split(':').next().unwrap_or(host);
    let name = host.strip_suffix(".herokuapp.com")?;
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then_some(name)
}

pub fn resources_url(headers: &HeaderMap) -> String {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .and_then(heroku_app_name)
        .map(|name| format!("{DASHBOARD}/{name}/resources"))
        .unwrap_or_else(|| DASHBOARD.to_string())
}

/// Setup instructions while Heroku Connect is not provisioned.
pub async fn welcome(
    State(state): State<PageState>,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    if state.probe.is_ready().await? {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(Html(views::welcome(&resources_url(&headers))).into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn host(h: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static(h));
        headers
    }

    #[test]
    fn heroku_hosts_link_to_their_resources_page() {
        assert_eq!(
            resources_url(&host("contact-card-42.herokuapp.com")),
            "https://dashboard.heroku.com/apps/contact-card-42/resources"
        );
        assert_eq!(
            resources_url(&host("demo.herokuapp.com:443")),
            "https://dashboard.heroku.com/apps/demo/resources"
        );
    }

    #[test]
    fn other_hosts_link_to_the_dashboard() {
        assert_eq!(resources_url(&host("localhost:5000")), DASHBOARD);
        assert_eq!(resources_url(&host(".herokuapp.com")), DASHBOARD);
        assert_eq!(resources_url(&HeaderMap::new()), DASHBOARD);
    }
}
