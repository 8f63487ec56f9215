use std::collections::HashMap;
use std::fmt;

use axum::http::{HeaderMap, Uri};

/// Which surface a service call came through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Provider {
    /// JSON routes mounted by `use_service`.
    Rest,
    /// Server-rendered pages.
    Html,
    /// Calls made by the app itself.
    #[default]
    Internal,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Rest => "rest",
            Provider::Html => "html",
            Provider::Internal => "internal",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport details of the request behind a service call.
///
/// Header names are lowercase; values that are not visible ASCII are
/// dropped.
#[derive(Debug, Clone, Default)]
pub struct RestParams {
    pub provider: Provider,
    pub headers: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub method: String,
    pub path: String,
}

impl RestParams {
    pub fn from_parts(
        provider: Provider,
        headers: &HeaderMap,
        query: HashMap<String, String>,
        method: &str,
        uri: &Uri,
    ) -> Self {
        let headers = headers
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();

        Self {
            provider,
            headers,
            query,
            method: method.to_string(),
            path: uri.path().to_string(),
        }
    }

    pub fn internal(method: &str, path: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            ..Self::default()
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|s| s.as_str())
    }

    pub fn request_id(&self) -> Option<&str> {
        self.header(crate::app::REQUEST_ID_HEADER)
    }
}

pub trait FromRestParams: Sized {
    fn from_rest_params(params: RestParams) -> Self;
}

impl FromRestParams for RestParams {
    fn from_rest_params(params: RestParams) -> Self {
        params
    }
}

impl FromRestParams for () {
    fn from_rest_params(_params: RestParams) -> Self {}
}
