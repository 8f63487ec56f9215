//! One-shot notices carried across a redirect in a cookie.
//!
//! A handler that redirects attaches messages with [`Flash::redirect`];
//! the next page reads them through the [`IncomingFlash`] extractor and
//! clears the cookie with [`IncomingFlash::clear_cookie`].

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Redirect, Response};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "card_flash";

const MAX_AGE_SECS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Success,
    Danger,
}

impl FlashCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashCategory::Success => "success",
            FlashCategory::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub category: FlashCategory,
    pub message: String,
}

/// Outgoing messages.
#[derive(Debug, Default, Clone)]
pub struct Flash {
    messages: Vec<FlashMessage>,
}

impl Flash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, category: FlashCategory, message: impl Into<String>) -> Self {
        self.messages.push(FlashMessage {
            category,
            message: message.into(),
        });
        self
    }

    pub fn success(self, message: impl Into<String>) -> Self {
        self.push(FlashCategory::Success, message)
    }

    pub fn danger(self, message: impl Into<String>) -> Self {
        self.push(FlashCategory::Danger, message)
    }

    fn cookie(&self) -> Option<HeaderValue> {
        let encoded = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&self.messages).ok()?);
        let cookie = format!(
            "{FLASH_COOKIE}={encoded}; Path=/; HttpOnly; SameSite=Lax; Max-Age={MAX_AGE_SECS}"
        );
        HeaderValue::from_str(&cookie).ok()
    }

    /// 303 redirect to `to`, carrying the messages.
    pub fn redirect(self, to: &str) -> Response {
        let mut res = Redirect::to(to).into_response();
        if self.messages.is_empty() {
            return res;
        }

        match self.cookie() {
            Some(cookie) => {
                res.headers_mut().append(SET_COOKIE, cookie);
            }
            None => tracing::warn!("dropping flash messages that could not be encoded"),
        }
        res
    }
}

/// Messages left by the previous response.
#[derive(Debug, Default, Clone)]
pub struct IncomingFlash {
    pub messages: Vec<FlashMessage>,
}

impl IncomingFlash {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear_cookie() -> HeaderValue {
        HeaderValue::from_static("card_flash=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }

    /// Expire the cookie on `res` if anything was read from it.
    pub fn consume(&self, mut res: Response) -> Response {
        if !self.is_empty() {
            res.headers_mut().append(SET_COOKIE, Self::clear_cookie());
        }
        res
    }

    fn decode(raw: &str) -> Option<Vec<FlashMessage>> {
        let bytes = URL_SAFE_NO_PAD.decode(raw.trim()).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    pub fn from_headers(headers: &axum::http::HeaderMap) -> Self {
        let raw = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == FLASH_COOKIE)
            .map(|(_, value)| value);

        let messages = raw.and_then(Self::decode).unwrap_or_default();
        Self { messages }
    }
}

impl<S> FromRequestParts<S> for IncomingFlash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
