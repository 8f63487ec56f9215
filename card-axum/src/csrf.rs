//! Per-form CSRF tokens.
//!
//! A token is HMAC-SHA256 of a scope (the record a form edits) keyed with
//! the app secret, so a token lifted from one edit page is useless on
//! another.

use anyhow::anyhow;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

pub const CSRF_FIELD: &str = "csrf_token";

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct CsrfGuard {
    mac: HmacSha256,
}

impl std::fmt::Debug for CsrfGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsrfGuard").finish_non_exhaustive()
    }
}

impl CsrfGuard {
    pub fn new(secret: impl AsRef<[u8]>) -> anyhow::Result<Self> {
        let mac = HmacSha256::new_from_slice(secret.as_ref())
            .map_err(|e| anyhow!("Invalid CSRF secret: {e}"))?;
        Ok(Self { mac })
    }

    pub fn token(&self, scope: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(scope.as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }

    pub fn verify(&self, scope: &str, token: &str) -> bool {
        let expected = self.token(scope);
        expected.as_bytes().ct_eq(token.as_bytes()).into()
    }
}
