//! Shared-secret token derivation for inbound webhook and return-URL calls.
//!
//! Mobbex does not sign webhooks; instead the endpoint URL registered with
//! the gateway carries a token derived from the configured credential pair.
//! The token is a SHA-256 digest of `api_key|access_token`, so it changes
//! whenever the credentials do and never exposes them.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Separator between the credentials inside the digest input.
const TOKEN_SEPARATOR: &str = "|";

#[derive(Debug, Clone)]
pub struct TokenAuthenticator {
    api_key: String,
    access_token: String,
}

impl TokenAuthenticator {
    pub fn new(api_key: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            access_token: access_token.into(),
        }
    }

    /// Derive the token from the configured credentials. Pure: the same
    /// credentials always produce the same token, even when they are empty.
    /// Readiness gating is the caller's job.
    pub fn generate(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.api_key.as_bytes());
        hasher.update(TOKEN_SEPARATOR.as_bytes());
        hasher.update(self.access_token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Constant-time comparison against the derived token.
    pub fn validate(&self, candidate: &str) -> bool {
        let expected = self.generate();
        let expected = expected.as_bytes();
        let candidate = candidate.as_bytes();

        // Length is not secret: the token is always 64 hex chars.
        if expected.len() != candidate.len() {
            return false;
        }

        expected.ct_eq(candidate).into()
    }
}
