//! Bearer token verification
//!
//! The authentication middleware only needs [`TokenVerifier`]. The identity
//! provider client of the embedding application implements it; [`JwtVerifier`]
//! covers HS256-signed tokens with per-user refresh-token revocation.

pub mod jwt;

pub use jwt::JwtVerifier;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::schema::Record;

/// Claims of a verified token, as handed to the handlers of one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecodedToken(Record);

impl DecodedToken {
    /// Wrap verified claims; `uid` is filled from `sub` when the issuer omits it.
    pub fn new(mut claims: Record) -> Self {
        if !claims.contains_key("uid") {
            if let Some(sub) = claims.get("sub").cloned() {
                claims.insert("uid".to_string(), sub);
            }
        }
        Self(claims)
    }

    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.0.get(claim)
    }

    pub fn uid(&self) -> Option<&str> {
        self.get("uid").and_then(Value::as_str)
    }

    pub fn role(&self) -> Option<&str> {
        self.get("role").and_then(Value::as_str)
    }

    pub fn claims(&self) -> &Record {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("token has been revoked")]
    Revoked,

    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify `token` and return its claims. With `check_revoked` the verifier
    /// also rejects tokens issued before the subject's sessions were revoked.
    async fn verify_id_token(&self, token: &str, check_revoked: bool) -> Result<DecodedToken, VerifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn uid_defaults_to_subject() {
        let claims = json!({"sub": "alice", "role": "admin"});
        let token = DecodedToken::new(claims.as_object().cloned().unwrap());
        assert_eq!(token.uid(), Some("alice"));
        assert_eq!(token.role(), Some("admin"));
    }

    #[test]
    fn explicit_uid_is_kept() {
        let claims = json!({"sub": "alice", "uid": "u-1"});
        let token = DecodedToken::new(claims.as_object().cloned().unwrap());
        assert_eq!(token.uid(), Some("u-1"));
        assert_eq!(token.role(), None);
    }
}
