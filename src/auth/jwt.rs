use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{DecodedToken, TokenVerifier, VerifyError};
use crate::config::AuthConfig;
use crate::schema::Record;

/// Verifies HS256 tokens signed with a shared secret.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
    // uid -> unix seconds before which issued tokens are revoked
    valid_since: RwLock<HashMap<String, i64>>,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.validate_aud = false;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            valid_since: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        let mut verifier = Self::new(&config.jwt_secret);
        if let Some(issuer) = &config.jwt_issuer {
            verifier = verifier.with_issuer(issuer);
        }
        if let Some(audience) = &config.jwt_audience {
            verifier = verifier.with_audience(audience);
        }
        verifier
    }

    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }

    pub fn with_audience(mut self, audience: &str) -> Self {
        self.validation.set_audience(&[audience]);
        self.validation.validate_aud = true;
        self
    }

    /// Revoke every token issued to `uid` up to now.
    pub async fn revoke_refresh_tokens(&self, uid: &str) {
        let now = Utc::now().timestamp();
        self.valid_since.write().await.insert(uid.to_string(), now);
        info!("Revoked tokens for {} issued before {}", uid, now);
    }

    async fn is_revoked(&self, token: &DecodedToken) -> bool {
        let Some(uid) = token.uid() else {
            return false;
        };
        let valid_since = match self.valid_since.read().await.get(uid) {
            Some(since) => *since,
            None => return false,
        };
        // a token without iat cannot prove it postdates the revocation
        match token.get("iat").and_then(Value::as_i64) {
            Some(iat) => iat < valid_since,
            None => true,
        }
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify_id_token(&self, token: &str, check_revoked: bool) -> Result<DecodedToken, VerifyError> {
        let data = decode::<Record>(token, &self.key, &self.validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => VerifyError::Expired,
            _ => VerifyError::Invalid(e.to_string()),
        })?;

        let decoded = DecodedToken::new(data.claims);

        if check_revoked && self.is_revoked(&decoded).await {
            debug!("Rejected revoked token for {:?}", decoded.uid());
            return Err(VerifyError::Revoked);
        }

        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sign_token, TEST_SECRET};
    use serde_json::json;

    #[tokio::test]
    async fn accepts_signed_token() {
        let verifier = JwtVerifier::new(TEST_SECRET);
        let token = sign_token(TEST_SECRET, json!({"sub": "alice", "role": "editor"}));

        let decoded = verifier.verify_id_token(&token, true).await.unwrap();
        assert_eq!(decoded.uid(), Some("alice"));
        assert_eq!(decoded.role(), Some("editor"));
    }

    #[tokio::test]
    async fn rejects_wrong_secret() {
        let verifier = JwtVerifier::new(TEST_SECRET);
        let token = sign_token("another-secret", json!({"sub": "alice"}));

        let err = verifier.verify_id_token(&token, false).await.unwrap_err();
        assert!(matches!(err, VerifyError::Invalid(_)));
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let verifier = JwtVerifier::new(TEST_SECRET);
        let expired = Utc::now().timestamp() - 3600;
        let token = sign_token(TEST_SECRET, json!({"sub": "alice", "exp": expired}));

        let err = verifier.verify_id_token(&token, false).await.unwrap_err();
        assert_eq!(err, VerifyError::Expired);
    }

    #[tokio::test]
    async fn revocation_only_applies_when_checked() {
        let verifier = JwtVerifier::new(TEST_SECRET);
        let issued = Utc::now().timestamp() - 10;
        let token = sign_token(TEST_SECRET, json!({"sub": "alice", "iat": issued}));

        verifier.revoke_refresh_tokens("alice").await;

        assert_eq!(verifier.verify_id_token(&token, true).await.unwrap_err(), VerifyError::Revoked);
        assert!(verifier.verify_id_token(&token, false).await.is_ok());
    }

    #[tokio::test]
    async fn issuer_is_enforced_when_configured() {
        let verifier = JwtVerifier::new(TEST_SECRET).with_issuer("firerest");
        let token = sign_token(TEST_SECRET, json!({"sub": "alice", "iss": "elsewhere"}));

        assert!(verifier.verify_id_token(&token, false).await.is_err());
    }
}
