use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::auth::{DecodedToken, JwtVerifier, TokenVerifier, VerifyError};
use crate::config::{AuthConfig, VerificationMode};
use crate::error::ApiError;

const TOKEN_REQUIRED: &str = "Auth token required";
const TOKEN_REQUIRED_DESCRIPTION: &str = "Please provide an auth token as part of the request.";
const AUTHENTICATION_REQUIRED: &str = "Authentication required";
const REVOKED_DESCRIPTION: &str = "The provided auth token has been revoked. Please request a new token and try again.";
const INVALID_DESCRIPTION: &str = "The provided auth token is not valid. Please request a new token and try again.";

/// Shared state of the authentication layer
#[derive(Clone)]
pub struct Authentication {
    verifier: Arc<dyn TokenVerifier>,
    mode: VerificationMode,
}

impl Authentication {
    pub fn new(verifier: Arc<dyn TokenVerifier>, mode: VerificationMode) -> Self {
        Self { verifier, mode }
    }

    /// HS256 verification with the configured secret, issuer and audience
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(Arc::new(JwtVerifier::from_config(config)), config.verification_mode)
    }

    pub fn mode(&self) -> VerificationMode {
        self.mode
    }

    /// Verify a raw bearer token the way the middleware does.
    pub async fn verify(&self, token: &str) -> Result<DecodedToken, ApiError> {
        let checked = self.verifier.verify_id_token(token, true).await.map_err(|e| {
            warn!("Rejected auth token: {}", e);
            let description = match e {
                VerifyError::Revoked => REVOKED_DESCRIPTION,
                _ => INVALID_DESCRIPTION,
            };
            ApiError::authentication_required(AUTHENTICATION_REQUIRED, description)
        })?;

        match self.mode {
            VerificationMode::RevocationChecked => Ok(checked),
            VerificationMode::Dual => self.verifier.verify_id_token(token, false).await.map_err(|e| {
                warn!("Rejected auth token: {}", e);
                ApiError::authentication_required(AUTHENTICATION_REQUIRED, INVALID_DESCRIPTION)
            }),
        }
    }
}

/// Bearer token middleware: every request behind it carries a [`DecodedToken`]
/// in its extensions, or is answered with 401.
pub async fn authenticate(
    State(auth): State<Authentication>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())
        .ok_or_else(|| ApiError::authentication_required(TOKEN_REQUIRED, TOKEN_REQUIRED_DESCRIPTION))?;

    let decoded = auth.verify(&token).await?;
    request.extensions_mut().insert(decoded);

    Ok(next.run(request).await)
}

/// Extract the token of an `Authorization: Bearer <token>` header
fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.to_string())
}
