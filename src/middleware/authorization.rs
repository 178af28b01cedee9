use tracing::debug;

use crate::auth::DecodedToken;
use crate::error::ApiError;
use crate::types::Handler;

const ADMIN_ROLE: &str = "admin";

/// Decide whether `handler` may run for the caller of the current request.
///
/// - no allow-list: every handler is open
/// - no decoded token: the request passes (resources mounted outside the
///   authentication layer stay reachable)
/// - role `admin`: every handler is open
/// - otherwise the handler must be in the allow-list
pub fn authorize(handler: Handler, allowed: Option<&[Handler]>, token: Option<&DecodedToken>) -> Result<(), ApiError> {
    let Some(allowed) = allowed else {
        return Ok(());
    };

    let Some(token) = token else {
        debug!("No decoded token; {} passes authorization", handler);
        return Ok(());
    };

    if token.role() == Some(ADMIN_ROLE) || allowed.contains(&handler) {
        return Ok(());
    }

    debug!("{:?} denied {}", token.uid(), handler);
    Err(ApiError::unauthorized("User not authorized."))
}
