use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::Value;

/// Successful resource response: status, optional `Location`, optional JSON body
#[derive(Debug)]
pub struct ApiResponse {
    pub status_code: StatusCode,
    pub location: Option<String>,
    pub body: Option<Value>,
}

impl ApiResponse {
    /// 200 with a JSON body
    pub fn success(body: Value) -> Self {
        Self {
            status_code: StatusCode::OK,
            location: None,
            body: Some(body),
        }
    }

    /// 201 with a JSON body
    pub fn created(body: Value) -> Self {
        Self {
            status_code: StatusCode::CREATED,
            location: None,
            body: Some(body),
        }
    }

    /// 200 without a body
    pub fn empty() -> Self {
        Self {
            status_code: StatusCode::OK,
            location: None,
            body: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let mut response = match self.body {
            Some(body) => (self.status_code, Json(body)).into_response(),
            None => self.status_code.into_response(),
        };

        if let Some(location) = self.location {
            match HeaderValue::from_str(&location) {
                Ok(value) => {
                    response.headers_mut().insert(header::LOCATION, value);
                }
                Err(e) => tracing::error!("Invalid Location header {}: {}", location, e),
            }
        }

        response
    }
}

// Convenience type alias
pub type ApiResult = Result<ApiResponse, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn created_sets_status_and_location() {
        let response = ApiResponse::created(json!({"data": {}}))
            .with_location("/users/alice")
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::LOCATION], "/users/alice");
    }

    #[tokio::test]
    async fn empty_has_no_body() {
        let response = ApiResponse::empty().into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }
}
