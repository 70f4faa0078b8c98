use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

/// Success envelope: `{"Code", "Status": "ok", "Message", "Body"}`.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub message: String,
    pub body: Option<T>,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, body: T) -> Self {
        Self {
            message: message.into(),
            body: Some(body),
            status_code: StatusCode::OK,
        }
    }
}

impl ApiResponse<()> {
    /// Envelope with a null body.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            body: None,
            status_code: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body = match self.body.as_ref().map(serde_json::to_value).transpose() {
            Ok(value) => value.unwrap_or(Value::Null),
            Err(e) => {
                tracing::error!("Failed to serialize response body: {}", e);
                return crate::error::ApiError::internal_server_error("failed to serialize response body")
                    .into_response();
            }
        };

        let envelope = json!({
            "Code": self.status_code.as_u16(),
            "Status": "ok",
            "Message": self.message,
            "Body": body,
        });

        (self.status_code, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
