use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lex_rag::AskError;
use serde_json::json;

/// An [`AskError`] rendered as `{"error": message}` with its status code.
#[derive(Debug)]
pub struct ApiError(pub AskError);

impl From<AskError> for ApiError {
    fn from(err: AskError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "error": self.0.message() }))).into_response()
    }
}
