use crate::application::LibraryError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、エラーコードからHTTPステータスを決める。
#[derive(Debug)]
pub struct ApiError(pub LibraryError);

impl From<LibraryError> for ApiError {
    fn from(err: LibraryError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(LibraryError::InvalidCommand(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(LibraryError::InvalidInput(rejection.body_text()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.code() {
            301..=304 => StatusCode::NOT_FOUND,
            406 => StatusCode::CONFLICT,
            200..=299 => StatusCode::CONFLICT,
            300..=399 => StatusCode::BAD_REQUEST,
            400..=499 => StatusCode::UNPROCESSABLE_ENTITY,
            502 => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self.0.code() {
            301..=304 => "not_found",
            406 => "concurrent_modification",
            200..=299 => "invalid_loan_state",
            300..=399 => "invalid_parameter",
            400..=499 => "operation_failed",
            502 => "invalid_command",
            _ => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.0.code();

        // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
        let message = if self.0.is_internal() {
            tracing::error!(code, error = ?self.0, "internal error");
            "An unexpected error occurred".to_string()
        } else {
            self.0.to_string()
        };

        let body = Json(ErrorResponse::new(self.error_type(), code, message));
        (status, body).into_response()
    }
}
