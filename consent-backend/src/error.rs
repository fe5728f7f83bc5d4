// src/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Origin not allowed")]
    OriginNotAllowed,

    #[error("Domain not allowed: {0}")]
    DomainNotAllowed(String),

    #[error("Domain could not be resolved")]
    DomainUnresolvable,

    #[error("Backend storage is not configured")]
    Configuration,

    #[error("Storage error: {0}")]
    Storage(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

// axum でエラーをHTTPレスポンスに変換するための実装
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::MalformedRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::InvalidPayload(message) => (StatusCode::BAD_REQUEST, message),
            AppError::OriginNotAllowed => {
                (StatusCode::FORBIDDEN, "Origin not allowed".to_string())
            }
            AppError::DomainNotAllowed(domain) => {
                tracing::warn!(domain = %domain, "Rejected event for unauthorized domain");
                (StatusCode::FORBIDDEN, "Domain not allowed".to_string())
            }
            AppError::DomainUnresolvable => (
                StatusCode::FORBIDDEN,
                "Domain could not be resolved".to_string(),
            ),
            // 欠落している環境変数の名前はクライアントに返さない
            AppError::Configuration => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server configuration error".to_string(),
            ),
            AppError::Storage(db_err) => {
                // サーバーログには詳細を出す
                tracing::error!(error = %db_err, "Failed to store consent event");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to store event".to_string(),
                )
            }
            AppError::Internal(message) => {
                tracing::error!(error = %message, "Unhandled failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

// Result 型のエイリアス
pub type AppResult<T> = Result<T, AppError>;

/// 統一的なエラーレスポンス構造
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
