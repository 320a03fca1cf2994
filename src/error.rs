//! Erros da API e sua tradução para status HTTP
//!
//! Os handlers devolvem `Result<HttpResponse, ApiError>`; o corpo de erro é
//! sempre `{"error": "<mensagem>"}`. Para falhas internas a causa real só vai
//! para o log, o cliente recebe a mensagem genérica.

use std::fmt::Display;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    /// Registra a causa e devolve o erro 500 com a mensagem pública
    pub fn internal<E: Display>(message: &'static str) -> impl FnOnce(E) -> ApiError {
        move |cause| {
            tracing::error!(error = %cause, "{}", message);
            ApiError::Internal(message.to_string())
        }
    }

    /// Igual a `internal`, mas violação de unicidade vira 409
    pub fn from_write(
        message: &'static str,
        conflict: &'static str,
    ) -> impl FnOnce(DbErr) -> ApiError {
        move |err| match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => ApiError::Conflict(conflict.to_string()),
            _ => ApiError::internal(message)(err),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}
