use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::ledger::TradeError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".into()),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
            }
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(e.into())
    }
}

impl From<TradeError> for AppError {
    fn from(e: TradeError) -> Self {
        match e {
            TradeError::UserNotFound
            | TradeError::AssetNotFound(_)
            | TradeError::NoPosition(_) => AppError::NotFound(e.to_string()),

            TradeError::AssetInactive(_)
            | TradeError::InvalidAmount(_)
            | TradeError::BelowMinInvestment { .. }
            | TradeError::InsufficientFunds { .. }
            | TradeError::InvalidSellAmount(_) => AppError::BadRequest(e.to_string()),

            TradeError::NoPriceData(_) => AppError::Unavailable(e.to_string()),

            TradeError::Overflow => AppError::Internal(anyhow::anyhow!(e)),
            TradeError::Storage(e) => AppError::Internal(e.into()),
        }
    }
}
