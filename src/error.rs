use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::error::Error;
use thiserror::Error;

use crate::api::MessageResponse;

#[derive(Debug, Error)]
pub enum ObjectStorageError {
    #[error("S3Error: {0}")]
    S3Error(Box<dyn Error + Send + Sync + 'static>),
    #[error("InvalidContentType: {0}")]
    InvalidContentType(String),
    #[error("EmptyUpload: {0}")]
    EmptyUpload(String),
}

/// Everything a handler can fail with, mapped onto a status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("ValidationError: {0}")]
    Validation(String),
    #[error("NotFound: {0}")]
    NotFound(&'static str),
    #[error("StoreError: {0}")]
    Store(#[from] anyhow::Error),
    #[error("Unavailable: {0}")]
    Unavailable(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Validation(msg) => msg,
            ApiError::NotFound(msg) | ApiError::Unavailable(msg) => msg.to_string(),
            ApiError::Store(err) => {
                tracing::error!(error = %crate::unpack_error(&*err), "record store failure");
                "Server error".to_string()
            }
        };

        (status, Json(MessageResponse { message })).into_response()
    }
}
