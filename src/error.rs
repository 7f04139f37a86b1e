//! error.rs
//! Errores de la capa HTTP.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::{
    models::card_model::ApiMessage,
    services::{access_control::AccessDenied, athlete_service::AthleteError},
};

#[derive(Error, Debug)]
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
    PayloadTooLarge(String),

    #[error("Internal server error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Internal(e) = self {
            log::error!("Error interno: {:?}", e);
        }
        HttpResponse::build(self.status_code()).json(ApiMessage {
            success: false,
            message: self.to_string(),
        })
    }
}

impl From<AccessDenied> for ApiError {
    fn from(e: AccessDenied) -> Self {
        match e {
            AccessDenied::MissingToken | AccessDenied::InvalidToken => {
                ApiError::Unauthorized(e.to_string())
            }
            _ => ApiError::Forbidden(e.to_string()),
        }
    }
}

impl From<AthleteError> for ApiError {
    fn from(e: AthleteError) -> Self {
        match e {
            AthleteError::Database(db) => ApiError::Internal(db.into()),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}
