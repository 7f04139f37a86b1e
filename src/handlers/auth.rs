//! handlers/auth.rs
//! Extractor del usuario autenticado a partir del header Authorization.

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use anyhow::anyhow;
use std::future::{ready, Ready};

use crate::{error::ApiError, models::auth_model::AuthUser, services::access_control::AuthService};

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, ApiError> {
    let auth = req
        .app_data::<web::Data<AuthService>>()
        .ok_or_else(|| ApiError::Internal(anyhow!("AuthService no registrado en la app")))?;

    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    Ok(auth.authenticate(header)?)
}
