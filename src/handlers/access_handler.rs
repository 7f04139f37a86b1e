//! handlers/access_handler.rs
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::{
    error::ApiError,
    models::{auth_model::AuthUser, card_model::ApiData},
    services::access_control::{access_info, can_access_page},
};

#[derive(Deserialize)]
pub struct PageQuery {
    pagina: Option<String>,
}

/// GET /api/acesso?pagina=equipes
/// Permisos del usuario actual; con `pagina` indica además si puede abrirla.
pub async fn access_info_endpoint(
    user: AuthUser,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let page_allowed = query
        .pagina
        .as_deref()
        .map(|page| can_access_page(user.role, page));

    Ok(HttpResponse::Ok().json(ApiData {
        success: true,
        data: serde_json::json!({
            "tipo": user.role,
            "acesso": access_info(user.role),
            "paginaPermitida": page_allowed,
        }),
    }))
}
