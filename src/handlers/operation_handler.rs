//! handlers/operation_handler.rs
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::{
    error::ApiError,
    models::auth_model::AuthUser,
    services::{access_control::require_admin, operation_service::OperationService},
};

#[derive(Deserialize)]
pub struct PaginationQuery {
    page: Option<u64>,
    page_size: Option<u64>,
}

/// GET /api/operations
pub async fn list_operations_endpoint(
    user: AuthUser,
    op_service: web::Data<OperationService>,
    query: web::Query<PaginationQuery>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user, "consultar el registro de operaciones")?;
    let page = query.page.unwrap_or(1);
    let page_size = query.page_size.unwrap_or(10).clamp(1, 100);

    let list = op_service.list_operations(page, page_size).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// GET /api/operations/{id}
pub async fn get_operation_endpoint(
    user: AuthUser,
    op_service: web::Data<OperationService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user, "consultar el registro de operaciones")?;
    let op_id = path.into_inner();

    match op_service.get_operation(&op_id).await? {
        Some(op_record) => Ok(HttpResponse::Ok().json(op_record)),
        None => Err(ApiError::NotFound(format!("Operación {} no encontrada", op_id))),
    }
}
