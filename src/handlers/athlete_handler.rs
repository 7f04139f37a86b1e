//! handlers/athlete_handler.rs
use actix_web::{web, HttpResponse};

use crate::{
    error::ApiError,
    models::{
        athlete_model::{Athlete, CreateAthleteRequest, CreateTeamRequest, CreatedResponse},
        auth_model::AuthUser,
        card_model::{ApiData, ApiMessage},
    },
    services::{
        access_control::{
            can_access_api, check_athlete_access, is_admin, require_admin, require_api,
            AccessDenied,
        },
        athlete_service::AthleteService,
        storage_service::{DocumentKind, StorageService, MAX_UPLOAD_BYTES},
    },
};

pub(crate) async fn fetch_athlete(athletes: &AthleteService, id: &str) -> Result<Athlete, ApiError> {
    if id.is_empty() || id == "undefined" {
        return Err(ApiError::BadRequest("ID del atleta es obligatorio".to_string()));
    }
    athletes
        .get_athlete(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Atleta no encontrado".to_string()))
}

/// Un usuario solo ve su propia equipe.
fn check_team_access(user: &AuthUser, team_id: &str) -> Result<(), AccessDenied> {
    if can_access_api(user.role, "equipes") || user.team_id.as_deref() == Some(team_id) {
        Ok(())
    } else {
        Err(AccessDenied::OtherTeam)
    }
}

/// POST /api/equipes
pub async fn create_team_endpoint(
    user: AuthUser,
    athletes: web::Data<AthleteService>,
    body: web::Json<CreateTeamRequest>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user, "crear equipes")?;
    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Nombre de la equipe es obligatorio".to_string()));
    }

    let id = athletes.create_team(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(CreatedResponse { success: true, id }))
}

/// GET /api/equipes/{id}
pub async fn get_team_endpoint(
    user: AuthUser,
    athletes: web::Data<AthleteService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let team_id = path.into_inner();
    check_team_access(&user, &team_id)?;

    let team = athletes
        .get_team(&team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Equipe no encontrada".to_string()))?;
    Ok(HttpResponse::Ok().json(ApiData {
        success: true,
        data: team,
    }))
}

/// GET /api/equipes/{id}/atletas
pub async fn list_team_athletes_endpoint(
    user: AuthUser,
    athletes: web::Data<AthleteService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    require_api(&user, "atletas")?;
    let team_id = path.into_inner();
    check_team_access(&user, &team_id)?;

    let list = athletes.list_athletes_by_team(&team_id).await?;
    Ok(HttpResponse::Ok().json(ApiData {
        success: true,
        data: list,
    }))
}

/// POST /api/atletas
/// Un usuario no admin solo puede registrar atletas en su equipe.
pub async fn create_athlete_endpoint(
    user: AuthUser,
    athletes: web::Data<AthleteService>,
    body: web::Json<CreateAthleteRequest>,
) -> Result<HttpResponse, ApiError> {
    require_api(&user, "atletas")?;
    let mut req = body.into_inner();
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Nombre del atleta es obligatorio".to_string()));
    }

    if !is_admin(&user) {
        let team_id = user.team_id.clone().ok_or(AccessDenied::NoTeam)?;
        req.team_id = Some(team_id);
    }

    let id = athletes.create_athlete(req).await?;
    log::info!("Atleta {} creado por {}", id, user.login);
    Ok(HttpResponse::Created().json(CreatedResponse { success: true, id }))
}

/// GET /api/atletas/{id}
pub async fn get_athlete_endpoint(
    user: AuthUser,
    athletes: web::Data<AthleteService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    require_api(&user, "atletas")?;
    let athlete = fetch_athlete(&athletes, &path.into_inner()).await?;
    check_athlete_access(&user, &athlete)?;

    Ok(HttpResponse::Ok().json(ApiData {
        success: true,
        data: athlete,
    }))
}

/// POST /api/atletas/{id}/documentos/{kind}
/// `kind`: foto_3x4 | comprovante_residencia. Cuerpo: archivo crudo.
pub async fn upload_document_endpoint(
    user: AuthUser,
    athletes: web::Data<AthleteService>,
    storage: web::Data<StorageService>,
    path: web::Path<(String, String)>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    require_api(&user, "documentos")?;
    let (athlete_id, kind) = path.into_inner();

    let kind = DocumentKind::parse(&kind)
        .ok_or_else(|| ApiError::BadRequest(format!("Tipo de documento inválido: {}", kind)))?;
    let athlete = fetch_athlete(&athletes, &athlete_id).await?;
    check_athlete_access(&user, &athlete)?;

    if body.is_empty() {
        return Err(ApiError::BadRequest("Archivo es obligatorio".to_string()));
    }
    if body.len() > MAX_UPLOAD_BYTES {
        return Err(ApiError::PayloadTooLarge(format!(
            "El documento no puede superar {} bytes",
            MAX_UPLOAD_BYTES
        )));
    }

    let file_name = storage.save_document(&athlete.id, kind, &body)?;
    Ok(HttpResponse::Ok().json(ApiMessage {
        success: true,
        message: file_name,
    }))
}
