//! handlers/card_handler.rs
//! Endpoints de carteirinhas (/api/carteirinhas).

use actix_files::NamedFile;
use actix_web::{
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    web, HttpResponse,
};
use chrono::Utc;

use crate::{
    error::ApiError,
    handlers::athlete_handler::fetch_athlete,
    models::{
        auth_model::AuthUser,
        card_model::{ApiData, ApiMessage, BatchCardRequest},
        operation_model::{NewOperation, OP_UPLOAD_TEMPLATE},
    },
    services::{
        access_control::{check_athlete_access, require_admin, require_api},
        athlete_service::AthleteService,
        card_service::CardService,
        operation_service::OperationService,
        storage_service::{detect_image_format, StorageService, MAX_UPLOAD_BYTES},
    },
};

const API_NAME: &str = "carteirinhas";

/// POST /api/carteirinhas/{id}/gerar
/// Retorna el PDF de la carteirinha como adjunto.
pub async fn generate_card_endpoint(
    user: AuthUser,
    path: web::Path<String>,
    athletes: web::Data<AthleteService>,
    cards: web::Data<CardService>,
) -> Result<HttpResponse, ApiError> {
    require_api(&user, API_NAME)?;
    let athlete = fetch_athlete(&athletes, &path.into_inner()).await?;
    check_athlete_access(&user, &athlete)?;

    let card = cards.generate(&athlete, &user).await?;

    Ok(HttpResponse::Ok()
        .append_header(("Content-Type", "application/pdf"))
        .append_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", card.file_name),
        ))
        .append_header(("Cache-Control", "no-cache"))
        .append_header(("Pragma", "no-cache"))
        .body(card.pdf))
}

/// POST /api/carteirinhas/lote
/// Los PDFs quedan guardados en STORAGE_DIR/carteirinhas.
pub async fn generate_batch_endpoint(
    user: AuthUser,
    body: web::Json<BatchCardRequest>,
    athletes: web::Data<AthleteService>,
    cards: web::Data<CardService>,
) -> Result<HttpResponse, ApiError> {
    require_api(&user, API_NAME)?;

    let mut allowed = vec![];
    let mut rejected = vec![];
    for id in &body.athlete_ids {
        match athletes.get_athlete(id).await? {
            Some(athlete) if check_athlete_access(&user, &athlete).is_ok() => allowed.push(athlete),
            Some(_) => {
                log::warn!("Usuario {} sin acceso al atleta {}", user.login, id);
                rejected.push(id.clone());
            }
            None => {
                log::warn!("Atleta {} no encontrado en lote", id);
                rejected.push(id.clone());
            }
        }
    }

    let mut response = cards.generate_batch(&allowed, &user).await;
    if !rejected.is_empty() {
        response.success = false;
        response.failed.extend(rejected);
    }
    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/carteirinhas/{id}/verificar
pub async fn check_card_endpoint(
    user: AuthUser,
    path: web::Path<String>,
    athletes: web::Data<AthleteService>,
    storage: web::Data<StorageService>,
) -> Result<HttpResponse, ApiError> {
    require_api(&user, API_NAME)?;
    let athlete = fetch_athlete(&athletes, &path.into_inner()).await?;
    check_athlete_access(&user, &athlete)?;

    let check = storage.check_card_documents(&athlete.id)?;
    Ok(HttpResponse::Ok().json(ApiData {
        success: true,
        data: check,
    }))
}

/// GET /api/carteirinhas/configuracao
pub async fn layout_endpoint(
    user: AuthUser,
    cards: web::Data<CardService>,
) -> Result<HttpResponse, ApiError> {
    require_api(&user, API_NAME)?;
    Ok(HttpResponse::Ok().json(ApiData {
        success: true,
        data: cards.layout(),
    }))
}

/// GET /api/carteirinhas/modelo
/// Descarga el modelo subido o el local por defecto.
pub async fn download_template_endpoint(
    user: AuthUser,
    cards: web::Data<CardService>,
) -> Result<NamedFile, ApiError> {
    require_api(&user, API_NAME)?;

    let path = cards
        .template_path()
        .ok_or_else(|| ApiError::NotFound("Modelo de carteirinha no encontrado".to_string()))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "carteirinha_modelo".to_string());

    let file = NamedFile::open(&path).map_err(anyhow::Error::from)?;
    Ok(file.set_content_disposition(ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(file_name)],
    }))
}

/// POST /api/carteirinhas/modelo
/// Cuerpo: imagen PNG/JPEG cruda. Solo admin.
pub async fn upload_template_endpoint(
    user: AuthUser,
    body: web::Bytes,
    storage: web::Data<StorageService>,
    operations: web::Data<OperationService>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&user, "subir el modelo de carteirinha")?;

    if body.is_empty() {
        return Err(ApiError::BadRequest("Archivo del modelo es obligatorio".to_string()));
    }
    if body.len() > MAX_UPLOAD_BYTES {
        return Err(ApiError::PayloadTooLarge(format!(
            "El modelo no puede superar {} bytes",
            MAX_UPLOAD_BYTES
        )));
    }
    if detect_image_format(&body).is_none() {
        return Err(ApiError::BadRequest(
            "El modelo debe ser una imagen PNG o JPEG".to_string(),
        ));
    }

    let path = storage.save_template(&body)?;

    operations
        .record_operation(NewOperation {
            operation_type: OP_UPLOAD_TEMPLATE.to_string(),
            status: "done".to_string(),
            user_name: Some(user.display_name().to_string()),
            user_role: Some(user.role.as_str().to_string()),
            details: Some(serde_json::json!({ "path": path, "bytes": body.len() }).to_string()),
        })
        .await?;

    Ok(HttpResponse::Ok().json(ApiMessage {
        success: true,
        message: "Modelo de carteirinha actualizado".to_string(),
    }))
}

/// GET /api/carteirinhas/estatisticas
pub async fn statistics_endpoint(
    user: AuthUser,
    operations: web::Data<OperationService>,
) -> Result<HttpResponse, ApiError> {
    require_api(&user, API_NAME)?;
    let stats = operations.card_statistics(Utc::now()).await?;
    Ok(HttpResponse::Ok().json(ApiData {
        success: true,
        data: stats,
    }))
}
