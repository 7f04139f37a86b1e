//! app.rs
use crate::handlers::{access_handler, athlete_handler, card_handler, operation_handler};
use crate::services::storage_service::MAX_UPLOAD_BYTES;
use actix_web::web;

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Uploads de modelo y documentos llegan como cuerpo crudo
            .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES + 1024))
            .route("/acesso", web::get().to(access_handler::access_info_endpoint))
            .service(
                web::scope("/carteirinhas")
                    .route(
                        "/configuracao",
                        web::get().to(card_handler::layout_endpoint),
                    )
                    .route(
                        "/modelo",
                        web::get().to(card_handler::download_template_endpoint),
                    )
                    .route(
                        "/modelo",
                        web::post().to(card_handler::upload_template_endpoint),
                    )
                    .route(
                        "/estatisticas",
                        web::get().to(card_handler::statistics_endpoint),
                    )
                    .route(
                        "/lote",
                        web::post().to(card_handler::generate_batch_endpoint),
                    )
                    .route(
                        "/{id}/gerar",
                        web::post().to(card_handler::generate_card_endpoint),
                    )
                    .route(
                        "/{id}/verificar",
                        web::get().to(card_handler::check_card_endpoint),
                    ),
            )
            .service(
                web::scope("/atletas")
                    .route("", web::post().to(athlete_handler::create_athlete_endpoint))
                    .route("/{id}", web::get().to(athlete_handler::get_athlete_endpoint))
                    .route(
                        "/{id}/documentos/{kind}",
                        web::post().to(athlete_handler::upload_document_endpoint),
                    ),
            )
            .service(
                web::scope("/equipes")
                    .route("", web::post().to(athlete_handler::create_team_endpoint))
                    .route("/{id}", web::get().to(athlete_handler::get_team_endpoint))
                    .route(
                        "/{id}/atletas",
                        web::get().to(athlete_handler::list_team_athletes_endpoint),
                    ),
            )
            .service(
                web::scope("/operations")
                    .route(
                        "",
                        web::get().to(operation_handler::list_operations_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::get().to(operation_handler::get_operation_endpoint),
                    ),
            ),
    );
}
