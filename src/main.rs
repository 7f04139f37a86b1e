use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

use crate::config::app_config::AppConfig;
use crate::logger::init_logger;
use crate::services::access_control::AuthService;
use crate::services::athlete_service::AthleteService;
use crate::services::card_service::CardService;
use crate::services::operation_service::OperationService;
use crate::services::pdf_service::PdfService;
use crate::services::storage_service::StorageService;

mod app;
mod config;
mod error;
mod handlers;
mod logger;
mod models;
mod services;

#[cfg(test)]
mod tests;

async fn setup_database(database_url: &str) -> Result<Pool<Sqlite>> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("DATABASE_URL inválido: {}", database_url))?
        .create_if_missing(true);

    // Crear carpeta del archivo si no existe (p.e. ./data)
    let db_file = options.clone().get_filename();
    if let Some(parent) = db_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("No se pudo crear directorio {:?}", parent))?;
        }
    }

    log::info!("Conectando a SQLite en {}", database_url);
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("No se pudo conectar a la base de datos SQLite")
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let config = AppConfig::from_env()?;

    // Layout: se valida al arrancar para fallar rápido si el JSON está mal
    let base_layout = config.base_layout()?;

    let db_pool = setup_database(&config.database_url).await?;

    let operation_service = OperationService::new(db_pool.clone());
    operation_service.run_migrations().await?;

    let athlete_service = AthleteService::new(db_pool.clone());
    let storage_service = StorageService::new(&config.storage_dir)?;
    let pdf_service = PdfService::new(config.wkhtmltopdf_path.clone())?;
    let auth_service = AuthService::new(&config.jwt_secret);

    let card_service = CardService::new(
        pdf_service,
        storage_service.clone(),
        athlete_service.clone(),
        operation_service.clone(),
        base_layout,
        std::env::current_dir().context("No se pudo obtener el current_dir")?,
    );

    log::info!("Levantando servidor en {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(operation_service.clone()))
            .app_data(web::Data::new(athlete_service.clone()))
            .app_data(web::Data::new(storage_service.clone()))
            .app_data(web::Data::new(card_service.clone()))
            .configure(app::init_app)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
