//! config/app_config.rs
//! Configuración del servicio leída de variables de entorno (.env vía dotenv).

use anyhow::{anyhow, Context, Result};
use std::{env, fmt::Display, fs, path::PathBuf, str::FromStr};

use crate::config::card_layout::{self, LayoutConfiguration};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub storage_dir: PathBuf,
    /// JSON opcional que reemplaza el layout base de la carteirinha
    pub card_layout_file: Option<PathBuf>,
    pub wkhtmltopdf_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET no está definido")?;
        if jwt_secret.trim().is_empty() {
            return Err(anyhow!("JWT_SECRET no puede estar vacío"));
        }

        Ok(Self {
            host: try_load("HOST", "0.0.0.0")?,
            port: try_load("PORT", "5022")?,
            database_url: try_load("DATABASE_URL", "sqlite:./data/federation.db")?,
            jwt_secret,
            storage_dir: try_load::<String>("STORAGE_DIR", "./files")?.into(),
            card_layout_file: env::var("CARD_LAYOUT_FILE").ok().map(PathBuf::from),
            wkhtmltopdf_path: env::var("WKHTMLTOPDF_PATH").ok().map(PathBuf::from),
        })
    }

    /// Layout base: el archivo de CARD_LAYOUT_FILE si existe, si no la constante.
    pub fn base_layout(&self) -> Result<LayoutConfiguration> {
        match &self.card_layout_file {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("No se pudo leer layout en {:?}", path))?;
                let layout = LayoutConfiguration::from_json(&raw)
                    .with_context(|| format!("Layout inválido en {:?}", path))?;
                log::info!("Layout de carteirinha cargado desde {:?}", path);
                Ok(layout)
            }
            None => Ok(card_layout::BASE_LAYOUT),
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        log::info!("{} no definido, usando valor por defecto: {}", key, default);
        default.to_string()
    });
    raw.parse()
        .map_err(|e| anyhow!("Valor inválido para {}: {}", key, e))
}
