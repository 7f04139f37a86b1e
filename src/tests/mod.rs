//! tests/mod.rs
//! Helpers compartidos por las pruebas.

mod access_tests;
mod layout_tests;

use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};

use crate::{
    models::auth_model::{AuthUser, Claims, Role},
    services::operation_service::OperationService,
};

pub const TEST_SECRET: &str = "segredo-de-teste";

/// SQLite en memoria con migraciones. Una sola conexión: cada conexión
/// ":memory:" sería una base distinta.
pub async fn test_pool() -> Pool<Sqlite> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory sqlite");
    OperationService::new(pool.clone())
        .run_migrations()
        .await
        .expect("Failed to run migrations");
    pool
}

pub fn test_user(role: Role, team_id: Option<&str>) -> AuthUser {
    AuthUser {
        id: "u-1".to_string(),
        login: "tester".to_string(),
        name: Some("Tester".to_string()),
        role,
        team_id: team_id.map(str::to_string),
    }
}

pub fn token_for(role: Role, team_id: Option<&str>) -> String {
    let claims = Claims {
        sub: "u-1".to_string(),
        login: "tester".to_string(),
        nome: Some("Tester".to_string()),
        tipo: role,
        id_equipe: team_id.map(str::to_string),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("Failed to encode token")
}

/// PNG mínimo (solo la cabecera, suficiente para la detección por magic bytes)
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];
