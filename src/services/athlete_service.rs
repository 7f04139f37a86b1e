use chrono::Utc;
use sqlx::{Pool, Sqlite};
use thiserror::Error;
use uuid::Uuid;

use crate::models::athlete_model::{Athlete, CreateAthleteRequest, CreateTeamRequest, Team};

#[derive(Debug, Error)]
pub enum AthleteError {
    #[error("CPF inválido")]
    InvalidCpf,

    #[error("CPF {cpf} ya está registrado. Atleta: {existing}")]
    DuplicateCpf { cpf: String, existing: String },

    #[error("Equipe {0} no encontrada")]
    UnknownTeam(String),

    #[error("Error de base de datos: {0}")]
    Database(#[from] sqlx::Error),
}

/// Deja solo los dígitos del CPF ("123.456.789-00" -> "12345678900")
pub fn clean_cpf(cpf: &str) -> String {
    cpf.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Un insert concurrente con el mismo CPF choca con el UNIQUE de la tabla.
pub(crate) fn insert_error(err: sqlx::Error, cpf: &str) -> AthleteError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => AthleteError::DuplicateCpf {
            cpf: cpf.to_string(),
            existing: "registrado en paralelo".to_string(),
        },
        _ => AthleteError::Database(err),
    }
}

#[derive(Clone, Debug)]
pub struct AthleteService {
    db_pool: Pool<Sqlite>,
}

impl AthleteService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        AthleteService { db_pool }
    }

    pub async fn create_team(&self, req: CreateTeamRequest) -> Result<String, AthleteError> {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO teams (id, name, city, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(&id)
            .bind(req.name.trim())
            .bind(&req.city)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.db_pool)
            .await?;

        log::info!("Equipe '{}' creada con id={}", req.name, id);
        Ok(id)
    }

    pub async fn get_team(&self, id: &str) -> Result<Option<Team>, AthleteError> {
        let team = sqlx::query_as::<_, Team>("SELECT id, name, city FROM teams WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;
        Ok(team)
    }

    /// Inserta un atleta. El CPF se normaliza y no puede repetirse.
    pub async fn create_athlete(&self, req: CreateAthleteRequest) -> Result<String, AthleteError> {
        let cpf = clean_cpf(&req.cpf);
        if cpf.is_empty() {
            return Err(AthleteError::InvalidCpf);
        }

        if let Some(existing) = self.get_athlete_by_cpf(&cpf).await? {
            return Err(AthleteError::DuplicateCpf {
                cpf: req.cpf,
                existing: existing.name,
            });
        }

        if let Some(team_id) = &req.team_id {
            if self.get_team(team_id).await?.is_none() {
                return Err(AthleteError::UnknownTeam(team_id.clone()));
            }
        }

        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO athletes (
                id, name, cpf, registration_number, birth_date, team_id, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&id)
        .bind(req.name.trim())
        .bind(&cpf)
        .bind(&req.registration_number)
        .bind(req.birth_date)
        .bind(&req.team_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.db_pool)
        .await
        .map_err(|e| insert_error(e, &req.cpf))?;

        Ok(id)
    }

    pub async fn get_athlete(&self, id: &str) -> Result<Option<Athlete>, AthleteError> {
        let athlete = sqlx::query_as::<_, Athlete>(
            r#"
            SELECT id, name, cpf, registration_number, birth_date, team_id
            FROM athletes
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;
        Ok(athlete)
    }

    pub async fn get_athlete_by_cpf(&self, cpf: &str) -> Result<Option<Athlete>, AthleteError> {
        let athlete = sqlx::query_as::<_, Athlete>(
            r#"
            SELECT id, name, cpf, registration_number, birth_date, team_id
            FROM athletes
            WHERE cpf = ?1
            "#,
        )
        .bind(clean_cpf(cpf))
        .fetch_optional(&self.db_pool)
        .await?;
        Ok(athlete)
    }

    /// Atletas de una equipe ordenados por nombre
    pub async fn list_athletes_by_team(&self, team_id: &str) -> Result<Vec<Athlete>, AthleteError> {
        let rows = sqlx::query_as::<_, Athlete>(
            r#"
            SELECT id, name, cpf, registration_number, birth_date, team_id
            FROM athletes
            WHERE team_id = ?1
            ORDER BY name ASC
            "#,
        )
        .bind(team_id)
        .fetch_all(&self.db_pool)
        .await?;
        Ok(rows)
    }
}
