//! models/athlete_model.rs
//! Atletas y equipes (solo lo necesario para emitir carteirinhas).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Athlete {
    pub id: String,
    pub name: String,
    pub cpf: String,
    pub registration_number: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub team_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAthleteRequest {
    pub name: String,
    /// Se aceptan puntos y guiones, se guardan solo los dígitos
    pub cpf: String,
    pub registration_number: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub team_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub id: String,
}
