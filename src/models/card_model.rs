//! models/card_model.rs
//! Estructuras de datos para requests/responses de carteirinhas

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Textos ya formateados que se imprimen en la carteirinha.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardData {
    pub name: String,
    pub birth_date: String,
    pub team: String,
    pub validity_year: String,
    pub city: String,
    pub registration_number: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoFormat {
    Png,
    Jpeg,
}

impl PhotoFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            PhotoFormat::Png => "image/png",
            PhotoFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Carteirinha generada (bytes del PDF + nombre de descarga)
#[derive(Debug, Clone)]
pub struct GeneratedCard {
    pub athlete_id: String,
    pub file_name: String,
    pub pdf: Vec<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchCardRequest {
    pub athlete_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchCardResponse {
    pub success: bool,
    pub generated: Vec<StoredCard>,
    pub failed: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredCard {
    pub athlete_id: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentInfo {
    pub name: String,
    pub size: u64,
    pub uploaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardCheckResponse {
    pub can_generate: bool,
    pub has_photo: bool,
    pub has_proof_of_residence: bool,
    pub documents: Vec<DocumentInfo>,
    pub total_files: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CardStatistics {
    pub total_cards: u64,
    pub cards_this_month: u64,
    pub failed_cards: u64,
}

/// Respuesta genérica
#[derive(Debug, Clone, Serialize)]
pub struct ApiMessage {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiData<T: Serialize> {
    pub success: bool,
    pub data: T,
}
