use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const OP_GENERATE_CARD: &str = "generate_card";
pub const OP_UPLOAD_TEMPLATE: &str = "upload_card_template";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRecord {
    pub id: String,
    pub operation_type: String,
    pub status: String, // "running", "done", "failed"
    pub error_message: Option<String>,
    pub user_name: Option<String>,
    pub user_role: Option<String>,
    pub details: Option<String>, // JSON adicional
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request para registrar una operación
#[derive(Debug, Clone)]
pub struct NewOperation {
    // "generate_card", "upload_card_template", etc.
    pub operation_type: String,
    pub status: String,
    pub user_name: Option<String>,
    pub user_role: Option<String>,
    pub details: Option<String>,
}

/// Para listar operaciones con paginación
#[derive(Debug, Clone, Serialize)]
pub struct ListOperationsResponse {
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub items: Vec<OperationRecord>,
}
