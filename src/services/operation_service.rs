use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, SecondsFormat, TimeZone, Utc};
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::models::{
    card_model::CardStatistics,
    operation_model::{ListOperationsResponse, NewOperation, OperationRecord, OP_GENERATE_CARD},
};

/// Formato fijo (milisegundos + Z) para que las fechas se puedan comparar como texto en SQL.
fn timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(sqlx::FromRow)]
struct OperationRow {
    id: String,
    operation_type: String,
    status: String,
    error_message: Option<String>,
    user_name: Option<String>,
    user_role: Option<String>,
    details: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<OperationRow> for OperationRecord {
    type Error = anyhow::Error;

    fn try_from(r: OperationRow) -> Result<Self> {
        Ok(OperationRecord {
            id: r.id,
            operation_type: r.operation_type,
            status: r.status,
            error_message: r.error_message,
            user_name: r.user_name,
            user_role: r.user_role,
            details: r.details,
            created_at: r.created_at.parse().context("created_at inválido")?,
            updated_at: r.updated_at.parse().context("updated_at inválido")?,
        })
    }
}

#[derive(Clone, Debug)]
pub struct OperationService {
    db_pool: Pool<Sqlite>,
}

impl OperationService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        OperationService { db_pool }
    }

    /// Corre migraciones con sqlx
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db_pool)
            .await
            .context("Fallo al correr migraciones")?;
        Ok(())
    }

    /// Registra la operación y devuelve su id
    pub async fn record_operation(&self, op: NewOperation) -> Result<String> {
        let op_id = Uuid::new_v4().to_string();
        let now = timestamp(Utc::now());

        sqlx::query(
            r#"
            INSERT INTO operations (
                id, operation_type, status, error_message,
                user_name, user_role, details, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, NULL, ?4, ?5, ?6, ?7, ?7)
            "#,
        )
        .bind(&op_id)
        .bind(&op.operation_type)
        .bind(&op.status)
        .bind(&op.user_name)
        .bind(&op.user_role)
        .bind(&op.details)
        .bind(&now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar operation")?;

        Ok(op_id)
    }

    /// Actualiza estado y error
    pub async fn update_status(
        &self,
        op_id: &str,
        new_status: &str,
        error_message: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE operations
            SET status = ?2,
                error_message = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(op_id)
        .bind(new_status)
        .bind(error_message)
        .bind(timestamp(Utc::now()))
        .execute(&self.db_pool)
        .await
        .context("Fallo al actualizar operación")?;

        Ok(())
    }

    /// Obtiene la info de una operación
    pub async fn get_operation(&self, op_id: &str) -> Result<Option<OperationRecord>> {
        let row = sqlx::query_as::<_, OperationRow>(
            r#"
            SELECT
                id, operation_type, status, error_message,
                user_name, user_role, details, created_at, updated_at
            FROM operations
            WHERE id = ?1
            "#,
        )
        .bind(op_id)
        .fetch_optional(&self.db_pool)
        .await
        .context("Fallo al buscar operación")?;

        row.map(OperationRecord::try_from).transpose()
    }

    /// Lista operaciones con paginación (page empieza en 1)
    pub async fn list_operations(&self, page: u64, page_size: u64) -> Result<ListOperationsResponse> {
        let page = page.max(1);
        let limit = i64::try_from(page_size).unwrap_or(i64::MAX);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM operations")
            .fetch_one(&self.db_pool)
            .await?;

        // Un offset que no entra en i64 queda fuera de cualquier tabla: página vacía
        let Some(offset) = (page - 1)
            .checked_mul(page_size)
            .and_then(|o| i64::try_from(o).ok())
        else {
            return Ok(ListOperationsResponse {
                total: total as u64,
                page,
                page_size,
                items: vec![],
            });
        };

        let rows = sqlx::query_as::<_, OperationRow>(
            r#"
            SELECT
                id, operation_type, status, error_message,
                user_name, user_role, details, created_at, updated_at
            FROM operations
            ORDER BY created_at DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db_pool)
        .await?;

        let items = rows
            .into_iter()
            .map(OperationRecord::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(ListOperationsResponse {
            total: total as u64,
            page,
            page_size,
            items,
        })
    }

    /// Conteos de carteirinhas generadas: total, en el mes de `now`, fallidas.
    pub async fn card_statistics(&self, now: DateTime<Utc>) -> Result<CardStatistics> {
        let month_start = Utc
            .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
            .single()
            .context("Fecha de inicio de mes inválida")?;

        let (total, this_month, failed): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN status = 'done' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'done' AND created_at >= ?2 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END), 0)
            FROM operations
            WHERE operation_type = ?1
            "#,
        )
        .bind(OP_GENERATE_CARD)
        .bind(timestamp(month_start))
        .fetch_one(&self.db_pool)
        .await
        .context("Fallo al calcular estadísticas")?;

        Ok(CardStatistics {
            total_cards: total as u64,
            cards_this_month: this_month as u64,
            failed_cards: failed as u64,
        })
    }
}
