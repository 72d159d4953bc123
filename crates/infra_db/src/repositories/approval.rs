//! Approval rows

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use app_services::ApprovalQuery;
use core_kernel::ApprovalId;
use domain_approval::{Approval, ApprovalType};

use super::parse;
use crate::error::DatabaseError;

#[derive(Debug, Clone, FromRow)]
pub struct ApprovalRow {
    pub id: Uuid,
    pub ref_id: Uuid,
    pub ref_table: String,
    pub approval_type: String,
    pub action: String,
    pub status: String,
    pub reason: Option<String>,
    pub detail: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ApprovalRow> for Approval {
    type Error = DatabaseError;

    fn try_from(row: ApprovalRow) -> Result<Self, Self::Error> {
        Ok(Approval {
            id: ApprovalId::from_uuid(row.id),
            ref_id: row.ref_id,
            ref_table: row.ref_table,
            approval_type: parse("approval_type", &row.approval_type)?,
            action: parse("action", &row.action)?,
            status: parse("status", &row.status)?,
            reason: row.reason,
            detail: row.detail,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const COLUMNS: &str = "id, ref_id, ref_table, approval_type, action, status, reason, detail, created_at, updated_at";

pub async fn insert(conn: &mut PgConnection, approval: &Approval) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO approvals
            (id, ref_id, ref_table, approval_type, action, status, reason, detail, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(approval.id.as_uuid())
    .bind(approval.ref_id)
    .bind(&approval.ref_table)
    .bind(approval.approval_type.as_str())
    .bind(approval.action.as_str())
    .bind(approval.status.as_str())
    .bind(approval.reason.as_deref())
    .bind(&approval.detail)
    .bind(approval.created_at)
    .bind(approval.updated_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| match DatabaseError::from(e) {
        DatabaseError::DuplicateEntry(_) => {
            DatabaseError::duplicate("Approval", "open ref_id", approval.ref_id)
        }
        other => other,
    })?;
    Ok(())
}

pub async fn update(conn: &mut PgConnection, approval: &Approval) -> Result<(), DatabaseError> {
    let result = sqlx::query("UPDATE approvals SET status = $2, reason = $3, updated_at = $4 WHERE id = $1")
        .bind(approval.id.as_uuid())
        .bind(approval.status.as_str())
        .bind(approval.reason.as_deref())
        .bind(approval.updated_at)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Approval", approval.id));
    }
    Ok(())
}

/// Loads an approval and locks it until the transaction ends
pub async fn get(conn: &mut PgConnection, id: ApprovalId) -> Result<Option<Approval>, DatabaseError> {
    let sql = format!("SELECT {COLUMNS} FROM approvals WHERE id = $1 FOR UPDATE");
    sqlx::query_as::<_, ApprovalRow>(&sql)
        .bind(id.as_uuid())
        .fetch_optional(&mut *conn)
        .await?
        .map(Approval::try_from)
        .transpose()
}

pub async fn open_for(
    conn: &mut PgConnection,
    ref_id: Uuid,
    approval_type: ApprovalType,
) -> Result<Option<Approval>, DatabaseError> {
    let sql = format!("SELECT {COLUMNS} FROM approvals WHERE ref_id = $1 AND approval_type = $2 AND status = 'SUBMIT'");
    sqlx::query_as::<_, ApprovalRow>(&sql)
        .bind(ref_id)
        .bind(approval_type.as_str())
        .fetch_optional(&mut *conn)
        .await?
        .map(Approval::try_from)
        .transpose()
}

pub async fn list(conn: &mut PgConnection, query: &ApprovalQuery) -> Result<Vec<Approval>, DatabaseError> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!("SELECT {COLUMNS} FROM approvals WHERE TRUE"));
    if let Some(approval_type) = query.approval_type {
        builder.push(" AND approval_type = ").push_bind(approval_type.as_str());
    }
    if let Some(status) = query.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }
    builder.push(" ORDER BY created_at DESC, id DESC");
    if let Some(limit) = query.limit {
        builder.push(" LIMIT ").push_bind(i64::from(limit));
    }
    if let Some(offset) = query.offset {
        builder.push(" OFFSET ").push_bind(i64::from(offset));
    }
    builder
        .build_query_as::<ApprovalRow>()
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(Approval::try_from)
        .collect()
}
