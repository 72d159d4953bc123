//! Investments, their items and payments

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use core_kernel::{
    CompanyId, CustomerId, InvestmentId, InvestmentItemId, ParticipantId, PaymentId, Percent, ProductId,
};
use domain_investment::{Investment, InvestmentCode, InvestmentItem, InvestmentPayment, Investor};

use super::parse;
use crate::error::DatabaseError;

#[derive(Debug, Clone, FromRow)]
pub struct InvestmentRow {
    pub id: Uuid,
    pub code: String,
    pub investment_type: String,
    pub company_id: Option<Uuid>,
    pub participant_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub amount: Decimal,
    pub status: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<InvestmentRow> for Investment {
    type Error = DatabaseError;

    fn try_from(row: InvestmentRow) -> Result<Self, Self::Error> {
        let investor = match (row.company_id, row.participant_id, row.customer_id) {
            (Some(id), _, _) => Investor::Company(CompanyId::from_uuid(id)),
            (None, Some(id), _) => Investor::Participant(ParticipantId::from_uuid(id)),
            (None, None, Some(id)) => Investor::Customer(CustomerId::from_uuid(id)),
            (None, None, None) => return Err(DatabaseError::decode("investor", "no investor column set")),
        };
        Ok(Investment {
            id: InvestmentId::from_uuid(row.id),
            code: InvestmentCode::parse(row.code).map_err(|e| DatabaseError::decode("code", e))?,
            investment_type: parse("investment_type", &row.investment_type)?,
            investor,
            amount: row.amount,
            status: parse("status", &row.status)?,
            source: parse("source", &row.source)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ItemRow {
    pub id: Uuid,
    pub investment_id: Uuid,
    pub product_id: Uuid,
    pub participant_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub percent: Decimal,
    pub amount: Decimal,
    pub fee_amount: Decimal,
    pub total_amount: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for InvestmentItem {
    type Error = DatabaseError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        Ok(InvestmentItem {
            id: InvestmentItemId::from_uuid(row.id),
            investment_id: InvestmentId::from_uuid(row.investment_id),
            product_id: ProductId::from_uuid(row.product_id),
            participant_id: row.participant_id.map(ParticipantId::from_uuid),
            customer_id: row.customer_id.map(CustomerId::from_uuid),
            percent: Percent::new(row.percent).map_err(|e| DatabaseError::decode("percent", e))?,
            amount: row.amount,
            fee_amount: row.fee_amount,
            total_amount: row.total_amount,
            status: parse("status", &row.status)?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PaymentRow {
    pub id: Uuid,
    pub investment_id: Uuid,
    pub amount: Decimal,
    pub status: String,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for InvestmentPayment {
    type Error = DatabaseError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(InvestmentPayment {
            id: PaymentId::from_uuid(row.id),
            investment_id: InvestmentId::from_uuid(row.investment_id),
            amount: row.amount,
            status: parse("status", &row.status)?,
            reference: row.reference,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const INVESTMENT_COLUMNS: &str = "id, code, investment_type, company_id, participant_id, customer_id, \
     amount, status, source, created_at, updated_at";
const ITEM_COLUMNS: &str = "id, investment_id, product_id, participant_id, customer_id, percent, \
     amount, fee_amount, total_amount, status, created_at";
const PAYMENT_COLUMNS: &str = "id, investment_id, amount, status, reference, created_at, updated_at";

pub async fn insert_investment(conn: &mut PgConnection, investment: &Investment) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO investments
            (id, code, investment_type, company_id, participant_id, customer_id,
             amount, status, source, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(investment.id.as_uuid())
    .bind(investment.code.as_str())
    .bind(investment.investment_type.as_str())
    .bind(investment.investor.company_id().map(|id| *id.as_uuid()))
    .bind(investment.investor.participant_id().map(|id| *id.as_uuid()))
    .bind(investment.investor.customer_id().map(|id| *id.as_uuid()))
    .bind(investment.amount)
    .bind(investment.status.as_str())
    .bind(investment.source.as_str())
    .bind(investment.created_at)
    .bind(investment.updated_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| match DatabaseError::from(e) {
        DatabaseError::DuplicateEntry(_) => DatabaseError::duplicate("Investment", "code", &investment.code),
        other => other,
    })?;
    Ok(())
}

pub async fn update_investment(conn: &mut PgConnection, investment: &Investment) -> Result<(), DatabaseError> {
    let result = sqlx::query("UPDATE investments SET status = $2, updated_at = $3 WHERE id = $1")
        .bind(investment.id.as_uuid())
        .bind(investment.status.as_str())
        .bind(investment.updated_at)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Investment", investment.id));
    }
    Ok(())
}

pub async fn get_investment(conn: &mut PgConnection, id: InvestmentId) -> Result<Option<Investment>, DatabaseError> {
    let sql = format!("SELECT {INVESTMENT_COLUMNS} FROM investments WHERE id = $1");
    sqlx::query_as::<_, InvestmentRow>(&sql)
        .bind(id.as_uuid())
        .fetch_optional(&mut *conn)
        .await?
        .map(Investment::try_from)
        .transpose()
}

pub async fn code_exists(conn: &mut PgConnection, code: &InvestmentCode) -> Result<bool, DatabaseError> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM investments WHERE code = $1)")
        .bind(code.as_str())
        .fetch_one(&mut *conn)
        .await?;
    Ok(exists)
}

pub async fn insert_items(conn: &mut PgConnection, items: &[InvestmentItem]) -> Result<(), DatabaseError> {
    for item in items {
        sqlx::query(
            r#"
            INSERT INTO investment_items
                (id, investment_id, product_id, participant_id, customer_id, percent,
                 amount, fee_amount, total_amount, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(item.investment_id.as_uuid())
        .bind(item.product_id.as_uuid())
        .bind(item.participant_id.map(|id| *id.as_uuid()))
        .bind(item.customer_id.map(|id| *id.as_uuid()))
        .bind(item.percent.value())
        .bind(item.amount)
        .bind(item.fee_amount)
        .bind(item.total_amount)
        .bind(item.status.as_str())
        .bind(item.created_at)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn update_item(conn: &mut PgConnection, item: &InvestmentItem) -> Result<(), DatabaseError> {
    let result = sqlx::query("UPDATE investment_items SET status = $2 WHERE id = $1")
        .bind(item.id.as_uuid())
        .bind(item.status.as_str())
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("InvestmentItem", item.id));
    }
    Ok(())
}

pub async fn items_of(conn: &mut PgConnection, investment_id: InvestmentId) -> Result<Vec<InvestmentItem>, DatabaseError> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM investment_items WHERE investment_id = $1 ORDER BY created_at, id");
    sqlx::query_as::<_, ItemRow>(&sql)
        .bind(investment_id.as_uuid())
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(InvestmentItem::try_from)
        .collect()
}

pub async fn insert_payment(conn: &mut PgConnection, payment: &InvestmentPayment) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO investment_payments (id, investment_id, amount, status, reference, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(payment.id.as_uuid())
    .bind(payment.investment_id.as_uuid())
    .bind(payment.amount)
    .bind(payment.status.as_str())
    .bind(payment.reference.as_deref())
    .bind(payment.created_at)
    .bind(payment.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn update_payment(conn: &mut PgConnection, payment: &InvestmentPayment) -> Result<(), DatabaseError> {
    let result =
        sqlx::query("UPDATE investment_payments SET status = $2, reference = $3, updated_at = $4 WHERE id = $1")
            .bind(payment.id.as_uuid())
            .bind(payment.status.as_str())
            .bind(payment.reference.as_deref())
            .bind(payment.updated_at)
            .execute(&mut *conn)
            .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("InvestmentPayment", payment.id));
    }
    Ok(())
}

pub async fn get_payment(conn: &mut PgConnection, id: PaymentId) -> Result<Option<InvestmentPayment>, DatabaseError> {
    let sql = format!("SELECT {PAYMENT_COLUMNS} FROM investment_payments WHERE id = $1");
    sqlx::query_as::<_, PaymentRow>(&sql)
        .bind(id.as_uuid())
        .fetch_optional(&mut *conn)
        .await?
        .map(InvestmentPayment::try_from)
        .transpose()
}

pub async fn payments_of(
    conn: &mut PgConnection,
    investment_id: InvestmentId,
) -> Result<Vec<InvestmentPayment>, DatabaseError> {
    let sql = format!("SELECT {PAYMENT_COLUMNS} FROM investment_payments WHERE investment_id = $1 ORDER BY created_at");
    sqlx::query_as::<_, PaymentRow>(&sql)
        .bind(investment_id.as_uuid())
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(InvestmentPayment::try_from)
        .collect()
}
