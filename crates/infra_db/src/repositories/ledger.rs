//! Unit links, NAVs and the fee audit trail

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use core_kernel::{CustomerId, FeePeriod, NavId, ParticipantId, ProductId, TransactionFeeId, UnitLinkId};
use domain_fund::{FeeExecution, FeeKey, NetAssetValue, TransactionFee, UnitLink, UnitLinkKey};

use super::{parse, NO_HOLDER};
use crate::error::DatabaseError;

#[derive(Debug, Clone, FromRow)]
pub struct UnitLinkRow {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub participant_id: Option<Uuid>,
    pub product_id: Uuid,
    pub unit_type: String,
    pub transaction_date: NaiveDate,
    pub total_amount: Decimal,
    pub nab: Decimal,
    pub ip: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UnitLinkRow> for UnitLink {
    type Error = DatabaseError;

    fn try_from(row: UnitLinkRow) -> Result<Self, Self::Error> {
        Ok(UnitLink {
            id: UnitLinkId::from_uuid(row.id),
            customer_id: row.customer_id.map(CustomerId::from_uuid),
            participant_id: row.participant_id.map(ParticipantId::from_uuid),
            product_id: ProductId::from_uuid(row.product_id),
            unit_type: parse("unit_type", &row.unit_type)?,
            transaction_date: row.transaction_date,
            total_amount: row.total_amount,
            nab: row.nab,
            ip: row.ip,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct NavRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub nav_date: NaiveDate,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<NavRow> for NetAssetValue {
    fn from(row: NavRow) -> Self {
        NetAssetValue {
            id: NavId::from_uuid(row.id),
            product_id: ProductId::from_uuid(row.product_id),
            nav_date: row.nav_date,
            amount: row.amount,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TransactionFeeRow {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub participant_id: Option<Uuid>,
    pub product_id: Uuid,
    pub unit_type: String,
    pub transaction_date: NaiveDate,
    pub period: String,
    pub nav: Decimal,
    pub ip: Decimal,
    pub portfolio_amount: Decimal,
    pub operation_fee: Decimal,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TransactionFeeRow> for TransactionFee {
    type Error = DatabaseError;

    fn try_from(row: TransactionFeeRow) -> Result<Self, Self::Error> {
        Ok(TransactionFee {
            id: TransactionFeeId::from_uuid(row.id),
            customer_id: row.customer_id.map(CustomerId::from_uuid),
            participant_id: row.participant_id.map(ParticipantId::from_uuid),
            product_id: ProductId::from_uuid(row.product_id),
            unit_type: parse("unit_type", &row.unit_type)?,
            transaction_date: row.transaction_date,
            period: parse("period", &row.period)?,
            nav: row.nav,
            ip: row.ip,
            portfolio_amount: row.portfolio_amount,
            operation_fee: row.operation_fee,
            created_at: row.created_at,
        })
    }
}

const UNIT_LINK_COLUMNS: &str = "id, customer_id, participant_id, product_id, unit_type, transaction_date, \
     total_amount, nab, ip, created_at, updated_at";
const NAV_COLUMNS: &str = "id, product_id, nav_date, amount, created_at, updated_at";
const FEE_COLUMNS: &str = "id, customer_id, participant_id, product_id, unit_type, transaction_date, period, \
     nav, ip, portfolio_amount, operation_fee, created_at";

fn holder_key<T>(id: Option<T>, as_uuid: impl Fn(&T) -> Uuid) -> Uuid {
    id.as_ref().map_or(NO_HOLDER, as_uuid)
}

/// Adds `amount` to the row at `key` in a single statement
///
/// A missing row is inserted pending (`nab = 0`, `ip = 0`); an existing one
/// keeps its price and units until the next repricing.
pub async fn accumulate(conn: &mut PgConnection, key: &UnitLinkKey, amount: Decimal) -> Result<UnitLink, DatabaseError> {
    let pending = UnitLink::pending(key, amount);
    let sql = format!(
        r#"
        INSERT INTO unit_links
            (id, customer_id, participant_id, product_id, unit_type, transaction_date,
             total_amount, nab, ip, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, 0, 0, $8, $8)
        ON CONFLICT (transaction_date, customer_key, participant_key, product_id, unit_type)
        DO UPDATE SET total_amount = unit_links.total_amount + EXCLUDED.total_amount,
                      updated_at = EXCLUDED.updated_at
        RETURNING {UNIT_LINK_COLUMNS}
        "#
    );
    sqlx::query_as::<_, UnitLinkRow>(&sql)
        .bind(pending.id.as_uuid())
        .bind(key.customer_id.map(|id| *id.as_uuid()))
        .bind(key.participant_id.map(|id| *id.as_uuid()))
        .bind(key.product_id.as_uuid())
        .bind(key.unit_type.as_str())
        .bind(key.transaction_date)
        .bind(amount)
        .bind(pending.created_at)
        .fetch_one(&mut *conn)
        .await?
        .try_into()
}

pub async fn find(conn: &mut PgConnection, key: &UnitLinkKey) -> Result<Option<UnitLink>, DatabaseError> {
    let sql = format!(
        "SELECT {UNIT_LINK_COLUMNS} FROM unit_links \
         WHERE transaction_date = $1 AND customer_key = $2 AND participant_key = $3 \
           AND product_id = $4 AND unit_type = $5 \
         FOR UPDATE"
    );
    sqlx::query_as::<_, UnitLinkRow>(&sql)
        .bind(key.transaction_date)
        .bind(holder_key(key.customer_id, |id| *id.as_uuid()))
        .bind(holder_key(key.participant_id, |id| *id.as_uuid()))
        .bind(key.product_id.as_uuid())
        .bind(key.unit_type.as_str())
        .fetch_optional(&mut *conn)
        .await?
        .map(UnitLink::try_from)
        .transpose()
}

pub async fn update(conn: &mut PgConnection, row: &UnitLink) -> Result<(), DatabaseError> {
    let result =
        sqlx::query("UPDATE unit_links SET total_amount = $2, nab = $3, ip = $4, updated_at = $5 WHERE id = $1")
            .bind(row.id.as_uuid())
            .bind(row.total_amount)
            .bind(row.nab)
            .bind(row.ip)
            .bind(row.updated_at)
            .execute(&mut *conn)
            .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("UnitLink", row.id));
    }
    Ok(())
}

/// Rows of one product and day, locked for repricing
pub async fn on_date(conn: &mut PgConnection, product_id: ProductId, date: NaiveDate) -> Result<Vec<UnitLink>, DatabaseError> {
    let sql = format!(
        "SELECT {UNIT_LINK_COLUMNS} FROM unit_links WHERE product_id = $1 AND transaction_date = $2 ORDER BY id FOR UPDATE"
    );
    sqlx::query_as::<_, UnitLinkRow>(&sql)
        .bind(product_id.as_uuid())
        .bind(date)
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(UnitLink::try_from)
        .collect()
}

pub async fn of_participant(conn: &mut PgConnection, participant_id: ParticipantId) -> Result<Vec<UnitLink>, DatabaseError> {
    let sql = format!(
        "SELECT {UNIT_LINK_COLUMNS} FROM unit_links WHERE participant_id = $1 ORDER BY transaction_date, id FOR UPDATE"
    );
    sqlx::query_as::<_, UnitLinkRow>(&sql)
        .bind(participant_id.as_uuid())
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(UnitLink::try_from)
        .collect()
}

/// The most recent row of every holding, priced or not
pub async fn latest(conn: &mut PgConnection) -> Result<Vec<UnitLink>, DatabaseError> {
    let sql = format!(
        "SELECT DISTINCT ON (product_id, participant_key, customer_key, unit_type) {UNIT_LINK_COLUMNS} \
         FROM unit_links \
         ORDER BY product_id, participant_key, customer_key, unit_type, transaction_date DESC"
    );
    sqlx::query_as::<_, UnitLinkRow>(&sql)
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(UnitLink::try_from)
        .collect()
}

pub async fn get_nav(
    conn: &mut PgConnection,
    product_id: ProductId,
    date: NaiveDate,
) -> Result<Option<NetAssetValue>, DatabaseError> {
    let sql = format!("SELECT {NAV_COLUMNS} FROM net_asset_values WHERE product_id = $1 AND nav_date = $2");
    let row = sqlx::query_as::<_, NavRow>(&sql)
        .bind(product_id.as_uuid())
        .bind(date)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.map(NetAssetValue::from))
}

pub async fn navs_for(conn: &mut PgConnection, keys: &[(ProductId, NaiveDate)]) -> Result<Vec<NetAssetValue>, DatabaseError> {
    if keys.is_empty() {
        return Ok(Vec::new());
    }
    let products: Vec<Uuid> = keys.iter().map(|(product_id, _)| *product_id.as_uuid()).collect();
    let dates: Vec<NaiveDate> = keys.iter().map(|(_, date)| *date).collect();
    let sql = format!(
        "SELECT {NAV_COLUMNS} FROM net_asset_values \
         WHERE (product_id, nav_date) IN (SELECT * FROM UNNEST($1::uuid[], $2::date[]))"
    );
    let rows = sqlx::query_as::<_, NavRow>(&sql)
        .bind(products)
        .bind(dates)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows.into_iter().map(NetAssetValue::from).collect())
}

pub async fn insert_nav(conn: &mut PgConnection, nav: &NetAssetValue) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO net_asset_values (id, product_id, nav_date, amount, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(nav.id.as_uuid())
    .bind(nav.product_id.as_uuid())
    .bind(nav.nav_date)
    .bind(nav.amount)
    .bind(nav.created_at)
    .bind(nav.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn update_nav(conn: &mut PgConnection, nav: &NetAssetValue) -> Result<(), DatabaseError> {
    let result = sqlx::query("UPDATE net_asset_values SET amount = $2, updated_at = $3 WHERE id = $1")
        .bind(nav.id.as_uuid())
        .bind(nav.amount)
        .bind(nav.updated_at)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("NetAssetValue", nav.id));
    }
    Ok(())
}

pub async fn insert_fee(conn: &mut PgConnection, fee: &TransactionFee) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO transaction_fees
            (id, customer_id, participant_id, product_id, unit_type, transaction_date, period,
             nav, ip, portfolio_amount, operation_fee, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(fee.id.as_uuid())
    .bind(fee.customer_id.map(|id| *id.as_uuid()))
    .bind(fee.participant_id.map(|id| *id.as_uuid()))
    .bind(fee.product_id.as_uuid())
    .bind(fee.unit_type.as_str())
    .bind(fee.transaction_date)
    .bind(fee.period.to_string())
    .bind(fee.nav)
    .bind(fee.ip)
    .bind(fee.portfolio_amount)
    .bind(fee.operation_fee)
    .bind(fee.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn fees_of(conn: &mut PgConnection, key: &FeeKey) -> Result<Vec<TransactionFee>, DatabaseError> {
    let sql = format!(
        "SELECT {FEE_COLUMNS} FROM transaction_fees \
         WHERE customer_id IS NOT DISTINCT FROM $1 AND participant_id IS NOT DISTINCT FROM $2 \
           AND product_id = $3 AND unit_type = $4 \
         ORDER BY created_at, id"
    );
    sqlx::query_as::<_, TransactionFeeRow>(&sql)
        .bind(key.customer_id.map(|id| *id.as_uuid()))
        .bind(key.participant_id.map(|id| *id.as_uuid()))
        .bind(key.product_id.as_uuid())
        .bind(key.unit_type.as_str())
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(TransactionFee::try_from)
        .collect()
}

pub async fn fee_executed(conn: &mut PgConnection, key: &FeeKey, period: FeePeriod) -> Result<bool, DatabaseError> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM fee_executions
            WHERE customer_key = $1 AND participant_key = $2 AND product_id = $3
              AND unit_type = $4 AND period = $5
        )
        "#,
    )
    .bind(holder_key(key.customer_id, |id| *id.as_uuid()))
    .bind(holder_key(key.participant_id, |id| *id.as_uuid()))
    .bind(key.product_id.as_uuid())
    .bind(key.unit_type.as_str())
    .bind(period.to_string())
    .fetch_one(&mut *conn)
    .await?;
    Ok(exists)
}

pub async fn record_fee_execution(conn: &mut PgConnection, execution: &FeeExecution) -> Result<(), DatabaseError> {
    let key = &execution.key;
    sqlx::query(
        r#"
        INSERT INTO fee_executions (customer_key, participant_key, product_id, unit_type, period, executed_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(holder_key(key.customer_id, |id| *id.as_uuid()))
    .bind(holder_key(key.participant_id, |id| *id.as_uuid()))
    .bind(key.product_id.as_uuid())
    .bind(key.unit_type.as_str())
    .bind(execution.period.to_string())
    .bind(execution.executed_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| match DatabaseError::from(e) {
        DatabaseError::DuplicateEntry(_) => {
            DatabaseError::duplicate("FeeExecution", "period", execution.period)
        }
        other => other,
    })?;
    Ok(())
}
