//! Reference records: fee configuration, companies, customers, participants,
//! claims, tickets and benefit participations

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use core_kernel::{
    BenefitParticipationId, ClaimId, CompanyId, CustomerId, InvestmentId, ParticipantId, Percent, ProductId, TicketId,
};
use domain_claims::Claim;
use domain_investment::FeeConfiguration;
use domain_party::{BenefitParticipation, Company, Contribution, Customer, DistributionShare, Participant, Ticket};

use super::parse;
use crate::error::DatabaseError;

#[derive(Debug, Clone, FromRow)]
pub struct FeeConfigurationRow {
    pub admin_fee_percent: Decimal,
    pub operational_fee_percent: Decimal,
}

pub async fn fee_configuration(conn: &mut PgConnection) -> Result<FeeConfiguration, DatabaseError> {
    let row = sqlx::query_as::<_, FeeConfigurationRow>(
        "SELECT admin_fee_percent, operational_fee_percent FROM fee_configurations",
    )
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DatabaseError::not_found("FeeConfiguration", "default"))?;
    Ok(FeeConfiguration {
        admin_fee_percent: Percent::new(row.admin_fee_percent).map_err(|e| DatabaseError::decode("admin_fee_percent", e))?,
        operational_fee_percent: Percent::new(row.operational_fee_percent)
            .map_err(|e| DatabaseError::decode("operational_fee_percent", e))?,
    })
}

#[derive(Debug, Clone, FromRow)]
pub struct CompanyRow {
    pub id: Uuid,
    pub name: String,
    pub pic_name: String,
    pub email: String,
    pub status: String,
    pub distribution: Json<Vec<DistributionShare>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CompanyRow> for Company {
    type Error = DatabaseError;

    fn try_from(row: CompanyRow) -> Result<Self, Self::Error> {
        Ok(Company {
            id: CompanyId::from_uuid(row.id),
            name: row.name,
            pic_name: row.pic_name,
            email: row.email,
            status: parse("status", &row.status)?,
            distribution: row.distribution.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub async fn insert_company(conn: &mut PgConnection, company: &Company) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO companies (id, name, pic_name, email, status, distribution, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(company.id.as_uuid())
    .bind(&company.name)
    .bind(&company.pic_name)
    .bind(&company.email)
    .bind(company.status.as_str())
    .bind(Json(&company.distribution))
    .bind(company.created_at)
    .bind(company.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn get_company(conn: &mut PgConnection, id: CompanyId) -> Result<Option<Company>, DatabaseError> {
    sqlx::query_as::<_, CompanyRow>(
        "SELECT id, name, pic_name, email, status, distribution, created_at, updated_at FROM companies WHERE id = $1",
    )
    .bind(id.as_uuid())
    .fetch_optional(&mut *conn)
    .await?
    .map(Company::try_from)
    .transpose()
}

pub async fn update_company(conn: &mut PgConnection, company: &Company) -> Result<(), DatabaseError> {
    let result = sqlx::query("UPDATE companies SET status = $2, distribution = $3, updated_at = $4 WHERE id = $1")
        .bind(company.id.as_uuid())
        .bind(company.status.as_str())
        .bind(Json(&company.distribution))
        .bind(company.updated_at)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Company", company.id));
    }
    Ok(())
}

#[derive(Debug, Clone, FromRow)]
pub struct CustomerRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = DatabaseError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        Ok(Customer {
            id: CustomerId::from_uuid(row.id),
            name: row.name,
            email: row.email,
            phone: row.phone,
            status: parse("status", &row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub async fn insert_customer(conn: &mut PgConnection, customer: &Customer) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO customers (id, name, email, phone, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(customer.id.as_uuid())
    .bind(&customer.name)
    .bind(&customer.email)
    .bind(customer.phone.as_deref())
    .bind(customer.status.as_str())
    .bind(customer.created_at)
    .bind(customer.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn get_customer(conn: &mut PgConnection, id: CustomerId) -> Result<Option<Customer>, DatabaseError> {
    sqlx::query_as::<_, CustomerRow>(
        "SELECT id, name, email, phone, status, created_at, updated_at FROM customers WHERE id = $1",
    )
    .bind(id.as_uuid())
    .fetch_optional(&mut *conn)
    .await?
    .map(Customer::try_from)
    .transpose()
}

pub async fn update_customer(conn: &mut PgConnection, customer: &Customer) -> Result<(), DatabaseError> {
    let result = sqlx::query("UPDATE customers SET status = $2, updated_at = $3 WHERE id = $1")
        .bind(customer.id.as_uuid())
        .bind(customer.status.as_str())
        .bind(customer.updated_at)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Customer", customer.id));
    }
    Ok(())
}

#[derive(Debug, Clone, FromRow)]
pub struct ParticipantRow {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub employer_amount: Decimal,
    pub employee_amount: Decimal,
    pub voluntary_amount: Decimal,
    pub education_fund_amount: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ParticipantRow> for Participant {
    fn from(row: ParticipantRow) -> Self {
        Participant {
            id: ParticipantId::from_uuid(row.id),
            company_id: row.company_id.map(CompanyId::from_uuid),
            customer_id: row.customer_id.map(CustomerId::from_uuid),
            name: row.name,
            email: row.email,
            contribution: Contribution {
                employer: row.employer_amount,
                employee: row.employee_amount,
                voluntary: row.voluntary_amount,
                education_fund: row.education_fund_amount,
            },
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

const PARTICIPANT_COLUMNS: &str = "id, company_id, customer_id, name, email, employer_amount, employee_amount, \
     voluntary_amount, education_fund_amount, is_active, created_at";

pub async fn insert_participant(conn: &mut PgConnection, participant: &Participant) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO participants
            (id, company_id, customer_id, name, email, employer_amount, employee_amount,
             voluntary_amount, education_fund_amount, is_active, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(participant.id.as_uuid())
    .bind(participant.company_id.map(|id| *id.as_uuid()))
    .bind(participant.customer_id.map(|id| *id.as_uuid()))
    .bind(&participant.name)
    .bind(&participant.email)
    .bind(participant.contribution.employer)
    .bind(participant.contribution.employee)
    .bind(participant.contribution.voluntary)
    .bind(participant.contribution.education_fund)
    .bind(participant.is_active)
    .bind(participant.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn get_participant(conn: &mut PgConnection, id: ParticipantId) -> Result<Option<Participant>, DatabaseError> {
    let sql = format!("SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE id = $1");
    let row = sqlx::query_as::<_, ParticipantRow>(&sql)
        .bind(id.as_uuid())
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.map(Participant::from))
}

pub async fn active_participants(conn: &mut PgConnection, company_id: CompanyId) -> Result<Vec<Participant>, DatabaseError> {
    let sql = format!(
        "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE company_id = $1 AND is_active ORDER BY created_at, id"
    );
    let rows = sqlx::query_as::<_, ParticipantRow>(&sql)
        .bind(company_id.as_uuid())
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows.into_iter().map(Participant::from).collect())
}

#[derive(Debug, Clone, FromRow)]
pub struct ClaimRow {
    pub id: Uuid,
    pub claim_number: String,
    pub participant_id: Uuid,
    pub claim_type: String,
    pub amount: Decimal,
    pub full_payout: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ClaimRow> for Claim {
    type Error = DatabaseError;

    fn try_from(row: ClaimRow) -> Result<Self, Self::Error> {
        Ok(Claim {
            id: ClaimId::from_uuid(row.id),
            claim_number: row.claim_number,
            participant_id: ParticipantId::from_uuid(row.participant_id),
            claim_type: parse("claim_type", &row.claim_type)?,
            amount: row.amount,
            full_payout: row.full_payout,
            status: parse("status", &row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub async fn insert_claim(conn: &mut PgConnection, claim: &Claim) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO claims
            (id, claim_number, participant_id, claim_type, amount, full_payout, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(claim.id.as_uuid())
    .bind(&claim.claim_number)
    .bind(claim.participant_id.as_uuid())
    .bind(claim.claim_type.as_str())
    .bind(claim.amount)
    .bind(claim.full_payout)
    .bind(claim.status.as_str())
    .bind(claim.created_at)
    .bind(claim.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn get_claim(conn: &mut PgConnection, id: ClaimId) -> Result<Option<Claim>, DatabaseError> {
    sqlx::query_as::<_, ClaimRow>(
        "SELECT id, claim_number, participant_id, claim_type, amount, full_payout, status, created_at, updated_at \
         FROM claims WHERE id = $1",
    )
    .bind(id.as_uuid())
    .fetch_optional(&mut *conn)
    .await?
    .map(Claim::try_from)
    .transpose()
}

pub async fn update_claim(conn: &mut PgConnection, claim: &Claim) -> Result<(), DatabaseError> {
    let result = sqlx::query("UPDATE claims SET status = $2, updated_at = $3 WHERE id = $1")
        .bind(claim.id.as_uuid())
        .bind(claim.status.as_str())
        .bind(claim.updated_at)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Claim", claim.id));
    }
    Ok(())
}

#[derive(Debug, Clone, FromRow)]
pub struct TicketRow {
    pub id: Uuid,
    pub subject: String,
    pub requester_name: String,
    pub requester_email: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = DatabaseError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        Ok(Ticket {
            id: TicketId::from_uuid(row.id),
            subject: row.subject,
            requester_name: row.requester_name,
            requester_email: row.requester_email,
            status: parse("status", &row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub async fn insert_ticket(conn: &mut PgConnection, ticket: &Ticket) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO tickets (id, subject, requester_name, requester_email, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(ticket.id.as_uuid())
    .bind(&ticket.subject)
    .bind(&ticket.requester_name)
    .bind(&ticket.requester_email)
    .bind(ticket.status.as_str())
    .bind(ticket.created_at)
    .bind(ticket.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn get_ticket(conn: &mut PgConnection, id: TicketId) -> Result<Option<Ticket>, DatabaseError> {
    sqlx::query_as::<_, TicketRow>(
        "SELECT id, subject, requester_name, requester_email, status, created_at, updated_at FROM tickets WHERE id = $1",
    )
    .bind(id.as_uuid())
    .fetch_optional(&mut *conn)
    .await?
    .map(Ticket::try_from)
    .transpose()
}

pub async fn update_ticket(conn: &mut PgConnection, ticket: &Ticket) -> Result<(), DatabaseError> {
    let result = sqlx::query("UPDATE tickets SET status = $2, updated_at = $3 WHERE id = $1")
        .bind(ticket.id.as_uuid())
        .bind(ticket.status.as_str())
        .bind(ticket.updated_at)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Ticket", ticket.id));
    }
    Ok(())
}

#[derive(Debug, Clone, FromRow)]
pub struct BenefitRow {
    pub id: Uuid,
    pub participant_id: Uuid,
    pub benefit_type: String,
    pub product_id: Uuid,
    pub amount: Decimal,
    pub status: String,
    pub investment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<BenefitRow> for BenefitParticipation {
    type Error = DatabaseError;

    fn try_from(row: BenefitRow) -> Result<Self, Self::Error> {
        Ok(BenefitParticipation {
            id: BenefitParticipationId::from_uuid(row.id),
            participant_id: ParticipantId::from_uuid(row.participant_id),
            benefit_type: row.benefit_type,
            product_id: ProductId::from_uuid(row.product_id),
            amount: row.amount,
            status: parse("status", &row.status)?,
            investment_id: row.investment_id.map(InvestmentId::from_uuid),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub async fn insert_benefit(conn: &mut PgConnection, benefit: &BenefitParticipation) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO benefit_participations
            (id, participant_id, benefit_type, product_id, amount, status, investment_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(benefit.id.as_uuid())
    .bind(benefit.participant_id.as_uuid())
    .bind(&benefit.benefit_type)
    .bind(benefit.product_id.as_uuid())
    .bind(benefit.amount)
    .bind(benefit.status.as_str())
    .bind(benefit.investment_id.map(|id| *id.as_uuid()))
    .bind(benefit.created_at)
    .bind(benefit.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn get_benefit(
    conn: &mut PgConnection,
    id: BenefitParticipationId,
) -> Result<Option<BenefitParticipation>, DatabaseError> {
    sqlx::query_as::<_, BenefitRow>(
        "SELECT id, participant_id, benefit_type, product_id, amount, status, investment_id, created_at, updated_at \
         FROM benefit_participations WHERE id = $1",
    )
    .bind(id.as_uuid())
    .fetch_optional(&mut *conn)
    .await?
    .map(BenefitParticipation::try_from)
    .transpose()
}

pub async fn update_benefit(conn: &mut PgConnection, benefit: &BenefitParticipation) -> Result<(), DatabaseError> {
    let result = sqlx::query(
        "UPDATE benefit_participations SET status = $2, investment_id = $3, updated_at = $4 WHERE id = $1",
    )
    .bind(benefit.id.as_uuid())
    .bind(benefit.status.as_str())
    .bind(benefit.investment_id.map(|id| *id.as_uuid()))
    .bind(benefit.updated_at)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("BenefitParticipation", benefit.id));
    }
    Ok(())
}
