//! PostgreSQL adapter tests
//!
//! Each test starts its own container. Run with `cargo test -- --ignored`
//! on a machine with Docker.

use std::sync::Arc;

use rust_decimal_macros::dec;

use app_services::{
    ApprovalQuery, ApprovalRepository, EngineConfig, LedgerRepository, PensionEngine, ReferenceRepository, Store,
};
use core_kernel::{AdapterHealth, HealthCheckable, PortError};
use domain_approval::{Approval, ApprovalAction, ApprovalStatus, ApprovalType};
use domain_fund::NavPublication;
use domain_investment::InvestmentStatus;
use test_utils::*;

async fn database() -> TestDatabase {
    create_isolated_test_database().await.expect("postgres container")
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_health_check_and_seeded_fee_configuration() {
    let db = database().await;
    let store = db.store();

    assert_eq!(store.health_check().await.status, AdapterHealth::Healthy);

    let mut uow = store.begin().await.unwrap();
    let fees = uow.fee_configuration().await.unwrap();
    assert!(fees.admin_fee_percent.value().is_zero());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_accumulate_adds_to_existing_row() {
    let db = database().await;
    let store = db.store();
    let participant = ParticipantBuilder::new().build();
    let key = LedgerFixtures::key(participant.id, IdFixtures::product_money_market(), DateFixtures::trade_date());

    let mut uow = store.begin().await.unwrap();
    uow.insert_participant(&participant).await.unwrap();
    uow.accumulate_unit_link(&key, dec!(100000)).await.unwrap();
    let row = uow.accumulate_unit_link(&key, dec!(50000)).await.unwrap();
    uow.commit().await.unwrap();

    assert_eq!(row.total_amount, dec!(150000));
    assert_pending(&row);

    let mut uow = store.begin().await.unwrap();
    assert_eq!(uow.unit_links_of_participant(participant.id).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_dropped_unit_of_work_rolls_back() {
    let db = database().await;
    let store = db.store();
    let participant = ParticipantBuilder::new().build();

    {
        let mut uow = store.begin().await.unwrap();
        uow.insert_participant(&participant).await.unwrap();
    }

    let mut uow = store.begin().await.unwrap();
    assert!(uow.get_participant(participant.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_second_open_approval_is_conflict() {
    let db = database().await;
    let store = db.store();
    let ref_id = uuid::Uuid::new_v4();

    let mut uow = store.begin().await.unwrap();
    uow.insert_approval(&Approval::submit(ref_id, ApprovalType::Ticket, ApprovalAction::Update, None))
        .await
        .unwrap();
    let err = uow
        .insert_approval(&Approval::submit(ref_id, ApprovalType::Ticket, ApprovalAction::Update, None))
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::Conflict { .. }));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_investment_flow_on_postgres() {
    let db = database().await;
    db.set_fee_configuration(dec!(2), dec!(1)).await.unwrap();
    let store = db.store();
    let participant = ParticipantBuilder::new().build();
    {
        let mut uow = store.begin().await.unwrap();
        uow.insert_participant(&participant).await.unwrap();
        uow.commit().await.unwrap();
    }

    let notifier = Arc::new(RecordingNotifier::new());
    let engine = PensionEngine::new(store.clone(), notifier.clone(), EngineConfig::default()).unwrap();
    let request = CreateInvestmentBuilder::participant(participant.id)
        .allocate(IdFixtures::product_money_market(), dec!(100))
        .build();
    let created = engine.orchestrator.create_investment(&request).await.unwrap();
    assert_items_balanced(&created.detail.items);

    let uploaded = engine
        .orchestrator
        .upload_payment(created.detail.investment.id, "TRF-PG-1")
        .await
        .unwrap();
    let pending = engine
        .approvals
        .list(&ApprovalQuery::pending(ApprovalType::Investment))
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);

    let decided = engine
        .approvals
        .confirm(uploaded.approval.unwrap().id, ApprovalStatus::Approved, None)
        .await
        .unwrap();
    let date = EngineConfig::default().timezone.date_of(decided.updated_at);
    engine
        .nav
        .publish(&[NavPublication {
            product_id: IdFixtures::product_money_market(),
            nav_date: date,
            amount: dec!(500),
        }])
        .await
        .unwrap();
    engine.shutdown().await;

    let detail = engine.orchestrator.get(created.detail.investment.id).await.unwrap();
    assert_eq!(detail.investment.status, InvestmentStatus::Success);

    let mut uow = store.begin().await.unwrap();
    let rows = uow.unit_links_of_participant(participant.id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_priced_at(&rows[0], dec!(500));
    assert_eq!(rows[0].ip, dec!(200));
    assert_eq!(notifier.investment_notices().len(), 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_active_participants_skip_inactive_members() {
    let db = get_shared_test_database().await;
    db.clear_data().await.unwrap();
    let store = db.store();
    let company = PartyFixtures::active_company();
    let active = ParticipantBuilder::new()
        .member_of(company.id)
        .with_email("active@sentosa.example.com")
        .with_expected(dec!(400000))
        .build();
    let inactive = ParticipantBuilder::new().member_of(company.id).inactive().build();

    let mut uow = store.begin().await.unwrap();
    uow.insert_company(&company).await.unwrap();
    uow.insert_participant(&active).await.unwrap();
    uow.insert_participant(&inactive).await.unwrap();
    uow.commit().await.unwrap();

    let mut uow = store.begin().await.unwrap();
    let members = uow.active_participants(company.id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].email, "active@sentosa.example.com");
    assert_eq!(members[0].contribution.employer, dec!(100000));
}
