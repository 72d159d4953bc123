//! Notifier that writes notices to the log
//!
//! The batch runs without a mail relay; notices become structured
//! `info` events that the log shipper forwards.

use app_services::{InvestmentNotice, Notifier, RejectionNotice};
use async_trait::async_trait;
use core_kernel::{DomainPort, PortError};
use tracing::info;

#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl DomainPort for LogNotifier {}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_rejection(&self, notice: &RejectionNotice) -> Result<(), PortError> {
        info!(
            approval_id = %notice.approval_id,
            approval_type = %notice.approval_type,
            to = %notice.contact.email,
            reason = notice.reason.as_deref().unwrap_or(""),
            "Rejection notice: {}",
            notice.contact.description
        );
        Ok(())
    }

    async fn send_investment_created(&self, notice: &InvestmentNotice) -> Result<(), PortError> {
        info!(
            investment_id = %notice.investment_id,
            code = %notice.code,
            amount = %notice.amount,
            to = %notice.contact.email,
            "Investment created for {}",
            notice.contact.name
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{ApprovalId, InvestmentId};
    use domain_approval::{ApprovalType, ContactInfo};
    use domain_investment::InvestmentCode;
    use rust_decimal_macros::dec;

    fn contact() -> ContactInfo {
        ContactInfo {
            email: "budi@example.com".to_string(),
            name: "Budi".to_string(),
            description: "Investment INV-0001".to_string(),
        }
    }

    #[tokio::test]
    async fn test_notices_always_succeed() {
        let notifier = LogNotifier;
        let rejection = RejectionNotice {
            approval_id: ApprovalId::new(),
            approval_type: ApprovalType::Investment,
            reason: Some("blurred receipt".to_string()),
            contact: contact(),
        };
        assert!(notifier.send_rejection(&rejection).await.is_ok());

        let created = InvestmentNotice {
            investment_id: InvestmentId::new(),
            code: InvestmentCode::parse("1234567").unwrap(),
            amount: dec!(100000),
            contact: contact(),
        };
        assert!(notifier.send_investment_created(&created).await.is_ok());
    }
}
