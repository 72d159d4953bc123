//! Notifier test double

use std::sync::Mutex;

use app_services::{InvestmentNotice, Notifier, RejectionNotice};
use async_trait::async_trait;
use core_kernel::{DomainPort, PortError};

/// Keeps every notice it is asked to send
#[derive(Default)]
pub struct RecordingNotifier {
    rejections: Mutex<Vec<RejectionNotice>>,
    investments: Mutex<Vec<InvestmentNotice>>,
    failing: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every send fails
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn rejections(&self) -> Vec<RejectionNotice> {
        self.rejections.lock().unwrap().clone()
    }

    pub fn investment_notices(&self) -> Vec<InvestmentNotice> {
        self.investments.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), PortError> {
        if self.failing {
            return Err(PortError::connection("mail relay unavailable"));
        }
        Ok(())
    }
}

impl DomainPort for RecordingNotifier {}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_rejection(&self, notice: &RejectionNotice) -> Result<(), PortError> {
        self.check()?;
        self.rejections.lock().unwrap().push(notice.clone());
        Ok(())
    }

    async fn send_investment_created(&self, notice: &InvestmentNotice) -> Result<(), PortError> {
        self.check()?;
        self.investments.lock().unwrap().push(notice.clone());
        Ok(())
    }
}
